//! # Types
//!
//! Shared data structures used across all modules of the PostInvest contract.
//!
//! ## Design decisions
//!
//! ### Settings / Conditions / Depo split
//!
//! The escrow pool is internally stored as three separate ledger entries:
//!
//! - [`PoolSettings`] — written once by `init`; never mutated.
//! - [`Conditions`] — the versioned rate configuration, rewritten only by
//!   `change_conditions`.
//! - the deposit total (`Depo`) — a bare `i128`, written on every funding and
//!   payout.
//!
//! The public API exposes the reconstructed [`EscrowPool`] for convenience.
//!
//! ### User-story status is derived
//!
//! A [`UserStory`] keeps the independent flags of the funding agreement.
//! [`UserStoryStatus`] is computed from those flags and the ledger time by
//! [`UserStory::status_at`]:
//!
//! ```text
//! Proposed ──► ProjectAccepted ──► AwaitingDualSignIn ──► Active ──► CompletedByProject
//!                                                           │               │
//!                                                           ├──► CompletedByUser ◄──┤
//!                                                           └──► RefundEligible ◄───┘
//! ```
//!
//! `RefundEligible` only appears once the deadline has passed without the
//! author confirming the end of the work.

use soroban_sdk::{contracttype, Address, BytesN};

/// Per-address participant record.
///
/// Absent entries read as the default (all `false`).
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct User {
    /// Set by the beneficiary; required to register projects.
    pub is_project_owner: bool,
    /// Set once, on the first funding interaction.
    pub signed_up: bool,
}

/// A registered project.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Project {
    /// Unique identifier (auto-incremented).
    pub id: u64,
    /// Address that owns the project and receives story payouts.
    pub owner: Address,
    /// Token whose holdings determine access tiers for this project.
    pub token: Address,
    /// Content-hash of the off-chain description (e.g. IPFS CID digest).
    pub description: BytesN<32>,
}

/// A funded unit of work proposed against a project.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserStory {
    pub id: u64,
    pub project_id: u64,
    /// The investor who proposed the story.
    pub author: Address,
    /// Content-hash of the off-chain story text.
    pub content: BytesN<32>,
    pub project_accepted: bool,
    pub user_signed_in: bool,
    pub project_signed_in: bool,
    /// Ledger time at which the second sign-in landed; `0` until then.
    pub start_timestamp: u64,
    /// Seconds after `start_timestamp` before the work is overdue.
    pub duration: u64,
    pub project_confirmed_end: bool,
    pub user_confirmed_end: bool,
    pub amount_darf_requested: i128,
    pub amount_tokens_requested: i128,
}

impl UserStory {
    /// Both parties have signed in and the execution window is open or past.
    pub fn is_started(&self) -> bool {
        self.user_signed_in && self.project_signed_in
    }

    /// First second at which the story is overdue.
    pub fn deadline(&self) -> u64 {
        self.start_timestamp.saturating_add(self.duration)
    }

    pub fn status_at(&self, now: u64) -> UserStoryStatus {
        if self.user_confirmed_end {
            UserStoryStatus::CompletedByUser
        } else if self.is_started() && now > self.deadline() {
            UserStoryStatus::RefundEligible
        } else if self.project_confirmed_end {
            UserStoryStatus::CompletedByProject
        } else if self.is_started() {
            UserStoryStatus::Active
        } else if self.user_signed_in || self.project_signed_in {
            UserStoryStatus::AwaitingDualSignIn
        } else if self.project_accepted {
            UserStoryStatus::ProjectAccepted
        } else {
            UserStoryStatus::Proposed
        }
    }
}

/// Lifecycle status of a user story, derived from its flags.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UserStoryStatus {
    /// Created; nobody has acted on it yet.
    Proposed,
    /// The project owner took the story into its backlog.
    ProjectAccepted,
    /// One side has signed in; waiting for the other.
    AwaitingDualSignIn,
    /// Both sides signed in; the execution window is running.
    Active,
    /// The project reported the work done within the window.
    CompletedByProject,
    /// The author accepted the work; DARF has been paid out.
    CompletedByUser,
    /// Deadline passed without the author's confirmation.
    RefundEligible,
}

/// Addresses fixed at initialisation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolSettings {
    /// The only address allowed to change conditions and flag project owners.
    pub beneficiary: Address,
    /// The internal DARF token paid out for native funds.
    pub darf_token: Address,
    /// Stellar Asset Contract of the native currency held in escrow.
    pub native_token: Address,
    /// Default access token for projects registered without one of their own.
    pub project_token: Address,
}

/// Versioned exchange and share configuration.
///
/// Fractions are stored in basis points (1/10 000) except `darf_share_pct`,
/// which is a whole percentage.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Conditions {
    /// Starts at 1 and increments on every change.
    pub version: u32,
    /// DARF paid per native unit.
    pub exchange_rate: i128,
    pub token_share_bps: u32,
    /// Share of a story's requested DARF paid to the project on completion.
    pub darf_share_pct: u32,
    pub decide_vote_bps: u32,
}

/// Read-only view of the whole escrow pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EscrowPool {
    pub settings: PoolSettings,
    pub conditions: Conditions,
    /// Native units currently backing DARF redemption.
    pub deposit_total: i128,
}
