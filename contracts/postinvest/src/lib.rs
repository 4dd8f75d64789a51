//! # PostInvest Contract
//!
//! A crowd-investment contract in which investors buy the internal DARF token
//! with native currency, propose funded *user stories* against projects, and
//! release DARF to a project once its work is accepted.
//!
//! | Phase         | Entry Point(s)                                              |
//! |---------------|-------------------------------------------------------------|
//! | Bootstrap     | [`PostInvest::init`]                                        |
//! | Administration| `change_conditions`, `set_project_owner`                    |
//! | Escrow        | `receive_funds`, `exchange_darf_for_eth`                    |
//! | Projects      | `create_project`, `update_project_description`, `set_rights`|
//! | User stories  | `start_user_story`, `accept_user_story_from_project`,       |
//! |               | `sign_in_user_story_from_user`,                             |
//! |               | `sign_in_user_story_from_project`,                          |
//! |               | `confirm_end_from_project`, `confirm_end_from_user`,        |
//! |               | `userstory_fail_refund`                                     |
//! | Queries       | `signup_status`, `deposit_balance`, `get_*`, `check_rights` |
//!
//! ## Architecture
//!
//! Every entry point authenticates its acting address and then delegates:
//! pool bookkeeping to [`escrow`], projects to [`registry`], the story
//! lifecycle to [`stories`], access tiers to [`rights`]. Storage access is
//! fully delegated to [`storage`] and event emission to [`events`].
//!
//! Any failed check panics with an [`Error`], which the ledger turns into a
//! rejected transaction with every write of the call rolled back.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, BytesN, Env, Vec};

mod escrow;
pub mod events;
mod registry;
mod rights;
mod storage;
mod stories;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_escrow;
#[cfg(test)]
mod test_events;

pub use types::{
    Conditions, EscrowPool, PoolSettings, Project, User, UserStory, UserStoryStatus,
};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized       = 1,
    NotInitialized           = 2,
    NotAuthorized            = 3,
    NotSignedUp              = 4,
    NotProjectOwner          = 5,
    ProjectNotFound          = 6,
    UserStoryNotFound        = 7,
    InvalidAmount            = 8,
    InvalidDuration          = 9,
    InvalidConditions        = 10,
    InvalidRightsTable       = 11,
    InsufficientBalance      = 12,
    InsufficientTokenReserve = 13,
    InsufficientDeposit      = 14,
    NotStarted               = 15,
    DeadlinePassed           = 16,
    DeadlineNotPassed        = 17,
    AlreadyConfirmed         = 18,
    ArithmeticOverflow       = 19,
}

#[contract]
pub struct PostInvest;

#[contractimpl]
impl PostInvest {
    // ─────────────────────────────────────────────────────────
    // Initialisation & administration
    // ─────────────────────────────────────────────────────────

    /// Initialise the escrow pool.
    ///
    /// Must be called exactly once immediately after deployment.
    /// Subsequent calls panic with `Error::AlreadyInitialized`.
    ///
    /// - `beneficiary` must sign and becomes the only address allowed to
    ///   change conditions and flag project owners.
    /// - `exchange_rate` is the DARF paid per native unit and must be positive.
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        env: Env,
        beneficiary: Address,
        darf_token: Address,
        native_token: Address,
        project_token: Address,
        exchange_rate: i128,
        token_share_bps: u32,
        darf_share_pct: u32,
        decide_vote_bps: u32,
    ) {
        beneficiary.require_auth();
        escrow::init_pool(
            &env,
            PoolSettings {
                beneficiary,
                darf_token,
                native_token,
                project_token,
            },
            Conditions {
                version: 1,
                exchange_rate,
                token_share_bps,
                darf_share_pct,
                decide_vote_bps,
            },
        );
    }

    /// Replace the exchange rate and share fractions.
    ///
    /// `caller` must be the beneficiary. Returns the new configuration, whose
    /// `version` is one higher than before.
    pub fn change_conditions(
        env: Env,
        caller: Address,
        exchange_rate: i128,
        token_share_bps: u32,
        darf_share_pct: u32,
    ) -> Conditions {
        caller.require_auth();
        escrow::change_conditions(&env, &caller, exchange_rate, token_share_bps, darf_share_pct)
    }

    /// Grant or withdraw the right to register projects.
    pub fn set_project_owner(env: Env, caller: Address, user: Address, is_owner: bool) {
        caller.require_auth();
        escrow::set_project_owner(&env, &caller, &user, is_owner);
    }

    // ─────────────────────────────────────────────────────────
    // Escrow
    // ─────────────────────────────────────────────────────────

    /// Pay `amount` native units into the pool and receive DARF at the
    /// current exchange rate. The first call also signs `funder` up.
    pub fn receive_funds(env: Env, funder: Address, amount: i128) -> i128 {
        funder.require_auth();
        escrow::receive_funds(&env, &funder, amount)
    }

    /// Redeem `sum_darf` DARF for native units from the pool.
    pub fn exchange_darf_for_eth(env: Env, holder: Address, sum_darf: i128) -> i128 {
        holder.require_auth();
        escrow::exchange_darf_for_eth(&env, &holder, sum_darf)
    }

    pub fn signup_status(env: Env, address: Address) -> bool {
        storage::load_user(&env, &address).signed_up
    }

    /// Native units currently held in the deposit pool.
    pub fn deposit_balance(env: Env) -> i128 {
        storage::get_depo(&env)
    }

    pub fn get_user(env: Env, address: Address) -> User {
        storage::load_user(&env, &address)
    }

    pub fn get_conditions(env: Env) -> Conditions {
        storage::load_conditions(&env)
    }

    pub fn get_pool(env: Env) -> EscrowPool {
        EscrowPool {
            settings: storage::load_settings(&env),
            conditions: storage::load_conditions(&env),
            deposit_total: storage::get_depo(&env),
        }
    }

    // ─────────────────────────────────────────────────────────
    // Projects
    // ─────────────────────────────────────────────────────────

    /// Register a new project owned by `owner`.
    ///
    /// `caller` must be signed up and flagged as a project owner. Without an
    /// explicit `token` the project uses the pool's default project token.
    pub fn create_project(
        env: Env,
        caller: Address,
        owner: Address,
        token: Option<Address>,
        description: BytesN<32>,
    ) -> Project {
        caller.require_auth();
        registry::create_project(&env, &caller, owner, token, description)
    }

    /// Replace the project's description pointer. Owner only.
    pub fn update_project_description(
        env: Env,
        caller: Address,
        project_id: u64,
        description: BytesN<32>,
    ) {
        caller.require_auth();
        registry::update_project_description(&env, &caller, project_id, description);
    }

    pub fn get_project(env: Env, project_id: u64) -> Project {
        storage::load_project(&env, project_id)
    }

    /// Publish the project's access-tier floors. Owner only.
    pub fn set_rights(env: Env, caller: Address, project_id: u64, floors: Vec<i128>) {
        caller.require_auth();
        rights::set_rights(&env, &caller, project_id, floors);
    }

    pub fn get_rights(env: Env, project_id: u64) -> Vec<i128> {
        storage::load_rights(&env, project_id)
    }

    /// Tier `holder` reaches on `project_id`, or `None`.
    pub fn check_rights(env: Env, project_id: u64, holder: Address) -> Option<u32> {
        rights::check_rights(&env, project_id, &holder)
    }

    // ─────────────────────────────────────────────────────────
    // User stories
    // ─────────────────────────────────────────────────────────

    /// Propose a user story against `project_id`, requesting
    /// `amount_darf_requested` DARF for work lasting `duration` seconds once
    /// both sides sign in. Returns the new story ID.
    pub fn start_user_story(
        env: Env,
        author: Address,
        project_id: u64,
        content: BytesN<32>,
        amount_darf_requested: i128,
        duration: u64,
    ) -> u64 {
        author.require_auth();
        stories::start_user_story(
            &env,
            &author,
            project_id,
            content,
            amount_darf_requested,
            duration,
        )
    }

    pub fn accept_user_story_from_project(env: Env, caller: Address, story_id: u64) {
        caller.require_auth();
        stories::accept_user_story_from_project(&env, &caller, story_id);
    }

    /// The author signs the agreement. Repeated calls are no-ops.
    pub fn sign_in_user_story_from_user(env: Env, caller: Address, story_id: u64) {
        caller.require_auth();
        stories::sign_in_user_story_from_user(&env, &caller, story_id);
    }

    /// The project owner signs the agreement. Repeated calls are no-ops.
    pub fn sign_in_user_story_from_project(env: Env, caller: Address, story_id: u64) {
        caller.require_auth();
        stories::sign_in_user_story_from_project(&env, &caller, story_id);
    }

    /// The project reports the work done. Only before the deadline.
    pub fn confirm_end_from_project(env: Env, caller: Address, story_id: u64) {
        caller.require_auth();
        stories::confirm_end_from_project(&env, &caller, story_id);
    }

    /// The author accepts the work and the project owner is paid. Once only.
    pub fn confirm_end_from_user(env: Env, caller: Address, story_id: u64) -> i128 {
        caller.require_auth();
        stories::confirm_end_from_user(&env, &caller, story_id)
    }

    /// The author declares an overdue story failed. No funds move.
    pub fn userstory_fail_refund(env: Env, caller: Address, story_id: u64) -> UserStoryStatus {
        caller.require_auth();
        stories::userstory_fail_refund(&env, &caller, story_id)
    }

    pub fn get_user_story(env: Env, story_id: u64) -> UserStory {
        storage::load_story(&env, story_id)
    }

    pub fn get_user_story_status(env: Env, story_id: u64) -> UserStoryStatus {
        stories::user_story_status(&env, story_id)
    }
}
