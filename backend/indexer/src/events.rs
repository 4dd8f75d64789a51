//! Event kinds published by the PostInvest contract and their stored form.
//!
//! Topic symbols match `contracts/postinvest/src/events.rs`. Pool-wide events
//! carry a single topic; project and story events carry the record id as a
//! second topic.

use serde::{Deserialize, Serialize};

/// Which identifier, if any, the second topic of an event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicSubject {
    Pool,
    Project,
    Story,
}

/// All recognised event kinds from the PostInvest contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Native currency deposited and DARF issued (`funded`).
    FundsReceived,
    /// DARF exchanged back for native currency (`redeemed`).
    DarfRedeemed,
    /// Beneficiary published new conditions (`cond_chg`).
    ConditionsChanged,
    /// Project-owner flag toggled for a user (`owner_set`).
    ProjectOwnerSet,
    /// A project was registered (`created`).
    ProjectCreated,
    /// A project description pointer changed (`proj_upd`).
    ProjectUpdated,
    /// Access-rights tiers were replaced (`rights`).
    RightsUpdated,
    /// A user story was proposed (`story_new`).
    StoryCreated,
    /// The project owner accepted a story (`accepted`).
    StoryAccepted,
    /// One side signed in to a story (`signed`).
    StorySigned,
    /// Both sides signed in and the clock started (`started`).
    StoryStarted,
    /// The project owner confirmed completion (`proj_end`).
    StoryEndConfirmed,
    /// The author confirmed completion and DARF was paid out (`user_end`).
    StoryPaidOut,
    /// The author flagged an overdue story for refund (`refund`).
    RefundRequested,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "funded" => Self::FundsReceived,
            "redeemed" => Self::DarfRedeemed,
            "cond_chg" => Self::ConditionsChanged,
            "owner_set" => Self::ProjectOwnerSet,
            "created" => Self::ProjectCreated,
            "proj_upd" => Self::ProjectUpdated,
            "rights" => Self::RightsUpdated,
            "story_new" => Self::StoryCreated,
            "accepted" => Self::StoryAccepted,
            "signed" => Self::StorySigned,
            "started" => Self::StoryStarted,
            "proj_end" => Self::StoryEndConfirmed,
            "user_end" => Self::StoryPaidOut,
            "refund" => Self::RefundRequested,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FundsReceived => "funds_received",
            Self::DarfRedeemed => "darf_redeemed",
            Self::ConditionsChanged => "conditions_changed",
            Self::ProjectOwnerSet => "project_owner_set",
            Self::ProjectCreated => "project_created",
            Self::ProjectUpdated => "project_updated",
            Self::RightsUpdated => "rights_updated",
            Self::StoryCreated => "story_created",
            Self::StoryAccepted => "story_accepted",
            Self::StorySigned => "story_signed",
            Self::StoryStarted => "story_started",
            Self::StoryEndConfirmed => "story_end_confirmed",
            Self::StoryPaidOut => "story_paid_out",
            Self::RefundRequested => "refund_requested",
            Self::Unknown => "unknown",
        }
    }

    pub fn subject(&self) -> TopicSubject {
        match self {
            Self::ProjectCreated | Self::ProjectUpdated | Self::RightsUpdated => {
                TopicSubject::Project
            }
            Self::StoryCreated
            | Self::StoryAccepted
            | Self::StorySigned
            | Self::StoryStarted
            | Self::StoryEndConfirmed
            | Self::StoryPaidOut
            | Self::RefundRequested => TopicSubject::Story,
            Self::FundsReceived
            | Self::DarfRedeemed
            | Self::ConditionsChanged
            | Self::ProjectOwnerSet
            | Self::Unknown => TopicSubject::Pool,
        }
    }
}

/// A fully decoded PostInvest event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostInvestEvent {
    /// Stable identity used to deduplicate re-delivered events.
    pub event_key: String,
    pub event_type: String,
    pub project_id: Option<String>,
    pub story_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// An event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_key: String,
    pub event_type: String,
    pub project_id: Option<String>,
    pub story_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// Running totals of value that moved through the pool, as observed in events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowTotals {
    /// Native currency received through `funded` events.
    pub funded: i128,
    /// Native currency paid out through `redeemed` events.
    pub redeemed: i128,
    /// DARF paid to project owners through `user_end` events.
    pub paid_to_projects: i128,
}
