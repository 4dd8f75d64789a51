//! # Events
//!
//! Every state-changing entry point except `init` publishes an event
//! describing what it did. The sign-in that completes a story's pair
//! publishes two: `signed`, then `started`. Topics are short symbols,
//! followed by the project or story ID when the event concerns one. The
//! backend indexer keys off these topics.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsReceived {
    pub funder: Address,
    /// Native units pulled from the funder.
    pub amount: i128,
    /// DARF sent back to the funder.
    pub tokens: i128,
    /// `true` when this call signed the funder up.
    pub first_signup: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DarfRedeemed {
    pub holder: Address,
    pub darf_amount: i128,
    pub payout: i128,
    pub first_signup: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConditionsChanged {
    pub version: u32,
    pub exchange_rate: i128,
    pub token_share_bps: u32,
    pub darf_share_pct: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectOwnerSet {
    pub user: Address,
    pub is_owner: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectCreated {
    pub project_id: u64,
    pub owner: Address,
    pub token: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProjectUpdated {
    pub project_id: u64,
    pub description: BytesN<32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserStoryCreated {
    pub story_id: u64,
    pub project_id: u64,
    pub author: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserStoryAccepted {
    pub story_id: u64,
    pub owner: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserStorySigned {
    pub story_id: u64,
    pub signer: Address,
    /// `true` for the project side, `false` for the author.
    pub from_project: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserStoryStarted {
    pub story_id: u64,
    pub start_timestamp: u64,
    pub deadline: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserStoryEndConfirmed {
    pub story_id: u64,
    pub owner: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserStoryPaidOut {
    pub story_id: u64,
    pub recipient: Address,
    /// DARF transferred to the project owner.
    pub amount: i128,
    /// Native units released from the deposit pool.
    pub depo_release: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundRequested {
    pub story_id: u64,
    pub author: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RightsUpdated {
    pub project_id: u64,
    pub tiers: u32,
}

pub fn emit_funds_received(
    env: &Env,
    funder: Address,
    amount: i128,
    tokens: i128,
    first_signup: bool,
) {
    env.events().publish(
        (symbol_short!("funded"),),
        FundsReceived {
            funder,
            amount,
            tokens,
            first_signup,
        },
    );
}

pub fn emit_darf_redeemed(
    env: &Env,
    holder: Address,
    darf_amount: i128,
    payout: i128,
    first_signup: bool,
) {
    env.events().publish(
        (symbol_short!("redeemed"),),
        DarfRedeemed {
            holder,
            darf_amount,
            payout,
            first_signup,
        },
    );
}

pub fn emit_conditions_changed(
    env: &Env,
    version: u32,
    exchange_rate: i128,
    token_share_bps: u32,
    darf_share_pct: u32,
) {
    env.events().publish(
        (symbol_short!("cond_chg"),),
        ConditionsChanged {
            version,
            exchange_rate,
            token_share_bps,
            darf_share_pct,
        },
    );
}

pub fn emit_project_owner_set(env: &Env, user: Address, is_owner: bool) {
    env.events()
        .publish((symbol_short!("owner_set"),), ProjectOwnerSet { user, is_owner });
}

pub fn emit_project_created(env: &Env, project_id: u64, owner: Address, token: Address) {
    env.events().publish(
        (symbol_short!("created"), project_id),
        ProjectCreated {
            project_id,
            owner,
            token,
        },
    );
}

pub fn emit_project_updated(env: &Env, project_id: u64, description: BytesN<32>) {
    env.events().publish(
        (symbol_short!("proj_upd"), project_id),
        ProjectUpdated {
            project_id,
            description,
        },
    );
}

pub fn emit_story_created(
    env: &Env,
    story_id: u64,
    project_id: u64,
    author: Address,
    amount: i128,
) {
    env.events().publish(
        (symbol_short!("story_new"), story_id),
        UserStoryCreated {
            story_id,
            project_id,
            author,
            amount,
        },
    );
}

pub fn emit_story_accepted(env: &Env, story_id: u64, owner: Address) {
    env.events().publish(
        (symbol_short!("accepted"), story_id),
        UserStoryAccepted { story_id, owner },
    );
}

pub fn emit_story_signed(env: &Env, story_id: u64, signer: Address, from_project: bool) {
    env.events().publish(
        (symbol_short!("signed"), story_id),
        UserStorySigned {
            story_id,
            signer,
            from_project,
        },
    );
}

pub fn emit_story_started(env: &Env, story_id: u64, start_timestamp: u64, deadline: u64) {
    env.events().publish(
        (symbol_short!("started"), story_id),
        UserStoryStarted {
            story_id,
            start_timestamp,
            deadline,
        },
    );
}

pub fn emit_story_end_confirmed(env: &Env, story_id: u64, owner: Address) {
    env.events().publish(
        (symbol_short!("proj_end"), story_id),
        UserStoryEndConfirmed { story_id, owner },
    );
}

pub fn emit_story_paid_out(
    env: &Env,
    story_id: u64,
    recipient: Address,
    amount: i128,
    depo_release: i128,
) {
    env.events().publish(
        (symbol_short!("user_end"), story_id),
        UserStoryPaidOut {
            story_id,
            recipient,
            amount,
            depo_release,
        },
    );
}

pub fn emit_refund_requested(env: &Env, story_id: u64, author: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("refund"), story_id),
        RefundRequested {
            story_id,
            author,
            amount,
        },
    );
}

pub fn emit_rights_updated(env: &Env, project_id: u64, tiers: u32) {
    env.events().publish(
        (symbol_short!("rights"), project_id),
        RightsUpdated { project_id, tiers },
    );
}
