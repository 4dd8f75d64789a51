//! # User stories
//!
//! A user story is proposed by a signed-up investor (the author) against a
//! project, accepted by the project owner, and activated once **both** sides
//! have signed in. The sign-in that completes the pair stamps
//! `start_timestamp`; no other write ever touches it.
//!
//! From then on the execution window is `[start_timestamp, start + duration)`:
//!
//! - the project may report the work finished while the window is open;
//! - the author may accept the work (paying the project its DARF share) once;
//! - after the window closes without acceptance the author may declare the
//!   story failed and refund-eligible.

use soroban_sdk::{panic_with_error, token, Address, BytesN, Env};

use crate::escrow::debit_depo;
use crate::events;
use crate::registry::load_owned_project;
use crate::storage::{
    get_and_increment_story_id, load_conditions, load_project, load_settings, load_story,
    load_user, save_story,
};
use crate::types::{UserStory, UserStoryStatus};
use crate::Error;

/// Converts a completed story's DARF payout into native units released from the pool.
pub const DEPO_RELEASE_DIVISOR: i128 = 500;

pub fn start_user_story(
    env: &Env,
    author: &Address,
    project_id: u64,
    content: BytesN<32>,
    amount_darf_requested: i128,
    duration: u64,
) -> u64 {
    if !load_user(env, author).signed_up {
        panic_with_error!(env, Error::NotSignedUp);
    }
    // Only checks existence.
    load_project(env, project_id);

    if amount_darf_requested <= 0 {
        panic_with_error!(env, Error::InvalidAmount);
    }
    if duration == 0 {
        panic_with_error!(env, Error::InvalidDuration);
    }

    let story = UserStory {
        id: get_and_increment_story_id(env),
        project_id,
        author: author.clone(),
        content,
        project_accepted: false,
        user_signed_in: false,
        project_signed_in: false,
        start_timestamp: 0,
        duration,
        project_confirmed_end: false,
        user_confirmed_end: false,
        amount_darf_requested,
        amount_tokens_requested: 0,
    };
    save_story(env, &story);

    events::emit_story_created(env, story.id, project_id, author.clone(), amount_darf_requested);
    story.id
}

fn load_authored_story(env: &Env, caller: &Address, story_id: u64) -> UserStory {
    let story = load_story(env, story_id);
    if story.author != *caller {
        panic_with_error!(env, Error::NotAuthorized);
    }
    story
}

/// Stamp the start time if this sign-in completed the pair.
///
/// Callers only reach this on a false-to-true flag flip, so the pair can be
/// completed at most once.
fn stamp_if_started(env: &Env, story: &mut UserStory) {
    if story.is_started() {
        story.start_timestamp = env.ledger().timestamp();
        events::emit_story_started(env, story.id, story.start_timestamp, story.deadline());
    }
}

pub fn accept_user_story_from_project(env: &Env, caller: &Address, story_id: u64) {
    let mut story = load_story(env, story_id);
    load_owned_project(env, caller, story.project_id);

    story.project_accepted = true;
    save_story(env, &story);

    events::emit_story_accepted(env, story_id, caller.clone());
}

pub fn sign_in_user_story_from_user(env: &Env, caller: &Address, story_id: u64) {
    let mut story = load_authored_story(env, caller, story_id);
    if story.user_signed_in {
        return;
    }

    story.user_signed_in = true;
    events::emit_story_signed(env, story_id, caller.clone(), false);
    stamp_if_started(env, &mut story);
    save_story(env, &story);
}

pub fn sign_in_user_story_from_project(env: &Env, caller: &Address, story_id: u64) {
    let mut story = load_story(env, story_id);
    load_owned_project(env, caller, story.project_id);
    if story.project_signed_in {
        return;
    }

    story.project_signed_in = true;
    events::emit_story_signed(env, story_id, caller.clone(), true);
    stamp_if_started(env, &mut story);
    save_story(env, &story);
}

pub fn confirm_end_from_project(env: &Env, caller: &Address, story_id: u64) {
    let mut story = load_story(env, story_id);
    load_owned_project(env, caller, story.project_id);

    if !story.is_started() {
        panic_with_error!(env, Error::NotStarted);
    }
    if env.ledger().timestamp() >= story.deadline() {
        panic_with_error!(env, Error::DeadlinePassed);
    }

    story.project_confirmed_end = true;
    save_story(env, &story);

    events::emit_story_end_confirmed(env, story_id, caller.clone());
}

/// The author accepts the work: the project owner receives
/// `darf_share_pct` percent of the requested DARF.
///
/// Returns the DARF amount paid.
pub fn confirm_end_from_user(env: &Env, caller: &Address, story_id: u64) -> i128 {
    let mut story = load_authored_story(env, caller, story_id);
    if !story.is_started() {
        panic_with_error!(env, Error::NotStarted);
    }
    if story.user_confirmed_end {
        panic_with_error!(env, Error::AlreadyConfirmed);
    }

    let project = load_project(env, story.project_id);
    let conditions = load_conditions(env);
    let payout = story
        .amount_darf_requested
        .checked_mul(conditions.darf_share_pct as i128)
        .unwrap_or_else(|| panic_with_error!(env, Error::ArithmeticOverflow))
        / 100;
    let release = payout / DEPO_RELEASE_DIVISOR;

    story.user_confirmed_end = true;
    save_story(env, &story);

    let settings = load_settings(env);
    token::Client::new(env, &settings.darf_token).transfer(
        &env.current_contract_address(),
        &project.owner,
        &payout,
    );
    debit_depo(env, release);

    events::emit_story_paid_out(env, story_id, project.owner, payout, release);
    payout
}

/// Declare an overdue story failed.
///
/// Only validates and records the claim; no funds move.
pub fn userstory_fail_refund(env: &Env, caller: &Address, story_id: u64) -> UserStoryStatus {
    let story = load_authored_story(env, caller, story_id);
    if !story.is_started() {
        panic_with_error!(env, Error::NotStarted);
    }
    if env.ledger().timestamp() <= story.deadline() {
        panic_with_error!(env, Error::DeadlineNotPassed);
    }
    if story.user_confirmed_end {
        panic_with_error!(env, Error::AlreadyConfirmed);
    }

    events::emit_refund_requested(env, story_id, caller.clone(), story.amount_darf_requested);
    UserStoryStatus::RefundEligible
}

pub fn user_story_status(env: &Env, story_id: u64) -> UserStoryStatus {
    load_story(env, story_id).status_at(env.ledger().timestamp())
}
