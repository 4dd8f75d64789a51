//! # Access rights
//!
//! Each project may publish up to [`MAX_RIGHTS_TIERS`] token-holding floors.
//! Tier *n* (1-based) is held by anyone whose balance of the project token
//! strictly exceeds `floors[n - 1]`, e.g.
//!
//! | Floor      | Tier | Meaning (off-chain)      |
//! |------------|------|--------------------------|
//! | 10         | 1    | traffic-light spectator  |
//! | 100        | 2    | reports analyser         |
//! | 1 000      | 3    | transaction auditor      |
//! | 10 000     | 4    | scrum participant        |
//!
//! A holder is reported at the highest tier they reach. Floors must be
//! non-decreasing; when several tiers share the reached floor the lowest of
//! them is reported.

use soroban_sdk::{panic_with_error, token, Address, Env, Vec};

use crate::events;
use crate::registry::load_owned_project;
use crate::storage::{load_project, load_rights, save_rights};
use crate::Error;

pub const MAX_RIGHTS_TIERS: u32 = 50;

pub fn set_rights(env: &Env, caller: &Address, project_id: u64, floors: Vec<i128>) {
    load_owned_project(env, caller, project_id);

    if floors.is_empty() || floors.len() > MAX_RIGHTS_TIERS {
        panic_with_error!(env, Error::InvalidRightsTable);
    }
    let mut previous = 0i128;
    for floor in floors.iter() {
        if floor < previous {
            panic_with_error!(env, Error::InvalidRightsTable);
        }
        previous = floor;
    }

    save_rights(env, project_id, &floors);
    events::emit_rights_updated(env, project_id, floors.len());
}

/// Tier reached by `balance`, or `None` below the first floor.
pub fn tier_for_balance(floors: &Vec<i128>, balance: i128) -> Option<u32> {
    let mut best: Option<(u32, i128)> = None;
    for (index, floor) in floors.iter().enumerate() {
        if floor >= balance {
            break;
        }
        // Strictly greater keeps the lowest tier among equal floors.
        if best.map_or(true, |(_, reached)| floor > reached) {
            best = Some((index as u32 + 1, floor));
        }
    }
    best.map(|(tier, _)| tier)
}

pub fn check_rights(env: &Env, project_id: u64, holder: &Address) -> Option<u32> {
    let project = load_project(env, project_id);
    let floors = load_rights(env, project_id);
    let balance = token::Client::new(env, &project.token).balance(holder);
    tier_for_balance(&floors, balance)
}
