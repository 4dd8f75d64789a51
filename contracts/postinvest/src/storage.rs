//! # Storage
//!
//! Provides typed helpers over Soroban's two storage tiers used by PostInvest:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key            | Type           | Description                          |
//! |----------------|----------------|--------------------------------------|
//! | `Settings`     | `PoolSettings` | Beneficiary and token addresses      |
//! | `Conditions`   | `Conditions`   | Versioned rate configuration         |
//! | `Depo`         | `i128`         | Deposit pool total (native units)    |
//! | `ProjectCount` | `u64`          | Auto-increment project ID counter    |
//! | `StoryCount`   | `u64`          | Auto-increment user-story ID counter |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key             | Type        | Description                    |
//! |-----------------|-------------|--------------------------------|
//! | `User(addr)`    | `User`      | Signup and project-owner flags |
//! | `Project(id)`   | `Project`   | Project record                 |
//! | `Story(id)`     | `UserStory` | User-story record              |
//! | `Rights(id)`    | `Vec<i128>` | Access-tier floors per project |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, panic_with_error, Address, Env, Vec};

use crate::types::{Conditions, PoolSettings, Project, User, UserStory};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

/// All contract storage keys.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Immutable pool addresses (Instance).
    Settings,
    /// Versioned rate configuration (Instance).
    Conditions,
    /// Deposit pool total (Instance).
    Depo,
    /// Global auto-increment counter for project IDs (Instance).
    ProjectCount,
    /// Global auto-increment counter for user-story IDs (Instance).
    StoryCount,
    /// Participant flags keyed by address (Persistent).
    User(Address),
    /// Project record keyed by ID (Persistent).
    Project(u64),
    /// User-story record keyed by ID (Persistent).
    Story(u64),
    /// Access-tier floors keyed by project ID (Persistent).
    Rights(u64),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Settings)
}

pub fn save_settings(env: &Env, settings: &PoolSettings) {
    env.storage().instance().set(&DataKey::Settings, settings);
    bump_instance(env);
}

/// Panics with `NotInitialized` before `init` has run.
pub fn load_settings(env: &Env) -> PoolSettings {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Settings)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

pub fn save_conditions(env: &Env, conditions: &Conditions) {
    env.storage().instance().set(&DataKey::Conditions, conditions);
    bump_instance(env);
}

pub fn load_conditions(env: &Env) -> Conditions {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Conditions)
        .unwrap_or_else(|| panic_with_error!(env, Error::NotInitialized))
}

pub fn get_depo(env: &Env) -> i128 {
    bump_instance(env);
    env.storage().instance().get(&DataKey::Depo).unwrap_or(0)
}

pub fn set_depo(env: &Env, amount: i128) {
    env.storage().instance().set(&DataKey::Depo, &amount);
    bump_instance(env);
}

fn get_and_increment(env: &Env, key: &DataKey) -> u64 {
    bump_instance(env);
    let current: u64 = env.storage().instance().get(key).unwrap_or(0);
    env.storage().instance().set(key, &(current + 1));
    current
}

/// Atomically reads, increments, and stores the project counter.
/// Returns the ID to use for the *current* project (pre-increment value).
pub fn get_and_increment_project_id(env: &Env) -> u64 {
    get_and_increment(env, &DataKey::ProjectCount)
}

/// Same as [`get_and_increment_project_id`] for user stories.
pub fn get_and_increment_story_id(env: &Env) -> u64 {
    get_and_increment(env, &DataKey::StoryCount)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Load a user's flags, defaulting to an unknown (all-false) user.
pub fn load_user(env: &Env, address: &Address) -> User {
    let key = DataKey::User(address.clone());
    match env.storage().persistent().get::<_, User>(&key) {
        Some(user) => {
            bump_persistent(env, &key);
            user
        }
        None => User::default(),
    }
}

pub fn save_user(env: &Env, address: &Address, user: &User) {
    let key = DataKey::User(address.clone());
    env.storage().persistent().set(&key, user);
    bump_persistent(env, &key);
}

pub fn save_project(env: &Env, project: &Project) {
    let key = DataKey::Project(project.id);
    env.storage().persistent().set(&key, project);
    bump_persistent(env, &key);
}

/// Panics with `ProjectNotFound` if the project does not exist.
pub fn load_project(env: &Env, id: u64) -> Project {
    let key = DataKey::Project(id);
    let project: Project = env
        .storage()
        .persistent()
        .get(&key)
        .unwrap_or_else(|| panic_with_error!(env, Error::ProjectNotFound));
    bump_persistent(env, &key);
    project
}

pub fn save_story(env: &Env, story: &UserStory) {
    let key = DataKey::Story(story.id);
    env.storage().persistent().set(&key, story);
    bump_persistent(env, &key);
}

/// Panics with `UserStoryNotFound` if the story does not exist.
pub fn load_story(env: &Env, id: u64) -> UserStory {
    let key = DataKey::Story(id);
    let story: UserStory = env
        .storage()
        .persistent()
        .get(&key)
        .unwrap_or_else(|| panic_with_error!(env, Error::UserStoryNotFound));
    bump_persistent(env, &key);
    story
}

pub fn save_rights(env: &Env, project_id: u64, floors: &Vec<i128>) {
    let key = DataKey::Rights(project_id);
    env.storage().persistent().set(&key, floors);
    bump_persistent(env, &key);
}

/// Floors for a project; empty when none were ever set.
pub fn load_rights(env: &Env, project_id: u64) -> Vec<i128> {
    let key = DataKey::Rights(project_id);
    match env.storage().persistent().get::<_, Vec<i128>>(&key) {
        Some(floors) => {
            bump_persistent(env, &key);
            floors
        }
        None => Vec::new(env),
    }
}
