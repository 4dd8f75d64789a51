//! Project registry: sequential project records owned by an address.

use soroban_sdk::{panic_with_error, Address, BytesN, Env};

use crate::events;
use crate::storage::{
    get_and_increment_project_id, load_project, load_settings, load_user, save_project,
};
use crate::types::Project;
use crate::Error;

pub fn create_project(
    env: &Env,
    caller: &Address,
    owner: Address,
    token: Option<Address>,
    description: BytesN<32>,
) -> Project {
    let user = load_user(env, caller);
    if !user.signed_up {
        panic_with_error!(env, Error::NotSignedUp);
    }
    if !user.is_project_owner {
        panic_with_error!(env, Error::NotProjectOwner);
    }

    let token = token.unwrap_or_else(|| load_settings(env).project_token);
    let project = Project {
        id: get_and_increment_project_id(env),
        owner,
        token,
        description,
    };
    save_project(env, &project);

    events::emit_project_created(env, project.id, project.owner.clone(), project.token.clone());
    project
}

/// Load a project and panic with `NotAuthorized` unless `caller` owns it.
pub fn load_owned_project(env: &Env, caller: &Address, project_id: u64) -> Project {
    let project = load_project(env, project_id);
    if project.owner != *caller {
        panic_with_error!(env, Error::NotAuthorized);
    }
    project
}

pub fn update_project_description(
    env: &Env,
    caller: &Address,
    project_id: u64,
    description: BytesN<32>,
) {
    let mut project = load_owned_project(env, caller, project_id);
    project.description = description.clone();
    save_project(env, &project);

    events::emit_project_updated(env, project_id, description);
}
