//! # Escrow
//!
//! The native-currency deposit pool ("depo") and the DARF exchange.
//!
//! Funding pulls native units from the caller and pays DARF back at
//! `Conditions::exchange_rate`; redemption does the reverse. The first
//! funding interaction of an address signs it up and costs a fee: 10% of
//! the credited deposit when funding, a flat 10 DARF when redeeming.
//!
//! The pool total is only ever changed through [`credit_depo`] and
//! [`debit_depo`], which keep it within `0..=i128::MAX`.

use soroban_sdk::{panic_with_error, token, Address, Env};

use crate::events;
use crate::storage::{
    get_depo, is_initialized, load_conditions, load_settings, load_user, save_conditions,
    save_settings, save_user, set_depo,
};
use crate::types::{Conditions, PoolSettings};
use crate::Error;

/// Percentage of a first deposit withheld from the pool.
pub const SIGNUP_FEE_PERCENT: i128 = 10;
/// DARF withheld from a first redemption before conversion.
pub const REDEEM_SIGNUP_FEE: i128 = 10;
pub const MAX_BPS: u32 = 10_000;

pub fn init_pool(env: &Env, settings: PoolSettings, conditions: Conditions) {
    if is_initialized(env) {
        panic_with_error!(env, Error::AlreadyInitialized);
    }
    validate_conditions(env, &conditions);

    save_settings(env, &settings);
    save_conditions(env, &conditions);
    set_depo(env, 0);
}

fn validate_conditions(env: &Env, conditions: &Conditions) {
    if conditions.exchange_rate <= 0
        || conditions.darf_share_pct > 100
        || conditions.token_share_bps > MAX_BPS
        || conditions.decide_vote_bps > MAX_BPS
    {
        panic_with_error!(env, Error::InvalidConditions);
    }
}

/// Panics with `NotAuthorized` unless `caller` is the pool beneficiary.
pub fn require_beneficiary(env: &Env, caller: &Address) {
    if *caller != load_settings(env).beneficiary {
        panic_with_error!(env, Error::NotAuthorized);
    }
}

pub fn credit_depo(env: &Env, amount: i128) {
    let total = get_depo(env)
        .checked_add(amount)
        .unwrap_or_else(|| panic_with_error!(env, Error::ArithmeticOverflow));
    set_depo(env, total);
}

/// Panics with `InsufficientDeposit` rather than letting the pool go negative.
pub fn debit_depo(env: &Env, amount: i128) {
    let depo = get_depo(env);
    if amount > depo {
        panic_with_error!(env, Error::InsufficientDeposit);
    }
    set_depo(env, depo - amount);
}

/// Accept `amount` native units from `funder` and pay DARF back.
///
/// Returns the DARF amount paid.
pub fn receive_funds(env: &Env, funder: &Address, amount: i128) -> i128 {
    if amount <= 0 {
        panic_with_error!(env, Error::InvalidAmount);
    }

    let settings = load_settings(env);
    let conditions = load_conditions(env);
    let tokens = amount
        .checked_mul(conditions.exchange_rate)
        .unwrap_or_else(|| panic_with_error!(env, Error::ArithmeticOverflow));

    let contract = env.current_contract_address();
    let darf = token::Client::new(env, &settings.darf_token);
    if darf.balance(&contract) < tokens {
        panic_with_error!(env, Error::InsufficientTokenReserve);
    }

    token::Client::new(env, &settings.native_token).transfer(funder, &contract, &amount);
    darf.transfer(&contract, funder, &tokens);

    let mut user = load_user(env, funder);
    let first_signup = !user.signed_up;
    let credited = if first_signup {
        user.signed_up = true;
        save_user(env, funder, &user);
        amount - amount / 100 * SIGNUP_FEE_PERCENT
    } else {
        amount
    };
    credit_depo(env, credited);

    events::emit_funds_received(env, funder.clone(), amount, tokens, first_signup);
    tokens
}

/// Redeem `sum_darf` DARF held by `holder` for native units.
///
/// Returns the native amount paid out.
pub fn exchange_darf_for_eth(env: &Env, holder: &Address, sum_darf: i128) -> i128 {
    if sum_darf <= 0 {
        panic_with_error!(env, Error::InvalidAmount);
    }

    let settings = load_settings(env);
    let conditions = load_conditions(env);
    let darf = token::Client::new(env, &settings.darf_token);
    if darf.balance(holder) <= sum_darf {
        panic_with_error!(env, Error::InsufficientBalance);
    }

    let mut user = load_user(env, holder);
    let first_signup = !user.signed_up;
    let redeemable = if first_signup {
        sum_darf - REDEEM_SIGNUP_FEE
    } else {
        sum_darf
    };
    let payout = redeemable / conditions.exchange_rate;
    if payout <= 0 {
        panic_with_error!(env, Error::InvalidAmount);
    }

    let contract = env.current_contract_address();
    let native = token::Client::new(env, &settings.native_token);
    if native.balance(&contract) < payout {
        panic_with_error!(env, Error::InsufficientDeposit);
    }

    darf.transfer(holder, &contract, &sum_darf);
    native.transfer(&contract, holder, &payout);
    debit_depo(env, payout);

    if first_signup {
        user.signed_up = true;
        save_user(env, holder, &user);
    }

    events::emit_darf_redeemed(env, holder.clone(), sum_darf, payout, first_signup);
    payout
}

/// Overwrite the rate and share fields and bump the configuration version.
pub fn change_conditions(
    env: &Env,
    caller: &Address,
    exchange_rate: i128,
    token_share_bps: u32,
    darf_share_pct: u32,
) -> Conditions {
    require_beneficiary(env, caller);

    let current = load_conditions(env);
    let next = Conditions {
        version: current.version + 1,
        exchange_rate,
        token_share_bps,
        darf_share_pct,
        decide_vote_bps: current.decide_vote_bps,
    };
    validate_conditions(env, &next);
    save_conditions(env, &next);

    events::emit_conditions_changed(
        env,
        next.version,
        exchange_rate,
        token_share_bps,
        darf_share_pct,
    );
    next
}

pub fn set_project_owner(env: &Env, caller: &Address, target: &Address, is_owner: bool) {
    require_beneficiary(env, caller);

    let mut user = load_user(env, target);
    user.is_project_owner = is_owner;
    save_user(env, target, &user);

    events::emit_project_owner_set(env, target.clone(), is_owner);
}
