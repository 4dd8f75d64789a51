extern crate std;

use soroban_sdk::{testutils::Address as _, Address};

use crate::invariants::{assert_depo_non_negative, assert_version_bumped};
use crate::test_utils::{setup, DARF_RESERVE, DARF_SHARE_PCT, FUNDING, RATE};
use crate::Error;

/// Deposit credited for a first funding of `amount`.
fn credited_on_signup(amount: i128) -> i128 {
    amount - amount / 100 * 10
}

#[test]
fn test_init_twice_fails() {
    let f = setup();
    let result = f.client.try_init(
        &f.beneficiary,
        &f.darf.address,
        &f.native.address,
        &f.project_token.address,
        &RATE,
        &0,
        &DARF_SHARE_PCT,
        &0,
    );
    assert_eq!(result, Err(Ok(Error::AlreadyInitialized.into())));
}

#[test]
fn test_pool_starts_empty_with_version_one() {
    let f = setup();
    let pool = f.client.get_pool();

    assert_eq!(pool.deposit_total, 0);
    assert_eq!(pool.settings.beneficiary, f.beneficiary);
    assert_eq!(pool.settings.darf_token, f.darf.address);
    assert_eq!(pool.settings.native_token, f.native.address);
    assert_eq!(pool.conditions.version, 1);
    assert_eq!(pool.conditions.exchange_rate, RATE);
}

#[test]
fn test_first_funding_signs_up_and_withholds_fee() {
    let f = setup();
    let funder = f.funded_address(FUNDING);
    assert!(!f.client.signup_status(&funder));

    let tokens = f.client.receive_funds(&funder, &FUNDING);

    assert_eq!(tokens, FUNDING * RATE);
    assert!(f.client.signup_status(&funder));
    assert_eq!(f.darf.balance(&funder), FUNDING * RATE);
    assert_eq!(f.native.balance(&funder), 0);
    assert_eq!(f.native.balance(&f.client.address), FUNDING);
    assert_eq!(f.darf.balance(&f.client.address), DARF_RESERVE - FUNDING * RATE);
    assert_eq!(f.client.deposit_balance(), credited_on_signup(FUNDING));
}

#[test]
fn test_repeat_funding_credits_full_amount() {
    let f = setup();
    let funder = f.funded_address(3 * FUNDING);

    f.client.receive_funds(&funder, &FUNDING);
    let after_signup = f.client.deposit_balance();
    f.client.receive_funds(&funder, &(2 * FUNDING));

    assert!(f.client.signup_status(&funder));
    assert_eq!(f.client.deposit_balance(), after_signup + 2 * FUNDING);
    assert_eq!(f.darf.balance(&funder), 3 * FUNDING * RATE);
}

#[test]
fn test_funding_keeps_project_owner_flag() {
    let f = setup();
    let user = f.funded_address(FUNDING);
    f.client.set_project_owner(&f.beneficiary, &user, &true);

    f.client.receive_funds(&user, &FUNDING);

    let record = f.client.get_user(&user);
    assert!(record.signed_up);
    assert!(record.is_project_owner);
}

#[test]
fn test_funding_rejects_non_positive_amount() {
    let f = setup();
    let funder = f.funded_address(FUNDING);

    assert_eq!(
        f.client.try_receive_funds(&funder, &0),
        Err(Ok(Error::InvalidAmount.into()))
    );
    assert_eq!(
        f.client.try_receive_funds(&funder, &-5),
        Err(Ok(Error::InvalidAmount.into()))
    );
}

#[test]
fn test_funding_requires_token_reserve() {
    let f = setup();
    let amount = DARF_RESERVE / RATE + 1;
    let funder = f.funded_address(amount);

    let result = f.client.try_receive_funds(&funder, &amount);

    assert_eq!(result, Err(Ok(Error::InsufficientTokenReserve.into())));
    assert!(!f.client.signup_status(&funder));
    assert_eq!(f.client.deposit_balance(), 0);
}

#[test]
fn test_funding_exactly_the_reserve_succeeds() {
    let f = setup();
    let amount = DARF_RESERVE / RATE;
    let funder = f.funded_address(amount);

    f.client.receive_funds(&funder, &amount);

    assert_eq!(f.darf.balance(&f.client.address), 0);
}

#[test]
fn test_redeem_signed_up_pays_full_rate() {
    let f = setup();
    let holder = f.signed_up_user();
    let depo_before = f.client.deposit_balance();

    let payout = f.client.exchange_darf_for_eth(&holder, &100_000);

    assert_eq!(payout, 100_000 / RATE);
    assert_eq!(f.native.balance(&holder), payout);
    assert_eq!(f.darf.balance(&holder), FUNDING * RATE - 100_000);
    assert_eq!(f.client.deposit_balance(), depo_before - payout);
}

#[test]
fn test_redeem_first_time_charges_flat_fee_and_signs_up() {
    let f = setup();
    let funder = f.signed_up_user();
    let holder = Address::generate(&f.env);
    f.darf.transfer(&funder, &holder, &10_000);
    let depo_before = f.client.deposit_balance();

    let payout = f.client.exchange_darf_for_eth(&holder, &5_010);

    assert_eq!(payout, (5_010 - 10) / RATE);
    assert!(f.client.signup_status(&holder));
    assert_eq!(f.native.balance(&holder), payout);
    assert_eq!(f.client.deposit_balance(), depo_before - payout);
}

#[test]
fn test_redeem_requires_balance_above_amount() {
    let f = setup();
    let funder = f.signed_up_user();
    let holder = Address::generate(&f.env);
    f.darf.transfer(&funder, &holder, &10_000);

    assert_eq!(
        f.client.try_exchange_darf_for_eth(&holder, &10_000),
        Err(Ok(Error::InsufficientBalance.into()))
    );
    assert!(!f.client.signup_status(&holder));
}

#[test]
fn test_redeem_cannot_overdraw_pool() {
    let f = setup();
    let holder = f.signed_up_user();
    let depo = f.client.deposit_balance();
    // Payout would be FUNDING - 1, above the 90% that was credited.
    let sum = (FUNDING - 1) * RATE;
    assert!(sum / RATE > depo);

    let result = f.client.try_exchange_darf_for_eth(&holder, &sum);

    assert_eq!(result, Err(Ok(Error::InsufficientDeposit.into())));
    assert_eq!(f.client.deposit_balance(), depo);
    assert_depo_non_negative(f.client.deposit_balance());
}

#[test]
fn test_redeem_rejects_zero_payout() {
    let f = setup();
    let holder = f.signed_up_user();

    assert_eq!(
        f.client.try_exchange_darf_for_eth(&holder, &(RATE - 1)),
        Err(Ok(Error::InvalidAmount.into()))
    );
    assert_eq!(
        f.client.try_exchange_darf_for_eth(&holder, &0),
        Err(Ok(Error::InvalidAmount.into()))
    );
}

#[test]
fn test_change_conditions_by_beneficiary() {
    let f = setup();
    let before = f.client.get_conditions();

    let after = f.client.change_conditions(&f.beneficiary, &250, &2_000, &20);

    assert_version_bumped(&before, &after);
    assert_eq!(after.exchange_rate, 250);
    assert_eq!(after.token_share_bps, 2_000);
    assert_eq!(after.darf_share_pct, 20);
    assert_eq!(after.decide_vote_bps, before.decide_vote_bps);
    assert_eq!(f.client.get_conditions(), after);
}

#[test]
fn test_change_conditions_rejects_everyone_else() {
    let f = setup();
    let stranger = f.signed_up_user();

    assert_eq!(
        f.client.try_change_conditions(&stranger, &250, &2_000, &20),
        Err(Ok(Error::NotAuthorized.into()))
    );
    assert_eq!(f.client.get_conditions().version, 1);
}

#[test]
fn test_change_conditions_validates_values() {
    let f = setup();

    assert_eq!(
        f.client.try_change_conditions(&f.beneficiary, &0, &2_000, &20),
        Err(Ok(Error::InvalidConditions.into()))
    );
    assert_eq!(
        f.client.try_change_conditions(&f.beneficiary, &250, &10_001, &20),
        Err(Ok(Error::InvalidConditions.into()))
    );
    assert_eq!(
        f.client.try_change_conditions(&f.beneficiary, &250, &2_000, &101),
        Err(Ok(Error::InvalidConditions.into()))
    );
}

#[test]
fn test_new_rate_applies_to_next_funding() {
    let f = setup();
    f.client.change_conditions(&f.beneficiary, &100, &0, &10);
    let funder = f.funded_address(FUNDING);

    let tokens = f.client.receive_funds(&funder, &FUNDING);

    assert_eq!(tokens, FUNDING * 100);
}

#[test]
fn test_set_project_owner_is_beneficiary_only() {
    let f = setup();
    let user = f.signed_up_user();
    let stranger = f.signed_up_user();

    assert_eq!(
        f.client.try_set_project_owner(&stranger, &user, &true),
        Err(Ok(Error::NotAuthorized.into()))
    );
    assert!(!f.client.get_user(&user).is_project_owner);

    f.client.set_project_owner(&f.beneficiary, &user, &true);
    assert!(f.client.get_user(&user).is_project_owner);

    f.client.set_project_owner(&f.beneficiary, &user, &false);
    assert!(!f.client.get_user(&user).is_project_owner);
    assert!(f.client.get_user(&user).signed_up);
}
