extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::Events,
    vec, Env, IntoVal, TryIntoVal, Val, Vec,
};

use crate::events::{
    ConditionsChanged, FundsReceived, ProjectCreated, RefundRequested, UserStoryPaidOut,
    UserStorySigned, UserStoryStarted,
};
use crate::test_utils::{setup, FUNDING, RATE, START_TIME, STORY_DURATION};

fn last_event(env: &Env) -> (Vec<Val>, Val) {
    let all_events = env.events().all();
    let (_, topics, data) = all_events.last().expect("No events found");
    (topics, data)
}

#[test]
fn test_funds_received_event() {
    let f = setup();
    let funder = f.funded_address(FUNDING);

    f.client.receive_funds(&funder, &FUNDING);

    let all_events = f.env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: (symbol_short!("funded"),)
    assert_eq!(last_event.0, f.client.address);
    let expected_topics = vec![&f.env, symbol_short!("funded").into_val(&f.env)];
    assert_eq!(last_event.1, expected_topics);

    let event_data: FundsReceived = last_event.2.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        FundsReceived {
            funder: funder.clone(),
            amount: FUNDING,
            tokens: FUNDING * RATE,
            first_signup: true,
        }
    );

    f.mint(&f.native.address, &funder, FUNDING);
    f.client.receive_funds(&funder, &FUNDING);
    let (_, data) = self::last_event(&f.env);
    let event_data: FundsReceived = data.try_into_val(&f.env).unwrap();
    assert!(!event_data.first_signup);
}

#[test]
fn test_project_created_event() {
    let f = setup();
    let owner = f.project_owner();

    let project = f.create_project(&owner);

    let (topics, data) = last_event(&f.env);
    let expected_topics = vec![
        &f.env,
        symbol_short!("created").into_val(&f.env),
        project.id.into_val(&f.env),
    ];
    assert_eq!(topics, expected_topics);

    let event_data: ProjectCreated = data.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        ProjectCreated {
            project_id: project.id,
            owner: owner.clone(),
            token: f.project_token.address.clone(),
        }
    );
}

#[test]
fn test_signed_then_started_events() {
    let f = setup();
    let owner = f.project_owner();
    let author = f.signed_up_user();
    let project = f.create_project(&owner);
    let story = f.start_story(&author, project.id, 1_000);

    f.client.sign_in_user_story_from_user(&author, &story);

    let (topics, data) = last_event(&f.env);
    assert_eq!(
        topics,
        vec![
            &f.env,
            symbol_short!("signed").into_val(&f.env),
            story.into_val(&f.env),
        ]
    );
    let signed: UserStorySigned = data.try_into_val(&f.env).unwrap();
    assert_eq!(
        signed,
        UserStorySigned {
            story_id: story,
            signer: author.clone(),
            from_project: false,
        }
    );

    f.client.sign_in_user_story_from_project(&owner, &story);

    let (topics, data) = last_event(&f.env);
    assert_eq!(
        topics,
        vec![
            &f.env,
            symbol_short!("started").into_val(&f.env),
            story.into_val(&f.env),
        ]
    );
    let started: UserStoryStarted = data.try_into_val(&f.env).unwrap();
    assert_eq!(
        started,
        UserStoryStarted {
            story_id: story,
            start_timestamp: START_TIME,
            deadline: START_TIME + STORY_DURATION,
        }
    );
}

#[test]
fn test_user_end_event() {
    let f = setup();
    let (owner, author, story) = f.active_story(1_000);

    f.client.confirm_end_from_user(&author, &story);

    let (topics, data) = last_event(&f.env);
    assert_eq!(
        topics,
        vec![
            &f.env,
            symbol_short!("user_end").into_val(&f.env),
            story.into_val(&f.env),
        ]
    );
    let paid: UserStoryPaidOut = data.try_into_val(&f.env).unwrap();
    assert_eq!(
        paid,
        UserStoryPaidOut {
            story_id: story,
            recipient: owner.clone(),
            amount: 100,
            depo_release: 0,
        }
    );
}

#[test]
fn test_refund_event() {
    let f = setup();
    let (_owner, author, story) = f.active_story(1_000);
    f.set_time(START_TIME + STORY_DURATION + 1);

    f.client.userstory_fail_refund(&author, &story);

    let (topics, data) = last_event(&f.env);
    assert_eq!(
        topics,
        vec![
            &f.env,
            symbol_short!("refund").into_val(&f.env),
            story.into_val(&f.env),
        ]
    );
    let refund: RefundRequested = data.try_into_val(&f.env).unwrap();
    assert_eq!(
        refund,
        RefundRequested {
            story_id: story,
            author: author.clone(),
            amount: 1_000,
        }
    );
}

#[test]
fn test_conditions_changed_event() {
    let f = setup();

    f.client.change_conditions(&f.beneficiary, &250, &2_000, &20);

    let (topics, data) = last_event(&f.env);
    assert_eq!(topics, vec![&f.env, symbol_short!("cond_chg").into_val(&f.env)]);
    let changed: ConditionsChanged = data.try_into_val(&f.env).unwrap();
    assert_eq!(
        changed,
        ConditionsChanged {
            version: 2,
            exchange_rate: 250,
            token_share_bps: 2_000,
            darf_share_pct: 20,
        }
    );
}

#[test]
fn test_completing_sign_in_publishes_signed_then_started() {
    let f = setup();
    let owner = f.project_owner();
    let author = f.signed_up_user();
    let project = f.create_project(&owner);
    let story = f.start_story(&author, project.id, 1_000);
    f.client.sign_in_user_story_from_project(&owner, &story);

    f.client.sign_in_user_story_from_user(&author, &story);

    let topics: std::vec::Vec<Vec<Val>> = f
        .env
        .events()
        .all()
        .iter()
        .filter(|(contract, _, _)| *contract == f.client.address)
        .map(|(_, topics, _)| topics)
        .collect();
    let tail = &topics[topics.len() - 2..];
    assert_eq!(
        tail[0],
        vec![&f.env, symbol_short!("signed").into_val(&f.env), story.into_val(&f.env)]
    );
    assert_eq!(
        tail[1],
        vec![&f.env, symbol_short!("started").into_val(&f.env), story.into_val(&f.env)]
    );
}
