#![allow(dead_code)]

extern crate std;

use crate::types::{Conditions, Project, UserStory, UserStoryStatus};

/// INV-1: The deposit pool must never be negative.
pub fn assert_depo_non_negative(depo: i128) {
    assert!(depo >= 0, "INV-1 violated: deposit pool is negative ({})", depo);
}

/// INV-2: `start_timestamp` is set exactly when both sides have signed in.
///
/// Only meaningful while the ledger clock is non-zero, which every fixture
/// guarantees.
pub fn assert_start_timestamp_consistent(story: &UserStory) {
    assert_eq!(
        story.is_started(),
        story.start_timestamp != 0,
        "INV-2 violated: story {} has user_signed_in={}, project_signed_in={}, start_timestamp={}",
        story.id,
        story.user_signed_in,
        story.project_signed_in,
        story.start_timestamp
    );
}

/// INV-3: Once set, `start_timestamp` never changes.
pub fn assert_start_timestamp_stable(before: &UserStory, after: &UserStory) {
    if before.start_timestamp != 0 {
        assert_eq!(
            before.start_timestamp, after.start_timestamp,
            "INV-3 violated: story {} start_timestamp moved",
            before.id
        );
    }
}

/// INV-4: Project IDs are sequential starting from 0.
pub fn assert_sequential_ids(projects: &[Project]) {
    for (i, project) in projects.iter().enumerate() {
        assert_eq!(
            project.id, i as u64,
            "INV-4 violated: expected id {}, got {}",
            i, project.id
        );
    }
}

/// INV-5: Story fields fixed at creation never change.
pub fn assert_story_immutable_fields(original: &UserStory, current: &UserStory) {
    assert_eq!(original.id, current.id, "INV-5 violated: story id changed");
    assert_eq!(
        original.project_id, current.project_id,
        "INV-5 violated: story project_id changed"
    );
    assert_eq!(
        original.author, current.author,
        "INV-5 violated: story author changed"
    );
    assert_eq!(
        original.content, current.content,
        "INV-5 violated: story content changed"
    );
    assert_eq!(
        original.duration, current.duration,
        "INV-5 violated: story duration changed"
    );
    assert_eq!(
        original.amount_darf_requested, current.amount_darf_requested,
        "INV-5 violated: story amount_darf_requested changed"
    );
}

/// INV-6: Status never moves back before `Active` once a story started, and
/// `CompletedByUser` is terminal.
pub fn assert_valid_status_transition(from: &UserStoryStatus, to: &UserStoryStatus) {
    let started = |s: &UserStoryStatus| {
        matches!(
            s,
            UserStoryStatus::Active
                | UserStoryStatus::CompletedByProject
                | UserStoryStatus::CompletedByUser
                | UserStoryStatus::RefundEligible
        )
    };

    let valid = match from {
        UserStoryStatus::CompletedByUser => *to == UserStoryStatus::CompletedByUser,
        s if started(s) => started(to),
        _ => true,
    };

    assert!(
        valid,
        "INV-6 violated: invalid status transition from {:?} to {:?}",
        from, to
    );
}

/// INV-7: Every configuration change bumps the version by exactly one.
pub fn assert_version_bumped(before: &Conditions, after: &Conditions) {
    assert_eq!(
        after.version,
        before.version + 1,
        "INV-7 violated: version went from {} to {}",
        before.version,
        after.version
    );
}
