//! Property tests for replay planning.

use proptest::prelude::*;

use fleek_iterative_deploy::domain::entities::{full_build_commit_message, CommitInfo};
use fleek_iterative_deploy::domain::services::ReplayPlan;

fn epoch() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(0, 0).unwrap()
}

fn commits() -> impl Strategy<Value = Vec<CommitInfo>> {
    proptest::collection::vec(any::<bool>(), 0..24).prop_map(|kinds| {
        kinds
            .into_iter()
            .enumerate()
            .map(|(i, full)| {
                let message = if full {
                    full_build_commit_message(epoch())
                } else {
                    format!("adding built files from index \"{i}\"")
                };
                CommitInfo::new(format!("{i:040x}"), message)
            })
            .collect()
    })
}

proptest! {
    /// PROPERTY: Only full-build commits are replayed, oldest first, and only
    /// the first one starts a new commit.
    #[test]
    fn property_plan_keeps_full_builds_oldest_first(commits in commits()) {
        let plan = ReplayPlan::from_newest_first(commits.clone());

        let expected: Vec<_> = commits
            .iter()
            .rev()
            .filter(|c| c.is_full_build())
            .cloned()
            .collect();
        let planned: Vec<_> = plan.steps().iter().map(|s| s.commit().clone()).collect();
        prop_assert_eq!(planned, expected);

        for (i, step) in plan.steps().iter().enumerate() {
            prop_assert_eq!(step.is_squash(), i > 0);
        }
    }
}
