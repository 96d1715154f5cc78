//! Vigil Test Utilities
//!
//! Shared test infrastructure for the Vigil workspace:
//! - Proptest generators for submissions, challenges, and admin operations
//! - Fixtures for common scenarios
//! - Assertions over store state

use std::sync::Arc;

// Re-export core types for convenience
pub use vigil_core::{
    Challenge, ChallengeUpdate, Counter, Intention, NewChallenge, NewIntention, PrayerKind,
    RecordId, ValidationError, VigilError, VigilResult,
};
pub use vigil_storage::{InMemoryStore, RecordStore, SharedStore, StoreStatistics};

/// A fresh in-memory store behind the shared trait object.
pub fn memory_store() -> SharedStore {
    Arc::new(InMemoryStore::new())
}

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating Vigil inputs.

    use super::*;
    use proptest::prelude::*;

    /// Any prayer kind.
    pub fn arb_prayer_kind() -> impl Strategy<Value = PrayerKind> {
        prop_oneof![
            Just(PrayerKind::HailMary),
            Just(PrayerKind::OurFather),
            Just(PrayerKind::Rosary),
        ]
    }

    /// Any counter, intention or challenge.
    pub fn arb_counter() -> impl Strategy<Value = Counter> {
        prop_oneof![
            Just(Counter::HailMary),
            Just(Counter::OurFather),
            Just(Counter::Rosary),
            Just(Counter::ChallengeProgress),
        ]
    }

    /// Non-blank intention text within the content limit.
    pub fn arb_content() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z ,.']{0,120}"
    }

    /// Optional submitter name, sometimes blank.
    pub fn arb_name() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some("   ".to_string())),
            "[A-Z][a-z]{1,20}".prop_map(Some),
        ]
    }

    /// A valid intention submission.
    pub fn arb_new_intention() -> impl Strategy<Value = NewIntention> {
        (arb_content(), arb_name(), proptest::option::of(arb_prayer_kind())).prop_filter_map(
            "submission must validate",
            |(content, name, kind)| {
                NewIntention::new(content, name, kind.map(|k| k.as_str().to_string())).ok()
            },
        )
    }

    /// A valid challenge with explicit or defaulted activation.
    pub fn arb_new_challenge() -> impl Strategy<Value = NewChallenge> {
        (
            "[A-Z][a-z]{2,30}",
            arb_prayer_kind(),
            1..10_000i32,
            proptest::option::of(any::<bool>()),
        )
            .prop_filter_map("challenge must validate", |(title, kind, target, active)| {
                NewChallenge::new(title, kind.as_str(), target, active).ok()
            })
    }

    /// A valid partial update, possibly touching only the active flag.
    pub fn arb_challenge_update() -> impl Strategy<Value = ChallengeUpdate> {
        (
            proptest::option::of("[A-Z][a-z]{2,30}"),
            proptest::option::of(1..10_000i32),
            proptest::option::of(0..10_000i32),
            proptest::option::of(any::<bool>()),
        )
            .prop_map(|(title, total_target, current_count, is_active)| ChallengeUpdate {
                title,
                prayer_type: None,
                total_target,
                current_count,
                is_active,
            })
    }

    /// One admin operation against the challenge table.
    ///
    /// `Update`, `Activate` and `Delete` carry an index that is resolved
    /// modulo the number of challenges created so far.
    #[derive(Debug, Clone)]
    pub enum ChallengeOp {
        Create(NewChallenge),
        Update(usize, ChallengeUpdate),
        Activate(usize),
        Delete(usize),
    }

    pub fn arb_challenge_op() -> impl Strategy<Value = ChallengeOp> {
        prop_oneof![
            3 => arb_new_challenge().prop_map(ChallengeOp::Create),
            2 => (any::<usize>(), arb_challenge_update())
                .prop_map(|(idx, update)| ChallengeOp::Update(idx, update)),
            2 => any::<usize>().prop_map(ChallengeOp::Activate),
            1 => any::<usize>().prop_map(ChallengeOp::Delete),
        ]
    }

    /// A sequence of admin operations.
    pub fn arb_challenge_ops(max_len: usize) -> impl Strategy<Value = Vec<ChallengeOp>> {
        proptest::collection::vec(arb_challenge_op(), 1..max_len)
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Fixed inputs for common scenarios.

    use super::*;
    use serde_json::{json, Value};

    /// `{content: "Test", name: "Anon"}` as a validated submission.
    pub fn anon_intention() -> NewIntention {
        NewIntention {
            content: "Test".to_string(),
            name: Some("Anon".to_string()),
            prayer_type: None,
        }
    }

    /// An active rosary challenge with the given target.
    pub fn rosary_challenge(title: &str, total_target: i32) -> NewChallenge {
        NewChallenge {
            title: title.to_string(),
            prayer_type: PrayerKind::Rosary.as_str().to_string(),
            total_target,
            is_active: None,
        }
    }

    /// An explicitly inactive challenge.
    pub fn inactive_challenge(title: &str) -> NewChallenge {
        NewChallenge {
            is_active: Some(false),
            ..rosary_challenge(title, 100)
        }
    }

    /// JSON body for `POST /api/intentions`.
    pub fn intention_body(content: &str, name: Option<&str>) -> Value {
        json!({ "content": content, "name": name })
    }

    /// JSON body for `POST /api/admin/challenges`.
    pub fn challenge_body(title: &str, total_target: i32, is_active: Option<bool>) -> Value {
        let mut body = json!({
            "title": title,
            "prayerType": "rosary",
            "totalTarget": total_target,
        });
        if let Some(active) = is_active {
            body["isActive"] = json!(active);
        }
        body
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over store state.

    use super::*;

    /// Assert that the store holds at most one active challenge.
    pub fn assert_at_most_one_active(stats: &StoreStatistics) {
        assert!(
            stats.active_challenge_count <= 1,
            "expected at most one active challenge, found {}",
            stats.active_challenge_count
        );
    }

    /// Assert that exactly `expected` is marked active in `challenges`.
    pub fn assert_only_active(challenges: &[Challenge], expected: RecordId) {
        let active: Vec<RecordId> = challenges
            .iter()
            .filter(|c| c.is_active)
            .map(|c| c.id)
            .collect();
        assert_eq!(active, vec![expected], "unexpected active set");
    }

    /// Assert that an intention has never been prayed for or printed.
    pub fn assert_fresh_intention(intention: &Intention) {
        assert!(intention.id > 0, "id must be generated");
        assert_eq!(intention.hail_mary_count, 0);
        assert_eq!(intention.our_father_count, 0);
        assert_eq!(intention.rosary_count, 0);
        assert!(!intention.is_printed);
    }

    /// Assert that a result is a validation failure on `field`.
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &VigilResult<T>, field: &str) {
        match result {
            Err(VigilError::Validation(e)) => assert_eq!(e.field(), field),
            other => panic!("expected validation error on {}, got {:?}", field, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn generated_challenges_are_valid(new in arb_new_challenge()) {
            prop_assert!(new.total_target > 0);
            prop_assert!(!new.title.trim().is_empty());
        }

        #[test]
        fn generated_updates_validate(update in arb_challenge_update()) {
            prop_assert!(update.validated().is_ok());
        }

        #[test]
        fn generated_intentions_keep_content(new in arb_new_intention()) {
            prop_assert!(!new.content.is_empty());
            prop_assert!(new.name.as_deref().map_or(true, |n| !n.trim().is_empty()));
        }
    }

    #[test]
    fn fixture_challenge_body_omits_unset_activation() {
        let body = fixtures::challenge_body("Week 1", 50, None);
        assert!(body.get("isActive").is_none());
        let body = fixtures::challenge_body("Week 2", 50, Some(false));
        assert_eq!(body["isActive"], false);
    }
}
