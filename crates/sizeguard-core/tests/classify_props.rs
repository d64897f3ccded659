//! Property tests for baseline classification

use proptest::prelude::*;
use sizeguard_core::{classify, classify_all, ExitStatus, FixtureKey, FixtureMap, Outcome};

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}\\.(jpg|png)-(small|medium|large)\\.(jpeg|png|webp|avif)"
}

proptest! {
    #[test]
    fn outcome_follows_size_ordering(produced in 0u64..1_000_000, recorded in 0u64..1_000_000) {
        let key = FixtureKey::from("a.jpg-small.jpeg");
        let baseline: FixtureMap = [(key.clone(), recorded)].into_iter().collect();
        let c = classify(&key, produced, &baseline);

        let expected = match produced.cmp(&recorded) {
            std::cmp::Ordering::Greater => Outcome::Grew,
            std::cmp::Ordering::Less => Outcome::Shrank,
            std::cmp::Ordering::Equal => Outcome::Unchanged,
        };
        prop_assert_eq!(c.outcome, expected);
        prop_assert_eq!(c.delta(), Some(produced as i64 - recorded as i64));
    }

    #[test]
    fn absent_key_is_always_missing(produced in any::<u32>(), others in prop::collection::btree_map(key_strategy(), any::<u32>(), 0..8)) {
        let baseline: FixtureMap = others
            .into_iter()
            .filter(|(k, _)| k != "zzz.png-small.png")
            .map(|(k, v)| (k, u64::from(v)))
            .collect();
        let key = FixtureKey::from("zzz.png-small.png");

        let c = classify(&key, u64::from(produced), &baseline);
        prop_assert_eq!(c.outcome, Outcome::Missing);
        prop_assert!(c.is_failure());
    }

    #[test]
    fn status_fails_iff_any_key_missing_or_grew(
        produced in prop::collection::btree_map(key_strategy(), 0u64..10_000, 0..12),
        baseline in prop::collection::btree_map(key_strategy(), 0u64..10_000, 0..12),
    ) {
        let produced: FixtureMap = produced.into_iter().collect();
        let baseline: FixtureMap = baseline.into_iter().collect();
        let classifications = classify_all(&produced, &baseline);

        prop_assert_eq!(classifications.len(), produced.len());

        let any_failure = produced.iter().any(|(key, size)| match baseline.get(key) {
            None => true,
            Some(recorded) => size > recorded,
        });
        let status = ExitStatus::from_classifications(&classifications);
        prop_assert_eq!(status.is_success(), !any_failure);
    }

    #[test]
    fn baseline_only_keys_never_classified(
        baseline in prop::collection::btree_map(key_strategy(), 0u64..10_000, 1..12),
    ) {
        let baseline: FixtureMap = baseline.into_iter().collect();
        let classifications = classify_all(&FixtureMap::new(), &baseline);

        prop_assert!(classifications.is_empty());
        prop_assert_eq!(ExitStatus::from_classifications(&classifications), ExitStatus::Success);
    }
}
