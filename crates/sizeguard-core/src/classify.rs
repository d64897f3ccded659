//! Regression classifier
//!
//! Compares one produced size against the baseline. Pure and deterministic:
//!
//! | Baseline            | Produced vs baseline | Outcome     | Fails run |
//! |---------------------|----------------------|-------------|-----------|
//! | absent              | any                  | `Missing`   | yes       |
//! | present             | larger               | `Grew`      | yes       |
//! | present             | smaller              | `Shrank`    | no        |
//! | present             | equal                | `Unchanged` | no        |
//!
//! `Grew` reports `produced / baseline * 100`, `Shrank` reports
//! `baseline / produced * 100`: both express how much bigger the larger
//! of the two sizes is.

use crate::fixture::{FixtureKey, FixtureMap};

/// Outcome of comparing one key against the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Baseline never recorded this key
    Missing,
    /// Produced size exceeds the baseline
    Grew,
    /// Produced size is below the baseline
    Shrank,
    /// Sizes are equal
    Unchanged,
}

/// Where a diagnostic line belongs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Regression; written to stderr
    Failure,
    /// Informational; written to stdout
    Info,
}

/// Classification of one produced fixture
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Fixture key
    pub key: FixtureKey,
    /// Produced size in bytes
    pub produced: u64,
    /// Baseline size, if recorded
    pub baseline: Option<u64>,
    /// Outcome
    pub outcome: Outcome,
}

impl Classification {
    /// Signed byte delta, `produced - baseline`
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn delta(&self) -> Option<i64> {
        self.baseline
            .map(|baseline| self.produced as i64 - baseline as i64)
    }

    /// Percentage reported for `Grew` and `Shrank`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> Option<f64> {
        let baseline = self.baseline? as f64;
        let produced = self.produced as f64;
        match self.outcome {
            Outcome::Grew => Some(produced / baseline * 100.0),
            Outcome::Shrank => Some(baseline / produced * 100.0),
            Outcome::Missing | Outcome::Unchanged => None,
        }
    }

    /// Check if this classification fails the run
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Missing | Outcome::Grew)
    }

    /// Human-readable diagnostic, `None` for `Unchanged`
    #[must_use]
    pub fn diagnostic(&self) -> Option<(Severity, String)> {
        let key = &self.key;
        match self.outcome {
            Outcome::Missing => Some((
                Severity::Failure,
                format!("{key} not found in existing fixtures."),
            )),
            Outcome::Grew => Some((
                Severity::Failure,
                format!(
                    "{key} is larger than image in fixtures ({} bytes larger, {}%.)",
                    self.delta()?,
                    self.ratio()?
                ),
            )),
            Outcome::Shrank => Some((
                Severity::Info,
                format!(
                    "{key} is smaller than image in fixtures ({} bytes smaller, {}%.)",
                    self.delta()?,
                    self.ratio()?
                ),
            )),
            Outcome::Unchanged => None,
        }
    }
}

/// Classify one produced size against the baseline
#[must_use]
pub fn classify(key: &FixtureKey, produced: u64, baseline: &FixtureMap) -> Classification {
    let recorded = baseline.get(key);
    let outcome = match recorded {
        None => Outcome::Missing,
        Some(size) if produced > size => Outcome::Grew,
        Some(size) if produced < size => Outcome::Shrank,
        Some(_) => Outcome::Unchanged,
    };

    Classification {
        key: key.clone(),
        produced,
        baseline: recorded,
        outcome,
    }
}

/// Classify every produced key, in key order
#[must_use]
pub fn classify_all(produced: &FixtureMap, baseline: &FixtureMap) -> Vec<Classification> {
    produced
        .iter()
        .map(|(key, size)| classify(key, size, baseline))
        .collect()
}

/// Process exit status derived from a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitStatus {
    /// No missing or grown fixtures
    #[default]
    Success,
    /// At least one missing or grown fixture
    Failure,
}

impl ExitStatus {
    /// Fold classifications into a status; any failure sticks
    #[must_use]
    pub fn from_classifications<'a>(
        classifications: impl IntoIterator<Item = &'a Classification>,
    ) -> Self {
        classifications
            .into_iter()
            .fold(Self::Success, |status, c| {
                if c.is_failure() {
                    Self::Failure
                } else {
                    status
                }
            })
    }

    /// Process exit code
    #[inline]
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
        }
    }

    /// Check if successful
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline(entries: &[(&str, u64)]) -> FixtureMap {
        entries.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn grew_reports_delta_and_ratio() {
        let base = baseline(&[("a.jpg-small.jpeg", 1000)]);
        let c = classify(&"a.jpg-small.jpeg".into(), 1200, &base);

        assert_eq!(c.outcome, Outcome::Grew);
        assert_eq!(c.delta(), Some(200));
        assert!((c.ratio().unwrap() - 120.0).abs() < 1e-9);
        assert!(c.is_failure());
    }

    #[test]
    fn shrank_uses_baseline_over_produced() {
        let base = baseline(&[("a.jpg-large.jpeg", 5000)]);
        let c = classify(&"a.jpg-large.jpeg".into(), 4000, &base);

        assert_eq!(c.outcome, Outcome::Shrank);
        assert_eq!(c.delta(), Some(-1000));
        assert!((c.ratio().unwrap() - 125.0).abs() < 1e-9);
        assert!(!c.is_failure());
    }

    #[test]
    fn missing_when_absent() {
        let c = classify(&"a.jpg-small.jpeg".into(), 10, &FixtureMap::new());
        assert_eq!(c.outcome, Outcome::Missing);
        assert_eq!(c.delta(), None);
        assert_eq!(c.ratio(), None);
        assert!(c.is_failure());
    }

    #[test]
    fn unchanged_has_no_diagnostic() {
        let base = baseline(&[("a.jpg-small.jpeg", 10)]);
        let c = classify(&"a.jpg-small.jpeg".into(), 10, &base);
        assert_eq!(c.outcome, Outcome::Unchanged);
        assert!(c.diagnostic().is_none());
    }

    #[test]
    fn zero_baseline_is_present_not_missing() {
        let base = baseline(&[("a.jpg-small.jpeg", 0)]);
        let c = classify(&"a.jpg-small.jpeg".into(), 10, &base);
        assert_eq!(c.outcome, Outcome::Grew);
    }

    #[test]
    fn diagnostic_wording() {
        let base = baseline(&[("a.jpg-small.jpeg", 1000), ("a.jpg-large.jpeg", 5000)]);

        let grew = classify(&"a.jpg-small.jpeg".into(), 1200, &base);
        assert_eq!(
            grew.diagnostic(),
            Some((
                Severity::Failure,
                "a.jpg-small.jpeg is larger than image in fixtures (200 bytes larger, 120%.)"
                    .to_string()
            ))
        );

        let shrank = classify(&"a.jpg-large.jpeg".into(), 4000, &base);
        assert_eq!(
            shrank.diagnostic(),
            Some((
                Severity::Info,
                "a.jpg-large.jpeg is smaller than image in fixtures (-1000 bytes smaller, 125%.)"
                    .to_string()
            ))
        );

        let missing = classify(&"b.png-small.png".into(), 1, &base);
        assert_eq!(
            missing.diagnostic(),
            Some((
                Severity::Failure,
                "b.png-small.png not found in existing fixtures.".to_string()
            ))
        );
    }

    #[test]
    fn exit_status_folds_failures() {
        let base = baseline(&[("a", 10), ("b", 10)]);
        let shrank = classify(&"a".into(), 5, &base);
        let unchanged = classify(&"b".into(), 10, &base);
        let missing = classify(&"c".into(), 1, &base);

        assert_eq!(
            ExitStatus::from_classifications([&shrank, &unchanged]),
            ExitStatus::Success
        );
        assert_eq!(
            ExitStatus::from_classifications([&missing, &shrank]),
            ExitStatus::Failure
        );
        assert_eq!(ExitStatus::from_classifications([]), ExitStatus::Success);
        assert_eq!(ExitStatus::Failure.code(), 1);
    }

    #[test]
    fn classify_all_is_key_ordered() {
        let produced = baseline(&[("b", 1), ("a", 2)]);
        let all = classify_all(&produced, &FixtureMap::new());
        let keys: Vec<_> = all.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["a", "b"]);
    }
}
