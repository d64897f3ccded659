//! Run phases
//!
//! A run moves strictly forward through its phases; the whole corpus is
//! transcoded before anything is reported or classified.

use crate::error::PhaseError;

/// Phase of a harness run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RunPhase {
    /// Choosing which corpus images to process
    Selecting,
    /// Fan-out to the transcoder
    Transcoding,
    /// Emitting the size table
    Reporting,
    /// Comparing produced sizes with the baseline
    Classifying,
    /// Baseline rewrite and exit status
    Finalizing,
}

impl RunPhase {
    /// Phase that follows this one
    #[must_use]
    pub fn next(self) -> Option<Self> {
        use RunPhase::*;
        match self {
            Selecting => Some(Transcoding),
            Transcoding => Some(Reporting),
            Reporting => Some(Classifying),
            Classifying => Some(Finalizing),
            Finalizing => None,
        }
    }
}

/// Validates a phase transition
pub fn validate_transition(from: RunPhase, to: RunPhase) -> Result<(), PhaseError> {
    if from.next() == Some(to) {
        Ok(())
    } else {
        Err(PhaseError::IllegalTransition { from, to })
    }
}

/// Tracks the current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTracker {
    current: RunPhase,
}

impl PhaseTracker {
    /// Start in `Selecting`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: RunPhase::Selecting,
        }
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn current(&self) -> RunPhase {
        self.current
    }

    /// Move to `to`
    ///
    /// # Errors
    /// - `PhaseError::IllegalTransition` unless `to` directly follows the current phase
    pub fn advance(&mut self, to: RunPhase) -> Result<(), PhaseError> {
        validate_transition(self.current, to)?;
        tracing::info!(from = ?self.current, to = ?to, "phase");
        self.current = to;
        Ok(())
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn full_sequence() {
        let mut tracker = PhaseTracker::new();
        for phase in [
            RunPhase::Transcoding,
            RunPhase::Reporting,
            RunPhase::Classifying,
            RunPhase::Finalizing,
        ] {
            tracker.advance(phase).unwrap();
        }
        assert_eq!(tracker.current(), RunPhase::Finalizing);
    }

    #[test]
    fn cannot_skip_transcoding() {
        let mut tracker = PhaseTracker::new();
        assert!(tracker.advance(RunPhase::Classifying).is_err());
        assert_eq!(tracker.current(), RunPhase::Selecting);
    }

    fn any_phase() -> impl Strategy<Value = RunPhase> {
        prop_oneof![
            Just(RunPhase::Selecting),
            Just(RunPhase::Transcoding),
            Just(RunPhase::Reporting),
            Just(RunPhase::Classifying),
            Just(RunPhase::Finalizing),
        ]
    }

    proptest! {
        #[test]
        fn prop_transitions_only_move_forward_by_one(from in any_phase(), to in any_phase()) {
            let ok = validate_transition(from, to).is_ok();
            prop_assert_eq!(ok, from < to && from.next() == Some(to));
        }
    }
}
