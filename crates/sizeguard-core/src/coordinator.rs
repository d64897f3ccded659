//! Run coordinator
//!
//! Drives one harness run:
//! 1. **Selecting**: load the baseline, then the selected corpus images
//! 2. **Transcoding**: fan every (image, variant) out at once, join once;
//!    then write artifacts best-effort
//! 3. **Reporting**: print the size table
//! 4. **Classifying**: compare every produced key with the baseline
//! 5. **Finalizing**: rewrite the baseline in update mode, derive exit status

use crate::artifact::{ArtifactReport, ArtifactWriter};
use crate::baseline::BaselineStore;
use crate::classify::{classify_all, Classification, ExitStatus, Outcome};
use crate::config::HarnessConfig;
use crate::corpus::Corpus;
use crate::error::HarnessResult;
use crate::fixture::FixtureMap;
use crate::output::RunOutput;
use crate::phase::{PhaseTracker, RunPhase};
use crate::report::SizeTable;
use crate::transcode::{TranscodeInvoker, Transcoder};
use crate::variant::VariantCatalog;
use std::sync::Arc;

/// Everything a finished run produced
#[derive(Debug)]
pub struct RunOutcome {
    /// Exit status
    pub status: ExitStatus,
    /// Number of images processed
    pub images_processed: usize,
    /// Freshly produced sizes
    pub produced: FixtureMap,
    /// Per-key classifications, in key order
    pub classifications: Vec<Classification>,
    /// Artifact write results
    pub artifacts: ArtifactReport,
    /// Whether the baseline snapshot was rewritten
    pub baseline_updated: bool,
}

impl RunOutcome {
    /// Count of classifications with `outcome`
    #[must_use]
    pub fn count(&self, outcome: Outcome) -> usize {
        self.classifications
            .iter()
            .filter(|c| c.outcome == outcome)
            .count()
    }
}

/// Orchestrates a full harness run
pub struct RunCoordinator {
    config: HarnessConfig,
    catalog: VariantCatalog,
    transcoder: Arc<dyn Transcoder>,
}

impl std::fmt::Debug for RunCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunCoordinator")
            .field("config", &self.config)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl RunCoordinator {
    /// Coordinator using the standard variant catalog
    #[inline]
    #[must_use]
    pub fn new(config: HarnessConfig, transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            config,
            catalog: VariantCatalog::standard(),
            transcoder,
        }
    }

    /// With a custom variant catalog
    #[inline]
    #[must_use]
    pub fn with_catalog(mut self, catalog: VariantCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Get variant catalog
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &VariantCatalog {
        &self.catalog
    }

    /// Execute the run, writing the table and diagnostics to `out`
    ///
    /// Regressions are not errors: they are reported and reflected in
    /// [`RunOutcome::status`].
    ///
    /// # Errors
    /// - `HarnessError::Baseline` if the baseline cannot be loaded, or
    ///   cannot be rewritten in update mode
    /// - `HarnessError::Corpus` if the corpus cannot be read
    /// - `HarnessError::Transcode` on the first rejected (image, variant)
    pub async fn run(&self, out: &mut dyn RunOutput) -> HarnessResult<RunOutcome> {
        let mut phase = PhaseTracker::new();
        let extensions = self.config.extension_table();
        let store = BaselineStore::new(self.config.fixtures_file());

        // Selecting
        let baseline = store.load().await?;
        let images = Corpus::new(self.config.corpus_path())
            .load(&self.config.filter)
            .await?;
        tracing::info!(
            images = images.len(),
            variants = self.catalog.len(),
            baseline_entries = baseline.len(),
            "corpus selected"
        );

        phase.advance(RunPhase::Transcoding)?;
        let invoker = TranscodeInvoker::new(self.transcoder.as_ref(), &self.catalog);
        let results = invoker.transcode_corpus(&images).await?;
        let produced = FixtureMap::from_results(&results, &extensions);
        let artifacts = ArtifactWriter::new(self.config.output_path())
            .write_all(&results, &extensions)
            .await;

        phase.advance(RunPhase::Reporting)?;
        out.table(&SizeTable::from_results(&self.catalog, &results).render());

        phase.advance(RunPhase::Classifying)?;
        let classifications = classify_all(&produced, &baseline);
        for (severity, line) in classifications.iter().filter_map(Classification::diagnostic) {
            out.diagnostic(severity, &line);
        }

        phase.advance(RunPhase::Finalizing)?;
        let baseline_updated = if self.config.update_fixtures {
            store.persist(&produced).await?;
            true
        } else {
            false
        };
        let status = ExitStatus::from_classifications(&classifications);

        let outcome = RunOutcome {
            status,
            images_processed: images.len(),
            produced,
            classifications,
            artifacts,
            baseline_updated,
        };
        tracing::info!(
            status = ?outcome.status,
            missing = outcome.count(Outcome::Missing),
            grew = outcome.count(Outcome::Grew),
            shrank = outcome.count(Outcome::Shrank),
            unchanged = outcome.count(Outcome::Unchanged),
            "run finished"
        );

        Ok(outcome)
    }
}
