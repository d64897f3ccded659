//! sizeguard Core - File-size regression engine
//!
//! Feeds a corpus of source images through a fixed catalog of resize/encode
//! variants, records the output sizes, and compares them against a
//! previously recorded baseline:
//! - Missing baseline entries and grown outputs fail the run
//! - Shrunk outputs are reported but pass
//! - The baseline can be rewritten from the current run
//!
//! # Architecture
//!
//! ```text
//! Corpus → TranscodeInvoker → ImageResults → FixtureMap → classify → ExitStatus
//!              ↓ (per image × variant, all concurrent)        ↑
//!          Transcoder                               BaselineStore
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sizeguard_core::prelude::*;
//!
//! # async fn example(transcoder: Arc<dyn Transcoder>) -> HarnessResult<()> {
//! let config = HarnessConfig::new().with_root("test-filesize");
//! let coordinator = RunCoordinator::new(config, transcoder);
//!
//! let outcome = coordinator.run(&mut ConsoleOutput::console()).await?;
//! std::process::exit(outcome.status.code());
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod artifact;
pub mod baseline;
pub mod classify;
pub mod config;
pub mod coordinator;
pub mod corpus;
pub mod error;
pub mod fixture;
pub mod output;
pub mod phase;
pub mod report;
pub mod transcode;
pub mod variant;

// Re-exports for convenience
pub use artifact::{ArtifactFailure, ArtifactReport, ArtifactWriter};
pub use baseline::BaselineStore;
pub use classify::{classify, classify_all, Classification, ExitStatus, Outcome, Severity};
pub use config::HarnessConfig;
pub use coordinator::{RunCoordinator, RunOutcome};
pub use corpus::{Corpus, CorpusFilter, Image};
pub use error::{
    BaselineError, ConfigError, CorpusError, HarnessError, HarnessResult, PhaseError,
    TranscodeError,
};
pub use fixture::{ExtensionTable, FixtureKey, FixtureMap};
pub use output::{CapturedOutput, ConsoleOutput, RunOutput, WriterOutput};
pub use phase::{PhaseTracker, RunPhase};
pub use report::{format_bytes, SizeTable};
pub use transcode::{
    Codec, ImageResults, TranscodeInfo, TranscodeInvoker, TranscodeOptions, TranscodeResult,
    Transcoder,
};
pub use variant::{Variant, VariantCatalog};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a harness run
    pub use crate::{
        ConsoleOutput, ExitStatus, HarnessConfig, HarnessResult, RunCoordinator, RunOutcome,
        RunOutput, TranscodeOptions, TranscodeResult, Transcoder, VariantCatalog,
    };
    pub use std::sync::Arc;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
