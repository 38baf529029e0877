//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use mutation_harness::prelude::*;
//! ```

pub use crate::config::{ConfigDocument, ConfigError, ConfigSynthesizer, SynthesisOptions};
pub use crate::progress::{
    DefaultMetrics, DiffRenderer, EventDispatcher, EventSubscriber, MetricsCalculator,
    MutantResult, MutantResultKind, PlainDiff, ProgressReporter, ReporterError, ReporterOptions,
    RunEvent, RunSession,
};
