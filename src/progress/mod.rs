//! Live progress and summary reporting for mutation-testing runs.

pub mod diff;
pub mod dispatcher;
pub mod events;
pub mod metrics;
/// Console narration state machine.
pub mod reporter;
pub mod session;

pub use diff::{DiffRenderer, PlainDiff};
pub use dispatcher::{EventDispatcher, EventSubscriber};
pub use events::{EventFeed, MutantRef, MutantResult, MutantResultKind, RunEvent, read_event_feed};
pub use metrics::{DefaultMetrics, MetricsCalculator, MetricsSummary};
pub use reporter::{ProgressReporter, ReporterError, ReporterOptions, format_tally};
pub use session::{RunSession, SessionState};
