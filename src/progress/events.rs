//! Lifecycle events delivered to progress subscribers.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Outcome of executing tests against one mutant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutantResultKind {
    /// Tests failed (mutant detected).
    Killed,
    /// Tests passed despite the mutation.
    Escaped,
    /// No test covers the mutated code.
    Uncovered,
    /// Test run exceeded its time budget.
    TimedOut,
    /// Test run ended with a fatal error.
    Error,
    /// Kind reported by the execution layer that this crate does not know.
    #[serde(other)]
    Unrecognized,
}

impl MutantResultKind {
    /// Glyph rendered for kinds without a dedicated symbol.
    pub const PLACEHOLDER_SYMBOL: char = '?';

    /// One-character progress glyph.
    pub fn symbol(self) -> char {
        match self {
            Self::Killed => '.',
            Self::Escaped => 'M',
            Self::Uncovered => 'S',
            Self::TimedOut => 'T',
            Self::Error => 'E',
            Self::Unrecognized => Self::PLACEHOLDER_SYMBOL,
        }
    }
}

/// The mutant a result refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutantRef {
    /// Identifier of the mutator that produced the mutant.
    pub mutator: String,
    /// Path of the file the mutant alters.
    pub original_file_path: String,
    /// Unified diff between original and mutated source.
    #[serde(default)]
    pub diff: String,
}

/// A completed mutant execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutantResult {
    /// Outcome.
    pub kind: MutantResultKind,
    /// Mutant descriptor.
    pub mutant: MutantRef,
}

impl MutantResult {
    /// Build a result.
    pub fn new(
        kind: MutantResultKind,
        mutator: impl Into<String>,
        original_file_path: impl Into<String>,
        diff: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            mutant: MutantRef {
                mutator: mutator.into(),
                original_file_path: original_file_path.into(),
                diff: diff.into(),
            },
        }
    }
}

/// Event stream of one mutation-testing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Run begins with a known number of mutants.
    RunStarted {
        /// Mutants that will complete in this run.
        total: usize,
    },
    /// One mutant finished.
    MutantCompleted(MutantResult),
    /// All mutants finished.
    RunFinished,
}

impl RunEvent {
    /// Stable event name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "run_started",
            Self::MutantCompleted(_) => "mutant_completed",
            Self::RunFinished => "run_finished",
        }
    }
}

/// Events read from a JSON-lines feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFeed {
    /// Well-formed events in feed order.
    pub events: Vec<RunEvent>,
    /// Lines that failed to parse and were skipped.
    pub malformed_lines: usize,
}

/// Read one JSON event per line. Blank lines are ignored and malformed lines
/// are counted, not fatal.
pub fn read_event_feed<R: BufRead>(reader: R) -> Result<EventFeed, std::io::Error> {
    let mut feed = EventFeed::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<RunEvent>(&line) {
            Ok(event) => feed.events.push(event),
            Err(err) => {
                warn!(line = index + 1, error = %err, "skipping malformed event");
                feed.malformed_lines += 1;
            }
        }
    }

    Ok(feed)
}
