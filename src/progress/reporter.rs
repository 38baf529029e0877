//! Console progress narration for a mutation-testing run.

use std::io::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::diff::DiffRenderer;
use super::dispatcher::EventSubscriber;
use super::events::{MutantResult, RunEvent};
use super::metrics::{MetricsCalculator, MetricsSummary};
use super::session::{RunSession, SessionState};

/// Symbols per progress row.
pub const ROW_WIDTH: usize = 50;

/// Width counts are right-aligned to in the summary.
pub const PAD_LENGTH: usize = 8;

/// Symbol legend printed at run start.
pub const LEGEND: &str = ".: killed, M: escaped, S: uncovered, E: fatal error, T: timed out";

/// Closing line of the summary.
pub const DISCLAIMER: &str =
    "Please note that some mutants will inevitably be harmless (i.e. false positives).";

/// Reporter errors.
#[derive(Debug, Error)]
pub enum ReporterError {
    /// Event arrived in a state that cannot accept it.
    #[error("protocol violation: `{event}` received while session is {state}: {detail}")]
    ProtocolViolation {
        /// Offending event name.
        event: &'static str,
        /// Session state at delivery.
        state: SessionState,
        /// What was wrong.
        detail: String,
    },
    /// Console write failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reporter presentation options.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReporterOptions {
    /// List every escaped mutant with its diff before the summary.
    pub show_mutations: bool,
}

impl ReporterOptions {
    /// Set show-mutations mode.
    pub fn with_show_mutations(mut self, show_mutations: bool) -> Self {
        self.show_mutations = show_mutations;
        self
    }
}

/// Right-aligned `(processed / total)` tally, both fields as wide as `total`.
pub fn format_tally(processed: usize, total: usize) -> String {
    let width = total.to_string().len();
    format!("   ({processed:>width$} / {total:>width$})")
}

/// Narrates a run: legend, one symbol per completed mutant wrapped at
/// [`ROW_WIDTH`], then the summary block.
///
/// State machine over [`SessionState`]: `Idle -> Running -> Finished`. From
/// `Finished`, start and finish events are no-ops; every other out-of-order
/// event is a [`ReporterError::ProtocolViolation`]. Output is flushed after
/// each event.
pub struct ProgressReporter<W, M, D> {
    session: RunSession,
    output: W,
    metrics: M,
    diff: D,
    options: ReporterOptions,
}

impl<W, M, D> ProgressReporter<W, M, D>
where
    W: Write,
    M: MetricsCalculator,
    D: DiffRenderer,
{
    /// Create a reporter that takes exclusive ownership of `session`.
    pub fn new(
        session: RunSession,
        output: W,
        metrics: M,
        diff: D,
        options: ReporterOptions,
    ) -> Self {
        Self {
            session,
            output,
            metrics,
            diff,
            options,
        }
    }

    /// Session state so far.
    pub fn session(&self) -> &RunSession {
        &self.session
    }

    /// Aggregator in use.
    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    /// Give back the session and the output sink.
    pub fn into_parts(self) -> (RunSession, W) {
        (self.session, self.output)
    }

    /// Route an event to its handler.
    pub fn handle(&mut self, event: &RunEvent) -> Result<(), ReporterError> {
        match event {
            RunEvent::RunStarted { total } => self.on_run_started(*total),
            RunEvent::MutantCompleted(result) => self.on_mutant_completed(result.clone()),
            RunEvent::RunFinished => self.on_run_finished(),
        }
    }

    /// Start the run and print the legend.
    pub fn on_run_started(&mut self, total_mutations: usize) -> Result<(), ReporterError> {
        match self.session.state() {
            SessionState::Idle => {}
            SessionState::Finished => {
                debug!("run_started after finish ignored");
                return Ok(());
            }
            SessionState::Running => {
                return Err(self.violation("run_started", "run already started"));
            }
        }

        self.session.start(total_mutations);
        debug!(total = total_mutations, "mutation run started");

        writeln!(self.output, "{LEGEND}")?;
        writeln!(self.output)?;
        self.output.flush()?;
        Ok(())
    }

    /// Record one completion and print its symbol, wrapping rows and
    /// printing the tally as needed.
    pub fn on_mutant_completed(&mut self, result: MutantResult) -> Result<(), ReporterError> {
        if self.session.state() != SessionState::Running {
            return Err(self.violation("mutant_completed", "run is not in progress"));
        }
        if self.session.is_complete() {
            let detail = format!(
                "all {} announced mutants already completed",
                self.session.total_mutation_count()
            );
            return Err(self.violation("mutant_completed", detail));
        }

        let symbol = result.kind.symbol();
        let processed = self.session.record(result);
        if let Some(recorded) = self.session.results().last() {
            self.metrics.collect(recorded);
        }
        let total = self.session.total_mutation_count();

        write!(self.output, "{symbol}")?;

        let remainder = processed % ROW_WIDTH;
        let end_of_row = remainder == 0;
        let is_last = processed == total;

        if is_last && !end_of_row {
            write!(self.output, "{}", " ".repeat(ROW_WIDTH - remainder))?;
        }

        if is_last || end_of_row {
            write!(self.output, "{}", format_tally(processed, total))?;
            if !is_last {
                writeln!(self.output)?;
            }
        }

        self.output.flush()?;
        Ok(())
    }

    /// Print escaped mutants (when enabled) and the summary.
    pub fn on_run_finished(&mut self) -> Result<(), ReporterError> {
        match self.session.state() {
            SessionState::Running => {}
            SessionState::Finished => {
                debug!("run_finished after finish ignored");
                return Ok(());
            }
            SessionState::Idle => {
                return Err(self.violation("run_finished", "run was never started"));
            }
        }

        let escaped = self.metrics.escaped_mutants();
        if self.options.show_mutations {
            self.show_mutations(&escaped)?;
        }

        let summary = self.metrics.summary();
        self.show_metrics(&summary)?;

        self.session.finish();
        debug!(
            processed = self.session.processed_count(),
            escaped = escaped.len(),
            "mutation run finished"
        );
        self.output.flush()?;
        Ok(())
    }

    fn show_mutations(&mut self, escaped: &[MutantResult]) -> Result<(), ReporterError> {
        for (index, result) in escaped.iter().enumerate() {
            writeln!(self.output)?;
            writeln!(self.output, "{}) {}", index + 1, result.mutant.mutator)?;
            writeln!(self.output, "{}", result.mutant.original_file_path)?;
            writeln!(self.output, "{}", self.diff.render(&result.mutant.diff))?;
        }
        Ok(())
    }

    fn show_metrics(&mut self, summary: &MetricsSummary) -> Result<(), ReporterError> {
        let out = &mut self.output;
        let indent = " ".repeat(PAD_LENGTH + 1);

        writeln!(out)?;
        writeln!(out)?;
        writeln!(out, "{} mutations were generated:", summary.total)?;
        writeln!(out, "{:>PAD_LENGTH$} mutants were killed", summary.killed)?;
        writeln!(
            out,
            "{:>PAD_LENGTH$} mutants were not covered by tests",
            summary.uncovered
        )?;
        writeln!(
            out,
            "{:>PAD_LENGTH$} covered mutants were not detected",
            summary.escaped
        )?;
        writeln!(out, "{:>PAD_LENGTH$} time outs were encountered", summary.timed_out)?;
        writeln!(out)?;
        writeln!(out, "Metrics:")?;
        writeln!(
            out,
            "{indent}Mutation Score Indicator (MSI): {}%",
            summary.mutation_score_indicator
        )?;
        writeln!(out, "{indent}Mutation Code Coverage: {}%", summary.coverage_rate)?;
        writeln!(
            out,
            "{indent}Covered Code MSI: {}%",
            summary.covered_code_mutation_score_indicator
        )?;
        writeln!(out)?;
        writeln!(out, "{DISCLAIMER}")?;
        Ok(())
    }

    fn violation(&self, event: &'static str, detail: impl Into<String>) -> ReporterError {
        ReporterError::ProtocolViolation {
            event,
            state: self.session.state(),
            detail: detail.into(),
        }
    }
}

impl<W, M, D> EventSubscriber for ProgressReporter<W, M, D>
where
    W: Write,
    M: MetricsCalculator,
    D: DiffRenderer,
{
    fn on_event(&mut self, event: &RunEvent) -> Result<(), ReporterError> {
        self.handle(event)
    }
}
