//! Aggregation contract consumed by the reporter, plus a reference aggregator.

use serde::Serialize;

use super::events::{MutantResult, MutantResultKind};

/// Final figures printed in the run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    /// Mutants generated.
    pub total: usize,
    /// Killed mutants.
    pub killed: usize,
    /// Mutants no test covers.
    pub uncovered: usize,
    /// Covered mutants no test detected.
    pub escaped: usize,
    /// Timed-out mutants.
    pub timed_out: usize,
    /// Mutants whose run ended in a fatal error.
    pub errors: usize,
    /// Mutation score indicator, percent.
    pub mutation_score_indicator: f64,
    /// Share of mutants covered by tests, percent.
    pub coverage_rate: f64,
    /// Mutation score indicator over covered mutants only, percent.
    pub covered_code_mutation_score_indicator: f64,
}

/// Collects results and reports aggregate figures.
pub trait MetricsCalculator {
    /// Record one completed mutant.
    fn collect(&mut self, result: &MutantResult);

    /// Escaped mutants in collection order.
    fn escaped_mutants(&self) -> Vec<MutantResult>;

    /// Aggregate figures over everything collected.
    fn summary(&self) -> MetricsSummary;
}

/// In-memory aggregator.
///
/// Killed, timed-out and errored mutants count as detected. Percentages are
/// floored to whole numbers; a zero denominator yields 0.
#[derive(Debug, Clone, Default)]
pub struct DefaultMetrics {
    collected: Vec<MutantResult>,
}

impl DefaultMetrics {
    /// Empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    fn count(&self, kind: MutantResultKind) -> usize {
        self.collected.iter().filter(|r| r.kind == kind).count()
    }
}

fn floored_percent(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    (100.0 * numerator as f64 / denominator as f64).floor()
}

impl MetricsCalculator for DefaultMetrics {
    fn collect(&mut self, result: &MutantResult) {
        self.collected.push(result.clone());
    }

    fn escaped_mutants(&self) -> Vec<MutantResult> {
        self.collected
            .iter()
            .filter(|r| r.kind == MutantResultKind::Escaped)
            .cloned()
            .collect()
    }

    fn summary(&self) -> MetricsSummary {
        let total = self.collected.len();
        let killed = self.count(MutantResultKind::Killed);
        let uncovered = self.count(MutantResultKind::Uncovered);
        let escaped = self.count(MutantResultKind::Escaped);
        let timed_out = self.count(MutantResultKind::TimedOut);
        let errors = self.count(MutantResultKind::Error);

        let detected = killed + timed_out + errors;
        let covered = total - uncovered;

        MetricsSummary {
            total,
            killed,
            uncovered,
            escaped,
            timed_out,
            errors,
            mutation_score_indicator: floored_percent(detected, total),
            coverage_rate: floored_percent(covered, total),
            covered_code_mutation_score_indicator: floored_percent(detected, covered),
        }
    }
}
