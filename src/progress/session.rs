//! Bookkeeping for one mutation-testing run.

use std::fmt;

use super::events::{MutantResult, MutantResultKind};

/// Lifecycle position of a [`RunSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Created, run not started.
    #[default]
    Idle,
    /// Accepting completions.
    Running,
    /// Summary printed.
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Finished => "finished",
        })
    }
}

/// Counters and the append-only result log of a run.
///
/// Only the reporter owning the session mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSession {
    total_mutation_count: usize,
    processed_count: usize,
    results: Vec<MutantResult>,
    state: SessionState,
}

impl RunSession {
    /// Fresh idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutants announced at run start.
    pub fn total_mutation_count(&self) -> usize {
        self.total_mutation_count
    }

    /// Completions received so far.
    pub fn processed_count(&self) -> usize {
        self.processed_count
    }

    /// Completed results in delivery order.
    pub fn results(&self) -> &[MutantResult] {
        &self.results
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Number of recorded results of `kind`.
    pub fn count_of(&self, kind: MutantResultKind) -> usize {
        self.results.iter().filter(|r| r.kind == kind).count()
    }

    /// True once every announced mutant has completed.
    pub fn is_complete(&self) -> bool {
        self.processed_count == self.total_mutation_count
    }

    pub(crate) fn start(&mut self, total_mutation_count: usize) {
        self.total_mutation_count = total_mutation_count;
        self.processed_count = 0;
        self.results.clear();
        self.state = SessionState::Running;
    }

    pub(crate) fn record(&mut self, result: MutantResult) -> usize {
        self.results.push(result);
        self.processed_count += 1;
        self.processed_count
    }

    pub(crate) fn finish(&mut self) {
        self.state = SessionState::Finished;
    }
}
