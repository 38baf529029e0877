//! Diff rendering seam.

/// Renders a mutant's diff for console output.
pub trait DiffRenderer {
    /// Render `diff` for display.
    fn render(&self, diff: &str) -> String;
}

/// Emits the diff unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainDiff;

impl DiffRenderer for PlainDiff {
    fn render(&self, diff: &str) -> String {
        diff.to_string()
    }
}

impl<F> DiffRenderer for F
where
    F: Fn(&str) -> String,
{
    fn render(&self, diff: &str) -> String {
        self(diff)
    }
}
