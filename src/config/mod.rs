//! Execution-ready test-framework configuration synthesis.

use thiserror::Error;

pub mod document;
pub mod rules;
pub mod synthesizer;
pub mod version;

pub use document::{ConfigDocument, Element, Node};
pub use synthesizer::{
    CONFIG_FILE_NAME, COVERAGE_DIR, ConfigSynthesizer, SynthesisOptions,
    add_coverage_filter_whitelist_if_absent,
};
pub use version::{Capability, RuntimeVersion};

/// Configuration synthesis errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The original document is malformed or lacks the required root structure.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Runtime version string could not be parsed.
    #[error("invalid runtime version `{0}`")]
    InvalidVersion(String),
    /// XML writer failure.
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    /// IO failure while reading or writing a document.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
