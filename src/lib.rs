//! # mutation-harness
//!
//! `mutation-harness` prepares and narrates mutation-testing runs:
//! - `config`: synthesizes the execution-ready test-framework configuration
//!   every mutant run uses
//! - `progress`: consumes per-mutant completion events and renders row-wrapped
//!   progress plus the final summary
//!
//! Mutant generation, process execution and diff computation live outside
//! this crate and plug in through the traits in `progress`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

pub mod config;
pub mod prelude;
pub mod progress;
