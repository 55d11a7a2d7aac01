//! CLI command implementations

pub mod batch;
pub mod perturb;

mod reporting;
