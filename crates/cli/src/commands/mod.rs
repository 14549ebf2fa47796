//! CLI command implementations.

mod info;
mod report;
mod run;
mod validate;

pub use info::run_info;
pub use report::run_report;
pub use run::run_pipeline;
pub use validate::run_validate;
