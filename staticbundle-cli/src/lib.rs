//! CLI library for testing purposes

pub mod config;
pub mod run;

pub use config::{ConfigFormat, load_bundle_config, parse_bundle_config, select_source_sets};
pub use run::{Command, Report, Status, render_text, run};
