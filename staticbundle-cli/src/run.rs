use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use staticbundle::{Diagnostic, Error, Generated, Processor, SourceSetConfig};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Validate,
    Generate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Valid,
    Written,
    Unchanged,
    Failed,
}

/// Outcome of one source set.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub source_set: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.status != Status::Failed
    }
}

/// Resources of source set `name` live in `<input>/<name>`, its artifact is
/// written below `<output>/<name>`.
pub fn processor_for(name: &str, config: SourceSetConfig, input: &Path, output: &Path) -> Processor {
    Processor::new(config, input.join(name), output.join(name))
}

/// Runs `command` on every source set in parallel. Reports keep the order
/// of `source_sets`.
pub fn run(
    command: Command,
    source_sets: Vec<(String, SourceSetConfig)>,
    input: &Path,
    output: &Path,
) -> Vec<Report> {
    source_sets
        .into_par_iter()
        .map(|(name, config)| {
            let processor = processor_for(&name, config, input, output);
            run_one(command, name, &processor)
        })
        .collect()
}

fn run_one(command: Command, source_set: String, processor: &Processor) -> Report {
    let result = match command {
        Command::Validate => processor
            .validate()
            .map(|bundle| (Status::Valid, Some(bundle.artifact_path))),
        Command::Generate => processor.generate().map(|generated| match generated {
            Generated::Written(path) => (Status::Written, Some(path)),
            Generated::Unchanged(path) => (Status::Unchanged, Some(path)),
        }),
    };

    match result {
        Ok((status, artifact)) => {
            info!(source_set = %source_set, ?status, "source set done");
            Report {
                source_set,
                status,
                artifact,
                diagnostics: Vec::new(),
            }
        }
        Err(e) => {
            error!(source_set = %source_set, "{}", e);
            Report {
                source_set,
                status: Status::Failed,
                artifact: None,
                diagnostics: error_diagnostics(e),
            }
        }
    }
}

fn error_diagnostics(e: Error) -> Vec<Diagnostic> {
    match e {
        Error::Validation(diagnostics) => diagnostics.into_vec(),
        Error::Emit { path, source } => vec![Diagnostic::emit(source.to_string()).with_file(path)],
        Error::Config(message) => vec![Diagnostic::validation(message)],
    }
}

/// Human-readable lines for `reports`.
pub fn render_text(reports: &[Report]) -> String {
    let mut out = String::new();
    for report in reports {
        match (&report.status, &report.artifact) {
            (Status::Failed, _) => {
                out.push_str(&format!(
                    "✖ {}: {} problem(s)\n",
                    report.source_set,
                    report.diagnostics.len()
                ));
                for diagnostic in &report.diagnostics {
                    out.push_str(&format!("  {}\n", diagnostic));
                }
            }
            (status, Some(path)) => {
                let verb = match status {
                    Status::Valid => "valid",
                    Status::Written => "written",
                    _ => "unchanged",
                };
                out.push_str(&format!(
                    "✔ {}: {} ({})\n",
                    report.source_set,
                    verb,
                    path.display()
                ));
            }
            (_, None) => out.push_str(&format!("✔ {}\n", report.source_set)),
        }
    }
    out
}
