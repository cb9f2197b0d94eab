//! What the CLI prints.
//!
//! Results go to stdout, errors to stderr. With `--json` both are pretty
//! printed JSON objects carrying `success` and `result_code`.

use anyhow::Result;
use pbxreg_core::{Outcome, PathRegistration, RegistrationReport};
use serde::Serialize;
use std::io::{self, Write};

/// Prints run results and errors as text or JSON.
#[derive(Debug, Clone, Copy)]
pub struct OutputWriter {
    json: bool,
}

impl OutputWriter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    /// Print `data` as JSON, or the text built by `text` otherwise.
    pub fn write<T: Serialize>(&self, data: &T, text: impl FnOnce() -> String) -> Result<()> {
        let mut stdout = io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut stdout, data)?;
            stdout.write_all(b"\n")?;
        } else {
            stdout.write_all(text().as_bytes())?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Print a failed run to stderr. Errors while printing are dropped.
    pub fn write_error(&self, error: &anyhow::Error, result_code: u8) {
        let mut stderr = io::stderr().lock();
        if !self.json {
            let _ = writeln!(stderr, "Error: {:#}", error);
            return;
        }

        let report = ErrorOutput {
            success: false,
            result_code,
            error: format!("{:#}", error),
        };
        if serde_json::to_writer_pretty(&mut stderr, &report).is_ok() {
            let _ = writeln!(stderr);
        }
    }
}

/// JSON body of a failed run.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub result_code: u8,
    pub error: String,
}

/// Output for a registration run.
#[derive(Debug, Serialize)]
pub struct RegisterOutput {
    pub success: bool,
    pub result_code: u8,
    pub project: String,
    pub saved: bool,
    pub files_created: usize,
    pub groups_created: usize,
    pub paths: Vec<PathRegistration>,
}

impl RegisterOutput {
    pub fn new(project: String, saved: bool, report: RegistrationReport) -> Self {
        Self {
            success: true,
            result_code: 0,
            project,
            saved,
            files_created: report.files_created(),
            groups_created: report.groups_created(),
            paths: report.paths,
        }
    }

    /// Human-readable form: one line per path plus a summary.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for entry in &self.paths {
            for group in &entry.groups_created {
                text.push_str(&format!("Created group {}\n", group));
            }
            match entry.outcome {
                Outcome::Created if entry.targets.is_empty() => {
                    text.push_str(&format!("Added {}\n", entry.path));
                }
                Outcome::Created => {
                    text.push_str(&format!(
                        "Added {} ({})\n",
                        entry.path,
                        entry.targets.join(", ")
                    ));
                }
                Outcome::Existing => {
                    text.push_str(&format!("Unchanged {}\n", entry.path));
                }
                Outcome::Skipped => {
                    text.push_str(&format!("Skipped {:?} (no file name)\n", entry.path));
                }
            }
        }

        let verb = if self.saved { "Saved" } else { "Dry run, not saved:" };
        text.push_str(&format!(
            "{} {} ({} files, {} groups added)\n",
            verb, self.project, self.files_created, self.groups_created
        ));
        text
    }
}
