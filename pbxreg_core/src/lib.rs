//! # pbxreg Core
//!
//! Registers generated source files in an Xcode project file
//! (`project.pbxproj`) so the IDE sees files created by a code generator.
//!
//! For each path the matching group hierarchy is found or created under the
//! project's main group, a file reference is added if missing, and a new
//! reference is attached to every target. Running the same registration
//! twice leaves the project unchanged the second time.
//!
//! ## Features
//!
//! - Parser and writer for the old-style property list format of `.pbxproj`
//! - Output in the layout Xcode writes, including object annotations
//! - Deterministic ids for new objects
//! - Atomic saves
//!
//! ## Example
//!
//! ```no_run
//! use pbxreg_core::{Project, register_paths};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load the project bundle
//! let mut project = Project::open("./App.xcodeproj")?;
//!
//! // Add generated files
//! let report = register_paths(&mut project, &["Generated/Models/User.swift"])?;
//! println!("Created {} file references", report.files_created());
//!
//! // Write it back
//! project.save()?;
//! # Ok(())
//! # }
//! ```

mod error;
mod file_type;
mod id;
mod plist;
mod project;
mod register;
mod writer;

#[cfg(test)]
mod fixtures;

pub use error::{Error, Result};
pub use file_type::{is_header, last_known_file_type};
pub use id::ObjectId;
pub use plist::{Dictionary, Value, parse};
pub use project::{Node, NodeKind, PBXPROJ_FILE, Project, Target};
pub use register::{
    Outcome, PathParts, PathRegistration, Registrar, RegistrationReport, register_paths,
    split_path,
};
pub use writer::{write_project, write_value};
