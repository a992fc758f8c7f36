//! # jarscrub
//!
//! Find and remove vulnerable class files from ZIP/jar archives in place.
//!
//! This library scans a filesystem tree for archives containing entries
//! whose names match a vulnerability signature (by default the log4j
//! `JndiLookup` class) and can surgically remove those entries: later
//! entries slide down over the removed span and the central directory is
//! rewritten in place, so the archive is never rebuilt and untouched
//! entries keep their exact bytes.
//!
//! ## Features
//!
//! - Recursive directory scan with magic-byte archive detection
//! - Case-insensitive substring signatures, configurable per run
//! - In-place entry removal with consistent offsets and directory
//! - Report-only and remove modes, per-entry confirmation hooks
//! - Archives are indexed from the central directory only; payloads are
//!   never read, so compression method does not matter
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use jarscrub::{LocalFileRw, Scanner, SignatureSet, ZipEditor};
//!
//! fn main() -> anyhow::Result<()> {
//!     // Report every vulnerable entry under a tree
//!     for finding in Scanner::new("/srv/apps", SignatureSet::default()) {
//!         println!("[ALERT] {finding}");
//!     }
//!
//!     // Scrub one archive directly
//!     let file = LocalFileRw::open(Path::new("/srv/apps/app.jar"))?;
//!     let mut editor = ZipEditor::open(file)?;
//!     editor.remove("org/apache/logging/log4j/core/lookup/JndiLookup.class")?;
//!     editor.finish()?;
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod io;
pub mod scan;
pub mod scrub;
pub mod zip;

#[cfg(test)]
mod testutil;

pub use cli::Cli;
pub use io::{LocalFileReader, LocalFileRw, MemBuffer, ReadAt, WriteAt};
pub use scan::{Finding, Location, Scanner, SignatureSet};
pub use scrub::{ConfirmPolicy, Mode, RunSummary, ScrubOptions};
pub use zip::{ZipEditor, ZipIndex};
