//! Orchestration: scanning, confirmation and removal.
//!
//! A run has two phases. The scan phase walks the tree once and reports
//! every finding through the caller's sink. In remove mode a second
//! phase revisits each vulnerable archive: matching entries are
//! re-derived from a fresh index (the file may have changed since the
//! scan), then each one is removed once the caller's confirmation
//! callback allows it. Findings against plain files are only ever
//! reported; this tool deletes archive entries, not files.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::{error, info, warn};

use crate::io::LocalFileRw;
use crate::scan::{Finding, Location, Scanner, SignatureSet};
use crate::zip::{Error, ZipEditor};

/// What to do with findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Report findings and change nothing.
    Report,
    /// Remove matching entries from their archives.
    Remove,
}

/// Whether removals go through the confirmation callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmPolicy {
    /// Consult the callback for every entry.
    AlwaysAsk,
    /// Remove without consulting anyone.
    NeverAsk,
}

/// Everything a run needs besides the root path and the callbacks.
#[derive(Debug, Clone)]
pub struct ScrubOptions {
    pub mode: Mode,
    pub policy: ConfirmPolicy,
    pub signatures: SignatureSet,
}

/// Counters for one completed run.
///
/// `removed` only counts entries whose archive finished its directory
/// rewrite; removals undone by a failed rewrite land in `failed`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Findings reported, plain files and archive entries together.
    pub findings: usize,
    /// Entries durably removed from their archives.
    pub removed: usize,
    /// Entries kept because the confirmation callback said no.
    pub declined: usize,
    /// Removal attempts lost to errors.
    pub failed: usize,
}

/// Scans `root` and, in remove mode, scrubs matching entries out of the
/// archives found there.
///
/// `report` sees every finding as the scan produces it. `confirm` is
/// consulted per entry, before removal, only under
/// [`ConfirmPolicy::AlwaysAsk`].
///
/// # Errors
///
/// Fails when `root` does not exist. Per-file trouble (unreadable
/// files, broken archives, failed removals) is logged and counted in
/// the summary instead.
pub fn run(
    root: &Path,
    options: &ScrubOptions,
    mut confirm: impl FnMut(&Finding) -> bool,
    mut report: impl FnMut(&Finding),
) -> Result<RunSummary> {
    if !root.exists() {
        bail!("path does not exist: {}", root.display());
    }

    let mut summary = RunSummary::default();
    // Archives with entry findings, in walk order, with the number of
    // hits seen at scan time.
    let mut archives: Vec<(PathBuf, usize)> = Vec::new();

    for finding in Scanner::new(root, options.signatures.clone()) {
        if let Location::Entry { archive, .. } = &finding.location {
            match archives.last_mut() {
                Some((last, hits)) if last == archive => *hits += 1,
                _ => archives.push((archive.clone(), 1)),
            }
        }
        report(&finding);
        summary.findings += 1;
    }

    if options.mode == Mode::Report {
        return Ok(summary);
    }

    for (path, scan_hits) in archives {
        scrub_archive(&path, scan_hits, options, &mut confirm, &mut summary);
    }
    Ok(summary)
}

/// Removes confirmed matching entries from one archive.
///
/// Candidates are re-derived from a fresh index rather than replayed
/// from scan-time findings. An IO failure mid-removal abandons the
/// archive: its directory is not rewritten and every attempt against it
/// counts as failed.
fn scrub_archive(
    path: &Path,
    scan_hits: usize,
    options: &ScrubOptions,
    confirm: &mut impl FnMut(&Finding) -> bool,
    summary: &mut RunSummary,
) {
    let file = match LocalFileRw::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!("cannot reopen {} for writing: {e}", path.display());
            summary.failed += scan_hits;
            return;
        }
    };
    let mut editor = match ZipEditor::open(file) {
        Ok(editor) => editor,
        Err(e) => {
            warn!("cannot re-index {}: {e}", path.display());
            summary.failed += scan_hits;
            return;
        }
    };

    let candidates: Vec<String> = editor
        .entries()
        .iter()
        .filter(|e| options.signatures.matches(&e.name))
        .map(|e| e.name.clone())
        .collect();

    let mut removed_here = 0;
    let mut failed_here = 0;
    for (attempt, name) in candidates.iter().enumerate() {
        let finding = Finding {
            location: Location::Entry {
                archive: path.to_path_buf(),
                name: name.clone(),
            },
            matched: true,
        };
        if options.policy == ConfirmPolicy::AlwaysAsk && !confirm(&finding) {
            info!("keeping {finding}");
            summary.declined += 1;
            continue;
        }
        match editor.remove(name) {
            Ok(()) => {
                info!("removing {finding}");
                removed_here += 1;
            }
            Err(Error::EntryNotFound(_)) => {
                warn!("entry no longer present, skipping {finding}");
                failed_here += 1;
            }
            Err(e) => {
                error!("removal failed, {} is now inconsistent: {e}", path.display());
                summary.failed += removed_here + failed_here + candidates.len() - attempt;
                return;
            }
        }
    }

    match editor.finish() {
        Ok(_) => {
            summary.removed += removed_here;
            summary.failed += failed_here;
        }
        Err(e) => {
            error!(
                "directory rewrite failed, {} is now inconsistent: {e}",
                path.display()
            );
            summary.failed += removed_here + failed_here;
        }
    }
}
