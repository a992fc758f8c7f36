//! Main entry point for the jarscrub CLI application.
//!
//! This binary scans a directory tree (or a single archive) for
//! vulnerable class files and reports findings; in remove mode it also
//! scrubs the matching entries out of their archives in place.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Result, bail};
use clap::Parser;
use tracing::Level;

use jarscrub::{Cli, Finding, LocalFileReader, Mode, ScrubOptions, ZipIndex, scrub};

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if cli.list {
        return list_archive(&cli.path);
    }

    let options = ScrubOptions {
        mode: cli.mode(),
        policy: cli.policy(),
        signatures: cli.signature_set(),
    };
    let summary = scrub::run(&cli.path, &options, confirm_removal, |finding| {
        println!("[ALERT] {finding}");
    })?;

    match options.mode {
        Mode::Report => eprintln!("{} finding(s)", summary.findings),
        Mode::Remove => eprintln!(
            "{} finding(s): {} removed, {} kept, {} failed",
            summary.findings, summary.removed, summary.declined, summary.failed
        ),
    }
    if summary.failed > 0 {
        bail!("{} removal attempt(s) failed", summary.failed);
    }
    Ok(())
}

/// Asks on the terminal before one entry is removed.
///
/// Anything other than an explicit `y` keeps the entry, including a
/// closed stdin.
fn confirm_removal(finding: &Finding) -> bool {
    print!("Delete `{finding}`? (y/N) ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => answer.trim().eq_ignore_ascii_case("y"),
        Err(_) => false,
    }
}

/// Display archive contents in a detailed table with size, compression
/// ratio, and timestamps.
fn list_archive(path: &Path) -> Result<()> {
    let reader = LocalFileReader::new(path)?;
    let index = ZipIndex::open(reader)?;

    println!(
        "{:>10}  {:>10}  {:>5}  {:>10}  {:>5}  Name",
        "Length", "Size", "Cmpr", "Date", "Time"
    );
    println!("{}", "-".repeat(70));

    // Track totals for summary line
    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;
    let mut file_count = 0usize;

    for entry in index.entries() {
        let (year, month, day) = entry.mod_date();
        let (hour, minute, _second) = entry.mod_time();

        println!(
            "{:>10}  {:>10}  {}  {:04}-{:02}-{:02}  {:02}:{:02}  {}",
            entry.uncompressed_size,
            entry.compressed_size,
            ratio(entry.compressed_size as u64, entry.uncompressed_size as u64),
            year,
            month,
            day,
            hour,
            minute,
            entry.name
        );

        // Accumulate totals (excluding directories)
        if !entry.is_directory() {
            total_uncompressed += entry.uncompressed_size as u64;
            total_compressed += entry.compressed_size as u64;
            file_count += 1;
        }
    }

    println!("{}", "-".repeat(70));
    println!(
        "{:>10}  {:>10}  {}  {:>21}  {} files",
        total_uncompressed,
        total_compressed,
        ratio(total_compressed, total_uncompressed),
        "",
        file_count
    );

    Ok(())
}

/// Compression ratio as percentage saved. Deflate can grow tiny or
/// incompressible payloads; those entries save nothing.
fn ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed > 0 && compressed <= uncompressed {
        format!("{:>4}%", 100 - (compressed * 100 / uncompressed))
    } else {
        "  0%".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::ratio;

    #[test]
    fn ratio_clamps_grown_entries_to_zero() {
        assert_eq!(ratio(40, 100), "  60%");
        assert_eq!(ratio(100, 100), "   0%");
        assert_eq!(ratio(0, 0), "  0%");
        assert_eq!(ratio(3, 1), "  0%");
    }
}
