use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::Level;

use crate::scan::{DEFAULT_SIGNATURE, SignatureSet};
use crate::scrub::{ConfirmPolicy, Mode};

#[derive(Parser, Debug)]
#[command(name = "jarscrub")]
#[command(version)]
#[command(about = "Find and remove vulnerable class files from ZIP/jar archives in place", long_about = None)]
#[command(after_help = "Examples:\n  \
  jarscrub /srv/apps               report vulnerable entries under /srv/apps\n  \
  jarscrub --remove /srv/apps      remove entries, asking before each one\n  \
  jarscrub --remove -y app.jar     scrub one archive without prompting\n  \
  jarscrub -s evilclass /opt       scan for a custom signature\n  \
  jarscrub -l app.jar              list the contents of app.jar")]
pub struct Cli {
    /// Directory to scan recursively, or a single archive file
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Case-insensitive substring matched against file and entry names
    /// (repeatable)
    #[arg(
        short = 's',
        long = "signature",
        value_name = "PATTERN",
        default_value = DEFAULT_SIGNATURE
    )]
    pub signatures: Vec<String>,

    /// Remove matching entries from their archives
    #[arg(long)]
    pub remove: bool,

    /// Do not ask before each removal
    #[arg(short = 'y', long, requires = "remove")]
    pub yes: bool,

    /// List archive contents instead of scanning
    #[arg(short = 'l', long, conflicts_with_all = ["remove", "yes"])]
    pub list: bool,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.remove { Mode::Remove } else { Mode::Report }
    }

    pub fn policy(&self) -> ConfirmPolicy {
        if self.yes {
            ConfirmPolicy::NeverAsk
        } else {
            ConfirmPolicy::AlwaysAsk
        }
    }

    pub fn signature_set(&self) -> SignatureSet {
        SignatureSet::new(&self.signatures)
    }
}
