//! Filesystem walking and signature matching.
//!
//! The scanner walks a subtree (or a single file) and tests file names
//! against a [`SignatureSet`]; files that probe as ZIP archives by
//! magic bytes get their entry names tested too. It yields [`Finding`]s
//! as an iterator and never mutates anything it looks at.

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::io::{LocalFileReader, ReadAt};
use crate::zip::{EndOfCentralDirectory, LFH_SIGNATURE, ZipIndex};

/// Class-name fragment of the vulnerable log4j JNDI lookup handler.
pub const DEFAULT_SIGNATURE: &str = "jndilookup";

/// A set of lowercase substrings matched case-insensitively against
/// names.
///
/// The set is an explicit value handed to the scanner, never ambient
/// state, so different runs can match different signatures.
#[derive(Debug, Clone)]
pub struct SignatureSet {
    needles: Vec<String>,
}

impl SignatureSet {
    /// Builds a set from arbitrary-case patterns; they are lowercased
    /// once here.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            needles: patterns
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Whether any signature occurs in `name`, ignoring case.
    pub fn matches(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.needles.iter().any(|n| name.contains(n.as_str()))
    }
}

impl Default for SignatureSet {
    fn default() -> Self {
        Self::new([DEFAULT_SIGNATURE])
    }
}

/// Where a finding was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A plain file whose own name matched.
    File(PathBuf),
    /// A named entry inside an archive.
    Entry { archive: PathBuf, name: String },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Entry { archive, name } => write!(f, "{}:{}", archive.display(), name),
        }
    }
}

/// One matched name, as reported by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub location: Location,
    pub matched: bool,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.location.fmt(f)
    }
}

/// First four bytes of every usable archive: a local file header, or
/// the EOCD record when the archive is empty.
fn is_zip_magic(magic: &[u8; 4]) -> bool {
    &magic[..] == LFH_SIGNATURE || &magic[..] == EndOfCentralDirectory::SIGNATURE
}

/// Streaming scanner over a filesystem subtree.
///
/// Yields findings in walk order: for each regular file, a name match
/// on the file itself first, then matches on its archive entries if the
/// file probes as a ZIP archive. Unreadable files and broken archives
/// are logged and skipped; the walk continues. Symlinks are not
/// followed.
pub struct Scanner {
    signatures: SignatureSet,
    walker: walkdir::IntoIter,
    pending: VecDeque<Finding>,
}

impl Scanner {
    /// Starts a scan rooted at a directory or a single archive file.
    pub fn new(root: impl AsRef<Path>, signatures: SignatureSet) -> Self {
        Self {
            signatures,
            walker: WalkDir::new(root).into_iter(),
            pending: VecDeque::new(),
        }
    }

    /// Queues findings for one regular file: its own name, then its
    /// entries when it turns out to be an archive.
    fn scan_file(&mut self, path: &Path) {
        let name = path.file_name().map(|n| n.to_string_lossy());
        if let Some(name) = name {
            if self.signatures.matches(&name) {
                self.pending.push_back(Finding {
                    location: Location::File(path.to_path_buf()),
                    matched: true,
                });
            }
        }

        let reader = match LocalFileReader::new(path) {
            Ok(reader) => reader,
            Err(e) => {
                warn!("cannot open {}: {e}", path.display());
                return;
            }
        };
        if reader.size() < 4 {
            return;
        }
        let mut magic = [0u8; 4];
        if let Err(e) = reader.read_exact_at(0, &mut magic) {
            warn!("cannot read {}: {e}", path.display());
            return;
        }
        if !is_zip_magic(&magic) {
            return;
        }

        match ZipIndex::open(reader) {
            Ok(index) => {
                for entry in index.entries() {
                    if self.signatures.matches(&entry.name) {
                        self.pending.push_back(Finding {
                            location: Location::Entry {
                                archive: path.to_path_buf(),
                                name: entry.name.clone(),
                            },
                            matched: true,
                        });
                    }
                }
            }
            Err(e) if e.is_format() => {
                warn!("not a usable ZIP archive, skipping {}: {e}", path.display());
            }
            Err(e) => {
                warn!("failed reading {}: {e}", path.display());
            }
        }
    }
}

impl Iterator for Scanner {
    type Item = Finding;

    fn next(&mut self) -> Option<Finding> {
        loop {
            if let Some(finding) = self.pending.pop_front() {
                return Some(finding);
            }
            match self.walker.next()? {
                Ok(entry) => {
                    if entry.file_type().is_file() {
                        self.scan_file(entry.path());
                    }
                }
                Err(e) => warn!("walk error: {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::testutil::stored_archive;

    const JNDI_CLASS: &str = "org/apache/logging/log4j/core/lookup/JndiLookup.class";

    #[test]
    fn signature_matching_ignores_case() {
        let set = SignatureSet::default();
        assert!(set.matches(JNDI_CLASS));
        assert!(set.matches("JNDILOOKUP.CLASS"));
        assert!(!set.matches("org/apache/logging/log4j/core/lookup/Interpolator.class"));

        let custom = SignatureSet::new(["EvilClass", "Backdoor"]);
        assert!(custom.matches("com/example/evilclass.bin"));
        assert!(custom.matches("BACKDOOR.txt"));
        assert!(!custom.matches("com/example/Benign.class"));
    }

    #[test]
    fn locations_render_like_paths() {
        let file = Location::File(PathBuf::from("/tmp/JndiLookup.class"));
        assert_eq!(file.to_string(), "/tmp/JndiLookup.class");

        let entry = Location::Entry {
            archive: PathBuf::from("/tmp/app.jar"),
            name: JNDI_CLASS.to_string(),
        };
        assert_eq!(entry.to_string(), format!("/tmp/app.jar:{JNDI_CLASS}"));
    }

    #[test]
    fn reports_matching_entries_not_the_clean_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.txt"), b"nothing to see").unwrap();
        let jar = dir.path().join("app.jar");
        fs::write(
            &jar,
            stored_archive(&[
                ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
                (JNDI_CLASS, b"\xCA\xFE\xBA\xBE"),
            ]),
        )
        .unwrap();

        let findings: Vec<Finding> = Scanner::new(dir.path(), SignatureSet::default()).collect();
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].location,
            Location::Entry {
                archive: jar.clone(),
                name: JNDI_CLASS.to_string(),
            }
        );
        assert!(findings[0].matched);
    }

    #[test]
    fn reports_plain_files_whose_name_matches() {
        let dir = tempfile::tempdir().unwrap();
        let loose = dir.path().join("JndiLookup.class");
        fs::write(&loose, b"\xCA\xFE\xBA\xBE").unwrap();

        let findings: Vec<Finding> = Scanner::new(dir.path(), SignatureSet::default()).collect();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].location, Location::File(loose));
    }

    #[test]
    fn scans_a_single_archive_given_as_root() {
        let dir = tempfile::tempdir().unwrap();
        let jar = dir.path().join("core.jar");
        fs::write(&jar, stored_archive(&[(JNDI_CLASS, b"\xCA\xFE")])).unwrap();

        let findings: Vec<Finding> = Scanner::new(&jar, SignatureSet::default()).collect();
        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].to_string(),
            format!("{}:{JNDI_CLASS}", jar.display())
        );
    }

    #[test]
    fn broken_archives_are_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // ZIP magic followed by garbage: probes as an archive, fails to
        // index.
        let mut bytes = b"PK\x03\x04".to_vec();
        bytes.extend_from_slice(&[0x00; 64]);
        fs::write(dir.path().join("broken.jar"), &bytes).unwrap();
        fs::write(
            dir.path().join("fine.jar"),
            stored_archive(&[(JNDI_CLASS, b"\xCA\xFE")]),
        )
        .unwrap();

        let findings: Vec<Finding> = Scanner::new(dir.path(), SignatureSet::default()).collect();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].to_string().ends_with(JNDI_CLASS));
    }

    #[test]
    fn non_archives_are_ignored_silently() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), b"plain text, no magic").unwrap();
        fs::write(dir.path().join("tiny"), b"PK").unwrap();

        let findings: Vec<Finding> = Scanner::new(dir.path(), SignatureSet::default()).collect();
        assert!(findings.is_empty());
    }

    #[test]
    fn recognizes_both_archive_magics() {
        assert!(is_zip_magic(b"PK\x03\x04"));
        // An entry-less archive starts straight at its EOCD record.
        assert!(is_zip_magic(b"PK\x05\x06"));
        assert!(!is_zip_magic(b"PK\x01\x02"));
        assert!(!is_zip_magic(&[0x7F, b'E', b'L', b'F']));
    }

    #[test]
    fn entryless_archives_scan_clean() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("gutted.jar"), stored_archive(&[])).unwrap();

        let findings: Vec<Finding> = Scanner::new(dir.path(), SignatureSet::default()).collect();
        assert!(findings.is_empty());
    }

    #[test]
    fn rescanning_an_untouched_tree_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("JndiLookup.class"), b"\xCA\xFE").unwrap();
        fs::write(
            dir.path().join("app.jar"),
            stored_archive(&[(JNDI_CLASS, b"\xCA\xFE"), ("clean.txt", b"ok")]),
        )
        .unwrap();

        let first: Vec<Finding> = Scanner::new(dir.path(), SignatureSet::default()).collect();
        let second: Vec<Finding> = Scanner::new(dir.path(), SignatureSet::default()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn walks_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("lib").join("deep");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            nested.join("app.jar"),
            stored_archive(&[(JNDI_CLASS, b"\xCA\xFE")]),
        )
        .unwrap();

        let findings: Vec<Finding> = Scanner::new(dir.path(), SignatureSet::default()).collect();
        assert_eq!(findings.len(), 1);
    }
}
