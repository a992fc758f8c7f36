//! ZIP archive indexing and in-place editing.
//!
//! This module provides functionality for reading ZIP central
//! directories and for removing individual entries from an archive
//! without rewriting it from scratch.
//!
//! ## Architecture
//!
//! The module is organized into four components:
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, directory records)
//! - [`index`]: Read-only central directory parsing ([`ZipIndex`])
//! - [`editor`]: In-place entry removal and directory rewrite ([`ZipEditor`])
//! - [`error`]: The error taxonomy shared by both
//!
//! Read-only and mutating access are separate types on purpose: a
//! [`ZipIndex`] can never dirty an archive, and only a [`ZipEditor`]
//! (opened on a writable stream) carries the state a removal needs.
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! This implementation reads the EOCD first (from the end of the file),
//! then the Central Directory, which allows listing and editing without
//! ever touching entry payloads.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - Archives with trailing comments
//! - Any compression method: payloads are moved, never decoded
//!
//! ## Limitations
//!
//! - No ZIP64 extensions; large archives are rejected up front
//! - No encryption support
//! - No multi-disk archive support

mod editor;
mod error;
mod index;
mod structures;

pub use editor::ZipEditor;
pub use error::{Error, Result};
pub use index::ZipIndex;
pub use structures::*;
