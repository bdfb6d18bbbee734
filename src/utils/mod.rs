//! # Digest Utilities
//!
//! This module computes stable fingerprints of strings, of sequences of
//! displayable values, of byte buffers and of files.
//!
//! ## Submodules
//!
//! - **digest**: MD5 (default) and SHA-256 hex digests.

mod digest;

pub use digest::{
    digest, digest_bytes, digest_concat, digest_file, digest_reader, digest_with, Algorithm,
    UnknownAlgorithm,
};
