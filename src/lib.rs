//! Reflect Digest Library
//!
//! This library provides reflective access to the members of registered
//! Rust types and MD5/SHA-256 hex digests of strings, values and files.
//!

pub mod reflect;
pub mod utils;
