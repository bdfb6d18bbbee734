//! Reflect Digest: Compute MD5 or SHA-256 Fingerprints from the Command Line
//!
//! This application computes the hex digest of its arguments, of standard
//! input, or of a file, using the `utils` module of the library.
//!
//! ## Purpose
//! Produces the same fingerprint the library computes for a sequence of
//! values: every positional argument is concatenated with no separator and
//! the result is hashed as UTF-8.
//!
//! ## Dependencies
//! - **`clap`**: For parsing command-line arguments and environment defaults.
//! - **`log` and `env_logger`**: For structured logging instead of `println!`.
//! - **`serde_json`**: For the `--json` output format.
//! - **`anyhow`**: For error context in the binary.
//!
//! ## Usage
//! 1. Digest a string:
//!    ```sh
//!    cargo run -- "hello world"
//!    ```
//! 2. Digest several values as one fingerprint:
//!    ```sh
//!    cargo run -- user 42 true
//!    ```
//! 3. Digest a file with SHA-256:
//!    ```sh
//!    cargo run -- --algorithm sha256 --file Cargo.toml
//!    ```
//! 4. Set the default algorithm through the environment:
//!    ```sh
//!    export DIGEST_ALGORITHM=sha256
//!    echo -n abc | cargo run -- --stdin
//!    ```
//! 5. Logs are controlled by the `RUST_LOG` environment variable:
//!    ```sh
//!    RUST_LOG=debug cargo run -- --file Cargo.toml
//!    ```

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use reflect_digest::utils::{digest_file, digest_reader, digest_with, Algorithm};
use serde_json::json;
use std::io;
use std::path::PathBuf;

/// Command-line arguments for the digest tool.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Values to digest; concatenated with no separator.
    #[clap(conflicts_with_all = ["file", "stdin"])]
    parts: Vec<String>,

    /// Hash algorithm: md5 or sha256.
    #[clap(short, long, env = "DIGEST_ALGORITHM", default_value = "md5")]
    algorithm: Algorithm,

    /// Digest the raw content of this file.
    #[clap(short, long, conflicts_with = "stdin")]
    file: Option<PathBuf>,

    /// Digest everything read from standard input.
    #[clap(long, action)]
    stdin: bool,

    /// Print a JSON object instead of the bare digest.
    #[clap(long, action)]
    json: bool,
}

/// Computes and prints the digest selected by the command-line arguments.
///
/// # Returns
/// - `Ok(())` if the digest was computed and printed.
/// - `Err(anyhow::Error)` if the input file or standard input cannot be read.
fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();
    let algorithm = args.algorithm;

    let (input, digest) = if let Some(path) = &args.file {
        info!("Digesting file {} with {}", path.display(), algorithm);
        let digest = digest_file(algorithm, path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        (path.display().to_string(), digest)
    } else if args.stdin {
        info!("Digesting standard input with {}", algorithm);
        let digest = digest_reader(algorithm, io::stdin().lock())
            .context("Failed to read standard input")?;
        ("-".to_string(), digest)
    } else {
        let text = args.parts.concat();
        info!("Digesting {} part(s) with {}", args.parts.len(), algorithm);
        let digest = digest_with(algorithm, text.as_bytes());
        (text, digest)
    };

    if args.json {
        let output = json!({
            "algorithm": algorithm.to_string(),
            "input": input,
            "digest": digest,
        });
        println!("{}", output);
    } else {
        println!("{}", digest);
    }

    Ok(())
}
