use sha2::{Digest, Sha256};
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Size of the chunks fed to the hasher when digesting a reader.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Hash algorithms a digest can be computed with.
///
/// `Md5` is the default and the algorithm behind [`digest`] and
/// [`digest_concat`]. MD5 is broken for security purposes; use it for
/// fingerprints and cache keys only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    Md5,
    Sha256,
}

impl Algorithm {
    /// Length of the hex rendering of a digest produced by this algorithm.
    pub fn hex_len(self) -> usize {
        match self {
            Algorithm::Md5 => 32,
            Algorithm::Sha256 => 64,
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Md5 => f.write_str("md5"),
            Algorithm::Sha256 => f.write_str("sha256"),
        }
    }
}

/// Returned when an algorithm name does not match any supported algorithm.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported digest algorithm: {0} (supported: md5, sha256)")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md5" => Ok(Algorithm::Md5),
            "sha256" | "sha-256" => Ok(Algorithm::Sha256),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Computes the MD5 digest of a string.
///
/// The string is hashed as UTF-8 and each of the 16 output bytes is
/// rendered as two lowercase hex characters, so the result is always
/// 32 characters long.
///
/// # Examples
///
/// ```rust
/// use reflect_digest::utils::digest;
/// assert_eq!(digest(""), "d41d8cd98f00b204e9800998ecf8427e");
/// ```
pub fn digest(text: &str) -> String {
    digest_bytes(text.as_bytes())
}

/// Computes the MD5 digest of the concatenated `Display` text of `parts`.
///
/// Parts are rendered in iteration order and joined with no separator,
/// so `digest_concat(["ab", "c"])` equals `digest("abc")`.
///
/// # Examples
///
/// ```rust
/// use reflect_digest::utils::{digest, digest_concat};
/// use std::fmt::Display;
///
/// let parts: [&dyn Display; 3] = [&"user", &42, &true];
/// assert_eq!(digest_concat(parts), digest("user42true"));
/// ```
pub fn digest_concat<I>(parts: I) -> String
where
    I: IntoIterator,
    I::Item: Display,
{
    let mut text = String::new();
    for part in parts {
        text.push_str(&part.to_string());
    }
    digest(&text)
}

/// Computes the MD5 digest of raw bytes.
pub fn digest_bytes(data: &[u8]) -> String {
    digest_with(Algorithm::Md5, data)
}

/// Computes the digest of raw bytes with the given algorithm.
pub fn digest_with(algorithm: Algorithm, data: &[u8]) -> String {
    match algorithm {
        Algorithm::Md5 => {
            let mut context = md5::Context::new();
            context.consume(data);
            hex::encode(context.compute().0)
        }
        Algorithm::Sha256 => {
            let mut hasher = Sha256::new();
            hasher.update(data);
            hex::encode(hasher.finalize())
        }
    }
}

/// Computes the digest of everything `reader` yields, reading it in chunks.
pub fn digest_reader<R: Read>(algorithm: Algorithm, mut reader: R) -> io::Result<String> {
    let mut buf = [0u8; READ_CHUNK_SIZE];
    match algorithm {
        Algorithm::Md5 => {
            let mut context = md5::Context::new();
            loop {
                let n = reader.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                context.consume(&buf[..n]);
            }
            Ok(hex::encode(context.compute().0))
        }
        Algorithm::Sha256 => {
            let mut hasher = Sha256::new();
            loop {
                let n = reader.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                hasher.update(&buf[..n]);
            }
            Ok(hex::encode(hasher.finalize()))
        }
    }
}

/// Computes the digest of a file's raw content.
pub fn digest_file<P: AsRef<Path>>(algorithm: Algorithm, path: P) -> io::Result<String> {
    let file = File::open(path.as_ref())?;
    log::debug!("Hashing {} with {}", path.as_ref().display(), algorithm);
    digest_reader(algorithm, BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_digest_known_vectors() {
        assert_eq!(digest(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(digest("a"), "0cc175b9c0f1b6a831c399e269772661");
        assert_eq!(digest("abc"), "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(
            digest("The quick brown fox jumps over the lazy dog"),
            "9e107d9d372bb6826bd81d3542a419d6"
        );
    }

    #[test]
    fn test_digest_is_lowercase_and_fixed_length() {
        let d = digest("fingerprint 2022-04-09 00:29:37");
        assert_eq!(d.len(), 32);
        assert!(d.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_eq!(d, digest("fingerprint 2022-04-09 00:29:37"));
    }

    #[test]
    fn test_digest_hashes_utf8_bytes() {
        let text = "gr\u{fc}\u{df}e";
        assert_eq!(digest(text), digest_bytes(text.as_bytes()));
        assert_ne!(digest(text), digest("grusse"));
    }

    #[test]
    fn test_digest_concat_matches_joined_text() {
        let parts: [&dyn Display; 3] = [&"a", &1, &'c'];
        assert_eq!(digest_concat(parts), digest("a1c"));
        assert_eq!(digest_concat(["ab", "c"]), digest("abc"));
        assert_eq!(digest_concat(Vec::<String>::new()), digest(""));
    }

    #[test]
    fn test_digest_concat_is_order_sensitive() {
        assert_ne!(digest_concat(["x", "y", "z"]), digest_concat(["z", "y", "x"]));
        // Same concatenation, different split: same digest
        assert_eq!(digest_concat(["xy", "z"]), digest_concat(["x", "yz"]));
    }

    #[test]
    fn test_digest_with_sha256() {
        assert_eq!(
            digest_with(Algorithm::Sha256, b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            digest_with(Algorithm::Sha256, b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(digest_with(Algorithm::Sha256, b"abc").len(), Algorithm::Sha256.hex_len());
    }

    #[test]
    fn test_digest_reader_matches_in_memory() {
        let data = vec![b'x'; READ_CHUNK_SIZE * 2 + 17];
        for algorithm in [Algorithm::Md5, Algorithm::Sha256] {
            let streamed = digest_reader(algorithm, Cursor::new(&data)).unwrap();
            assert_eq!(streamed, digest_with(algorithm, &data));
        }
    }

    #[test]
    fn test_digest_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"abc").unwrap();
        file.flush().unwrap();

        assert_eq!(
            digest_file(Algorithm::Md5, file.path()).unwrap(),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            digest_file(Algorithm::Sha256, file.path()).unwrap(),
            digest_with(Algorithm::Sha256, b"abc")
        );
    }

    #[test]
    fn test_digest_file_missing() {
        let dir = TempDir::new().unwrap();
        let result = digest_file(Algorithm::Md5, dir.path().join("missing"));
        assert!(result.is_err());
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("MD5".parse::<Algorithm>(), Ok(Algorithm::Md5));
        assert_eq!("sha-256".parse::<Algorithm>(), Ok(Algorithm::Sha256));
        assert_eq!(
            "sha1".parse::<Algorithm>(),
            Err(UnknownAlgorithm("sha1".to_string()))
        );
        assert_eq!(Algorithm::default().to_string(), "md5");
    }
}
