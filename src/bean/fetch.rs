//! Manifest fetching.
//!
//! [`ManifestFetcher`] is the narrow interface the resolver consumes.
//! [`SourceFetcher`] combines a [`BeanSource`] with a [`ManifestParser`]
//! and optionally verifies pinned SHA-256 digests before anything is
//! parsed.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::error::{EspressoError, Result};

use super::manifest::Manifest;
use super::parser::ManifestParser;
use super::source::BeanSource;

/// Produces a parsed manifest for a package name.
pub trait ManifestFetcher {
    /// Fetch and parse the manifest for `name`.
    fn fetch(&self, name: &str) -> Result<Manifest>;
}

impl<F> ManifestFetcher for F
where
    F: Fn(&str) -> Result<Manifest>,
{
    fn fetch(&self, name: &str) -> Result<Manifest> {
        self(name)
    }
}

/// Hex-encoded SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    hex::encode(&digest[..])
}

/// Fetches beans from a source and parses them.
pub struct SourceFetcher<S, P> {
    source: S,
    parser: P,
    pins: HashMap<String, String>,
}

impl<S: BeanSource, P: ManifestParser> SourceFetcher<S, P> {
    /// Create a fetcher without integrity pins.
    pub fn new(source: S, parser: P) -> Self {
        Self {
            source,
            parser,
            pins: HashMap::new(),
        }
    }

    /// Require the given packages to match their SHA-256 digests.
    pub fn with_pins(mut self, pins: HashMap<String, String>) -> Self {
        self.pins = pins
            .into_iter()
            .map(|(name, digest)| (name, digest.to_ascii_lowercase()))
            .collect();
        self
    }

    /// The underlying bean source.
    pub fn source(&self) -> &S {
        &self.source
    }

    fn verify(&self, name: &str, raw: &[u8]) -> Result<()> {
        let actual = sha256_hex(raw);
        tracing::debug!("bean {} sha256 {}", name, actual);

        match self.pins.get(name) {
            Some(expected) if *expected != actual => Err(EspressoError::IntegrityMismatch {
                package: name.to_string(),
                expected: expected.clone(),
                actual,
            }),
            _ => Ok(()),
        }
    }
}

impl<S: BeanSource, P: ManifestParser> ManifestFetcher for SourceFetcher<S, P> {
    fn fetch(&self, name: &str) -> Result<Manifest> {
        let raw = self.source.fetch_raw(name)?;
        self.verify(name, &raw)?;
        self.parser.parse(name, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bean::{BeanParser, DirSource};
    use std::fs;
    use tempfile::TempDir;

    fn source_with(beans: &[(&str, &str)]) -> (TempDir, DirSource) {
        let temp = TempDir::new().unwrap();
        for (name, body) in beans {
            fs::write(temp.path().join(format!("{}.bean", name)), body).unwrap();
        }
        let source = DirSource::new(temp.path());
        (temp, source)
    }

    #[test]
    fn sha256_hex_matches_known_digest() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn fetch_parses_bean() {
        let (_temp, source) = source_with(&[("git", "depends=(curl)\nmake install\n")]);
        let fetcher = SourceFetcher::new(source, BeanParser::new());

        let manifest = fetcher.fetch("git").unwrap();
        assert_eq!(manifest.dependencies(), &["curl"]);
    }

    #[test]
    fn matching_pin_is_accepted() {
        let body = "echo pinned\n";
        let (_temp, source) = source_with(&[("tool", body)]);
        let pins = HashMap::from([("tool".to_string(), sha256_hex(body.as_bytes()).to_uppercase())]);
        let fetcher = SourceFetcher::new(source, BeanParser::new()).with_pins(pins);

        assert!(fetcher.fetch("tool").is_ok());
    }

    #[test]
    fn mismatched_pin_is_rejected_before_parsing() {
        let (_temp, source) = source_with(&[("tool", "depends=(broken\n")]);
        let pins = HashMap::from([("tool".to_string(), "0".repeat(64))]);
        let fetcher = SourceFetcher::new(source, BeanParser::new()).with_pins(pins);

        let err = fetcher.fetch("tool").unwrap_err();
        assert!(matches!(err, EspressoError::IntegrityMismatch { .. }));
    }

    #[test]
    fn closures_are_fetchers() {
        let fetcher = |name: &str| {
            Manifest::new(name, Vec::new(), crate::bean::Script::new("true"))
        };
        assert_eq!(fetcher.fetch("x").unwrap().name(), "x");
    }
}
