//! Where bean bytes come from.
//!
//! A [`BeanSource`] hands out raw bean content by package name. Two
//! implementations exist: [`HttpSource`] for a remote bean repository and
//! [`DirSource`] for a local directory of `*.bean` files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::error::{EspressoError, FetchErrorKind, Result};

/// File extension used by beans.
pub const BEAN_EXTENSION: &str = "bean";

/// Default remote bean repository.
pub const DEFAULT_SOURCE: &str = "https://raw.githubusercontent.com/rudyon/espresso/main/beans";

static BEAN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]+)\.bean""#).expect("valid regex"));

/// Supplies raw bean content.
pub trait BeanSource {
    /// Fetch the raw bytes of the bean for `name`.
    fn fetch_raw(&self, name: &str) -> Result<Vec<u8>>;

    /// List the names of all beans the source offers.
    fn available(&self) -> Result<Vec<String>>;

    /// Human-readable location of the source.
    fn describe(&self) -> String;
}

impl<S: BeanSource + ?Sized> BeanSource for Box<S> {
    fn fetch_raw(&self, name: &str) -> Result<Vec<u8>> {
        (**self).fetch_raw(name)
    }

    fn available(&self) -> Result<Vec<String>> {
        (**self).available()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Build a source from a location string.
///
/// `http://` and `https://` locations are remote; `file://` locations and
/// plain paths are local directories.
pub fn source_from_location(location: &str, timeout: Duration) -> Result<Box<dyn BeanSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::with_timeout(location, timeout)?))
    } else {
        let path = location.strip_prefix("file://").unwrap_or(location);
        Ok(Box::new(DirSource::new(path)))
    }
}

fn fetch_error(name: &str, kind: FetchErrorKind, message: impl Into<String>) -> EspressoError {
    EspressoError::ManifestFetch {
        package: name.to_string(),
        kind,
        message: message.into(),
    }
}

/// Fetches beans over HTTP/HTTPS.
pub struct HttpSource {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpSource {
    /// Create a new HTTP source with the default 30-second timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Create a new HTTP source with a custom timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent("espresso")
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Get the configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// URL of the bean for `name`.
    pub fn bean_url(&self, name: &str) -> String {
        format!("{}/{}.{}", self.base_url, name, BEAN_EXTENSION)
    }
}

impl BeanSource for HttpSource {
    fn fetch_raw(&self, name: &str) -> Result<Vec<u8>> {
        let url = self.bean_url(name);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| fetch_error(name, FetchErrorKind::Transport, e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(fetch_error(
                name,
                FetchErrorKind::NotFound,
                format!("no bean at {}", url),
            ));
        }
        if !status.is_success() {
            return Err(fetch_error(
                name,
                FetchErrorKind::Transport,
                format!("HTTP {} fetching {}", status, url),
            ));
        }

        let bytes = response
            .bytes()
            .map_err(|e| fetch_error(name, FetchErrorKind::Transport, e.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn available(&self) -> Result<Vec<String>> {
        let listing_url = format!("{}/", self.base_url);
        let listing = |message: String| EspressoError::Other(anyhow::anyhow!(message));

        let response = self
            .client
            .get(&listing_url)
            .send()
            .map_err(|e| listing(format!("Failed to fetch bean listing: {}", e)))?;

        if !response.status().is_success() {
            return Err(listing(format!(
                "HTTP {} fetching {}",
                response.status(),
                listing_url
            )));
        }

        let body = response
            .text()
            .map_err(|e| listing(format!("Failed to read bean listing: {}", e)))?;

        Ok(names_from_listing(&body))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Extract bean names from an HTML directory listing.
///
/// Links may be relative or absolute; only the final path segment is kept.
pub fn names_from_listing(html: &str) -> Vec<String> {
    let mut names: Vec<String> = BEAN_LINK
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().rsplit('/').next().unwrap_or_default().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Reads beans from a local directory.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding the beans.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the bean for `name`.
    pub fn bean_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, BEAN_EXTENSION))
    }
}

impl BeanSource for DirSource {
    fn fetch_raw(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.bean_path(name);
        fs::read(&path).map_err(|e| {
            let kind = if e.kind() == std::io::ErrorKind::NotFound {
                FetchErrorKind::NotFound
            } else {
                FetchErrorKind::Transport
            };
            fetch_error(name, kind, format!("{}: {}", path.display(), e))
        })
    }

    fn available(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(BEAN_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn dir_source_reads_bean() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("vim.bean"), "echo vim").unwrap();

        let source = DirSource::new(temp.path());
        assert_eq!(source.fetch_raw("vim").unwrap(), b"echo vim");
    }

    #[test]
    fn dir_source_missing_bean_is_not_found() {
        let temp = TempDir::new().unwrap();
        let source = DirSource::new(temp.path());

        let err = source.fetch_raw("ghost").unwrap_err();
        assert!(matches!(
            err,
            EspressoError::ManifestFetch {
                kind: FetchErrorKind::NotFound,
                ..
            }
        ));
    }

    #[test]
    fn dir_source_lists_only_beans() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("vim.bean"), "").unwrap();
        fs::write(temp.path().join("curl.bean"), "").unwrap();
        fs::write(temp.path().join("README.md"), "").unwrap();

        let source = DirSource::new(temp.path());
        assert_eq!(source.available().unwrap(), vec!["curl", "vim"]);
    }

    #[test]
    fn location_selects_source_kind() {
        let timeout = Duration::from_secs(5);
        let remote = source_from_location("https://example.com/beans/", timeout).unwrap();
        assert_eq!(remote.describe(), "https://example.com/beans");

        let local = source_from_location("file:///srv/beans", timeout).unwrap();
        assert_eq!(local.describe(), "/srv/beans");
    }

    #[test]
    fn listing_extracts_bean_names() {
        let html = r#"
            <a href="vim.bean">vim.bean</a>
            <a href="/rudyon/espresso/blob/main/beans/curl.bean">curl.bean</a>
            <a href="notes.txt">notes</a>
            <a href="vim.bean">again</a>
        "#;
        assert_eq!(names_from_listing(html), vec!["curl", "vim"]);
    }

    #[test]
    fn http_source_fetches_bean() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/beans/htop.bean");
            then.status(200).body("depends=(ncurses)\nmake install\n");
        });

        let source = HttpSource::new(&server.url("/beans/")).unwrap();
        let raw = source.fetch_raw("htop").unwrap();
        assert!(String::from_utf8(raw).unwrap().contains("ncurses"));
    }

    #[test]
    fn http_source_maps_404_to_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/beans/ghost.bean");
            then.status(404);
        });

        let source = HttpSource::new(&server.url("/beans")).unwrap();
        let err = source.fetch_raw("ghost").unwrap_err();
        assert!(matches!(
            err,
            EspressoError::ManifestFetch {
                kind: FetchErrorKind::NotFound,
                ..
            }
        ));
    }

    #[test]
    fn http_source_maps_server_error_to_transport() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/beans/flaky.bean");
            then.status(503);
        });

        let source = HttpSource::new(&server.url("/beans")).unwrap();
        let err = source.fetch_raw("flaky").unwrap_err();
        assert!(matches!(
            err,
            EspressoError::ManifestFetch {
                kind: FetchErrorKind::Transport,
                ..
            }
        ));
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn http_source_lists_available_beans() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/beans/");
            then.status(200)
                .body(r#"<a href="git.bean">git</a><a href="zsh.bean">zsh</a>"#);
        });

        let source = HttpSource::new(&server.url("/beans")).unwrap();
        assert_eq!(source.available().unwrap(), vec!["git", "zsh"]);
    }

    #[test]
    fn default_timeout_is_30_seconds() {
        let source = HttpSource::new("https://example.com").unwrap();
        assert_eq!(source.timeout(), Duration::from_secs(30));
    }
}
