//! Bean grammar.
//!
//! A bean is a shell script. Its dependencies are declared on a single
//! `depends=(...)` line; everything else is opaque script body:
//!
//! ```text
//! #!/bin/bash
//! depends=(zlib "openssl" curl.bean)
//!
//! remove() { rm -f /usr/local/bin/tool; }
//! if [ "$1" = "remove" ]; then remove; exit 0; fi
//! make install
//! ```
//!
//! The whole file is the install script. When it defines a `remove`
//! handler (a `remove()` function or a `remove)` case arm) the uninstall
//! action is the same script invoked with the argument `remove`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{EspressoError, Result};

use super::manifest::{is_valid_name, Manifest, Script};

/// Argument passed to a bean's script to run its uninstall action.
pub const REMOVE_ARG: &str = "remove";

static DEPENDS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^depends\s*=\s*\((?P<names>[^()]*)\)\s*(?:#.*)?$").expect("valid regex")
});

static REMOVE_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(?:function\s+remove\b|remove\s*\(\s*\)|remove\s*\))")
        .expect("valid regex")
});

/// Turns raw manifest bytes into a [`Manifest`].
pub trait ManifestParser {
    /// Parse the bean fetched for `name`.
    fn parse(&self, name: &str, raw: &[u8]) -> Result<Manifest>;
}

/// Parser for the canonical bean grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeanParser;

impl BeanParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self
    }
}

impl ManifestParser for BeanParser {
    fn parse(&self, name: &str, raw: &[u8]) -> Result<Manifest> {
        let syntax = |message: String| EspressoError::ManifestSyntax {
            package: name.to_string(),
            message,
        };

        let body = std::str::from_utf8(raw)
            .map_err(|e| syntax(format!("bean is not valid UTF-8: {}", e)))?;

        let mut dependencies: Option<Vec<String>> = None;

        for (index, line) in body.lines().enumerate() {
            let line = line.trim();
            if !line.starts_with("depends") {
                continue;
            }
            // Lines like `dependsOn=1` are ordinary script text.
            let rest = line["depends".len()..].trim_start();
            if !rest.starts_with('=') {
                continue;
            }

            let lineno = index + 1;
            if dependencies.is_some() {
                return Err(syntax(format!("line {}: duplicate depends declaration", lineno)));
            }

            let caps = DEPENDS_LINE.captures(line).ok_or_else(|| {
                syntax(format!("line {}: expected depends=(name ...)", lineno))
            })?;

            let mut names = Vec::new();
            for token in caps["names"].split_whitespace() {
                let dep = normalize_token(token);
                if !is_valid_name(dep) {
                    return Err(syntax(format!(
                        "line {}: invalid dependency name '{}'",
                        lineno, token
                    )));
                }
                names.push(dep.to_string());
            }
            dependencies = Some(names);
        }

        let manifest = Manifest::new(name, dependencies.unwrap_or_default(), Script::new(body))?;

        if REMOVE_HANDLER.is_match(body) {
            Ok(manifest.with_uninstall(Script::new(body).with_arg(REMOVE_ARG)))
        } else {
            Ok(manifest)
        }
    }
}

/// Strip quotes and a trailing `.bean` suffix from a dependency token.
fn normalize_token(token: &str) -> &str {
    let unquoted = token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .or_else(|| token.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')))
        .unwrap_or(token);
    unquoted.strip_suffix(".bean").unwrap_or(unquoted)
}
