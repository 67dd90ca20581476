//! Environment file layering and parsing
//!
//! The assembled environment is a plain concatenation of up to four sources,
//! in precedence order. Consumers re-parse it with last-write-wins semantics,
//! which [`parse_env_vars`] reproduces.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

/// Assembled environment file written into the stack directory.
pub const ASSEMBLED_ENV_FILE: &str = ".env";

/// Stack-local environment file; `env.<arch>` and `env.<mode>` derive from it.
pub const STACK_ENV_FILE: &str = "env";

/// Kind of source contributing to the assembled environment, lowest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnvLayer {
    Global,
    Stack,
    Arch,
    Mode,
}

/// Candidate source file for one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSource {
    pub layer: EnvLayer,
    pub path: PathBuf,
}

/// Candidate sources in concatenation order. Existence is not checked here.
pub fn env_sources(
    global_env: &Path,
    stack_dir: &Path,
    arch: &str,
    mode: Option<&str>,
) -> Vec<EnvSource> {
    let mut sources = vec![
        EnvSource {
            layer: EnvLayer::Global,
            path: global_env.to_path_buf(),
        },
        EnvSource {
            layer: EnvLayer::Stack,
            path: stack_dir.join(STACK_ENV_FILE),
        },
        EnvSource {
            layer: EnvLayer::Arch,
            path: stack_dir.join(format!("{STACK_ENV_FILE}.{arch}")),
        },
    ];
    if let Some(mode) = mode.filter(|m| !m.is_empty()) {
        sources.push(EnvSource {
            layer: EnvLayer::Mode,
            path: stack_dir.join(format!("{STACK_ENV_FILE}.{mode}")),
        });
    }
    sources
}

/// Concatenate source contents verbatim, byte for byte.
///
/// A newline is inserted between two sources only when the first one does not
/// already end with one.
pub fn concat_sources<'a>(contents: impl IntoIterator<Item = &'a [u8]>) -> Vec<u8> {
    let mut out = Vec::new();
    for content in contents {
        if !out.is_empty() && out.last() != Some(&b'\n') {
            out.push(b'\n');
        }
        out.extend_from_slice(content);
    }
    out
}

fn assignment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=(.*)$").expect("valid regex")
    })
}

/// Parse `KEY=value` / `export KEY=value` lines.
///
/// Later assignments override earlier ones but keep the position of the first
/// occurrence. Lines that are not assignments are ignored.
pub fn parse_env_vars(content: &str) -> Vec<(String, String)> {
    let mut vars: Vec<(String, String)> = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some(caps) = assignment_re().captures(trimmed) else {
            continue;
        };
        let key = caps[1].to_string();
        let value = strip_quotes(strip_trailing_comment(&caps[2]));
        match vars.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => vars.push((key, value)),
        }
    }
    vars
}

/// Strip trailing comment from a value, respecting quotes.
/// `'value'  # comment` → `'value'`
/// `value  # comment` → `value`
/// `val#ue` → `val#ue` (a comment needs leading whitespace)
fn strip_trailing_comment(s: &str) -> &str {
    let s = s.trim();
    let bytes = s.as_bytes();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\'' if !in_double_quote => in_single_quote = !in_single_quote,
            b'"' if !in_single_quote => in_double_quote = !in_double_quote,
            b'#' if !in_single_quote
                && !in_double_quote
                && (i == 0 || bytes[i - 1].is_ascii_whitespace()) =>
            {
                return s[..i].trim_end();
            }
            _ => {}
        }
    }
    s
}

/// Strip surrounding quotes (single or double) from a value.
fn strip_quotes(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        return s[1..s.len() - 1].to_string();
    }
    s.to_string()
}

/// Expand environment variables in a path string.
///
/// Supports `$VAR`, `${VAR}` and `~`. Unresolvable input is returned unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
