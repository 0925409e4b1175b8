//! Argument tokenization and filename confinement
//!
//! Splits the caller's argument string into tokens and forces the value of
//! `--filename` into the base directory. Every other token passes through
//! untouched.

use std::path::{Component, Path, PathBuf};

use crate::types::RelayError;

/// The only argument that receives special handling
pub const FILENAME_FLAG: &str = "--filename";

/// Split an argument string into tokens using POSIX shell-word rules
///
/// Quotes group words but nothing is expanded. An unbalanced quote is
/// rejected before any process is spawned.
pub fn split_arguments(arguments: &str) -> Result<Vec<String>, RelayError> {
    shell_words::split(arguments).map_err(|e| RelayError::InvalidArguments(e.to_string()))
}

/// Rewrite every `--filename` value so it lands inside `base_dir`
///
/// Handles both `--filename <value>` and `--filename=<value>`. With no base
/// directory the tokens are returned unchanged. A `--filename` with no value
/// (last token, or followed by another flag) is left for the tool to reject.
pub fn rewrite_filename(tokens: Vec<String>, base_dir: Option<&Path>) -> Vec<String> {
    let Some(base_dir) = base_dir else {
        return tokens;
    };

    let mut rewritten = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        if token == FILENAME_FLAG {
            rewritten.push(token);
            if let Some(value) = iter.next_if(|next| !next.starts_with("--")) {
                let confined = confine_path(&value, base_dir);
                tracing::debug!("Rewrote filename '{}' to '{}'", value, confined.display());
                rewritten.push(path_to_arg(&confined));
            }
        } else if let Some(value) = token.strip_prefix("--filename=") {
            let confined = confine_path(value, base_dir);
            tracing::debug!("Rewrote filename '{}' to '{}'", value, confined.display());
            rewritten.push(format!("{}={}", FILENAME_FLAG, path_to_arg(&confined)));
        } else {
            rewritten.push(token);
        }
    }

    rewritten
}

/// Place `value` inside `base_dir`
///
/// - already inside `base_dir` (and free of `..`): kept as is
/// - absolute: reduced to its file name
/// - relative: normal components kept, `.` and `..` dropped
pub fn confine_path(value: &str, base_dir: &Path) -> PathBuf {
    let path = Path::new(value);
    let has_parent_refs = path.components().any(|c| c == Component::ParentDir);

    if path.starts_with(base_dir) && !has_parent_refs {
        return path.to_path_buf();
    }

    if path.is_absolute() {
        return match path.file_name() {
            Some(name) => base_dir.join(name),
            None => base_dir.to_path_buf(),
        };
    }

    let mut confined = base_dir.to_path_buf();
    for component in path.components() {
        if let Component::Normal(part) = component {
            confined.push(part);
        }
    }
    confined
}

fn path_to_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
