//! Fragment input resolution
//!
//! The positional argument is either the fragment itself or the path of a
//! fragment list (one fragment per line).

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::core::model::Fragment;

/// Extensions that mark the argument as a fragment list rather than literal text
pub const FRAGMENT_FILE_EXTENSIONS: [&str; 3] = ["txt", "lst", "list"];

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Please provide a non-empty text fragment.")]
    EmptyArgument,

    #[error("Fragment file {} has no non-blank lines.", .path.display())]
    EmptyFile { path: PathBuf },

    #[error("Failed to read fragment file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the fragments came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Literal,
    File(PathBuf),
}

/// Resolve the command-line argument into an ordered list of fragments.
pub fn resolve_fragments(arg: &str) -> Result<(InputSource, Vec<Fragment>), InputError> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(InputError::EmptyArgument);
    }

    let Some(path) = fragment_file(arg) else {
        // Literal text: non-empty after trimming, so this always yields one fragment
        let fragments = Fragment::new(1, arg).into_iter().collect();
        return Ok((InputSource::Literal, fragments));
    };

    let content = fs::read_to_string(path).map_err(|source| InputError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let fragments = parse_fragment_lines(&content);
    if fragments.is_empty() {
        return Err(InputError::EmptyFile {
            path: path.to_path_buf(),
        });
    }

    info!(path = %path.display(), count = fragments.len(), "loaded fragment file");
    Ok((InputSource::File(path.to_path_buf()), fragments))
}

/// One fragment per non-blank line, numbered in file order.
pub fn parse_fragment_lines(content: &str) -> Vec<Fragment> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .filter_map(|(i, line)| Fragment::new(i + 1, line))
        .collect()
}

/// The argument names a fragment file when it has a known extension and exists.
fn fragment_file(arg: &str) -> Option<&Path> {
    let path = Path::new(arg);
    let known_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            FRAGMENT_FILE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false);

    (known_extension && path.is_file()).then_some(path)
}
