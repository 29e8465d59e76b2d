//! Filename extraction, sanitization, and unique path resolution for downloads.
//!
//! Names come from the last non-empty path segment of the URL. When overwriting
//! is not allowed, a taken name `stem.ext` is disambiguated as `stem-1.ext`,
//! `stem-2.ext`, ... and the chosen name is claimed for the rest of the run so
//! that two concurrently dispatched tasks never write to the same file.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::debug;
use url::Url;

use super::constants::GENERATED_NAME_PREFIX;

/// Per-run registry of destination paths already handed out to tasks.
///
/// Resolution and claiming happen under one lock, so the existence check and
/// the reservation are atomic with respect to other tasks of the same run.
/// Resolution touches the filesystem; async callers run it on the blocking pool.
#[derive(Debug, Default)]
pub struct ClaimedNames {
    claimed: Mutex<HashSet<PathBuf>>,
}

impl ClaimedNames {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn is_claimed(&self, path: &Path) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Derives the base file name for `url`.
///
/// Query and fragment never take part. The last non-empty path segment is
/// percent-decoded and sanitized; when there is none (bare host, `/`), a
/// generated name unique within the process is returned instead.
#[must_use]
pub fn base_name_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back());

    let Some(segment) = segment else {
        return generated_name();
    };

    let decoded = urlencoding::decode(segment).map_or_else(
        |e| {
            debug!(segment = %segment, error = %e, "URL decoding failed, using raw segment");
            segment.to_string()
        },
        std::borrow::Cow::into_owned,
    );

    let sanitized = sanitize_filename(&decoded);
    if sanitized.trim_matches('_').is_empty() {
        generated_name()
    } else {
        sanitized
    }
}

/// Resolves the destination path for `url` inside `dir`.
///
/// With `avoid_overwrite == false` the base name is returned unconditionally
/// and nothing is claimed. Otherwise the first name that neither exists on
/// disk nor was claimed earlier in the run is claimed and returned.
#[must_use]
pub fn resolve_destination(
    dir: &Path,
    url: &Url,
    avoid_overwrite: bool,
    claimed: &ClaimedNames,
) -> PathBuf {
    let base_name = base_name_from_url(url);
    if avoid_overwrite {
        resolve_unique_path(dir, &base_name, claimed)
    } else {
        dir.join(base_name)
    }
}

/// Picks the first free name among `filename`, `stem-1.ext`, `stem-2.ext`, ...
/// and claims it.
pub(crate) fn resolve_unique_path(dir: &Path, filename: &str, claimed: &ClaimedNames) -> PathBuf {
    let mut registry = claimed
        .claimed
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    let base_path = dir.join(filename);
    if is_free(&registry, &base_path) {
        registry.insert(base_path.clone());
        return base_path;
    }

    let (stem, ext) = split_extension(filename);
    let mut counter: u64 = 1;
    loop {
        let candidate = dir.join(format!("{stem}-{counter}{ext}"));
        if is_free(&registry, &candidate) {
            debug!(original = %filename, path = %candidate.display(), "disambiguated filename");
            registry.insert(candidate.clone());
            return candidate;
        }
        counter += 1;
    }
}

/// Splits `name` into stem and extension (with its dot).
///
/// `archive.tar.gz` -> (`archive.tar`, `.gz`); `.bashrc` and `README` have no extension.
pub(crate) fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 => (&name[..pos], &name[pos..]),
        _ => (name, ""),
    }
}

/// Sanitizes a filename by replacing invalid characters with underscore.
///
/// Replaces characters that are invalid on common filesystems:
/// / \ : * ? " < > |
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized.replace('.', "_")
    }
}

/// Builds `download-<unix-nanos>-<seq>`, unique for every call in this process.
pub(crate) fn generated_name() -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{GENERATED_NAME_PREFIX}-{nanos}-{seq}")
}

fn is_free(registry: &HashSet<PathBuf>, path: &Path) -> bool {
    !registry.contains(path) && !is_taken(path)
}

// Anything but a definite "not found" counts as taken, so unreadable entries
// are never overwritten.
fn is_taken(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(_) => true,
        Err(e) => e.kind() != std::io::ErrorKind::NotFound,
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
