//! On-disk path derivation and resource resolution.
//!
//! # Responsibility
//! - Map `(collection, resource)` pairs to `<root>/<collection>/<resource>.json`.
//! - Reject names that are empty or could escape the store root.
//! - Resolve existing resources whether or not the caller passed `.json`.
//!
//! # Invariants
//! - Write paths always carry the `.json` extension.
//! - A validated name is exactly one normal path segment.

use crate::error::{StoreError, StoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ffi::OsString;
use std::fs::{self, Metadata};
use std::io;
use std::path::{Component, Path, PathBuf};

/// File extension carried by every stored resource.
pub const RESOURCE_EXTENSION: &str = "json";
/// Suffix appended to a resource path while it is being written.
pub const TEMP_SUFFIX: &str = ".tmp";

// One path segment: no separators of either platform, no NUL.
static NAME_SEGMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^/\\\x00]+$").expect("valid name segment regex"));

/// Which half of the key a name belongs to; used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Collection,
    Resource,
}

impl NameKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Resource => "resource",
        }
    }
}

/// Checks that `name` is usable as a single directory or file name.
///
/// # Errors
/// - `InvalidArgument` when the name is empty, contains `/`, `\` or NUL,
///   or is `.`/`..`.
pub fn validate_name(kind: NameKind, name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::invalid(format!(
            "missing {}; nothing to address",
            kind.as_str()
        )));
    }
    if name == "." || name == ".." || !NAME_SEGMENT_RE.is_match(name) {
        return Err(StoreError::invalid(format!(
            "{} name `{}` is not a single path segment",
            kind.as_str(),
            name.escape_debug()
        )));
    }
    Ok(())
}

/// Checks a resource name used as a write key.
///
/// On top of [`validate_name`], rejects names already ending in `.json`:
/// reads resolve `alice.json` to the resource `alice`, so storing a second
/// document under that name would make both keys address one file.
pub fn validate_write_resource(name: &str) -> StoreResult<()> {
    validate_name(NameKind::Resource, name)?;
    let suffix = format!(".{RESOURCE_EXTENSION}");
    if name.ends_with(&suffix) {
        return Err(StoreError::invalid(format!(
            "resource name `{}` must not carry the `{suffix}` extension when writing",
            name.escape_debug()
        )));
    }
    Ok(())
}

/// Lexically normalizes the store root.
///
/// Drops `.` segments and trailing separators and folds `name/..` pairs
/// without touching the filesystem. An empty result becomes `.`.
pub fn normalize_root(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                // `/..` is `/`.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

pub fn collection_dir(root: &Path, collection: &str) -> PathBuf {
    root.join(collection)
}

/// Canonical file path for one resource: `<root>/<collection>/<resource>.json`.
pub fn resource_path(root: &Path, collection: &str, resource: &str) -> PathBuf {
    with_json_suffix(&collection_dir(root, collection).join(resource))
}

/// Sibling path used for the write-then-rename step.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut raw: OsString = final_path.as_os_str().to_os_string();
    raw.push(TEMP_SUFFIX);
    PathBuf::from(raw)
}

/// Stats `path`, falling back to `path.json` when the literal path is absent.
///
/// Returns `Ok(None)` when neither exists. Failures other than "not found"
/// are reported as `Io` against the path that produced them.
pub fn stat_or_suffixed(path: &Path) -> StoreResult<Option<(PathBuf, Metadata)>> {
    if let Some(metadata) = stat_if_exists(path)? {
        return Ok(Some((path.to_path_buf(), metadata)));
    }

    let suffixed = with_json_suffix(path);
    Ok(stat_if_exists(&suffixed)?.map(|metadata| (suffixed, metadata)))
}

/// Resolves a readable document: the literal path when it is a file,
/// otherwise `path.json` when that is a file.
///
/// Unlike [`stat_or_suffixed`], a directory at the literal path does not
/// shadow the suffixed document.
pub fn resolve_file(path: &Path) -> StoreResult<Option<PathBuf>> {
    if stat_if_exists(path)?.is_some_and(|metadata| metadata.is_file()) {
        return Ok(Some(path.to_path_buf()));
    }

    let suffixed = with_json_suffix(path);
    if stat_if_exists(&suffixed)?.is_some_and(|metadata| metadata.is_file()) {
        return Ok(Some(suffixed));
    }
    Ok(None)
}

/// Whether a directory entry is a leftover from an interrupted write.
pub fn is_temp_file(path: &Path) -> bool {
    path.as_os_str()
        .to_str()
        .is_some_and(|raw| raw.ends_with(TEMP_SUFFIX))
}

fn stat_if_exists(path: &Path) -> StoreResult<Option<Metadata>> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StoreError::io(path, err)),
    }
}

fn with_json_suffix(path: &Path) -> PathBuf {
    let mut raw: OsString = path.as_os_str().to_os_string();
    raw.push(".");
    raw.push(RESOURCE_EXTENSION);
    PathBuf::from(raw)
}
