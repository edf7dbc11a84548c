/*!
Resolution of time zone keys to TZif files on disk.

A key like `America/Indiana/Knox` is a relative path into one of the
directories on the search path. The search path defaults to the standard
Unix zoneinfo locations, can be seeded from the `TZPATH` or `TZDIR`
environment variables, and can be replaced at runtime with
[`set_tzpath`].

Keys are validated before any I/O: a key is data, not a path, so absolute
keys and keys that escape the search directories via `.` or `..` segments
are rejected outright rather than probed.
*/

use std::{
    path::PathBuf,
    sync::{OnceLock, RwLock},
};

use crate::error::Error;

/// Where zoneinfo databases live on typical Unix systems, in probe order.
const DEFAULT_TZPATHS: &[&str] = &[
    "/usr/share/zoneinfo",
    "/usr/lib/zoneinfo",
    "/usr/share/lib/zoneinfo",
    "/etc/zoneinfo",
];

fn tzpath_store() -> &'static RwLock<Vec<PathBuf>> {
    static TZPATH: OnceLock<RwLock<Vec<PathBuf>>> = OnceLock::new();
    TZPATH.get_or_init(|| RwLock::new(default_tzpath()))
}

/// Computes the initial search path: `TZPATH` when set (a
/// `std::env::split_paths` style list, absolute entries only), then
/// `TZDIR`, then the standard directories.
fn default_tzpath() -> Vec<PathBuf> {
    if let Some(joined) = std::env::var_os("TZPATH") {
        let mut paths = Vec::new();
        for path in std::env::split_paths(&joined) {
            if path.as_os_str().is_empty() {
                continue;
            }
            if !path.is_absolute() {
                warn!(
                    "ignoring relative entry {} in TZPATH",
                    path.display(),
                );
                continue;
            }
            paths.push(path);
        }
        return paths;
    }
    if let Some(tzdir) = std::env::var_os("TZDIR") {
        let tzdir = PathBuf::from(tzdir);
        if tzdir.is_absolute() {
            return vec![tzdir];
        }
        warn!("ignoring relative TZDIR {}", tzdir.display());
    }
    DEFAULT_TZPATHS.iter().map(PathBuf::from).collect()
}

/// Returns a snapshot of the current search path.
pub fn tzpath() -> Vec<PathBuf> {
    tzpath_store().read().unwrap().clone()
}

/// Replaces the search path.
///
/// This affects subsequent zone constructions only; zones already loaded
/// (including cached ones) are unaffected. Call
/// [`TimeZone::clear_cache`](crate::TimeZone::clear_cache) as well if
/// cached zones from the old path must not be served.
pub fn set_tzpath<I>(paths: I)
where
    I: IntoIterator,
    I::Item: Into<PathBuf>,
{
    let paths = paths.into_iter().map(Into::into).collect();
    *tzpath_store().write().unwrap() = paths;
}

/// Restores the search path to its environment-derived default.
pub fn reset_tzpath() {
    *tzpath_store().write().unwrap() = default_tzpath();
}

/// Rejects keys that are not normalized relative paths.
pub(crate) fn validate_key(key: &str) -> Result<(), Error> {
    if key.is_empty() {
        return Err(Error::invalid_key(key, "keys may not be empty"));
    }
    if key.contains('\0') {
        return Err(Error::invalid_key(key, "keys may not contain NUL"));
    }
    if key.starts_with('/') {
        return Err(Error::invalid_key(key, "keys may not be absolute paths"));
    }
    for segment in key.split('/') {
        match segment {
            "" => {
                return Err(Error::invalid_key(
                    key,
                    "keys may not contain empty path segments",
                ));
            }
            "." | ".." => {
                return Err(Error::invalid_key(
                    key,
                    "keys may not contain `.` or `..` path segments",
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Resolves a key to the path of its TZif file, probing the search path
/// in order. `Ok(None)` means the key is well formed but nothing on the
/// search path provides it.
pub(crate) fn find_tzfile(key: &str) -> Result<Option<PathBuf>, Error> {
    validate_key(key)?;
    for dir in tzpath() {
        let candidate = dir.join(key);
        if candidate.is_file() {
            return Ok(Some(candidate));
        }
        trace!("no match for {key} at {}", candidate.display());
    }
    Ok(None)
}

/// Resolves a key and reads its file.
pub(crate) fn load(key: &str) -> Result<(PathBuf, Vec<u8>), Error> {
    let Some(path) = find_tzfile(key)? else {
        return Err(Error::no_such_zone(key));
    };
    let bytes = std::fs::read(&path).map_err(|e| Error::fs(&path, e))?;
    Ok((path, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_normal_keys() {
        for key in [
            "UTC",
            "America/New_York",
            "America/Argentina/Buenos_Aires",
            "Etc/GMT+8",
            "America/Indiana/Knox",
        ] {
            assert!(validate_key(key).is_ok(), "{key}");
        }
    }

    #[test]
    fn rejects_path_shaped_keys() {
        for key in [
            "",
            "/etc/passwd",
            "../etc/passwd",
            "America/../../etc/passwd",
            "America//Chicago",
            "America/Chicago/",
            ".",
            "..",
            "./America/Chicago",
            "America/Chicago\0",
        ] {
            let err = validate_key(key).unwrap_err();
            assert!(err.is_invalid_key(), "{key:?}: {err}");
        }
    }

    #[test]
    fn invalid_keys_error_before_io() {
        let err = find_tzfile("../etc/passwd").unwrap_err();
        assert!(err.is_invalid_key());
    }

    #[test]
    fn missing_zone() {
        // Well formed, but no tzdata anywhere provides it.
        let err = crate::TimeZone::get("Mars/Olympus_Mons").unwrap_err();
        assert!(err.is_no_such_zone());
        assert!(
            err.to_string().contains("Mars/Olympus_Mons"),
            "{err}",
        );
    }
}
