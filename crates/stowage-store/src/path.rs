use crate::error::{StoreError, StoreResult};

/// File-name prefix of in-flight temporary files. No store path segment
/// may start with it.
pub const TEMP_PREFIX: &str = ".stowage-tmp";

/// Check that a store path is relative, non-empty and stays inside the
/// store root. Segments are separated by `/`.
pub fn validate_path(path: &str) -> StoreResult<()> {
    let fail = |reason| {
        Err(StoreError::InvalidPath {
            path: path.to_string(),
            reason,
        })
    };
    if path.is_empty() {
        return fail("empty path");
    }
    if path.starts_with('/') {
        return fail("absolute path");
    }
    if path.contains('\\') || path.contains('\0') {
        return fail("path contains '\\' or NUL");
    }
    if path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return fail("empty, '.' or '..' segment");
    }
    if path.split('/').any(|seg| seg.starts_with(TEMP_PREFIX)) {
        return fail("reserved temporary-file prefix");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_nested_relative_paths() {
        validate_path("a").unwrap();
        validate_path("users/42/profile.json").unwrap();
        validate_path(".tmprc").unwrap();
        validate_path("notes/.tmp-list").unwrap();
    }

    #[test]
    fn temp_prefix_is_reserved() {
        for bad in [".stowage-tmp", ".stowage-tmpXYZ", "a/.stowage-tmp1/b"] {
            assert!(matches!(
                validate_path(bad),
                Err(StoreError::InvalidPath { reason: "reserved temporary-file prefix", .. })
            ));
        }
    }

    #[test]
    fn rejects_escapes() {
        for bad in ["", "/etc/passwd", "../x", "a/../b", "a//b", "a/", "a\\b", "./a"] {
            assert!(validate_path(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
