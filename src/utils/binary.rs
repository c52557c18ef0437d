//! External tool path resolution and validation utilities.
//!
//! The capture query tool is given either as a bare name (looked up on
//! `PATH`) or as an explicit path.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Errors that can occur during tool resolution or validation
#[derive(Debug, thiserror::Error)]
pub enum BinaryError {
    #[error("Binary not found: {path}")]
    NotFound { path: String },

    #[error("Binary is not executable: {path}")]
    NotExecutable { path: String },

    #[error("Cannot determine home directory")]
    NoHomeDir,

    #[error("Invalid path: {path}")]
    InvalidPath { path: String },
}

/// Get the user's home directory from the HOME environment variable
fn get_home_dir() -> Result<PathBuf, BinaryError> {
    env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| BinaryError::NoHomeDir)
}

/// Resolve a tool from a bare name or explicit path.
///
/// Resolution rules:
/// 1. If the value contains `/` or starts with `~`: treat as explicit path
/// 2. Otherwise: search each directory of `PATH` for an executable entry
///
/// # Examples
///
/// ```ignore
/// resolve_tool("tshark") -> /usr/bin/tshark
/// resolve_tool("~/wireshark/tshark") -> /home/user/wireshark/tshark
/// ```
pub fn resolve_tool(name_or_path: &str) -> Result<PathBuf, BinaryError> {
    if let Some(rest) = name_or_path.strip_prefix("~/") {
        return Ok(get_home_dir()?.join(rest));
    }

    if name_or_path.contains('/') {
        return Ok(PathBuf::from(name_or_path));
    }

    let search_path = env::var_os("PATH").ok_or_else(|| BinaryError::NotFound {
        path: name_or_path.to_string(),
    })?;

    env::split_paths(&search_path)
        .map(|dir| dir.join(name_or_path))
        .find(|candidate| validate_binary(candidate).is_ok())
        .ok_or_else(|| BinaryError::NotFound {
            path: name_or_path.to_string(),
        })
}

/// Validate that a binary exists and is executable.
pub fn validate_binary(path: &Path) -> Result<(), BinaryError> {
    if !path.is_file() {
        return Err(BinaryError::NotFound {
            path: path.display().to_string(),
        });
    }

    let metadata = path.metadata().map_err(|_| BinaryError::InvalidPath {
        path: path.display().to_string(),
    })?;

    if !is_executable(&metadata) {
        return Err(BinaryError::NotExecutable {
            path: path.display().to_string(),
        });
    }

    Ok(())
}

/// Any execute bit set
#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}

/// Resolve and validate a tool in one step.
pub fn validate_tool_spec(name_or_path: &str) -> Result<PathBuf, BinaryError> {
    let resolved = resolve_tool(name_or_path)?;
    validate_binary(&resolved)?;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_explicit_absolute() {
        let result = resolve_tool("/opt/wireshark/tshark").unwrap();
        assert_eq!(result, PathBuf::from("/opt/wireshark/tshark"));
    }

    #[test]
    fn test_resolve_explicit_tilde() {
        let result = resolve_tool("~/bin/tshark").unwrap();
        assert!(result.ends_with("bin/tshark"));
        assert!(!result.starts_with("~"));
    }

    #[test]
    fn test_missing_tool_not_found() {
        let result = validate_tool_spec("/nonexistent/dir/tshark");
        assert!(matches!(result, Err(BinaryError::NotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_executable_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tshark");
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(matches!(validate_binary(&path), Err(BinaryError::NotExecutable { .. })));

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(validate_binary(&path).is_ok());
    }
}
