//! Filesystem utilities.

use filler_types::Result;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Expand a leading tilde to the home directory.
pub fn expand_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();

    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }

    path.to_path_buf()
}

/// Read entire file as string (slurp).
pub fn slurp(path: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(expand_path(path)).map_err(Into::into)
}

/// Write `contents` to a file readable by its owner only (0600 on unix).
///
/// An existing file is truncated and has its mode tightened before any
/// content is written.
pub fn write_private(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path.as_ref())?;

    // The creation mode does not apply to files that already existed
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(contents)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_leaves_plain_paths_alone() {
        assert_eq!(expand_path("plans/cf.yml"), PathBuf::from("plans/cf.yml"));
        assert_eq!(expand_path("/etc/filler/config"), PathBuf::from("/etc/filler/config"));
    }

    #[test]
    fn test_expand_path_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~/.filler/config"), home.join(".filler/config"));
        }
    }

    #[test]
    fn test_write_private_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.yml");

        write_private(&path, b"first: value with more bytes\n").unwrap();
        write_private(&path, b"second: x\n").unwrap();
        assert_eq!(slurp(&path).unwrap(), "second: x\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_write_private_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.yml");
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        write_private(&path, b"nats_password: s3cret\n").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
