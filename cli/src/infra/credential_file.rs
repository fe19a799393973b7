//! Writing a retrieved kubeconfig to disk.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

/// Atomically writes `contents` to `path`, readable only by the owner on Unix.
///
/// The data goes to a temp file in the same directory which is then renamed
/// over `path`, so readers never see a partial file.
///
/// # Errors
///
/// Returns an error if the temp file cannot be created, written, or persisted.
pub fn write_credential(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    set_owner_only(tmp.path())?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("write {}", tmp.path().display()))?;
    if !contents.ends_with('\n') {
        tmp.write_all(b"\n")
            .with_context(|| format!("write {}", tmp.path().display()))?;
    }
    tmp.persist(path)
        .with_context(|| format!("persist {}", path.display()))?;
    Ok(())
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> Result<()> {
    Ok(())
}
