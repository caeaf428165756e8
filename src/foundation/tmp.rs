use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TEMP_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique file name `<prefix>_<pid>_<nanos>_<n>.<ext>` inside `dir`.
pub(crate) fn unique_temp_path(dir: &Path, prefix: &str, ext: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let n = NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed);
    dir.join(format!(
        "{prefix}_{}_{nanos}_{n}.{ext}",
        std::process::id()
    ))
}

/// Removes the wrapped file on drop unless it was released.
#[derive(Debug, Default)]
pub(crate) struct TempFileGuard(pub(crate) Option<PathBuf>);

impl TempFileGuard {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self(Some(path))
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.0.as_deref()
    }

    /// Stop tracking the file; it will no longer be removed.
    pub(crate) fn release(&mut self) -> Option<PathBuf> {
        self.0.take()
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Write an executable `#!/bin/sh` script, used by tests to stand in for external tools.
#[cfg(all(test, unix))]
pub(crate) fn write_script(name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt as _;

    let dir = unique_temp_path(&std::env::temp_dir(), "chartreel_script", "d");
    std::fs::create_dir_all(&dir).expect("create script dir");
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/tmp.rs"]
mod tests;
