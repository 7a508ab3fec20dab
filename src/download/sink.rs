use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Destination for downloaded bytes
///
/// Calls are blocking; the downloader runs them on `spawn_blocking`.
pub trait ByteSink: Send + Sync {
    /// Returns true if something already exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Writes `bytes` to `path`, creating parent directories as needed
    fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// Writes to the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSink;

impl ByteSink for FsSink {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write to a sibling temp file first so readers never see a partial PDF
        let tmp = temp_path(path);
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)
    }
}

/// `report.pdf` → `report.pdf.part`; keeps the full name so distinct
/// targets never share a temp file
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
