//! Locating the Python interpreter inside a virtual environment
//!
//! Plugin sources are compiled and introspected by a Python interpreter that
//! the user can point at through a venv; only the executable matters here.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The name of the binaries/scripts directory in a Python venv
/// "Scripts" on Windows, "bin" on Unix
#[cfg(windows)]
pub const PYTHON_BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
pub const PYTHON_BIN_DIR: &str = "bin";

#[cfg(not(windows))]
const PYTHON_EXE_CANDIDATES: &[&str] = &["python", "python2.7", "python3"];
#[cfg(windows)]
const PYTHON_EXE_CANDIDATES: &[&str] = &["python.exe", "python2.7.exe", "python3.exe"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VenvPathError {
    #[error("Virtual environment not found: {}", .0.display())]
    VenvNotFound(PathBuf),
    #[error("{0}")]
    PathResolution(String),
}

/// Resolve the Python executable of a virtual environment
///
/// - **Unix/macOS**: `<venv>/bin/python`
/// - **Windows**: `<venv>\Scripts\python.exe`
pub fn resolve_python_exe(venv_path: &Path) -> Result<PathBuf, VenvPathError> {
    if !venv_path.is_dir() {
        return Err(VenvPathError::VenvNotFound(venv_path.to_path_buf()));
    }

    let bin_dir = venv_path.join(PYTHON_BIN_DIR);
    if !bin_dir.is_dir() {
        return Err(VenvPathError::PathResolution(format!(
            "bin directory not found: {}",
            bin_dir.display()
        )));
    }

    for exe in PYTHON_EXE_CANDIDATES {
        let candidate = bin_dir.join(exe);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    // Any python-like executable, in name order so the pick is stable
    if let Ok(entries) = fs::read_dir(&bin_dir) {
        let mut found: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name.starts_with("python"))
                    && p.is_file()
            })
            .collect();
        found.sort();
        if let Some(candidate) = found.into_iter().next() {
            return Ok(candidate);
        }
    }

    Err(VenvPathError::PathResolution(format!(
        "Python executable not found in {}",
        bin_dir.display()
    )))
}
