//! Packaging the plugin source tree
//!
//! Every module is byte-compiled first. The archive then holds every file
//! except `.py` sources, named relative to the source directory, and is
//! returned base64 encoded. Entries are added in sorted order with a fixed
//! timestamp so the same tree always yields the same bytes.

use crate::errors::BundleError;
use crate::python::{output_text, PythonRunner};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

const COMPILE_SCRIPT: &str = include_str!("../resources/compile_tree.py");
const SOURCE_SUFFIX: &str = ".py";

/// Byte-compiles a source tree in place
pub trait SourceCompiler {
    /// Fails when any module in `src_dir` does not compile. A tree with no
    /// modules compiles successfully.
    fn compile(&self, src_dir: &Path) -> Result<(), BundleError>;
}

pub struct PythonCompiler {
    runner: PythonRunner,
}

impl PythonCompiler {
    pub fn new(runner: PythonRunner) -> Self {
        Self { runner }
    }
}

impl SourceCompiler for PythonCompiler {
    fn compile(&self, src_dir: &Path) -> Result<(), BundleError> {
        info!("Compiling source code in {}", src_dir.display());
        let target = src_dir.to_string_lossy();
        let output = self
            .runner
            .run_script("compileall", COMPILE_SCRIPT, &[&target], src_dir, &[])
            .map_err(|source| BundleError::Spawn {
                interpreter: self.runner.interpreter().to_path_buf(),
                source,
            })?;
        if output.status.success() {
            return Ok(());
        }
        Err(BundleError::Compile {
            path: src_dir.to_path_buf(),
            output: output_text(&output),
        })
    }
}

pub struct SourceBundler<'a> {
    compiler: &'a dyn SourceCompiler,
}

impl<'a> SourceBundler<'a> {
    pub fn new(compiler: &'a dyn SourceCompiler) -> Self {
        Self { compiler }
    }

    /// Compile, archive and encode `src_dir`
    pub fn bundle(&self, src_dir: &Path) -> Result<String, BundleError> {
        fs::read_dir(src_dir).map_err(|source| BundleError::Read {
            path: src_dir.to_path_buf(),
            source,
        })?;
        self.compiler.compile(src_dir)?;
        let archive = archive_tree(src_dir)?;
        debug!("Source archive is {} bytes", archive.len());
        Ok(STANDARD.encode(archive))
    }
}

/// Zip every non-`.py` file under `src_dir`
pub fn archive_tree(src_dir: &Path) -> Result<Vec<u8>, BundleError> {
    let archive_error = |message: String| BundleError::Archive {
        path: src_dir.to_path_buf(),
        message,
    };

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    for entry in WalkDir::new(src_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map_or_else(|| src_dir.to_path_buf(), Path::to_path_buf);
            match e.into_io_error() {
                Some(source) => BundleError::Read { path, source },
                None => archive_error(format!("filesystem loop at {}", path.display())),
            }
        })?;

        // Follows symlinks, so linked files are archived with their contents
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = entry_name(src_dir, path) else {
            continue;
        };
        if name.ends_with(SOURCE_SUFFIX) {
            continue;
        }

        let data = fs::read(path).map_err(|source| BundleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Adding {} to zip.", name);
        zip.start_file(name, options)
            .map_err(|e| archive_error(e.to_string()))?;
        zip.write_all(&data)
            .map_err(|e| archive_error(e.to_string()))?;
    }

    let cursor = zip.finish().map_err(|e| archive_error(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// `/`-separated path of `path` relative to `base`
fn entry_name(base: &Path, path: &Path) -> Option<String> {
    let relative: PathBuf = path.strip_prefix(base).ok()?.to_path_buf();
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;
    use zip::ZipArchive;

    struct NoopCompiler;

    impl SourceCompiler for NoopCompiler {
        fn compile(&self, _src_dir: &Path) -> Result<(), BundleError> {
            Ok(())
        }
    }

    struct FailingCompiler {
        calls: Cell<usize>,
    }

    impl SourceCompiler for FailingCompiler {
        fn compile(&self, src_dir: &Path) -> Result<(), BundleError> {
            self.calls.set(self.calls.get() + 1);
            Err(BundleError::Compile {
                path: src_dir.to_path_buf(),
                output: "SyntaxError: invalid syntax".to_string(),
            })
        }
    }

    fn names_in(encoded: &str) -> Vec<String> {
        let Ok(bytes) = STANDARD.decode(encoded) else {
            return Vec::new();
        };
        let Ok(archive) = ZipArchive::new(Cursor::new(bytes)) else {
            return Vec::new();
        };
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    fn source_tree() -> Option<TempDir> {
        let temp_dir = TempDir::new().ok()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("pkg")).ok()?;
        fs::write(root.join("plugin_runner.py"), "plugin = None\n").ok()?;
        fs::write(root.join("plugin_runner.pyc"), [0x03, 0xf3, 0x0d, 0x0a]).ok()?;
        fs::write(root.join("pkg").join("__init__.py"), "").ok()?;
        fs::write(root.join("pkg").join("__init__.pyc"), [0x03, 0xf3]).ok()?;
        fs::write(root.join("pkg").join("data.json"), "{}").ok()?;
        Some(temp_dir)
    }

    #[test]
    fn test_archive_skips_sources_and_uses_relative_names() {
        let Some(tree) = source_tree() else {
            return;
        };
        let result = SourceBundler::new(&NoopCompiler).bundle(tree.path());
        let Ok(encoded) = result else {
            assert!(false, "bundling should succeed");
            return;
        };
        assert_eq!(
            names_in(&encoded),
            vec!["pkg/__init__.pyc", "pkg/data.json", "plugin_runner.pyc"]
        );
    }

    #[test]
    fn test_only_sources_plus_one_binary() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let root = temp_dir.path();
        assert!(fs::write(root.join("a.py"), "x = 1\n").is_ok());
        assert!(fs::write(root.join("b.py"), "y = 2\n").is_ok());
        assert!(fs::write(root.join("blob.bin"), [0u8, 159, 146, 150]).is_ok());

        let result = SourceBundler::new(&NoopCompiler).bundle(root);
        assert!(result.is_ok_and(|encoded| names_in(&encoded) == vec!["blob.bin"]));
    }

    #[test]
    fn test_compile_failure_stops_before_archiving() {
        let Some(tree) = source_tree() else {
            return;
        };
        let compiler = FailingCompiler {
            calls: Cell::new(0),
        };
        let result = SourceBundler::new(&compiler).bundle(tree.path());
        assert_eq!(compiler.calls.get(), 1);
        let Err(err) = result else {
            assert!(false, "compile failure must fail the bundle");
            return;
        };
        assert!(err.to_string().contains("Failed to compile source code"));
    }

    #[test]
    fn test_bundle_is_reproducible() {
        let Some(tree) = source_tree() else {
            return;
        };
        let bundler = SourceBundler::new(&NoopCompiler);
        let first = bundler.bundle(tree.path());
        let second = bundler.bundle(tree.path());
        assert!(first.is_ok());
        assert_eq!(first.ok(), second.ok());
    }

    #[test]
    fn test_empty_tree_bundles() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let result = SourceBundler::new(&NoopCompiler).bundle(temp_dir.path());
        assert!(result.is_ok_and(|encoded| names_in(&encoded).is_empty()));
    }

    #[test]
    fn test_missing_source_dir_is_read_error() {
        let result =
            SourceBundler::new(&NoopCompiler).bundle(Path::new("/nonexistent/dvp/src"));
        assert!(matches!(result, Err(BundleError::Read { .. })));
        if let Err(err) = result {
            assert!(err.to_string().contains("Error code:"));
        }
    }

    #[test]
    fn test_entry_name_is_forward_slashed() {
        let base = Path::new("/plugin/src");
        assert_eq!(
            entry_name(base, &base.join("pkg").join("mod.pyc")),
            Some("pkg/mod.pyc".to_string())
        );
        assert_eq!(entry_name(base, base), None);
    }
}
