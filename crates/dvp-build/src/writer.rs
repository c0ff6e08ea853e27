//! Writing the upload artifact to disk

use crate::artifact::UploadArtifact;
use crate::errors::ArtifactError;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Write `artifact` as four-space indented JSON
///
/// The bytes go to a temporary file beside `path` which is then renamed
/// into place, so a failed write never leaves a partial artifact.
pub fn write_artifact(path: &Path, artifact: &UploadArtifact) -> Result<(), ArtifactError> {
    info!("Generating upload_artifact file at {}", path.display());
    let content = to_pretty_json(artifact)?;

    let temp_path = temp_path_for(path);
    if let Err(source) = write_through(&temp_path, path, &content) {
        if temp_path.exists() {
            debug!("Removing partial artifact {}", temp_path.display());
            if let Err(e) = fs::remove_file(&temp_path) {
                debug!("Could not remove {}: {}", temp_path.display(), e);
            }
        }
        return Err(ArtifactError::Write {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

fn write_through(temp_path: &Path, path: &Path, content: &[u8]) -> io::Result<()> {
    {
        let file = fs::File::create(temp_path)?;
        let mut writer = BufWriter::with_capacity(64 * 1024, file);
        writer.write_all(content)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    fs::rename(temp_path, path)
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>, ArtifactError> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", file_name))
}
