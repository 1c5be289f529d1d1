//! Zip packaging of organized output folders

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::generation::{ArchivePackager, GenerationError};
use crate::infrastructure::output::sanitize_folder_name;

/// Timestamp suffix of archive names
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Highest deflate level
const MAX_COMPRESSION: i32 = 9;

/// `<sanitized folder name>_<yyyyMMddHHmmss>.zip`
pub fn archive_name(folder_name: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}.zip",
        sanitize_folder_name(folder_name),
        at.format(ARCHIVE_TIMESTAMP_FORMAT)
    )
}

fn file_options() -> FileOptions {
    FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(MAX_COMPRESSION))
}

/// Relative path of `path` under `root` as a zip entry name (always `/`-separated)
fn entry_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Writes the contents of `source` (not the folder itself) into a zip
fn write_folder<W: Write + Seek>(source: &Path, writer: W) -> Result<W, GenerationError> {
    let mut zip = ZipWriter::new(writer);
    let options = file_options();

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let Some(name) = entry_name(source, entry.path()) else {
            continue;
        };

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            let mut file = File::open(entry.path())?;
            io::copy(&mut file, &mut zip)?;
        }
    }

    Ok(zip.finish()?)
}

fn write_entries<W: Write + Seek>(
    entries: &BTreeMap<String, Vec<u8>>,
    writer: W,
) -> Result<W, GenerationError> {
    let mut zip = ZipWriter::new(writer);
    let options = file_options();
    for (name, content) in entries {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(content)?;
    }
    Ok(zip.finish()?)
}

fn extract_archive<R: Read + Seek>(
    reader: R,
    destination: &Path,
) -> Result<Vec<PathBuf>, GenerationError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut written = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let relative = entry.enclosed_name().map(Path::to_path_buf).ok_or_else(|| {
            GenerationError::Archive(format!(
                "Entry '{}' would extract outside the destination",
                entry.name()
            ))
        })?;
        let target = destination.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = File::create(&target)?;
        io::copy(&mut entry, &mut file)?;
        written.push(target);
    }
    Ok(written)
}

async fn blocking<T, F>(work: F) -> Result<T, GenerationError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, GenerationError> + Send + 'static,
{
    task::spawn_blocking(work)
        .await
        .map_err(|e| GenerationError::Archive(format!("Archive task failed: {e}")))?
}

/// Zip archives with maximum deflate compression
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipPackager;

impl ZipPackager {
    pub fn new() -> Self {
        Self
    }

    /// Archive the contents of `source` in memory
    pub async fn create_archive_bytes(&self, source: &Path) -> Result<Vec<u8>, GenerationError> {
        ensure_folder(source)?;
        let source = source.to_path_buf();
        let cursor = blocking(move || write_folder(&source, Cursor::new(Vec::new()))).await?;
        Ok(cursor.into_inner())
    }

    /// Build an archive from entry names and contents
    pub async fn create_archive_from_entries(
        &self,
        entries: BTreeMap<String, Vec<u8>>,
    ) -> Result<Vec<u8>, GenerationError> {
        let cursor = blocking(move || write_entries(&entries, Cursor::new(Vec::new()))).await?;
        Ok(cursor.into_inner())
    }

    /// Extract every entry into `destination`, overwriting existing files.
    /// Returns the extracted file paths.
    pub async fn extract(
        &self,
        archive: &Path,
        destination: &Path,
    ) -> Result<Vec<PathBuf>, GenerationError> {
        let archive = archive.to_path_buf();
        let destination = destination.to_path_buf();
        let written = blocking(move || {
            std::fs::create_dir_all(&destination)?;
            extract_archive(File::open(&archive)?, &destination)
        })
        .await?;
        debug!(files = written.len(), "Archive extracted");
        Ok(written)
    }

    /// Extract an in-memory archive
    pub async fn extract_bytes(
        &self,
        bytes: Vec<u8>,
        destination: &Path,
    ) -> Result<Vec<PathBuf>, GenerationError> {
        let destination = destination.to_path_buf();
        blocking(move || {
            std::fs::create_dir_all(&destination)?;
            extract_archive(Cursor::new(bytes), &destination)
        })
        .await
    }

    /// Entry names in archive order
    pub async fn list_entries(&self, archive: &Path) -> Result<Vec<String>, GenerationError> {
        let archive = archive.to_path_buf();
        blocking(move || {
            let mut archive = ZipArchive::new(File::open(&archive)?)?;
            let mut names = Vec::with_capacity(archive.len());
            for index in 0..archive.len() {
                names.push(archive.by_index(index)?.name().to_string());
            }
            Ok(names)
        })
        .await
    }
}

fn ensure_folder(source: &Path) -> Result<(), GenerationError> {
    if !source.is_dir() {
        return Err(GenerationError::Archive(format!(
            "Source folder {} does not exist",
            source.display()
        )));
    }
    Ok(())
}

#[async_trait]
impl ArchivePackager for ZipPackager {
    async fn create_archive(
        &self,
        source: &Path,
        destination: &Path,
    ) -> Result<PathBuf, GenerationError> {
        ensure_folder(source)?;
        let folder_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        tokio::fs::create_dir_all(destination).await?;
        let archive_path = destination.join(archive_name(&folder_name, Utc::now()));
        if tokio::fs::try_exists(&archive_path).await? {
            debug!(archive = %archive_path.display(), "Replacing existing archive");
            tokio::fs::remove_file(&archive_path).await?;
        }

        let source = source.to_path_buf();
        let target = archive_path.clone();
        blocking(move || {
            let file = write_folder(&source, File::create(&target)?)?;
            file.sync_all()?;
            Ok(())
        })
        .await?;

        info!(archive = %archive_path.display(), "Archive created");
        Ok(archive_path)
    }

    async fn archive_size(&self, archive: &Path) -> Result<u64, GenerationError> {
        Ok(tokio::fs::metadata(archive).await?.len())
    }
}
