//! File import and download surface.
//!
//! Importing is split in two: [`ImportTicket::for_file`] runs the extension
//! filter as soon as a file is picked, and the host completes the ticket with
//! the file's text once the (possibly asynchronous) read has finished.
//! Exports are produced as [`FileDownload`]s and handed to a [`DownloadSink`].

use std::path::{Path, PathBuf};

use crate::constants::{EXPORT_FILE_NAME, EXPORT_MIME_TYPE, GEOJSON_EXTENSION};
use crate::format::FormatError;

/// A picked file that passed the extension filter and is waiting for its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "an import ticket does nothing until it is completed"]
pub struct ImportTicket {
    file_name: String,
}

impl ImportTicket {
    /// Check `file_name` against the accepted extension (case-insensitive).
    pub fn for_file(file_name: impl Into<String>) -> Result<Self, FormatError> {
        let file_name = file_name.into();
        if !has_geojson_extension(&file_name) {
            log::warn!("Rejected import of '{}'", file_name);
            return Err(FormatError::UnsupportedFile {
                name: file_name,
                extension: GEOJSON_EXTENSION,
            });
        }
        Ok(Self { file_name })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Layer name derived from the file name, without its extension.
    pub fn layer_name(&self) -> &str {
        let base = self
            .file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file_name.as_str());
        match base.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => base,
        }
    }
}

fn has_geojson_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(GEOJSON_EXTENSION))
}

/// An exported document ready to be saved by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDownload {
    pub file_name: String,
    pub mime_type: String,
    pub contents: String,
}

impl FileDownload {
    /// A GeoJSON download under the standard export file name.
    pub fn geojson(contents: String) -> Self {
        Self {
            file_name: EXPORT_FILE_NAME.to_string(),
            mime_type: EXPORT_MIME_TYPE.to_string(),
            contents,
        }
    }
}

/// Destination for exported documents (browser download, save dialog, ...).
pub trait DownloadSink {
    /// Persist a download. Returns where it ended up, if the sink knows.
    fn save(&mut self, download: &FileDownload) -> Result<Option<PathBuf>, FormatError>;
}

/// Saves downloads as files inside a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, download: &FileDownload) -> Result<Option<PathBuf>, FormatError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(&download.file_name);
        std::fs::write(&path, &download.contents)?;
        log::info!(
            "Saved {} ({} bytes) to {:?}",
            download.file_name,
            download.contents.len(),
            path
        );
        Ok(Some(path))
    }
}

/// Read a file from disk for import, applying the extension filter first.
pub fn read_import_file(path: &Path) -> Result<(ImportTicket, String), FormatError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ticket = ImportTicket::for_file(file_name)?;
    let text = std::fs::read_to_string(path)?;
    log::debug!("Read {} bytes from {:?}", text.len(), path);
    Ok((ticket, text))
}
