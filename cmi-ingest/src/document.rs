//! Load a statement file into the base64 payload sent to the model

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use thiserror::Error;

use crate::media::MediaType;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file type '{declared}': use a PDF, PNG or JPEG statement")]
    Unsupported { declared: String },

    #[error("cannot tell the file type of {}: pass it explicitly (PDF, PNG or JPEG)", path.display())]
    UnknownType { path: PathBuf },

    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is empty", path.display())]
    Empty { path: PathBuf },
}

/// A statement ready to be attached to a model request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDocument {
    pub file_name: String,
    pub media_type: MediaType,
    pub data_base64: String,
    pub byte_len: usize,
}

impl EncodedDocument {
    pub fn from_bytes(file_name: impl Into<String>, media_type: MediaType, bytes: &[u8]) -> Self {
        Self {
            file_name: file_name.into(),
            media_type,
            data_base64: STANDARD.encode(bytes),
            byte_len: bytes.len(),
        }
    }
}

/// Resolve the declared type for `path`: the explicit override when given,
/// otherwise what the extension declares. Fails before any I/O.
pub fn check_declared_type(path: &Path, declared: Option<&str>) -> Result<MediaType, IngestError> {
    let declared = match declared {
        Some(d) => d.to_string(),
        None => MediaType::declared_for_path(path)
            .ok_or_else(|| IngestError::UnknownType {
                path: path.to_path_buf(),
            })?
            .to_string(),
    };

    MediaType::from_declared(&declared).ok_or(IngestError::Unsupported { declared })
}

/// Check the declared type, then read and encode the whole file.
pub async fn load_document(path: &Path, declared: Option<&str>) -> Result<EncodedDocument, IngestError> {
    let media_type = check_declared_type(path, declared)?;

    let bytes = tokio::fs::read(path).await.map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(IngestError::Empty {
            path: path.to_path_buf(),
        });
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    debug!("read {} bytes from {} as {}", bytes.len(), path.display(), media_type);
    Ok(EncodedDocument::from_bytes(file_name, media_type, &bytes))
}
