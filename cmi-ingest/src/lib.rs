//! cmi-ingest: statement file intake (declared media type check, async read, base64 payload)

pub mod document;
pub mod media;

pub use document::{check_declared_type, load_document, EncodedDocument, IngestError};
pub use media::MediaType;
