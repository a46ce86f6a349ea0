//! cmi-extract: prompt, response schema and model call that turn a statement into journal rows

pub mod backend;
pub mod extractor;
pub mod gemini;
pub mod prompt;
pub mod schema;

pub use backend::{GenerateRequest, ModelBackend};
pub use extractor::{parse_groups, parse_rows, ExtractError, Extraction, Extractor};
pub use gemini::{GeminiBackend, GeminiConfig};
pub use prompt::{instruction, ExtractionMode};
pub use schema::response_schema;
