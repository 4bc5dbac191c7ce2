use serde::{Deserialize, Serialize};

use crate::errors::SysdocResult;
use crate::models::StructureTree;

/// Raw input formats a parser may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Markdown,
    Word,
    Excel,
    Text,
}

impl DocumentFormat {
    /// Guess the format from a filename extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "md" | "markdown" => Some(DocumentFormat::Markdown),
            "docx" | "doc" => Some(DocumentFormat::Word),
            "xlsx" | "xls" | "csv" => Some(DocumentFormat::Excel),
            "txt" => Some(DocumentFormat::Text),
            _ => None,
        }
    }
}

/// Parser collaborator. Must fail with `UnsupportedFormat` or
/// `CorruptDocument` rather than return a partial tree.
pub trait IDocumentParser: Send + Sync {
    fn parse(
        &self,
        document_id: &str,
        raw: &[u8],
        format: DocumentFormat,
    ) -> SysdocResult<StructureTree>;
}
