//! Export formats and payload rendering

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;
use xml_search_traits::{Error, Result, SearchResult};

use crate::xml::result_to_xml;

/// Output format for an exported search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Summary plus numbered listing
    Text,
    Xml,
    Json,
}

impl ExportFormat {
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Text, ExportFormat::Xml, ExportFormat::Json]
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Xml => "xml",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Text => "text",
            ExportFormat::Xml => "xml",
            ExportFormat::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "xml" => Ok(ExportFormat::Xml),
            "json" => Ok(ExportFormat::Json),
            other => Err(Error::unsupported_format(format!(
                "unknown export format '{}' (expected text, xml or json)",
                other
            ))),
        }
    }
}

/// Something to export: either a search result or markup produced elsewhere
#[derive(Debug, Clone)]
pub enum Payload {
    Markup(String),
    Result(SearchResult),
}

impl From<SearchResult> for Payload {
    fn from(result: SearchResult) -> Self {
        Payload::Result(result)
    }
}

/// Render `payload` in `format`.
///
/// Markup is passed through untouched and only as XML.
pub fn render(payload: &Payload, format: ExportFormat) -> Result<String> {
    match (payload, format) {
        (Payload::Result(result), ExportFormat::Text) => Ok(result.detailed()),
        (Payload::Result(result), ExportFormat::Xml) => result_to_xml(result),
        (Payload::Result(result), ExportFormat::Json) => serde_json::to_string_pretty(result)
            .map_err(|e| Error::unsupported_format(e.to_string())),
        (Payload::Markup(markup), ExportFormat::Xml) => Ok(markup.clone()),
        (Payload::Markup(_), other) => Err(Error::unsupported_format(format!(
            "markup can only be exported as xml, not {}",
            other
        ))),
    }
}

/// Render `payload` and write it to `path`, creating parent directories
pub fn export_to_file(payload: &Payload, format: ExportFormat, path: &Path) -> Result<()> {
    let content = render(payload, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &content)?;
    info!(
        file = %path.display(),
        format = %format,
        bytes = content.len(),
        "exported search output"
    );
    Ok(())
}
