//! Parser strategy abstraction trait

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Instant;

use crate::error::{Error, ErrorKind, Result};
use crate::prolog::decode_document;
use crate::query::SearchQuery;
use crate::result::SearchResult;

/// Trait for XML search strategies.
///
/// Every implementation answers the same questions about a file on disk,
/// using its own parsing technology. Calls are self-contained: nothing is
/// cached between them, so one instance can serve concurrent callers.
pub trait ParserStrategy: Send + Sync {
    /// Search the document for elements matching `query`
    fn parse(&self, file: &Path, query: &SearchQuery) -> Result<SearchResult>;

    /// Every attribute name used on elements called `element_name`
    fn available_attributes(&self, file: &Path, element_name: &str) -> Result<BTreeSet<String>>;

    /// Every value `attribute_name` takes on elements called `element_name`
    fn attribute_values(
        &self,
        file: &Path,
        element_name: &str,
        attribute_name: &str,
    ) -> Result<BTreeSet<String>>;

    /// Every distinct element name in the document
    fn element_names(&self, file: &Path) -> Result<BTreeSet<String>>;

    /// Stable display name, distinct per strategy
    fn parser_name(&self) -> &'static str;
}

/// Phase of a single strategy call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Parsing,
    Searching,
    Done,
    Failed(ErrorKind),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => f.write_str("idle"),
            Phase::Validating => f.write_str("validating"),
            Phase::Parsing => f.write_str("parsing"),
            Phase::Searching => f.write_str("searching"),
            Phase::Done => f.write_str("done"),
            Phase::Failed(kind) => write!(f, "failed({})", kind),
        }
    }
}

/// Emit a phase transition for `parser`
pub fn enter_phase(parser: &str, phase: Phase) {
    tracing::debug!(parser, %phase, "phase");
}

/// Report the failure phase and pass the error through
pub fn fail(parser: &str, err: Error) -> Error {
    enter_phase(parser, Phase::Failed(err.kind()));
    err
}

/// Check that `file` exists and is a regular file
pub fn validate_file(file: &Path) -> Result<()> {
    if !file.exists() {
        return Err(Error::NotFound(file.to_path_buf()));
    }
    if !file.is_file() {
        return Err(Error::invalid_input(format!(
            "Path is not a file: {}",
            file.display()
        )));
    }
    Ok(())
}

/// Read a validated file as text, honouring a byte order mark or declared encoding
pub fn read_document(file: &Path) -> Result<String> {
    let bytes = fs::read(file)?;
    decode_document(&bytes)
}

/// Milliseconds elapsed since `start`
pub fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn validate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.xml");
        let err = validate_file(&missing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn validate_directory_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = validate_file(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn read_document_strips_bom_and_rejects_undeclared_latin1() {
        let mut bom = tempfile::NamedTempFile::new().unwrap();
        bom.write_all(b"\xEF\xBB\xBF<root/>").unwrap();
        assert_eq!(read_document(bom.path()).unwrap(), "<root/>");

        let mut latin1 = tempfile::NamedTempFile::new().unwrap();
        latin1.write_all(b"<root>caf\xE9</root>").unwrap();
        let err = read_document(latin1.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedDocument);
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::Searching.to_string(), "searching");
        assert_eq!(
            Phase::Failed(ErrorKind::NotFound).to_string(),
            "failed(not-found)"
        );
    }
}
