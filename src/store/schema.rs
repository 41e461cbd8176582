use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::catalog::{Basket, BasketId, Catalog, Keyword, KeywordId};
use crate::session::study::StudySession;

pub const FORMAT_VERSION: &str = "1.0";
pub const IMPORTED_SUBJECT: &str = "Imported Subject";
/// Largest id a document may carry. Ids are millisecond timestamps written as
/// JSON numbers, which stay exact only up to 2^53 - 1.
pub const MAX_DOCUMENT_ID: u64 = 9_007_199_254_740_991;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate keyword id {0}")]
    DuplicateKeyword(KeywordId),
    #[error("duplicate basket id {0}")]
    DuplicateBasket(BasketId),
    #[error("id {0} is outside the exact JSON number range")]
    IdOutOfRange(u64),
    #[error("keyword {0} has an empty name")]
    EmptyKeywordName(KeywordId),
    #[error("basket {0} has an empty name")]
    EmptyBasketName(BasketId),
}

/// On-disk study document.
///
/// Field order is the file's field order: subject, keywords, baskets, version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Document {
    pub subject: String,
    pub keywords: Vec<Keyword>,
    pub baskets: Vec<Basket>,
    pub version: String,
}

/// Lenient mirror of [`Document`] used for reading: every top-level field may
/// be missing or null, and unknown fields are ignored.
#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    keywords: Option<Vec<Keyword>>,
    #[serde(default)]
    baskets: Option<Vec<Basket>>,
    #[serde(default)]
    version: Option<serde_json::Value>,
}

impl Document {
    pub fn from_session(session: &StudySession) -> Self {
        Self {
            subject: session.subject().to_string(),
            keywords: session.catalog().keywords().to_vec(),
            baskets: session.catalog().baskets().to_vec(),
            version: FORMAT_VERSION.to_string(),
        }
    }

    /// Split into the subject label and a catalog. The count of dangling
    /// assignments that had to be cleared is returned as the third element.
    pub fn into_parts(self) -> (String, Catalog, usize) {
        let (catalog, cleared) = Catalog::from_parts(self.keywords, self.baskets);
        (self.subject, catalog, cleared)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Parse and validate a document. Nothing is returned unless the whole
/// document is acceptable.
pub fn parse_document(bytes: &[u8]) -> Result<Document, DocumentError> {
    let raw: RawDocument = serde_json::from_slice(bytes)?;

    let subject = raw
        .subject
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| IMPORTED_SUBJECT.to_string());
    let mut keywords = raw.keywords.unwrap_or_default();
    let mut baskets = raw.baskets.unwrap_or_default();
    let version = match raw.version {
        Some(serde_json::Value::String(v)) => v,
        Some(other) => other.to_string(),
        None => FORMAT_VERSION.to_string(),
    };

    let mut seen = HashSet::new();
    for keyword in &mut keywords {
        check_id(keyword.id.0)?;
        if let Some(basket) = keyword.assigned_basket {
            check_id(basket.0)?;
        }
        if !seen.insert(keyword.id) {
            return Err(DocumentError::DuplicateKeyword(keyword.id));
        }
        keyword.name = keyword.name.trim().to_string();
        if keyword.name.is_empty() {
            return Err(DocumentError::EmptyKeywordName(keyword.id));
        }
    }

    let mut seen = HashSet::new();
    for basket in &mut baskets {
        check_id(basket.id.0)?;
        if !seen.insert(basket.id) {
            return Err(DocumentError::DuplicateBasket(basket.id));
        }
        basket.name = basket.name.trim().to_string();
        if basket.name.is_empty() {
            return Err(DocumentError::EmptyBasketName(basket.id));
        }
    }

    Ok(Document {
        subject,
        keywords,
        baskets,
        version,
    })
}

fn check_id(id: u64) -> Result<(), DocumentError> {
    if id > MAX_DOCUMENT_ID {
        return Err(DocumentError::IdOutOfRange(id));
    }
    Ok(())
}

/// Default export file name: the subject with every character outside
/// `[A-Za-z0-9]` replaced by `_`, lower-cased, plus `_keywords.json`.
pub fn export_file_name(subject: &str) -> String {
    let slug: String = subject
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{slug}_keywords.json")
}
