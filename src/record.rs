use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use tracing::warn;

/// The document served at `data/papers.json` (or embedded inline in the page).
#[derive(Debug, Clone, Default)]
pub struct Payload {
    pub papers: Vec<PublicationRecord>,
}

#[derive(Deserialize)]
struct RawPayload {
    #[serde(default)]
    papers: Vec<serde_json::Value>,
}

impl Payload {
    /// Parse the document. Only a malformed document is an error: a single record of an
    /// unexpected shape is skipped with a warning and the rest are kept.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        let raw: RawPayload = serde_json::from_str(raw)?;
        let papers = raw
            .papers
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(index, "skipping malformed publication record: {e}");
                    None
                }
            })
            .collect();
        Ok(Payload { papers })
    }
}

/// A single publication as authored in the data file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PublicationRecord {
    /// De-duplication key. Empty strings behave like a missing id.
    pub id: Option<String>,
    pub title: String,
    /// Either one display string or a list of names, joined with `", "`.
    #[serde(deserialize_with = "string_or_list")]
    pub authors: String,
    /// ISO date (`YYYY-MM-DD`, `YYYY-MM` or `YYYY`).
    pub date: Option<String>,
    /// Preformatted date, shown verbatim when present.
    pub display_date: Option<String>,
    pub venue: Option<String>,
    pub summary: Option<String>,
    #[serde(alias = "image")]
    pub thumbnail: Option<String>,
    pub tags: Vec<String>,
    /// Link kind (`pdf`, `code`, `arxiv`, `scholar`, ...) to URL or identifier.
    pub links: BTreeMap<String, Option<String>>,
    #[serde(default = "default_featured")]
    pub featured: bool,
}

fn default_featured() -> bool {
    true
}

fn string_or_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Authors {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<Authors>::deserialize(deserializer)? {
        Some(Authors::One(s)) => s,
        Some(Authors::Many(names)) => names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        None => String::new(),
    })
}

impl PublicationRecord {
    /// The id if it is usable for de-duplication.
    pub fn dedup_key(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// A non-empty link of the given kind.
    pub fn link(&self, kind: LinkKind) -> Option<&str> {
        self.links
            .get(kind.key())
            .and_then(|s| s.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Arxiv,
    Pdf,
    Code,
    Scholar,
}

impl LinkKind {
    pub fn key(self) -> &'static str {
        match self {
            LinkKind::Arxiv => "arxiv",
            LinkKind::Pdf => "pdf",
            LinkKind::Code => "code",
            LinkKind::Scholar => "scholar",
        }
    }
}
