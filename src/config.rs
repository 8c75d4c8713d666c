//! Site-wide configuration.
//!
//! The defaults describe the live site. A TOML file may override any subset of
//! them; it is read once at startup and never mutated afterwards.

use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// A fixed grouping of tags under one heading.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryDefinition {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
}

impl CategoryDefinition {
    pub fn new(id: &str, title: &str, tags: &[&str]) -> Self {
        CategoryDefinition {
            id: id.to_string(),
            title: title.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn accepts(&self, tags: &[String]) -> bool {
        tags.iter().any(|t| self.tags.contains(t))
    }
}

/// The author whose name is emphasised in author lists.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthorConfig {
    pub canonical: String,
    /// Alternative spellings rewritten to `canonical` before highlighting.
    pub variants: Vec<String>,
    /// Contribution markers that may directly follow the name (e.g. `*`).
    pub markers: String,
}

impl Default for AuthorConfig {
    fn default() -> Self {
        AuthorConfig {
            canonical: "Jane Doe".to_string(),
            variants: vec![
                "J. Doe".to_string(),
                "Jane A. Doe".to_string(),
                "Doe, Jane".to_string(),
            ],
            markers: "*†‡".to_string(),
        }
    }
}

/// Staggered transition timing for revealed items.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RevealTiming {
    pub step_ms: u32,
    pub max_ms: u32,
}

impl Default for RevealTiming {
    fn default() -> Self {
        RevealTiming {
            step_ms: 90,
            max_ms: 360,
        }
    }
}

impl RevealTiming {
    pub fn delay_for(&self, position: usize) -> u32 {
        let raw = (position as u64).saturating_mul(self.step_ms as u64);
        raw.min(self.max_ms as u64) as u32
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Publication data, relative to the page.
    pub data_path: String,
    /// `id` of the inline `application/json` script block.
    pub inline_data_id: String,
    pub featured_limit: usize,
    /// Where generated thumbnails live, relative to the page. Featured cards without their own
    /// thumbnail point here. `None` or an empty string leaves them without an image.
    pub thumbnail_dir: Option<String>,
    /// `None` waits for the server indefinitely.
    pub fetch_timeout_secs: Option<u64>,
    pub reveal: RevealTiming,
    pub author: AuthorConfig,
    pub categories: Vec<CategoryDefinition>,
    pub tag_labels: BTreeMap<String, String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            data_path: "data/papers.json".to_string(),
            inline_data_id: "papers-data".to_string(),
            featured_limit: 4,
            thumbnail_dir: Some("Images/papers".to_string()),
            fetch_timeout_secs: Some(10),
            reveal: RevealTiming::default(),
            author: AuthorConfig::default(),
            categories: default_categories(),
            tag_labels: default_tag_labels(),
        }
    }
}

impl SiteConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Human-readable label for a tag; unknown tags are shown verbatim.
    pub fn tag_label<'a>(&'a self, tag: &'a str) -> &'a str {
        self.tag_labels.get(tag).map(String::as_str).unwrap_or(tag)
    }
}

fn default_categories() -> Vec<CategoryDefinition> {
    vec![
        CategoryDefinition::new(
            "llm",
            "Large Language Models",
            &["LLM Alignment", "LLM Reasoning", "LLM Agents", "llm", "nlp"],
        ),
        CategoryDefinition::new(
            "rl",
            "Reinforcement Learning",
            &["Reinforcement Learning", "RLHF", "rl", "offline-rl"],
        ),
        CategoryDefinition::new(
            "theory",
            "Learning Theory",
            &["Learning Theory", "Optimization", "theory", "optimization"],
        ),
        CategoryDefinition::new(
            "vision",
            "Vision & Multimodal",
            &["Computer Vision", "Multimodal", "cv", "multimodal"],
        ),
    ]
}

fn default_tag_labels() -> BTreeMap<String, String> {
    [
        ("llm", "Language Models"),
        ("nlp", "Natural Language Processing"),
        ("rl", "Reinforcement Learning"),
        ("offline-rl", "Offline RL"),
        ("theory", "Learning Theory"),
        ("optimization", "Optimization"),
        ("cv", "Computer Vision"),
        ("multimodal", "Multimodal"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = SiteConfig::from_toml("featured_limit = 2\n[author]\ncanonical = \"Ada Lovelace\"\n")
            .expect("parse");
        assert_eq!(cfg.featured_limit, 2);
        assert_eq!(cfg.author.canonical, "Ada Lovelace");
        assert_eq!(cfg.author.markers, "*†‡");
        assert_eq!(cfg.data_path, "data/papers.json");
        assert_eq!(cfg.categories[0].title, "Large Language Models");
    }

    #[test]
    fn categories_can_be_replaced() {
        let cfg = SiteConfig::from_toml(
            "[[categories]]\nid = \"db\"\ntitle = \"Databases\"\ntags = [\"sql\"]\n",
        )
        .expect("parse");
        assert_eq!(cfg.categories.len(), 1);
        assert!(cfg.categories[0].accepts(&["sql".to_string()]));
    }

    #[test]
    fn unknown_tag_label_passes_through() {
        let cfg = SiteConfig::default();
        assert_eq!(cfg.tag_label("cv"), "Computer Vision");
        assert_eq!(cfg.tag_label("Quantum"), "Quantum");
    }

    #[test]
    fn reveal_delay_is_clamped() {
        let t = RevealTiming::default();
        assert_eq!(t.delay_for(0), 0);
        assert_eq!(t.delay_for(2), 180);
        assert_eq!(t.delay_for(50), 360);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = SiteConfig::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
