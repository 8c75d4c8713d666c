use regex::Regex;

use crate::config::AuthorConfig;

/// A run of author text, emphasised or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub emphasised: bool,
}

impl Segment {
    fn plain(text: &str) -> Self {
        Segment {
            text: text.to_string(),
            emphasised: false,
        }
    }
}

/// Emphasises one author inside raw author strings.
pub struct Highlighter {
    variants: Vec<Regex>,
    canonical: String,
    name: Option<Regex>,
}

impl Highlighter {
    pub fn new(cfg: &AuthorConfig) -> Self {
        let canonical = cfg.canonical.trim().to_string();
        let variants = cfg
            .variants
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(&canonical))
            .filter_map(|v| Regex::new(&format!(r"(?i)\b{}(?:\b|$)", regex::escape(v))).ok())
            .collect();
        let name = (!canonical.is_empty())
            .then(|| {
                let markers = if cfg.markers.is_empty() {
                    String::new()
                } else {
                    format!("[{}]?", regex::escape(&cfg.markers))
                };
                Regex::new(&format!(r"(?i)\b{}\b{markers}", regex::escape(&canonical))).ok()
            })
            .flatten();
        Highlighter {
            variants,
            canonical,
            name,
        }
    }

    /// Rewrite known spellings to the canonical name.
    pub fn canonicalise(&self, authors: &str) -> String {
        self.variants
            .iter()
            .fold(authors.to_string(), |acc, re| {
                re.replace_all(&acc, regex::NoExpand(&self.canonical)).into_owned()
            })
    }

    /// Split `authors` into plain and emphasised runs. With no match the whole string comes back
    /// as one plain segment.
    pub fn segments(&self, authors: &str) -> Vec<Segment> {
        let Some(name) = &self.name else {
            return vec![Segment::plain(authors)];
        };
        let text = self.canonicalise(authors);
        let mut out = Vec::new();
        let mut last = 0;
        for m in name.find_iter(&text) {
            if m.start() > last {
                out.push(Segment::plain(&text[last..m.start()]));
            }
            out.push(Segment {
                text: m.as_str().to_string(),
                emphasised: true,
            });
            last = m.end();
        }
        if out.is_empty() {
            return vec![Segment::plain(authors)];
        }
        if last < text.len() {
            out.push(Segment::plain(&text[last..]));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlighter() -> Highlighter {
        Highlighter::new(&AuthorConfig::default())
    }

    #[test]
    fn emphasises_canonical_name_with_marker() {
        let segs = highlighter().segments("Alan Turing, Jane Doe*, Grace Hopper");
        assert_eq!(
            segs,
            vec![
                Segment::plain("Alan Turing, "),
                Segment {
                    text: "Jane Doe*".into(),
                    emphasised: true
                },
                Segment::plain(", Grace Hopper"),
            ]
        );
    }

    #[test]
    fn variants_are_canonicalised_first() {
        let segs = highlighter().segments("J. Doe and A. Smith");
        assert_eq!(segs[0].text, "Jane Doe");
        assert!(segs[0].emphasised);
        assert_eq!(segs[1], Segment::plain(" and A. Smith"));
    }

    #[test]
    fn match_is_case_insensitive() {
        let segs = highlighter().segments("JANE DOE");
        assert_eq!(segs.len(), 1);
        assert!(segs[0].emphasised);
    }

    #[test]
    fn no_match_returns_input_unchanged() {
        let segs = highlighter().segments("Alan Turing,  Grace Hopper");
        assert_eq!(segs, vec![Segment::plain("Alan Turing,  Grace Hopper")]);
    }

    #[test]
    fn every_occurrence_is_wrapped() {
        let segs = highlighter().segments("Jane Doe, B. Lee, Jane Doe†");
        assert_eq!(segs.iter().filter(|s| s.emphasised).count(), 2);
        assert_eq!(segs.last().expect("seg").text, "Jane Doe†");
    }

    #[test]
    fn segments_concatenate_back() {
        proptest::proptest!(|(s in "[A-Za-z ,.]{0,40}")| {
            let h = highlighter();
            let joined: String = h.segments(&s).into_iter().map(|seg| seg.text).collect();
            proptest::prop_assert_eq!(joined, h.canonicalise(&s));
        })
    }
}
