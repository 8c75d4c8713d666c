//! Pure transformation from raw records to display-ready, grouped publications.

use std::collections::HashSet;

use url::Url;

use crate::{
    config::{CategoryDefinition, SiteConfig},
    record::PublicationRecord,
    resolver,
};

pub mod authors;
pub mod date;
pub mod venue;

pub use authors::{Highlighter, Segment};

/// A record with every field the renderer needs already derived.
#[derive(Debug, Clone)]
pub struct DisplayRecord {
    pub record: PublicationRecord,
    pub badge: String,
    pub venue_tag: Option<String>,
    pub authors: Vec<Segment>,
    /// `None` means the record is not rendered.
    pub primary_link: Option<Url>,
}

impl DisplayRecord {
    pub fn title(&self) -> &str {
        &self.record.title
    }

    pub fn tags(&self) -> &[String] {
        &self.record.tags
    }
}

#[derive(Debug, Clone)]
pub struct Group {
    pub category: CategoryDefinition,
    pub records: Vec<DisplayRecord>,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    /// Non-empty groups, in configured category order.
    pub groups: Vec<Group>,
    /// Records eligible for the featured list, newest first.
    pub featured: Vec<DisplayRecord>,
}

impl Normalized {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Keep the first record for each non-empty id; records without an id always survive.
pub fn dedup(records: Vec<PublicationRecord>) -> Vec<PublicationRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| match r.dedup_key() {
            Some(id) => seen.insert(id.to_string()),
            None => true,
        })
        .collect()
}

/// Newest first. The sort is stable, so equal dates keep input order.
pub fn sort_by_date(records: &mut [PublicationRecord]) {
    records.sort_by_key(|r| std::cmp::Reverse(date::sort_key(r.date.as_deref())));
}

pub fn derive(record: PublicationRecord, highlighter: &Highlighter) -> DisplayRecord {
    DisplayRecord {
        badge: date::badge(record.display_date.as_deref(), record.date.as_deref()),
        venue_tag: venue::tag(&record),
        authors: highlighter.segments(&record.authors),
        primary_link: resolver::primary_link(&record),
        record,
    }
}

/// Run the whole normalisation pass.
pub fn normalize(records: Vec<PublicationRecord>, cfg: &SiteConfig) -> Normalized {
    let highlighter = Highlighter::new(&cfg.author);
    let mut records = dedup(records);
    sort_by_date(&mut records);

    let groups = cfg
        .categories
        .iter()
        .filter_map(|category| {
            let mut members: Vec<PublicationRecord> = records
                .iter()
                .filter(|r| category.accepts(&r.tags))
                .cloned()
                .collect();
            if members.is_empty() {
                return None;
            }
            sort_by_date(&mut members);
            Some(Group {
                category: category.clone(),
                records: members
                    .into_iter()
                    .map(|r| derive(r, &highlighter))
                    .collect(),
            })
        })
        .collect();

    let featured = records
        .iter()
        .filter(|r| r.featured)
        .take(cfg.featured_limit)
        .cloned()
        .map(|r| derive(r, &highlighter))
        .collect();

    tracing::debug!(
        records = records.len(),
        "normalised publications into categories"
    );
    Normalized { groups, featured }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: Option<&str>, title: &str, date: Option<&str>, tags: &[&str]) -> PublicationRecord {
        PublicationRecord {
            id: id.map(str::to_string),
            title: title.to_string(),
            date: date.map(str::to_string),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            featured: true,
            ..Default::default()
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let out = dedup(vec![
            rec(Some("p1"), "first", None, &[]),
            rec(Some("p1"), "second", None, &[]),
            rec(None, "anon", None, &[]),
            rec(None, "anon", None, &[]),
            rec(Some(""), "blank", None, &[]),
            rec(Some(""), "blank", None, &[]),
        ]);
        let titles: Vec<_> = out.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["first", "anon", "anon", "blank", "blank"]);
    }

    #[test]
    fn sort_is_descending_with_missing_dates_last() {
        let mut v = vec![
            rec(None, "old", Some("2019-05-01"), &[]),
            rec(None, "none", None, &[]),
            rec(None, "new", Some("2024-01-01"), &[]),
            rec(None, "bad", Some("someday"), &[]),
        ];
        sort_by_date(&mut v);
        let titles: Vec<_> = v.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["new", "old", "none", "bad"]);
    }

    #[test]
    fn groups_follow_category_order_and_skip_empty() {
        let cfg = SiteConfig::default();
        let out = normalize(
            vec![
                rec(Some("a"), "vision", Some("2022-01-01"), &["cv"]),
                rec(Some("b"), "both", Some("2023-01-01"), &["rl", "LLM Alignment"]),
            ],
            &cfg,
        );
        let ids: Vec<_> = out.groups.iter().map(|g| g.category.id.as_str()).collect();
        assert_eq!(ids, ["llm", "rl", "vision"]);
        assert_eq!(out.groups[1].records[0].title(), "both");
    }

    #[test]
    fn untagged_records_belong_to_no_group() {
        let cfg = SiteConfig::default();
        let out = normalize(vec![rec(Some("a"), "lonely", None, &["Quantum"])], &cfg);
        assert!(out.is_empty());
    }

    #[test]
    fn featured_respects_flag_and_limit() {
        let mut cfg = SiteConfig::default();
        cfg.featured_limit = 2;
        let mut hidden = rec(Some("h"), "hidden", Some("2025-01-01"), &[]);
        hidden.featured = false;
        let out = normalize(
            vec![
                rec(Some("a"), "a", Some("2020-01-01"), &[]),
                hidden,
                rec(Some("b"), "b", Some("2021-01-01"), &[]),
                rec(Some("c"), "c", Some("2019-01-01"), &[]),
            ],
            &cfg,
        );
        let titles: Vec<_> = out.featured.iter().map(|d| d.title()).collect();
        assert_eq!(titles, ["b", "a"]);
    }

    #[test]
    fn groups_are_sorted_newest_first() {
        let cfg = SiteConfig::default();
        proptest::proptest!(|(years in proptest::collection::vec(1990u32..2030, 0..20))| {
            let records = years
                .iter()
                .enumerate()
                .map(|(i, y)| rec(Some(&i.to_string()), "t", Some(&format!("{y}-06-01")), &["rl"]))
                .collect();
            let out = normalize(records, &cfg);
            for group in &out.groups {
                let keys: Vec<_> = group
                    .records
                    .iter()
                    .map(|d| date::sort_key(d.record.date.as_deref()))
                    .collect();
                proptest::prop_assert!(keys.windows(2).all(|w| w[0] >= w[1]));
            }
        })
    }

    #[test]
    fn dedup_never_drops_anonymous_records() {
        proptest::proptest!(|(ids in proptest::collection::vec(proptest::option::of("[a-c]"), 0..30))| {
            let records: Vec<_> = ids
                .iter()
                .map(|id| rec(id.as_deref(), "t", None, &[]))
                .collect();
            let anon = ids.iter().filter(|i| i.is_none()).count();
            let distinct: HashSet<_> = ids.iter().flatten().collect();
            let out = dedup(records);
            proptest::prop_assert_eq!(out.len(), anon + distinct.len());
        })
    }
}
