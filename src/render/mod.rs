//! Maps normalised publications onto virtual document nodes.
//!
//! Nothing here touches a live document: callers get [`Element`] trees back and splice them into
//! a [`crate::page::Page`].

use crate::{
    config::{RevealTiming, SiteConfig},
    identifier::Arxiv,
    normalize::{DisplayRecord, Group},
    thumbnail,
};

pub mod html;
pub mod node;
pub mod reveal;

pub use node::{Element, Node};

/// Marks every node inserted by the renderer, so a later pass can replace exactly those.
pub const RENDERED_ATTR: &str = "data-papers-rendered";
pub const GROUP_CLASS: &str = "paper-group";
pub const ITEM_CLASS: &str = "paper-item";
pub const CARD_CLASS: &str = "paper-card";
pub const MESSAGE_CLASS: &str = "papers-message";
/// Item tags, serialised as a JSON array of strings.
pub const TAGS_ATTR: &str = "data-tags";

/// One list item per record that has a primary link.
pub fn render_item(record: &DisplayRecord) -> Option<Element> {
    let link = record.primary_link.as_ref()?;

    let mut anchor = Element::new("a")
        .with_class("paper-link")
        .with_attr("href", link.as_str())
        .with_attr("target", "_blank")
        .with_attr("rel", "noopener");
    if let Some(venue) = &record.venue_tag {
        anchor = anchor.with_child(Element::new("span").with_class("paper-venue").with_text(venue));
    }
    anchor = anchor.with_child(
        Element::new("span")
            .with_class("paper-title")
            .with_text(record.title()),
    );
    anchor = anchor.with_child(authors(record));

    let tags = serde_json::to_string(record.tags()).unwrap_or_else(|_| "[]".to_string());
    Some(
        Element::new("li")
            .with_class(ITEM_CLASS)
            .with_class(reveal::REVEAL_CLASS)
            .with_attr(TAGS_ATTR, tags)
            .with_child(
                Element::new("span")
                    .with_class("paper-date")
                    .with_text(&record.badge),
            )
            .with_child(anchor),
    )
}

/// One `<section>` per group that still has items after link exclusion.
pub fn render_groups(groups: &[Group], cfg: &SiteConfig) -> Vec<Element> {
    let mut position = 0;
    groups
        .iter()
        .filter_map(|group| {
            let items: Vec<Element> = group.records.iter().filter_map(render_item).collect();
            if items.is_empty() {
                return None;
            }
            let mut list = Element::new("ul").with_class("paper-list");
            for item in items {
                list = list.with_child(stagger(item, position, &cfg.reveal));
                position += 1;
            }
            Some(
                Element::new("section")
                    .with_class(GROUP_CLASS)
                    .with_attr(RENDERED_ATTR, "")
                    .with_attr("data-category", &group.category.id)
                    .with_child(
                        Element::new("h3")
                            .with_class("paper-group__title")
                            .with_text(&group.category.title),
                    )
                    .with_child(list),
            )
        })
        .collect()
}

fn authors(record: &DisplayRecord) -> Element {
    let mut authors = Element::new("span").with_class("paper-authors");
    for seg in &record.authors {
        authors = if seg.emphasised {
            authors.with_child(Element::new("strong").with_text(&seg.text))
        } else {
            authors.with_text(&seg.text)
        };
    }
    authors
}

/// A featured card: thumbnail, linked title, meta line, summary, tag pills and every link the
/// record lists. Records without a primary link get no card.
pub fn render_card(record: &DisplayRecord, cfg: &SiteConfig) -> Option<Element> {
    let link = record.primary_link.as_ref()?;
    let paper = &record.record;

    let mut image = Element::new("div").with_class("paper-card__image");
    if let Some(src) = thumbnail_src(record, cfg) {
        image = image.with_child(
            Element::new("img")
                .with_attr("src", src)
                .with_attr("alt", format!("{} thumbnail", record.title()))
                .with_attr("loading", "lazy"),
        );
    }

    let mut meta = Element::new("div")
        .with_class("paper-card__meta")
        .with_child(Element::new("span").with_class("paper-date").with_text(&record.badge));
    if let Some(venue) = &record.venue_tag {
        meta = meta.with_child(Element::new("span").with_class("paper-venue").with_text(venue));
    }
    if !paper.authors.trim().is_empty() {
        meta = meta.with_child(authors(record));
    }

    let mut body = Element::new("div")
        .with_class("paper-card__body")
        .with_child(
            Element::new("h3").with_child(
                Element::new("a")
                    .with_class("paper-link")
                    .with_attr("href", link.as_str())
                    .with_attr("target", "_blank")
                    .with_attr("rel", "noopener")
                    .with_text(record.title()),
            ),
        )
        .with_child(meta);
    if let Some(summary) = paper.summary.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        body = body.with_child(
            Element::new("p")
                .with_class("paper-card__summary")
                .with_text(summary),
        );
    }
    if !record.tags().is_empty() {
        body = body.with_child(record.tags().iter().fold(
            Element::new("div").with_class("hero__meta"),
            |pills, tag| {
                pills.with_child(
                    Element::new("span")
                        .with_class("pill")
                        .with_text(cfg.tag_label(tag)),
                )
            },
        ));
    }
    let links: Vec<Element> = paper
        .links
        .iter()
        .filter_map(|(kind, value)| {
            let value = value.as_deref().map(str::trim).filter(|v| !v.is_empty())?;
            Some(
                Element::new("a")
                    .with_attr("href", link_href(kind, value))
                    .with_attr("target", "_blank")
                    .with_attr("rel", "noopener")
                    .with_text(capitalise(&kind.replace('_', " "))),
            )
        })
        .collect();
    if !links.is_empty() {
        body = body.with_child(
            links
                .into_iter()
                .fold(Element::new("div").with_class("paper-card__links"), Element::with_child),
        );
    }

    let tags = serde_json::to_string(record.tags()).unwrap_or_else(|_| "[]".to_string());
    Some(
        Element::new("article")
            .with_class(CARD_CLASS)
            .with_class(reveal::REVEAL_CLASS)
            .with_attr(TAGS_ATTR, tags)
            .with_child(image)
            .with_child(body),
    )
}

/// The record's own thumbnail, else the generated one under `thumbnail_dir`.
fn thumbnail_src(record: &DisplayRecord, cfg: &SiteConfig) -> Option<String> {
    let own = record
        .record
        .thumbnail
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(own) = own {
        return Some(own.to_string());
    }
    let dir = cfg
        .thumbnail_dir
        .as_deref()
        .map(|d| d.trim().trim_end_matches('/'))
        .filter(|d| !d.is_empty())?;
    Some(format!("{dir}/{}", thumbnail::file_name(&record.record)))
}

/// Bare arXiv ids become abstract page URLs; everything else is used as given.
fn link_href(kind: &str, value: &str) -> String {
    if kind == "arxiv"
        && let Some(url) = Arxiv::parse(value).and_then(|id| id.abs_url())
    {
        return url.into();
    }
    value.to_string()
}

/// Uppercase the first character of every space-separated word.
fn capitalise(label: &str) -> String {
    label
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cards for the featured records, or `None` when none of them can be linked.
pub fn render_featured(records: &[DisplayRecord], cfg: &SiteConfig) -> Option<Element> {
    let cards: Vec<Element> = records
        .iter()
        .filter_map(|record| render_card(record, cfg))
        .collect();
    if cards.is_empty() {
        return None;
    }
    let list = cards.into_iter().enumerate().fold(
        Element::new("div")
            .with_class("paper-cards")
            .with_attr(RENDERED_ATTR, ""),
        |list, (i, card)| list.with_child(stagger(card, i, &cfg.reveal)),
    );
    Some(list)
}

/// A user-facing status line placed in a container instead of publications.
pub fn render_message(text: &str) -> Element {
    Element::new("p")
        .with_class("text-muted")
        .with_class(MESSAGE_CLASS)
        .with_attr(RENDERED_ATTR, "")
        .with_text(text)
}

fn stagger(mut item: Element, position: usize, timing: &RevealTiming) -> Element {
    item.set_attr(reveal::INDEX_ATTR, position.to_string());
    set_delay(&mut item, timing.delay_for(position));
    item
}

pub fn set_delay(item: &mut Element, delay_ms: u32) {
    item.set_attr("style", format!("transition-delay: {delay_ms}ms"));
}

/// Tags serialised on a rendered item.
pub fn item_tags(item: &Element) -> Vec<String> {
    item.attr(TAGS_ATTR)
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{normalize, record::Payload};

    fn groups(json: &str) -> Vec<Group> {
        let payload = Payload::from_json(json).expect("parse");
        normalize::normalize(payload.papers, &SiteConfig::default()).groups
    }

    #[test]
    fn item_carries_badge_link_venue_title_authors() {
        let g = groups(
            r#"{"papers":[{"id":"a","title":"X","authors":"Jane Doe, B. Lee","date":"2023-01-01",
                "tags":["LLM Alignment"],"links":{"arxiv":"2301.00001"}}]}"#,
        );
        let item = render_item(&g[0].records[0]).expect("item");
        let html = html::to_html(&item).expect("html");
        assert!(html.contains(r#"<span class="paper-date">2023</span>"#));
        assert!(html.contains(r#"href="https://arxiv.org/abs/2301.00001""#));
        let venue = item.find_all(&|e| e.has_class("paper-venue"));
        assert_eq!(venue[0].text(), "Preprint '23");
        assert!(html.contains(r#"<span class="paper-title">X</span>"#));
        assert!(html.contains("<strong>Jane Doe</strong>, B. Lee"));
        assert_eq!(item_tags(&item), ["LLM Alignment"]);
    }

    #[test]
    fn unlinked_records_and_empty_groups_are_dropped() {
        let g = groups(
            r#"{"papers":[{"id":"a","title":"X","venue":"Workshop on Y","tags":["LLM Alignment"]},
                {"id":"b","title":"Y","tags":["rl"],"links":{"scholar":"https://scholar.google.com/y"}}]}"#,
        );
        assert_eq!(g.len(), 2);
        let sections = render_groups(&g, &SiteConfig::default());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].attr("data-category"), Some("rl"));
    }

    #[test]
    fn stagger_indices_run_across_sections() {
        let g = groups(
            r#"{"papers":[
                {"id":"a","title":"A","tags":["llm"],"links":{"arxiv":"2301.00001"}},
                {"id":"b","title":"B","tags":["rl"],"links":{"arxiv":"2301.00002"}},
                {"id":"c","title":"C","tags":["rl"],"links":{"arxiv":"2301.00003"}}]}"#,
        );
        let mut root = Element::new("div");
        root.children = render_groups(&g, &SiteConfig::default())
            .into_iter()
            .map(Node::Element)
            .collect();
        let items = root.find_all(&|e| e.has_class(ITEM_CLASS));
        let indices: Vec<_> = items.iter().filter_map(|e| e.attr(reveal::INDEX_ATTR)).collect();
        assert_eq!(indices, ["0", "1", "2"]);
        assert_eq!(items[2].attr("style"), Some("transition-delay: 180ms"));
    }

    #[test]
    fn featured_skips_unlinked() {
        let payload = Payload::from_json(
            r#"{"papers":[{"title":"A","date":"2024-01-01"},
                {"title":"B","date":"2023-01-01","links":{"arxiv":"2301.00001"}}]}"#,
        )
        .expect("parse");
        let n = normalize::normalize(payload.papers, &SiteConfig::default());
        let list = render_featured(&n.featured, &SiteConfig::default()).expect("list");
        assert_eq!(list.child_elements().count(), 1);
    }

    fn featured(json: &str, cfg: &SiteConfig) -> Element {
        let payload = Payload::from_json(json).expect("parse");
        let n = normalize::normalize(payload.papers, cfg);
        render_featured(&n.featured, cfg).expect("cards")
    }

    #[test]
    fn featured_card_carries_everything() {
        let cfg = SiteConfig::default();
        let list = featured(
            r#"{"papers":[{"id":"a","title":"X","authors":["Jane Doe","B. Lee"],"date":"2024-02-01",
                "summary":"  Short summary. ","image":"img/x.png","tags":["cv","rl"],
                "links":{"arxiv":"2401.00001","code":"https://github.com/x/y","project_page":"https://x.org","pdf":""}}]}"#,
            &cfg,
        );
        let card = list.child_elements().next().expect("card");
        assert_eq!(card.tag, "article");
        assert!(card.has_class(CARD_CLASS));

        let img = card.find_all(&|e| e.tag == "img");
        assert_eq!(img[0].attr("src"), Some("img/x.png"));
        assert_eq!(img[0].attr("alt"), Some("X thumbnail"));
        assert_eq!(img[0].attr("loading"), Some("lazy"));

        let summary = card.find_all(&|e| e.has_class("paper-card__summary"));
        assert_eq!(summary[0].text(), "Short summary.");

        let pills: Vec<_> = card
            .find_all(&|e| e.has_class("pill"))
            .into_iter()
            .map(Element::text)
            .collect();
        assert_eq!(pills, ["Computer Vision", cfg.tag_label("rl")]);

        let links = card.find_all(&|e| e.has_class("paper-card__links"))[0];
        let labelled: Vec<_> = links
            .child_elements()
            .map(|a| (a.text(), a.attr("href").unwrap_or_default().to_string()))
            .collect();
        assert_eq!(
            labelled,
            [
                ("Arxiv".to_string(), "https://arxiv.org/abs/2401.00001".to_string()),
                ("Code".to_string(), "https://github.com/x/y".to_string()),
                ("Project Page".to_string(), "https://x.org".to_string()),
            ]
        );
        assert!(html::to_html(card).expect("html").contains("<strong>Jane Doe</strong>, B. Lee"));
    }

    #[test]
    fn card_falls_back_to_generated_thumbnail() {
        let json = r#"{"papers":[{"title":"Deep Things","links":{"arxiv":"2401.00001"}}]}"#;
        let list = featured(json, &SiteConfig::default());
        let img = list.find_all(&|e| e.tag == "img");
        assert_eq!(img[0].attr("src"), Some("Images/papers/deep-things.svg"));

        let cfg = SiteConfig {
            thumbnail_dir: None,
            ..SiteConfig::default()
        };
        let list = featured(json, &cfg);
        assert!(list.find_all(&|e| e.tag == "img").is_empty());
        assert!(list.find_all(&|e| e.has_class("paper-card__summary")).is_empty());
        assert!(list.find_all(&|e| e.has_class("hero__meta")).is_empty());
    }
}
