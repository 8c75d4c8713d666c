//! Tag filtering over already-rendered library items.
//!
//! The controller never re-fetches or re-normalises. It reads the tag sets serialised on the
//! rendered items once, then only toggles visibility.

use std::collections::BTreeSet;

use tracing::debug;

use crate::{
    config::{RevealTiming, SiteConfig},
    page::{Page, replace_rendered},
    render::{self, Element, GROUP_CLASS, ITEM_CLASS, RENDERED_ATTR},
};

pub const ALL: &str = "All";
pub const BUTTON_CLASS: &str = "filter-button";
pub const ACTIVE_CLASS: &str = "is-active";
pub const FILTER_TAG_ATTR: &str = "data-filter-tag";

/// Session-local filter state, owned by the controller and discarded with the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// `"All"` or a specific tag.
    pub current: String,
    /// Tag set of every rendered item, in visual order.
    pub items: Vec<Vec<String>>,
    pub visible: usize,
}

impl FilterState {
    fn matches(&self, tags: &[String]) -> bool {
        self.current == ALL || tags.iter().any(|t| *t == self.current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The requested tag was already active.
    Unchanged,
    Applied { visible: usize },
}

#[derive(Debug, Clone)]
pub struct FilterController {
    state: FilterState,
    /// Distinct tags with their display labels, sorted by tag.
    options: Vec<(String, String)>,
    timing: RevealTiming,
}

impl FilterController {
    /// Build the controls for a freshly rendered library. Returns `None` when there is no
    /// library to filter.
    pub fn mount(page: &mut Page, cfg: &SiteConfig) -> Option<Self> {
        let library = page.library.as_ref()?;
        let items: Vec<Vec<String>> = library
            .find_all(&|e| e.has_class(ITEM_CLASS))
            .into_iter()
            .map(render::item_tags)
            .collect();
        let distinct: BTreeSet<&String> = items.iter().flatten().collect();
        let options = distinct
            .into_iter()
            .map(|t| (t.clone(), cfg.tag_label(t).to_string()))
            .collect();

        let controller = FilterController {
            state: FilterState {
                current: ALL.to_string(),
                visible: items.len(),
                items,
            },
            options,
            timing: cfg.reveal,
        };
        controller.render_controls(page);
        if let Some(empty) = page.empty_state.as_mut() {
            empty.set_hidden(true);
        }
        Some(controller)
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// `"All"` followed by every distinct tag, each with its display label.
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once((ALL, ALL)).chain(
            self.options
                .iter()
                .map(|(tag, label)| (tag.as_str(), label.as_str())),
        )
    }

    /// Handle activation of a filter control.
    pub fn click(&mut self, page: &mut Page, target: &Element) -> Option<Transition> {
        let tag = target.attr(FILTER_TAG_ATTR)?.to_string();
        Some(self.select(page, &tag))
    }

    pub fn select(&mut self, page: &mut Page, tag: &str) -> Transition {
        if self.state.current == tag {
            return Transition::Unchanged;
        }
        self.state.current = tag.to_string();
        self.state.visible = self.apply(page);
        self.render_controls(page);
        if let Some(empty) = page.empty_state.as_mut() {
            empty.set_hidden(self.state.visible > 0);
        }
        debug!(tag, visible = self.state.visible, "applied publication filter");
        Transition::Applied {
            visible: self.state.visible,
        }
    }

    /// Recompute visibility of every item and section; returns the visible count.
    fn apply(&self, page: &mut Page) -> usize {
        let Some(library) = page.library.as_mut() else {
            return 0;
        };
        let state = &self.state;
        let timing = self.timing;
        let mut index = 0;
        let mut visible = 0;
        for section in library.child_elements_mut() {
            if !section.has_class(GROUP_CLASS) {
                continue;
            }
            let mut section_visible = false;
            section.for_each_mut(&mut |e| {
                if !e.has_class(ITEM_CLASS) {
                    return;
                }
                let shown = state.items.get(index).is_some_and(|tags| state.matches(tags));
                index += 1;
                e.set_hidden(!shown);
                if shown {
                    render::set_delay(e, timing.delay_for(visible));
                    visible += 1;
                    section_visible = true;
                }
            });
            section.set_hidden(!section_visible);
        }
        visible
    }

    fn render_controls(&self, page: &mut Page) {
        let Some(filters) = page.filters.as_mut() else {
            return;
        };
        if self.options.is_empty() {
            replace_rendered(filters, Vec::new());
            filters.set_hidden(true);
            return;
        }
        let buttons = self
            .options()
            .map(|(tag, label)| button(tag, label, tag == self.state.current))
            .collect();
        replace_rendered(filters, buttons);
        filters.set_hidden(false);
    }
}

fn button(tag: &str, label: &str, active: bool) -> Element {
    let mut b = Element::new("button")
        .with_attr("type", "button")
        .with_class(BUTTON_CLASS)
        .with_attr(FILTER_TAG_ATTR, tag)
        .with_attr(RENDERED_ATTR, "")
        .with_text(label);
    if active {
        b.add_class(ACTIVE_CLASS);
        b.set_attr("aria-pressed", "true");
    }
    b
}
