//! Publications pipeline for a static academic site.
//!
//! Loads the publication records for a page, normalises and groups them, renders them into the
//! page's anchors and mounts the tag filter. [`run`] is the boundary: every failure ends in a
//! rendered message, never in an error.

pub mod config;
pub mod embed;
pub mod filter;
pub mod identifier;
pub mod loader;
pub mod normalize;
pub mod page;
pub mod record;
pub mod render;
pub mod resolver;
pub mod thumbnail;

use tracing::{debug, error};

pub use config::SiteConfig;
pub use filter::{FilterController, FilterState, Transition};
pub use loader::{FailureKind, LoadError, Transport};
pub use page::Page;
pub use record::{Payload, PublicationRecord};

use crate::{
    page::replace_rendered,
    render::{Element, reveal::Reveal},
};

/// Text for a featured container that has nothing linkable to show.
pub const NO_FEATURED_TEXT: &str = "No papers available yet.";

#[derive(Debug)]
pub enum Status {
    Rendered {
        groups: usize,
        items: usize,
    },
    Failed(FailureKind),
}

#[derive(Debug)]
pub struct Outcome {
    pub status: Status,
    /// Records dropped from the library because no primary link could be derived.
    pub excluded: usize,
    /// Present only after a successful render.
    pub filter: Option<FilterController>,
}

/// Load, normalise, render and mount filters for `page`.
pub fn run(
    page: &mut Page,
    cfg: &SiteConfig,
    transport: &dyn Transport,
    reveal: &mut dyn Reveal,
) -> Outcome {
    let loaded = match loader::load(page, cfg, transport) {
        Ok(loaded) => loaded,
        Err(err) => {
            error!("failed to load publications: {err}");
            return fail(page, err.kind());
        }
    };
    debug!(origin = ?loaded.origin, papers = loaded.payload.papers.len(), "loaded publications");

    let normalized = normalize::normalize(loaded.payload.papers, cfg);
    if normalized.is_empty() {
        return fail(page, FailureKind::Empty);
    }

    let sections = render::render_groups(&normalized.groups, cfg);
    if sections.is_empty() {
        return fail(page, FailureKind::Empty);
    }
    let total: usize = normalized.groups.iter().map(|g| g.records.len()).sum();
    let items: usize = sections
        .iter()
        .map(|s| s.find_all(&|e| e.has_class(render::ITEM_CLASS)).len())
        .sum();
    let groups = sections.len();

    if let Some(library) = page.library.as_mut() {
        replace_rendered(library, sections);
        reveal.apply(library);
    }
    if let Some(featured) = page.featured.as_mut() {
        let list = render::render_featured(&normalized.featured, cfg)
            .unwrap_or_else(|| render::render_message(NO_FEATURED_TEXT));
        replace_rendered(featured, vec![list]);
        reveal.apply(featured);
    }

    let filter = FilterController::mount(page, cfg);
    debug!(groups, items, excluded = total - items, "rendered publications");
    Outcome {
        status: Status::Rendered { groups, items },
        excluded: total - items,
        filter,
    }
}

/// Replace the library and featured contents with the message for `kind`.
fn fail(page: &mut Page, kind: FailureKind) -> Outcome {
    let message = kind.message();
    for container in [page.library.as_mut(), page.featured.as_mut()]
        .into_iter()
        .flatten()
    {
        replace_rendered(container, vec![render::render_message(message)]);
    }
    if let Some(filters) = page.filters.as_mut() {
        replace_rendered(filters, Vec::<Element>::new());
        filters.set_hidden(true);
    }
    if let Some(empty) = page.empty_state.as_mut() {
        empty.set_hidden(true);
    }
    Outcome {
        status: Status::Failed(kind),
        excluded: 0,
        filter: None,
    }
}
