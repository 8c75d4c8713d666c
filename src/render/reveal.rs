//! Hooks for the scroll-reveal animation.
//!
//! Scroll observation itself lives outside the pipeline. The renderer only hands over freshly
//! rendered subtrees; whatever implements [`Reveal`] decides when candidates become visible.

use std::collections::BTreeSet;

use crate::render::node::Element;

pub const REVEAL_CLASS: &str = "reveal-on-scroll";
pub const VISIBLE_CLASS: &str = "is-visible";
pub const INDEX_ATTR: &str = "data-reveal-index";

pub trait Reveal {
    /// Register every reveal candidate below `root`.
    fn apply(&mut self, root: &mut Element);
}

/// Does nothing; candidates stay in their initial state.
pub struct NoReveal;

impl Reveal for NoReveal {
    fn apply(&mut self, _root: &mut Element) {}
}

/// Reduced-motion behaviour: every candidate is shown immediately.
pub struct Immediate;

impl Reveal for Immediate {
    fn apply(&mut self, root: &mut Element) {
        root.for_each_mut(&mut |e| {
            if e.has_class(REVEAL_CLASS) {
                e.add_class(VISIBLE_CLASS);
            }
        });
    }
}

/// Queues candidates until the host reports them intersecting the viewport. Each candidate is
/// observed once and dropped from the queue after it has been revealed.
#[derive(Debug, Default)]
pub struct Observer {
    pending: BTreeSet<String>,
}

impl Observer {
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    /// Mark the candidate with `index` visible. Returns whether it was being observed.
    pub fn intersect(&mut self, root: &mut Element, index: &str) -> bool {
        if !self.pending.remove(index) {
            return false;
        }
        root.for_each_mut(&mut |e| {
            if e.has_class(REVEAL_CLASS) && e.attr(INDEX_ATTR) == Some(index) {
                e.add_class(VISIBLE_CLASS);
            }
        });
        true
    }
}

impl Reveal for Observer {
    fn apply(&mut self, root: &mut Element) {
        let pending = &mut self.pending;
        root.for_each_mut(&mut |e| {
            if e.has_class(REVEAL_CLASS)
                && !e.has_class(VISIBLE_CLASS)
                && let Some(index) = e.attr(INDEX_ATTR)
            {
                pending.insert(index.to_string());
            }
        });
    }
}
