use url::Url;

use crate::{
    identifier::{Arxiv, arxiv_location},
    record::{LinkKind, PublicationRecord},
};

type LinkRule = fn(&PublicationRecord) -> Option<Url>;

/// Rules for choosing the primary link of a publication.
///
/// NOTE: Ordering is important here, as it signifies priority. The first rule that yields a URL
/// wins, and a record for which every rule declines is not rendered at all.
static RULES: &[LinkRule] = &[explicit_arxiv, arxiv_from_venue, arxiv_pdf, scholar];

/// Pick the single outbound URL representing `record`.
pub fn primary_link(record: &PublicationRecord) -> Option<Url> {
    RULES.iter().find_map(|rule| rule(record))
}

/// `links.arxiv`, given either as an identifier or as an arXiv URL.
fn explicit_arxiv(record: &PublicationRecord) -> Option<Url> {
    let raw = record.link(LinkKind::Arxiv)?;
    match Arxiv::parse(raw) {
        Some(id) => id.abs_url(),
        // Not an ID we understand, but still a usable arXiv location.
        None => arxiv_location(raw),
    }
}

fn arxiv_from_venue(record: &PublicationRecord) -> Option<Url> {
    Arxiv::find_in(record.venue.as_deref()?)?.abs_url()
}

/// A PDF hosted on arXiv, preferring the abstract page when the ID can be recovered.
fn arxiv_pdf(record: &PublicationRecord) -> Option<Url> {
    let raw = record.link(LinkKind::Pdf)?;
    let location = arxiv_location(raw)?;
    Arxiv::parse(raw).and_then(|id| id.abs_url()).or(Some(location))
}

fn scholar(record: &PublicationRecord) -> Option<Url> {
    let url = Url::parse(record.link(LinkKind::Scholar)?).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}
