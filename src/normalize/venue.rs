use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    identifier::{Arxiv, is_arxiv_url},
    normalize::date,
    record::{LinkKind, PublicationRecord},
};

pub const PREPRINT: &str = "Preprint";

/// Separator between the venue label and its two-digit year.
const YEAR_SEPARATOR: &str = " '";

/// Venue patterns and the short label they map to.
///
/// NOTE: Ordering is important here. Workshop and findings tracks are listed before the main
/// conference they belong to, and the generic `Workshop`/`Journal` buckets come last.
static VENUE_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\bfindings\b.*\b(acl|emnlp|naacl|association for computational linguistics)\b", "Findings"),
        (r"\bneurips\b.*\bworkshop\b|\bworkshop\b.*\bneurips\b", "NeurIPS Workshop"),
        (r"\bicml\b.*\bworkshop\b|\bworkshop\b.*\bicml\b", "ICML Workshop"),
        (r"\biclr\b.*\bworkshop\b|\bworkshop\b.*\biclr\b", "ICLR Workshop"),
        (r"\bneurips\b|\bnips\b|neural information processing systems", "NeurIPS"),
        (r"\bicml\b|international conference on machine learning", "ICML"),
        (r"\biclr\b|international conference on learning representations", "ICLR"),
        (r"\bemnlp\b|empirical methods in natural language processing", "EMNLP"),
        (r"\bnaacl\b|north american chapter of the association for computational linguistics", "NAACL"),
        (r"\bacl\b|annual meeting of the association for computational linguistics", "ACL"),
        (r"\bcolm\b|conference on language modeling", "COLM"),
        (r"\baaai\b", "AAAI"),
        (r"\bijcai\b", "IJCAI"),
        (r"\bcvpr\b|computer vision and pattern recognition", "CVPR"),
        (r"\biccv\b|international conference on computer vision", "ICCV"),
        (r"\beccv\b|european conference on computer vision", "ECCV"),
        (r"\baistats\b|artificial intelligence and statistics", "AISTATS"),
        (r"\buai\b|uncertainty in artificial intelligence", "UAI"),
        (r"\bcolt\b|conference on learning theory", "COLT"),
        (r"\bkdd\b|knowledge discovery and data mining", "KDD"),
        (r"\btmlr\b|transactions on machine learning research", "TMLR"),
        (r"\bjmlr\b|journal of machine learning research", "JMLR"),
        (r"\bworkshop\b", "Workshop"),
        (r"\bjournal\b|\btransactions\b", "Journal"),
    ]
    .into_iter()
    .map(|(pat, label)| (Regex::new(&format!("(?i){pat}")).unwrap(), label))
    .collect()
});

static PREPRINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\barxiv\b|\bpreprint\b|\bcorr\b|\bunder review\b").unwrap());
static PAREN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\([^)]*\)").unwrap());

/// Short venue label for a record.
pub fn label(record: &PublicationRecord) -> String {
    let venue = record.venue.as_deref().map(str::trim).unwrap_or("");
    if is_preprint(record, venue) {
        return PREPRINT.to_string();
    }
    if let Some((_, label)) = VENUE_RULES.iter().find(|(re, _)| re.is_match(venue)) {
        return label.to_string();
    }
    cleanup(venue)
}

/// `label 'YY`, the label alone when no year is known, nothing when the label is empty.
pub fn tag(record: &PublicationRecord) -> Option<String> {
    let label = label(record);
    if label.is_empty() {
        return None;
    }
    match date::short_year(record.display_date.as_deref(), record.date.as_deref()) {
        Some(yy) => Some(format!("{label}{YEAR_SEPARATOR}{yy}")),
        None => Some(label),
    }
}

/// Venue text naming arXiv (or a preprint server), or no venue at all with only arXiv links.
fn is_preprint(record: &PublicationRecord, venue: &str) -> bool {
    if PREPRINT_RE.is_match(venue) || Arxiv::find_in(venue).is_some() {
        return true;
    }
    venue.is_empty()
        && (record.link(LinkKind::Arxiv).is_some()
            || record.link(LinkKind::Pdf).is_some_and(is_arxiv_url))
}

fn cleanup(venue: &str) -> String {
    let without_asides = PAREN_RE.replace_all(venue, "");
    without_asides.split_whitespace().collect::<Vec<_>>().join(" ")
}
