use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// An arXiv identifier or URL, normalised to its canonical ID and optional version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arxiv<'a> {
    /// Canonical arXiv ID without version (e.g., "1810.04805" or "astro-ph/0603274").
    canonical_id: &'a str,
    /// Optional explicit version number when present in the input (e.g., Some("2")).
    version: Option<&'a str>,
    /// Whether the ID is legacy-style (contains a slash) or new-style.
    legacy: bool,
}

static NEWSTYLE_RE: Lazy<Regex> = Lazy::new(|| {
    // new-style: YYMM.NNNN(N)(vN)?
    Regex::new(r"^(?P<core>\d{4}\.[0-9]{4,5})(?:v(?P<v>\d+))?$").unwrap()
});
static LEGACY_RE: Lazy<Regex> = Lazy::new(|| {
    // legacy: archive(/subject)?/NNNNNNN with optional vN, allow dots in archive (e.g., math.GT)
    Regex::new(r"^(?P<core>[A-Za-z-]+(?:\.[A-Za-z-]+)?/[0-9]{7})(?:v(?P<v>\d+))?$").unwrap()
});
static IN_TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:arxiv\s*[:/]\s*|arxiv\.org/(?:abs|pdf)/|\b)(?P<id>\d{4}\.\d{4,5}(?:v\d+)?)\b")
        .unwrap()
});

impl<'a> Arxiv<'a> {
    /// Parse a whole string as an arXiv identifier: a bare ID, an `arXiv:` prefixed ID, or an
    /// abs/pdf URL on one of the arXiv hosts.
    pub fn parse(identifier: &'a str) -> Option<Self> {
        let mut s = identifier.trim();

        // Strip URL wrappers and handle prefixes.
        if let Some(rest) = s
            .strip_prefix("arXiv:")
            .or_else(|| s.strip_prefix("arxiv:"))
            .or_else(|| s.strip_prefix("ARXIV:"))
        {
            s = rest.trim_start();
        }

        // Examples:
        //  - https://arxiv.org/abs/1810.04805v2
        //  - https://arxiv.org/pdf/1810.04805v2.pdf
        //  - https://xxx.lanl.gov/abs/astro-ph/0603274v1
        //  - arxiv.org/abs/1810.04805 (no scheme)
        let without_scheme = s.strip_prefix("http://").or_else(|| s.strip_prefix("https://"));
        let has_scheme = without_scheme.is_some();
        if let Some((host, path)) = without_scheme.unwrap_or(s).split_once('/')
            && (has_scheme || is_arxiv_host(host))
        {
            if !is_arxiv_host(host) {
                return None;
            }
            let mut comps = path.split('?').next().unwrap_or(path);
            if let Some((base, _frag)) = comps.split_once('#') {
                comps = base;
            }
            if let Some(rest) = comps.strip_prefix("abs/") {
                s = rest;
            } else if let Some(p) = comps.strip_prefix("pdf/") {
                s = p.strip_suffix(".pdf").unwrap_or(p);
            } else {
                // Listing and search pages do not name a single paper.
                return None;
            }
        }

        let s = s.trim_matches('/');

        if let Some(c) = NEWSTYLE_RE.captures(s) {
            return Some(Arxiv {
                canonical_id: c.name("core")?.as_str(),
                version: c.name("v").map(|m| m.as_str()),
                legacy: false,
            });
        }
        if let Some(c) = LEGACY_RE.captures(s) {
            return Some(Arxiv {
                canonical_id: c.name("core")?.as_str(),
                version: c.name("v").map(|m| m.as_str()),
                legacy: true,
            });
        }

        None
    }

    /// Find the first new-style arXiv ID mentioned anywhere in free text, e.g. a venue string
    /// such as `"arXiv preprint arXiv:2301.00001"`.
    pub fn find_in(text: &'a str) -> Option<Self> {
        let m = IN_TEXT_RE.captures(text)?.name("id")?;
        Self::parse(m.as_str())
    }

    pub fn canonical_id(&self) -> &'a str {
        self.canonical_id
    }

    pub fn version(&self) -> Option<&'a str> {
        self.version
    }

    pub fn is_legacy(&self) -> bool {
        self.legacy
    }

    /// The abstract page, keeping an explicit version when one was given.
    pub fn abs_url(&self) -> Option<Url> {
        let versioned = match self.version {
            Some(v) => format!("{}v{}", self.canonical_id, v),
            None => self.canonical_id.to_string(),
        };
        Url::parse(&format!("https://arxiv.org/abs/{versioned}")).ok()
    }
}

pub fn is_arxiv_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host == "arxiv.org" || host.ends_with(".arxiv.org") || host.ends_with("xxx.lanl.gov")
}

/// `candidate` as an http(s) URL on an arXiv host. A link written without a scheme, such as
/// `arxiv.org/pdf/2301.00001`, is read as https.
pub fn arxiv_location(candidate: &str) -> Option<Url> {
    let candidate = candidate.trim();
    let url = match Url::parse(candidate) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let host = candidate.split(['/', '?', '#']).next().unwrap_or(candidate);
            if !is_arxiv_host(host) {
                return None;
            }
            Url::parse(&format!("https://{candidate}")).ok()?
        }
        Err(_) => return None,
    };
    let on_arxiv = matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(is_arxiv_host);
    on_arxiv.then_some(url)
}

/// Whether `candidate` points at an arXiv host.
pub fn is_arxiv_url(candidate: &str) -> bool {
    arxiv_location(candidate).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_and_prefixed_ids() {
        let a = Arxiv::parse("2301.00001").expect("bare");
        assert_eq!(a.canonical_id(), "2301.00001");
        assert_eq!(a.version(), None);

        let b = Arxiv::parse("arXiv: 2301.00001v3").expect("prefixed");
        assert_eq!(b.canonical_id(), "2301.00001");
        assert_eq!(b.version(), Some("3"));
        assert!(!b.is_legacy());
    }

    #[test]
    fn parses_abs_and_pdf_urls() {
        let a = Arxiv::parse("https://arxiv.org/abs/1810.04805v2").expect("abs");
        assert_eq!(a.canonical_id(), "1810.04805");
        let b = Arxiv::parse("https://arxiv.org/pdf/1810.04805.pdf#page=2").expect("pdf");
        assert_eq!(b.canonical_id(), "1810.04805");
        let c = Arxiv::parse("https://xxx.lanl.gov/abs/astro-ph/0603274v1").expect("legacy");
        assert_eq!(c.canonical_id(), "astro-ph/0603274");
        assert!(c.is_legacy());
    }

    #[test]
    fn rejects_foreign_hosts_and_listing_pages() {
        assert!(Arxiv::parse("https://example.org/abs/2301.00001").is_none());
        assert!(Arxiv::parse("https://arxiv.org/list/cs.LG/recent").is_none());
        assert!(Arxiv::parse("not an id").is_none());
    }

    #[test]
    fn abs_url_is_canonical() {
        let a = Arxiv::parse("arxiv:2301.00001").expect("parse");
        assert_eq!(
            a.abs_url().expect("url").as_str(),
            "https://arxiv.org/abs/2301.00001"
        );
        let v = Arxiv::parse("2301.00001v2").expect("parse");
        assert_eq!(
            v.abs_url().expect("url").as_str(),
            "https://arxiv.org/abs/2301.00001v2"
        );
    }

    #[test]
    fn finds_ids_inside_venue_text() {
        let a = Arxiv::find_in("arXiv preprint arXiv:2405.12345").expect("find");
        assert_eq!(a.canonical_id(), "2405.12345");
        let b = Arxiv::find_in("Preprint, 2024 (2405.12345v1)").expect("find");
        assert_eq!(b.version(), Some("1"));
        assert!(Arxiv::find_in("ICML 2024").is_none());
    }

    #[test]
    fn arxiv_url_detection() {
        assert!(is_arxiv_url("https://arxiv.org/pdf/2301.00001"));
        assert!(is_arxiv_url("http://export.arxiv.org/abs/2301.00001"));
        assert!(!is_arxiv_url("https://openreview.net/pdf?id=abc"));
        assert!(is_arxiv_url("arxiv.org/pdf/2301.00001"));
        assert!(is_arxiv_url("www.arxiv.org/abs/2301.00001"));
        assert!(!is_arxiv_url("notarxiv.org/pdf/2301.00001"));
        assert!(!is_arxiv_url("ftp://arxiv.org/pdf/2301.00001"));
    }

    #[test]
    fn parses_scheme_less_urls() {
        let a = Arxiv::parse("arxiv.org/abs/2301.00001v2").expect("abs");
        assert_eq!(a.canonical_id(), "2301.00001");
        assert_eq!(a.version(), Some("2"));
        let b = Arxiv::parse("export.arxiv.org/pdf/2301.00001.pdf").expect("pdf");
        assert_eq!(b.canonical_id(), "2301.00001");
        // A legacy id is not mistaken for a host.
        let c = Arxiv::parse("astro-ph/0603274").expect("legacy");
        assert!(c.is_legacy());
        assert!(Arxiv::parse("example.org/abs/2301.00001").is_none());
    }

    #[test]
    fn bare_ids_roundtrip_through_abs_url() {
        proptest::proptest!(|(yymm in 1000u32..9999, num in 10000u32..99999)| {
            let raw = format!("{yymm}.{num}");
            let a = Arxiv::parse(&raw).expect("parse");
            proptest::prop_assert_eq!(
                a.abs_url().expect("url").to_string(),
                format!("https://arxiv.org/abs/{raw}")
            );
        })
    }
}
