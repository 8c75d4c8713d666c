//! Mirrors `data/papers.json` into the host page so it also works without a fetch transport.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Inline data is inserted right after the footer when the page has no block yet.
const INSERTION_POINT: &str = "</footer>\n\n";

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("could not locate footer insertion point in page")]
    NoInsertionPoint,
    #[error("invalid publications data: {0}")]
    Json(#[from] serde_json::Error),
}

static SCRIPT_CLOSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</(script)").unwrap());

/// `<script id="..." type="application/json">` holding `data` pretty-printed, key order kept.
pub fn script_block(id: &str, data: &serde_json::Value) -> Result<String, EmbedError> {
    let payload = serde_json::to_string_pretty(data)?;
    // A literal `</script` inside a string would end the block early.
    let payload = SCRIPT_CLOSE_RE.replace_all(&payload, r"<\/$1");
    Ok(format!(
        "<script id=\"{id}\" type=\"application/json\">\n{payload}\n</script>\n"
    ))
}

/// Replace the existing inline block in `html`, or insert one after the footer.
pub fn embed(html: &str, data_json: &str, id: &str) -> Result<String, EmbedError> {
    let data: serde_json::Value = serde_json::from_str(data_json)?;
    let block = script_block(id, &data)?;

    let existing = Regex::new(&format!(
        r#"(?s)<script id="{}" type="application/json">.*?</script>\n"#,
        regex::escape(id)
    ))
    .map_err(|_| EmbedError::NoInsertionPoint)?;
    if existing.is_match(html) {
        return Ok(existing
            .replace(html, regex::NoExpand(&block))
            .into_owned());
    }

    let Some(pos) = html.find(INSERTION_POINT) else {
        return Err(EmbedError::NoInsertionPoint);
    };
    let split = pos + INSERTION_POINT.len();
    Ok(format!("{}{}{}", &html[..split], block, &html[split..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::inline_script;

    const DATA: &str = r#"{"papers":[{"title":"Z","id":"z"}]}"#;

    #[test]
    fn inserts_after_footer() {
        let html = "<body>\n<footer>f</footer>\n\n<script src=\"a.js\"></script>\n</body>\n";
        let out = embed(html, DATA, "papers-data").expect("embed");
        assert!(out.contains("</footer>\n\n<script id=\"papers-data\" type=\"application/json\">\n{"));
        assert!(out.ends_with("</script>\n<script src=\"a.js\"></script>\n</body>\n"));
    }

    #[test]
    fn replaces_existing_block_once() {
        let html = "<footer></footer>\n\n<script id=\"papers-data\" type=\"application/json\">\n{\"papers\":[]}\n</script>\n";
        let out = embed(html, DATA, "papers-data").expect("embed");
        let again = embed(&out, DATA, "papers-data").expect("embed");
        assert_eq!(out, again);
        assert_eq!(out.matches("papers-data").count(), 1);
    }

    #[test]
    fn preserves_key_order() {
        let out = embed("<footer></footer>\n\n", DATA, "papers-data").expect("embed");
        let title = out.find("\"title\"").expect("title");
        let id = out.find("\"id\"").expect("id");
        assert!(title < id);
    }

    #[test]
    fn embedded_block_is_readable_inline_data() {
        let data = r#"{"papers":[{"title":"a </script> b"}]}"#;
        let out = embed("<footer></footer>\n\n", data, "papers-data").expect("embed");
        let inline = inline_script(&out, "papers-data").expect("inline");
        let parsed = crate::record::Payload::from_json(&inline).expect("parse");
        assert_eq!(parsed.papers[0].title, "a </script> b");
    }

    #[test]
    fn missing_footer_is_an_error() {
        let err = embed("<body></body>", DATA, "papers-data").unwrap_err();
        assert!(matches!(err, EmbedError::NoInsertionPoint));
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            embed("<footer></footer>\n\n", "{", "papers-data").unwrap_err(),
            EmbedError::Json(_)
        ));
    }
}
