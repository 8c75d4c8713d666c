//! Generated 16:9 SVG artwork for papers that have no thumbnail of their own.
//!
//! Palettes are picked from a hash of the paper id, so the same paper always gets the same
//! colours between runs.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use quick_xml::escape::escape;
use sha1::{Digest, Sha1};

use crate::record::PublicationRecord;

const PALETTES: &[(&str, &str)] = &[
    ("#5D7BFF", "#1C2340"),
    ("#58F7FF", "#123A6A"),
    ("#FF8EF6", "#391740"),
    ("#9AF87A", "#123C2A"),
    ("#FFC46B", "#42250C"),
];

const TITLE_WRAP_WIDTH: usize = 26;
const MAX_TITLE_LINES: usize = 3;

pub struct Thumbnail {
    pub file_name: String,
    pub svg: String,
}

/// Lowercase, alphanumeric-only words joined by `-`.
pub fn slugify(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Colour pair keyed on the first byte of the SHA-1 digest, matching previously generated art.
pub fn palette(identifier: &str) -> (&'static str, &'static str) {
    let digest = Sha1::digest(identifier.as_bytes());
    PALETTES[digest[0] as usize % PALETTES.len()]
}

/// Greedy word wrap; words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Uppercase every letter that follows a non-letter, lowercase the rest (`offline-rl` becomes
/// `Offline-Rl`).
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut after_letter = false;
    for c in s.chars() {
        if after_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        after_letter = c.is_alphabetic();
    }
    out
}

pub fn subtitle(record: &PublicationRecord) -> String {
    let tags: Vec<String> = record.tags.iter().take(2).map(|t| title_case(t)).collect();
    if !tags.is_empty() {
        return tags.join(", ");
    }
    record
        .venue
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("Research")
        .to_string()
}

pub fn build_svg(title: &str, subtitle: &str, primary: &str, secondary: &str) -> String {
    let mut lines = wrap(title, TITLE_WRAP_WIDTH);
    lines.truncate(MAX_TITLE_LINES);
    if lines.is_empty() {
        lines.push(title.to_string());
    }
    let start_y = 120;
    let text_elements = lines
        .iter()
        .enumerate()
        .map(|(offset, line)| {
            format!(
                r##"<text x="64" y="{y}" font-size="32" font-family="Raleway, Helvetica, Arial, sans-serif" font-weight="600" fill="#ffffff">{line}</text>"##,
                y = start_y + offset * 42,
                line = escape(line.as_str()),
            )
        })
        .collect::<Vec<_>>()
        .join("\n  ");
    let subtitle_y = start_y + lines.len() * 42 + 24;

    format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="1280" height="720" viewBox="0 0 1280 720" preserveAspectRatio="xMidYMid slice">
  <defs>
    <linearGradient id="gradient" x1="0%" y1="0%" x2="100%" y2="100%">
      <stop offset="0%" stop-color="{primary}" />
      <stop offset="100%" stop-color="{secondary}" />
    </linearGradient>
  </defs>
  <rect width="1280" height="720" fill="url(#gradient)" rx="32" />
  <rect x="32" y="32" width="1216" height="656" fill="rgba(0,0,0,0.18)" rx="28" />
  {text_elements}
  <text x="64" y="{subtitle_y}" font-size="20" font-family="Inter, Helvetica, Arial, sans-serif" fill="rgba(255,255,255,0.78)">{subtitle}</text>
</svg>
"##,
        subtitle = escape(subtitle),
    )
}

/// The id, or a slug of the title when there is none.
fn identifier(record: &PublicationRecord) -> String {
    match record.dedup_key() {
        Some(id) => id.to_string(),
        None => slugify(if record.title.trim().is_empty() {
            "paper"
        } else {
            record.title.as_str()
        }),
    }
}

/// File name of the generated thumbnail for `record`.
pub fn file_name(record: &PublicationRecord) -> String {
    format!("{}.svg", identifier(record))
}

pub fn thumbnail_for(record: &PublicationRecord) -> Thumbnail {
    let identifier = identifier(record);
    let title = if record.title.trim().is_empty() {
        "Untitled Work"
    } else {
        record.title.as_str()
    };
    let (primary, secondary) = palette(&identifier);
    Thumbnail {
        svg: build_svg(title, &subtitle(record), primary, secondary),
        file_name: file_name(record),
    }
}

/// Write one SVG per record into `out_dir`, returning the written paths.
pub fn write_all(records: &[PublicationRecord], out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let mut written = Vec::with_capacity(records.len());
    for record in records {
        let thumb = thumbnail_for(record);
        let path = out_dir.join(&thumb.file_name);
        fs::write(&path, thumb.svg)
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
