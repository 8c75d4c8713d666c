use std::{fs, path::PathBuf, str::FromStr};

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// TOML file overriding the built-in site configuration
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Log pipeline diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the publications of a page and print the resulting markup
    Render {
        #[arg(value_name = "PAGE")]
        page: Source,
        /// Read publication data from this file instead of fetching it
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,
        /// Apply a tag filter after rendering
        #[arg(long)]
        tag: Option<String>,
        /// Which anchor to print
        #[arg(long, value_enum, default_value_t = Target::Library)]
        target: Target,
    },
    /// List the filter options a page would offer
    Tags {
        #[arg(value_name = "PAGE")]
        page: Source,
        #[arg(long, value_name = "FILE")]
        data: Option<PathBuf>,
    },
    /// Copy the publication data into the page as an inline script block
    Embed {
        #[arg(long, value_name = "FILE", default_value = "data/papers.json")]
        data: PathBuf,
        #[arg(long, value_name = "FILE", default_value = "works.html")]
        page: PathBuf,
    },
    /// Generate SVG thumbnails for every publication
    Thumbnails {
        #[arg(long, value_name = "FILE", default_value = "data/papers.json")]
        data: PathBuf,
        #[arg(long, value_name = "DIR", default_value = "Images/papers")]
        out: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Target {
    Library,
    Featured,
    Filters,
    All,
}

#[derive(Clone, Debug)]
/// Where the page comes from, which can either be
///
/// - a URL the page is served at, or
/// - an HTML file on disk.
///
/// A page on disk can only use its inline data; there is no transport to fetch anything else.
pub enum Source {
    Url(url::Url),
    File(PathBuf),
}

impl FromStr for Source {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Is this a path?
        if let Ok(path) = fs::canonicalize(s) {
            return Ok(Source::File(path));
        }
        // No? Must be a URL then!
        match url::Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(Source::Url(url)),
            Ok(url) if url.scheme() == "file" => url
                .to_file_path()
                .map(Source::File)
                .map_err(|_| format!("not a local file URL: {s}")),
            _ => Err(format!("neither an existing file nor an http(s) URL: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn from_str_identifies_existing_file() {
        let tmp = NamedTempFile::new().expect("tmp file");
        let path = tmp.path().to_path_buf();
        let src = Source::from_str(path.to_str().unwrap()).expect("parse");
        match src {
            Source::File(p) => {
                let can = std::fs::canonicalize(&path).unwrap();
                assert_eq!(p, can);
            }
            _ => panic!("expected file source"),
        }
    }

    #[test]
    fn from_str_accepts_http_urls() {
        match Source::from_str("https://example.org/works.html").expect("parse") {
            Source::Url(u) => assert_eq!(u.host_str(), Some("example.org")),
            _ => panic!("expected url source"),
        }
    }

    #[test]
    fn from_str_rejects_everything_else() {
        proptest::proptest!(|(s in "[A-Za-z0-9._-]{1,32}")| {
            let path = PathBuf::from(&s);
            proptest::prop_assume!(!path.exists());
            proptest::prop_assert!(Source::from_str(&s).is_err());
        })
    }
}
