//! Obtains the publications payload for a page.
//!
//! Order of attempts: inline data embedded in the page, then the data file next to the page.
//! An inline copy that parses but holds no papers is kept as a last resort for when the network
//! path fails.

use std::{path::PathBuf, time::Duration};

use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::{config::SiteConfig, page::Page, record::Payload};

/// Failure categories, each with a fixed end-user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    Parse,
    Empty,
    Environment,
}

impl FailureKind {
    pub fn message(self) -> &'static str {
        match self {
            FailureKind::Transport | FailureKind::Parse => {
                "Publications are temporarily unavailable. Please try again later."
            }
            FailureKind::Empty => "No publications available yet.",
            FailureKind::Environment => {
                "Publications cannot be loaded when this page is opened directly from disk. \
                 Serve the site over HTTP (for example with `python3 -m http.server`) to view them."
            }
        }
    }
}

#[derive(Error, Debug)]
#[error("{0}")]
pub struct TransportError(pub String);

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot fetch {url}: pages opened via {scheme}:// have no fetch transport")]
    Unsupported { url: Url, scheme: String },
    #[error("invalid data path {path}: {source}")]
    DataPath {
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request for {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: TransportError,
    },
    #[error("server answered {status} for {url}")]
    Status { url: Url, status: u16 },
    #[error("malformed publications data from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LoadError::Unsupported { .. } => FailureKind::Environment,
            LoadError::DataPath { .. } | LoadError::Transport { .. } | LoadError::Status { .. } => {
                FailureKind::Transport
            }
            LoadError::Parse { .. } => FailureKind::Parse,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The one network operation the pipeline performs.
pub trait Transport {
    /// Whether `url` can be fetched at all from this environment.
    fn supports(&self, url: &Url) -> bool {
        matches!(url.scheme(), "http" | "https")
    }

    fn get(&self, url: &Url) -> Result<Response, TransportError>;
}

/// HTTP(S) via `ureq`, with caching disabled.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let cfg = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build();
        HttpTransport {
            agent: ureq::Agent::new_with_config(cfg),
        }
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<Response, TransportError> {
        let res = self
            .agent
            .get(url.as_str())
            .header("Cache-Control", "no-cache, no-store")
            .header("Pragma", "no-cache")
            .header("Accept", "application/json")
            .call()
            .map_err(|e| TransportError(e.to_string()))?;
        let status = res.status().as_u16();
        let body = res
            .into_body()
            .read_to_string()
            .map_err(|e| TransportError(format!("failed to read response body: {e}")))?;
        Ok(Response { status, body })
    }
}

/// Serves every request from one local file, for previewing data without a server.
pub struct FileTransport {
    path: PathBuf,
}

impl FileTransport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileTransport { path: path.into() }
    }
}

impl Transport for FileTransport {
    fn supports(&self, _url: &Url) -> bool {
        true
    }

    fn get(&self, _url: &Url) -> Result<Response, TransportError> {
        let body = std::fs::read_to_string(&self.path)
            .map_err(|e| TransportError(format!("{}: {e}", self.path.display())))?;
        Ok(Response { status: 200, body })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Inline,
    Network(Url),
}

#[derive(Debug)]
pub struct Loaded {
    pub payload: Payload,
    pub origin: Origin,
}

pub fn load(page: &Page, cfg: &SiteConfig, transport: &dyn Transport) -> Result<Loaded, LoadError> {
    let mut last_resort = None;
    if let Some(raw) = page.inline_data.as_deref() {
        match Payload::from_json(raw) {
            Ok(payload) if !payload.papers.is_empty() => {
                debug!(papers = payload.papers.len(), "using inline publications data");
                return Ok(Loaded {
                    payload,
                    origin: Origin::Inline,
                });
            }
            Ok(payload) => last_resort = Some(payload),
            Err(e) => warn!("inline publications data is malformed, fetching instead: {e}"),
        }
    }

    match fetch(page, cfg, transport) {
        Ok(loaded) => Ok(loaded),
        Err(err) => match last_resort {
            Some(payload) => {
                warn!("{err}; falling back to inline publications data");
                Ok(Loaded {
                    payload,
                    origin: Origin::Inline,
                })
            }
            None => Err(err),
        },
    }
}

fn fetch(page: &Page, cfg: &SiteConfig, transport: &dyn Transport) -> Result<Loaded, LoadError> {
    let url = page
        .data_url(&cfg.data_path)
        .map_err(|source| LoadError::DataPath {
            path: cfg.data_path.clone(),
            source,
        })?;
    if !transport.supports(&url) {
        return Err(LoadError::Unsupported {
            scheme: page.location.scheme().to_string(),
            url,
        });
    }
    debug!(%url, "fetching publications data");
    let res = transport
        .get(&url)
        .map_err(|source| LoadError::Transport {
            url: url.clone(),
            source,
        })?;
    if !res.is_success() {
        return Err(LoadError::Status {
            url,
            status: res.status,
        });
    }
    let payload = Payload::from_json(&res.body).map_err(|source| LoadError::Parse {
        origin: url.to_string(),
        source,
    })?;
    Ok(Loaded {
        payload,
        origin: Origin::Network(url),
    })
}
