use std::{fs, io::IsTerminal, time::Duration};

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Stream};
use tracing_subscriber::EnvFilter;

use papers::{
    Outcome, Page, SiteConfig, Status, Transport, embed,
    loader::{FileTransport, HttpTransport},
    record::Payload,
    render::{
        Element,
        html::{nodes_to_html, to_html},
        reveal::Immediate,
    },
    thumbnail,
};

use crate::cli::{Cli, Command, Source, Target};

mod cli;

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);

    let cfg = match &args.config {
        Some(path) => SiteConfig::load(path)?,
        None => SiteConfig::default(),
    };

    match args.command {
        Command::Render {
            page,
            data,
            tag,
            target,
        } => {
            let mut page = open_page(&page, &cfg)?;
            let transport = transport_for(data, &cfg);
            let mut outcome = run_with_spinner(&mut page, &cfg, transport.as_ref());
            if let (Some(tag), Some(filter)) = (tag, outcome.filter.as_mut()) {
                filter.select(&mut page, &tag);
            }
            println!("{}", render_target(&page, target)?);
            summary(&outcome);
        }
        Command::Tags { page, data } => {
            let mut page = open_page(&page, &cfg)?;
            let transport = transport_for(data, &cfg);
            let outcome = run_with_spinner(&mut page, &cfg, transport.as_ref());
            if let Some(filter) = &outcome.filter {
                for (tag, label) in filter.options() {
                    if tag == label {
                        println!("{tag}");
                    } else {
                        println!("{tag}\t{label}");
                    }
                }
            }
            summary(&outcome);
        }
        Command::Embed { data, page } => {
            let json = fs::read_to_string(&data)
                .with_context(|| format!("failed to read {}", data.display()))?;
            let html = fs::read_to_string(&page)
                .with_context(|| format!("failed to read {}", page.display()))?;
            let updated = embed::embed(&html, &json, &cfg.inline_data_id)
                .with_context(|| format!("failed to embed data into {}", page.display()))?;
            fs::write(&page, updated)
                .with_context(|| format!("failed to write {}", page.display()))?;
            eprintln!(
                "{} embedded {} into {}",
                "✓".if_supports_color(Stream::Stderr, |t| t.green()),
                data.display(),
                page.display()
            );
        }
        Command::Thumbnails { data, out } => {
            let json = fs::read_to_string(&data)
                .with_context(|| format!("missing papers metadata: {}", data.display()))?;
            let payload = Payload::from_json(&json)
                .with_context(|| format!("malformed papers metadata: {}", data.display()))?;
            for path in thumbnail::write_all(&payload.papers, &out)? {
                println!("generated {}", path.display());
            }
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "papers=debug" } else { "papers=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_page(source: &Source, cfg: &SiteConfig) -> anyhow::Result<Page> {
    match source {
        Source::Url(url) => Ok(Page::standard(url.clone())),
        Source::File(path) => {
            let html = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let location = url::Url::from_file_path(path)
                .map_err(|_| anyhow::anyhow!("not an absolute path: {}", path.display()))?;
            Ok(Page::from_html(location, &html, &cfg.inline_data_id))
        }
    }
}

fn transport_for(data: Option<std::path::PathBuf>, cfg: &SiteConfig) -> Box<dyn Transport> {
    match data {
        Some(path) => Box::new(FileTransport::new(path)),
        None => Box::new(HttpTransport::new(
            cfg.fetch_timeout_secs.map(Duration::from_secs),
        )),
    }
}

fn run_with_spinner(page: &mut Page, cfg: &SiteConfig, transport: &dyn Transport) -> Outcome {
    let spinner = std::io::stderr().is_terminal().then(|| {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("loading publications");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });
    // Static output has no scroll position, so everything is revealed up front.
    let outcome = papers::run(page, cfg, transport, &mut Immediate);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    outcome
}

fn render_target(page: &Page, target: Target) -> anyhow::Result<String> {
    let pick = |el: &Option<Element>| -> anyhow::Result<String> {
        match el {
            Some(el) => Ok(to_html(el)?),
            None => Ok(String::new()),
        }
    };
    Ok(match target {
        Target::Library => pick(&page.library)?,
        Target::Featured => pick(&page.featured)?,
        Target::Filters => pick(&page.filters)?,
        Target::All => {
            let nodes: Vec<papers::render::Node> = [
                &page.filters,
                &page.featured,
                &page.library,
                &page.empty_state,
            ]
            .into_iter()
            .flatten()
            .cloned()
            .map(papers::render::Node::Element)
            .collect();
            nodes_to_html(&nodes)?
        }
    })
}

fn summary(outcome: &Outcome) {
    match &outcome.status {
        Status::Rendered { items, .. } => eprintln!(
            "{} {}  {} {}",
            "✓".if_supports_color(Stream::Stderr, |t| t.green()),
            items,
            "✗".if_supports_color(Stream::Stderr, |t| t.red()),
            outcome.excluded
        ),
        Status::Failed(kind) => eprintln!(
            "{} {}",
            "✗".if_supports_color(Stream::Stderr, |t| t.red()),
            kind.message()
        ),
    }
}
