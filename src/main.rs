//! Contact Scout CLI
//!
//! Scans pages for contacts, counts badge emails, lists deep links, crawls
//! URL lists, and serves the page protocol over stdio.

use anyhow::Context;
use clap::{Parser, Subcommand};
use contact_scout::crawler::{parse_queue_file, CrawlQueue, CrawlRunner, HttpPageSource, PageSource};
use contact_scout::dom::Document;
use contact_scout::export;
use contact_scout::extraction::badge::badge_count;
use contact_scout::extraction::links::{normalize_page_url, LinkExtractor};
use contact_scout::extraction::{extract_report, Blacklist};
use contact_scout::protocol::PageAgent;
use contact_scout::ScanConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Contact Scout
#[derive(Parser, Debug)]
#[command(name = "contact-scout")]
#[command(version)]
#[command(about = "Find emails and phone numbers in web pages")]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON config file (defaults to $CONTACT_SCOUT_CONFIG)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hide emails of this domain (repeatable)
    #[arg(short, long = "blacklist", global = true)]
    blacklist: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the contact report of a page
    Scan {
        /// HTML file or http(s) URL
        input: String,
        /// Page URL when scanning a file
        #[arg(long)]
        url: Option<String>,
        /// Print clipboard text instead of JSON
        #[arg(long, conflicts_with = "csv")]
        copy: bool,
        /// Print CSV instead of JSON
        #[arg(long)]
        csv: bool,
        /// Group emails by domain in the JSON output
        #[arg(long)]
        grouped: bool,
    },
    /// Count the distinct emails a badge would show
    Badge {
        /// HTML file or http(s) URL
        input: String,
    },
    /// List same-site contact/about/career links of a page
    Links {
        /// HTML file or http(s) URL
        input: String,
        /// Page URL links resolve against (required for files)
        #[arg(long)]
        base: Option<String>,
    },
    /// Crawl a list of URLs
    Crawl {
        /// File with one URL per line
        queue: PathBuf,
        /// CSV output file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
        /// Do not follow deep links
        #[arg(long)]
        no_deep_links: bool,
        /// Print clipboard text to stdout
        #[arg(long)]
        copy: bool,
    },
    /// Serve the page protocol over stdio
    Serve {
        /// HTML file of the page
        #[arg(long)]
        html: PathBuf,
        /// URL of the page
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => ScanConfig::load(path)?,
        None => ScanConfig::from_env()?,
    };
    config
        .blacklist
        .extend(args.blacklist.iter().map(|d| d.trim().to_lowercase()));

    tracing::debug!("Contact Scout v{}", contact_scout::VERSION);

    match args.command {
        Command::Scan {
            input,
            url,
            copy,
            csv,
            grouped,
        } => scan(&config, &input, url.as_deref(), copy, csv, grouped).await,
        Command::Badge { input } => {
            let (document, _) = load_page(&config, &input, None).await?;
            let blacklist: Blacklist = config.blacklist.iter().collect();
            println!("{}", badge_count(&document, &blacklist));
            Ok(())
        }
        Command::Links { input, base } => {
            let (document, page_url) = load_page(&config, &input, base.as_deref()).await?;
            let page_url = page_url.context("--base is required when reading a file")?;
            for link in LinkExtractor::deep_links(&document, &page_url)? {
                println!("{}", link);
            }
            Ok(())
        }
        Command::Crawl {
            queue,
            output,
            max_pages,
            no_deep_links,
            copy,
        } => {
            if let Some(max) = max_pages {
                config.crawl.max_pages = max;
            }
            if no_deep_links {
                config.crawl.follow_deep_links = false;
            }
            crawl(config, &queue, output.as_deref(), copy).await
        }
        Command::Serve { html, url } => {
            let markup = std::fs::read_to_string(&html)
                .with_context(|| format!("reading {}", html.display()))?;
            let page_url = url.as_deref().map(normalize_page_url).transpose()?;
            let agent = PageAgent::new(Document::parse(&markup), page_url, config);
            agent.run().await?;
            Ok(())
        }
    }
}

async fn scan(
    config: &ScanConfig,
    input: &str,
    url: Option<&str>,
    copy: bool,
    csv: bool,
    grouped: bool,
) -> anyhow::Result<()> {
    let (document, _) = load_page(config, input, url).await?;
    let blacklist: Blacklist = config.blacklist.iter().collect();
    let report = extract_report(&document, config)
        .await
        .without_blacklisted(&blacklist);

    if copy {
        println!("{}", export::copy_all(&report));
    } else if csv {
        print!("{}", export::verified_csv_string(&report, &HashMap::new())?);
    } else if grouped || config.grouping_enabled {
        let value = serde_json::json!({
            "domains": export::group_by_domain(&report.groups),
            "loosePhones": report.loose_phones,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

async fn crawl(config: ScanConfig, queue_file: &Path, output: Option<&Path>, copy: bool) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(queue_file)
        .with_context(|| format!("reading {}", queue_file.display()))?;
    let queue = CrawlQueue::from_entries(parse_queue_file(&contents))?;
    let source = HttpPageSource::new(&config.crawl)?;
    let summary = CrawlRunner::new(source, config).run(queue).await;

    if let Some(path) = output {
        let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
        export::write_crawl_csv(&summary.results, file)?;
        tracing::info!("Wrote {} pages to {}", summary.results.len(), path.display());
    }
    if copy {
        print!("{}", export::copy_crawl_results(&summary.results));
    } else if output.is_none() {
        print!("{}", export::crawl_csv_string(&summary.results)?);
    }
    Ok(())
}

/// Read a page from a file or over HTTP; returns the page URL when known
async fn load_page(
    config: &ScanConfig,
    input: &str,
    url: Option<&str>,
) -> anyhow::Result<(Document, Option<Url>)> {
    if input.starts_with("http://") || input.starts_with("https://") {
        let source = HttpPageSource::new(&config.crawl)?;
        let page = source.fetch(&normalize_page_url(input)?).await?;
        return Ok((Document::parse(&page.html), Some(page.url)));
    }

    let markup =
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input))?;
    let page_url = url.map(normalize_page_url).transpose()?;
    Ok((Document::parse(&markup), page_url))
}
