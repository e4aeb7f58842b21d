use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phenoq_core::{
    extract_term_ids, load_config, ClientConfig, DispatchMode, HpoClient, PageRequest,
};

const USAGE: &str = "\
Usage: phenoq <command> [args] [--immediate]

Commands:
  term <ontology-id>                       Term details
  descendants <ontology-id>                All descendants of a term
  intersect <id,id,...>                    Diseases shared by every given term
  genes <ontology-id> [max [page]]         Genes associated with a term
  diseases <ontology-id> [max [page]]      Diseases associated with a term
  disease <omim-id>                        Disease details
  gene <entrez-id>                         Gene details
  search <terms|genes|diseases> <query> [max [page]]
  term-list <file>                         Extract term ids from an annotation file

Options:
  --immediate    Bypass the dispatch queue for this call

Configuration is read from $PHENOQ_CONFIG, falling back to ./phenoq.toml
when present, then to built-in defaults. PHENOQ_* environment variables
override file values.";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mode = if take_flag(&mut args, "--immediate") {
        DispatchMode::Immediate
    } else {
        DispatchMode::Queued
    };

    if args.is_empty() {
        bail!("missing command\n\n{USAGE}");
    }
    let command = args.remove(0);

    // term-list is local file processing; no client, no network.
    if command == "term-list" {
        let path = arg(&args, 0, "term-list needs an annotation file path")?;
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {path}"))?;
        print_json(&extract_term_ids(&content))?;
        return Ok(());
    }

    let config = load_client_config()?;
    config
        .validate()
        .context("Configuration validation failed")?;

    let client = HpoClient::new(config).context("Failed to build HTTP client")?;
    client.start();
    let result = execute(&client, &command, &args, mode).await;
    client.stop();
    result
}

/// Determine config path and load it; missing files fall back to defaults.
fn load_client_config() -> Result<ClientConfig> {
    let path = match std::env::var("PHENOQ_CONFIG") {
        Ok(path) => PathBuf::from(path),
        Err(_) => {
            let fallback = PathBuf::from("phenoq.toml");
            if !fallback.exists() {
                return Ok(ClientConfig::default());
            }
            fallback
        }
    };

    info!("Loading configuration from {:?}", path);
    load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
}

async fn execute(
    client: &HpoClient,
    command: &str,
    args: &[String],
    mode: DispatchMode,
) -> Result<()> {
    match command {
        "term" => {
            let id = arg(args, 0, "term needs an ontology id")?;
            print_json(&client.term_details(id, mode).await?)
        }
        "descendants" => {
            let id = arg(args, 0, "descendants needs an ontology id")?;
            print_json(&client.term_descendants(id, mode).await?)
        }
        "intersect" => {
            let ids: Vec<String> = arg(args, 0, "intersect needs a comma-separated id list")?
                .split(',')
                .map(str::to_string)
                .collect();
            print_json(&client.intersecting_disease_associations(&ids, mode).await?)
        }
        "genes" => {
            let id = arg(args, 0, "genes needs an ontology id")?;
            let page = page_request(args, 1)?;
            print_json(&client.gene_associations(id, page, mode).await?)
        }
        "diseases" => {
            let id = arg(args, 0, "diseases needs an ontology id")?;
            let page = page_request(args, 1)?;
            print_json(&client.disease_associations(id, page, mode).await?)
        }
        "disease" => {
            let id = arg(args, 0, "disease needs an OMIM id")?;
            print_json(&client.disease(id, mode).await?)
        }
        "gene" => {
            let id = arg(args, 0, "gene needs an Entrez gene id")?;
            print_json(&client.gene(id, mode).await?)
        }
        "search" => {
            let category = arg(args, 0, "search needs a category: terms, genes or diseases")?;
            let query = arg(args, 1, "search needs a query")?;
            let page = page_request(args, 2)?;
            match category {
                "terms" => print_json(&client.search_terms(query, page, mode).await?),
                "genes" => print_json(&client.search_genes(query, page, mode).await?),
                "diseases" => print_json(&client.search_diseases(query, page, mode).await?),
                other => bail!("unknown search category {other:?}\n\n{USAGE}"),
            }
        }
        other => bail!("unknown command {other:?}\n\n{USAGE}"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    match args.iter().position(|a| a == flag) {
        Some(i) => {
            args.remove(i);
            true
        }
        None => false,
    }
}

fn arg<'a>(args: &'a [String], index: usize, message: &'static str) -> Result<&'a str> {
    args.get(index).map(String::as_str).context(message)
}

/// Parse optional `[max [page]]` trailing arguments; absent means fetch all.
fn page_request(args: &[String], index: usize) -> Result<PageRequest> {
    let Some(max) = args.get(index) else {
        return Ok(PageRequest::ALL);
    };
    let max: i64 = max
        .parse()
        .with_context(|| format!("invalid max {max:?}"))?;
    let page: i64 = match args.get(index + 1) {
        Some(page) => page
            .parse()
            .with_context(|| format!("invalid page {page:?}"))?,
        None => 1,
    };
    Ok(PageRequest::new(max, page))
}
