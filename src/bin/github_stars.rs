//! Harvest repository names from GitHub search to seed the name corpus.
//!
//! Pages through `search/repositories` for popular repositories in a language, sleeping through
//! rate limits, and writes the raw repository objects as JSON. With `--names-out` it also writes
//! one repository name per line, ready to be used as a name source.
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use reqwest::{
    Client, Response,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, LINK, USER_AGENT},
};
use serde::Deserialize;
use serde_json::Value;

const SEARCH_URL: &str = "https://api.github.com/search/repositories";
const PER_PAGE: u32 = 100;

#[derive(Parser)]
#[command(
    name = "github-stars",
    about = "Collect popular repository names from GitHub search"
)]
struct Cli {
    /// OAuth access token used to lift anonymous rate limits.
    #[arg(long)]
    access_token: Option<String>,
    /// File receiving the JSON array of repositories.
    #[arg(long)]
    out: PathBuf,
    /// Optional flat file receiving one repository name per line.
    #[arg(long)]
    names_out: Option<PathBuf>,
    /// Minimum number of stars a repository must have to be considered.
    #[arg(long, default_value_t = 10)]
    stars: u32,
    /// Repository language to search for.
    #[arg(long, default_value = "rust")]
    language: String,
}

#[derive(Deserialize)]
struct SearchPage {
    items: Vec<Value>,
}

#[tokio::main]
async fn main() {
    pkgname::logging::init_tracing(None);
    if let Err(err) = run(Cli::parse()).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = Client::new();
    let query = format!("stars:>={} fork:true language:{}", cli.stars, cli.language);

    let mut repositories = Vec::new();
    let mut page = Some(1);
    while let Some(current) = page {
        let response = search(&client, &query, current, cli.access_token.as_deref()).await?;
        let headers = response.headers().clone();
        let body: SearchPage = response
            .json()
            .await
            .with_context(|| format!("failed to decode search page {current}"))?;

        tracing::info!(
            page = current,
            items = body.items.len(),
            remaining = ?header_u64(&headers, "x-ratelimit-remaining"),
            limit = ?header_u64(&headers, "x-ratelimit-limit"),
            "Fetched search page"
        );
        repositories.extend(body.items);

        if header_u64(&headers, "x-ratelimit-remaining") == Some(0) {
            if let Some(reset) = header_u64(&headers, "x-ratelimit-reset") {
                let wait = until_reset(reset, SystemTime::now());
                tracing::info!(?wait, "Rate limited; sleeping");
                tokio::time::sleep(wait).await;
            }
        }

        page = headers
            .get(LINK)
            .and_then(|value| value.to_str().ok())
            .and_then(next_page);
    }

    write_json(&cli.out, &repositories)?;
    if let Some(path) = cli.names_out.as_deref() {
        let names = repository_names(&repositories);
        write_names(path, &names)?;
        tracing::info!(path = %path.display(), names = names.len(), "Wrote name source");
    }
    Ok(())
}

async fn search(client: &Client, query: &str, page: u32, token: Option<&str>) -> Result<Response> {
    let mut request = client
        .get(SEARCH_URL)
        .query(&[
            ("q", query.to_string()),
            ("page", page.to_string()),
            ("per_page", PER_PAGE.to_string()),
        ])
        .header(USER_AGENT, "pkgname-github-stars")
        .header(ACCEPT, "application/vnd.github+json");
    if let Some(token) = token {
        request = request.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("failed to search repositories (page {page})"))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("GitHub search returned {status}: {body}");
    }
    Ok(response)
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Extract the page number of the `rel="next"` entry of a `Link` header.
fn next_page(link: &str) -> Option<u32> {
    link.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        if !params.split(';').any(|param| param.trim() == "rel=\"next\"") {
            return None;
        }
        let url = target.trim().trim_start_matches('<').trim_end_matches('>');
        let (_, query) = url.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "page")
            .and_then(|(_, value)| value.parse().ok())
    })
}

fn until_reset(reset_epoch: u64, now: SystemTime) -> Duration {
    let now = now
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    Duration::from_secs(reset_epoch.saturating_sub(now))
}

fn repository_names(repositories: &[Value]) -> Vec<String> {
    repositories
        .iter()
        .filter_map(|repo| repo.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

fn write_json(path: &Path, repositories: &[Value]) -> Result<()> {
    let json = serde_json::to_string(repositories).context("failed to encode repositories")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

fn write_names(path: &Path, names: &[String]) -> Result<()> {
    let mut contents = names.join("\n");
    contents.push('\n');
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
