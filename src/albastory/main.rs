mod scrape;

use core::time::Duration;
use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::Parser;
use rand::Rng;

#[derive(Parser)]
struct Args {
    /// Listing page number; prompted for interactively when omitted.
    page: Option<u32>,

    /// Run Chrome headless instead of showing a window.
    #[arg(long)]
    headless: bool,

    #[arg(long, default_value = "albastory_posts_with_comments.csv")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_timed();

    let args = Args::parse();
    let page = match args.page {
        Some(page) => page,
        None => prompt_page()?,
    };

    let client = ascr::scrape::basic()?;

    tracing::info!(target: "main", "crawling page {page} ...");
    let links = scrape::fetch_post_links(&client, &scrape::listing_url(page)).await;
    if links.is_empty() {
        tracing::info!(target: "main", "no posts to visit, exiting.");
        return Ok(());
    }

    let browser = ascr::scrape::puppeteer::puppeteer(args.headless, None)?;
    let tab = ascr::scrape::puppeteer::first_tab(&browser)?;

    let mut writer = ascr::output::open_writer(&args.output)?;
    let mut rng = rand::rng();

    for link in &links {
        tracing::info!(target: "main", "visiting {link} ...");
        if let Some(record) = scrape::extract_post(&tab, link).await {
            ascr::output::append_record(&mut writer, &record)?;
            tracing::info!(target: "main", "\x1b[36msaved\x1b[0m {}", record.title);
        }
        tokio::time::sleep(Duration::from_millis(rng.random_range(1000..2000))).await;
    }
    writer.flush()?;

    tracing::info!(target: "main", "page {page} done.");
    Ok(())
}

fn prompt_page() -> anyhow::Result<u32> {
    print!("page number to crawl: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    line.trim().parse().map_err(Into::into)
}
