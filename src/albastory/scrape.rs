use core::time::Duration;
use std::sync::Arc;

use ascr::{output::PostRecord, scrape::puppeteer};
use headless_chrome::Tab;
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use thiserror::Error;

pub const BASE_URL: &str = "https://www.alba.co.kr";
const CATEGORY_URL: &str = "/story/albastory/StoryList";

const MAX_ATTEMPTS: u32 = 3;
const WAIT_BUDGET: Duration = Duration::from_secs(10);
const RETRY_PAUSE: Duration = Duration::from_secs(2);

pub const NO_COMMENTS: &str = "no comments";

const SEL_LISTING_ANCHOR: &str = "li.albanow-table a";
const SEL_TITLE: &str = ".story-content__title";
const SEL_CONTENT: &str = ".story-view";
const SEL_AUTHOR: &str = ".story-content__userid em";
const SEL_REPLY_WRAP: &str = ".reply-list-wrap";
const SEL_REPLY_ROW: &str = "ul.reply-list-wrap li.reply-list";
const SEL_REPLY_AUTHOR: &str = "div.reply-list__top strong.userId";
const SEL_REPLY_TEXT: &str = "span.reply-list__detail";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("timed out waiting for `{0}`")]
    Timeout(&'static str),
    #[error("element `{0}` not found")]
    Missing(&'static str),
    #[error("element `{0}` is empty")]
    Empty(&'static str),
    #[error(transparent)]
    Driver(#[from] anyhow::Error),
}

#[derive(Debug)]
pub struct Comment {
    pub author: String,
    pub text: String,
}

pub fn listing_url(page: u32) -> String {
    format!("{BASE_URL}{CATEGORY_URL}?page={page}")
}

/// Fetches one listing page and returns the absolute detail-page URLs, in
/// document order. Both a failed fetch and a page with no posts come back as
/// an empty Vec; the two cases are only distinguishable in the log.
pub async fn fetch_post_links(client: &Client, page_url: &str) -> Vec<String> {
    let body = match request_listing(client, page_url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(target: "listing", "{page_url} fetch failed: {e}");
            return Vec::new();
        }
    };

    let links = parse_post_links(&body);
    if links.is_empty() {
        tracing::info!(target: "listing", "no posts listed on {page_url}");
    }
    links
}

async fn request_listing(client: &Client, page_url: &str) -> reqwest::Result<String> {
    client
        .get(page_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

pub fn parse_post_links(html: &str) -> Vec<String> {
    let base = Url::parse(BASE_URL).unwrap();
    let sel_anchor = Selector::parse(SEL_LISTING_ANCHOR).unwrap();

    Html::parse_document(html)
        .select(&sel_anchor)
        .filter_map(|anchor| {
            let href = anchor.attr("href")?;
            Some(base.join(href).ok()?.to_string())
        })
        .collect()
}

/// Visits one detail page, retrying the whole navigate-wait-read sequence up
/// to the attempt budget. `None` means the budget is exhausted and the post
/// should be skipped.
pub async fn extract_post(tab: &Arc<Tab>, url: &str) -> Option<PostRecord> {
    retry(url, MAX_ATTEMPTS, async || try_extract(tab, url).await).await
}

async fn retry<T, F>(url: &str, max_attempts: u32, mut run: F) -> Option<T>
where
    F: AsyncFnMut() -> Result<T, ExtractError>,
{
    for attempt in 1..=max_attempts {
        match run().await {
            Ok(value) => return Some(value),
            Err(e) => {
                tracing::warn!(target: "extract", "{url} attempt {attempt}/{max_attempts}: {e}");
            }
        }
        if attempt < max_attempts {
            tokio::time::sleep(RETRY_PAUSE).await;
        }
    }

    tracing::error!(target: "extract", "\x1b[31mgiving up on {url}\x1b[0m");
    None
}

async fn try_extract(tab: &Arc<Tab>, url: &str) -> Result<PostRecord, ExtractError> {
    puppeteer::navigate_to(tab, url).await?;
    wait_bounded(tab, SEL_TITLE).await?;

    let (title, content, author) = {
        let html = Html::parse_document(&puppeteer::content(tab).await?);
        (
            select_text(&html, SEL_TITLE)?,
            select_text(&html, SEL_CONTENT)?,
            select_text(&html, SEL_AUTHOR)?,
        )
    };

    wait_bounded(tab, SEL_REPLY_WRAP).await?;
    let comments = {
        let html = Html::parse_document(&puppeteer::content(tab).await?);
        parse_comments(&html)?
    };

    Ok(PostRecord {
        title,
        content,
        author,
        comments: join_comments(&comments),
    })
}

async fn wait_bounded(tab: &Arc<Tab>, selector: &'static str) -> Result<(), ExtractError> {
    match tokio::time::timeout(WAIT_BUDGET, puppeteer::wait_for(tab, selector)).await {
        Ok(found) => found.map_err(ExtractError::Driver),
        Err(_) => Err(ExtractError::Timeout(selector)),
    }
}

fn select_text(html: &Html, selector: &'static str) -> Result<String, ExtractError> {
    let sel = Selector::parse(selector).unwrap();
    let text = html
        .select(&sel)
        .next()
        .ok_or(ExtractError::Missing(selector))?
        .text()
        .map(str::trim)
        .collect::<String>();

    if text.is_empty() {
        return Err(ExtractError::Empty(selector));
    }
    Ok(text)
}

fn parse_comments(html: &Html) -> Result<Vec<Comment>, ExtractError> {
    let sel_row = Selector::parse(SEL_REPLY_ROW).unwrap();
    let sel_author = Selector::parse(SEL_REPLY_AUTHOR).unwrap();
    let sel_text = Selector::parse(SEL_REPLY_TEXT).unwrap();

    let mut comments = Vec::new();
    for row in html.select(&sel_row) {
        let commenter = row
            .select(&sel_author)
            .next()
            .ok_or(ExtractError::Missing(SEL_REPLY_AUTHOR))?
            .text()
            .map(str::trim)
            .collect::<String>();
        let text = row
            .select(&sel_text)
            .next()
            .ok_or(ExtractError::Missing(SEL_REPLY_TEXT))?
            .text()
            .map(str::trim)
            .collect::<String>();
        comments.push(Comment {
            author: commenter,
            text,
        });
    }
    Ok(comments)
}

pub fn join_comments(comments: &[Comment]) -> String {
    if comments.is_empty() {
        NO_COMMENTS.to_owned()
    } else {
        comments
            .iter()
            .map(|c| format!("{}: {}", c.author, c.text))
            .collect::<Vec<_>>()
            .join(" | ")
    }
}
