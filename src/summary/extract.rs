use crate::error::SummarizeError;
use crate::summary::config::ExtractConfig;
use crate::summary::util::collapse_whitespace;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// Elements whose subtree never counts as page content.
const STRIPPED_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "noscript", "svg",
];

/// Main-content selectors, highest priority first.
pub const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    ".content",
    "#content",
    ".post",
    ".article",
    ".entry",
    ".story",
];

#[derive(Debug, Clone, Serialize)]
pub struct ExtractedPage {
    pub url: String,
    pub title: Option<String>,
    /// Selector that produced the content block; `None` means body fallback.
    pub selector: Option<&'static str>,
    pub text: String,
}

pub trait PageFetcher {
    /// Fetch the raw markup of `target`, an already validated URL as the user typed it.
    fn fetch(&self, target: &str) -> Result<String, SummarizeError>;
}

/// Fetches pages through a CORS relay that takes the target as `?url=`.
pub struct ProxyFetcher {
    client: Client,
    proxy_url: Url,
}

impl ProxyFetcher {
    pub fn new(cfg: &ExtractConfig) -> Result<Self, SummarizeError> {
        let proxy_url = Url::parse(cfg.proxy_url.trim())
            .map_err(|err| SummarizeError::Extraction(format!("invalid proxy url: {err}")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|err| SummarizeError::Extraction(err.to_string()))?;
        Ok(Self { client, proxy_url })
    }
}

pub fn proxy_request_url(proxy: &Url, target: &str) -> Url {
    let mut out = proxy.clone();
    out.query_pairs_mut().append_pair("url", target);
    out
}

impl PageFetcher for ProxyFetcher {
    fn fetch(&self, target: &str) -> Result<String, SummarizeError> {
        let request_url = proxy_request_url(&self.proxy_url, target);
        let response = self
            .client
            .get(request_url)
            .send()
            .map_err(|err| SummarizeError::Extraction(err.to_string()))?;
        if !response.status().is_success() {
            return Err(SummarizeError::Extraction(format!(
                "Error fetching URL: {}",
                response.status().as_u16()
            )));
        }
        response
            .text()
            .map_err(|err| SummarizeError::Extraction(err.to_string()))
    }
}

pub fn parse_target_url(raw: &str) -> Result<Url, SummarizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SummarizeError::validation("enter an article URL"));
    }
    Url::parse(trimmed).map_err(|_| SummarizeError::validation("URL is not valid"))
}

/// Validate `raw`, fetch it and reduce the markup to title plus main text.
pub fn extract(raw_url: &str, fetcher: &dyn PageFetcher) -> Result<ExtractedPage, SummarizeError> {
    parse_target_url(raw_url)?;
    let target = raw_url.trim();
    let html = fetcher.fetch(target)?;
    let page = extract_from_html(target, &html)?;
    tracing::info!(
        url = %page.url,
        selector = page.selector.unwrap_or("body"),
        chars = page.text.chars().count(),
        "page text extracted"
    );
    Ok(page)
}

pub fn extract_from_html(url: &str, html: &str) -> Result<ExtractedPage, SummarizeError> {
    let document = Html::parse_document(html);

    let (selector, raw_text) = match select_content(&document)? {
        Some((selector, element)) => (Some(selector), visible_text(element)),
        None => (None, fallback_text(&document)?),
    };
    let body = collapse_whitespace(&raw_text);
    let title = page_title(&document)?;

    let text = match &title {
        Some(title) if body.is_empty() => title.clone(),
        Some(title) => format!("{title}\n\n{body}"),
        None => body,
    };
    if text.is_empty() {
        return Err(SummarizeError::Extraction(
            "page contained no readable text".to_string(),
        ));
    }

    Ok(ExtractedPage {
        url: url.to_string(),
        title,
        selector,
        text,
    })
}

fn parse_selector(raw: &str) -> Result<Selector, SummarizeError> {
    Selector::parse(raw)
        .map_err(|err| SummarizeError::Extraction(format!("bad selector `{raw}`: {err:?}")))
}

fn is_stripped(name: &str) -> bool {
    STRIPPED_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

fn inside_stripped(element: ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|el| is_stripped(el.name()))
    })
}

fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_visible_text(element, &mut out);
    out
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        if let Some(child_el) = ElementRef::wrap(child) {
            if is_stripped(child_el.value().name()) {
                continue;
            }
            push_visible_text(child_el, out);
        }
    }
}

/// First selector with any surviving match wins; within it the longest text
/// wins, and ties keep document order.
fn select_content(
    document: &Html,
) -> Result<Option<(&'static str, ElementRef<'_>)>, SummarizeError> {
    for &raw in CONTENT_SELECTORS {
        let selector = parse_selector(raw)?;
        let mut best: Option<(usize, ElementRef<'_>)> = None;
        for element in document.select(&selector) {
            if is_stripped(element.value().name()) || inside_stripped(element) {
                continue;
            }
            let len = visible_text(element).chars().count();
            if best.as_ref().is_none_or(|(best_len, _)| len > *best_len) {
                best = Some((len, element));
            }
        }
        if let Some((_, element)) = best {
            return Ok(Some((raw, element)));
        }
    }
    Ok(None)
}

fn fallback_text(document: &Html) -> Result<String, SummarizeError> {
    let body = parse_selector("body")?;
    let root = document
        .select(&body)
        .next()
        .unwrap_or_else(|| document.root_element());
    Ok(visible_text(root))
}

fn page_title(document: &Html) -> Result<Option<String>, SummarizeError> {
    let selector = parse_selector("title")?;
    let title = document
        .select(&selector)
        .find(|el| !inside_stripped(*el))
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());
    Ok(title)
}
