//! Site scraper for siteqa.
//!
//! Fetches one website's main page, collects its internal links, and scrapes
//! each linked page's `h1`/`h2`/`p` text into a [`RawCorpus`]. Fetching is
//! sequential with a rate-limit sleep between pages; a page that fails to
//! fetch or parse is logged and skipped, never fatal to the run.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;
use std::time::Duration;

use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use siteqa_shared::{RawCorpus, RawPage, Result, ScrapeConfig, SiteQaError};

/// User-Agent string for scrape requests.
const USER_AGENT: &str = concat!("siteqa/", env!("CARGO_PKG_VERSION"));

/// Corpus key for the site's main page.
const MAIN_PAGE_KEY: &str = "Home";

static ANCHOR_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static H1_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1").expect("valid selector"));
static H2_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2").expect("valid selector"));
static P_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("valid selector"));

// ---------------------------------------------------------------------------
// ScrapeSummary
// ---------------------------------------------------------------------------

/// Summary of a completed scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeSummary {
    /// Pages successfully scraped into the corpus (main page included).
    pub pages_fetched: usize,
    /// Linked pages skipped (duplicates, over the page budget, or failed).
    pub pages_skipped: usize,
    /// Errors encountered (URL, error message).
    pub errors: Vec<(String, String)>,
    /// Total duration of the scrape.
    pub duration: Duration,
}

// ---------------------------------------------------------------------------
// SiteScraper
// ---------------------------------------------------------------------------

/// Sequential, same-host scraper for a single website.
pub struct SiteScraper {
    client: reqwest::Client,
    config: ScrapeConfig,
}

impl SiteScraper {
    /// Create a scraper with the given configuration.
    pub fn new(config: ScrapeConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SiteQaError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Scrape the site rooted at `root_url` into a raw corpus.
    ///
    /// The main page is stored under the `Home` key with its sublink map;
    /// every same-host link found on it becomes a corpus entry keyed by the
    /// link's anchor text. A failed root fetch is fatal, per-page failures
    /// are not.
    pub async fn scrape_site(&self, root_url: &Url) -> Result<(RawCorpus, ScrapeSummary)> {
        let start = std::time::Instant::now();

        info!(%root_url, max_pages = self.config.max_pages, "starting scrape");

        let root_html = self.fetch(root_url).await?;
        let root_doc = Html::parse_document(&root_html);
        let sublinks = extract_links(&root_doc, root_url);

        let mut corpus = RawCorpus::new();
        let mut main_page = extract_page(&root_doc, root_url);
        main_page.sublinks = Some(sublinks.clone());
        corpus.insert(MAIN_PAGE_KEY.to_string(), main_page);

        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(root_url.as_str().to_string());

        let mut errors: Vec<(String, String)> = Vec::new();
        let mut pages_skipped = 0usize;
        let mut processed = 0usize;

        for (link_text, href) in &sublinks {
            if corpus.len() - 1 >= self.config.max_pages {
                debug!("page budget reached, skipping remaining links");
                pages_skipped += sublinks.len() - processed;
                break;
            }
            processed += 1;

            let url = match Url::parse(href) {
                Ok(u) => u,
                Err(e) => {
                    warn!(href, error = %e, "unparseable link, skipping");
                    pages_skipped += 1;
                    continue;
                }
            };

            if !visited.insert(url.as_str().to_string()) {
                pages_skipped += 1;
                continue;
            }

            if self.config.rate_limit_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.rate_limit_ms)).await;
            }

            debug!(link_text, %url, "fetching page");
            match self.fetch(&url).await {
                Ok(html) => {
                    let doc = Html::parse_document(&html);
                    corpus.insert(link_text.clone(), extract_page(&doc, &url));
                }
                Err(e) => {
                    warn!(%url, error = %e, "failed to fetch page, skipping");
                    errors.push((url.to_string(), e.to_string()));
                    pages_skipped += 1;
                }
            }
        }

        let summary = ScrapeSummary {
            pages_fetched: corpus.len(),
            pages_skipped,
            errors,
            duration: start.elapsed(),
        };

        info!(
            pages_fetched = summary.pages_fetched,
            pages_skipped = summary.pages_skipped,
            errors = summary.errors.len(),
            duration_ms = summary.duration.as_millis(),
            "scrape completed"
        );

        Ok((corpus, summary))
    }

    async fn fetch(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| SiteQaError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SiteQaError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| SiteQaError::Network(format!("{url}: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Collect same-host links from a page, keyed by trimmed anchor text.
/// A later anchor with the same text overwrites an earlier one.
pub fn extract_links(doc: &Html, base: &Url) -> BTreeMap<String, String> {
    let mut links = BTreeMap::new();

    for anchor in doc.select(&ANCHOR_SEL) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            continue;
        };

        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }
        if resolved.host_str() != base.host_str() {
            continue;
        }

        let text = anchor.text().collect::<String>().trim().to_string();
        if text.is_empty() {
            continue;
        }

        links.insert(text, resolved.to_string());
    }

    links
}

/// Extract headings, sub-headings, and paragraph text from a page.
pub fn extract_page(doc: &Html, url: &Url) -> RawPage {
    let texts = |sel: &Selector| -> Vec<String> {
        doc.select(sel)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect()
    };

    RawPage {
        page_url: url.to_string(),
        headings: texts(&H1_SEL),
        sub_headings: texts(&H2_SEL),
        paragraphs: texts(&P_SEL),
        sublinks: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MAIN_HTML: &str = r#"
        <html><body>
          <h1>Example Airport</h1>
          <p>Welcome to the airport website.</p>
          <nav>
            <a href="/flights">Flights</a>
            <a href="/dining">Dining</a>
            <a href="https://elsewhere.test/partners">Partners</a>
            <a href="mailto:info@example.test">Contact</a>
          </nav>
        </body></html>
    "#;

    const FLIGHTS_HTML: &str = r#"
        <html><body>
          <h1>Flight Information</h1>
          <h2>Arrivals</h2>
          <h2>Departures</h2>
          <p>Check your flight status below.</p>
          <p>Gates close 20 minutes before departure.</p>
        </body></html>
    "#;

    #[test]
    fn links_keep_same_host_only() {
        let base = Url::parse("https://example.test/").unwrap();
        let doc = Html::parse_document(MAIN_HTML);
        let links = extract_links(&doc, &base);

        assert_eq!(links.len(), 2);
        assert_eq!(links["Flights"], "https://example.test/flights");
        assert_eq!(links["Dining"], "https://example.test/dining");
        assert!(!links.contains_key("Partners"));
        assert!(!links.contains_key("Contact"));
    }

    #[test]
    fn page_extraction_by_tag() {
        let doc = Html::parse_document(FLIGHTS_HTML);
        let url = Url::parse("https://example.test/flights").unwrap();
        let page = extract_page(&doc, &url);

        assert_eq!(page.page_url, "https://example.test/flights");
        assert_eq!(page.headings, vec!["Flight Information"]);
        assert_eq!(page.sub_headings, vec!["Arrivals", "Departures"]);
        assert_eq!(page.paragraphs.len(), 2);
        assert!(page.sublinks.is_none());
    }

    #[tokio::test]
    async fn scrapes_main_page_and_sublinks() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MAIN_HTML))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/flights"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FLIGHTS_HTML))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/dining"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = ScrapeConfig {
            max_pages: 10,
            rate_limit_ms: 0,
            timeout_secs: 5,
        };
        let scraper = SiteScraper::new(config).expect("scraper");
        let root = Url::parse(&server.uri()).unwrap();
        let (corpus, summary) = scraper.scrape_site(&root).await.expect("scrape");

        // Main page plus the one sublink that fetched successfully; the
        // off-host Partners link never becomes a corpus entry.
        assert_eq!(corpus.len(), 2);
        let main = &corpus["Home"];
        assert!(main.sublinks.is_some());
        assert_eq!(main.headings, vec!["Example Airport"]);

        let flights = &corpus["Flights"];
        assert_eq!(flights.sub_headings, vec!["Arrivals", "Departures"]);

        assert_eq!(summary.pages_fetched, 2);
        assert_eq!(summary.pages_skipped, 1);
        assert_eq!(summary.errors.len(), 1);
    }

    #[tokio::test]
    async fn page_budget_bounds_the_crawl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MAIN_HTML))
            .mount(&server)
            .await;

        let config = ScrapeConfig {
            max_pages: 1,
            rate_limit_ms: 0,
            timeout_secs: 5,
        };
        let scraper = SiteScraper::new(config).expect("scraper");
        let root = Url::parse(&server.uri()).unwrap();
        let (corpus, summary) = scraper.scrape_site(&root).await.expect("scrape");

        assert_eq!(corpus.len(), 2);
        assert_eq!(summary.pages_skipped, 1);
    }

    #[tokio::test]
    async fn root_fetch_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let scraper = SiteScraper::new(ScrapeConfig::default()).expect("scraper");
        let root = Url::parse(&server.uri()).unwrap();
        let err = scraper.scrape_site(&root).await.unwrap_err();
        assert!(matches!(err, SiteQaError::Network(_)));
    }
}
