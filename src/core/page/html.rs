//! Loading pages: HTML parsing into the [`Document`] text tree, from a file, stdin, or a URL.

use std::io::Read;
use std::path::{Path, PathBuf};

use scraper::{ElementRef, Html};

use super::{Document, Element, Node};
use crate::core::app;

/// Errors when loading a page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Failed to read page {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to fetch {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },
    #[error("Fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Where a page comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSource {
    File(PathBuf),
    Url(String),
    Stdin,
}

impl PageSource {
    /// URL reported in the page context: the URL itself, a `file://` path, or "stdin".
    pub fn display_url(&self) -> String {
        match self {
            PageSource::Url(url) => url.clone(),
            PageSource::File(path) => {
                let abs = std::fs::canonicalize(path).unwrap_or_else(|_| path.clone());
                format!("file://{}", abs.display())
            }
            PageSource::Stdin => "stdin".to_string(),
        }
    }
}

/// A loaded page and the URL it came from.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub url: String,
    pub document: Document,
}

/// Load and parse a page from `source`.
pub async fn load(source: &PageSource, client: &reqwest::Client) -> Result<LoadedPage, PageError> {
    let html = match source {
        PageSource::File(path) => read_file(path)?,
        PageSource::Stdin => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| PageError::Read {
                    path: "stdin".to_string(),
                    source,
                })?;
            buf
        }
        PageSource::Url(url) => fetch(url, client).await?,
    };
    Ok(LoadedPage {
        url: source.display_url(),
        document: parse(&html),
    })
}

fn read_file(path: &Path) -> Result<String, PageError> {
    std::fs::read_to_string(path).map_err(|source| PageError::Read {
        path: path.display().to_string(),
        source,
    })
}

async fn fetch(url: &str, client: &reqwest::Client) -> Result<String, PageError> {
    log::info!("Fetching page {}", url);
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, app::user_agent())
        .send()
        .await
        .map_err(|source| PageError::Fetch {
            url: url.to_string(),
            source,
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(PageError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(|source| PageError::Fetch {
        url: url.to_string(),
        source,
    })
}

/// Parse an HTML document. Comments, doctypes, and processing instructions are dropped.
pub fn parse(html: &str) -> Document {
    let parsed = Html::parse_document(html);
    Document::new(convert(parsed.root_element()))
}

fn convert(el: ElementRef<'_>) -> Element {
    let value = el.value();
    let mut out = Element::new(value.name());
    out.attrs = value
        .attrs()
        .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
        .collect();
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            let text: &str = text;
            out.children.push(Node::text(text));
        } else if let Some(child_el) = ElementRef::wrap(child) {
            out.children.push(Node::Element(convert(child_el)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::page::{Selection, extract_context, sanitized_text};

    const ARTICLE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Entanglement explained</title>
  <meta name="description" content="A gentle primer">
  <style>body { font-family: serif; }</style>
</head>
<body>
  <nav>Home | About</nav>
  <article>
    <h1>Spooky action</h1>
    <p>Physicists call the effect <em>quantum entanglement</em> when two particles share a state.</p>
    <script>trackPageView("quantum entanglement");</script>
  </article>
</body>
</html>"#;

    #[test]
    fn parse_extracts_title_and_meta() {
        let doc = parse(ARTICLE);
        assert_eq!(doc.title(), "Entanglement explained");
        assert_eq!(doc.meta_description(), "A gentle primer");
    }

    #[test]
    fn parse_keeps_inline_text_in_order() {
        let doc = parse(ARTICLE);
        let text = sanitized_text(&doc);
        assert!(text.starts_with("Home | About Spooky action"));
        assert!(text.contains("call the effect quantum entanglement when two"));
        assert!(!text.contains("trackPageView"));
        assert!(!text.contains("font-family"));
    }

    #[test]
    fn parsed_page_feeds_extraction() {
        let doc = parse(ARTICLE);
        let ctx = extract_context(&Selection::new("quantum entanglement"), &doc, 40);
        assert_eq!(ctx, "...he effect quantum entanglement when two...");
    }

    #[test]
    fn display_url_for_sources() {
        assert_eq!(
            PageSource::Url("https://example.com/a".into()).display_url(),
            "https://example.com/a"
        );
        assert_eq!(PageSource::Stdin.display_url(), "stdin");
        let file = PageSource::File(PathBuf::from("/no/such/page.html")).display_url();
        assert_eq!(file, "file:///no/such/page.html");
    }

    #[tokio::test]
    async fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, ARTICLE).unwrap();
        let page = load(&PageSource::File(path), &reqwest::Client::new())
            .await
            .unwrap();
        assert!(page.url.starts_with("file://"));
        assert_eq!(page.document.title(), "Entanglement explained");
    }

    #[tokio::test]
    async fn load_fetches_url() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ARTICLE))
            .mount(&server)
            .await;

        let url = format!("{}/article", server.uri());
        let page = load(&PageSource::Url(url.clone()), &reqwest::Client::new())
            .await
            .unwrap();
        assert_eq!(page.url, url);
        assert_eq!(page.document.meta_description(), "A gentle primer");
    }

    #[tokio::test]
    async fn load_reports_http_status() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = load(&PageSource::Url(server.uri()), &reqwest::Client::new())
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::Status { status: 404, .. }));
    }
}
