//! Brand imagery lookups over HTTP. Implements BrandAssetPort.
//!
//! Header images come from the homepage's `og:image` meta tag. Every failure path
//! degrades to a guessed URL instead of an error.

use crate::ports::BrandAssetPort;
use regex::Regex;
use reqwest::Client;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};

const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons";

/// `<meta ... property="og:image" ... content="...">` in either attribute order.
static OG_IMAGE: LazyLock<Option<(Regex, Regex)>> = LazyLock::new(|| {
    let property_first = Regex::new(
        r#"(?is)<meta[^>]+(?:property|name)\s*=\s*["']og:image["'][^>]*?content\s*=\s*["']([^"']+)["']"#,
    );
    let content_first = Regex::new(
        r#"(?is)<meta[^>]+content\s*=\s*["']([^"']+)["'][^>]*?(?:property|name)\s*=\s*["']og:image["']"#,
    );
    match (property_first, content_first) {
        (Ok(a), Ok(b)) => Some((a, b)),
        _ => None,
    }
});

/// Strips scheme, path and surrounding whitespace: `https://acme.com/about` -> `acme.com`.
pub fn normalize_domain(domain: &str) -> String {
    let d = domain.trim();
    let d = d
        .strip_prefix("https://")
        .or_else(|| d.strip_prefix("http://"))
        .unwrap_or(d);
    d.split('/').next().unwrap_or(d).to_ascii_lowercase()
}

pub fn best_guess_header_url(domain: &str) -> String {
    format!("https://{}/og-image.png", normalize_domain(domain))
}

pub fn favicon_url(domain: &str) -> String {
    format!("{}?domain={}&sz=128", FAVICON_SERVICE, normalize_domain(domain))
}

/// Finds the `og:image` URL in `html`, resolved against `https://<domain>`.
pub fn extract_og_image(html: &str, domain: &str) -> Option<String> {
    let (property_first, content_first) = OG_IMAGE.as_ref()?;
    let raw = property_first
        .captures(html)
        .or_else(|| content_first.captures(html))?
        .get(1)?
        .as_str()
        .trim();
    if raw.is_empty() {
        return None;
    }
    let url = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else if let Some(rest) = raw.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        format!(
            "https://{}/{}",
            normalize_domain(domain),
            raw.trim_start_matches('/')
        )
    };
    Some(url)
}

/// reqwest-backed asset lookup.
pub struct HttpBrandAssets {
    client: Client,
}

impl HttpBrandAssets {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build HTTP client, using defaults");
                Client::new()
            });
        Self { client }
    }

    async fn fetch_homepage(&self, domain: &str) -> Result<String, reqwest::Error> {
        self.client
            .get(format!("https://{}", domain))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait::async_trait]
impl BrandAssetPort for HttpBrandAssets {
    async fn header_image(&self, domain: &str) -> String {
        let domain = normalize_domain(domain);
        match self.fetch_homepage(&domain).await {
            Ok(html) => match extract_og_image(&html, &domain) {
                Some(url) => {
                    debug!(domain = %domain, url = %url, "found og:image");
                    url
                }
                None => {
                    debug!(domain = %domain, "no og:image, using guess");
                    best_guess_header_url(&domain)
                }
            },
            Err(e) => {
                warn!(domain = %domain, error = %e, "homepage fetch failed, using guess");
                best_guess_header_url(&domain)
            }
        }
    }

    fn favicon(&self, domain: &str) -> String {
        favicon_url(domain)
    }
}
