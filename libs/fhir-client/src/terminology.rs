//! Value set expansion against a terminology server

use crate::client::{server_error, ClientConfig};
use crate::error::{Error, Result};
use ferrum_models::{Coding, ValueSet};
use lru::LruCache;
use reqwest::Client;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// Expands value sets by canonical URL and caches the resulting codes.
///
/// Answer-option pickers ask for the same handful of value sets over and
/// over; expansions are keyed by `url` (plus an optional filter).
pub struct TerminologyClient {
    client: Client,
    base_url: String,
    cache: Mutex<LruCache<String, Vec<Coding>>>,
}

impl TerminologyClient {
    pub fn new(config: &ClientConfig, cache_size: usize) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN),
            )),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// All selectable codes of the value set at `url`
    pub async fn resolve_value_set(&self, url: &str) -> Result<Vec<Coding>> {
        self.expand(url, None).await
    }

    pub async fn expand(&self, value_set_url: &str, filter: Option<&str>) -> Result<Vec<Coding>> {
        let key = cache_key(value_set_url, filter);
        if let Some(hit) = self.cache.lock().ok().and_then(|mut c| c.get(&key).cloned()) {
            tracing::debug!(url = value_set_url, "Expansion cache hit");
            return Ok(hit);
        }

        let mut url = format!(
            "{}/ValueSet/$expand?url={}",
            self.base_url,
            urlencoding::encode(value_set_url)
        );
        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            url.push_str("&filter=");
            url.push_str(&urlencoding::encode(filter));
        }
        tracing::info!(%url, "Expanding value set");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(server_error(status, body));
        }
        let codings = codings_from_expansion(&serde_json::from_str(&body)?)?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, codings.clone());
        }
        Ok(codings)
    }

    pub fn cached(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }
}

fn cache_key(url: &str, filter: Option<&str>) -> String {
    match filter {
        Some(filter) if !filter.is_empty() => format!("{}|{}", url, filter),
        _ => url.to_string(),
    }
}

/// Selectable codings of an expanded ValueSet
pub fn codings_from_expansion(value: &Value) -> Result<Vec<Coding>> {
    let value_set = ValueSet::from_value(value)
        .map_err(|e| Error::UnexpectedResponse(format!("expected a ValueSet: {}", e)))?;
    Ok(value_set.codings())
}
