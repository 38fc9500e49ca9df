//! FHIR REST client for Questionnaires

use crate::error::{Error, Result};
use ferrum_models::{Bundle, OperationOutcome};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

pub const FHIR_JSON: &str = "application/fhir+json";

/// Connection settings shared by the server and terminology clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service base, e.g. `https://hapi.fhir.org/baseR4`
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub(crate) fn http_client(&self) -> Result<Client> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "base URL must be http(s): {}",
                self.base_url
            )));
        }
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(FHIR_JSON));
        if let Some(token) = &self.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| Error::Config(format!("invalid bearer token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()?)
    }
}

/// Questionnaire search criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub term: Option<String>,
    /// Search parameter the term applies to; `_content` when unset
    pub field: Option<String>,
    pub count: Option<u32>,
}

pub struct FhirClient {
    client: Client,
    base_url: String,
}

impl FhirClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }

    /// Current version of a Questionnaire, taken from its history so a
    /// cached read never returns a stale version.
    pub async fn read_latest(&self, id: &str) -> Result<Value> {
        let url = self.url(&format!("Questionnaire/{}/_history", urlencoding::encode(id)));
        tracing::info!(%url, "Reading questionnaire history");
        let history = self.send(self.request(Method::GET, &url)).await?;
        let bundle = Bundle::from_value(&history)
            .map_err(|e| Error::UnexpectedResponse(format!("history is not a Bundle: {}", e)))?;
        latest_version(&bundle)
            .cloned()
            .ok_or_else(|| Error::UnexpectedResponse(format!("no versions of Questionnaire/{}", id)))
    }

    /// Create at `Questionnaire/<id>` with PUT. The id is usually set by
    /// `publish::prepare`; without one the server assigns it.
    pub async fn create(&self, resource: &Value) -> Result<Value> {
        match resource_id(resource) {
            Some(id) => self.put(id, resource).await,
            None => {
                let url = self.url("Questionnaire");
                tracing::info!(%url, "Creating questionnaire");
                self.send(self.request(Method::POST, &url).json(resource)).await
            }
        }
    }

    pub async fn update(&self, resource: &Value) -> Result<Value> {
        let id = resource_id(resource)
            .ok_or_else(|| Error::MissingId("update needs Questionnaire.id".to_string()))?;
        self.put(id, resource).await
    }

    async fn put(&self, id: &str, resource: &Value) -> Result<Value> {
        let url = self.url(&format!("Questionnaire/{}", urlencoding::encode(id)));
        tracing::info!(%url, "Writing questionnaire");
        self.send(
            self.request(Method::PUT, &url)
                .header(CONTENT_TYPE, FHIR_JSON)
                .body(serde_json::to_vec(resource)?),
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let url = self.url(&format!("Questionnaire/{}", urlencoding::encode(id)));
        tracing::info!(%url, "Deleting questionnaire");
        let response = self.request(Method::DELETE, &url).send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(server_error(status, body))
    }

    /// `$validate` the resource.
    ///
    /// Validation failures reported as 4xx with an OperationOutcome are
    /// returned as the outcome, not as an error.
    pub async fn validate(&self, resource: &Value) -> Result<OperationOutcome> {
        let resource_type = resource
            .get("resourceType")
            .and_then(Value::as_str)
            .unwrap_or("Questionnaire");
        let url = self.url(&format!("{}/$validate", resource_type));
        let parameters = json!({
            "resourceType": "Parameters",
            "parameter": [{"name": "resource", "resource": resource}]
        });
        tracing::info!(%url, "Validating resource");

        let response = self
            .request(Method::POST, &url)
            .header(CONTENT_TYPE, FHIR_JSON)
            .body(serde_json::to_vec(&parameters)?)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        match parse_outcome(&body) {
            Some(outcome) if status.is_success() || status.is_client_error() => Ok(outcome),
            _ if status.is_success() => Err(Error::UnexpectedResponse(
                "$validate did not return an OperationOutcome".to_string(),
            )),
            _ => Err(server_error(status, body)),
        }
    }

    /// Newest first, with an accurate total
    pub async fn search(&self, params: &SearchParams) -> Result<Bundle> {
        let url = self.url(&format!("Questionnaire?{}", search_query(params)));
        tracing::info!(%url, "Searching questionnaires");
        self.bundle(&url).await
    }

    /// Follow a paging link (`next`, `previous`/`prev`, `first`, `last`)
    pub async fn page(&self, bundle: &Bundle, relation: &str) -> Result<Option<Bundle>> {
        let url = match relation {
            "prev" | "previous" => bundle.link_url("previous").or_else(|| bundle.link_url("prev")),
            other => bundle.link_url(other),
        };
        match url {
            Some(url) => self.bundle(url).await.map(Some),
            None => Ok(None),
        }
    }

    async fn bundle(&self, url: &str) -> Result<Bundle> {
        let value = self
            .send(self.request(Method::GET, url).header(CACHE_CONTROL, "no-cache"))
            .await?;
        Bundle::from_value(&value)
            .map_err(|e| Error::UnexpectedResponse(format!("expected a Bundle: {}", e)))
    }

    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(server_error(status, body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

fn resource_id(resource: &Value) -> Option<&str> {
    resource
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

fn parse_outcome(body: &str) -> Option<OperationOutcome> {
    let value: Value = serde_json::from_str(body).ok()?;
    OperationOutcome::from_value(&value).ok()
}

pub(crate) fn server_error(status: StatusCode, body: String) -> Error {
    let outcome = parse_outcome(&body);
    tracing::warn!(status = status.as_u16(), has_outcome = outcome.is_some(), "FHIR server error");
    Error::ServerError {
        status: status.as_u16(),
        outcome,
        body,
    }
}

/// Entry with the highest numeric `meta.versionId`
pub fn latest_version(history: &Bundle) -> Option<&Value> {
    history.resources().max_by_key(|resource| {
        resource
            .pointer("/meta/versionId")
            .and_then(Value::as_str)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
    })
}

pub fn search_query(params: &SearchParams) -> String {
    let mut query = vec![
        "_sort=-_lastUpdated".to_string(),
        "_total=accurate".to_string(),
    ];
    if let Some(count) = params.count {
        query.push(format!("_count={}", count));
    }
    if let Some(term) = params.term.as_deref().filter(|t| !t.is_empty()) {
        let field = params.field.as_deref().unwrap_or("_content");
        query.push(format!(
            "{}={}",
            urlencoding::encode(field),
            urlencoding::encode(term)
        ));
    }
    query.join("&")
}
