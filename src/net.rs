//! Native HTTP fetcher on `reqwest`.

use reqwest::{Client, Url};
use tracing::debug;

use crate::error::FetchError;
use crate::fetch::{Fetch, HttpResponse};

/// Fetches absolute URLs, resolving relative ones against `base`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Option<Url>,
}

impl HttpFetcher {
    pub fn new(base: Option<Url>) -> Self {
        HttpFetcher {
            client: Client::new(),
            base,
        }
    }

    /// Resolve `url` against the base, if it is relative.
    pub fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        let parsed = match &self.base {
            Some(base) => base.join(url),
            None => Url::parse(url),
        };
        parsed.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Fetch for HttpFetcher {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let resolved = self.resolve(url)?;
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: resolved.to_string(),
            reason: e.to_string(),
        };
        let response = self
            .client
            .get(resolved.clone())
            .send()
            .await
            .map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport)?.to_vec();
        debug!(url = %resolved, status, bytes = body.len(), "fetched");
        Ok(HttpResponse { status, body })
    }
}
