//! HTTP seam. The host page (or `net::HttpFetcher` natively) implements
//! [`Fetch`]; the rest of the crate only sees status codes and bodies.

use serde::de::DeserializeOwned;

use crate::error::FetchError;

/// A completed HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        HttpResponse {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON regardless of status.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, FetchError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Issues GET requests.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// Fetch `url`. Transport failures are errors; HTTP error statuses are
    /// not, so callers can inspect them.
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use super::*;

    /// Serves canned responses by exact URL; anything else is a transport error.
    #[derive(Default)]
    pub struct MapFetch {
        pub routes: HashMap<String, HttpResponse>,
    }

    impl MapFetch {
        pub fn with(mut self, url: &str, response: HttpResponse) -> Self {
            self.routes.insert(url.to_string(), response);
            self
        }
    }

    impl Fetch for MapFetch {
        async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
            self.routes.get(url).cloned().ok_or_else(|| FetchError::Transport {
                url: url.to_string(),
                reason: "no route".to_string(),
            })
        }
    }
}
