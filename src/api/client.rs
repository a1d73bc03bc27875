use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::config::ApiConfig;

/// Query parameters as owned pairs; ids are rendered to strings up front.
pub type Query<'a> = &'a [(&'a str, String)];

/// One round trip per call. No retries, no caching.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ApiError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self::with_client(http, &config.base_url))
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, query: Query<'_>) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        if query.is_empty() {
            builder
        } else {
            builder.query(query)
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Query<'_>,
    ) -> Result<T, ApiError> {
        let body = self
            .execute(Method::GET, path, self.request(Method::GET, path, query))
            .await?;
        decode(&body)
    }

    pub(crate) async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: &B,
    ) -> Result<T, ApiError> {
        let builder = self.request(method.clone(), path, query).json(body);
        let body = self.execute(method, path, builder).await?;
        decode(&body)
    }

    /// Like [`send`](Self::send) but ignores the response body.
    pub(crate) async fn send_unit<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let mut builder = self.request(method.clone(), path, query);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.execute(method, path, builder).await.map(|_| ())
    }

    pub(crate) async fn send_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::POST, path, &[]).form(form);
        let body = self.execute(Method::POST, path, builder).await?;
        decode(&body)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        builder: RequestBuilder,
    ) -> Result<String, ApiError> {
        let response = builder.send().await.map_err(|e| {
            tracing::debug!(method = %method, path = %path, error = %e, "Request failed to send");
            ApiError::from(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(
                method = %method,
                path = %path,
                status = status.as_u16(),
                "Request rejected"
            );
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        tracing::trace!(method = %method, path = %path, status = status.as_u16(), "Request completed");
        Ok(body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    // Some endpoints answer 200 with an empty body; treat it as JSON null so
    // unit-like and Option targets still decode.
    let source = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(source).map_err(|e| ApiError::Decode {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::with_client(Client::new(), "http://localhost:8081/");
        assert_eq!(client.url("/feed"), "http://localhost:8081/feed");
    }

    #[test]
    fn decode_maps_bad_json_to_decode_error() {
        let err = decode::<Vec<u32>>("{not json").unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[test]
    fn decode_empty_body_as_null() {
        let value: Option<u32> = decode("").unwrap();
        assert_eq!(value, None);
    }
}
