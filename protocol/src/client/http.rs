//! [`CoreClient`] over the node's HTTP admin interface.

use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::ack::{CoreInfo, InfoResponse, SubmissionAcknowledgment, TxResponse};
use super::{CoreClient, RequestContext, RequestError};

/// Talks to a single core node at a fixed base URL.
#[derive(Debug, Clone)]
pub struct HttpCoreClient {
    http: reqwest::Client,
    base: Url,
}

impl HttpCoreClient {
    /// Build a client for `core_url` with a default connection pool.
    pub fn new(core_url: &str) -> Result<Self, RequestError> {
        Self::with_client(reqwest::Client::new(), core_url)
    }

    /// Build a client that shares an existing connection pool.
    pub fn with_client(http: reqwest::Client, core_url: &str) -> Result<Self, RequestError> {
        let mut base = Url::parse(core_url)
            .map_err(|e| RequestError::InvalidEndpoint(format!("{core_url}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(RequestError::InvalidEndpoint(format!(
                "{core_url}: unsupported scheme {}",
                base.scheme()
            )));
        }
        // `Url::join` replaces the last path segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        self.base
            .join(path)
            .map_err(|e| RequestError::InvalidEndpoint(e.to_string()))
    }

    /// The submission URL: `{base}/tx?blob=<raw>`, with `raw` form-encoded.
    pub fn submit_url(&self, raw: &str) -> Result<Url, RequestError> {
        let mut url = self.endpoint("tx")?;
        url.query_pairs_mut().append_pair("blob", raw);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        url: Url,
    ) -> Result<T, RequestError> {
        let http = self.http.clone();
        ctx.run(async move {
            let response = http.get(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(RequestError::UnexpectedStatus(status.as_u16()));
            }
            let body = response.bytes().await?;
            serde_json::from_slice(&body).map_err(|e| RequestError::Decode(e.to_string()))
        })
        .await
    }
}

#[async_trait]
impl CoreClient for HttpCoreClient {
    async fn submit_transaction(
        &self,
        ctx: &RequestContext,
        raw: &str,
    ) -> Result<SubmissionAcknowledgment, RequestError> {
        let url = self.submit_url(raw)?;
        debug!(request_id = %ctx.request_id(), "submitting envelope to core");
        let wire: TxResponse = self.get_json(ctx, url).await?;
        Ok(wire.into())
    }

    async fn info(&self, ctx: &RequestContext) -> Result<CoreInfo, RequestError> {
        let url = self.endpoint("info")?;
        let wire: InfoResponse = self.get_json(ctx, url).await?;
        Ok(wire.info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_endpoints() {
        assert!(matches!(
            HttpCoreClient::new("not a url"),
            Err(RequestError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            HttpCoreClient::new("ftp://core.example:21"),
            Err(RequestError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn submit_url_encodes_blob() {
        let client = HttpCoreClient::new("http://127.0.0.1:11626").unwrap();
        let url = client.submit_url("AAAA+/==").unwrap();
        assert_eq!(url.path(), "/tx");
        assert_eq!(url.query(), Some("blob=AAAA%2B%2F%3D%3D"));
        let decoded: Vec<_> = url.query_pairs().collect();
        assert_eq!(decoded[0].1, "AAAA+/==");
    }

    #[test]
    fn base_path_is_preserved() {
        let client = HttpCoreClient::new("https://gateway.example/core").unwrap();
        assert_eq!(client.base_url().as_str(), "https://gateway.example/core/");
        assert_eq!(
            client.endpoint("info").unwrap().as_str(),
            "https://gateway.example/core/info"
        );
    }
}
