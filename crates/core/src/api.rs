use crate::error::{CallbackError, CallbackResult};
use crate::types::ExchangeResponse;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeRequest {
    pub code: String,
    pub state: String,
    pub aff: String,
}

/// Trades an authorization code for a session result.
///
/// Implementations never fail: transport problems are reported as a
/// `success = false` response so the callback view only has one failure path.
pub trait ExchangeApi: Send + Sync + 'static {
    fn exchange(
        &self,
        request: ExchangeRequest,
    ) -> impl Future<Output = ExchangeResponse> + Send;
}

#[derive(Clone)]
pub struct HttpExchangeApi {
    client: Client,
    base_url: String,
    provider: String,
}

impl HttpExchangeApi {
    pub fn new(base_url: impl Into<String>, provider: impl Into<String>) -> Self {
        Self::with_timeouts(base_url, provider, DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        provider: impl Into<String>,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .user_agent(concat!("oauth-callback/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.into(),
            provider: provider.into(),
        }
    }

    pub fn exchange_url(&self, request: &ExchangeRequest) -> CallbackResult<Url> {
        let base = self.base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/api/oauth/{}", base, self.provider))
            .map_err(|e| CallbackError::InvalidRedirect(format!("bad server url {base}: {e}")))?;
        url.query_pairs_mut()
            .append_pair("code", &request.code)
            .append_pair("state", &request.state)
            .append_pair("aff", &request.aff);
        Ok(url)
    }

    pub async fn try_exchange(&self, request: &ExchangeRequest) -> CallbackResult<ExchangeResponse> {
        let url = self.exchange_url(request)?;
        debug!("Exchanging code with {}/api/oauth/{}", self.base_url, self.provider);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CallbackError::Api(format!("exchange returned {}", status)));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| CallbackError::Decode(e.to_string()))
    }
}

impl ExchangeApi for HttpExchangeApi {
    fn exchange(
        &self,
        request: ExchangeRequest,
    ) -> impl Future<Output = ExchangeResponse> + Send {
        let api = self.clone();
        async move {
            match api.try_exchange(&request).await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Code exchange failed: {}", e);
                    ExchangeResponse::failure(e.user_message())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(aff: &str) -> ExchangeRequest {
        ExchangeRequest {
            code: "abc".to_string(),
            state: "xyz".to_string(),
            aff: aff.to_string(),
        }
    }

    #[test]
    fn builds_exchange_url_with_empty_affiliate() {
        let api = HttpExchangeApi::new("https://example.com/", "github");
        let url = api.exchange_url(&request("")).expect("url");
        assert_eq!(
            url.as_str(),
            "https://example.com/api/oauth/github?code=abc&state=xyz&aff="
        );
    }

    #[test]
    fn encodes_affiliate_code() {
        let api = HttpExchangeApi::new("https://example.com", "github");
        let url = api.exchange_url(&request("REF 1&x")).expect("url");
        assert_eq!(url.query(), Some("code=abc&state=xyz&aff=REF+1%26x"));
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let api = HttpExchangeApi::new("not a url", "github");
        assert!(api.exchange_url(&request("")).is_err());
    }

    /// Serves one canned HTTP response and returns the base URL to reach it.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn decodes_successful_envelope() {
        let base = serve_once("200 OK", r#"{"success":true,"message":"bind","data":null}"#).await;
        let api = HttpExchangeApi::new(base, "github");

        let response = api.try_exchange(&request("REF1")).await.expect("exchange");
        assert!(response.success);
        assert!(response.is_bind());
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let base = serve_once("502 Bad Gateway", "{}").await;
        let api = HttpExchangeApi::new(base, "github");

        let result = api.try_exchange(&request("")).await;
        assert!(matches!(result, Err(CallbackError::Api(_))), "{result:?}");

        let base = serve_once("502 Bad Gateway", "{}").await;
        let response = HttpExchangeApi::new(base, "github")
            .exchange(request(""))
            .await;
        assert!(!response.success);
        assert_eq!(response.message, "Server error. Please try again later.");
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let base = serve_once("200 OK", "<html>oops</html>").await;
        let api = HttpExchangeApi::new(base, "github");

        let result = api.try_exchange(&request("")).await;
        assert!(matches!(result, Err(CallbackError::Decode(_))), "{result:?}");

        let base = serve_once("200 OK", "<html>oops</html>").await;
        let response = HttpExchangeApi::new(base, "github")
            .exchange(request(""))
            .await;
        assert!(!response.success);
        assert_eq!(response.message, "Unexpected response from server.");
    }

    #[tokio::test]
    async fn transport_failure_becomes_unsuccessful_response() {
        let api = HttpExchangeApi::with_timeouts(
            "http://127.0.0.1:1",
            "github",
            Duration::from_millis(500),
            Duration::from_secs(1),
        );
        let response = api.exchange(request("")).await;
        assert!(!response.success);
        assert!(!response.message.is_empty());
    }
}
