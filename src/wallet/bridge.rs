//! HTTP wallet bridge signer.

use super::signer::{SignRequest, Signer};
use crate::config::WalletConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Signs through a local wallet bridge.
///
/// The bridge receives the entry-function descriptor plus the sender and
/// answers with whatever the wallet returned.
pub struct WalletBridge {
    base_url: String,
    account: String,
    http_client: reqwest::Client,
}

#[derive(Serialize)]
struct BridgeRequest<'a> {
    sender: &'a str,
    #[serde(flatten)]
    request: &'a SignRequest,
}

impl WalletBridge {
    pub fn new(
        base_url: impl Into<String>,
        account: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            account: account.into(),
            http_client,
        })
    }

    /// Build from configuration. `None` when no bridge or account is set.
    pub fn from_config(config: &WalletConfig) -> Result<Option<Self>> {
        match (&config.bridge_url, &config.account) {
            (Some(url), Some(account)) if !url.is_empty() && !account.is_empty() => Ok(Some(
                Self::new(
                    url.clone(),
                    account.clone(),
                    Duration::from_secs(config.request_timeout_secs),
                )?,
            )),
            _ => Ok(None),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    fn endpoint(&self) -> String {
        format!("{}/sign_and_submit", self.base_url)
    }
}

#[async_trait]
impl Signer for WalletBridge {
    async fn sign_and_submit(&self, request: &SignRequest) -> Result<Value> {
        let url = self.endpoint();
        debug!("Requesting signature from {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(&BridgeRequest {
                sender: &self.account,
                request,
            })
            .send()
            .await
            .map_err(|e| Error::signer(format!("Wallet bridge unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            let reason = if reason.trim().is_empty() {
                status.to_string()
            } else {
                reason
            };
            return Err(Error::signer(reason));
        }

        // Accepted from here on; an unreadable reply means no identifier.
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to read wallet bridge reply: {}", e);
                String::new()
            }
        };
        Ok(accepted_body(&text))
    }
}

/// JSON when the body parses, otherwise the trimmed text as a bare
/// identifier. Blank bodies are `null`.
fn accepted_body(text: &str) -> Value {
    let text = text.trim();
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::PayloadBuilder;
    use crate::testing::serve_once;
    use crate::wallet::{Submission, TransactionHandle, submit};
    use serde_json::json;

    fn bridge(url: String) -> WalletBridge {
        WalletBridge::new(url, "0xa11ce", Duration::from_secs(5)).unwrap()
    }

    fn request() -> SignRequest {
        SignRequest::entry_function(PayloadBuilder::new("0x42", "marketplace").create_market("Q?", 5))
    }

    #[test]
    fn test_from_config_requires_url_and_account() {
        let mut config = WalletConfig::default();
        assert!(WalletBridge::from_config(&config).unwrap().is_none());

        config.bridge_url = Some("http://127.0.0.1:7777/".to_string());
        assert!(WalletBridge::from_config(&config).unwrap().is_none());

        config.account = Some("0xa11ce".to_string());
        let bridge = WalletBridge::from_config(&config).unwrap().unwrap();
        assert_eq!(bridge.endpoint(), "http://127.0.0.1:7777/sign_and_submit");
        assert_eq!(bridge.account(), "0xa11ce");
    }

    #[test]
    fn test_bridge_request_carries_sender() {
        let payload = PayloadBuilder::new("0x42", "marketplace").create_market("Q?", 5);
        let request = SignRequest::entry_function(payload);
        let body = serde_json::to_value(BridgeRequest {
            sender: "0xa11ce",
            request: &request,
        })
        .unwrap();

        assert_eq!(body["sender"], json!("0xa11ce"));
        assert_eq!(body["type"], json!("entry_function_payload"));
        assert_eq!(body["arguments"], json!(["Q?", "5"]));
    }

    #[test]
    fn test_accepted_body_shapes() {
        assert_eq!(accepted_body("{\"hash\":\"0x1\"}"), json!({ "hash": "0x1" }));
        assert_eq!(accepted_body(" 0xabc\n"), json!("0xabc"));
        assert_eq!(accepted_body("\"0xabc\""), json!("0xabc"));
        assert_eq!(accepted_body("  "), Value::Null);
    }

    #[tokio::test]
    async fn test_json_reply_is_returned() {
        let url = serve_once("200 OK", r#"{"transaction_hash":"0xabc"}"#).await;
        let value = bridge(url).sign_and_submit(&request()).await.unwrap();
        assert_eq!(value, json!({ "transaction_hash": "0xabc" }));
    }

    #[tokio::test]
    async fn test_plain_text_reply_is_bare_identifier() {
        let url = serve_once("200 OK", "0xabc").await;
        let payload = PayloadBuilder::new("0x42", "marketplace").create_market("Q?", 5);

        let submission = submit(payload, &bridge(url)).await.unwrap();
        assert_eq!(submission, Submission::Submitted(TransactionHandle::new("0xabc")));
    }

    #[tokio::test]
    async fn test_empty_reply_has_no_identifier() {
        let url = serve_once("204 No Content", "").await;
        let payload = PayloadBuilder::new("0x42", "marketplace").create_market("Q?", 5);

        let submission = submit(payload, &bridge(url)).await.unwrap();
        assert_eq!(submission, Submission::NoIdentifier);
    }

    #[tokio::test]
    async fn test_rejection_carries_body() {
        let url = serve_once("403 Forbidden", "User rejected the request").await;
        let err = bridge(url).sign_and_submit(&request()).await.unwrap_err();
        assert!(matches!(err, Error::Signer(reason) if reason == "User rejected the request"));
    }

    #[tokio::test]
    async fn test_blank_error_body_uses_status() {
        let url = serve_once("500 Internal Server Error", "").await;
        let err = bridge(url).sign_and_submit(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Signer(reason) if reason == reqwest::StatusCode::INTERNAL_SERVER_ERROR.to_string()
        ));
    }
}
