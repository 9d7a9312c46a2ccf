use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Client for the Telegram bot `sendMessage` endpoint.
///
/// Delivery is best-effort: every failure mode (transport error, bad JSON,
/// `"ok": false`, missing `"ok"` field) collapses into `false` and is never
/// retried. Callers decide whether a dropped message matters.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: Client,
    api_base: String,
}

impl Notifier {
    pub fn new(timeout_secs: u64) -> Result<Self, reqwest::Error> {
        Self::with_api_base(timeout_secs, TELEGRAM_API_BASE)
    }

    /// Same as [`Notifier::new`] with the API base overridden, so tests can
    /// point the notifier at a mock server.
    pub fn with_api_base(timeout_secs: u64, api_base: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Send an HTML-formatted message to a chat. Returns whether Telegram
    /// acknowledged it.
    pub async fn send_message(&self, bot_token: &str, chat_id: &str, message: &str) -> bool {
        let url = format!("{}/bot{}/sendMessage", self.api_base, bot_token);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("chat_id", chat_id),
                ("text", message),
                ("parse_mode", "HTML"),
            ])
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Failed to reach Telegram API: {e}");
                return false;
            }
        };

        match response.json::<Value>().await {
            Ok(body) => body.get("ok").and_then(Value::as_bool).unwrap_or(false),
            Err(e) => {
                log::warn!("Failed to decode Telegram response: {e}");
                false
            }
        }
    }
}
