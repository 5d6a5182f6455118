use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::models::{DeliveryError, Profile, PushRequest, ReplyRequest, TextMessage};
use crate::services::chunk::{split_text, MAX_TEXT_CHARS};
use crate::services::MessagingClient;

/// Message objects accepted per push or reply call.
const MAX_MESSAGES_PER_CALL: usize = 5;

/// LINE Messaging API client.
/// Based on: https://developers.line.biz/en/reference/messaging-api/
pub struct LineClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl LineClient {
    pub fn new(client: Client, config: &AppConfig) -> Self {
        Self {
            client,
            base_url: config.line_api_base_url.trim_end_matches('/').to_string(),
            access_token: config.channel_access_token.clone(),
        }
    }

    fn messages_for(text: &str) -> Result<Vec<TextMessage>, DeliveryError> {
        if text.trim().is_empty() {
            return Err(DeliveryError::EmptyMessage);
        }
        Ok(split_text(text, MAX_TEXT_CHARS)
            .into_iter()
            .map(TextMessage::new)
            .collect())
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<(), DeliveryError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Sending request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            error!("Messaging API error ({}): {}", status, body);
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MessagingClient for LineClient {
    /// POST /v2/bot/message/push, in batches when the text is long.
    async fn push(&self, recipient_id: &str, text: &str) -> Result<(), DeliveryError> {
        let messages = Self::messages_for(text)?;

        for batch in messages.chunks(MAX_MESSAGES_PER_CALL) {
            let request = PushRequest {
                to: recipient_id,
                messages: batch.to_vec(),
            };
            self.post("/v2/bot/message/push", &request).await?;
        }
        Ok(())
    }

    /// POST /v2/bot/message/reply. The token is single-use, so anything
    /// beyond one call's worth of messages is dropped.
    async fn reply(&self, reply_token: &str, text: &str) -> Result<(), DeliveryError> {
        let mut messages = Self::messages_for(text)?;
        if messages.len() > MAX_MESSAGES_PER_CALL {
            warn!(
                "Reply split into {} messages, sending the first {}",
                messages.len(),
                MAX_MESSAGES_PER_CALL
            );
            messages.truncate(MAX_MESSAGES_PER_CALL);
        }

        let request = ReplyRequest {
            reply_token,
            messages,
        };
        self.post("/v2/bot/message/reply", &request).await
    }

    /// GET /v2/bot/profile/{userId}
    async fn profile(&self, user_id: &str) -> Result<Profile, DeliveryError> {
        let url = format!(
            "{}/v2/bot/profile/{}",
            self.base_url,
            urlencoding::encode(user_id)
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("Profile lookup failed ({}): {}", status, body);
            return Err(DeliveryError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
