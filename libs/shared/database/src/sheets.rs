use std::sync::Arc;

use reqwest::{header::CONTENT_TYPE, Client, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::error::GoogleApiError;
use crate::google_auth::TokenProvider;

#[derive(Debug, Default, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// Cell values rendered as strings; missing trailing cells are not
    /// padded.
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.values
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Value::String(s) => s.clone(),
                        Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}

/// Thin client for the Sheets `values` endpoints of one spreadsheet.
pub struct SheetsClient {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    tokens: Arc<dyn TokenProvider>,
}

impl SheetsClient {
    pub fn new(
        client: Client,
        base_url: &str,
        spreadsheet_id: &str,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.to_string(),
            tokens,
        }
    }

    fn values_url(&self, range: &str, suffix: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}{}",
            self.base_url,
            self.spreadsheet_id,
            urlencoding::encode(range),
            suffix
        )
    }

    async fn request<T>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<T, GoogleApiError>
    where
        T: DeserializeOwned,
    {
        debug!("Making request to {}", url);

        let token = self.tokens.access_token().await?;
        let mut req = self
            .client
            .request(method, url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .query(query);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Sheets API error ({}): {}", status, error_text);
            return Err(GoogleApiError::Api {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Object(Default::default()))?);
        }
        Ok(serde_json::from_str(&text)?)
    }

    pub async fn get_values(&self, range: &str) -> Result<ValueRange, GoogleApiError> {
        let url = self.values_url(range, "");
        self.request(Method::GET, &url, &[], None).await
    }

    pub async fn update_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), GoogleApiError> {
        let url = self.values_url(range, "");
        let _: Value = self
            .request(
                Method::PUT,
                &url,
                &[("valueInputOption", "RAW")],
                Some(json!({ "values": rows })),
            )
            .await?;
        Ok(())
    }

    pub async fn append_values(&self, range: &str, rows: Vec<Vec<String>>) -> Result<(), GoogleApiError> {
        let url = self.values_url(range, ":append");
        let _: Value = self
            .request(
                Method::POST,
                &url,
                &[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")],
                Some(json!({ "values": rows })),
            )
            .await?;
        Ok(())
    }
}
