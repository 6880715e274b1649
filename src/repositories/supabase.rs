use super::{CommandSink, ReadingSource};
use crate::config::SupabaseConfig;
use crate::error::{AppError, Result};
use crate::models::{reading, Command, CommandRecord, Reading};
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::debug;

/// PostgREST client for the hosted Supabase project.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    base_url: String,
    key: String,
    readings_table: String,
    commands_table: String,
}

impl SupabaseClient {
    pub fn new(cfg: &SupabaseConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: cfg.url.trim_end_matches('/').to_string(),
            key: cfg.key.clone(),
            readings_table: cfg.readings_table.clone(),
            commands_table: cfg.commands_table.clone(),
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.key))
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(AppError::Upstream {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ReadingSource for SupabaseClient {
    async fn fetch_recent(&self, limit: usize) -> Result<Vec<Reading>> {
        let limit = limit.to_string();
        let request = self.http.get(self.table_url(&self.readings_table)).query(&[
            ("select", "*"),
            ("order", "timestamp.desc"),
            ("limit", limit.as_str()),
        ]);

        let response = self.authorized(request).send().await?;
        let response = Self::check_status(response).await?;
        let rows: Vec<serde_json::Value> = response.json().await?;
        let fetched = rows.len();
        let readings = reading::from_rows(rows);

        debug!(
            count = readings.len(),
            skipped = fetched - readings.len(),
            table = %self.readings_table,
            "Fetched readings"
        );
        Ok(readings)
    }
}

#[async_trait]
impl CommandSink for SupabaseClient {
    async fn insert_command(&self, command: Command) -> Result<()> {
        let request = self
            .http
            .post(self.table_url(&self.commands_table))
            .header("Prefer", "return=minimal")
            .json(&CommandRecord::from(command));

        let response = self.authorized(request).send().await?;
        Self::check_status(response).await?;

        debug!(%command, table = %self.commands_table, "Inserted command");
        Ok(())
    }
}
