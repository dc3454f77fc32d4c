use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use sidecron_core::config::{SharepointConfig, GRAPH_ENDPOINT};
use sidecron_crontab::error::StoreError;
use sidecron_crontab::store::TableStore;

use crate::session::SharepointSession;

/// Graph workbook client scoped to one Sharepoint drive.
///
/// All methods address resources below
/// `/sites/{domain},{domain_id},{site_id}/drive/root:{root_path}`.
pub struct GraphClient {
    http: reqwest::Client,
    session: Arc<SharepointSession>,
    base_uri: String,
}

/// Body of a `tables/{name}/range` read.
#[derive(Debug, Deserialize)]
struct RangeBody {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl GraphClient {
    pub fn new(config: &SharepointConfig) -> Self {
        let http = reqwest::Client::new();
        let session = Arc::new(SharepointSession::new(http.clone(), config));
        Self::with_session(http, session, config)
    }

    /// Build a client around an existing session, so several clients (or the
    /// status annotator and the workflow) share one sign-in.
    pub fn with_session(
        http: reqwest::Client,
        session: Arc<SharepointSession>,
        config: &SharepointConfig,
    ) -> Self {
        let base_uri = format!(
            "{GRAPH_ENDPOINT}/sites/{},{},{}/drive/root:{}",
            config.domain, config.domain_id, config.site_id, config.root_path,
        );
        Self {
            http,
            session,
            base_uri,
        }
    }

    pub fn session(&self) -> Arc<SharepointSession> {
        self.session.clone()
    }

    fn table_uri(&self, workbook: &str, table: &str) -> String {
        format!("{}{workbook}:/workbook/tables/{table}", self.base_uri)
    }

    fn row_uri(&self, workbook: &str, table: &str, index: usize) -> String {
        format!(
            "{}/rows/itemAt(index={index})",
            self.table_uri(workbook, table)
        )
    }

    async fn send(
        &self,
        builder: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<reqwest::Response, StoreError> {
        let token = self.session.access_token().await?;
        let resp = builder
            .bearer_auth(token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                context: context.to_string(),
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl TableStore for GraphClient {
    async fn sign_in(&self) -> Result<(), StoreError> {
        self.session.access_token().await.map(|_| ())
    }

    async fn table_values(
        &self,
        workbook: &str,
        table: &str,
    ) -> Result<Vec<Vec<String>>, StoreError> {
        let url = format!("{}/range", self.table_uri(workbook, table));
        debug!(%url, "reading table range");

        let body: RangeBody = self
            .send(self.http.get(&url), "get table cells")
            .await?
            .json()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(body
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    async fn append_rows(
        &self,
        workbook: &str,
        table: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), StoreError> {
        let url = format!("{}/rows/add", self.table_uri(workbook, table));
        debug!(%url, count = rows.len(), "appending rows");

        self.send(
            self.http.post(&url).json(&json!({ "values": rows })),
            "append rows to table",
        )
        .await
        .map(|_| ())
    }

    async fn update_row(
        &self,
        workbook: &str,
        table: &str,
        index: usize,
        row: Vec<String>,
    ) -> Result<(), StoreError> {
        let url = self.row_uri(workbook, table, index);
        debug!(%url, "updating row");

        self.send(
            self.http.patch(&url).json(&json!({ "values": [row] })),
            "update row in table",
        )
        .await
        .map(|_| ())
    }

    async fn delete_row(
        &self,
        workbook: &str,
        table: &str,
        index: usize,
    ) -> Result<(), StoreError> {
        let url = self.row_uri(workbook, table, index);
        debug!(%url, "deleting row");

        self.send(self.http.delete(&url), "delete row in table")
            .await
            .map(|_| ())
    }
}

/// Workbook cells may come back as numbers or booleans; the crontab columns
/// are text, so everything else is rendered through its JSON form.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SharepointConfig {
        SharepointConfig {
            authority: "https://login.microsoftonline.com/tenant".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            domain: "example.sharepoint.com".to_string(),
            domain_id: "domain-id".to_string(),
            site_id: "site-id".to_string(),
            root_path: "/sites/acme/newsroom/en".to_string(),
        }
    }

    #[test]
    fn base_uri_addresses_drive_root() {
        let client = GraphClient::new(&config());
        assert_eq!(
            client.base_uri,
            "https://graph.microsoft.com/v1.0/sites/example.sharepoint.com,domain-id,site-id/drive/root:/sites/acme/newsroom/en"
        );
    }

    #[test]
    fn row_uri_uses_item_at_addressing() {
        let client = GraphClient::new(&config());
        let url = client.row_uri("/.helix/crontab.xlsx", "jobs", 3);
        assert_eq!(
            url,
            format!(
                "{}/.helix/crontab.xlsx:/workbook/tables/jobs/rows/itemAt(index=3)",
                client.base_uri
            )
        );
    }

    #[test]
    fn cell_text_keeps_strings_and_renders_scalars() {
        assert_eq!(cell_text(&Value::String("publish /a".to_string())), "publish /a");
        assert_eq!(cell_text(&json!(42)), "42");
        assert_eq!(cell_text(&json!(true)), "true");
    }

    #[test]
    fn range_body_tolerates_missing_values() {
        let body: RangeBody = serde_json::from_str(r#"{"address":"A1:B3"}"#).unwrap();
        assert!(body.values.is_empty());
    }
}
