use crate::config::GVIZ_ROOT;
use crate::http::build_client;
use crate::sheets::rows::Cell;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use urlencoding::encode;

/// One variant per rejection path so every degraded ingestion pass is
/// distinguishable in the logs: missing config, network error,
/// markup-instead-of-JSON, unparseable payload, unexpected shape.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("INVENTORY_SHEET_ID is not set")]
    MissingConfig,
    #[error("sheet fetch failed: {0}")]
    Upstream(String),
    #[error("sheet returned markup instead of data; publish it with link access")]
    NotPublic,
    #[error("sheet payload could not be decoded: {0}")]
    Decode(String),
    #[error("sheet payload missing `{0}`")]
    Shape(&'static str),
}

impl IngestError {
    pub fn label(&self) -> &'static str {
        match self {
            IngestError::MissingConfig => "missing_config",
            IngestError::Upstream(_) => "upstream_unreachable",
            IngestError::NotPublic => "upstream_misconfigured",
            IngestError::Decode(_) => "decode_failure",
            IngestError::Shape(_) => "shape_mismatch",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GvizCol {
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GvizRow {
    #[serde(default)]
    pub c: Vec<Option<GvizCell>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GvizCell {
    #[serde(default)]
    pub v: Option<Cell>,
}

#[derive(Debug, Clone)]
pub struct GvizTable {
    pub cols: Vec<GvizCol>,
    pub rows: Vec<GvizRow>,
}

// Decoded with Option fields so a payload that parses but lacks the table
// structure is reported as a shape mismatch, not silently emptied.
#[derive(Debug, Deserialize)]
struct GvizEnvelope {
    table: Option<TableEnvelope>,
}

#[derive(Debug, Deserialize)]
struct TableEnvelope {
    cols: Option<Vec<GvizCol>>,
    rows: Option<Vec<GvizRow>>,
}

#[derive(Debug, Clone)]
pub struct SheetClient {
    http: Client,
}

impl Default for SheetClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetClient {
    pub fn new() -> Self {
        Self {
            http: build_client(),
        }
    }

    /// Single attempt, no retry; the shared client imposes the timeouts.
    /// Returns the raw body so the caller owns the decode step.
    pub async fn fetch_body(&self, sheet_id: &str) -> Result<String, IngestError> {
        let url = export_url(sheet_id);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| IngestError::Upstream(err.to_string()))?;

        if !response.status().is_success() {
            return Err(IngestError::Upstream(format!(
                "HTTP {}",
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|err| IngestError::Upstream(err.to_string()))
    }
}

pub fn export_url(sheet_id: &str) -> String {
    format!("{}/{}/gviz/tq?tqx=out:json", *GVIZ_ROOT, encode(sheet_id))
}

/// The gviz endpoint returns JSON wrapped in a JS callback
/// (`google.visualization.Query.setResponse({...});`), so only the first
/// brace-delimited block is parsed. A body opening with a markup tag means
/// the sheet is not published for link access.
pub fn decode_table(body: &str) -> Result<GvizTable, IngestError> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('<') {
        return Err(IngestError::NotPublic);
    }

    let blob = extract_json_blob(trimmed)
        .ok_or_else(|| IngestError::Decode("no JSON object in payload".to_string()))?;
    let envelope: GvizEnvelope =
        serde_json::from_str(blob).map_err(|err| IngestError::Decode(err.to_string()))?;

    let table = envelope.table.ok_or(IngestError::Shape("table"))?;
    let cols = table.cols.ok_or(IngestError::Shape("table.cols"))?;
    let rows = table.rows.ok_or(IngestError::Shape("table.rows"))?;
    Ok(GvizTable { cols, rows })
}

fn extract_json_blob(body: &str) -> Option<&str> {
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&body[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = concat!(
        "/*O_o*/\n",
        "google.visualization.Query.setResponse({\"version\":\"0.6\",\"reqId\":\"0\",",
        "\"status\":\"ok\",\"table\":{\"cols\":[{\"id\":\"A\",\"label\":\"ID\",\"type\":\"string\"},",
        "{\"id\":\"B\",\"label\":\"Year\",\"type\":\"number\"}],",
        "\"rows\":[{\"c\":[{\"v\":\"lot-1\"},{\"v\":2013.0,\"f\":\"2013\"}]},",
        "{\"c\":[{\"v\":\"lot-2\"},null]}]}});"
    );

    #[test]
    fn decodes_callback_wrapped_payload() {
        let table = decode_table(SAMPLE).expect("decode");
        assert_eq!(table.cols.len(), 2);
        assert_eq!(table.cols[1].label, "Year");
        assert_eq!(table.rows.len(), 2);
        assert!(table.rows[1].c[1].is_none());
    }

    #[test]
    fn markup_body_is_reported_as_not_public() {
        let err = decode_table("<html><body>sign in</body></html>").expect_err("markup");
        assert!(matches!(err, IngestError::NotPublic));
        assert_eq!(err.label(), "upstream_misconfigured");
    }

    #[test]
    fn body_without_braces_is_a_decode_failure() {
        let err = decode_table("google.visualization.Query.setResponse();").expect_err("no json");
        assert!(matches!(err, IngestError::Decode(_)));
    }

    #[test]
    fn unparseable_blob_is_a_decode_failure() {
        let err = decode_table("callback({\"table\":);").expect_err("bad json");
        assert!(matches!(err, IngestError::Decode(_)));
    }

    #[test]
    fn missing_table_structure_is_a_shape_mismatch() {
        let err = decode_table("callback({\"status\":\"ok\"});").expect_err("no table");
        assert!(matches!(err, IngestError::Shape("table")));

        let err = decode_table("callback({\"table\":{\"rows\":[]}});").expect_err("no cols");
        assert!(matches!(err, IngestError::Shape("table.cols")));

        let err = decode_table("callback({\"table\":{\"cols\":[]}});").expect_err("no rows");
        assert!(matches!(err, IngestError::Shape("table.rows")));
    }

    #[test]
    fn export_url_targets_the_gviz_json_endpoint() {
        let url = export_url("sheet-123");
        assert!(url.ends_with("/sheet-123/gviz/tq?tqx=out:json"));
    }
}
