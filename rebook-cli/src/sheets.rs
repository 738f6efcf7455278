//! Google Sheets v4 `values` endpoints behind the row source/sink traits.

use anyhow::{Context, Result, anyhow, bail};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use rebook_core::{LedgerRow, TransactionRecord};
use rebook_ingest::{RangeSpec, RecordSink, RowSource, merge_renderings};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueUpdate {
    range: String,
    major_dimension: &'static str,
    values: Vec<Vec<String>>,
}

/// Cell JSON as the text the sheet shows.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    token: String,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn new(token: impl Into<String>, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    fn values_url(&self, range: &RangeSpec) -> Result<Url> {
        let mut url = Url::parse(SHEETS_API)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("invalid Sheets API url"))?
            .extend([self.spreadsheet_id.as_str(), "values", range.to_string().as_str()]);
        Ok(url)
    }

    /// One rendering of a range: `FORMATTED_VALUE` or `FORMULA`.
    async fn get_values(&self, range: &RangeSpec, render: &str) -> Result<Vec<Vec<String>>> {
        let resp = self
            .http
            .get(self.values_url(range)?)
            .bearer_auth(&self.token)
            .query(&[("valueRenderOption", render), ("majorDimension", "ROWS")])
            .send()
            .await
            .with_context(|| format!("sheets request {range}"))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("sheets error: {status} {txt}");
        }

        let out: ValueRange = resp.json().await.context("parse sheets response")?;
        Ok(out
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }
}

impl RowSource for SheetsClient {
    async fn fetch(&self, range: &RangeSpec) -> Result<Vec<LedgerRow>> {
        let formatted = self.get_values(range, "FORMATTED_VALUE").await?;
        let formula = self.get_values(range, "FORMULA").await?;
        if formatted.len() != formula.len() {
            tracing::warn!(
                formatted = formatted.len(),
                formula = formula.len(),
                "renderings returned different row counts"
            );
        }
        Ok(merge_renderings(&formatted, &formula, range.width()))
    }
}

impl RecordSink for SheetsClient {
    /// Values starting with `=` are entered as formulas.
    async fn write(&mut self, range: &RangeSpec, records: &[TransactionRecord]) -> Result<()> {
        let body = ValueUpdate {
            range: range.to_string(),
            major_dimension: "ROWS",
            values: records.iter().map(TransactionRecord::to_row).collect(),
        };

        let resp = self
            .http
            .put(self.values_url(range)?)
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&body)
            .send()
            .await
            .with_context(|| format!("sheets update {range}"))?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("sheets error: {status} {txt}");
        }
        Ok(())
    }
}
