//! HTTP client for the prediction API plus the dataset preview used by the
//! command-line front end.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::models::{ErrorBody, Greeting, PredictionResult, WageQuery};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure or timeout talking to the service.
    #[error("could not reach the prediction API: {0}")]
    UpstreamUnavailable(#[from] reqwest::Error),

    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("could not load dataset {path}: {reason}")]
    Dataset { path: String, reason: String },
}

pub struct WageClient {
    client: reqwest::Client,
    base_url: String,
}

impl WageClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<Greeting, ClientError> {
        let resp = self.client.get(format!("{}/", self.base_url)).send().await?;
        Self::decode(resp).await
    }

    pub async fn predict(&self, query: &WageQuery) -> Result<PredictionResult, ClientError> {
        let resp = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(query)
            .send()
            .await?;
        Self::decode(resp).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.detail)
                .unwrap_or(text);
            return Err(ClientError::Api {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(resp.json().await?)
    }
}

/// First rows of the `;`-separated dataset file shown next to the predictor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetPreview {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DatasetPreview {
    pub fn load<P: AsRef<Path>>(path: P, max_rows: usize) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ClientError::Dataset {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&raw, max_rows).ok_or_else(|| ClientError::Dataset {
            path: path.display().to_string(),
            reason: "file is empty".to_string(),
        })
    }

    pub fn parse(raw: &str, max_rows: usize) -> Option<Self> {
        let mut lines = raw.lines().filter(|l| !l.trim().is_empty());
        let header = split_record(lines.next()?);
        let rows = lines.take(max_rows).map(split_record).collect();
        Some(Self { header, rows })
    }

    /// Renders the preview as an aligned text table.
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.header.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(len),
                    None => widths.push(len),
                }
            }
        }

        let line = |cells: &[String]| {
            cells
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out = line(&self.header[..]);
        out.push('\n');
        out.push_str(&"-".repeat(out.trim_end().chars().count()));
        for row in &self.rows {
            out.push('\n');
            out.push_str(&line(&row[..]));
        }
        out
    }
}

/// Splits one `;`-separated record. Quoted cells may contain `;`, and `""`
/// inside quotes is a literal quote.
fn split_record(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ';' if !quoted => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\"year\";\"age\";\"education\"\n2006;18;\"1. < HS Grad\"\n\n2004;24;\"4. College Grad\"\n2003;45;\"3. Some College\"\n";

    #[test]
    fn parse_reads_header_and_limits_rows() {
        let preview = DatasetPreview::parse(CSV, 2).unwrap();
        assert_eq!(preview.header, vec!["year", "age", "education"]);
        assert_eq!(preview.rows.len(), 2);
        assert_eq!(preview.rows[1], vec!["2004", "24", "4. College Grad"]);
    }

    #[test]
    fn quoted_cells_keep_separators() {
        assert_eq!(
            split_record(r#"2006;"Married; two kids";"say ""hi""""#),
            vec!["2006", "Married; two kids", r#"say "hi""#]
        );
        assert_eq!(split_record("a;;b"), vec!["a", "", "b"]);
    }

    #[test]
    fn parse_empty_input() {
        assert_eq!(DatasetPreview::parse("", 5), None);
        assert_eq!(DatasetPreview::parse("\n\n", 5), None);
    }

    #[test]
    fn render_aligns_columns() {
        let preview = DatasetPreview::parse("a;bb\n1;2\n333;4\n", 5).unwrap();
        let rendered = preview.render();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines[0], "a   | bb");
        assert_eq!(lines[1], "--------");
        assert_eq!(lines[2], "1   | 2");
        assert_eq!(lines[3], "333 | 4");
    }

    #[test]
    fn missing_dataset_is_reported() {
        let err = DatasetPreview::load("/nonexistent/Wage.csv", 5).unwrap_err();
        assert!(matches!(err, ClientError::Dataset { .. }));
    }

    #[test]
    fn base_url_is_normalised() {
        let client = WageClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[tokio::test]
    async fn unreachable_service_is_upstream_unavailable() {
        let client =
            WageClient::with_timeout("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = client.health().await.unwrap_err();
        assert!(matches!(err, ClientError::UpstreamUnavailable(_)));
    }
}
