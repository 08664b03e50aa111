use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::CitiesConfig;
use crate::error::{AppError, Result};
use crate::loader::PageRequest;
use crate::types::CityRecord;

/// Anything that can answer a paged city search.
#[async_trait]
pub trait CitySource: Send + Sync + std::fmt::Debug {
    async fn search(&self, request: &PageRequest) -> Result<Vec<CityRecord>>;
}

/// Opendatasoft records search (`/api/records/1.0/search/`)
pub struct OpenDataSoft {
    client: Client,
    base_url: String,
    dataset: String,
}

impl std::fmt::Debug for OpenDataSoft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenDataSoft")
            .field("dataset", &self.dataset)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct OdsResponse {
    records: Vec<OdsRecord>,
}

#[derive(Deserialize)]
struct OdsRecord {
    fields: CityRecord,
}

impl OpenDataSoft {
    pub fn new(config: &CitiesConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            dataset: config.dataset.clone(),
        })
    }

    fn query_params(&self, request: &PageRequest) -> Vec<(&'static str, String)> {
        vec![
            ("dataset", self.dataset.clone()),
            ("q", request.query.clone()),
            ("start", request.start.to_string()),
            ("rows", request.rows.to_string()),
        ]
    }
}

fn parse_records(body: &str) -> Result<Vec<CityRecord>> {
    let response: OdsResponse = serde_json::from_str(body)?;
    Ok(response.records.into_iter().map(|r| r.fields).collect())
}

#[async_trait]
impl CitySource for OpenDataSoft {
    async fn search(&self, request: &PageRequest) -> Result<Vec<CityRecord>> {
        tracing::debug!(query = %request.query, start = request.start, "searching cities");

        let response = self
            .client
            .get(&self.base_url)
            .query(&self.query_params(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Transport(format!(
                "City search {}: {}",
                status,
                truncate_body(&body)
            )));
        }

        parse_records(&body)
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_records_extracts_fields() {
        let body = r#"{
            "nhits": 2,
            "records": [
                {"recordid": "a1", "fields": {"name": "London", "cou_name_en": "United Kingdom", "timezone": "Europe/London", "population": 8961989}},
                {"recordid": "a2", "fields": {"name": "London", "cou_name_en": "Canada", "timezone": "America/Toronto"}}
            ]
        }"#;
        let cities = parse_records(body).unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[0].country, "United Kingdom");
        assert_eq!(cities[1].timezone, "America/Toronto");
        assert!(cities[0].extra.contains_key("population"));
    }

    #[test]
    fn parse_records_empty_page() {
        let cities = parse_records(r#"{"records": []}"#).unwrap();
        assert!(cities.is_empty());
    }

    #[test]
    fn parse_records_rejects_unexpected_shape() {
        let err = parse_records(r#"{"error": "Unknown dataset"}"#).unwrap_err();
        assert!(matches!(err, AppError::Malformed(_)));
    }

    #[test]
    fn query_params_carry_paging() {
        let source = OpenDataSoft::new(&CitiesConfig::default(), Duration::from_secs(1)).unwrap();
        let params = source.query_params(&PageRequest {
            query: "lon".to_string(),
            start: 20,
            rows: 20,
        });
        assert_eq!(
            params,
            vec![
                ("dataset", "geonames-all-cities-with-a-population-1000".to_string()),
                ("q", "lon".to_string()),
                ("start", "20".to_string()),
                ("rows", "20".to_string()),
            ]
        );
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(250);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
