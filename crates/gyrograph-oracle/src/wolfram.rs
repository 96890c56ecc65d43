//! Wolfram|Alpha v2 query API client.
//!
//! Sends `GET <endpoint>?appid=..&input=..&format=plaintext&output=json` and
//! reads the first numeric plaintext among the result pods.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::{OracleError, OracleResult};
use crate::query::{OracleAnswer, OracleQuery};
use crate::service::ComputationalOracle;

pub const DEFAULT_ENDPOINT: &str = "https://api.wolframalpha.com/v2/query";

/// Pods searched first for a numeric answer, in order.
const PREFERRED_PODS: [&str; 4] = ["Decimal approximation", "Result", "Decimal form", "Value"];

/// Pods that echo the input.
const INPUT_PODS: [&str; 2] = ["Input", "Input interpretation"];

#[derive(Debug, Deserialize)]
struct Envelope {
    queryresult: QueryResult,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    success: bool,
    #[serde(default)]
    error: serde_json::Value,
    #[serde(default)]
    pods: Vec<Pod>,
}

#[derive(Debug, Deserialize)]
struct Pod {
    #[serde(default)]
    title: String,
    #[serde(default)]
    subpods: Vec<Subpod>,
}

#[derive(Debug, Deserialize)]
struct Subpod {
    #[serde(default)]
    plaintext: Option<String>,
}

#[derive(Debug, Clone)]
pub struct WolframAlphaOracle {
    client: Client,
    app_id: String,
    endpoint: String,
}

impl WolframAlphaOracle {
    /// # Errors
    /// `NotConfigured` if `app_id` is empty.
    pub fn new(app_id: impl Into<String>) -> OracleResult<Self> {
        let app_id = app_id.into();
        if app_id.trim().is_empty() {
            return Err(OracleError::NotConfigured(
                "Wolfram|Alpha app id is empty".to_string(),
            ));
        }
        Ok(Self {
            client: Client::new(),
            app_id,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl ComputationalOracle for WolframAlphaOracle {
    fn name(&self) -> &str {
        "wolfram-alpha"
    }

    async fn query(&self, query: &OracleQuery) -> OracleResult<OracleAnswer> {
        let input = query.text();
        debug!(endpoint = %self.endpoint, input = %input, "Querying Wolfram|Alpha");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("appid", self.app_id.as_str()),
                ("input", input.as_str()),
                ("format", "plaintext"),
                ("output", "json"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OracleError::Http {
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let value = extract_value(&body)?;
        if query.expected.admits(value) {
            Ok(OracleAnswer::value(value))
        } else {
            Ok(OracleAnswer::rejected(format!(
                "answer {value} is not of type {:?}",
                query.expected
            )))
        }
    }
}

/// Numeric answer of a v2 JSON response body.
fn extract_value(body: &str) -> OracleResult<f64> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| OracleError::MalformedAnswer(format!("invalid JSON: {e}")))?;
    let result = envelope.queryresult;

    if !result.success {
        let detail = match &result.error {
            serde_json::Value::Object(map) => map
                .get("msg")
                .and_then(|m| m.as_str())
                .unwrap_or("query failed")
                .to_string(),
            _ => "no interpretation".to_string(),
        };
        return Err(OracleError::Uninterpretable(detail));
    }

    let plaintexts = |pod: &Pod| -> Vec<String> {
        pod.subpods
            .iter()
            .filter_map(|s| s.plaintext.clone())
            .collect()
    };

    for title in PREFERRED_PODS {
        if let Some(pod) = result.pods.iter().find(|p| p.title == title) {
            if let Some(value) = plaintexts(pod).iter().find_map(|t| parse_plaintext_number(t)) {
                return Ok(value);
            }
        }
    }
    result
        .pods
        .iter()
        .filter(|p| !INPUT_PODS.contains(&p.title.as_str()))
        .flat_map(plaintexts)
        .find_map(|t| parse_plaintext_number(&t))
        .ok_or_else(|| OracleError::MalformedAnswer("no numeric result pod".to_string()))
}

/// Parse Wolfram plaintext such as `0.5493061443...`, `-1.2×10^-6` or
/// `log(3)/2≈0.549306`.
fn parse_plaintext_number(text: &str) -> Option<f64> {
    let text = text.rsplit('≈').next().unwrap_or(text);
    let cleaned: String = text
        .trim()
        .trim_end_matches("...")
        .replace('−', "-")
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();

    let value: f64 = match cleaned.split_once("×10^") {
        Some((mantissa, exponent)) => {
            let mantissa: f64 = mantissa.parse().ok()?;
            let exponent: i32 = exponent.trim_matches(|ch| ch == '(' || ch == ')').parse().ok()?;
            mantissa * 10f64.powi(exponent)
        }
        None => cleaned.parse().ok()?,
    };
    value.is_finite().then_some(value)
}
