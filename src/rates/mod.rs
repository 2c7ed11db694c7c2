//! Benchmark (CDI) rate lookup.
//!
//! The engine never fetches anything itself: the host fetches once through a
//! [`RateProvider`], keeps the [`BenchmarkRate`] snapshot, and passes the number
//! into the calculators. A failed fetch is a value, not an error.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::{CalcError, Field, ValidationError, parse_decimal};

/// SGS series 4389: CDI, annualized on a 252-day basis, latest observation.
pub const SGS_CDI_ANNUAL_URL: &str =
    "https://api.bcb.gov.br/dados/serie/bcdata.sgs.4389/dados/ultimos/1?formato=json";

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum BenchmarkRate {
    #[serde(rename_all = "camelCase")]
    Available {
        /// Annual rate in percent, `13.65` meaning 13.65% a year.
        percent: f64,
        reference_date: Option<String>,
    },
    Unavailable { reason: String },
}

impl BenchmarkRate {
    pub fn manual(percent: f64) -> Self {
        BenchmarkRate::Available {
            percent,
            reference_date: None,
        }
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            BenchmarkRate::Available { percent, .. } => Some(*percent),
            BenchmarkRate::Unavailable { .. } => None,
        }
    }

    /// A caller-supplied rate wins; otherwise the snapshot, otherwise
    /// `RateUnavailable`. Never falls back to zero.
    pub fn resolve(&self, override_percent: Option<f64>) -> Result<f64, CalcError> {
        if let Some(percent) = override_percent {
            if !percent.is_finite() {
                return Err(ValidationError::NotFinite(Field::BenchmarkRate).into());
            }
            if percent < 0.0 {
                return Err(ValidationError::Negative(Field::BenchmarkRate).into());
            }
            return Ok(percent);
        }
        match self {
            BenchmarkRate::Available { percent, .. } => Ok(*percent),
            BenchmarkRate::Unavailable { reason } => Err(CalcError::RateUnavailable(reason.clone())),
        }
    }
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch_benchmark_rate(&self) -> BenchmarkRate;
}

/// Always returns the configured rate. Used for manual overrides.
#[derive(Debug, Clone, Copy)]
pub struct FixedRateProvider {
    percent: f64,
}

impl FixedRateProvider {
    pub fn new(percent: f64) -> Self {
        Self { percent }
    }
}

#[async_trait]
impl RateProvider for FixedRateProvider {
    async fn fetch_benchmark_rate(&self) -> BenchmarkRate {
        BenchmarkRate::manual(self.percent)
    }
}

#[derive(Debug, Clone)]
pub struct UnavailableRateProvider {
    reason: String,
}

impl UnavailableRateProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl RateProvider for UnavailableRateProvider {
    async fn fetch_benchmark_rate(&self) -> BenchmarkRate {
        BenchmarkRate::Unavailable {
            reason: self.reason.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RateFetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("response contained no observations")]
    Empty,
    #[error("unusable rate value {0:?}")]
    BadValue(String),
}

/// Central bank SGS time-series endpoint.
#[derive(Debug, Clone)]
pub struct SgsRateProvider {
    client: reqwest::Client,
    url: String,
}

impl SgsRateProvider {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn try_fetch(&self) -> Result<BenchmarkRate, RateFetchError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RateFetchError::Status(status));
        }
        let body = response.text().await?;
        parse_sgs_body(&body)
    }
}

#[async_trait]
impl RateProvider for SgsRateProvider {
    async fn fetch_benchmark_rate(&self) -> BenchmarkRate {
        debug!(url = %self.url, "fetching benchmark rate");
        match self.try_fetch().await {
            Ok(rate) => {
                info!(?rate, "benchmark rate fetched");
                rate
            }
            Err(err) => {
                warn!(url = %self.url, error = %err, "benchmark rate unavailable");
                BenchmarkRate::Unavailable {
                    reason: err.to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SgsRecord {
    data: Option<String>,
    valor: SgsValue,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SgsValue {
    Number(f64),
    Text(String),
}

/// Parses an SGS body: `[{"data": "dd/mm/yyyy", "valor": "13.65"}, ...]`.
/// The most recent (last) observation wins.
pub fn parse_sgs_body(body: &str) -> Result<BenchmarkRate, RateFetchError> {
    let records: Vec<SgsRecord> = serde_json::from_str(body)?;
    let latest = records.into_iter().last().ok_or(RateFetchError::Empty)?;
    let percent = match latest.valor {
        SgsValue::Number(value) => value,
        SgsValue::Text(text) => {
            parse_decimal(&text).ok_or_else(|| RateFetchError::BadValue(text.clone()))?
        }
    };
    if !percent.is_finite() || percent < 0.0 {
        return Err(RateFetchError::BadValue(percent.to_string()));
    }
    Ok(BenchmarkRate::Available {
        percent,
        reference_date: latest.data,
    })
}
