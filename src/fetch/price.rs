// src/fetch/price.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

/// Latest traded price for an exchange-qualified ticker.
///
/// `Ok(None)` means the service answered but had no price for it.
#[async_trait]
pub trait PriceSource {
    async fn latest_price(&self, ticker: &str) -> Result<Option<f64>>;
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

/// Pull the last traded price out of a Yahoo chart response body.
fn last_price_from_chart(body: &str) -> Result<Option<f64>> {
    let parsed: ChartResponse =
        serde_json::from_str(body).context("decoding chart response")?;
    if let Some(err) = parsed.chart.error {
        bail!(
            "chart error {}: {}",
            err.code,
            err.description.unwrap_or_default()
        );
    }
    Ok(parsed
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .and_then(|r| r.meta.regular_market_price))
}

/// Yahoo Finance chart endpoint, one request per ticker.
pub struct YahooPriceSource {
    client: Client,
    base: Url,
}

impl YahooPriceSource {
    pub fn new(client: Client, base: &str) -> Result<Self> {
        let base = Url::parse(base).with_context(|| format!("invalid price API base {}", base))?;
        Ok(Self { client, base })
    }

    fn chart_url(&self, ticker: &str) -> Result<Url> {
        let mut url = self.base.join("/v8/finance/chart/")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("price API base cannot hold a path"))?
            .pop_if_empty()
            .push(ticker);
        url.query_pairs_mut()
            .append_pair("range", "1d")
            .append_pair("interval", "1d");
        Ok(url)
    }
}

#[async_trait]
impl PriceSource for YahooPriceSource {
    async fn latest_price(&self, ticker: &str) -> Result<Option<f64>> {
        let url = self.chart_url(ticker)?;
        debug!(%url, "price lookup");
        let resp = self
            .client
            .get(url.clone())
            .header(reqwest::header::USER_AGENT, "Mozilla/5.0")
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        // Yahoo reports unknown symbols as 404 with a chart error body
        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("reading body from {}", url))?;
        trace!(%status, bytes = body.len(), "price response");
        match last_price_from_chart(&body) {
            Ok(price) => Ok(price),
            Err(e) if !status.is_success() => Err(e.context(format!("status {}", status))),
            Err(e) => Err(e),
        }
    }
}
