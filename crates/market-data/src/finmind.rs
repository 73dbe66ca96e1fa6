//! FinMind API client.
//!
//! FinMind serves Taiwan market datasets over one GET endpoint selected
//! by a `dataset` query parameter. This client covers the three the
//! backtester needs: `TaiwanStockPrice` (daily OHLCV),
//! `TaiwanStockDividend` (cash/stock distributions), and
//! `TaiwanStockInfo` (listing table, also used for keyword search).

use backtest_core::config::FinMindConfig;
use backtest_core::types::{DividendEvent, PriceBar};
use backtest_core::{Error, MarketDataSource, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Maximum retry attempts for API calls.
const MAX_RETRIES: u32 = 3;

/// FinMind REST client.
pub struct FinMindClient {
    http_client: reqwest::Client,
    config: FinMindConfig,
    /// The full listing table is large and immutable for our purposes;
    /// it is fetched at most once per client.
    listings: OnceCell<Vec<StockListing>>,
}

/// One row of the `TaiwanStockInfo` listing table.
#[derive(Debug, Clone, Deserialize)]
pub struct StockListing {
    #[serde(rename = "stock_id")]
    pub id: String,
    #[serde(rename = "stock_name")]
    pub name: String,
}

/// FinMind's uniform response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    status: Option<u16>,
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct PriceRow {
    date: NaiveDate,
    #[serde(default)]
    open: Decimal,
    #[serde(rename = "max", default)]
    high: Decimal,
    #[serde(rename = "min", default)]
    low: Decimal,
    #[serde(default)]
    close: Decimal,
    #[serde(rename = "Trading_Volume", default)]
    volume: u64,
}

#[derive(Debug, Deserialize)]
struct DividendRow {
    date: NaiveDate,
    #[serde(rename = "CashEarningsDistribution", default)]
    cash_per_share: Decimal,
    #[serde(rename = "StockEarningsDistribution", default)]
    stock_per_10: Decimal,
}

impl FinMindClient {
    pub fn new(config: FinMindConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http_client,
            config,
            listings: OnceCell::new(),
        }
    }

    /// Display name of one listing, when FinMind knows it.
    pub async fn stock_name(&self, symbol: &str) -> Result<Option<String>> {
        let rows: Vec<StockListing> = self.fetch("TaiwanStockInfo", Some(symbol), None).await?;
        Ok(rows.into_iter().next().map(|row| row.name))
    }

    /// Resolve a keyword to a listing: exact name first, then partial
    /// name, then exact id. Backed by the cached full listing table.
    pub async fn resolve(&self, keyword: &str) -> Result<StockListing> {
        let listings = self
            .listings
            .get_or_try_init(|| async {
                let rows: Vec<StockListing> =
                    self.fetch("TaiwanStockInfo", None, None).await?;
                debug!(listings = rows.len(), "Cached FinMind listing table");
                Ok::<_, Error>(rows)
            })
            .await?;

        match_listing(listings, keyword)
            .cloned()
            .ok_or_else(|| Error::SymbolNotFound {
                query: keyword.to_string(),
            })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        dataset: &str,
        data_id: Option<&str>,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<T>> {
        let mut params: Vec<(&str, String)> = vec![("dataset", dataset.to_string())];
        if let Some(id) = data_id {
            params.push(("data_id", id.to_string()));
        }
        if let Some((start, end)) = range {
            params.push(("start_date", start.to_string()));
            params.push(("end_date", end.to_string()));
        }
        if let Some(token) = &self.config.token {
            params.push(("token", token.clone()));
        }

        let response = self.get_with_retry(&params).await?;
        let envelope: Envelope<T> = response.json().await?;

        // FinMind reports dataset-level failures inside a 200 response.
        if let Some(status) = envelope.status {
            if status != 200 {
                return Err(Error::Api {
                    message: envelope
                        .msg
                        .unwrap_or_else(|| format!("FinMind dataset error ({dataset})")),
                    status: Some(status),
                });
            }
        }
        Ok(envelope.data)
    }

    /// Execute the GET with retry on 5xx and 429 responses. Other 4xx
    /// errors fail immediately.
    async fn get_with_retry(&self, params: &[(&str, String)]) -> Result<reqwest::Response> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            let result = self
                .http_client
                .get(&self.config.api_url)
                .query(params)
                .send()
                .await;
            match result {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response)
                    if response.status().as_u16() == 429
                        || response.status().is_server_error() =>
                {
                    let status = response.status();
                    warn!(
                        attempt = attempt + 1,
                        status = %status,
                        "Retryable FinMind error, backing off"
                    );
                    last_error = Some(Error::Api {
                        message: format!("FinMind returned {status}"),
                        status: Some(status.as_u16()),
                    });
                    if attempt + 1 < MAX_RETRIES {
                        tokio::time::sleep(Duration::from_millis(500 * 2u64.pow(attempt))).await;
                    }
                }
                Ok(response) => {
                    return Err(Error::Api {
                        message: format!("FinMind returned {}", response.status()),
                        status: Some(response.status().as_u16()),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_error.unwrap_or(Error::Api {
            message: "FinMind request failed".to_string(),
            status: None,
        }))
    }
}

#[async_trait]
impl MarketDataSource for FinMindClient {
    async fn price_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        let rows: Vec<PriceRow> = self
            .fetch("TaiwanStockPrice", Some(symbol), Some((start, end)))
            .await?;
        let mut bars: Vec<PriceBar> = rows.into_iter().map(PriceBar::from).collect();
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    /// Dividends are best-effort: a transport failure degrades to an
    /// empty list so a price-only simulation can still run.
    async fn dividends(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DividendEvent>> {
        let rows: Result<Vec<DividendRow>> = self
            .fetch("TaiwanStockDividend", Some(symbol), Some((start, end)))
            .await;
        match rows {
            Ok(rows) => {
                let mut dividends: Vec<DividendEvent> =
                    rows.into_iter().map(DividendEvent::from).collect();
                dividends.sort_by_key(|d| d.date);
                Ok(dividends)
            }
            Err(e) => {
                warn!(symbol, error = %e, "Dividend fetch failed, continuing without dividends");
                Ok(vec![])
            }
        }
    }
}

impl From<PriceRow> for PriceBar {
    fn from(row: PriceRow) -> Self {
        Self {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

impl From<DividendRow> for DividendEvent {
    fn from(row: DividendRow) -> Self {
        Self {
            date: row.date,
            cash_per_share: row.cash_per_share,
            stock_per_10: row.stock_per_10,
        }
    }
}

fn match_listing<'a>(listings: &'a [StockListing], keyword: &str) -> Option<&'a StockListing> {
    let keyword = keyword.trim();
    listings
        .iter()
        .find(|l| l.name == keyword)
        .or_else(|| listings.iter().find(|l| l.name.contains(keyword)))
        .or_else(|| listings.iter().find(|l| l.id == keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_row_maps_finmind_fields() {
        let json = r#"{
            "msg": "success",
            "status": 200,
            "data": [
                {
                    "date": "2024-03-05",
                    "stock_id": "2330",
                    "Trading_Volume": 31415926,
                    "Trading_money": 1000,
                    "open": 735.0,
                    "max": 742.0,
                    "min": 730.0,
                    "close": 740.0,
                    "spread": 5.0,
                    "trading_turnover": 12345
                }
            ]
        }"#;

        let envelope: Envelope<PriceRow> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status, Some(200));
        let bar = PriceBar::from(envelope.data.into_iter().next().unwrap());

        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(bar.high, Decimal::from(742));
        assert_eq!(bar.low, Decimal::from(730));
        assert_eq!(bar.volume, 31_415_926);
    }

    #[test]
    fn test_dividend_row_missing_fields_default_to_zero() {
        let json = r#"{
            "data": [
                { "date": "2024-07-18", "stock_id": "2330", "CashEarningsDistribution": 3.5 }
            ]
        }"#;

        let envelope: Envelope<DividendRow> = serde_json::from_str(json).unwrap();
        let dividend = DividendEvent::from(envelope.data.into_iter().next().unwrap());

        assert_eq!(dividend.cash_per_share, Decimal::new(35, 1));
        assert_eq!(dividend.stock_per_10, Decimal::ZERO);
    }

    #[test]
    fn test_empty_envelope_data_defaults() {
        let envelope: Envelope<PriceRow> = serde_json::from_str("{}").unwrap();
        assert!(envelope.data.is_empty());
        assert!(envelope.status.is_none());
    }

    #[test]
    fn test_match_listing_prefers_exact_name() {
        let listings = vec![
            StockListing {
                id: "2330".to_string(),
                name: "台積電".to_string(),
            },
            StockListing {
                id: "2352".to_string(),
                name: "佳世達".to_string(),
            },
        ];

        assert_eq!(match_listing(&listings, "台積電").unwrap().id, "2330");
        // Partial name falls back to the first containing match
        assert_eq!(match_listing(&listings, "佳世").unwrap().id, "2352");
        // Exact id match comes last
        assert_eq!(match_listing(&listings, "2352").unwrap().name, "佳世達");
        assert!(match_listing(&listings, "0050").is_none());
    }
}
