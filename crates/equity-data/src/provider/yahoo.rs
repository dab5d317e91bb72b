//! Yahoo Finance 데이터 소스.
//!
//! - 가격: `yahoo_finance_api`의 `get_quote_range` (일봉)
//! - 재무: fundamentals-timeseries 엔드포인트 (분기, 없으면 연간)
//! - 기업 정보: `get_ticker_info` (시가총액, 통화)
//!
//! 재무와 기업 정보 조회 실패는 경고 후 빈 값으로 대체합니다.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use equity_core::{decimal_from_f64, CompanyInfo, FundamentalsSnapshot, InvalidBarPolicy, PriceBar};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{build_price_bars, MarketDataSource, RawBundle, RawQuote};
use crate::error::{DataError, Result};

/// fundamentals-timeseries 기본 URL.
const DEFAULT_TIMESERIES_URL: &str =
    "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";

/// 재무 시계열 조회 시작 시점 (2000-01-01 UTC).
const TIMESERIES_PERIOD_START: i64 = 946_684_800;

/// 조회하는 재무 항목.
const BALANCE_SHEET_FIELDS: [&str; 7] = [
    "TotalAssets",
    "StockholdersEquity",
    "CashAndCashEquivalents",
    "CurrentDebt",
    "LongTermDebt",
    "TotalDebt",
    "OrdinarySharesNumber",
];

/// 재무제표 보고 주기.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingPeriod {
    Quarterly,
    Annual,
}

impl ReportingPeriod {
    fn prefix(&self) -> &'static str {
        match self {
            ReportingPeriod::Quarterly => "quarterly",
            ReportingPeriod::Annual => "annual",
        }
    }
}

/// Yahoo Finance 데이터 소스.
pub struct YahooMarketDataSource {
    /// `get_ticker_info`가 `&mut self`를 요구하므로 Mutex로 감쌉니다.
    connector: Mutex<yahoo_finance_api::YahooConnector>,
    http: reqwest::Client,
    timeseries_url: String,
    invalid_bar_policy: InvalidBarPolicy,
}

impl YahooMarketDataSource {
    /// 새 데이터 소스를 생성합니다.
    pub fn new() -> Result<Self> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| DataError::ConnectionError(format!("Yahoo Finance 연결 실패: {}", e)))?;
        let http = reqwest::Client::builder()
            .user_agent("Mozilla/5.0")
            .build()
            .map_err(|e| DataError::ConnectionError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            connector: Mutex::new(connector),
            http,
            timeseries_url: DEFAULT_TIMESERIES_URL.to_string(),
            invalid_bar_policy: InvalidBarPolicy::default(),
        })
    }

    /// 유효하지 않은 가격 바 처리 정책을 설정합니다.
    pub fn with_invalid_bar_policy(mut self, policy: InvalidBarPolicy) -> Self {
        self.invalid_bar_policy = policy;
        self
    }

    /// 재무 시계열 엔드포인트 URL을 변경합니다.
    pub fn with_timeseries_url(mut self, url: impl Into<String>) -> Self {
        self.timeseries_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// 일봉 가격을 조회합니다. 반환값은 (가격 바, 제외된 수)입니다.
    async fn fetch_prices(&self, ticker: &str, period: &str) -> Result<(Vec<PriceBar>, usize)> {
        let response = {
            let connector = self.connector.lock().await;
            connector
                .get_quote_range(ticker, "1d", period)
                .await
                .map_err(|e| DataError::FetchError(format!("가격 조회 실패 ({}): {}", ticker, e)))?
        };

        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!(ticker, error = %e, "가격 데이터 없음");
                return Ok((Vec::new(), 0));
            }
        };

        let raw: Vec<RawQuote> = quotes
            .iter()
            .map(|q| RawQuote {
                timestamp: q.timestamp as i64,
                open: q.open,
                high: q.high,
                low: q.low,
                close: q.close,
                volume: q.volume,
                adj_close: Some(q.adjclose),
            })
            .collect();

        build_price_bars(ticker, &raw, self.invalid_bar_policy)
    }

    /// 재무 스냅샷을 조회합니다.
    ///
    /// 분기 데이터가 없으면 연간 데이터를 사용하며, 실패하면 빈 시퀀스를 반환합니다.
    pub async fn fetch_fundamentals(&self, ticker: &str) -> Vec<FundamentalsSnapshot> {
        for period in [ReportingPeriod::Quarterly, ReportingPeriod::Annual] {
            match self.fetch_timeseries(ticker, period).await {
                Ok(snapshots) if !snapshots.is_empty() => {
                    debug!(ticker, ?period, count = snapshots.len(), "재무 스냅샷 조회 완료");
                    return snapshots;
                }
                Ok(_) => debug!(ticker, ?period, "재무 데이터 없음"),
                Err(e) => warn!(ticker, ?period, error = %e, "재무 데이터 조회 실패"),
            }
        }
        Vec::new()
    }

    async fn fetch_timeseries(
        &self,
        ticker: &str,
        period: ReportingPeriod,
    ) -> Result<Vec<FundamentalsSnapshot>> {
        let types: Vec<String> = BALANCE_SHEET_FIELDS
            .iter()
            .map(|field| format!("{}{}", period.prefix(), field))
            .collect();
        let url = format!(
            "{}/{}?symbol={}&type={}&period1={}&period2={}",
            self.timeseries_url,
            ticker,
            ticker,
            types.join(","),
            TIMESERIES_PERIOD_START,
            Utc::now().timestamp()
        );

        let body: Value = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(parse_timeseries(&body, period))
    }

    /// 기업 정보를 조회합니다. 실패하면 시가총액이 없는 정보를 반환합니다.
    pub async fn fetch_company_info(&self, ticker: &str) -> CompanyInfo {
        match self.fetch_ticker_info(ticker).await {
            Ok(info) => info,
            Err(e) => {
                warn!(ticker, error = %e, "기업 정보 조회 실패, 시가총액 없이 진행");
                CompanyInfo::new(ticker)
            }
        }
    }

    async fn fetch_ticker_info(&self, ticker: &str) -> Result<CompanyInfo> {
        let summary = {
            let mut connector = self.connector.lock().await;
            connector
                .get_ticker_info(ticker)
                .await
                .map_err(|e| DataError::FetchError(format!("기업 정보 조회 실패 ({}): {}", ticker, e)))?
        };

        let result = summary
            .quote_summary
            .and_then(|qs| qs.result)
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| DataError::FetchError(format!("기업 정보 결과 없음: {}", ticker)))?;

        let market_cap = result.summary_detail.as_ref().and_then(|sd| sd.market_cap);
        let currency = result
            .financial_data
            .as_ref()
            .and_then(|fd| fd.financial_currency.clone());
        let shares_outstanding = result
            .default_key_statistics
            .as_ref()
            .and_then(|ks| ks.shares_outstanding)
            .map(Value::from);
        let name = result
            .quote_type
            .as_ref()
            .and_then(|qt| qt.long_name.clone().or(qt.short_name.clone()));

        let raw = company_raw_attributes(market_cap, currency.as_deref(), shares_outstanding, name);

        Ok(CompanyInfo {
            ticker: ticker.to_string(),
            market_cap: market_cap.map(Decimal::from),
            currency,
            raw,
        })
    }
}

/// 기업 정보 원본 항목. 수치는 JSON 숫자로 보관합니다.
fn company_raw_attributes(
    market_cap: Option<u64>,
    currency: Option<&str>,
    shares_outstanding: Option<Value>,
    name: Option<String>,
) -> Map<String, Value> {
    let mut raw = Map::new();
    if let Some(v) = market_cap {
        raw.insert("marketCap".to_string(), Value::from(v));
    }
    if let Some(v) = currency {
        raw.insert("currency".to_string(), Value::from(v));
    }
    if let Some(v) = shares_outstanding {
        raw.insert("sharesOutstanding".to_string(), v);
    }
    if let Some(v) = name {
        raw.insert("name".to_string(), Value::from(v));
    }
    raw
}

#[async_trait]
impl MarketDataSource for YahooMarketDataSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, ticker: &str, period: &str) -> Result<RawBundle> {
        let (prices, skipped_bars) = self.fetch_prices(ticker, period).await?;
        let fundamentals = self.fetch_fundamentals(ticker).await;
        let company_info = self.fetch_company_info(ticker).await;

        info!(
            ticker,
            prices = prices.len(),
            fundamentals = fundamentals.len(),
            market_cap = ?company_info.market_cap,
            "Yahoo Finance 조회 완료"
        );

        Ok(RawBundle {
            prices,
            fundamentals,
            company_info,
            skipped_bars,
        })
    }
}

/// fundamentals-timeseries 응답을 `asOfDate` 기준 스냅샷으로 묶습니다.
///
/// 결과는 분기말 오름차순입니다. 원본 값은 접두사를 뗀 항목명으로 `raw`에 보존됩니다.
pub fn parse_timeseries(body: &Value, period: ReportingPeriod) -> Vec<FundamentalsSnapshot> {
    let mut by_date: BTreeMap<NaiveDate, FundamentalsSnapshot> = BTreeMap::new();

    let results = body
        .pointer("/timeseries/result")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for result in results {
        let Some(type_name) = result.pointer("/meta/type/0").and_then(Value::as_str) else {
            continue;
        };
        let Some(field) = type_name.strip_prefix(period.prefix()) else {
            continue;
        };
        let Some(points) = result.get(type_name).and_then(Value::as_array) else {
            continue;
        };

        for point in points {
            let Some(date) = point
                .get("asOfDate")
                .and_then(Value::as_str)
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            else {
                continue;
            };
            let Some(raw_value) = point.pointer("/reportedValue/raw") else {
                continue;
            };
            let Some(value) = json_decimal(raw_value) else {
                continue;
            };

            let snapshot = by_date
                .entry(date)
                .or_insert_with(|| FundamentalsSnapshot::new(date));
            snapshot.raw.insert(field.to_string(), raw_value.clone());
            apply_field(snapshot, field, value);
        }
    }

    by_date.into_values().collect()
}

fn json_decimal(value: &Value) -> Option<Decimal> {
    match value.as_i64() {
        Some(i) => Some(Decimal::from(i)),
        None => value.as_f64().and_then(decimal_from_f64),
    }
}

fn apply_field(snapshot: &mut FundamentalsSnapshot, field: &str, value: Decimal) {
    match field {
        "TotalAssets" => snapshot.total_assets = Some(value),
        "StockholdersEquity" => snapshot.total_equity = Some(value),
        "CashAndCashEquivalents" => snapshot.cash_and_equivalents = Some(value),
        "CurrentDebt" => snapshot.short_term_debt = Some(value),
        "LongTermDebt" => snapshot.long_term_debt = Some(value),
        "TotalDebt" => snapshot.total_debt = Some(value),
        "OrdinarySharesNumber" => snapshot.shares_outstanding = Some(value),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_company_raw_attributes_keep_numbers() {
        let raw = company_raw_attributes(
            Some(2_500_000_000_000),
            Some("USD"),
            Some(Value::from(15_000_000_000u64)),
            Some("Apple Inc.".to_string()),
        );

        assert_eq!(raw["marketCap"], json!(2_500_000_000_000u64));
        assert!(raw["marketCap"].is_number());
        assert!(raw["sharesOutstanding"].is_number());
        assert_eq!(raw["currency"], "USD");
        assert_eq!(raw["name"], "Apple Inc.");
    }

    #[test]
    fn test_company_raw_attributes_skip_missing() {
        let raw = company_raw_attributes(None, None, None, None);
        assert!(raw.is_empty());
    }

    fn series(type_name: &str, points: Value) -> Value {
        let mut entry = json!({
            "meta": { "symbol": ["AAPL"], "type": [type_name] },
            "timestamp": [1695945600, 1703980800],
        });
        entry[type_name] = points;
        entry
    }

    fn point(date: &str, raw: Value) -> Value {
        json!({
            "asOfDate": date,
            "periodType": "3M",
            "currencyCode": "USD",
            "reportedValue": { "raw": raw, "fmt": "-" }
        })
    }

    #[test]
    fn test_parse_groups_by_as_of_date() {
        let body = json!({
            "timeseries": {
                "result": [
                    series("quarterlyStockholdersEquity", json!([
                        point("2023-12-31", json!(74100000000i64)),
                        point("2023-09-30", json!(62146000000i64)),
                    ])),
                    series("quarterlyOrdinarySharesNumber", json!([
                        null,
                        point("2023-12-31", json!(15441881000i64)),
                    ])),
                ],
                "error": null
            }
        });

        let snapshots = parse_timeseries(&body, ReportingPeriod::Quarterly);

        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].quarter_end, NaiveDate::from_ymd_opt(2023, 9, 30).unwrap());
        assert_eq!(snapshots[0].total_equity, Some(Decimal::from(62_146_000_000i64)));
        assert_eq!(snapshots[0].shares_outstanding, None);
        assert_eq!(snapshots[1].shares_outstanding, Some(Decimal::from(15_441_881_000i64)));
        assert!(snapshots[1].raw.contains_key("OrdinarySharesNumber"));
    }

    #[test]
    fn test_parse_ignores_other_period_prefix() {
        let body = json!({
            "timeseries": {
                "result": [series("annualTotalAssets", json!([point("2023-09-30", json!(1))]))]
            }
        });

        assert!(parse_timeseries(&body, ReportingPeriod::Quarterly).is_empty());
        assert_eq!(parse_timeseries(&body, ReportingPeriod::Annual).len(), 1);
    }

    #[test]
    fn test_parse_float_values_and_garbage() {
        let body = json!({
            "timeseries": {
                "result": [
                    series("quarterlyCashAndCashEquivalents", json!([point("2024-03-31", json!(2.5e10))])),
                    { "meta": {} },
                ]
            }
        });

        let snapshots = parse_timeseries(&body, ReportingPeriod::Quarterly);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].cash_and_equivalents, Some(Decimal::from(25_000_000_000i64)));

        assert!(parse_timeseries(&json!({}), ReportingPeriod::Quarterly).is_empty());
    }
}
