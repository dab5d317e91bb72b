//! 시장 데이터 제공자.
//!
//! [`MarketDataSource`] 트레이트로 가격, 재무 스냅샷, 기업 정보를 한 번에 조회하고,
//! [`fetch_with_retry`]로 선형 대기 재시도를 적용합니다.

mod yahoo;

use std::time::Duration;

use async_trait::async_trait;
use equity_core::{
    decimal_from_f64, CompanyInfo, DataSettings, FundamentalsSnapshot, InvalidBarPolicy, PriceBar,
    PriceBarError,
};
use tracing::{info, warn};

use crate::error::{DataError, Result};

pub use yahoo::{parse_timeseries, ReportingPeriod, YahooMarketDataSource};

/// 한 번의 조회 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct RawBundle {
    /// 일봉 가격 (비어 있을 수 있음)
    pub prices: Vec<PriceBar>,
    /// 재무 스냅샷 (비어 있을 수 있음)
    pub fundamentals: Vec<FundamentalsSnapshot>,
    /// 기업 정보
    pub company_info: CompanyInfo,
    /// 정책에 따라 제외된 가격 바 수
    pub skipped_bars: usize,
}

/// 시장 데이터 소스.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// 소스 이름 (로그용).
    fn name(&self) -> &str;

    /// 종목의 가격, 재무 스냅샷, 기업 정보를 조회합니다.
    ///
    /// 가격이 없으면 빈 시퀀스를 반환합니다 (오류 아님).
    async fn fetch(&self, ticker: &str, period: &str) -> Result<RawBundle>;
}

/// 재시도 정책.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// 최대 시도 횟수 (1 이상)
    pub max_retries: u32,
    /// 대기 기본 단위. k번째 실패 후 `backoff * k`만큼 대기합니다.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// 설정의 `data_settings`에서 정책을 가져옵니다.
    pub fn from_settings(settings: &DataSettings) -> Self {
        Self {
            max_retries: settings.max_retries.max(1),
            backoff: settings.retry_backoff(),
        }
    }

    /// `attempt`번째 실패 후 대기 시간.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

/// 재시도를 적용해 조회합니다.
///
/// 재시도 가능한 오류만 다시 시도하며, 그 외 오류는 즉시 반환합니다.
/// 모든 시도가 실패하면 마지막 원인을 담은 [`DataError::FetchExhausted`]를 반환합니다.
pub async fn fetch_with_retry(
    source: &dyn MarketDataSource,
    ticker: &str,
    period: &str,
    policy: &RetryPolicy,
) -> Result<RawBundle> {
    let max_retries = policy.max_retries.max(1);
    let mut last_error = None;

    for attempt in 1..=max_retries {
        info!(ticker, source = source.name(), attempt, "Fetching market data");

        match source.fetch(ticker, period).await {
            Ok(bundle) => return Ok(bundle),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                if attempt < max_retries {
                    let delay = policy.delay_for(attempt);
                    warn!(
                        ticker,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "조회 실패, 재시도 대기"
                    );
                    tokio::time::sleep(delay).await;
                } else {
                    warn!(ticker, attempts = max_retries, error = %e, "조회 최종 실패");
                }
                last_error = Some(e);
            }
        }
    }

    Err(DataError::FetchExhausted {
        ticker: ticker.to_string(),
        attempts: max_retries,
        source: Box::new(
            last_error.unwrap_or_else(|| DataError::FetchError("no attempt made".to_string())),
        ),
    })
}

/// 제공자에 독립적인 일봉 원시 값.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawQuote {
    /// UNIX 타임스탬프 (초)
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: Option<f64>,
}

/// 원시 일봉을 검증된 가격 바로 변환합니다.
///
/// 불변식을 위반한 바는 `Abort` 정책이면 오류로, `Skip` 정책이면 경고 후 제외합니다.
/// 반환값은 (가격 바, 제외된 수)입니다.
pub fn build_price_bars(
    ticker: &str,
    quotes: &[RawQuote],
    policy: InvalidBarPolicy,
) -> Result<(Vec<PriceBar>, usize)> {
    let mut bars = Vec::with_capacity(quotes.len());
    let mut skipped = 0;

    for quote in quotes {
        match to_price_bar(quote) {
            Ok(bar) => bars.push(bar),
            Err(e) => match policy {
                InvalidBarPolicy::Abort => return Err(e),
                InvalidBarPolicy::Skip => {
                    warn!(ticker, error = %e, "유효하지 않은 가격 바 제외");
                    skipped += 1;
                }
            },
        }
    }

    Ok((bars, skipped))
}

fn to_price_bar(quote: &RawQuote) -> Result<PriceBar> {
    let date = chrono::DateTime::from_timestamp(quote.timestamp, 0)
        .map(|dt| dt.date_naive())
        .ok_or_else(|| DataError::InvalidData(format!("timestamp {}", quote.timestamp)))?;

    let price = |value: f64, field: &'static str| {
        decimal_from_f64(value).ok_or(PriceBarError::NonNumeric { date, field })
    };

    let bar = PriceBar::new(
        date,
        price(quote.open, "open")?,
        price(quote.high, "high")?,
        price(quote.low, "low")?,
        price(quote.close, "close")?,
        quote.volume,
    )?
    .with_adj_close(quote.adj_close.and_then(decimal_from_f64));

    Ok(bar)
}
