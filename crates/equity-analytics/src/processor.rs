//! 병합 및 지표 계산 엔진.
//!
//! 1. 가격과 재무 스냅샷을 날짜순으로 정렬 (안정 정렬)
//! 2. 각 거래일에 그 날짜 이전(같은 날 포함) 가장 최근 스냅샷을 연결 (as-of 병합)
//! 3. 종가 단기/장기 이동평균, 고가 롤링 최대값 계산
//! 4. 행마다 BVPS, PBR, EV 계산
//!
//! 엔진은 실행 하나의 작업 집합만 소유하며 내부 상태를 공유하지 않습니다.

use std::sync::Arc;

use chrono::NaiveDate;
use equity_core::{CompanyInfo, DataSettings, FundamentalsSnapshot, PriceBar, ProcessedRow};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::indicators::{IndicatorError, TrendIndicators, WindowParams};
use crate::valuation;

/// 처리 오류.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    /// 병합할 가격 데이터가 없음
    #[error("가격 시계열이 비어 있습니다")]
    EmptyPriceSeries,

    /// 지표 계산 실패
    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

/// 엔진 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorParams {
    /// 단기 이동평균 윈도우
    pub sma_short_window: usize,
    /// 장기 이동평균 윈도우
    pub sma_long_window: usize,
    /// 52주 고가 윈도우 (거래일)
    pub lookback_52w: usize,
}

impl Default for ProcessorParams {
    fn default() -> Self {
        Self {
            sma_short_window: 50,
            sma_long_window: 200,
            lookback_52w: 252,
        }
    }
}

impl ProcessorParams {
    /// 설정의 `data_settings`에서 파라미터를 가져옵니다.
    pub fn from_settings(settings: &DataSettings) -> Self {
        Self {
            sma_short_window: settings.sma_short_window,
            sma_long_window: settings.sma_long_window,
            lookback_52w: settings.lookback_trading_days_for_52w,
        }
    }
}

/// 병합된 거래일 행.
///
/// 가격 바, 해당일 기준 최신 재무 스냅샷, 계산된 지표를 함께 담습니다.
/// 같은 스냅샷을 여러 행이 공유하므로 `Arc`로 보관합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub bar: PriceBar,
    pub fundamentals: Option<Arc<FundamentalsSnapshot>>,
    pub sma_short: Option<Decimal>,
    pub sma_long: Option<Decimal>,
    pub high_52week: Option<Decimal>,
    pub book_value_per_share: Option<Decimal>,
    pub pb_ratio: Option<Decimal>,
    pub ev: Option<f64>,
}

impl MergedRow {
    pub fn date(&self) -> NaiveDate {
        self.bar.date()
    }

    /// 연결된 스냅샷의 분기말.
    pub fn quarter_end(&self) -> Option<NaiveDate> {
        self.fundamentals.as_ref().map(|s| s.quarter_end)
    }

    /// 저장/내보내기용 행으로 변환합니다.
    pub fn to_processed(&self) -> ProcessedRow {
        ProcessedRow {
            date: self.bar.date(),
            close: self.bar.close(),
            volume: self.bar.volume(),
            sma50: self.sma_short,
            sma200: self.sma_long,
            high_52week: self.high_52week,
            pb_ratio: self.pb_ratio,
            ev: self.ev,
            fundamentals_quarter_end: self.quarter_end(),
        }
    }
}

/// 병합 및 지표 계산 엔진.
#[derive(Debug, Clone, Default)]
pub struct MetricsProcessor {
    params: ProcessorParams,
    trend: TrendIndicators,
}

impl MetricsProcessor {
    /// 새 엔진을 생성합니다.
    pub fn new(params: ProcessorParams) -> Self {
        Self {
            params,
            trend: TrendIndicators::new(),
        }
    }

    /// 가격, 재무 스냅샷, 기업 정보로 병합 행을 계산합니다.
    ///
    /// 입력은 정렬되어 있지 않아도 됩니다. 출력은 가격 바마다 한 행이며 날짜 오름차순입니다.
    /// 같은 날짜의 가격 바는 모두 유지되고, 같은 분기말의 스냅샷은 입력 순서상 뒤의 것이
    /// 사용됩니다.
    ///
    /// # Errors
    /// 가격이 비어 있으면 [`ProcessError::EmptyPriceSeries`].
    #[instrument(skip_all, fields(ticker = %company.ticker, bars = prices.len(), snapshots = fundamentals.len()))]
    pub fn process(
        &self,
        prices: &[PriceBar],
        fundamentals: &[FundamentalsSnapshot],
        company: &CompanyInfo,
    ) -> Result<Vec<MergedRow>, ProcessError> {
        if prices.is_empty() {
            return Err(ProcessError::EmptyPriceSeries);
        }

        let mut bars = prices.to_vec();
        bars.sort_by_key(PriceBar::date);

        let mut sorted: Vec<&FundamentalsSnapshot> = fundamentals.iter().collect();
        sorted.sort_by_key(|s| s.quarter_end);
        let snapshots: Vec<Arc<FundamentalsSnapshot>> =
            sorted.into_iter().cloned().map(Arc::new).collect();

        let attached = as_of_join(&bars, &snapshots);

        let closes: Vec<Decimal> = bars.iter().map(PriceBar::close).collect();
        let highs: Vec<Decimal> = bars.iter().map(PriceBar::high).collect();

        let sma_short = self
            .trend
            .sma(&closes, WindowParams::new(self.params.sma_short_window))?;
        let sma_long = self
            .trend
            .sma(&closes, WindowParams::new(self.params.sma_long_window))?;
        let high_52week = self
            .trend
            .rolling_max(&highs, WindowParams::new(self.params.lookback_52w))?;

        let rows: Vec<MergedRow> = bars
            .into_iter()
            .zip(attached)
            .zip(sma_short.into_iter().zip(sma_long))
            .zip(high_52week)
            .map(|(((bar, fundamentals), (short, long)), high)| {
                let bvps = fundamentals
                    .as_deref()
                    .and_then(valuation::book_value_per_share);
                let pb_ratio = valuation::price_to_book(bar.close(), bvps);
                let ev = valuation::enterprise_value(company.market_cap, fundamentals.as_deref());

                MergedRow {
                    bar,
                    fundamentals,
                    sma_short: Some(short),
                    sma_long: Some(long),
                    high_52week: Some(high),
                    book_value_per_share: bvps,
                    pb_ratio,
                    ev,
                }
            })
            .collect();

        debug!(
            rows = rows.len(),
            with_fundamentals = rows.iter().filter(|r| r.fundamentals.is_some()).count(),
            "Merged price and fundamentals"
        );

        Ok(rows)
    }

    /// [`process`](Self::process) 결과를 저장/내보내기용 행으로 변환합니다.
    pub fn process_rows(
        &self,
        prices: &[PriceBar],
        fundamentals: &[FundamentalsSnapshot],
        company: &CompanyInfo,
    ) -> Result<Vec<ProcessedRow>, ProcessError> {
        Ok(self
            .process(prices, fundamentals, company)?
            .iter()
            .map(MergedRow::to_processed)
            .collect())
    }
}

/// 정렬된 가격 바마다 `quarter_end <= date`인 가장 최근 스냅샷을 연결합니다.
///
/// 두 입력 모두 날짜 오름차순이어야 합니다. 두 포인터로 한 번만 순회하므로 O(n + m)입니다.
pub fn as_of_join(
    bars: &[PriceBar],
    snapshots: &[Arc<FundamentalsSnapshot>],
) -> Vec<Option<Arc<FundamentalsSnapshot>>> {
    let mut result = Vec::with_capacity(bars.len());
    let mut next = 0;
    let mut current: Option<&Arc<FundamentalsSnapshot>> = None;

    for bar in bars {
        while next < snapshots.len() && snapshots[next].quarter_end <= bar.date() {
            current = Some(&snapshots[next]);
            next += 1;
        }
        result.push(current.cloned());
    }

    result
}
