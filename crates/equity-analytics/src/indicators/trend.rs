//! 추세 지표 (Trend Indicators).
//!
//! - SMA (Simple Moving Average), 시작 구간에서 윈도우 축소
//! - 롤링 최대값
//! - 골든 크로스 / 데드 크로스 판정

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::{IndicatorError, IndicatorResult};

/// 롤링 윈도우 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowParams {
    /// 윈도우 크기 (1 이상).
    pub period: usize,
}

impl WindowParams {
    /// 새 윈도우 파라미터를 생성합니다.
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    fn validate(&self) -> IndicatorResult<()> {
        if self.period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }
        Ok(())
    }
}

/// 추세 지표 계산기.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// `sma[i]`는 직전 `min(i + 1, period)`개 값의 산술평균입니다.
    /// 따라서 결과 길이는 입력 길이와 같고 `sma[0] == prices[0]`입니다.
    ///
    /// # 인자
    /// * `prices` - 가격 데이터
    /// * `params` - 윈도우 파라미터
    pub fn sma(&self, prices: &[Decimal], params: WindowParams) -> IndicatorResult<Vec<Decimal>> {
        params.validate()?;
        let period = params.period;

        let mut result = Vec::with_capacity(prices.len());
        let mut sum = Decimal::ZERO;

        for (i, price) in prices.iter().enumerate() {
            sum = sum.checked_add(*price).ok_or_else(|| {
                IndicatorError::CalculationError(format!("SMA 합계 오버플로우 (index {})", i))
            })?;
            if i >= period {
                sum -= prices[i - period];
            }

            let count = Decimal::from((i + 1).min(period));
            result.push(sum / count);
        }

        Ok(result)
    }

    /// 롤링 최대값 계산.
    ///
    /// `max[i]`는 직전 `min(i + 1, period)`개 값 중 최대값입니다.
    /// 단조 감소 덱을 사용하므로 O(n)입니다.
    pub fn rolling_max(
        &self,
        values: &[Decimal],
        params: WindowParams,
    ) -> IndicatorResult<Vec<Decimal>> {
        params.validate()?;
        let period = params.period;

        let mut result = Vec::with_capacity(values.len());
        let mut window: VecDeque<usize> = VecDeque::with_capacity(period.min(values.len()));

        for (i, value) in values.iter().enumerate() {
            while window.back().is_some_and(|&j| values[j] <= *value) {
                window.pop_back();
            }
            window.push_back(i);

            while window.front().is_some_and(|&j| j + period <= i) {
                window.pop_front();
            }

            // 방금 i를 넣었으므로 덱은 비어 있지 않다
            let front = window.front().copied().unwrap_or(i);
            result.push(values[front]);
        }

        Ok(result)
    }

    /// 골든 크로스 감지.
    ///
    /// 이전: 단기 <= 장기, 현재: 단기 > 장기.
    /// 네 값 중 하나라도 없으면 해당 시점은 교차가 아닙니다. 첫 시점은 항상 false입니다.
    pub fn detect_golden_cross(
        &self,
        short_ma: &[Option<Decimal>],
        long_ma: &[Option<Decimal>],
    ) -> Vec<bool> {
        Self::detect_cross(short_ma, long_ma, |prev_short, prev_long, curr_short, curr_long| {
            prev_short <= prev_long && curr_short > curr_long
        })
    }

    /// 데드 크로스 감지.
    ///
    /// 이전: 단기 >= 장기, 현재: 단기 < 장기.
    pub fn detect_death_cross(
        &self,
        short_ma: &[Option<Decimal>],
        long_ma: &[Option<Decimal>],
    ) -> Vec<bool> {
        Self::detect_cross(short_ma, long_ma, |prev_short, prev_long, curr_short, curr_long| {
            prev_short >= prev_long && curr_short < curr_long
        })
    }

    fn detect_cross<F>(
        short_ma: &[Option<Decimal>],
        long_ma: &[Option<Decimal>],
        crossed: F,
    ) -> Vec<bool>
    where
        F: Fn(Decimal, Decimal, Decimal, Decimal) -> bool,
    {
        let len = short_ma.len().min(long_ma.len());
        let mut result = vec![false; len];

        for i in 1..len {
            if let (Some(prev_short), Some(prev_long), Some(curr_short), Some(curr_long)) =
                (short_ma[i - 1], long_ma[i - 1], short_ma[i], long_ma[i])
            {
                result[i] = crossed(prev_short, prev_long, curr_short, curr_long);
            }
        }

        result
    }
}
