//! 일봉 가격 바.
//!
//! 모든 필드를 채운 뒤 [`PriceBar::validate`]로 가격 간 불변식을 한 번에 검사합니다.
//! 생성 이후에는 변경할 수 없습니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Price;

/// 가격 바 불변식 위반.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceBarError {
    /// 고가가 저가보다 낮음
    #[error("{date}: 고가({high})가 저가({low})보다 낮습니다")]
    HighBelowLow {
        date: NaiveDate,
        high: Price,
        low: Price,
    },

    /// 시가가 [저가, 고가) 범위를 벗어남
    #[error("{date}: 시가({open})가 [저가 {low}, 고가 {high}) 범위를 벗어났습니다")]
    OpenOutOfRange {
        date: NaiveDate,
        open: Price,
        low: Price,
        high: Price,
    },

    /// 제공자가 숫자가 아닌 가격을 반환함
    #[error("{date}: {field} 값이 유효한 숫자가 아닙니다")]
    NonNumeric { date: NaiveDate, field: &'static str },
}

/// 하루치 OHLCV 가격 바.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceBar")]
pub struct PriceBar {
    date: NaiveDate,
    open: Price,
    high: Price,
    low: Price,
    close: Price,
    volume: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    adj_close: Option<Price>,
}

impl PriceBar {
    /// 검증된 가격 바를 생성합니다.
    pub fn new(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: u64,
    ) -> Result<Self, PriceBarError> {
        let bar = Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            adj_close: None,
        };
        bar.validate()?;
        Ok(bar)
    }

    /// 수정 종가를 설정합니다.
    pub fn with_adj_close(mut self, adj_close: Option<Price>) -> Self {
        self.adj_close = adj_close;
        self
    }

    /// 가격 간 불변식을 검사합니다: `low <= high`, `low <= open < high`.
    pub fn validate(&self) -> Result<(), PriceBarError> {
        if self.high < self.low {
            return Err(PriceBarError::HighBelowLow {
                date: self.date,
                high: self.high,
                low: self.low,
            });
        }
        if self.open < self.low || self.open >= self.high {
            return Err(PriceBarError::OpenOutOfRange {
                date: self.date,
                open: self.open,
                low: self.low,
                high: self.high,
            });
        }
        Ok(())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn open(&self) -> Price {
        self.open
    }

    pub fn high(&self) -> Price {
        self.high
    }

    pub fn low(&self) -> Price {
        self.low
    }

    pub fn close(&self) -> Price {
        self.close
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }

    pub fn adj_close(&self) -> Option<Price> {
        self.adj_close
    }
}

/// 역직렬화 전용 중간 표현. 검증은 `TryFrom`에서 수행합니다.
#[derive(Deserialize)]
struct RawPriceBar {
    date: NaiveDate,
    open: Price,
    high: Price,
    low: Price,
    close: Price,
    volume: u64,
    #[serde(default)]
    adj_close: Option<Price>,
}

impl TryFrom<RawPriceBar> for PriceBar {
    type Error = PriceBarError;

    fn try_from(raw: RawPriceBar) -> Result<Self, Self::Error> {
        Ok(
            PriceBar::new(raw.date, raw.open, raw.high, raw.low, raw.close, raw.volume)?
                .with_adj_close(raw.adj_close),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_valid_bar() {
        let bar = PriceBar::new(day(), dec!(100), dec!(105), dec!(99), dec!(104), 1_000).unwrap();
        assert_eq!(bar.close(), dec!(104));
        assert_eq!(bar.adj_close(), None);
    }

    #[test]
    fn test_open_equal_low_is_valid() {
        assert!(PriceBar::new(day(), dec!(99), dec!(105), dec!(99), dec!(100), 0).is_ok());
    }

    #[test]
    fn test_open_equal_high_is_rejected() {
        let err = PriceBar::new(day(), dec!(105), dec!(105), dec!(99), dec!(100), 0).unwrap_err();
        assert!(matches!(err, PriceBarError::OpenOutOfRange { .. }));
    }

    #[test]
    fn test_high_below_low_is_rejected() {
        let err = PriceBar::new(day(), dec!(100), dec!(98), dec!(99), dec!(100), 0).unwrap_err();
        assert!(matches!(err, PriceBarError::HighBelowLow { .. }));
    }

    #[test]
    fn test_open_below_low_is_rejected() {
        let err = PriceBar::new(day(), dec!(98), dec!(105), dec!(99), dec!(100), 0).unwrap_err();
        assert!(matches!(err, PriceBarError::OpenOutOfRange { .. }));
    }

    #[test]
    fn test_deserialize_runs_validation() {
        let ok = r#"{"date":"2024-03-01","open":"100","high":"105","low":"99","close":"104","volume":10}"#;
        assert!(serde_json::from_str::<PriceBar>(ok).is_ok());

        let bad = r#"{"date":"2024-03-01","open":"106","high":"105","low":"99","close":"104","volume":10}"#;
        assert!(serde_json::from_str::<PriceBar>(bad).is_err());
    }
}
