//! 이동평균 크로스 신호.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 신호 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    /// 단기 이동평균이 장기 이동평균을 상향 돌파
    GoldenCross,
    /// 단기 이동평균이 장기 이동평균을 하향 돌파
    DeathCross,
}

impl SignalType {
    /// 저장/직렬화에 쓰이는 이름을 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::GoldenCross => "golden_cross",
            SignalType::DeathCross => "death_cross",
        }
    }
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "golden_cross" => Ok(SignalType::GoldenCross),
            "death_cross" => Ok(SignalType::DeathCross),
            _ => Err(format!("Unknown signal type: {}", s)),
        }
    }
}

/// 크로스가 발생한 날의 신호 이벤트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    /// 종목 코드
    pub ticker: String,
    /// 발생일
    pub date: NaiveDate,
    /// 신호 유형
    pub signal_type: SignalType,
    /// 발생일의 단기 이동평균
    #[serde(with = "rust_decimal::serde::float")]
    pub sma_short: Decimal,
    /// 발생일의 장기 이동평균
    #[serde(with = "rust_decimal::serde::float")]
    pub sma_long: Decimal,
    /// 메모
    #[serde(default)]
    pub note: Option<String>,
}

impl SignalEvent {
    /// 새 신호 이벤트를 생성합니다.
    pub fn new(
        ticker: impl Into<String>,
        date: NaiveDate,
        signal_type: SignalType,
        sma_short: Decimal,
        sma_long: Decimal,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            date,
            signal_type,
            sma_short,
            sma_long,
            note: None,
        }
    }

    /// 메모를 설정합니다.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signal_type_names() {
        assert_eq!(SignalType::GoldenCross.to_string(), "golden_cross");
        assert_eq!("death_cross".parse::<SignalType>().unwrap(), SignalType::DeathCross);
        assert!("sideways".parse::<SignalType>().is_err());
    }

    #[test]
    fn test_signal_event_json() {
        let event = SignalEvent::new(
            "AAPL",
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            SignalType::GoldenCross,
            dec!(181.25),
            dec!(180.5),
        );
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["signal_type"], "golden_cross");
        assert_eq!(json["sma_short"], 181.25);
        assert!(json["note"].is_null());
    }
}
