//! 기업 정보.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 실행당 한 번 조회하는 기업 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// 종목 코드
    pub ticker: String,
    /// 시가총액
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub market_cap: Option<Decimal>,
    /// 통화 코드 (예: "USD")
    #[serde(default)]
    pub currency: Option<String>,
    /// 원본 항목
    #[serde(default)]
    pub raw: Map<String, Value>,
}

impl CompanyInfo {
    /// 비어 있는 기업 정보를 생성합니다.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            market_cap: None,
            currency: None,
            raw: Map::new(),
        }
    }

    /// 시가총액을 설정합니다.
    pub fn with_market_cap(mut self, market_cap: Decimal) -> Self {
        self.market_cap = Some(market_cap);
        self
    }

    /// 통화 코드를 설정합니다.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_cap_serializes_as_number() {
        let info = CompanyInfo::new("AAPL")
            .with_market_cap(dec!(2500000000000))
            .with_currency("USD");
        let json = serde_json::to_value(&info).unwrap();

        assert_eq!(json["ticker"], "AAPL");
        assert!(json["market_cap"].is_number());
        assert_eq!(json["currency"], "USD");
    }

    #[test]
    fn test_absent_market_cap_is_null() {
        let json = serde_json::to_value(CompanyInfo::new("MSFT")).unwrap();
        assert!(json["market_cap"].is_null());
    }
}
