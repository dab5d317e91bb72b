//! 분기 재무 스냅샷.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 특정 분기말 기준의 재무 상태.
///
/// 제공자가 항목을 누락하는 경우가 많아 모든 수치 필드는 선택적입니다.
/// 원본 응답의 모든 항목은 `raw`에 보존됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalsSnapshot {
    /// 분기말 일자
    pub quarter_end: NaiveDate,
    /// 총자산
    #[serde(default)]
    pub total_assets: Option<Decimal>,
    /// 자기자본
    #[serde(default)]
    pub total_equity: Option<Decimal>,
    /// 현금 및 현금성 자산
    #[serde(default)]
    pub cash_and_equivalents: Option<Decimal>,
    /// 단기 부채
    #[serde(default)]
    pub short_term_debt: Option<Decimal>,
    /// 장기 부채
    #[serde(default)]
    pub long_term_debt: Option<Decimal>,
    /// 제공자가 직접 보고한 총부채
    #[serde(default)]
    pub total_debt: Option<Decimal>,
    /// 발행 주식 수
    #[serde(default)]
    pub shares_outstanding: Option<Decimal>,
    /// 원본 항목
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub raw: Map<String, Value>,
}

impl FundamentalsSnapshot {
    /// 모든 수치가 비어 있는 스냅샷을 생성합니다.
    pub fn new(quarter_end: NaiveDate) -> Self {
        Self {
            quarter_end,
            total_assets: None,
            total_equity: None,
            cash_and_equivalents: None,
            short_term_debt: None,
            long_term_debt: None,
            total_debt: None,
            shares_outstanding: None,
            raw: Map::new(),
        }
    }

    /// 자기자본을 설정합니다.
    pub fn with_equity(mut self, total_equity: Decimal) -> Self {
        self.total_equity = Some(total_equity);
        self
    }

    /// 발행 주식 수를 설정합니다.
    pub fn with_shares(mut self, shares_outstanding: Decimal) -> Self {
        self.shares_outstanding = Some(shares_outstanding);
        self
    }

    /// 현금 및 현금성 자산을 설정합니다.
    pub fn with_cash(mut self, cash: Decimal) -> Self {
        self.cash_and_equivalents = Some(cash);
        self
    }

    /// 단기/장기 부채를 설정합니다.
    pub fn with_debt(mut self, short_term: Option<Decimal>, long_term: Option<Decimal>) -> Self {
        self.short_term_debt = short_term;
        self.long_term_debt = long_term;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder_sets_fields() {
        let q = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(FundamentalsSnapshot::new(q).total_equity, None);

        let snap = FundamentalsSnapshot::new(q)
            .with_equity(dec!(1000))
            .with_shares(dec!(10));
        assert_eq!(snap.shares_outstanding, Some(dec!(10)));
        assert_eq!(snap.total_equity, Some(dec!(1000)));
    }

    #[test]
    fn test_deserialize_sparse_snapshot() {
        let json = r#"{"quarter_end":"2023-09-30","total_equity":"500"}"#;
        let snap: FundamentalsSnapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snap.total_equity, Some(dec!(500)));
        assert_eq!(snap.shares_outstanding, None);
        assert!(snap.raw.is_empty());
    }
}
