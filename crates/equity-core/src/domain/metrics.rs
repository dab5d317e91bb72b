//! 저장 및 내보내기 단위인 일별 지표 행.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 거래일 하나에 대한 계산된 지표.
///
/// 값이 없는 지표는 JSON에서 `null`로 직렬화됩니다.
/// 이동평균 필드명은 설정된 윈도우와 무관하게 `sma50`/`sma200`을 유지합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRow {
    /// 거래일
    pub date: NaiveDate,
    /// 종가
    #[serde(with = "rust_decimal::serde::float")]
    pub close: Decimal,
    /// 거래량
    pub volume: u64,
    /// 단기 이동평균
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub sma50: Option<Decimal>,
    /// 장기 이동평균
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub sma200: Option<Decimal>,
    /// 52주 고가
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub high_52week: Option<Decimal>,
    /// 주가순자산비율
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub pb_ratio: Option<Decimal>,
    /// 단순 기업가치
    #[serde(default)]
    pub ev: Option<f64>,
    /// 적용된 재무 스냅샷의 분기말
    #[serde(default)]
    pub fundamentals_quarter_end: Option<NaiveDate>,
}
