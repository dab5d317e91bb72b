//! JSON 내보내기 문서.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CompanyInfo, ProcessedRow, SignalEvent};

/// 한 종목의 처리 결과를 담는 내보내기 문서.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub ticker: String,
    /// 생성 시각 (UTC)
    pub generated_at: DateTime<Utc>,
    pub company_info: CompanyInfo,
    /// 날짜 오름차순 지표
    pub metrics: Vec<ProcessedRow>,
    /// 날짜 오름차순 신호
    pub signals: Vec<SignalEvent>,
}

impl ExportDocument {
    /// 내보내기 문서를 생성합니다. 신호는 날짜순으로 정렬됩니다.
    pub fn new(
        company_info: CompanyInfo,
        metrics: Vec<ProcessedRow>,
        mut signals: Vec<SignalEvent>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        signals.sort_by_key(|s| (s.date, s.signal_type));
        Self {
            ticker: company_info.ticker.clone(),
            generated_at,
            company_info,
            metrics,
            signals,
        }
    }

    /// 들여쓰기된 JSON 문자열로 직렬화합니다.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
