//! 기술적 지표 모듈.
//!
//! # 지원 지표
//!
//! - **SMA**: 단순 이동평균. 시계열 초반에는 윈도우가 좁아집니다 (최소 1개).
//! - **Rolling Max**: 구간 최고가 (52주 고가 등)
//! - **Golden/Death Cross**: 이동평균 교차 판정

pub mod trend;

use thiserror::Error;

pub use trend::{TrendIndicators, WindowParams};

/// 지표 계산 오류.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 계산 오류
    #[error("계산 오류: {0}")]
    CalculationError(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;
