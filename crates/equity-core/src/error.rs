//! 공통 에러 타입.
//!
//! 설정 로드와 로깅 초기화 단계의 에러를 다룹니다. 수집/저장 에러는
//! `equity-data`, 계산 에러는 `equity-analytics`가 각자 정의합니다.

use thiserror::Error;

/// 핵심 에러.
#[derive(Debug, Error)]
pub enum EquityError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type EquityResult<T> = Result<T, EquityError>;

impl From<config::ConfigError> for EquityError {
    fn from(err: config::ConfigError) -> Self {
        EquityError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_conversion() {
        let err: EquityError = config::ConfigError::NotFound("data_settings".to_string()).into();

        assert!(matches!(err, EquityError::Config(_)));
        assert!(err.to_string().contains("data_settings"));
    }
}
