//! 데이터 모듈 오류 타입.

use equity_core::PriceBarError;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스/외부 서비스 연결 오류
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 데이터 삽입 오류
    #[error("Insert error: {0}")]
    InsertError(String),

    /// 데이터 가져오기 오류 (외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 요청 한도 초과
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 가격 바 불변식 위반
    #[error("Invalid price bar: {0}")]
    InvalidBar(#[from] PriceBarError),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 재시도 소진
    #[error("Fetch failed for {ticker} after {attempts} attempts: {source}")]
    FetchExhausted {
        ticker: String,
        attempts: u32,
        #[source]
        source: Box<DataError>,
    },
}

impl DataError {
    /// 재시도 가능한 오류인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DataError::ConnectionError(_) | DataError::FetchError(_) | DataError::RateLimited(_)
        )
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DataError::ConnectionError(err.to_string())
            }
            sqlx::Error::Database(db_err) => DataError::QueryError(db_err.message().to_string()),
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        if err.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) {
            DataError::RateLimited(err.to_string())
        } else if err.is_decode() {
            DataError::ParseError(err.to_string())
        } else {
            DataError::FetchError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(DataError::FetchError("503".into()).is_retryable());
        assert!(DataError::RateLimited("429".into()).is_retryable());
        assert!(!DataError::ParseError("bad json".into()).is_retryable());
        assert!(!DataError::InsertError("locked".into()).is_retryable());
    }

    #[test]
    fn test_exhausted_carries_last_cause() {
        let err = DataError::FetchExhausted {
            ticker: "AAPL".to_string(),
            attempts: 3,
            source: Box::new(DataError::FetchError("timeout".into())),
        };

        assert!(!err.is_retryable());
        assert!(err.to_string().contains("after 3 attempts"));
        let cause = std::error::Error::source(&err).unwrap();
        assert_eq!(cause.to_string(), "Fetch error: timeout");
    }
}
