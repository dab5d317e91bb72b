//! # Equity Data
//!
//! 외부 데이터 조회와 저장을 담당합니다.
//!
//! - [`provider`]: 가격/재무/기업 정보 조회 및 재시도
//! - [`storage`]: SQLite 지표/신호 저장소

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};
pub use provider::{
    fetch_with_retry, MarketDataSource, RawBundle, RawQuote, RetryPolicy, YahooMarketDataSource,
};
pub use storage::MetricsRepository;
