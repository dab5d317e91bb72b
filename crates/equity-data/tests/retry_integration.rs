//! 재시도 동작 통합 테스트

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use equity_core::CompanyInfo;
use equity_data::{fetch_with_retry, DataError, MarketDataSource, RawBundle, RetryPolicy};

/// 처음 `failures`번은 주어진 오류를 반환하는 테스트용 소스
struct FlakySource {
    failures: u32,
    retryable: bool,
    calls: AtomicU32,
}

impl FlakySource {
    fn new(failures: u32, retryable: bool) -> Self {
        Self {
            failures,
            retryable,
            calls: AtomicU32::new(0),
        }
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataSource for FlakySource {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn fetch(&self, ticker: &str, _period: &str) -> equity_data::Result<RawBundle> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call <= self.failures {
            return Err(if self.retryable {
                DataError::FetchError(format!("attempt {} failed", call))
            } else {
                DataError::ParseError("malformed response".to_string())
            });
        }
        Ok(RawBundle {
            prices: Vec::new(),
            fundamentals: Vec::new(),
            company_info: CompanyInfo::new(ticker),
            skipped_bars: 0,
        })
    }
}

fn policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        backoff: Duration::from_secs(1),
    }
}

#[tokio::test(start_paused = true)]
async fn test_succeeds_after_transient_failures() {
    let source = FlakySource::new(2, true);
    let started = tokio::time::Instant::now();

    let bundle = fetch_with_retry(&source, "AAPL", "5y", &policy(3)).await.unwrap();

    assert_eq!(bundle.company_info.ticker, "AAPL");
    assert_eq!(source.calls(), 3);
    // 1초 + 2초 선형 대기
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_exhaustion_carries_last_cause() {
    let source = FlakySource::new(10, true);

    let err = fetch_with_retry(&source, "AAPL", "5y", &policy(3)).await.unwrap_err();

    assert_eq!(source.calls(), 3);
    match err {
        DataError::FetchExhausted {
            ticker,
            attempts,
            source,
        } => {
            assert_eq!(ticker, "AAPL");
            assert_eq!(attempts, 3);
            assert_eq!(source.to_string(), "Fetch error: attempt 3 failed");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_non_retryable_error_is_not_retried() {
    let source = FlakySource::new(1, false);

    let err = fetch_with_retry(&source, "AAPL", "5y", &policy(3)).await.unwrap_err();

    assert_eq!(source.calls(), 1);
    assert!(matches!(err, DataError::ParseError(_)));
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_policy() {
    let source = FlakySource::new(1, true);

    let err = fetch_with_retry(&source, "AAPL", "5y", &policy(1)).await.unwrap_err();

    assert_eq!(source.calls(), 1);
    assert!(matches!(err, DataError::FetchExhausted { attempts: 1, .. }));
}
