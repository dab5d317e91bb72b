//! 종목 분석 명령어.
//!
//! 1. 재시도를 적용해 가격/재무/기업 정보 조회
//! 2. as-of 병합 후 이동평균, 52주 고가, PBR, EV 계산
//! 3. 골든/데드 크로스 감지
//! 4. SQLite 저장 (실패 시 `database.fail_on_error`에 따라 계속 또는 중단)
//! 5. JSON 내보내기

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use equity_analytics::{MergedRow, MetricsProcessor, ProcessorParams, SignalDetector};
use equity_core::{
    AppConfig, CompanyInfo, DatabaseConfig, ExportDocument, ProcessedRow, SignalEvent,
};
use equity_data::{fetch_with_retry, MarketDataSource, MetricsRepository, RetryPolicy};
use tracing::{error, info, warn};

use crate::export::write_export;

/// 분석 실행 설정.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// 종목 코드
    pub ticker: String,
    /// 출력 파일 경로 (없으면 stdout)
    pub output: Option<PathBuf>,
    /// 애플리케이션 설정
    pub settings: AppConfig,
}

/// 분석 결과 요약.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeSummary {
    pub ticker: String,
    /// 처리된 거래일 수
    pub rows: usize,
    /// 감지된 신호 수
    pub signals: usize,
    /// 정책에 따라 제외된 가격 바 수
    pub skipped_bars: usize,
    /// 저장 성공 여부
    pub persisted: bool,
}

/// 한 종목에 대해 전체 파이프라인을 실행합니다.
pub async fn analyze(
    config: &AnalyzeConfig,
    source: &dyn MarketDataSource,
) -> Result<AnalyzeSummary> {
    let ticker = config.ticker.trim().to_uppercase();
    if ticker.is_empty() {
        bail!("종목 코드가 비어 있습니다");
    }

    let data_settings = &config.settings.data_settings;
    let policy = RetryPolicy::from_settings(data_settings);

    let mut bundle = fetch_with_retry(source, &ticker, &data_settings.historical_period, &policy)
        .await
        .with_context(|| format!("{} 데이터 조회 실패", ticker))?;
    // 소스가 돌려준 종목 코드 대신 정규화한 코드를 사용
    bundle.company_info.ticker = ticker.clone();

    if bundle.prices.len() < data_settings.min_trading_days_for_sma {
        warn!(
            ticker = %ticker,
            bars = bundle.prices.len(),
            required = data_settings.min_trading_days_for_sma,
            "거래일 수가 부족해 장기 이동평균이 짧은 구간으로 계산됩니다"
        );
    }

    let params = ProcessorParams::from_settings(data_settings);
    let rows = MetricsProcessor::new(params)
        .process(&bundle.prices, &bundle.fundamentals, &bundle.company_info)
        .with_context(|| format!("{} 지표 계산 실패", ticker))?;

    let events = SignalDetector::new()
        .with_windows(params.sma_short_window, params.sma_long_window)
        .detect_events(&ticker, &rows);

    let metrics: Vec<ProcessedRow> = rows.iter().map(MergedRow::to_processed).collect();

    info!(
        ticker = %ticker,
        rows = metrics.len(),
        signals = events.len(),
        "지표 계산 완료"
    );

    let database = &config.settings.database;
    let persisted = match persist(database, &ticker, &bundle.company_info, &metrics, &events).await
    {
        Ok(()) => true,
        Err(e) if database.fail_on_error => {
            return Err(e.context(format!("{} 저장 실패", ticker)));
        }
        Err(e) => {
            let cause = format!("{:#}", e);
            error!(ticker = %ticker, error = %cause, "저장 실패, 내보내기는 계속합니다");
            false
        }
    };

    let summary = AnalyzeSummary {
        ticker: ticker.clone(),
        rows: metrics.len(),
        signals: events.len(),
        skipped_bars: bundle.skipped_bars,
        persisted,
    };

    let document = ExportDocument::new(bundle.company_info, metrics, events, Utc::now());
    write_export(&document, config.output.as_deref())?;

    if let Some(path) = &config.output {
        info!(ticker = %ticker, path = %path.display(), "내보내기 완료");
    }

    Ok(summary)
}

async fn persist(
    database: &DatabaseConfig,
    ticker: &str,
    company_info: &CompanyInfo,
    metrics: &[ProcessedRow],
    events: &[SignalEvent],
) -> Result<()> {
    let repo = MetricsRepository::open(&database.path)
        .await
        .with_context(|| format!("데이터베이스 열기 실패: {}", database.path))?;
    repo.init_schema().await?;

    repo.upsert_ticker(company_info).await?;
    repo.upsert_metrics(ticker, metrics).await?;
    repo.upsert_signals(ticker, events).await?;

    repo.pool().close().await;
    Ok(())
}
