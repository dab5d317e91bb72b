//! SQLite 지표/신호 저장소.
//!
//! # 테이블
//!
//! - `tickers`: 종목별 통화, 시가총액, 원본 기업 정보
//! - `daily_metrics`: `(ticker, date)` 유일
//! - `signal_events`: `(ticker, date, signal_type)` 유일
//!
//! 가격/지표 Decimal 값은 정확도 유지를 위해 TEXT로, EV는 REAL로 저장합니다.
//! 배치 쓰기는 트랜잭션 하나로 처리하며, 실패하면 롤백 후 오류를 반환합니다.

use std::path::Path;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use equity_core::{CompanyInfo, ProcessedRow, SignalEvent, SignalType};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, Sqlite, Transaction};
use tracing::{info, instrument, warn};

use crate::error::{DataError, Result};

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS tickers (
        ticker      TEXT PRIMARY KEY,
        currency    TEXT,
        market_cap  TEXT,
        info_json   TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS daily_metrics (
        id                        INTEGER PRIMARY KEY AUTOINCREMENT,
        ticker                    TEXT NOT NULL,
        date                      TEXT NOT NULL,
        close                     TEXT NOT NULL,
        volume                    INTEGER NOT NULL,
        sma50                     TEXT,
        sma200                    TEXT,
        high_52week               TEXT,
        pb_ratio                  TEXT,
        ev                        REAL,
        fundamentals_quarter_end  TEXT,
        UNIQUE (ticker, date)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS signal_events (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        ticker       TEXT NOT NULL,
        date         TEXT NOT NULL,
        signal_type  TEXT NOT NULL,
        sma_short    TEXT NOT NULL,
        sma_long     TEXT NOT NULL,
        note         TEXT,
        UNIQUE (ticker, date, signal_type)
    )
    "#,
];

/// `daily_metrics` 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct MetricsRecord {
    pub ticker: String,
    pub date: NaiveDate,
    pub close: String,
    pub volume: i64,
    pub sma50: Option<String>,
    pub sma200: Option<String>,
    pub high_52week: Option<String>,
    pub pb_ratio: Option<String>,
    pub ev: Option<f64>,
    pub fundamentals_quarter_end: Option<NaiveDate>,
}

impl MetricsRecord {
    /// 도메인 행으로 변환합니다.
    pub fn to_processed(&self) -> Result<ProcessedRow> {
        Ok(ProcessedRow {
            date: self.date,
            close: parse_decimal(&self.close)?,
            volume: u64::try_from(self.volume)
                .map_err(|_| DataError::InvalidData(format!("negative volume {}", self.volume)))?,
            sma50: parse_optional(self.sma50.as_deref())?,
            sma200: parse_optional(self.sma200.as_deref())?,
            high_52week: parse_optional(self.high_52week.as_deref())?,
            pb_ratio: parse_optional(self.pb_ratio.as_deref())?,
            ev: self.ev,
            fundamentals_quarter_end: self.fundamentals_quarter_end,
        })
    }
}

/// `signal_events` 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct SignalRecord {
    pub ticker: String,
    pub date: NaiveDate,
    pub signal_type: String,
    pub sma_short: String,
    pub sma_long: String,
    pub note: Option<String>,
}

impl SignalRecord {
    /// 도메인 이벤트로 변환합니다.
    pub fn to_event(&self) -> Result<SignalEvent> {
        let signal_type = SignalType::from_str(&self.signal_type).map_err(DataError::InvalidData)?;
        Ok(SignalEvent {
            ticker: self.ticker.clone(),
            date: self.date,
            signal_type,
            sma_short: parse_decimal(&self.sma_short)?,
            sma_long: parse_decimal(&self.sma_long)?,
            note: self.note.clone(),
        })
    }
}

/// 지표/신호 저장소.
#[derive(Debug, Clone)]
pub struct MetricsRepository {
    pool: SqlitePool,
}

impl MetricsRepository {
    /// 파일 경로로 저장소를 엽니다. 파일이 없으면 생성합니다.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| {
                DataError::ConnectionError(format!("{}: {}", path.as_ref().display(), e))
            })?;

        Ok(Self { pool })
    }

    /// 메모리 저장소를 엽니다 (테스트용).
    ///
    /// 연결마다 별도 DB가 생기므로 연결을 하나로 고정합니다.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// 테이블이 없으면 생성합니다.
    pub async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// 종목 정보를 등록하거나 갱신합니다.
    #[instrument(skip(self, info), fields(ticker = %info.ticker))]
    pub async fn upsert_ticker(&self, info: &CompanyInfo) -> Result<()> {
        let info_json = serde_json::to_string(info)?;

        sqlx::query(
            r#"
            INSERT INTO tickers (ticker, currency, market_cap, info_json, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT (ticker) DO UPDATE SET
                currency = excluded.currency,
                market_cap = excluded.market_cap,
                info_json = excluded.info_json,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&info.ticker)
        .bind(&info.currency)
        .bind(info.market_cap.map(|v| v.to_string()))
        .bind(info_json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| DataError::InsertError(e.to_string()))?;

        Ok(())
    }

    /// 일별 지표를 배치로 upsert합니다.
    ///
    /// 같은 `(ticker, date)`는 덮어씁니다. 하나라도 실패하면 배치 전체를 롤백합니다.
    #[instrument(skip(self, rows), fields(count = rows.len()))]
    pub async fn upsert_metrics(&self, ticker: &str, rows: &[ProcessedRow]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut tx = self.begin().await?;
        for row in rows {
            let result = insert_metric(&mut tx, ticker, row).await;
            if let Err(e) = result {
                warn!(ticker, date = %row.date, error = %e, "지표 저장 실패, 배치 롤백");
                tx.rollback()
                    .await
                    .map_err(|e| DataError::QueryError(e.to_string()))?;
                return Err(e);
            }
        }
        tx.commit()
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

        info!(ticker, count = rows.len(), "일별 지표 저장 완료");
        Ok(rows.len())
    }

    /// 신호 이벤트를 배치로 upsert합니다.
    ///
    /// 같은 `(ticker, date, signal_type)`은 덮어씁니다.
    #[instrument(skip(self, events), fields(count = events.len()))]
    pub async fn upsert_signals(&self, ticker: &str, events: &[SignalEvent]) -> Result<usize> {
        if events.is_empty() {
            return Ok(0);
        }

        let mut tx = self.begin().await?;
        for event in events {
            let result = insert_signal(&mut tx, ticker, event).await;
            if let Err(e) = result {
                warn!(ticker, date = %event.date, error = %e, "신호 저장 실패, 배치 롤백");
                tx.rollback()
                    .await
                    .map_err(|e| DataError::QueryError(e.to_string()))?;
                return Err(e);
            }
        }
        tx.commit()
            .await
            .map_err(|e| DataError::InsertError(e.to_string()))?;

        info!(ticker, count = events.len(), "신호 이벤트 저장 완료");
        Ok(events.len())
    }

    /// 종목의 일별 지표를 날짜순으로 조회합니다.
    pub async fn load_metrics(&self, ticker: &str) -> Result<Vec<ProcessedRow>> {
        let records: Vec<MetricsRecord> = sqlx::query_as(
            r#"
            SELECT ticker, date, close, volume, sma50, sma200, high_52week, pb_ratio, ev,
                   fundamentals_quarter_end
            FROM daily_metrics
            WHERE ticker = ?1
            ORDER BY date ASC
            "#,
        )
        .bind(ticker)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DataError::QueryError(e.to_string()))?;

        records.iter().map(MetricsRecord::to_processed).collect()
    }

    /// 종목의 신호 이벤트를 날짜순으로 조회합니다.
    pub async fn load_signals(&self, ticker: &str) -> Result<Vec<SignalEvent>> {
        let records: Vec<SignalRecord> = sqlx::query_as(
            r#"
            SELECT ticker, date, signal_type, sma_short, sma_long, note
            FROM signal_events
            WHERE ticker = ?1
            ORDER BY date ASC, signal_type ASC
            "#,
        )
        .bind(ticker)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DataError::QueryError(e.to_string()))?;

        records.iter().map(SignalRecord::to_event).collect()
    }

    async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))
    }
}

async fn insert_metric(
    tx: &mut Transaction<'static, Sqlite>,
    ticker: &str,
    row: &ProcessedRow,
) -> Result<()> {
    let volume = i64::try_from(row.volume)
        .map_err(|_| DataError::InvalidData(format!("volume out of range: {}", row.volume)))?;

    sqlx::query(
        r#"
        INSERT INTO daily_metrics
            (ticker, date, close, volume, sma50, sma200, high_52week, pb_ratio, ev,
             fundamentals_quarter_end)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT (ticker, date) DO UPDATE SET
            close = excluded.close,
            volume = excluded.volume,
            sma50 = excluded.sma50,
            sma200 = excluded.sma200,
            high_52week = excluded.high_52week,
            pb_ratio = excluded.pb_ratio,
            ev = excluded.ev,
            fundamentals_quarter_end = excluded.fundamentals_quarter_end
        "#,
    )
    .bind(ticker)
    .bind(row.date)
    .bind(row.close.to_string())
    .bind(volume)
    .bind(row.sma50.map(|v| v.to_string()))
    .bind(row.sma200.map(|v| v.to_string()))
    .bind(row.high_52week.map(|v| v.to_string()))
    .bind(row.pb_ratio.map(|v| v.to_string()))
    .bind(row.ev)
    .bind(row.fundamentals_quarter_end)
    .execute(&mut **tx)
    .await
    .map_err(|e| DataError::InsertError(e.to_string()))?;

    Ok(())
}

async fn insert_signal(
    tx: &mut Transaction<'static, Sqlite>,
    ticker: &str,
    event: &SignalEvent,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO signal_events (ticker, date, signal_type, sma_short, sma_long, note)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT (ticker, date, signal_type) DO UPDATE SET
            sma_short = excluded.sma_short,
            sma_long = excluded.sma_long,
            note = excluded.note
        "#,
    )
    .bind(ticker)
    .bind(event.date)
    .bind(event.signal_type.as_str())
    .bind(event.sma_short.to_string())
    .bind(event.sma_long.to_string())
    .bind(&event.note)
    .execute(&mut **tx)
    .await
    .map_err(|e| DataError::InsertError(e.to_string()))?;

    Ok(())
}

fn parse_decimal(value: &str) -> Result<Decimal> {
    Decimal::from_str(value).map_err(|e| DataError::ParseError(format!("{}: {}", value, e)))
}

fn parse_optional(value: Option<&str>) -> Result<Option<Decimal>> {
    value.map(parse_decimal).transpose()
}
