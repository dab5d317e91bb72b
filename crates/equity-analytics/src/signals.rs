//! 이동평균 크로스 신호 감지.

use chrono::NaiveDate;
use equity_core::{ProcessedRow, SignalEvent, SignalType};
use rust_decimal::Decimal;

use crate::indicators::TrendIndicators;
use crate::processor::MergedRow;

/// 날짜별 단기/장기 이동평균을 제공하는 행.
pub trait MovingAveragePair {
    fn date(&self) -> NaiveDate;
    fn short_average(&self) -> Option<Decimal>;
    fn long_average(&self) -> Option<Decimal>;
}

impl MovingAveragePair for MergedRow {
    fn date(&self) -> NaiveDate {
        self.bar.date()
    }

    fn short_average(&self) -> Option<Decimal> {
        self.sma_short
    }

    fn long_average(&self) -> Option<Decimal> {
        self.sma_long
    }
}

impl MovingAveragePair for ProcessedRow {
    fn date(&self) -> NaiveDate {
        self.date
    }

    fn short_average(&self) -> Option<Decimal> {
        self.sma50
    }

    fn long_average(&self) -> Option<Decimal> {
        self.sma200
    }
}

/// 골든/데드 크로스 감지기.
///
/// 입력 행은 날짜 오름차순이어야 하며, 결과도 같은 순서를 유지합니다.
#[derive(Debug, Clone, Default)]
pub struct SignalDetector {
    trend: TrendIndicators,
    windows: Option<(usize, usize)>,
}

impl SignalDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이벤트 메모에 표시할 이동평균 윈도우를 설정합니다.
    pub fn with_windows(mut self, short: usize, long: usize) -> Self {
        self.windows = Some((short, long));
        self
    }

    /// 골든 크로스가 발생한 날짜.
    pub fn golden_cross_dates<R: MovingAveragePair>(&self, rows: &[R]) -> Vec<NaiveDate> {
        self.cross_dates(rows, SignalType::GoldenCross)
    }

    /// 데드 크로스가 발생한 날짜.
    pub fn death_cross_dates<R: MovingAveragePair>(&self, rows: &[R]) -> Vec<NaiveDate> {
        self.cross_dates(rows, SignalType::DeathCross)
    }

    /// 두 종류의 크로스를 모두 감지해 날짜순 이벤트로 반환합니다.
    pub fn detect_events<R: MovingAveragePair>(
        &self,
        ticker: &str,
        rows: &[R],
    ) -> Vec<SignalEvent> {
        let mut events = Vec::new();

        for signal_type in [SignalType::GoldenCross, SignalType::DeathCross] {
            for (i, crossed) in self.flags(rows, signal_type).into_iter().enumerate() {
                if !crossed {
                    continue;
                }
                let row = &rows[i];
                // 교차일에는 두 값이 모두 존재한다
                if let (Some(short), Some(long)) = (row.short_average(), row.long_average()) {
                    let mut event = SignalEvent::new(ticker, row.date(), signal_type, short, long);
                    if let Some(note) = self.note(signal_type) {
                        event = event.with_note(note);
                    }
                    events.push(event);
                }
            }
        }

        events.sort_by_key(|e| e.date);
        events
    }

    fn cross_dates<R: MovingAveragePair>(
        &self,
        rows: &[R],
        signal_type: SignalType,
    ) -> Vec<NaiveDate> {
        self.flags(rows, signal_type)
            .into_iter()
            .zip(rows)
            .filter_map(|(crossed, row)| crossed.then(|| row.date()))
            .collect()
    }

    fn flags<R: MovingAveragePair>(&self, rows: &[R], signal_type: SignalType) -> Vec<bool> {
        let has_pair = rows
            .iter()
            .any(|r| r.short_average().is_some() && r.long_average().is_some());
        if !has_pair {
            return vec![false; rows.len()];
        }

        let short: Vec<Option<Decimal>> = rows.iter().map(R::short_average).collect();
        let long: Vec<Option<Decimal>> = rows.iter().map(R::long_average).collect();

        match signal_type {
            SignalType::GoldenCross => self.trend.detect_golden_cross(&short, &long),
            SignalType::DeathCross => self.trend.detect_death_cross(&short, &long),
        }
    }

    fn note(&self, signal_type: SignalType) -> Option<String> {
        let (short, long) = self.windows?;
        let direction = match signal_type {
            SignalType::GoldenCross => "above",
            SignalType::DeathCross => "below",
        };
        Some(format!("SMA{} crossed {} SMA{}", short, direction, long))
    }
}
