//! 저장소 모듈.

mod sqlite;

pub use sqlite::{MetricsRecord, MetricsRepository, SignalRecord};
