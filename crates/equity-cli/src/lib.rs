//! 종목 지표 파이프라인 CLI.
//!
//! 조회 → 병합/지표 계산 → 신호 감지 → 저장 → JSON 내보내기를 하나의 명령으로 실행합니다.

pub mod commands;
pub mod export;

pub use commands::analyze::{analyze, AnalyzeConfig, AnalyzeSummary};
