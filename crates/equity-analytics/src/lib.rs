//! # Equity Analytics
//!
//! 일봉 가격과 분기 재무 데이터를 병합하고 지표와 신호를 계산합니다.
//!
//! - [`indicators`]: 이동평균, 롤링 최대값, 크로스 판정
//! - [`valuation`]: 주당순자산, PBR, 단순 기업가치
//! - [`processor`]: as-of 병합과 행 단위 지표 계산 엔진
//! - [`signals`]: 골든/데드 크로스 이벤트 감지
//!
//! 모든 계산은 동기식 순수 함수이며 입력을 변경하지 않습니다.

pub mod indicators;
pub mod processor;
pub mod signals;
pub mod valuation;

pub use indicators::{IndicatorError, IndicatorResult, TrendIndicators, WindowParams};
pub use processor::{MergedRow, MetricsProcessor, ProcessError, ProcessorParams};
pub use signals::{MovingAveragePair, SignalDetector};
