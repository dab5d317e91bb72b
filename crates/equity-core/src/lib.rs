//! # Equity Core
//!
//! 종목 지표 파이프라인의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 일봉 가격 바 및 불변식 검증
//! - 분기 재무 스냅샷, 기업 정보
//! - 처리된 지표 행과 크로스 신호 이벤트
//! - JSON 내보내기 문서
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
