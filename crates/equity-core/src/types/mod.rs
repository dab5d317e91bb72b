//! 수치 타입 및 변환 유틸리티.

mod decimal;

pub use decimal::*;
