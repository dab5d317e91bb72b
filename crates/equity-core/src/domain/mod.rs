//! 도메인 모델.

mod company;
mod export;
mod fundamentals;
mod metrics;
mod price_bar;
mod signal;

pub use company::*;
pub use export::*;
pub use fundamentals::*;
pub use metrics::*;
pub use price_bar::*;
pub use signal::*;
