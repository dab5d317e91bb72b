//! 밸류에이션 지표.
//!
//! 행 하나의 값만으로 계산하는 순수 함수들입니다. 피연산자가 없거나 계산이
//! 불가능하면 `None`을 반환하며, 실행 전체를 실패시키지 않습니다.

use equity_core::{checked_ratio, decimal_to_f64, FundamentalsSnapshot};
use rust_decimal::Decimal;

/// 주당순자산 (BVPS) = 자기자본 / 발행 주식 수.
///
/// 둘 중 하나가 없거나 주식 수가 0이면 `None`.
pub fn book_value_per_share(snapshot: &FundamentalsSnapshot) -> Option<Decimal> {
    checked_ratio(snapshot.total_equity?, snapshot.shares_outstanding?)
}

/// 주가순자산비율 (PBR) = 종가 / 주당순자산.
///
/// 주당순자산이 없거나 0이면 `None`.
pub fn price_to_book(close: Decimal, book_value_per_share: Option<Decimal>) -> Option<Decimal> {
    checked_ratio(close, book_value_per_share?)
}

/// 스냅샷의 총부채.
///
/// 직접 보고된 총부채가 있으면 그 값을, 없으면 단기 + 장기 부채(각각 없으면 0)를 사용합니다.
/// 합산이 넘치면 `None`.
pub fn total_debt(snapshot: &FundamentalsSnapshot) -> Option<Decimal> {
    match snapshot.total_debt {
        Some(total) => Some(total),
        None => snapshot
            .short_term_debt
            .unwrap_or(Decimal::ZERO)
            .checked_add(snapshot.long_term_debt.unwrap_or(Decimal::ZERO)),
    }
}

/// 단순 기업가치 (EV) = 시가총액 + 총부채 - 현금.
///
/// 시가총액이 없으면 부채/현금 유무와 관계없이 `None`입니다.
/// 스냅샷이 없는 행은 부채와 현금을 0으로 봅니다. 부동소수점으로 계산합니다.
pub fn enterprise_value(
    market_cap: Option<Decimal>,
    snapshot: Option<&FundamentalsSnapshot>,
) -> Option<f64> {
    let market_cap = decimal_to_f64(market_cap?)?;

    let (debt, cash) = match snapshot {
        Some(s) => (
            decimal_to_f64(total_debt(s)?)?,
            decimal_to_f64(s.cash_and_equivalents.unwrap_or(Decimal::ZERO))?,
        ),
        None => (0.0, 0.0),
    };

    let ev = market_cap + debt - cash;
    ev.is_finite().then_some(ev)
}
