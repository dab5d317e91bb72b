//! 가격 및 비율 계산에 사용하는 Decimal 헬퍼.
//!
//! 데이터 제공자는 가격을 이진 부동소수점으로 반환하므로, 가장 짧은 10진 표현을
//! 거쳐 `Decimal`로 변환합니다. 이렇게 하면 `187.44`가 `187.4400000000000261...`이
//! 되지 않습니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// 가격 타입.
pub type Price = Decimal;

/// `f64`를 가장 짧은 10진 표현을 통해 `Decimal`로 변환합니다.
///
/// NaN, 무한대, 표현 범위를 벗어나는 값은 `None`을 반환합니다.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string())
        .or_else(|_| Decimal::from_scientific(&format!("{:e}", value)))
        .ok()
}

/// `Decimal`을 `f64`로 변환합니다.
pub fn decimal_to_f64(value: Decimal) -> Option<f64> {
    value.to_f64()
}

/// 분모가 0이거나 결과가 범위를 벗어나면 `None`을 반환하는 나눗셈.
pub fn checked_ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator.is_zero() {
        return None;
    }
    numerator.checked_div(denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_from_f64_shortest_repr() {
        assert_eq!(decimal_from_f64(187.44), Some(dec!(187.44)));
        assert_eq!(decimal_from_f64(0.1), Some(dec!(0.1)));
        assert_eq!(decimal_from_f64(100.0), Some(dec!(100)));
    }

    #[test]
    fn test_decimal_from_f64_rejects_non_finite() {
        assert_eq!(decimal_from_f64(f64::NAN), None);
        assert_eq!(decimal_from_f64(f64::INFINITY), None);
        assert_eq!(decimal_from_f64(f64::NEG_INFINITY), None);
    }

    #[test]
    fn test_decimal_from_f64_tiny_value() {
        let tiny = decimal_from_f64(1e-20).unwrap();
        assert!(tiny > Decimal::ZERO);
        assert!(tiny < dec!(0.000001));
    }

    #[test]
    fn test_checked_ratio() {
        assert_eq!(checked_ratio(dec!(100), dec!(4)), Some(dec!(25)));
        assert_eq!(checked_ratio(dec!(100), Decimal::ZERO), None);
    }
}
