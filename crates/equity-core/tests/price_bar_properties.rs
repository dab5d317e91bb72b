//! PriceBar 불변식 속성 테스트

use chrono::NaiveDate;
use equity_core::{PriceBar, PriceBarError};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn cents(v: i64) -> Decimal {
    Decimal::new(v, 2)
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

proptest! {
    /// 생성 성공 여부는 `low <= open < high` 조건과 정확히 일치해야 한다
    #[test]
    fn construction_matches_invariant(
        open in 1i64..100_000,
        high in 1i64..100_000,
        low in 1i64..100_000,
        close in 1i64..100_000,
    ) {
        let result = PriceBar::new(day(), cents(open), cents(high), cents(low), cents(close), 0);
        let expected_ok = low <= high && low <= open && open < high;

        prop_assert_eq!(result.is_ok(), expected_ok);
    }

    /// 고가가 저가보다 낮으면 항상 HighBelowLow로 거부된다
    #[test]
    fn inverted_band_reports_high_below_low(
        low in 2i64..100_000,
        gap in 1i64..1_000,
        open in 1i64..100_000,
    ) {
        let high = (low - gap).max(1);
        prop_assume!(high < low);

        let err = PriceBar::new(day(), cents(open), cents(high), cents(low), cents(low), 0).unwrap_err();
        let is_high_below_low = matches!(err, PriceBarError::HighBelowLow { .. });
        prop_assert!(is_high_below_low);
    }

    /// 검증된 바는 JSON 왕복 후에도 동일하다
    #[test]
    fn valid_bar_survives_json(low in 1i64..10_000, spread in 1i64..1_000, offset in 0i64..1_000) {
        let high = low + spread;
        let open = low + offset % spread;
        let bar = PriceBar::new(day(), cents(open), cents(high), cents(low), cents(high), 42)
            .unwrap()
            .with_adj_close(Some(cents(low)));

        let json = serde_json::to_string(&bar).unwrap();
        let back: PriceBar = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, bar);
    }
}
