//! End-to-end and property tests for the pricing engine

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use crate::config::MAX_PROFIT_PERCENT;
use crate::strategy::{quote_at, search_profit, ProfitMeasure};
use crate::{
    compute_pricing, price_series, OrderBookSnapshot, PricePoint, PriceSample, PricingConfig,
    PricingError, StrategyKind,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap()
}

fn sample_from(points: &[(i64, f64, Option<f64>)]) -> PriceSample {
    PriceSample::newest_first(
        points
            .iter()
            .map(|&(days, price, sticker)| {
                PricePoint::new(now() - Duration::days(days), price, sticker)
            })
            .collect(),
    )
}

#[cfg(test)]
mod reference_cases {
    use super::*;

    fn reference_config() -> PricingConfig {
        PricingConfig {
            profit_percent: 10.0,
            fee_rate: 0.15,
            pleasant_profit: 0.0,
            include_stickers: false,
            ..Default::default()
        }
    }

    #[test]
    fn naive_config_reports_exact_loss() {
        let sample = sample_from(&[(0, 100.0, None)]);
        let result =
            compute_pricing(&sample, &reference_config(), now(), None, None, None).unwrap();
        assert_eq!(result.sell_price, 93.0);
        assert_eq!(result.fee, 13.0);
        assert_eq!(result.profit_after_fees, -20.0);
        assert!(result.profit_after_fees <= result.profit_before_fees);
    }

    #[test]
    fn demand_skew_doubles_buy_price() {
        let sample = sample_from(&[(0, 100.0, None)]);
        let book = OrderBookSnapshot::new(10, 5);
        let result =
            compute_pricing(&sample, &reference_config(), now(), Some(&book), None, None).unwrap();
        assert_eq!(result.buy_price, (100.0f64 * 2.0).ceil());
    }

    #[test]
    fn balanced_book_changes_nothing() {
        let sample = sample_from(&[(0, 100.0, None)]);
        let book = OrderBookSnapshot::new(5, 5);
        let config = reference_config();
        let with_book = compute_pricing(&sample, &config, now(), Some(&book), None, None).unwrap();
        let without = compute_pricing(&sample, &config, now(), None, None, None).unwrap();
        assert_eq!(with_book, without);
    }

    #[test]
    fn empty_sample_is_insufficient_data() {
        let sample = PriceSample::default();
        let result = compute_pricing(&sample, &reference_config(), now(), None, None, None);
        assert!(matches!(result, Err(PricingError::InsufficientData { .. })));
    }

    #[test]
    fn sticker_markup_is_clamped_to_minimum() {
        let sample = sample_from(&[(0, 100.0, Some(20.0)), (1, 100.0, Some(20.0))]);
        let config = PricingConfig {
            include_stickers: true,
            sticker_markup_percent: 10.0,
            minimum_sticker_markup: 5.0,
            ..reference_config()
        };
        let result = compute_pricing(&sample, &config, now(), None, None, None).unwrap();
        assert_eq!(result.sticker_markup_applied, 5.0);
    }

    #[test]
    fn invalid_config_is_rejected_before_pricing() {
        let sample = sample_from(&[(0, 100.0, None)]);
        let config = PricingConfig { corridor_percent: 75.0, ..reference_config() };
        assert!(matches!(
            compute_pricing(&sample, &config, now(), None, None, None),
            Err(PricingError::InvalidConfig(_))
        ));
        assert!(matches!(
            price_series(&sample, &config, now()),
            Err(PricingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn encoded_dates_feed_the_window() {
        let points = vec![
            PricePoint::from_encoded_date(20240831, 12.0, None).unwrap(),
            PricePoint::from_encoded_date(20240701, 50.0, None).unwrap(),
        ];
        let sample = PriceSample::newest_first(points);
        let config = PricingConfig { analysis_period_days: 7, ..reference_config() };
        let series = price_series(&sample, &config, now()).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].price, 12.0);
    }
}

fn arb_points() -> impl Strategy<Value = Vec<(i64, f64, Option<f64>)>> {
    let point = (0i64..45, 0.05f64..5000.0, prop::option::of(0.0f64..50.0));
    prop::collection::vec(point, 1..20)
}

fn arb_strategy() -> impl Strategy<Value = StrategyKind> {
    prop_oneof![
        Just(StrategyKind::ProfitSearch),
        Just(StrategyKind::PreFeeProfitSearch),
        Just(StrategyKind::CorridorBound),
    ]
}

fn arb_config() -> impl Strategy<Value = PricingConfig> {
    (
        arb_strategy(),
        0.0f64..=50.0,
        -50.0f64..200.0,
        -50.0f64..100.0,
        any::<bool>(),
        0.0f64..40.0,
        0.0f64..5.0,
        0.0f64..0.5,
    )
        .prop_map(|(strategy, corridor, profit, pleasant, stickers, pct, min, fee_rate)| {
            PricingConfig {
                strategy,
                corridor_percent: corridor,
                profit_percent: profit,
                pleasant_profit: pleasant,
                include_stickers: stickers,
                sticker_markup_percent: pct,
                minimum_sticker_markup: min,
                fee_rate,
                ..Default::default()
            }
        })
}

proptest! {
    #[test]
    fn prices_stay_above_minimum_and_fees_never_add_profit(
        points in arb_points(),
        config in arb_config(),
        book in prop::option::of((1u64..200, 1u64..200)),
    ) {
        let sample = sample_from(&points);
        let book = book.map(|(b, s)| OrderBookSnapshot::new(b, s));
        match compute_pricing(&sample, &config, now(), book.as_ref(), None, None) {
            Ok(result) => {
                prop_assert!(result.buy_price >= 1.0);
                prop_assert!(result.sell_price >= 1.0);
                prop_assert!(result.profit_after_fees <= result.profit_before_fees);
                prop_assert!(result.buy_price.is_finite() && result.sell_price.is_finite());
            }
            Err(PricingError::InsufficientData { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    #[test]
    fn profit_search_is_idempotent(
        raw in 0.05f64..5000.0,
        markup in 0.0f64..20.0,
        profit in -50.0f64..=MAX_PROFIT_PERCENT,
        pleasant in -50.0f64..1.0e6,
        before_fees in any::<bool>(),
    ) {
        let config = PricingConfig {
            profit_percent: profit,
            pleasant_profit: pleasant,
            ..Default::default()
        };
        let measure =
            if before_fees { ProfitMeasure::BeforeFees } else { ProfitMeasure::AfterFees };
        let start = quote_at(raw, markup, &config);
        let (first, _) = search_profit(start, markup, &config, measure);
        let (second, steps) = search_profit(first, markup, &config, measure);
        prop_assert_eq!(first, second);
        prop_assert_eq!(steps, 0);
    }

    #[test]
    fn search_never_lowers_measured_profit(
        raw in 0.05f64..5000.0,
        profit in -50.0f64..200.0,
        pleasant in -50.0f64..150.0,
    ) {
        let config = PricingConfig {
            profit_percent: profit,
            pleasant_profit: pleasant,
            ..Default::default()
        };
        let start = quote_at(raw, 0.0, &config);
        let (accepted, steps) = search_profit(start, 0.0, &config, ProfitMeasure::AfterFees);
        prop_assert!(accepted.profit_after_fees >= start.profit_after_fees);
        let expected = raw + f64::from(steps) * config.price_step;
        prop_assert!((accepted.buy_price - expected).abs() < 1e-6);
    }
}
