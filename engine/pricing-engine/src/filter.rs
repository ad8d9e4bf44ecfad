//! Historical filtering: analysis window and price corridor
//!
//! The corridor is a band on a 0-100 scale where the window median sits at 50.
//! A point survives when `corridor <= 50 * price / median <= 100 - corridor`,
//! so `corridor_percent = 5` keeps prices between 0.1x and 1.9x the median and
//! `corridor_percent = 50` keeps only prices equal to the median.

use crate::config::PricingConfig;
use crate::error::{PricingError, Result};
use crate::models::{PricePoint, PriceSample};
use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// Midpoint of the normalized corridor scale
const SCALE_MIDPOINT: f64 = 50.0;

/// Reject points that cannot be priced
pub fn validate_points(sample: &PriceSample) -> Result<()> {
    for (i, point) in sample.points.iter().enumerate() {
        if !point.price.is_finite() || point.price <= 0.0 {
            return Err(PricingError::InvalidInput(format!(
                "point {} has non-positive or non-finite price {}",
                i, point.price
            )));
        }
        if let Some(sticker) = point.sticker_price {
            if !sticker.is_finite() || sticker < 0.0 {
                return Err(PricingError::InvalidInput(format!(
                    "point {} has invalid sticker price {}",
                    i, sticker
                )));
            }
        }
    }
    Ok(())
}

/// Keep points dated within `[now - period, now]`
pub fn within_window(sample: &PriceSample, now: DateTime<Utc>, period: Duration) -> PriceSample {
    let start = now - period;
    sample.retain_where(|p| p.timestamp >= start && p.timestamp <= now)
}

/// Median price of a sample, `None` when empty
pub fn median_price(points: &[PricePoint]) -> Option<f64> {
    if points.is_empty() {
        return None;
    }
    let mut prices: Vec<f64> = points.iter().map(|p| p.price).collect();
    prices.sort_by(|a, b| a.total_cmp(b));
    let mid = prices.len() / 2;
    if prices.len() % 2 == 0 {
        Some((prices[mid - 1] + prices[mid]) / 2.0)
    } else {
        Some(prices[mid])
    }
}

/// Keep points whose median-normalized price lies in `[corridor, 100 - corridor]`
pub fn within_corridor(sample: &PriceSample, corridor_percent: f64) -> PriceSample {
    let median = match median_price(&sample.points) {
        Some(m) => m,
        None => return sample.clone(),
    };
    let lower = corridor_percent;
    let upper = 100.0 - corridor_percent;
    sample.retain_where(|p| {
        let normalized = SCALE_MIDPOINT * p.price / median;
        normalized >= lower && normalized <= upper
    })
}

/// Apply the analysis window and the corridor; fails when nothing survives
pub fn filter_sample(
    sample: &PriceSample,
    config: &PricingConfig,
    now: DateTime<Utc>,
) -> Result<PriceSample> {
    validate_points(sample)?;

    let windowed = within_window(sample, now, config.analysis_period());
    let filtered = within_corridor(&windowed, config.corridor_percent);

    debug!(
        "Filtered price sample: {} received, {} in window, {} in corridor",
        sample.len(),
        windowed.len(),
        filtered.len()
    );

    if filtered.is_empty() {
        return Err(PricingError::InsufficientData {
            total: sample.len(),
            in_window: windowed.len(),
        });
    }
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn days_ago(days: i64, price: f64) -> PricePoint {
        PricePoint::new(now() - Duration::days(days), price, None)
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let sample = PriceSample::newest_first(vec![
            days_ago(0, 10.0),
            days_ago(7, 11.0),
            days_ago(8, 12.0),
            PricePoint::new(now() + Duration::seconds(1), 13.0, None),
        ]);
        let kept = within_window(&sample, now(), Duration::days(7));
        let prices: Vec<f64> = kept.points.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![10.0, 11.0]);
    }

    #[test]
    fn median_handles_even_and_odd_lengths() {
        let odd = vec![days_ago(0, 3.0), days_ago(1, 1.0), days_ago(2, 2.0)];
        assert_eq!(median_price(&odd), Some(2.0));
        let even = vec![days_ago(0, 4.0), days_ago(1, 1.0), days_ago(2, 2.0), days_ago(3, 3.0)];
        assert_eq!(median_price(&even), Some(2.5));
        assert_eq!(median_price(&[]), None);
    }

    #[test]
    fn corridor_drops_outliers_and_keeps_order() {
        // median 10 -> band [1, 19] at corridor 5
        let sample = PriceSample::newest_first(vec![
            days_ago(0, 10.0),
            days_ago(1, 25.0),
            days_ago(2, 9.0),
            days_ago(3, 0.5),
            days_ago(4, 11.0),
        ]);
        let kept = within_corridor(&sample, 5.0);
        let prices: Vec<f64> = kept.points.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![10.0, 9.0, 11.0]);
    }

    #[test]
    fn widest_corridor_keeps_up_to_twice_the_median() {
        let sample = PriceSample::newest_first(vec![
            days_ago(0, 10.0),
            days_ago(1, 20.0),
            days_ago(2, 5.0),
        ]);
        assert_eq!(within_corridor(&sample, 0.0).len(), 3);
    }

    #[test]
    fn empty_result_is_insufficient_data() {
        let sample = PriceSample::newest_first(vec![days_ago(40, 10.0), days_ago(45, 11.0)]);
        let config = PricingConfig::default();
        match filter_sample(&sample, &config, now()) {
            Err(PricingError::InsufficientData { total, in_window }) => {
                assert_eq!(total, 2);
                assert_eq!(in_window, 0);
            }
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }

    #[test]
    fn empty_sample_is_insufficient_data() {
        let config = PricingConfig::default();
        assert!(matches!(
            filter_sample(&PriceSample::default(), &config, now()),
            Err(PricingError::InsufficientData { total: 0, in_window: 0 })
        ));
    }

    #[test]
    fn non_positive_prices_are_rejected() {
        let sample = PriceSample::newest_first(vec![days_ago(0, 0.0)]);
        assert!(matches!(
            filter_sample(&sample, &PricingConfig::default(), now()),
            Err(PricingError::InvalidInput(_))
        ));
        let sample = PriceSample::newest_first(vec![PricePoint::new(now(), 5.0, Some(f64::NAN))]);
        assert!(matches!(
            filter_sample(&sample, &PricingConfig::default(), now()),
            Err(PricingError::InvalidInput(_))
        ));
    }
}
