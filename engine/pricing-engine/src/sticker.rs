//! Sticker markup computation

use crate::config::{PricingConfig, STICKER_WINDOW};
use crate::models::{PricePoint, PriceSample};
use tracing::{debug, info};

/// Premium added to the baseline for attached stickers.
///
/// Averages the sticker prices of the most recent sticker-bearing points
/// (a zero sticker price counts as no sticker),
/// scales by `sticker_markup_percent` and lifts the result to
/// `minimum_sticker_markup`. Returns 0 when stickers are excluded or no point
/// carries a sticker price.
pub fn sticker_markup(sample: &PriceSample, config: &PricingConfig) -> f64 {
    if !config.include_stickers {
        return 0.0;
    }

    let recent: Vec<f64> = sample
        .iter_recent()
        .filter_map(PricePoint::sticker_value)
        .take(STICKER_WINDOW)
        .collect();

    if recent.is_empty() {
        info!("No listings with stickers found, sticker markup set to 0");
        return 0.0;
    }

    let average = recent.iter().sum::<f64>() / recent.len() as f64;
    let markup = average * (config.sticker_markup_percent / 100.0);
    let applied = markup.max(config.minimum_sticker_markup);

    debug!(
        "Sticker markup: average {:.4} over {} points, computed {:.4}, applied {:.4}",
        average,
        recent.len(),
        markup,
        applied
    );

    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn sample_with_stickers(stickers: &[Option<f64>]) -> PriceSample {
        let base = Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0).unwrap();
        let points = stickers
            .iter()
            .enumerate()
            .map(|(i, s)| PricePoint::new(base - Duration::hours(i as i64), 10.0, *s))
            .collect();
        PriceSample::newest_first(points)
    }

    fn config(percent: f64, minimum: f64) -> PricingConfig {
        PricingConfig {
            include_stickers: true,
            sticker_markup_percent: percent,
            minimum_sticker_markup: minimum,
            ..Default::default()
        }
    }

    #[test]
    fn excluded_stickers_yield_zero() {
        let sample = sample_with_stickers(&[Some(100.0)]);
        let config = PricingConfig { include_stickers: false, ..config(50.0, 1.0) };
        assert_eq!(sticker_markup(&sample, &config), 0.0);
    }

    #[test]
    fn no_sticker_points_yield_zero() {
        let sample = sample_with_stickers(&[None, None]);
        assert_eq!(sticker_markup(&sample, &config(10.0, 5.0)), 0.0);
    }

    #[test]
    fn averages_only_the_seven_most_recent() {
        // eight sticker points; the oldest (1000) must be ignored
        let mut stickers = vec![Some(20.0); 7];
        stickers.insert(3, None);
        stickers.push(Some(1000.0));
        let sample = sample_with_stickers(&stickers);
        assert_eq!(sticker_markup(&sample, &config(10.0, 0.0)), 2.0);
    }

    #[test]
    fn oldest_first_samples_use_the_tail() {
        let mut stickers = vec![Some(40.0); 7];
        stickers.push(Some(4000.0));
        let mut sample = sample_with_stickers(&stickers);
        sample.points.reverse();
        sample.order = crate::models::SampleOrder::OldestFirst;
        assert_eq!(sticker_markup(&sample, &config(10.0, 0.0)), 4.0);
    }

    #[test]
    fn zero_sticker_prices_are_skipped() {
        // zeros neither count toward the window nor drag the average down
        let mut stickers = vec![Some(0.0); 3];
        stickers.extend(vec![Some(30.0); 7]);
        stickers.push(Some(3000.0));
        let sample = sample_with_stickers(&stickers);
        assert_eq!(sticker_markup(&sample, &config(10.0, 0.0)), 3.0);
    }

    #[test]
    fn only_zero_sticker_prices_yield_zero() {
        let sample = sample_with_stickers(&[Some(0.0), None, Some(0.0)]);
        assert_eq!(sticker_markup(&sample, &config(10.0, 5.0)), 0.0);
    }

    #[test]
    fn markup_is_clamped_up_to_minimum() {
        // average 20, 10% -> 2, minimum 5
        let sample = sample_with_stickers(&[Some(20.0), Some(20.0)]);
        assert_eq!(sticker_markup(&sample, &config(10.0, 5.0)), 5.0);
    }
}
