//! Batch generation for a period.
//!
//! This module builds linked registration and order batches. The same period
//! and seed always produce identical output: draws happen in a fixed order
//! (counts, registrations, freestanding national ids, orders) from one
//! ChaCha8 generator owned by the call.

use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::factory::RecordFactory;
use crate::period::Period;
use crate::record::{NationalId, Order, Registration};

/// Number of registrations generated per call.
pub const REGISTRATION_COUNT_RANGE: RangeInclusive<usize> = 2..=20;

/// Number of orders generated per call.
pub const ORDER_COUNT_RANGE: RangeInclusive<usize> = 40..=90;

/// Summary counts for one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStats {
    /// Number of registrations generated.
    pub registration_count: usize,
    /// Number of orders generated.
    pub order_count: usize,
    /// Number of national ids orders could reference.
    pub pool_size: usize,
}

/// The registration and order batches of one generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batches {
    /// Generated registrations.
    pub registrations: Vec<Registration>,
    /// Generated orders.
    pub orders: Vec<Order>,
}

/// Output of [`PeriodGenerator::generate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Period the records were dated within.
    pub period: Period,
    /// Summary counts.
    pub stats: GenerationStats,
    /// Generated records.
    pub data: Batches,
}

/// Builds linked registration and order batches for a period.
///
/// The generator performs no validation: callers resolve and validate the
/// [`Period`] first.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use seed_data::{Period, PeriodGenerator};
///
/// let period = Period::new(
///     NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date"),
///     NaiveDate::from_ymd_opt(2025, 6, 24).expect("valid date"),
/// )
/// .expect("valid period");
///
/// let generator = PeriodGenerator::new();
/// let first = generator.generate(&period, Some(42));
/// let second = generator.generate(&period, Some(42));
///
/// assert_eq!(first, second);
/// assert!((2..=20).contains(&first.stats.registration_count));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodGenerator;

impl PeriodGenerator {
    /// Creates a generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generates batches for `period`.
    ///
    /// With a `seed`, the output is fully reproducible; without one, the run
    /// is seeded from the thread-local entropy source.
    #[must_use]
    pub fn generate(&self, period: &Period, seed: Option<u64>) -> GenerationResult {
        let effective_seed = seed.unwrap_or_else(|| rand::rng().random());
        self.generate_with_rng(period, ChaCha8Rng::seed_from_u64(effective_seed))
    }

    /// Generates batches for `period` drawing from the supplied generator.
    pub fn generate_with_rng<R: Rng>(&self, period: &Period, mut rng: R) -> GenerationResult {
        let registration_count = rng.random_range(REGISTRATION_COUNT_RANGE);
        let order_count = rng.random_range(ORDER_COUNT_RANGE);

        info!(
            start = %period.start(),
            end = %period.end(),
            registration_count,
            order_count,
            "generating period batches"
        );

        let mut factory = RecordFactory::new(rng);
        let registrations: Vec<Registration> = (0..registration_count)
            .map(|_| factory.new_registration(period))
            .collect();

        let pool = national_id_pool(&mut factory, &registrations, order_count);

        let orders: Vec<Order> = (0..order_count)
            .map(|_| factory.new_order(period, &pool))
            .collect();

        GenerationResult {
            period: *period,
            stats: GenerationStats {
                registration_count: registrations.len(),
                order_count: orders.len(),
                pool_size: pool.len(),
            },
            data: Batches {
                registrations,
                orders,
            },
        }
    }
}

/// Collects the registrations' national ids, topping the pool up with
/// `order_count / 2` freestanding ids when it holds fewer than that.
fn national_id_pool<R: Rng>(
    factory: &mut RecordFactory<R>,
    registrations: &[Registration],
    order_count: usize,
) -> Vec<NationalId> {
    let mut pool: Vec<NationalId> = registrations
        .iter()
        .map(|registration| registration.national_id.clone())
        .collect();

    let minimum = order_count.div_euclid(2);
    if pool.len() < minimum {
        pool.extend((0..minimum).map(|_| factory.freestanding_national_id()));
    }
    pool
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[fixture]
    fn period() -> Period {
        Period::new(date(2025, 6, 10), date(2025, 6, 24)).expect("valid period")
    }

    #[rstest]
    fn generation_is_deterministic_for_a_seed(period: Period) {
        let generator = PeriodGenerator::new();
        let first = generator.generate(&period, Some(42));
        let second = generator.generate(&period, Some(42));

        assert_eq!(first, second);
        let first_json = serde_json::to_string(&first).expect("serialize");
        let second_json = serde_json::to_string(&second).expect("serialize");
        assert_eq!(first_json, second_json);
    }

    #[rstest]
    fn different_seeds_produce_different_batches(period: Period) {
        let generator = PeriodGenerator::new();
        let first = generator.generate(&period, Some(42));
        let second = generator.generate(&period, Some(43));

        assert_ne!(
            first.data.orders.first().map(|order| order.order_id),
            second.data.orders.first().map(|order| order.order_id)
        );
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(42)]
    #[case(2025)]
    #[case(u64::MAX)]
    fn counts_stay_within_ranges(period: Period, #[case] seed: u64) {
        let result = PeriodGenerator::new().generate(&period, Some(seed));

        assert!(REGISTRATION_COUNT_RANGE.contains(&result.stats.registration_count));
        assert!(ORDER_COUNT_RANGE.contains(&result.stats.order_count));
        assert_eq!(result.stats.registration_count, result.data.registrations.len());
        assert_eq!(result.stats.order_count, result.data.orders.len());
    }

    #[rstest]
    fn small_registration_pools_are_topped_up(period: Period) {
        for seed in 0..20 {
            let result = PeriodGenerator::new().generate(&period, Some(seed));
            let minimum = result.stats.order_count.div_euclid(2);
            let registrations = result.stats.registration_count;

            let expected = if registrations < minimum {
                registrations + minimum
            } else {
                registrations
            };
            assert_eq!(result.stats.pool_size, expected);
            assert!(result.stats.pool_size >= minimum);
        }
    }

    #[rstest]
    fn orders_reference_pool_members(period: Period) {
        let result = PeriodGenerator::new().generate(&period, Some(7));

        // Replay the draws up to the pool to recover its members.
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let registration_count = rng.random_range(REGISTRATION_COUNT_RANGE);
        let order_count = rng.random_range(ORDER_COUNT_RANGE);
        let mut factory = RecordFactory::new(rng);
        let registrations: Vec<Registration> = (0..registration_count)
            .map(|_| factory.new_registration(&period))
            .collect();
        let pool: HashSet<NationalId> = national_id_pool(&mut factory, &registrations, order_count)
            .into_iter()
            .collect();

        assert_eq!(registrations, result.data.registrations);
        for order in &result.data.orders {
            assert!(
                pool.contains(&order.national_id),
                "order references unknown national id {}",
                order.national_id
            );
        }
    }

    #[rstest]
    fn all_dates_fall_within_period(period: Period) {
        let result = PeriodGenerator::new().generate(&period, None);

        for registration in &result.data.registrations {
            assert!(period.contains(registration.registered_on));
        }
        for order in &result.data.orders {
            assert!(period.contains(order.ordered_on));
        }
    }

    #[rstest]
    fn stats_serialize_to_camel_case(period: Period) {
        let result = PeriodGenerator::new().generate(&period, Some(1));
        let json = serde_json::to_value(&result).expect("serialize");

        assert!(json["stats"]["registrationCount"].is_u64());
        assert!(json["stats"]["orderCount"].is_u64());
        assert!(json["stats"]["poolSize"].is_u64());
        assert_eq!(json["period"]["start"], "2025-06-10");
        assert_eq!(json["period"]["end"], "2025-06-24");
        assert!(json["data"]["registrations"].is_array());
    }

    #[test]
    fn pool_is_not_topped_up_when_large_enough() {
        let period = Period::new(date(2025, 6, 10), date(2025, 6, 10)).expect("valid period");
        let mut factory = RecordFactory::new(ChaCha8Rng::seed_from_u64(3));
        let registrations: Vec<Registration> =
            (0..25).map(|_| factory.new_registration(&period)).collect();

        let pool = national_id_pool(&mut factory, &registrations, 40);

        assert_eq!(pool.len(), 25);
    }
}
