//! Single-record synthesis.
//!
//! [`RecordFactory`] owns the pseudo-random generator for one generation
//! run. Every attribute, including faked personal data, is drawn from that
//! generator, so a seeded generator yields identical records.

use std::collections::HashSet;

use chrono::{Days, Months, NaiveDate};
use fake::Fake;
use fake::faker::address::raw::{BuildingNumber, CityName, PostCode, StateAbbr, StreetName};
use fake::faker::name::raw::Name;
use fake::faker::phone_number::raw::PhoneNumber;
use fake::locales::PT_BR;
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;
use uuid::{Builder, Uuid};

use crate::period::Period;
use crate::record::{COUNTRY, Gender, NationalId, Order, OrderStatus, Registration};

/// Maximum number of draws spent looking for an unused national id.
pub const MAX_NATIONAL_ID_ATTEMPTS: usize = 100;

/// Youngest age, in years, of a generated customer at the period end.
const MIN_AGE_YEARS: u32 = 18;

/// Oldest age, in years, of a generated customer at the period end.
const MAX_AGE_YEARS: u32 = 90;

/// Order value bounds, in cents.
const ORDER_VALUE_CENTS: (i64, i64) = (5_000, 200_000);

/// Shipping value bounds, in cents.
const SHIPPING_VALUE_CENTS: (i64, i64) = (500, 10_000);

/// Discount bounds as basis points of the order value (5% to 20%).
const DISCOUNT_BASIS_POINTS: (i64, i64) = (500, 2_000);

/// Probability of an order carrying a discount (20%).
const DISCOUNT_PROBABILITY_NUMERATOR: u32 = 1;

/// Probability denominator for discount selection.
const DISCOUNT_PROBABILITY_DENOMINATOR: u32 = 5;

/// Prefix of every generated coupon code.
const COUPON_PREFIX: &str = "CUPOM";

/// Delivery districts; the locale data has no neighbourhood faker.
const DISTRICTS: [&str; 12] = [
    "Centro",
    "Jardim América",
    "Vila Mariana",
    "Boa Vista",
    "Santa Cecília",
    "Copacabana",
    "Savassi",
    "Moinhos de Vento",
    "Batel",
    "Aldeota",
    "Pituba",
    "Boa Viagem",
];

/// Produces individual registration and order records.
///
/// The factory remembers every national id it has issued for
/// registrations, so ids stay unique within a run unless the bounded retry
/// is exhausted.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
/// use seed_data::{Period, RecordFactory};
///
/// let period = Period::new(
///     NaiveDate::from_ymd_opt(2025, 6, 10).expect("valid date"),
///     NaiveDate::from_ymd_opt(2025, 6, 24).expect("valid date"),
/// )
/// .expect("valid period");
///
/// let mut factory = RecordFactory::new(ChaCha8Rng::seed_from_u64(7));
/// let registration = factory.new_registration(&period);
/// let order = factory.new_order(&period, &[registration.national_id.clone()]);
///
/// assert_eq!(order.national_id, registration.national_id);
/// assert!(period.contains(order.ordered_on));
/// ```
#[derive(Debug)]
pub struct RecordFactory<R> {
    rng: R,
    issued_national_ids: HashSet<NationalId>,
}

impl<R: Rng> RecordFactory<R> {
    /// Creates a factory drawing from `rng`.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            issued_national_ids: HashSet::new(),
        }
    }

    /// Generates one registration dated within `period`.
    pub fn new_registration(&mut self, period: &Period) -> Registration {
        let id = self.new_uuid();
        let name: String = Name(PT_BR).fake_with_rng(&mut self.rng);
        let birth_date = self.birth_date(period.end());
        let national_id = self.unique_national_id();
        let postal_code: String = PostCode(PT_BR).fake_with_rng(&mut self.rng);
        let city: String = CityName(PT_BR).fake_with_rng(&mut self.rng);
        let region: String = StateAbbr(PT_BR).fake_with_rng(&mut self.rng);
        let gender = if self.rng.random() {
            Gender::Male
        } else {
            Gender::Female
        };
        let phone: String = PhoneNumber(PT_BR).fake_with_rng(&mut self.rng);
        let registered_on = date_between(&mut self.rng, period.start(), period.end());

        Registration {
            id,
            name,
            birth_date,
            email: national_id.derived_email(),
            national_id,
            postal_code,
            city,
            region,
            country: COUNTRY.to_owned(),
            gender,
            phone,
            registered_on,
        }
    }

    /// Generates one order dated within `period`.
    ///
    /// The national id is drawn uniformly from `candidates`; an empty slice
    /// falls back to a freestanding id.
    pub fn new_order(&mut self, period: &Period, candidates: &[NationalId]) -> Order {
        let order_id = self.new_uuid();
        let national_id = match candidates.choose(&mut self.rng) {
            Some(id) => id.clone(),
            None => self.freestanding_national_id(),
        };
        let order_value = self.amount(ORDER_VALUE_CENTS);

        let (discount_value, coupon) = if self
            .rng
            .random_ratio(DISCOUNT_PROBABILITY_NUMERATOR, DISCOUNT_PROBABILITY_DENOMINATOR)
        {
            let basis_points = self
                .rng
                .random_range(DISCOUNT_BASIS_POINTS.0..=DISCOUNT_BASIS_POINTS.1);
            let coupon = format!("{COUPON_PREFIX}{:08X}", self.rng.random::<u32>());
            (discount_for(order_value, basis_points), Some(coupon))
        } else {
            (Decimal::ZERO, None)
        };

        let shipping_value = self.amount(SHIPPING_VALUE_CENTS);
        let delivery_street: String = StreetName(PT_BR).fake_with_rng(&mut self.rng);
        let delivery_number: String = BuildingNumber(PT_BR).fake_with_rng(&mut self.rng);
        let delivery_district = DISTRICTS
            .choose(&mut self.rng)
            .map_or_else(String::new, |district| (*district).to_owned());
        let delivery_city: String = CityName(PT_BR).fake_with_rng(&mut self.rng);
        let delivery_region: String = StateAbbr(PT_BR).fake_with_rng(&mut self.rng);
        let status = OrderStatus::ALL
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(OrderStatus::Pending);
        let ordered_on = date_between(&mut self.rng, period.start(), period.end());

        Order {
            order_id,
            national_id,
            order_value,
            shipping_value,
            discount_value,
            coupon,
            delivery_street,
            delivery_number,
            delivery_district,
            delivery_city,
            delivery_region,
            delivery_country: COUNTRY.to_owned(),
            status,
            ordered_on,
        }
    }

    /// Draws a national id that is not tied to any registration.
    ///
    /// Freestanding ids are not checked against, or added to, the issued
    /// set.
    pub fn freestanding_national_id(&mut self) -> NationalId {
        self.draw_national_id()
    }

    /// Returns the number of distinct national ids issued to registrations.
    #[must_use]
    pub fn issued_national_id_count(&self) -> usize {
        self.issued_national_ids.len()
    }

    /// Draws national ids until an unused one appears or the attempts run
    /// out, in which case the last draw is kept despite the collision.
    fn unique_national_id(&mut self) -> NationalId {
        let mut candidate = self.draw_national_id();
        for _ in 1..MAX_NATIONAL_ID_ATTEMPTS {
            if !self.issued_national_ids.contains(&candidate) {
                break;
            }
            candidate = self.draw_national_id();
        }

        if !self.issued_national_ids.insert(candidate.clone()) {
            warn!(
                national_id = %candidate,
                attempts = MAX_NATIONAL_ID_ATTEMPTS,
                "accepting duplicate national id after exhausting retries"
            );
        }
        candidate
    }

    fn draw_national_id(&mut self) -> NationalId {
        let rng = &mut self.rng;
        let digits: [u8; 11] = std::array::from_fn(|_| rng.random_range(0..=9));
        NationalId::from_digits(digits)
    }

    fn new_uuid(&mut self) -> Uuid {
        Builder::from_random_bytes(self.rng.random()).into_uuid()
    }

    fn amount(&mut self, (min_cents, max_cents): (i64, i64)) -> Decimal {
        Decimal::new(self.rng.random_range(min_cents..=max_cents), 2)
    }

    /// Draws a birth date such that the age at `reference` is between
    /// `MIN_AGE_YEARS` and `MAX_AGE_YEARS`.
    fn birth_date(&mut self, reference: NaiveDate) -> NaiveDate {
        let latest = reference
            .checked_sub_months(Months::new(MIN_AGE_YEARS * 12))
            .unwrap_or(reference);
        let earliest = reference
            .checked_sub_months(Months::new((MAX_AGE_YEARS + 1) * 12))
            .and_then(|date| date.checked_add_days(Days::new(1)))
            .unwrap_or(latest);
        date_between(&mut self.rng, earliest, latest)
    }
}

/// Picks a day uniformly from `[start, end]`.
fn date_between<R: Rng + ?Sized>(rng: &mut R, start: NaiveDate, end: NaiveDate) -> NaiveDate {
    let span = u64::try_from((end - start).num_days()).unwrap_or(0);
    let offset = rng.random_range(0..=span);
    start.checked_add_days(Days::new(offset)).unwrap_or(start)
}

/// Applies `basis_points` to `order_value`, rounded to cents and kept within
/// 5% to 20% of the order value.
fn discount_for(order_value: Decimal, basis_points: i64) -> Decimal {
    let floor = (order_value * Decimal::new(DISCOUNT_BASIS_POINTS.0, 4))
        .round_dp_with_strategy(2, RoundingStrategy::AwayFromZero);
    let ceiling = (order_value * Decimal::new(DISCOUNT_BASIS_POINTS.1, 4))
        .round_dp_with_strategy(2, RoundingStrategy::ToZero);
    (order_value * Decimal::new(basis_points, 4))
        .round_dp(2)
        .max(floor)
        .min(ceiling)
}
