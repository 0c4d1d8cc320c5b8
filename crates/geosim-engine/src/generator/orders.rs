use chrono::{Days, NaiveDate, Utc};
use geosim_core::{
    BoundingBox, Catalog, OrderRecord, SpatialPoint, StoreLocation, DELIVERY_MINUTES_MAX,
    DELIVERY_MINUTES_MIN,
};
use rand::Rng;

use super::sampling::{exponential, normal};
use crate::error::{require_positive, EngineError};
use crate::geometry::round2;

const PROGRESS_EVERY: usize = 10_000;

/// Knobs for synthetic order generation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderGeneratorConfig {
    pub count: usize,
    /// Dates are drawn uniformly from `[end_date - window_days, end_date]`.
    pub window_days: u32,
    pub end_date: NaiveDate,
    /// Sequence number of the first id; ids are `ORD_{seq:06}`.
    pub first_sequence: usize,
    /// Standard deviation of the customer offset from its store, per axis.
    pub location_spread_deg: f64,
    pub value_mean: f64,
    pub value_floor: f64,
    pub delivery_base_minutes: f64,
    pub delivery_minutes_per_degree: f64,
    pub delivery_noise_minutes: f64,
}

impl OrderGeneratorConfig {
    #[must_use]
    pub fn new(count: usize, window_days: u32, end_date: NaiveDate) -> Self {
        Self {
            count,
            window_days,
            end_date,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn starting_at(mut self, first_sequence: usize) -> Self {
        self.first_sequence = first_sequence;
        self
    }

    fn validate(&self) -> Result<NaiveDate, EngineError> {
        for (name, value) in [
            ("location_spread_deg", self.location_spread_deg),
            ("delivery_noise_minutes", self.delivery_noise_minutes),
            ("value_floor", self.value_floor),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(EngineError::invalid(name, format!("{value} must be >= 0")));
            }
        }
        require_positive("value_mean", self.value_mean)?;
        for (name, value) in [
            ("delivery_base_minutes", self.delivery_base_minutes),
            ("delivery_minutes_per_degree", self.delivery_minutes_per_degree),
        ] {
            if !value.is_finite() {
                return Err(EngineError::invalid(name, "must be finite"));
            }
        }
        self.end_date
            .checked_sub_days(Days::new(u64::from(self.window_days)))
            .ok_or_else(|| {
                EngineError::invalid("window_days", "date window reaches before the calendar")
            })
    }
}

impl Default for OrderGeneratorConfig {
    fn default() -> Self {
        Self {
            count: 50_000,
            window_days: 90,
            end_date: Utc::now().date_naive(),
            first_sequence: 1,
            location_spread_deg: 0.02,
            value_mean: 500.0,
            value_floor: 50.0,
            delivery_base_minutes: 20.0,
            delivery_minutes_per_degree: 1000.0,
            delivery_noise_minutes: 5.0,
        }
    }
}

/// Lazily yields `count` orders; nothing is materialized up front.
#[derive(Debug)]
pub struct OrderGenerator<'a, R> {
    stores: &'a [StoreLocation],
    bounds: BoundingBox,
    config: OrderGeneratorConfig,
    start_date: NaiveDate,
    rng: R,
    emitted: usize,
}

/// Start generating orders around the stores in `catalog`.
///
/// # Errors
///
/// Returns [`EngineError::EmptyCatalog`] when the catalog has no stores, and
/// [`EngineError::InvalidParameter`] for unusable distribution parameters.
pub fn generate_orders<R: Rng>(
    catalog: &Catalog,
    config: OrderGeneratorConfig,
    rng: R,
) -> Result<OrderGenerator<'_, R>, EngineError> {
    if catalog.stores.is_empty() {
        return Err(EngineError::EmptyCatalog);
    }
    let start_date = config.validate()?;

    Ok(OrderGenerator {
        stores: &catalog.stores,
        bounds: catalog.bounds,
        config,
        start_date,
        rng,
        emitted: 0,
    })
}

impl<R: Rng> OrderGenerator<'_, R> {
    /// Group the remaining orders into batches of `size` (at least 1).
    #[must_use]
    pub fn chunks(self, size: usize) -> OrderChunks<Self> {
        OrderChunks {
            inner: self,
            size: size.max(1),
        }
    }

    fn next_order(&mut self) -> OrderRecord {
        let cfg = &self.config;
        let rng = &mut self.rng;

        let store = &self.stores[rng.random_range(0..self.stores.len())];
        let lat_offset = normal(rng, 0.0, cfg.location_spread_deg);
        let lon_offset = normal(rng, 0.0, cfg.location_spread_deg);
        let customer = SpatialPoint::new(
            round6((store.location.lat + lat_offset).clamp(self.bounds.min_lat, self.bounds.max_lat)),
            round6((store.location.lon + lon_offset).clamp(self.bounds.min_lon, self.bounds.max_lon)),
        );

        let order_value = round2(exponential(rng, cfg.value_mean) + cfg.value_floor);

        let days_back = rng.random_range(0..=self.config.window_days);
        let order_date = self
            .start_date
            .checked_add_days(Days::new(u64::from(self.config.window_days - days_back)))
            .unwrap_or(self.config.end_date);

        // Driven by the sampled offset, before clamping.
        let raw_minutes = cfg.delivery_base_minutes
            + lat_offset.hypot(lon_offset) * cfg.delivery_minutes_per_degree
            + normal(rng, 0.0, cfg.delivery_noise_minutes);
        #[allow(clippy::cast_possible_truncation)]
        let delivery_time_minutes =
            (raw_minutes.trunc() as i32).clamp(DELIVERY_MINUTES_MIN, DELIVERY_MINUTES_MAX);

        OrderRecord {
            order_id: format!("ORD_{:06}", cfg.first_sequence + self.emitted),
            customer,
            order_value,
            order_date,
            store_id: store.store_id.clone(),
            store: store.location,
            delivery_time_minutes,
        }
    }
}

impl<R: Rng> Iterator for OrderGenerator<'_, R> {
    type Item = OrderRecord;

    fn next(&mut self) -> Option<OrderRecord> {
        if self.emitted >= self.config.count {
            return None;
        }
        let order = self.next_order();
        self.emitted += 1;

        if self.emitted % PROGRESS_EVERY == 0 {
            tracing::debug!(
                generated = self.emitted,
                total = self.config.count,
                "order generation progress"
            );
        }
        Some(order)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.config.count - self.emitted;
        (remaining, Some(remaining))
    }
}

impl<R: Rng> ExactSizeIterator for OrderGenerator<'_, R> {}

/// Fixed-size batches over an order iterator. The last batch may be short.
#[derive(Debug)]
pub struct OrderChunks<I> {
    inner: I,
    size: usize,
}

impl<I: Iterator<Item = OrderRecord>> Iterator for OrderChunks<I> {
    type Item = Vec<OrderRecord>;

    fn next(&mut self) -> Option<Vec<OrderRecord>> {
        let chunk: Vec<OrderRecord> = self.inner.by_ref().take(self.size).collect();
        (!chunk.is_empty()).then_some(chunk)
    }
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 30).unwrap()
    }

    fn generate(count: usize, seed: u64) -> Vec<OrderRecord> {
        let catalog = Catalog::bengaluru();
        generate_orders(&catalog, OrderGeneratorConfig::new(count, 90, end()), StdRng::seed_from_u64(seed))
            .unwrap()
            .collect()
    }

    #[test]
    fn produces_exact_count_with_sequential_ids() {
        let orders = generate(25, 1);
        assert_eq!(orders.len(), 25);
        assert_eq!(orders[0].order_id, "ORD_000001");
        assert_eq!(orders[24].order_id, "ORD_000025");
    }

    #[test]
    fn same_seed_same_orders() {
        assert_eq!(generate(50, 42), generate(50, 42));
        assert_ne!(generate(50, 42), generate(50, 43));
    }

    #[test]
    fn fields_respect_ranges() {
        let catalog = Catalog::bengaluru();
        let stores: HashSet<&str> = catalog.stores.iter().map(|s| s.store_id.as_str()).collect();
        let start = end() - Days::new(90);
        for order in generate(2_000, 3) {
            assert!(catalog.bounds.contains(order.customer), "{}", order.customer);
            assert!(stores.contains(order.store_id.as_str()));
            assert!(order.order_value >= 50.0);
            assert!((order.order_value * 100.0 - (order.order_value * 100.0).round()).abs() < 1e-6);
            assert!(order.order_date >= start && order.order_date <= end());
            assert!((DELIVERY_MINUTES_MIN..=DELIVERY_MINUTES_MAX).contains(&order.delivery_time_minutes));
        }
    }

    #[test]
    fn store_location_matches_catalog() {
        let catalog = Catalog::bengaluru();
        for order in generate(100, 9) {
            let store = catalog.store(&order.store_id).unwrap();
            assert_eq!(order.store, store.location);
        }
    }

    #[test]
    fn reports_exact_size() {
        let catalog = Catalog::bengaluru();
        let mut generator =
            generate_orders(&catalog, OrderGeneratorConfig::new(10, 90, end()), StdRng::seed_from_u64(0))
                .unwrap();
        assert_eq!(generator.len(), 10);
        generator.next();
        assert_eq!(generator.len(), 9);
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(generate(0, 5).is_empty());
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let mut catalog = Catalog::bengaluru();
        catalog.stores.clear();
        let err = generate_orders(&catalog, OrderGeneratorConfig::new(10, 90, end()), StdRng::seed_from_u64(0))
            .unwrap_err();
        assert_eq!(err, EngineError::EmptyCatalog);
    }

    #[test]
    fn invalid_distribution_is_rejected() {
        let catalog = Catalog::bengaluru();
        let mut config = OrderGeneratorConfig::new(10, 90, end());
        config.value_mean = 0.0;
        let err = generate_orders(&catalog, config, StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter { name: "value_mean", .. }));
    }

    #[test]
    fn starting_sequence_offsets_ids() {
        let catalog = Catalog::bengaluru();
        let config = OrderGeneratorConfig::new(2, 90, end()).starting_at(50_001);
        let ids: Vec<String> = generate_orders(&catalog, config, StdRng::seed_from_u64(0))
            .unwrap()
            .map(|o| o.order_id)
            .collect();
        assert_eq!(ids, vec!["ORD_050001", "ORD_050002"]);
    }

    #[test]
    fn chunks_cover_all_orders_with_short_tail() {
        let catalog = Catalog::bengaluru();
        let generator =
            generate_orders(&catalog, OrderGeneratorConfig::new(2_500, 90, end()), StdRng::seed_from_u64(4))
                .unwrap();
        let sizes: Vec<usize> = generator.chunks(1_000).map(|c| c.len()).collect();
        assert_eq!(sizes, vec![1_000, 1_000, 500]);
    }

    #[test]
    fn zero_chunk_size_is_treated_as_one() {
        let catalog = Catalog::bengaluru();
        let generator =
            generate_orders(&catalog, OrderGeneratorConfig::new(3, 90, end()), StdRng::seed_from_u64(4))
                .unwrap();
        assert_eq!(generator.chunks(0).count(), 3);
    }
}
