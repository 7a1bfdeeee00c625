// Search orchestration. Drives the pure filter/price/rank pipeline
// against an inventory snapshot, fetching per-hotel availability
// concurrently from a supplier-backed provider. Everything else in the
// engine is synchronous; suspension happens only here.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::{DashMap, DashSet};
use futures::future::join_all;
use parking_lot::RwLock;
use thiserror::Error;

use crate::cache::{AvailabilityCache, CacheConfig};
use crate::criteria::{CriteriaError, SearchCriteria, SortKey};
use crate::filter::{filter_hotels, filter_tours, HotelMatch};
use crate::inventory::{InventorySnapshot, RoomAvailability, Tour};
use crate::pricing::nightly_price_range;
use crate::ranking::rank;

#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("supplier unavailable: {0}")]
    Unavailable(String),

    #[error("supplier returned malformed availability: {0}")]
    Malformed(String),
}

/// Per-hotel availability lookup for a date range. Implementations are
/// expected to bound their own latency; a failure or stall is treated
/// as that hotel having no available rooms.
#[async_trait]
pub trait AvailabilityProvider: Send + Sync + 'static {
    async fn fetch_availability(
        &self,
        hotel_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<RoomAvailability>, ProviderError>;
}

#[async_trait]
impl<P: AvailabilityProvider> AvailabilityProvider for Arc<P> {
    async fn fetch_availability(
        &self,
        hotel_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Vec<RoomAvailability>, ProviderError> {
        (**self).fetch_availability(hotel_id, check_in, check_out).await
    }
}

#[derive(Error, Debug, Clone)]
pub enum SearchError {
    #[error(transparent)]
    InvalidCriteria(#[from] CriteriaError),

    // A newer search started while this one was in flight; its results
    // were discarded, never merged.
    #[error("search superseded by a newer request")]
    Superseded,
}

/// One search session's lifecycle. Refining any criterion re-enters
/// `Fetching`; an empty `Ready` result set is a valid terminal state.
#[derive(Debug, Clone)]
pub enum SearchState {
    Idle,
    Fetching,
    Ready(Vec<HotelMatch>),
    Failed(CriteriaError),
}

pub struct SearchEngine<P> {
    provider: P,
    snapshot: RwLock<Arc<InventorySnapshot>>,
    cache: AvailabilityCache,
    state: RwLock<SearchState>,
    // Version token per search; stale fetches compare against it and
    // drop their results.
    generation: AtomicU64,
}

impl<P: AvailabilityProvider> SearchEngine<P> {
    pub fn new(provider: P, snapshot: InventorySnapshot) -> Self {
        Self::with_cache_config(provider, snapshot, CacheConfig::default())
    }

    pub fn with_cache_config(
        provider: P,
        snapshot: InventorySnapshot,
        cache_config: CacheConfig,
    ) -> Self {
        Self {
            provider,
            snapshot: RwLock::new(Arc::new(snapshot)),
            cache: AvailabilityCache::new(cache_config),
            state: RwLock::new(SearchState::Idle),
            generation: AtomicU64::new(0),
        }
    }

    pub fn state(&self) -> SearchState {
        self.state.read().clone()
    }

    pub fn cache(&self) -> &AvailabilityCache {
        &self.cache
    }

    /// Replaces the inventory snapshot atomically. Searches already in
    /// flight keep reading the snapshot they started with.
    pub fn refresh_inventory(&self, snapshot: InventorySnapshot) {
        *self.snapshot.write() = Arc::new(snapshot);
    }

    /// Runs one hotel search: static filters, then one concurrent
    /// availability request per surviving hotel, then ranking.
    ///
    /// A hotel whose availability request fails is dropped from the
    /// results without failing the search. Results belonging to a
    /// search that was superseded mid-flight are discarded.
    pub async fn search(&self, criteria: &SearchCriteria) -> Result<Vec<HotelMatch>, SearchError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if let Err(err) = criteria.validate() {
            *self.state.write() = SearchState::Failed(err.clone());
            return Err(err.into());
        }
        *self.state.write() = SearchState::Fetching;

        let snapshot = Arc::clone(&self.snapshot.read());
        let band = nightly_price_range(&snapshot.hotels, &criteria.nationality);
        let mut matches = filter_hotels(&snapshot.hotels, criteria, band)?;

        tracing::debug!(
            generation,
            candidates = matches.len(),
            "fetching availability for candidate hotels"
        );

        let check_in = criteria.check_in;
        let check_out = criteria.check_out;
        let candidate_ids: Vec<String> = matches.iter().map(|m| m.hotel.id.clone()).collect();
        let fetches = candidate_ids.into_iter().map(|hotel_id| async move {
            if let Some(rooms) = self.cache.get(&hotel_id, check_in, check_out) {
                return Some((hotel_id, rooms));
            }
            match self
                .provider
                .fetch_availability(&hotel_id, check_in, check_out)
                .await
            {
                Ok(rooms) => {
                    self.cache
                        .store(&hotel_id, check_in, check_out, rooms.clone(), None);
                    Some((hotel_id, rooms))
                }
                Err(err) => {
                    tracing::warn!(
                        hotel_id = %hotel_id,
                        error = %err,
                        "availability request failed; hotel excluded from results"
                    );
                    None
                }
            }
        });
        let availability: HashMap<String, Vec<RoomAvailability>> =
            join_all(fetches).await.into_iter().flatten().collect();

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "search superseded; discarding results");
            return Err(SearchError::Superseded);
        }

        let wanted_rooms = criteria.rooms.max(1) as usize;
        matches.retain_mut(|m| {
            // Failed fetches have no entry here: zero available rooms.
            let Some(available) = availability.get(&m.hotel.id) else {
                return false;
            };
            m.rooms.retain(|priced| {
                available
                    .iter()
                    .any(|a| a.room_id == priced.room.id && a.available_units > 0)
            });
            if m.rooms.len() < wanted_rooms {
                return false;
            }
            m.refresh_lowest_price();
            true
        });

        // Rooms without a resolvable price cannot be ranked by price.
        if matches!(
            criteria.sort_key,
            Some(SortKey::PriceLow) | Some(SortKey::PriceHigh)
        ) {
            matches.retain(|m| m.lowest_price.is_some());
        }

        let ranked = rank(matches, criteria.sort_key);

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "search superseded; discarding results");
            return Err(SearchError::Superseded);
        }
        *self.state.write() = SearchState::Ready(ranked.clone());
        tracing::info!(generation, results = ranked.len(), "search ready");
        Ok(ranked)
    }

    /// Tour search over the current snapshot. Tours carry their own
    /// availability (expiry and duration options), so no supplier
    /// round-trips are involved.
    pub fn search_tours(
        &self,
        criteria: &SearchCriteria,
        today: NaiveDate,
    ) -> Result<Vec<Tour>, SearchError> {
        let snapshot = Arc::clone(&self.snapshot.read());
        let survivors = filter_tours(&snapshot.tours, criteria, today)?;
        Ok(rank(survivors, criteria.sort_key))
    }
}

/// In-memory availability provider with scripted failures and optional
/// jittered latency. Stands in for a supplier connection in tests and
/// benchmarks.
#[derive(Default)]
pub struct SimulatedProvider {
    availability: DashMap<String, Vec<RoomAvailability>>,
    failing: DashSet<String>,
    delay_ms: AtomicU64,
    calls: AtomicUsize,
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_availability(&self, hotel_id: &str, rooms: Vec<RoomAvailability>) {
        self.availability.insert(hotel_id.to_string(), rooms);
    }

    /// Makes every request for this hotel fail until cleared.
    pub fn fail_hotel(&self, hotel_id: &str) {
        self.failing.insert(hotel_id.to_string());
    }

    pub fn set_delay_ms(&self, delay_ms: u64) {
        self.delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    /// Number of fetches that reached the provider (cache hits do not).
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AvailabilityProvider for SimulatedProvider {
    async fn fetch_availability(
        &self,
        hotel_id: &str,
        _check_in: NaiveDate,
        _check_out: NaiveDate,
    ) -> Result<Vec<RoomAvailability>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            // Jitter so concurrent requests do not complete in lockstep.
            let jitter = rand::random::<u64>() % (delay / 2 + 1);
            tokio::time::sleep(Duration::from_millis(delay + jitter)).await;
        }

        if self.failing.contains(hotel_id) {
            return Err(ProviderError::Unavailable(format!(
                "supplier offline for {}",
                hotel_id
            )));
        }

        Ok(self
            .availability
            .get(hotel_id)
            .map(|rooms| rooms.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{Hotel, Room, RoomCapacity};

    fn room(id: &str, hotel_id: &str, base_price: f64) -> Room {
        Room {
            id: id.to_string(),
            hotel_id: hotel_id.to_string(),
            base_price,
            capacity: RoomCapacity {
                adults: 2,
                children: 1,
            },
            surcharges: vec![],
            transportation: vec![],
        }
    }

    fn hotel(id: &str, base_price: f64) -> Hotel {
        Hotel {
            id: id.to_string(),
            name: format!("Hotel {}", id),
            location: "Fargo".to_string(),
            stars: Some(3),
            review_count: Some(10),
            meal_plans: vec!["RO".to_string()],
            rooms: vec![room(&format!("{}-r1", id), id, base_price)],
        }
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria {
            destination: String::new(),
            check_in: "2025-06-11".parse().unwrap(),
            check_out: "2025-06-14".parse().unwrap(),
            nationality: "GB".to_string(),
            meal_plan: None,
            rooms: 1,
            adults: 2,
            children: 0,
            children_ages: vec![],
            price_range: (0.0, 0.0),
            min_stars: 0,
            sort_key: Some(SortKey::PriceLow),
        }
    }

    fn available(id: &str) -> Vec<RoomAvailability> {
        vec![RoomAvailability {
            room_id: format!("{}-r1", id),
            available_units: 2,
        }]
    }

    fn snapshot_of(count: usize) -> InventorySnapshot {
        let hotels = (1..=count)
            .map(|i| hotel(&format!("h{}", i), 100.0 + i as f64))
            .collect();
        InventorySnapshot {
            hotels,
            tours: vec![],
        }
    }

    fn engine_with(
        count: usize,
    ) -> (Arc<SimulatedProvider>, SearchEngine<Arc<SimulatedProvider>>) {
        let provider = Arc::new(SimulatedProvider::new());
        for i in 1..=count {
            let id = format!("h{}", i);
            provider.set_availability(&id, available(&id));
        }
        let engine = SearchEngine::new(Arc::clone(&provider), snapshot_of(count));
        (provider, engine)
    }

    // The requested band equals the global band in these fixtures, so
    // band filtering stays unconstrained.
    fn unconstrained(criteria: &mut SearchCriteria, count: usize) {
        criteria.price_range = (101.0, 100.0 + count as f64);
    }

    #[tokio::test]
    async fn search_ranks_all_available_hotels() {
        let (_, engine) = engine_with(3);
        let mut c = criteria();
        unconstrained(&mut c, 3);

        let results = engine.search(&c).await.unwrap();
        assert_eq!(results.len(), 3);
        // price_low: cheapest first
        assert_eq!(results[0].hotel.id, "h1");
        assert!(matches!(engine.state(), SearchState::Ready(ref r) if r.len() == 3));
    }

    #[tokio::test]
    async fn one_failing_hotel_does_not_fail_the_search() {
        let (provider, engine) = engine_with(5);
        provider.fail_hotel("h3");
        let mut c = criteria();
        unconstrained(&mut c, 5);

        let results = engine.search(&c).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|m| m.hotel.id.as_str()).collect();
        assert_eq!(ids, vec!["h1", "h2", "h4", "h5"]);
    }

    #[tokio::test]
    async fn all_failed_yields_an_empty_ready_result() {
        let (provider, engine) = engine_with(2);
        provider.fail_hotel("h1");
        provider.fail_hotel("h2");
        let mut c = criteria();
        unconstrained(&mut c, 2);

        let results = engine.search(&c).await.unwrap();
        assert!(results.is_empty());
        assert!(matches!(engine.state(), SearchState::Ready(ref r) if r.is_empty()));
    }

    #[tokio::test]
    async fn invalid_criteria_fail_before_any_fetch() {
        let (provider, engine) = engine_with(2);
        let mut c = criteria();
        c.check_out = c.check_in;

        let err = engine.search(&c).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidCriteria(_)));
        assert!(matches!(engine.state(), SearchState::Failed(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn second_identical_search_is_served_from_cache() {
        let (provider, engine) = engine_with(3);
        let mut c = criteria();
        unconstrained(&mut c, 3);

        engine.search(&c).await.unwrap();
        assert_eq!(provider.calls(), 3);

        engine.search(&c).await.unwrap();
        assert_eq!(provider.calls(), 3);
        assert_eq!(engine.cache().stats().hits, 3);
    }

    #[tokio::test]
    async fn a_newer_search_supersedes_an_in_flight_one() {
        let (provider, engine) = engine_with(3);
        provider.set_delay_ms(100);
        let engine = Arc::new(engine);

        let mut first = criteria();
        unconstrained(&mut first, 3);
        let mut second = first.clone();
        second.min_stars = 3;

        let slow = {
            let engine = Arc::clone(&engine);
            let first = first.clone();
            tokio::spawn(async move { engine.search(&first).await })
        };
        // Let the first search get its fetches in flight, then refine.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(matches!(engine.state(), SearchState::Fetching));

        let results = engine.search(&second).await.unwrap();
        assert_eq!(results.len(), 3);

        let stale = slow.await.unwrap();
        assert!(matches!(stale, Err(SearchError::Superseded)));
        // The published state belongs to the newer search.
        assert!(matches!(engine.state(), SearchState::Ready(ref r) if r.len() == 3));
    }

    #[tokio::test]
    async fn refresh_swaps_the_snapshot_for_subsequent_searches() {
        let (provider, engine) = engine_with(1);
        let mut c = criteria();
        unconstrained(&mut c, 1);

        assert_eq!(engine.search(&c).await.unwrap().len(), 1);

        provider.set_availability("h9", available("h9"));
        let mut refreshed = snapshot_of(1);
        refreshed.hotels.push(hotel("h9", 99.0));
        engine.refresh_inventory(refreshed);

        let mut c = criteria();
        c.price_range = (99.0, 101.0);
        let results = engine.search(&c).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].hotel.id, "h9");
    }

    #[tokio::test]
    async fn hotel_without_available_rooms_drops_out() {
        let (provider, engine) = engine_with(2);
        // h2's only room reports zero units.
        provider.set_availability(
            "h2",
            vec![RoomAvailability {
                room_id: "h2-r1".to_string(),
                available_units: 0,
            }],
        );
        let mut c = criteria();
        unconstrained(&mut c, 2);

        let results = engine.search(&c).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|m| m.hotel.id.as_str()).collect();
        assert_eq!(ids, vec!["h1"]);
    }

    #[tokio::test]
    async fn tour_search_filters_and_ranks_the_snapshot() {
        use std::collections::HashMap;

        let tour = |id: &str, price: f64| Tour {
            id: id.to_string(),
            title: "Amalfi Coast".to_string(),
            country: "IT".to_string(),
            durations: HashMap::from([(3, "OPT3".to_string())]),
            price,
            old_price: None,
            expiry_date: "2025-12-31".parse().unwrap(),
            markets: vec!["GB".to_string()],
        };
        let provider = Arc::new(SimulatedProvider::new());
        let engine = SearchEngine::new(
            provider,
            InventorySnapshot {
                hotels: vec![],
                tours: vec![tour("t1", 900.0), tour("t2", 600.0)],
            },
        );

        let c = criteria();
        let tours = engine
            .search_tours(&c, "2025-06-01".parse().unwrap())
            .unwrap();
        assert_eq!(tours.len(), 2);
        assert_eq!(tours[0].id, "t2");
    }
}
