// Search and pricing core for the travel booking storefront.

// Export the engine modules
pub mod booking;
pub mod cache;
pub mod criteria;
pub mod feed;
pub mod filter;
pub mod inventory;
pub mod offers;
pub mod orchestrator;
pub mod pricing;
pub mod ranking;
pub mod rates;

// Re-export key types for convenience
pub use booking::{
    compute_breakdown, AppliedDiscount, BookingError, BookingInput, MealPlanSelection,
    PriceBreakdown,
};
pub use cache::{AvailabilityCache, CacheConfig, CacheStatsReport};
pub use criteria::{CriteriaError, SearchCriteria, SortKey};
pub use feed::{parse_availability_xml, parse_inventory_feed, FeedError, InventoryFeed};
pub use filter::{filter_hotels, filter_tours, HotelMatch, PricedRoom};
pub use inventory::{
    Hotel, InventorySnapshot, MarketSurcharge, Room, RoomAvailability, RoomCapacity, Tour,
};
pub use offers::{
    classify_offers, DiscountKind, DiscountType, ExclusiveSelection, MarketDiscount, Offer,
    OfferClassification,
};
pub use orchestrator::{
    AvailabilityProvider, ProviderError, SearchEngine, SearchError, SearchState,
    SimulatedProvider,
};
pub use pricing::{nightly_price_range, resolve_nightly_price, round_half_up, PriceError};
pub use ranking::{rank, Rankable};
pub use rates::ExchangeRateTable;
