// Result ordering. Sorting is stable: items comparing equal under the
// primary key keep their pre-sort relative order.

use std::cmp::Ordering;

use crate::criteria::SortKey;
use crate::filter::HotelMatch;
use crate::inventory::Tour;

/// Anything the ranker can order: filtered hotels and tours share the
/// same sort shape.
pub trait Rankable {
    fn lowest_price(&self) -> Option<f64>;

    fn rating(&self) -> u32 {
        0
    }

    fn popularity(&self) -> u32 {
        0
    }

    fn availability(&self) -> usize {
        0
    }
}

impl Rankable for HotelMatch {
    fn lowest_price(&self) -> Option<f64> {
        self.lowest_price
    }

    fn rating(&self) -> u32 {
        self.hotel.stars.unwrap_or(0) as u32
    }

    fn popularity(&self) -> u32 {
        self.hotel.review_count.unwrap_or(0)
    }

    fn availability(&self) -> usize {
        self.rooms.len()
    }
}

impl Rankable for Tour {
    fn lowest_price(&self) -> Option<f64> {
        Some(self.price)
    }
}

/// Orders items by the selected key. `None` (unset or unrecognized key)
/// is identity order, not an error.
pub fn rank<T: Rankable>(mut items: Vec<T>, key: Option<SortKey>) -> Vec<T> {
    let Some(key) = key else {
        return items;
    };

    match key {
        SortKey::PriceLow => items.sort_by(|a, b| {
            cmp_price(a.lowest_price(), b.lowest_price(), f64::INFINITY)
        }),
        SortKey::PriceHigh => items.sort_by(|a, b| {
            cmp_price(b.lowest_price(), a.lowest_price(), f64::NEG_INFINITY)
        }),
        SortKey::Rating => items.sort_by(|a, b| b.rating().cmp(&a.rating())),
        SortKey::Popularity => items.sort_by(|a, b| b.popularity().cmp(&a.popularity())),
        SortKey::Availability => items.sort_by(|a, b| b.availability().cmp(&a.availability())),
    }
    items
}

// Unpriced items sink to the end under either price direction.
fn cmp_price(a: Option<f64>, b: Option<f64>, missing: f64) -> Ordering {
    a.unwrap_or(missing).total_cmp(&b.unwrap_or(missing))
}
