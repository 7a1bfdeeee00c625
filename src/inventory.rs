// Inventory entity types shared by the search and pricing engines.
// Records are validated once at ingestion; downstream code can rely on
// ids and references being present.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub location: String,
    pub stars: Option<u8>,
    pub review_count: Option<u32>,
    pub meal_plans: Vec<String>,
    pub rooms: Vec<Room>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub hotel_id: String,
    // Currency-neutral nightly rate before any market surcharge.
    pub base_price: f64,
    pub capacity: RoomCapacity,
    #[serde(default)]
    pub surcharges: Vec<MarketSurcharge>,
    // Transportation options are passed through to the storefront, never priced here.
    #[serde(default)]
    pub transportation: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCapacity {
    pub adults: u32,
    pub children: u32,
}

// Sparse per-market surcharge entry; an absent market means no surcharge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSurcharge {
    pub market: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tour {
    pub id: String,
    pub title: String,
    pub country: String,
    // Nights -> bookable option code for that duration.
    pub durations: HashMap<u32, String>,
    pub price: f64,
    pub old_price: Option<f64>,
    pub expiry_date: NaiveDate,
    pub markets: Vec<String>,
}

// Per-room availability for a concrete date range, as reported by a
// supplier for one hotel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomAvailability {
    pub room_id: String,
    pub available_units: u32,
}

/// Immutable inventory bundle handed to the pure search functions.
///
/// The orchestrator holds the only mutable reference (an `Arc` swapped
/// atomically on refresh); nothing mutates a snapshot in place.
#[derive(Debug, Default, Clone)]
pub struct InventorySnapshot {
    pub hotels: Vec<Hotel>,
    pub tours: Vec<Tour>,
}

impl InventorySnapshot {
    /// Builds a snapshot from raw records, dropping incomplete ones.
    ///
    /// A hotel without an id, a room without an id or with a hotel
    /// reference that does not match its owner, and a tour without an
    /// id are each dropped individually; the rest of the inventory is
    /// kept. Returns the snapshot and the number of dropped records.
    pub fn from_records(hotels: Vec<Hotel>, tours: Vec<Tour>) -> (Self, usize) {
        let mut dropped = 0usize;

        let hotels = hotels
            .into_iter()
            .filter_map(|mut hotel| {
                if hotel.id.trim().is_empty() {
                    tracing::warn!(name = %hotel.name, "dropping hotel record without id");
                    dropped += 1;
                    return None;
                }
                let before = hotel.rooms.len();
                hotel.rooms.retain(|room| {
                    let ok = !room.id.trim().is_empty() && room.hotel_id == hotel.id;
                    if !ok {
                        tracing::warn!(
                            hotel_id = %hotel.id,
                            room_id = %room.id,
                            "dropping room record with missing id or mismatched hotel reference"
                        );
                    }
                    ok
                });
                dropped += before - hotel.rooms.len();
                Some(hotel)
            })
            .collect();

        let tours = tours
            .into_iter()
            .filter(|tour| {
                let ok = !tour.id.trim().is_empty();
                if !ok {
                    tracing::warn!(title = %tour.title, "dropping tour record without id");
                    dropped += 1;
                }
                ok
            })
            .collect();

        (Self { hotels, tours }, dropped)
    }

    pub fn hotel(&self, id: &str) -> Option<&Hotel> {
        self.hotels.iter().find(|h| h.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str, hotel_id: &str) -> Room {
        Room {
            id: id.to_string(),
            hotel_id: hotel_id.to_string(),
            base_price: 100.0,
            capacity: RoomCapacity {
                adults: 2,
                children: 1,
            },
            surcharges: vec![],
            transportation: vec![],
        }
    }

    fn hotel(id: &str, rooms: Vec<Room>) -> Hotel {
        Hotel {
            id: id.to_string(),
            name: format!("Hotel {}", id),
            location: "Fargo".to_string(),
            stars: Some(3),
            review_count: Some(12),
            meal_plans: vec!["RO".to_string()],
            rooms,
        }
    }

    #[test]
    fn ingestion_keeps_valid_records() {
        let hotels = vec![hotel("h1", vec![room("r1", "h1"), room("r2", "h1")])];
        let (snapshot, dropped) = InventorySnapshot::from_records(hotels, vec![]);

        assert_eq!(dropped, 0);
        assert_eq!(snapshot.hotels.len(), 1);
        assert_eq!(snapshot.hotels[0].rooms.len(), 2);
    }

    #[test]
    fn ingestion_drops_hotel_without_id() {
        let hotels = vec![hotel("", vec![]), hotel("h2", vec![room("r1", "h2")])];
        let (snapshot, dropped) = InventorySnapshot::from_records(hotels, vec![]);

        assert_eq!(dropped, 1);
        assert_eq!(snapshot.hotels.len(), 1);
        assert_eq!(snapshot.hotels[0].id, "h2");
    }

    #[test]
    fn ingestion_drops_room_with_mismatched_reference() {
        let hotels = vec![hotel(
            "h1",
            vec![room("r1", "h1"), room("r2", "other"), room("", "h1")],
        )];
        let (snapshot, dropped) = InventorySnapshot::from_records(hotels, vec![]);

        // The two bad rooms go, the hotel itself survives.
        assert_eq!(dropped, 2);
        assert_eq!(snapshot.hotels[0].rooms.len(), 1);
        assert_eq!(snapshot.hotels[0].rooms[0].id, "r1");
    }

    #[test]
    fn ingestion_drops_tour_without_id() {
        let tour = Tour {
            id: String::new(),
            title: "Lakes of Finland".to_string(),
            country: "FI".to_string(),
            durations: HashMap::new(),
            price: 900.0,
            old_price: None,
            expiry_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            markets: vec!["GB".to_string()],
        };
        let (snapshot, dropped) = InventorySnapshot::from_records(vec![], vec![tour]);

        assert_eq!(dropped, 1);
        assert!(snapshot.tours.is_empty());
    }
}
