// Supplier feed ingestion. Inventory arrives as a JSON document and
// availability as the suppliers' attribute-heavy XML dialect; both are
// deserialized into typed records here and validated once, so the rest
// of the engine never sees raw supplier data.

use quick_xml::de::from_str;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::inventory::{
    Hotel, InventorySnapshot, MarketSurcharge, Room, RoomAvailability, RoomCapacity, Tour,
};

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),
}

// ---------------------------------------------------------------------
// JSON inventory feed
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize, Serialize)]
pub struct InventoryFeed {
    pub feed_id: String,
    pub currency: String,
    pub timestamp: String,
    pub hotels: Vec<FeedHotel>,
    #[serde(default)]
    pub tours: Vec<FeedTour>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FeedHotel {
    pub hotel_id: String,
    pub name: String,
    pub destination: String,
    pub stars: Option<u8>,
    pub review_count: Option<u32>,
    #[serde(default)]
    pub meal_plans: Vec<String>,
    pub rooms: Vec<FeedRoom>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FeedRoom {
    pub room_id: String,
    pub base_price: f64,
    pub capacity: FeedCapacity,
    #[serde(default)]
    pub surcharges: Vec<FeedSurcharge>,
    #[serde(default)]
    pub transportation: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FeedCapacity {
    pub adults: u32,
    pub children: u32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FeedSurcharge {
    pub market: String,
    pub price: f64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FeedTour {
    pub tour_id: String,
    pub title: String,
    pub country: String,
    // Keys are night counts as strings in the supplier document.
    #[serde(default)]
    pub durations: std::collections::HashMap<String, String>,
    pub price: f64,
    pub old_price: Option<f64>,
    pub expiry_date: chrono::NaiveDate,
    #[serde(default)]
    pub markets: Vec<String>,
}

impl From<FeedHotel> for Hotel {
    fn from(feed: FeedHotel) -> Self {
        let hotel_id = feed.hotel_id;
        Hotel {
            rooms: feed
                .rooms
                .into_iter()
                .map(|room| Room {
                    id: room.room_id,
                    hotel_id: hotel_id.clone(),
                    base_price: room.base_price,
                    capacity: RoomCapacity {
                        adults: room.capacity.adults,
                        children: room.capacity.children,
                    },
                    surcharges: room
                        .surcharges
                        .into_iter()
                        .map(|s| MarketSurcharge {
                            market: s.market,
                            price: s.price,
                        })
                        .collect(),
                    transportation: room.transportation,
                })
                .collect(),
            id: hotel_id,
            name: feed.name,
            location: feed.destination,
            stars: feed.stars,
            review_count: feed.review_count,
            meal_plans: feed.meal_plans,
        }
    }
}

impl From<FeedTour> for Tour {
    fn from(feed: FeedTour) -> Self {
        Tour {
            id: feed.tour_id,
            title: feed.title,
            country: feed.country,
            durations: feed
                .durations
                .into_iter()
                .filter_map(|(nights, code)| {
                    let parsed = nights.parse::<u32>().ok();
                    if parsed.is_none() {
                        tracing::warn!(nights = %nights, "dropping tour duration with unparseable night count");
                    }
                    parsed.map(|n| (n, code))
                })
                .collect(),
            price: feed.price,
            old_price: feed.old_price,
            expiry_date: feed.expiry_date,
            markets: feed.markets,
        }
    }
}

/// Parses a supplier inventory JSON document into a validated snapshot.
///
/// A malformed document is an error; a malformed single record is
/// dropped with a warning, and the drop count is returned alongside the
/// snapshot.
pub fn parse_inventory_feed(json: &str) -> Result<(InventorySnapshot, usize), FeedError> {
    let feed: InventoryFeed =
        serde_json::from_str(json).map_err(|e| FeedError::JsonParse(e.to_string()))?;

    tracing::debug!(
        feed_id = %feed.feed_id,
        hotels = feed.hotels.len(),
        tours = feed.tours.len(),
        "parsed supplier inventory feed"
    );

    let hotels = feed.hotels.into_iter().map(Hotel::from).collect();
    let tours = feed.tours.into_iter().map(Tour::from).collect();
    Ok(InventorySnapshot::from_records(hotels, tours))
}

// ---------------------------------------------------------------------
// XML availability response
// ---------------------------------------------------------------------

#[derive(Debug, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
#[serde(rename = "AvailRS")]
pub struct XmlAvailabilityResponse {
    pub hotels: XmlHotels,
}

#[derive(Debug, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlHotels {
    #[serde(rename = "Hotel")]
    pub hotels: Vec<XmlHotel>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlHotel {
    #[serde(rename = "@code")]
    pub code: String,
    #[serde(rename = "@name")]
    pub name: String,
    pub rooms: XmlRooms,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRooms {
    #[serde(rename = "Room")]
    pub rooms: Vec<XmlRoom>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRoom {
    #[serde(rename = "@code")]
    pub code: String,
    #[serde(rename = "@availableUnits")]
    pub available_units: String,
}

/// Extracts per-room availability for one hotel from a supplier XML
/// availability response.
///
/// Rooms without a code, and rooms whose unit count does not parse, are
/// dropped with a warning; a document that does not parse at all is a
/// `FeedError`.
pub fn parse_availability_xml(
    xml: &str,
    hotel_id: &str,
) -> Result<Vec<RoomAvailability>, FeedError> {
    let response: XmlAvailabilityResponse =
        from_str(xml).map_err(|e| FeedError::XmlParse(e.to_string()))?;

    let mut rooms = Vec::new();
    for hotel in response.hotels.hotels {
        if hotel.code != hotel_id {
            continue;
        }
        for room in hotel.rooms.rooms {
            if room.code.trim().is_empty() {
                tracing::warn!(hotel_id, "dropping availability row without a room code");
                continue;
            }
            let Ok(units) = room.available_units.parse::<u32>() else {
                tracing::warn!(
                    hotel_id,
                    room_code = %room.code,
                    units = %room.available_units,
                    "dropping availability row with unparseable unit count"
                );
                continue;
            };
            rooms.push(RoomAvailability {
                room_id: room.code,
                available_units: units,
            });
        }
    }
    Ok(rooms)
}

// A small inline sample for tests.
#[cfg(test)]
const SMALL_SAMPLE_XML: &str = r#"
<AvailRS>
  <Hotels>
    <Hotel code="39776757" name="Days Inn By Wyndham Fargo">
      <Rooms>
        <Room code="ND1" availableUnits="3"/>
        <Room code="QD2" availableUnits="1"/>
        <Room code="" availableUnits="4"/>
        <Room code="SU1" availableUnits="soon"/>
      </Rooms>
    </Hotel>
    <Hotel code="11111111" name="Other Hotel">
      <Rooms>
        <Room code="XX1" availableUnits="9"/>
      </Rooms>
    </Hotel>
  </Hotels>
</AvailRS>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEED_JSON: &str = r#"{
        "feed_id": "FEED-2025-06-11",
        "currency": "GBP",
        "timestamp": "2025-06-11T10:30:00Z",
        "hotels": [
            {
                "hotel_id": "39776757",
                "name": "Days Inn By Wyndham Fargo",
                "destination": "Fargo",
                "stars": 3,
                "review_count": 412,
                "meal_plans": ["RO", "BB"],
                "rooms": [
                    {
                        "room_id": "ND1",
                        "base_price": 84.82,
                        "capacity": { "adults": 2, "children": 1 },
                        "surcharges": [ { "market": "US", "price": 5.0 } ],
                        "transportation": ["airport_shuttle"]
                    }
                ]
            },
            {
                "hotel_id": "",
                "name": "Broken Record Hotel",
                "destination": "Nowhere",
                "stars": null,
                "review_count": null,
                "rooms": []
            }
        ],
        "tours": [
            {
                "tour_id": "T-881",
                "title": "Red River Valley Tour",
                "country": "US",
                "durations": { "3": "OPT3", "seven": "OPT7" },
                "price": 640.0,
                "old_price": 700.0,
                "expiry_date": "2025-12-31",
                "markets": ["US", "CA"]
            }
        ]
    }"#;

    #[test]
    fn inventory_feed_parses_and_validates() {
        let (snapshot, dropped) = parse_inventory_feed(SAMPLE_FEED_JSON).unwrap();

        // The id-less hotel is dropped at ingestion.
        assert_eq!(dropped, 1);
        assert_eq!(snapshot.hotels.len(), 1);

        let hotel = &snapshot.hotels[0];
        assert_eq!(hotel.id, "39776757");
        assert_eq!(hotel.meal_plans, vec!["RO", "BB"]);
        assert_eq!(hotel.rooms.len(), 1);
        assert_eq!(hotel.rooms[0].hotel_id, hotel.id);
        assert_eq!(hotel.rooms[0].base_price, 84.82);
        assert_eq!(hotel.rooms[0].surcharges[0].market, "US");
    }

    #[test]
    fn tour_durations_keep_only_numeric_night_counts() {
        let (snapshot, _) = parse_inventory_feed(SAMPLE_FEED_JSON).unwrap();

        let tour = &snapshot.tours[0];
        assert_eq!(tour.durations.len(), 1);
        assert_eq!(tour.durations.get(&3).unwrap(), "OPT3");
    }

    #[test]
    fn malformed_json_is_a_feed_error() {
        assert!(matches!(
            parse_inventory_feed("{ not json"),
            Err(FeedError::JsonParse(_))
        ));
    }

    #[test]
    fn availability_xml_extracts_the_requested_hotel() {
        let rooms = parse_availability_xml(SMALL_SAMPLE_XML, "39776757").unwrap();

        // The blank-code row and the unparseable-units row are dropped.
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].room_id, "ND1");
        assert_eq!(rooms[0].available_units, 3);
        assert_eq!(rooms[1].room_id, "QD2");
    }

    #[test]
    fn availability_xml_ignores_other_hotels() {
        let rooms = parse_availability_xml(SMALL_SAMPLE_XML, "11111111").unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].room_id, "XX1");
    }

    #[test]
    fn unknown_hotel_yields_no_rows() {
        let rooms = parse_availability_xml(SMALL_SAMPLE_XML, "nope").unwrap();
        assert!(rooms.is_empty());
    }

    #[test]
    fn malformed_xml_is_a_feed_error() {
        assert!(matches!(
            parse_availability_xml("<AvailRS><Hotels>", "h1"),
            Err(FeedError::XmlParse(_))
        ));
    }
}
