// Availability filtering. Narrows a hotel or tour inventory set down to
// the items satisfying every active criterion; filters left at their
// default value are no-ops.

use chrono::NaiveDate;

use crate::criteria::{CriteriaError, SearchCriteria};
use crate::inventory::{Hotel, Room, Tour};
use crate::pricing::resolve_nightly_price;

/// A surviving room annotated with its market-resolved nightly price.
///
/// `price` is `None` when the room's base price is unresolvable; such a
/// room is excluded from band filtering and price ranking but may still
/// be shown under non-price sorts.
#[derive(Debug, Clone)]
pub struct PricedRoom {
    pub room: Room,
    pub price: Option<f64>,
}

/// A hotel that survived filtering, with its qualifying rooms and the
/// minimum nightly price among them.
#[derive(Debug, Clone)]
pub struct HotelMatch {
    pub hotel: Hotel,
    pub rooms: Vec<PricedRoom>,
    pub lowest_price: Option<f64>,
}

impl HotelMatch {
    /// Recomputes `lowest_price` after the room list changed.
    pub fn refresh_lowest_price(&mut self) {
        self.lowest_price = lowest_price(&self.rooms);
    }
}

fn lowest_price(rooms: &[PricedRoom]) -> Option<f64> {
    rooms
        .iter()
        .filter_map(|r| r.price)
        .fold(None, |acc, p| match acc {
            Some(lo) if lo <= p => Some(lo),
            _ => Some(p),
        })
}

/// Filters hotels against the criteria.
///
/// `global_band` is the current inventory-wide nightly price band; when
/// the requested band equals it, band filtering is skipped entirely
/// (the slider is at its resting position, i.e. unconstrained).
///
/// An invalid date range is a reported error, never a silent empty
/// result. Hotels left with no qualifying rooms, or with fewer
/// qualifying rooms than the requested room count, drop out.
pub fn filter_hotels(
    hotels: &[Hotel],
    criteria: &SearchCriteria,
    global_band: Option<(f64, f64)>,
) -> Result<Vec<HotelMatch>, CriteriaError> {
    criteria.validate()?;

    let band_active = global_band != Some(criteria.price_range);
    let destination = criteria.destination.to_lowercase();

    let mut matches = Vec::new();
    for hotel in hotels {
        if !destination.is_empty() && !hotel.name.to_lowercase().contains(&destination) {
            continue;
        }
        if hotel.stars.unwrap_or(0) < criteria.min_stars {
            continue;
        }
        if let Some(plan) = criteria.meal_plan.as_deref() {
            if !plan.is_empty()
                && !hotel
                    .meal_plans
                    .iter()
                    .any(|p| p.eq_ignore_ascii_case(plan))
            {
                continue;
            }
        }

        let rooms: Vec<PricedRoom> = hotel
            .rooms
            .iter()
            .filter(|room| {
                room.capacity.adults >= criteria.adults
                    && room.capacity.children >= criteria.children
            })
            .filter_map(|room| {
                let price = resolve_nightly_price(room, &criteria.nationality).ok();
                if band_active {
                    // Band filtering needs a resolved price; a room
                    // without one cannot qualify for the band.
                    let (min, max) = criteria.price_range;
                    match price {
                        Some(p) if p >= min && p <= max => {}
                        _ => return None,
                    }
                }
                Some(PricedRoom {
                    room: room.clone(),
                    price,
                })
            })
            .collect();

        if rooms.len() < criteria.rooms.max(1) as usize {
            continue;
        }

        let lowest = lowest_price(&rooms);
        matches.push(HotelMatch {
            hotel: hotel.clone(),
            rooms,
            lowest_price: lowest,
        });
    }

    Ok(matches)
}

/// Filters tours against the criteria.
///
/// A tour survives when it has not expired by `today`, its market list
/// contains the requested market (when one is set), its title matches
/// the search text, and it offers an option for the requested number of
/// nights.
pub fn filter_tours(
    tours: &[Tour],
    criteria: &SearchCriteria,
    today: NaiveDate,
) -> Result<Vec<Tour>, CriteriaError> {
    criteria.validate()?;

    let text = criteria.destination.to_lowercase();
    let nights = criteria.nights() as u32;

    Ok(tours
        .iter()
        .filter(|tour| tour.expiry_date >= today)
        .filter(|tour| {
            criteria.nationality.is_empty()
                || tour.markets.iter().any(|m| m == &criteria.nationality)
        })
        .filter(|tour| text.is_empty() || tour.title.to_lowercase().contains(&text))
        .filter(|tour| tour.durations.contains_key(&nights))
        .cloned()
        .collect())
}
