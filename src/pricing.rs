// Nightly price resolution. The effective rate of a room depends on the
// guest's market: a matching surcharge entry is added on top of the base
// rate, an absent entry means a surcharge of zero.

use thiserror::Error;

use crate::inventory::{Hotel, Room};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceError {
    #[error("room {room_id} has no resolvable base price ({base_price})")]
    Unresolvable { room_id: String, base_price: f64 },
}

/// Effective per-night price of a room for a market.
///
/// Market matching is exact and case-sensitive, as stored. A missing or
/// non-finite base price is a hard per-room error; it is never coerced
/// to zero for display.
pub fn resolve_nightly_price(room: &Room, market: &str) -> Result<f64, PriceError> {
    if !room.base_price.is_finite() || room.base_price < 0.0 {
        return Err(PriceError::Unresolvable {
            room_id: room.id.clone(),
            base_price: room.base_price,
        });
    }

    let surcharge = room
        .surcharges
        .iter()
        .find(|s| s.market == market)
        .map(|s| s.price)
        .unwrap_or(0.0);

    Ok(room.base_price + surcharge)
}

/// Global [min, max] nightly price band across all rooms for a market.
///
/// Rooms whose price is unresolvable or non-positive are skipped rather
/// than failing the aggregate; `None` means no room produced a usable
/// price.
pub fn nightly_price_range(hotels: &[Hotel], market: &str) -> Option<(f64, f64)> {
    let mut band: Option<(f64, f64)> = None;
    for hotel in hotels {
        for room in &hotel.rooms {
            let price = match resolve_nightly_price(room, market) {
                Ok(price) => price,
                Err(_) => continue,
            };
            if !price.is_finite() || price <= 0.0 {
                continue;
            }
            band = Some(match band {
                Some((lo, hi)) => (lo.min(price), hi.max(price)),
                None => (price, price),
            });
        }
    }
    band
}

/// Rounds a monetary amount to 2 decimal places, half-up.
///
/// `f64::round` is half-away-from-zero; discount amounts are
/// non-negative, so the two agree here.
pub fn round_half_up(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
