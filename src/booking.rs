// Booking price computation. `compute_breakdown` is the single
// authoritative implementation of the total: every place that needs a
// price reuses it. Pure function, deterministic, no I/O; a booking is
// priced all-or-nothing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::offers::{DiscountKind, DiscountType, Offer};
use crate::pricing::round_half_up;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    #[error("a priced booking needs at least one night, got {0}")]
    NoNights(i64),

    #[error("a priced booking needs at least one room, got {0}")]
    NoRooms(u32),

    #[error("base price per night is not a usable amount: {0}")]
    BadBasePrice(f64),

    #[error("market surcharge is not a usable amount: {0}")]
    BadSurcharge(f64),

    #[error("meal plan price is not a usable amount: {0}")]
    BadMealPlanPrice(f64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanSelection {
    pub plan: String,
    pub price_per_guest_per_night: f64,
}

#[derive(Debug, Clone)]
pub struct BookingInput {
    // Displayed nightly rate, i.e. the market-resolved room price.
    pub base_price_per_night: f64,
    // Per-night market surcharge already contained in the displayed rate.
    pub market_surcharge_per_night: f64,
    pub market: String,
    pub nights: i64,
    pub rooms: u32,
    pub adults: u32,
    pub children: u32,
    pub meal_plan: Option<MealPlanSelection>,
    // Auto-applied offers, in application order.
    pub auto_offers: Vec<Offer>,
    pub exclusive_offer: Option<Offer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealPlanCharge {
    pub plan: String,
    pub price_per_guest_per_night: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSurchargeCharge {
    pub market: String,
    pub price_per_night: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    #[serde(rename = "type")]
    pub kind: DiscountType,
    pub amount: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base_price_per_night: f64,
    pub effective_per_night_price: f64,
    pub nights: i64,
    pub rooms: u32,
    pub room_total: f64,
    pub meal_plan: Option<MealPlanCharge>,
    pub market_surcharge: Option<MarketSurchargeCharge>,
    pub discounts: Vec<AppliedDiscount>,
    pub grand_total: f64,
}

/// Computes the itemized price breakdown for a booking.
///
/// The market surcharge is subtracted from the displayed nightly rate
/// to get the net room rate, then re-added as its own line. The
/// storefront renders both lines; collapsing them would change every
/// historical breakdown, so the decomposition is kept as-is.
///
/// Auto-applied offers contribute only through a market-matched entry;
/// an offer without one contributes nothing. The exclusive offer falls
/// back to its flat value as a fixed discount when no market entry
/// exists. Discount amounts are rounded half-up to cents once, when the
/// amount is finalized, and never re-rounded.
pub fn compute_breakdown(input: &BookingInput) -> Result<PriceBreakdown, BookingError> {
    if input.nights < 1 {
        return Err(BookingError::NoNights(input.nights));
    }
    if input.rooms < 1 {
        return Err(BookingError::NoRooms(input.rooms));
    }
    if !input.base_price_per_night.is_finite() || input.base_price_per_night < 0.0 {
        return Err(BookingError::BadBasePrice(input.base_price_per_night));
    }
    if !input.market_surcharge_per_night.is_finite() {
        return Err(BookingError::BadSurcharge(input.market_surcharge_per_night));
    }
    if let Some(meal) = &input.meal_plan {
        if !meal.price_per_guest_per_night.is_finite() || meal.price_per_guest_per_night < 0.0 {
            return Err(BookingError::BadMealPlanPrice(meal.price_per_guest_per_night));
        }
    }

    let nights = input.nights as f64;
    let rooms = input.rooms as f64;
    let guests = (input.adults + input.children) as f64;

    let effective_per_night = input.base_price_per_night - input.market_surcharge_per_night;
    let room_total = effective_per_night * nights * rooms;

    let meal_plan = input.meal_plan.as_ref().map(|meal| MealPlanCharge {
        plan: meal.plan.clone(),
        price_per_guest_per_night: meal.price_per_guest_per_night,
        total: meal.price_per_guest_per_night * guests * nights,
    });
    let meal_total = meal_plan.as_ref().map(|m| m.total).unwrap_or(0.0);

    let market_surcharge = (input.market_surcharge_per_night != 0.0).then(|| {
        MarketSurchargeCharge {
            market: input.market.clone(),
            price_per_night: input.market_surcharge_per_night,
            total: input.market_surcharge_per_night * nights * rooms,
        }
    });
    let surcharge_total = market_surcharge.as_ref().map(|s| s.total).unwrap_or(0.0);

    let subtotal = room_total + meal_total + surcharge_total;

    let mut discounts = Vec::new();
    for offer in &input.auto_offers {
        // Market-specific offers require a market match; the flat value
        // is never substituted for auto-applied offers.
        let Some(entry) = offer.market_discount(&input.market) else {
            continue;
        };
        let amount = match entry.kind {
            DiscountKind::Percentage => round_half_up(subtotal * entry.value / 100.0),
            DiscountKind::Fixed => round_half_up(entry.value),
        };
        discounts.push(AppliedDiscount {
            kind: offer.discount_type,
            amount,
            description: offer.description.clone(),
        });
    }

    if let Some(offer) = &input.exclusive_offer {
        let amount = match offer.market_discount(&input.market) {
            Some(entry) => match entry.kind {
                DiscountKind::Percentage => round_half_up(subtotal * entry.value / 100.0),
                DiscountKind::Fixed => round_half_up(entry.value),
            },
            // Exclusive offers fall back to their flat value, applied
            // as a fixed discount.
            None => round_half_up(offer.value),
        };
        discounts.push(AppliedDiscount {
            kind: offer.discount_type,
            amount,
            description: offer.description.clone(),
        });
    }

    let total_discount: f64 = discounts.iter().map(|d| d.amount).sum();
    let grand_total = subtotal - total_discount;
    if grand_total < 0.0 {
        // Stacked discounts exceeded the subtotal. Kept unclamped for
        // parity with the storefront's historical totals.
        tracing::warn!(grand_total, subtotal, total_discount, "discounted total went negative");
    }

    Ok(PriceBreakdown {
        base_price_per_night: input.base_price_per_night,
        effective_per_night_price: effective_per_night,
        nights: input.nights,
        rooms: input.rooms,
        room_total,
        meal_plan,
        market_surcharge,
        discounts,
        grand_total,
    })
}
