// Discount offers and eligibility classification. The engine segregates
// offers by type and market; whether a non-exclusive offer is eligible
// at all is a business-policy decision injected by the caller.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
    Exclusive,
    Seasonal,
    Transportation,
}

// Discount kind of a market-specific entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketDiscount {
    pub market: String,
    #[serde(rename = "type")]
    pub kind: DiscountKind,
    pub value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferConditions {
    pub min_bookings: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub description: String,
    pub discount_type: DiscountType,
    // Flat value, used only where no market-specific entry applies.
    pub value: f64,
    #[serde(default)]
    pub discount_values: Vec<MarketDiscount>,
    #[serde(default)]
    pub applicable_hotels: Vec<String>,
    #[serde(default)]
    pub conditions: OfferConditions,
    // Agents that already consumed this offer; exclusive offers are
    // single-use per agent, tracked by the caller.
    #[serde(default)]
    pub used_agents: Vec<String>,
}

impl Offer {
    /// Market-specific discount entry, exact match on the market code.
    pub fn market_discount(&self, market: &str) -> Option<&MarketDiscount> {
        self.discount_values.iter().find(|d| d.market == market)
    }

    pub fn applies_to_hotel(&self, hotel_id: &str) -> bool {
        self.applicable_hotels.iter().any(|h| h == hotel_id)
    }

    pub fn is_used_by(&self, agent: &str) -> bool {
        self.used_agents.iter().any(|a| a == agent)
    }
}

#[derive(Debug, Default, Clone)]
pub struct OfferClassification {
    pub auto_applied: Vec<Offer>,
    pub exclusive_candidates: Vec<Offer>,
}

/// Splits an offer list into auto-applied offers and selectable
/// exclusive candidates for one hotel/market context.
///
/// An exclusive candidate must target the hotel or carry a
/// market-specific entry for the current market; exclusive offers
/// failing both are dropped. Non-exclusive offers become auto-applied
/// when `auto_policy` marks them eligible — the policy is an external
/// input, the engine adds no eligibility rules of its own.
pub fn classify_offers(
    offers: &[Offer],
    hotel_id: &str,
    market: &str,
    auto_policy: impl Fn(&Offer) -> bool,
) -> OfferClassification {
    let mut classification = OfferClassification::default();

    for offer in offers {
        match offer.discount_type {
            DiscountType::Exclusive => {
                if offer.applies_to_hotel(hotel_id) || offer.market_discount(market).is_some() {
                    classification.exclusive_candidates.push(offer.clone());
                }
            }
            DiscountType::Percentage
            | DiscountType::Fixed
            | DiscountType::Seasonal
            | DiscountType::Transportation => {
                if auto_policy(offer) {
                    classification.auto_applied.push(offer.clone());
                }
            }
        }
    }

    classification
}

/// Holder for the booking's single exclusive offer. Selecting a second
/// offer replaces the first, it never stacks.
#[derive(Debug, Default, Clone)]
pub struct ExclusiveSelection {
    current: Option<Offer>,
}

impl ExclusiveSelection {
    pub fn select(&mut self, offer: Offer) -> Option<Offer> {
        self.current.replace(offer)
    }

    pub fn clear(&mut self) -> Option<Offer> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&Offer> {
        self.current.as_ref()
    }
}
