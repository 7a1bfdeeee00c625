// Search criteria and validation. A criteria value is created per user
// interaction and recomputed on every parameter change; invalid input is
// rejected here before any filtering or pricing starts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("check-in {check_in} must be before check-out {check_out}")]
    DateOrder {
        check_in: NaiveDate,
        check_out: NaiveDate,
    },

    #[error("children count {children} does not match ages list of length {ages}")]
    ChildrenAgesMismatch { children: u32, ages: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    PriceLow,
    PriceHigh,
    Rating,
    Popularity,
    Availability,
}

impl SortKey {
    /// Parses a storefront sort key. Unknown keys produce `None`, which
    /// ranks as identity order rather than an error.
    pub fn parse(key: &str) -> Option<SortKey> {
        match key {
            "price_low" => Some(SortKey::PriceLow),
            "price_high" => Some(SortKey::PriceHigh),
            "rating" => Some(SortKey::Rating),
            "popularity" => Some(SortKey::Popularity),
            "availability" => Some(SortKey::Availability),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCriteria {
    // Empty destination matches everything.
    pub destination: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    // Nationality/market code; empty means no market filter.
    pub nationality: String,
    pub meal_plan: Option<String>,
    pub rooms: u32,
    pub adults: u32,
    pub children: u32,
    pub children_ages: Vec<u8>,
    // Requested nightly price band [min, max].
    pub price_range: (f64, f64),
    pub min_stars: u8,
    pub sort_key: Option<SortKey>,
}

impl SearchCriteria {
    /// Stay length in nights. Positive only when the date range is valid.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    pub fn validate(&self) -> Result<(), CriteriaError> {
        if self.check_in >= self.check_out {
            return Err(CriteriaError::DateOrder {
                check_in: self.check_in,
                check_out: self.check_out,
            });
        }
        if self.children as usize != self.children_ages.len() {
            return Err(CriteriaError::ChildrenAgesMismatch {
                children: self.children,
                ages: self.children_ages.len(),
            });
        }
        Ok(())
    }
}
