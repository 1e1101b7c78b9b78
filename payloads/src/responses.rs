use jiff::{Timestamp, civil::Date};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{PropertyId, PropertyType, UserId};

/// A rental listing as shown in the browse and detail views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
    pub title: String,
    pub description: String,
    pub city: String,
    pub address: String,
    pub monthly_rent: Decimal,
    pub bedrooms: u8,
    pub bathrooms: u8,
    pub property_type: PropertyType,
    pub furnished: bool,
    pub available_from: Date,
    pub created_at: Timestamp,
}

impl Property {
    /// Case-insensitive substring match used by the search endpoint.
    pub fn matches_text(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [&self.title, &self.description, &self.city]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub name: String,
}

/// Returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}
