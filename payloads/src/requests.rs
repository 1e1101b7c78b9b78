use jiff::civil::Date;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::PropertyType;

pub const TITLE_MAX_LEN: usize = 120;
pub const DESCRIPTION_MAX_LEN: usize = 5000;
pub const MAX_BEDROOMS: u8 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Filters for browsing listings. Unset filters are left out of the query
/// string entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_bedrooms: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furnished: Option<bool>,
}

impl PropertyFilters {
    pub fn in_city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            ..Self::default()
        }
    }
}

/// Free text search over titles, descriptions and cities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchProperties {
    pub q: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProperty {
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
}

/// A single problem found by [`CreateProperty::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl CreateProperty {
    /// Check the listing the same way the add-property form does before
    /// submitting. Returns every problem found, not just the first.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let mut fail = |field, message| {
            errors.push(FieldError { field, message })
        };

        if self.title.trim().is_empty() {
            fail("title", "Title is required");
        } else if self.title.len() > TITLE_MAX_LEN {
            fail("title", "Title must be at most 120 characters");
        }
        if self.description.len() > DESCRIPTION_MAX_LEN {
            fail("description", "Description must be at most 5000 characters");
        }
        if self.city.trim().is_empty() {
            fail("city", "City is required");
        }
        if self.address.trim().is_empty() {
            fail("address", "Address is required");
        }
        if self.monthly_rent <= Decimal::ZERO {
            fail("monthlyRent", "Rent must be greater than zero");
        }
        if self.bedrooms > MAX_BEDROOMS {
            fail("bedrooms", "Too many bedrooms");
        }
        if self.bathrooms == 0 {
            fail("bathrooms", "At least one bathroom is required");
        }

        errors
    }
}
