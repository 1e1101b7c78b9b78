//! Seed data for the mock backend
//!
//! Used by the integration tests and by the dev-server, so both see the same
//! listings and accounts.

use jiff::Timestamp;
use jiff::civil::date;
use payloads::requests::{CreateProperty, LoginCredentials};
use payloads::responses::UserProfile;
use payloads::{Property, PropertyId, PropertyType, UserId};
use rust_decimal::Decimal;
use uuid::Uuid;

pub const SEED_CITIES: [&str; 3] = ["Leeds", "York", "Sheffield"];
/// Listings per city in [`sample_properties`].
pub const PER_CITY: usize = 10;

pub struct MockUser {
    pub profile: UserProfile,
    pub password: String,
}

pub fn alice_credentials() -> LoginCredentials {
    LoginCredentials {
        email: "alice@example.com".into(),
        password: "supersecret123".into(),
    }
}

pub fn sample_users() -> Vec<MockUser> {
    let alice = alice_credentials();
    vec![MockUser {
        profile: UserProfile {
            id: UserId(Uuid::from_u128(1)),
            email: alice.email,
            name: "Alice".into(),
        },
        password: alice.password,
    }]
}

/// Thirty listings spread over three cities, cycling through property
/// types. Ids and timestamps are fixed so tests can refer to them.
pub fn sample_properties() -> Vec<Property> {
    let types = [
        PropertyType::Apartment,
        PropertyType::House,
        PropertyType::Studio,
        PropertyType::SharedRoom,
    ];
    let created_at = Timestamp::constant(1_735_689_600, 0);

    SEED_CITIES
        .iter()
        .flat_map(|city| (0..PER_CITY).map(move |n| (*city, n)))
        .enumerate()
        .map(|(i, (city, n))| {
            let property_type = types[i % types.len()];
            let bedrooms = (n % 4) as u8 + 1;
            Property {
                id: PropertyId(Uuid::from_u128(i as u128 + 1)),
                title: format!("{property_type} #{} in {city}", n + 1),
                description: format!(
                    "{bedrooms} bedroom {property_type} close to the \
                     university in {city}."
                ),
                city: city.to_string(),
                address: format!("{} Station Road, {city}", n + 1),
                monthly_rent: Decimal::new(350 + 25 * n as i64, 0),
                bedrooms,
                bathrooms: 1,
                property_type,
                furnished: n % 2 == 0,
                available_from: date(2026, 9, 1),
                created_at,
            }
        })
        .collect()
}

/// A listing that passes validation, for create tests.
pub fn new_listing() -> CreateProperty {
    CreateProperty {
        title: "Loft above the bakery".into(),
        description: "Top floor, lots of light, bills included.".into(),
        city: "York".into(),
        address: "3 Gillygate, York".into(),
        monthly_rent: Decimal::new(62500, 2),
        bedrooms: 1,
        bathrooms: 1,
        property_type: PropertyType::Studio,
        furnished: true,
        available_from: date(2026, 10, 1),
    }
}
