//! Pre-wired consumers of the listings backend, one per view.
//!
//! Each hook builds its component around a shared [`payloads::APIClient`];
//! the component owns its own state, so two views calling the same hook do
//! not interfere with each other.

pub mod use_create_property;
pub mod use_login;
pub mod use_properties;
pub mod use_property;
pub mod use_property_search;

pub use use_create_property::use_create_property;
pub use use_login::use_login;
pub use use_properties::{use_properties, use_property_feed};
pub use use_property::use_property;
pub use use_property_search::use_property_search;
