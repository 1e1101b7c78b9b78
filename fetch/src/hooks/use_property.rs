use std::sync::Arc;

use payloads::{APIClient, Property, PropertyId};

use crate::envelope::EnvelopeOptions;
use crate::query::Query;

/// Detail view for one listing. Fetches on creation; `set_deps` with another
/// id switches listings.
///
/// Must be called from within a Tokio runtime.
pub fn use_property(
    client: Arc<APIClient>,
    property_id: PropertyId,
) -> Query<PropertyId, Property> {
    Query::with_options(
        property_id,
        move |property_id: PropertyId| {
            let client = client.clone();
            async move { client.get_property(&property_id).await }
        },
        EnvelopeOptions::new().action("load property"),
    )
}
