use std::sync::Arc;
use std::time::Duration;

use payloads::requests::SearchProperties;
use payloads::{APIClient, Property};

use crate::debounce::DebouncedQuery;
use crate::envelope::EnvelopeOptions;

/// Search-as-you-type. Only the text present once typing pauses for `delay`
/// is sent.
pub fn use_property_search(
    client: Arc<APIClient>,
    delay: Duration,
) -> DebouncedQuery<SearchProperties, Vec<Property>> {
    DebouncedQuery::with_options(
        delay,
        move |search: SearchProperties| {
            let client = client.clone();
            async move { client.search_properties(&search).await }
        },
        EnvelopeOptions::new().action("search properties"),
    )
}
