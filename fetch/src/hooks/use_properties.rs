use std::sync::Arc;

use payloads::requests::PropertyFilters;
use payloads::{APIClient, Paginated, Property};

use crate::envelope::{EnvelopeOptions, OpResult};
use crate::error::ErrorPolicy;
use crate::infinite::InfiniteScroll;
use crate::pagination::{PageRequest, PaginationController};

/// Paged browsing for the listings grid. Filters travel as the extra page
/// argument, so changing them is just `load_page(1, new_filters)`.
pub fn use_properties(
    client: Arc<APIClient>,
    page_size: u32,
) -> PaginationController<Property, PropertyFilters> {
    PaginationController::with_options(
        page_size,
        move |request| list_page(client.clone(), request),
        EnvelopeOptions::new().action("load properties"),
    )
}

/// The same listings as one growing feed. Call `reset` when the filters
/// change.
pub fn use_property_feed(
    client: Arc<APIClient>,
    page_size: u32,
) -> InfiniteScroll<Property, PropertyFilters> {
    InfiniteScroll::with_policy(
        page_size,
        move |request| list_page(client.clone(), request),
        ErrorPolicy::new("load more properties"),
    )
}

async fn list_page(
    client: Arc<APIClient>,
    request: PageRequest<PropertyFilters>,
) -> OpResult<Paginated<Property>> {
    client
        .list_properties(request.page, request.limit, &request.extra)
        .await
}
