use std::sync::Arc;

use payloads::requests::CreateProperty;
use payloads::{APIClient, ClientError, Property};

use crate::envelope::EnvelopeOptions;
use crate::query::Mutation;
use crate::session::StoredSession;

/// Publishing a listing from the add-property form.
///
/// The form's own checks run first and a listing that fails them is never
/// sent. The bearer token is read from `session` at submit time, and a 401
/// clears it.
pub fn use_create_property(
    client: Arc<APIClient>,
    session: Arc<StoredSession>,
) -> Mutation<CreateProperty, Property> {
    let token_source = session.clone();
    Mutation::with_options(
        move |details: CreateProperty| {
            let client = client.clone();
            let token = token_source.token();
            async move {
                if let Some(problem) = details.validate().first() {
                    return Err(ClientError::Unsuccessful {
                        message: Some(problem.message.to_string()),
                    });
                }
                client.create_property(&details, token.as_deref()).await
            }
        },
        EnvelopeOptions::new()
            .action("create property")
            .session(session),
    )
}
