use super::handlers::{callback, health};
use utoipa::OpenApi;

/// `OpenAPI` document for every routed endpoint.
///
/// Add new endpoints to `paths(...)` so they show up in `/openapi.json` and the
/// `openapi` binary output.
#[derive(OpenApi)]
#[openapi(
    paths(health::health, callback::confirm, callback::callback),
    components(schemas(health::Health)),
    tags(
        (name = "auth", description = "Authentication link callbacks"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
