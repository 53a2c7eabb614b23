use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};

use promostock_auth::{Capability, Role};

use crate::app::errors;
use crate::app::services::AppServices;

/// GET /capabilities/:role/:capability
///
/// Unknown roles answer `granted: false` rather than erroring, so clients
/// probing with stale role names fail closed. Unknown capability names are a
/// caller bug and get a 400.
pub async fn check_capability(
    Extension(services): Extension<Arc<AppServices>>,
    Path((role, capability)): Path<(String, String)>,
) -> axum::response::Response {
    let capability: Capability = match capability.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_capability",
                "capability must be one of: manage_users, manage_items, move_stock, allocate",
            );
        }
    };

    let granted = role
        .parse::<Role>()
        .map(|role| services.ledger.has_capability(role, capability))
        .unwrap_or(false);

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "role": role,
            "capability": capability.as_str(),
            "granted": granted,
        })),
    )
        .into_response()
}
