use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use promostock_auth::granted_capabilities;

use crate::context::ActorContext;

/// GET /health. No auth; load balancers poll this.
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /whoami. Echoes the identity and grants the token resolved to, so a
/// client can render its UI without replaying the grant table.
pub async fn whoami(Extension(actor): Extension<ActorContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": actor.user_id().to_string(),
        "role": actor.role().as_str(),
        "capabilities": granted_capabilities(actor.role())
            .into_iter()
            .map(|capability| capability.as_str())
            .collect::<Vec<_>>(),
    }))
}
