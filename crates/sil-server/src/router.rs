use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::Credentials;
use crate::error::ApiError;
use crate::handlers::{certificates, stats, transactions, verification};
use crate::state::AppState;

/// Admin gate: authenticate the bearer token and stash the resulting
/// identity in request extensions for handlers that attribute writes.
async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| Credentials::Bearer(token.to_string()))
        .unwrap_or(Credentials::Anonymous);

    let identity = state.auth.authenticate(&credentials).await?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Build the axum router for the `/blockchain` surface.
///
/// Everything is admin-gated except `POST /blockchain/verify`, which is
/// deliberately public: certificate verification is meant to be checkable
/// by third parties given only the certificate number.
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/blockchain/stats", get(stats::get_stats))
        .route(
            "/blockchain/transactions",
            get(transactions::list_transactions),
        )
        .route(
            "/blockchain/transactions/:id",
            get(transactions::get_transaction).delete(transactions::delete_transaction),
        )
        .route(
            "/blockchain/transactions/:id/retry",
            post(transactions::retry_transaction),
        )
        .route(
            "/blockchain/certificates",
            get(certificates::list_certificates).post(certificates::create_certificate),
        )
        .route(
            "/blockchain/certificates/:id",
            get(certificates::get_certificate)
                .put(certificates::update_certificate)
                .delete(certificates::delete_certificate),
        )
        .route(
            "/blockchain/certificates/:id/register",
            post(certificates::register_certificate),
        )
        .route(
            "/blockchain/verifications",
            get(verification::list_verifications),
        )
        .route(
            "/blockchain/verifications/:id",
            delete(verification::delete_verification),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    let public = Router::new().route("/blockchain/verify", post(verification::verify_certificate));

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
