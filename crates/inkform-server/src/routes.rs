//! Route table.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Router, middleware as axum_middleware};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::access_gate;
use crate::state::AppState;

/// Builds the application router. Every route runs behind the access gate;
/// the gate itself decides which paths anonymous callers may reach.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Studio
        .route("/studio", get(handlers::current_studio))
        .route("/studio/create", post(handlers::create_studio))
        .route("/studio/settings", post(handlers::update_studio))
        .route("/studio/delete", post(handlers::delete_studio))
        .route("/studio/members", get(handlers::list_members))
        // Invitations (manager side)
        .route("/studio/members/invite", post(handlers::send_invitation))
        .route("/studio/invitations", get(handlers::list_studio_invitations))
        .route(
            "/studio/invitations/{id}/cancel",
            post(handlers::cancel_invitation),
        )
        .route(
            "/studio/invitations/{id}/resend",
            post(handlers::resend_invitation),
        )
        // Invitations (invitee side)
        .route("/auth/invitation/{token}", get(handlers::get_invitation))
        .route(
            "/auth/invitation/{token}/accept",
            post(handlers::accept_invitation),
        )
        .route(
            "/auth/invitation/{token}/decline",
            post(handlers::decline_invitation),
        )
        .route("/auth/invitations", get(handlers::my_invitations))
        // Templates
        .route(
            "/studio/templates",
            get(handlers::list_templates).post(handlers::create_template),
        )
        .route(
            "/studio/templates/{id}",
            get(handlers::get_template)
                .put(handlers::update_template)
                .delete(handlers::delete_template),
        )
        // Forms
        .route(
            "/studio/forms",
            get(handlers::list_forms).post(handlers::create_form),
        )
        .route("/studio/forms/search", get(handlers::search_forms))
        .route("/studio/forms/range", get(handlers::forms_in_range))
        .route(
            "/studio/forms/{id}/full",
            get(handlers::get_form_with_template),
        )
        .route(
            "/studio/forms/{id}",
            get(handlers::get_form)
                .put(handlers::update_form)
                .delete(handlers::delete_form),
        )
        // Archive
        .route(
            "/studio/archive",
            get(handlers::search_archive).post(handlers::archive_pdf),
        )
        .route("/studio/archive/stats", get(handlers::archive_stats))
        .route(
            "/studio/archive/form/{form_id}",
            get(handlers::get_archived_pdf_for_form),
        )
        .route(
            "/studio/archive/{id}",
            get(handlers::get_archived_pdf)
                .put(handlers::update_archived_pdf)
                .delete(handlers::delete_archived_pdf),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            access_gate,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
