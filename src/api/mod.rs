// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP routes.
//!
//! Each protected route runs its chain in this order:
//!
//! 1. numeric `{id}` check (session routes)
//! 2. [`validate_json`] for routes with a body
//! 3. [`authenticate`] when [`Policy::for_endpoint`] says a token is needed
//! 4. the handler, which applies the endpoint's policy entry
//!
//! `route_layer` wraps what is already there, so the layer added last runs
//! first.

use axum::{
    middleware,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use serde::de::DeserializeOwned;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;
use validator::Validate;

use crate::{
    auth::{authenticate, Endpoint, Policy, Role},
    error::ErrorBody,
    models::{
        AttendanceEntry, AttendancePayload, Emargement, LoginRequest, Session, SessionPayload,
        SignupRequest, TokenResponse, UserSummary,
    },
    state::AppState,
    validation::{validate_json, FieldViolation},
};

pub mod auth;
pub mod emargements;
pub mod health;
pub mod sessions;

/// Attach the guard when the endpoint's policy entry needs a token.
fn guarded(
    endpoint: Endpoint,
    route: MethodRouter<AppState>,
    state: &AppState,
) -> MethodRouter<AppState> {
    if Policy::for_endpoint(endpoint).requires_token() {
        route.route_layer(middleware::from_fn_with_state(state.clone(), authenticate))
    } else {
        route
    }
}

/// Validate the JSON body against `T` before anything else on the route.
fn validated<T>(route: MethodRouter<AppState>) -> MethodRouter<AppState>
where
    T: DeserializeOwned + Validate + Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn(validate_json::<T>))
}

fn with_session_id(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn(sessions::require_session_id))
}

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route(
            "/auth/signup",
            validated::<SignupRequest>(guarded(Endpoint::Signup, post(auth::signup), &state)),
        )
        .route(
            "/auth/login",
            validated::<LoginRequest>(guarded(Endpoint::Login, post(auth::login), &state)),
        )
        .route(
            "/protected",
            guarded(Endpoint::Protected, get(auth::protected), &state),
        )
        .route(
            "/sessions",
            guarded(Endpoint::ListSessions, get(sessions::list_sessions), &state).merge(
                validated::<SessionPayload>(guarded(
                    Endpoint::CreateSession,
                    post(sessions::create_session),
                    &state,
                )),
            ),
        )
        .route(
            "/sessions/{id}",
            with_session_id(
                guarded(Endpoint::GetSession, get(sessions::get_session), &state)
                    .merge(validated::<SessionPayload>(guarded(
                        Endpoint::UpdateSession,
                        put(sessions::update_session),
                        &state,
                    )))
                    .merge(guarded(
                        Endpoint::DeleteSession,
                        delete(sessions::delete_session),
                        &state,
                    )),
            ),
        )
        .route(
            "/sessions/{id}/emargement",
            with_session_id(
                validated::<AttendancePayload>(guarded(
                    Endpoint::RegisterAttendance,
                    post(emargements::register_attendance),
                    &state,
                ))
                .merge(guarded(
                    Endpoint::ListAttendance,
                    get(emargements::list_attendance),
                    &state,
                )),
            ),
        )
        .route("/health", get(health::health))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup,
        auth::login,
        auth::protected,
        sessions::create_session,
        sessions::list_sessions,
        sessions::get_session,
        sessions::update_session,
        sessions::delete_session,
        emargements::register_attendance,
        emargements::list_attendance,
        health::health
    ),
    components(
        schemas(
            SignupRequest,
            LoginRequest,
            UserSummary,
            TokenResponse,
            Role,
            SessionPayload,
            Session,
            AttendancePayload,
            Emargement,
            AttendanceEntry,
            ErrorBody,
            FieldViolation,
            health::HealthResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Signup, login and token check"),
        (name = "Sessions", description = "Training session management"),
        (name = "Emargements", description = "Student attendance"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;
