//! Route definitions and the top level app router

use std::time::Duration;

use axum::Router;
use axum::routing::{get, patch, post};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::controllers::auth::{
	login_profile,
	logout_profile,
	register_profile,
};
use crate::controllers::booking::{
	cancel_booking,
	check_in_booking,
	complete_booking,
	create_booking,
	get_booking,
	get_my_bookings,
};
use crate::controllers::facility::{
	approve_facility,
	create_facility,
	delete_facility,
	get_facility,
	get_facility_bookings,
	get_facility_code,
	get_my_facilities,
	get_pending_facilities,
	reject_facility,
	search_facilities,
	update_facility,
};
use crate::controllers::healthcheck;
use crate::controllers::profile::get_current_profile;
use crate::controllers::review::{create_review, get_facility_reviews};
use crate::controllers::room::{
	create_room,
	delete_room,
	get_available_rooms,
	get_facility_rooms,
	set_room_maintenance,
	update_room,
};
use crate::middleware::AuthLayer;

/// Get the app router
pub fn get_app_router(state: AppState) -> Router {
	let api_routes = Router::new()
		.route("/healthcheck", get(healthcheck))
		.nest("/auth", auth_routes(&state))
		.nest("/profile", profile_routes(&state))
		.nest("/facilities", facility_routes(&state))
		.nest("/rooms", room_routes(&state))
		.nest("/bookings", booking_routes(&state));

	Router::new()
		.merge(api_routes)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(TimeoutLayer::new(Duration::from_secs(10)))
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

/// Authentication routes
fn auth_routes(state: &AppState) -> Router<AppState> {
	Router::new()
		.route("/register", post(register_profile))
		.route("/login", post(login_profile))
		.route(
			"/logout",
			post(logout_profile).route_layer(AuthLayer::new(state.clone())),
		)
}

/// Profile routes
fn profile_routes(state: &AppState) -> Router<AppState> {
	Router::new()
		.route("/me", get(get_current_profile))
		.route_layer(AuthLayer::new(state.clone()))
}

/// Facility routes
///
/// Discovery stays public; management, moderation, and reviewing require a
/// session. Role checks happen in the session extractors
fn facility_routes(state: &AppState) -> Router<AppState> {
	let authenticated = Router::new()
		.route("/", post(create_facility))
		.route("/mine", get(get_my_facilities))
		.route("/pending", get(get_pending_facilities))
		.route(
			"/{id}",
			patch(update_facility).delete(delete_facility),
		)
		.route("/{id}/approve", post(approve_facility))
		.route("/{id}/reject", post(reject_facility))
		.route("/{id}/code", get(get_facility_code))
		.route("/{id}/bookings", get(get_facility_bookings))
		.route(
			"/{id}/rooms/all",
			get(get_facility_rooms).post(create_room),
		)
		.route("/{id}/reviews", post(create_review))
		.route_layer(AuthLayer::new(state.clone()));

	Router::new()
		.route("/", get(search_facilities))
		.route("/{id}", get(get_facility))
		.route("/{id}/rooms", get(get_available_rooms))
		.route("/{id}/reviews", get(get_facility_reviews))
		.merge(authenticated)
}

/// Room management routes
fn room_routes(state: &AppState) -> Router<AppState> {
	Router::new()
		.route("/{id}", patch(update_room).delete(delete_room))
		.route("/{id}/maintenance", post(set_room_maintenance))
		.route_layer(AuthLayer::new(state.clone()))
}

/// Booking lifecycle routes
fn booking_routes(state: &AppState) -> Router<AppState> {
	Router::new()
		.route("/", post(create_booking).get(get_my_bookings))
		.route("/{id}", get(get_booking))
		.route("/{id}/check-in", post(check_in_booking))
		.route("/{id}/check-out", post(complete_booking))
		.route("/{id}/cancel", post(cancel_booking))
		.route_layer(AuthLayer::new(state.clone()))
}
