use axum::http::StatusCode;
use badmap::models::{Facility, FacilityStatus};
use serde_json::{Value, json};

mod common;

use common::TestEnv;

#[tokio::test(flavor = "multi_thread")]
async fn create_facility_requires_provider_role() {
	let env = TestEnv::new().await;

	env.login_user().await;

	let response = env
		.app
		.post("/facilities")
		.json(&json!({
			"name": "Sneaky Baths",
			"street": "Badstraat",
			"number": "1",
			"zip": "9000",
			"city": "Gent",
			"latitude": 51.05,
			"longitude": 3.72,
			"basePrice": 500,
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test(flavor = "multi_thread")]
async fn new_facility_is_pending_and_invisible() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;

	// The owner sees it in their own list with status pending
	let mine = env.app.get("/facilities/mine").await;
	mine.assert_status_ok();

	let mine = mine.json::<Vec<Facility>>();
	assert_eq!(mine.len(), 1);
	assert_eq!(mine[0].status, FacilityStatus::Pending);

	// Discovery does not show it
	let response = env.app.get(&format!("/facilities/{f_id}")).await;
	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

	let listing = env.app.get("/facilities").await;
	listing.assert_status_ok();
	assert_eq!(listing.json::<Value>()["total"].as_i64().unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn approved_facility_becomes_visible() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;
	env.approve_facility(f_id).await;

	let response = env.app.get(&format!("/facilities/{f_id}")).await;
	response.assert_status_ok();

	let facility = response.json::<Facility>();
	assert_eq!(facility.status, FacilityStatus::Approved);

	let listing = env.app.get("/facilities").await;
	assert_eq!(listing.json::<Value>()["total"].as_i64().unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_facility_stays_invisible() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Schimmelbad", "Gent", 500).await;

	env.login_admin().await;

	let response = env
		.app
		.post(&format!("/facilities/{f_id}/reject"))
		.json(&json!({ "reason": "geen werkende waterleiding" }))
		.await;
	response.assert_status_ok();

	assert_eq!(
		response.json::<Value>()["rejection_reason"],
		"geen werkende waterleiding"
	);

	let visible = env.app.get(&format!("/facilities/{f_id}")).await;
	assert_eq!(visible.status_code(), StatusCode::NOT_FOUND);

	// Moderation is single-shot, a rejected facility cannot be approved
	let approve = env.app.post(&format!("/facilities/{f_id}/approve")).await;
	assert_eq!(approve.status_code(), StatusCode::NOT_FOUND);

	// The provider sees why their facility was turned down
	env.login_provider().await;
	let mine = env.app.get("/facilities/mine").await.json::<Value>();
	assert_eq!(mine[0]["rejection_reason"], "geen werkende waterleiding");

	// A reject without a reason is refused
	let other = env.create_facility("Kuurbad", "Brugge", 700).await;
	env.login_admin().await;
	let bare = env
		.app
		.post(&format!("/facilities/{other}/reject"))
		.json(&json!({ "reason": "" }))
		.await;
	assert_eq!(bare.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test(flavor = "multi_thread")]
async fn moderation_requires_admin_role() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;

	// The provider session from creation is still active
	let response = env.app.post(&format!("/facilities/{f_id}/approve")).await;
	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

	let pending = env.app.get("/facilities/pending").await;
	assert_eq!(pending.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test(flavor = "multi_thread")]
async fn pending_queue_lists_unmoderated_facilities() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;
	let other = env.create_facility("Kuurbad", "Brugge", 700).await;
	env.approve_facility(other).await;

	let response = env.app.get("/facilities/pending").await;
	response.assert_status_ok();

	let pending = response.json::<Vec<Facility>>();
	assert_eq!(pending.len(), 1);
	assert_eq!(pending[0].id, f_id);
}

#[tokio::test(flavor = "multi_thread")]
async fn search_by_query_and_price() {
	let env = TestEnv::new().await;

	let cheap = env.create_facility("Stadsbad", "Gent", 300).await;
	let pricey = env.create_facility("Kuurbad", "Brugge", 900).await;
	env.approve_facility(cheap).await;
	env.approve_facility(pricey).await;

	let by_city = env.app.get("/facilities").add_query_param("query", "brug").await;
	by_city.assert_status_ok();

	let body = by_city.json::<Value>();
	assert_eq!(body["total"].as_i64().unwrap(), 1);
	assert_eq!(body["data"][0]["id"].as_i64().unwrap(), i64::from(pricey));

	let by_price =
		env.app.get("/facilities").add_query_param("maxPrice", 500).await;
	by_price.assert_status_ok();

	let body = by_price.json::<Value>();
	assert_eq!(body["total"].as_i64().unwrap(), 1);
	assert_eq!(body["data"][0]["id"].as_i64().unwrap(), i64::from(cheap));
}

#[tokio::test(flavor = "multi_thread")]
async fn search_by_amenities() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;
	env.approve_facility(f_id).await;

	let with_shower =
		env.app.get("/facilities").add_query_param("amenities", "shower").await;
	assert_eq!(with_shower.json::<Value>()["total"].as_i64().unwrap(), 1);

	let with_sauna =
		env.app.get("/facilities").add_query_param("amenities", "sauna").await;
	assert_eq!(with_sauna.json::<Value>()["total"].as_i64().unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn search_with_a_center_reports_distances() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;
	env.approve_facility(f_id).await;

	// Centered exactly on the facility
	let nearby = env
		.app
		.get("/facilities")
		.add_query_param("centerLat", 51.05)
		.add_query_param("centerLng", 3.72)
		.add_query_param("radiusKm", 5)
		.await;
	nearby.assert_status_ok();

	let body = nearby.json::<Value>();
	assert_eq!(body["total"].as_i64().unwrap(), 1);
	assert_eq!(body["data"][0]["id"].as_i64().unwrap(), i64::from(f_id));
	assert_eq!(body["data"][0]["distance"], "0 m");

	// Without a center no distance is reported
	let unscoped = env.app.get("/facilities").await;
	assert!(unscoped.json::<Value>()["data"][0]["distance"].is_null());

	// A center far away excludes the facility entirely
	let far = env
		.app
		.get("/facilities")
		.add_query_param("centerLat", 50.85)
		.add_query_param("centerLng", 4.35)
		.add_query_param("radiusKm", 5)
		.await;
	assert_eq!(far.json::<Value>()["total"].as_i64().unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_own_facility() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;

	let response = env
		.app
		.patch(&format!("/facilities/{f_id}"))
		.json(&json!({ "basePrice": 650 }))
		.await;

	response.assert_status_ok();
	assert_eq!(response.json::<Facility>().base_price, 650);
}

#[tokio::test(flavor = "multi_thread")]
async fn update_requires_ownership() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;

	// A freshly registered account has no claim on the facility
	env.app
		.post("/auth/register")
		.json(&json!({
			"username": "other-provider",
			"password": "other-provider-password",
			"email": "other@badmap.test",
			"displayName": "Other Provider",
		}))
		.await
		.assert_status_ok();

	env.login_as("other-provider", "other-provider-password").await;

	let response = env
		.app
		.patch(&format!("/facilities/{f_id}"))
		.json(&json!({ "basePrice": 1 }))
		.await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}
