use axum::http::StatusCode;
use badmap::models::Facility;
use serde_json::{Value, json};

mod common;

use common::TestEnv;

async fn post_review(env: &TestEnv, f_id: i32, rating: i32) {
	let response = env
		.app
		.post(&format!("/facilities/{f_id}/reviews"))
		.json(&json!({ "rating": rating, "body": "prima sanitair" }))
		.await;

	response.assert_status_ok();
}

#[tokio::test(flavor = "multi_thread")]
async fn reviews_update_running_mean() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;
	env.approve_facility(f_id).await;

	env.login_user().await;
	post_review(&env, f_id, 4).await;
	post_review(&env, f_id, 5).await;

	let facility = env
		.app
		.get(&format!("/facilities/{f_id}"))
		.await
		.json::<Facility>();

	assert_eq!(facility.rating_count, 2);
	assert!((facility.rating_average - 4.5).abs() < f64::EPSILON);
}

#[tokio::test(flavor = "multi_thread")]
async fn first_review_sets_the_mean() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;
	env.approve_facility(f_id).await;

	env.login_user().await;
	post_review(&env, f_id, 3).await;

	let facility = env
		.app
		.get(&format!("/facilities/{f_id}"))
		.await
		.json::<Facility>();

	assert_eq!(facility.rating_count, 1);
	assert!((facility.rating_average - 3.0).abs() < f64::EPSILON);
}

#[tokio::test(flavor = "multi_thread")]
async fn rating_out_of_range_is_rejected() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;
	env.approve_facility(f_id).await;

	env.login_user().await;

	for rating in [0, 6] {
		let response = env
			.app
			.post(&format!("/facilities/{f_id}/reviews"))
			.json(&json!({ "rating": rating }))
			.await;

		assert_eq!(
			response.status_code(),
			StatusCode::UNPROCESSABLE_ENTITY
		);
	}
}

#[tokio::test(flavor = "multi_thread")]
async fn unapproved_facility_cannot_be_reviewed() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;

	env.login_user().await;

	let response = env
		.app
		.post(&format!("/facilities/{f_id}/reviews"))
		.json(&json!({ "rating": 4 }))
		.await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn reviews_are_listed_with_their_author() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;
	env.approve_facility(f_id).await;

	env.login_user().await;
	post_review(&env, f_id, 5).await;

	let response = env.app.get(&format!("/facilities/{f_id}/reviews")).await;
	response.assert_status_ok();

	let body = response.json::<Value>();
	assert_eq!(body["total"].as_i64().unwrap(), 1);
	assert_eq!(body["data"][0]["rating"].as_i64().unwrap(), 5);
	assert_eq!(body["data"][0]["created_by"]["username"], "test-user");
}

#[tokio::test(flavor = "multi_thread")]
async fn review_page_past_the_end_is_rejected() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;
	env.approve_facility(f_id).await;

	env.login_user().await;
	post_review(&env, f_id, 4).await;

	let response = env
		.app
		.get(&format!("/facilities/{f_id}/reviews"))
		.add_query_param("page", 5)
		.await;

	assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
