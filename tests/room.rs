use axum::http::StatusCode;
use badmap::models::{Room, RoomStatus};
use serde_json::json;

mod common;

use common::TestEnv;

#[tokio::test(flavor = "multi_thread")]
async fn available_rooms_hide_maintenance() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;
	env.approve_facility(f_id).await;

	let kept = env.add_room(f_id, "Kamer 1", 800).await;
	let down = env.add_room(f_id, "Kamer 2", 800).await;

	let response = env
		.app
		.post(&format!("/rooms/{down}/maintenance"))
		.json(&json!({ "maintenance": true }))
		.await;
	response.assert_status_ok();
	assert_eq!(response.json::<Room>().status, RoomStatus::Maintenance);

	let rooms = env.app.get(&format!("/facilities/{f_id}/rooms")).await;
	rooms.assert_status_ok();

	let rooms = rooms.json::<Vec<Room>>();
	assert_eq!(rooms.len(), 1);
	assert_eq!(rooms[0].id, kept);

	// The owner still sees both
	let all = env.app.get(&format!("/facilities/{f_id}/rooms/all")).await;
	all.assert_status_ok();
	assert_eq!(all.json::<Vec<Room>>().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn maintenance_toggle_is_reversible() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;
	let r_id = env.add_room(f_id, "Kamer 1", 800).await;

	let down = env
		.app
		.post(&format!("/rooms/{r_id}/maintenance"))
		.json(&json!({ "maintenance": true }))
		.await;
	assert_eq!(down.json::<Room>().status, RoomStatus::Maintenance);

	let up = env
		.app
		.post(&format!("/rooms/{r_id}/maintenance"))
		.json(&json!({ "maintenance": false }))
		.await;
	assert_eq!(up.json::<Room>().status, RoomStatus::Available);
}

#[tokio::test(flavor = "multi_thread")]
async fn booked_room_cannot_be_deleted_or_repurposed() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;
	env.approve_facility(f_id).await;
	let r_id = env.add_room(f_id, "Kamer 1", 800).await;

	env.login_user().await;

	env.app
		.post("/bookings")
		.json(&json!({
			"facilityId": f_id,
			"roomId": r_id,
			"guestName": "Jan Janssens",
			"guestPhone": "+32 470 11 22 33",
			"estimatedMinutes": 10,
		}))
		.await
		.assert_status_ok();

	env.login_provider().await;

	let delete = env.app.delete(&format!("/rooms/{r_id}")).await;
	assert_eq!(delete.status_code(), StatusCode::CONFLICT);

	let maintenance = env
		.app
		.post(&format!("/rooms/{r_id}/maintenance"))
		.json(&json!({ "maintenance": true }))
		.await;
	assert_eq!(maintenance.status_code(), StatusCode::CONFLICT);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_idle_room() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;
	let r_id = env.add_room(f_id, "Kamer 1", 800).await;

	let response = env.app.delete(&format!("/rooms/{r_id}")).await;
	assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

	let all = env.app.get(&format!("/facilities/{f_id}/rooms/all")).await;
	assert!(all.json::<Vec<Room>>().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_room_label_is_rejected() {
	let env = TestEnv::new().await;

	let f_id = env.create_facility("Stadsbad", "Gent", 500).await;
	env.add_room(f_id, "Kamer 1", 800).await;

	let response = env
		.app
		.post(&format!("/facilities/{f_id}/rooms/all"))
		.json(&json!({
			"label": "Kamer 1",
			"category": "single",
			"price": 900,
			"amenities": [],
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test(flavor = "multi_thread")]
async fn room_management_requires_session() {
	let env = TestEnv::new().await;

	let response = env.app.delete("/rooms/1").await;

	assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}
