use axum_extra::extract::cookie::Key;
use axum_test::TestServer;
use badmap::{AppState, Config, DbPool, SeedProfile, Seeder, routes};
use serde_json::json;

mod mock_db;
mod mock_redis;

use mock_db::{DATABASE_PROVIDER, DatabaseGuard};
use mock_redis::{RedisUrlGuard, RedisUrlLock};

#[allow(dead_code)]
pub struct TestEnv {
	pub app:         TestServer,
	pub pool:        DbPool,
	pub db_guard:    DatabaseGuard,
	pub redis_guard: RedisUrlGuard,
}

impl TestEnv {
	/// Get a test environment with mocked resources for running tests
	///
	/// # Panics
	/// Panics if building a test server fails
	pub async fn new() -> Self {
		let config = Config::from_env();

		let test_pool_guard = (*DATABASE_PROVIDER).acquire().await;
		let test_pool = test_pool_guard.create_pool();

		{
			let mut conn = test_pool.get().await.unwrap();

			Seeder::new(&mut conn)
				.populate("seed/profiles.json", async |conn, profiles| {
					for profile in profiles {
						SeedProfile::insert(profile, conn).await?;
					}

					Ok(())
				})
				.await;
		}

		let redis_url_guard = RedisUrlLock::get();
		let redis_connection = redis_url_guard.connect().await;

		let cookie_jar_key = Key::from(&[0u8; 64]);

		let state = AppState {
			config,
			database_pool: test_pool.clone(),
			redis_connection,
			cookie_jar_key,
		};
		let app = routes::get_app_router(state);

		let test_server =
			TestServer::builder().save_cookies().build(app).unwrap();

		TestEnv {
			app:         test_server,
			pool:        test_pool,
			db_guard:    test_pool_guard,
			redis_guard: redis_url_guard,
		}
	}

	/// Log in as the given seeded profile, replacing any previous session
	/// cookie
	pub async fn login_as(&self, username: &str, password: &str) {
		let response = self
			.app
			.post("/auth/login")
			.json(&json!({ "username": username, "password": password }))
			.await;

		response.assert_status_ok();
	}

	#[allow(dead_code)]
	pub async fn login_user(&self) {
		self.login_as("test-user", "test-user-password").await;
	}

	#[allow(dead_code)]
	pub async fn login_provider(&self) {
		self.login_as("test-provider", "test-provider-password").await;
	}

	#[allow(dead_code)]
	pub async fn login_admin(&self) {
		self.login_as("test-admin", "test-admin-password").await;
	}

	/// Create a facility as the seeded provider and return its id
	///
	/// Leaves the provider session active
	#[allow(dead_code)]
	pub async fn create_facility(
		&self,
		name: &str,
		city: &str,
		base_price: i32,
	) -> i32 {
		self.login_provider().await;

		let response = self
			.app
			.post("/facilities")
			.json(&json!({
				"name": name,
				"street": "Badstraat",
				"number": "1",
				"zip": "9000",
				"city": city,
				"latitude": 51.05,
				"longitude": 3.72,
				"basePrice": base_price,
				"amenities": ["shower"],
			}))
			.await;

		response.assert_status_ok();

		response.json::<serde_json::Value>()["id"].as_i64().unwrap() as i32
	}

	/// Approve a facility as the seeded admin
	///
	/// Leaves the admin session active
	#[allow(dead_code)]
	pub async fn approve_facility(&self, f_id: i32) {
		self.login_admin().await;

		self.app
			.post(&format!("/facilities/{f_id}/approve"))
			.await
			.assert_status_ok();
	}

	/// Add a room to a facility as the seeded provider and return its id
	///
	/// Leaves the provider session active
	#[allow(dead_code)]
	pub async fn add_room(&self, f_id: i32, label: &str, price: i32) -> i32 {
		self.login_provider().await;

		let response = self
			.app
			.post(&format!("/facilities/{f_id}/rooms/all"))
			.json(&json!({
				"label": label,
				"category": "single",
				"price": price,
				"amenities": [],
			}))
			.await;

		response.assert_status_ok();

		response.json::<serde_json::Value>()["id"].as_i64().unwrap() as i32
	}

	/// Get the signed check-in code payload of a facility as the seeded
	/// provider
	///
	/// Leaves the provider session active
	#[allow(dead_code)]
	pub async fn facility_code(&self, f_id: i32) -> String {
		self.login_provider().await;

		let response =
			self.app.get(&format!("/facilities/{f_id}/code")).await;

		response.assert_status_ok();

		response.json::<serde_json::Value>()["payload"]
			.as_str()
			.unwrap()
			.to_string()
	}
}
