use deadpool_diesel::postgres::{Manager, Pool};
use time::Duration;

use crate::RedisConn;

/// Application configuration, read from the environment once at startup
#[derive(Clone, Debug)]
pub struct Config {
	pub production: bool,

	pub database_url: String,
	pub redis_url:    String,

	pub access_cookie_name:     String,
	pub access_cookie_lifetime: Duration,

	pub sweep_interval: std::time::Duration,
}

impl Config {
	fn get_env_var(var: &str) -> String {
		std::env::var(var).unwrap_or_else(|_| panic!("{var} must be set"))
	}

	/// Create a new [`Config`] from environment variables
	///
	/// # Panics
	/// Panics if an environment variable is missing or malformed
	#[must_use]
	pub fn from_env() -> Self {
		let production = std::env::var("PRODUCTION")
			.map(|v| v == "true")
			.unwrap_or_default();

		let database_url = Self::get_env_var("DATABASE_URL");
		let redis_url = Self::get_env_var("REDIS_URL");

		let access_cookie_name = Self::get_env_var("ACCESS_COOKIE_NAME");
		let access_cookie_lifetime = Duration::minutes(
			Self::get_env_var("ACCESS_COOKIE_LIFETIME_MINUTES")
				.parse::<i64>()
				.unwrap(),
		);

		let sweep_interval = std::time::Duration::from_secs(
			std::env::var("SWEEP_INTERVAL_SECONDS")
				.map(|v| v.parse::<u64>().unwrap())
				.unwrap_or(60),
		);

		Self {
			production,
			database_url,
			redis_url,
			access_cookie_name,
			access_cookie_lifetime,
			sweep_interval,
		}
	}

	/// Create a database pool for the given config
	///
	/// # Panics
	/// Panics if creating the pool fails
	#[must_use]
	pub fn create_database_pool(&self) -> Pool {
		let manager = Manager::new(
			self.database_url.to_string(),
			deadpool_diesel::Runtime::Tokio1,
		);

		Pool::builder(manager).build().unwrap()
	}

	/// Open a multiplexed redis connection for the given config
	///
	/// # Panics
	/// Panics if the redis server is unreachable
	pub async fn create_redis_connection(&self) -> RedisConn {
		let client = redis::Client::open(self.redis_url.as_str()).unwrap();

		client.get_multiplexed_async_connection().await.unwrap()
	}
}
