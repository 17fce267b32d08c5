#[macro_use]
extern crate tracing;

use axum_extra::extract::cookie::Key;
use badmap::routes::get_app_router;
use badmap::sweep::run_expiry_sweep;
use badmap::{AppState, Config, seed_database};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::signal::unix::SignalKind;
use tracing::Level;

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.pretty()
		.with_thread_names(true)
		.with_max_level(Level::DEBUG)
		.init();

	// Set up the configuration.
	let config = Config::from_env();

	// Set up the database connection pool.
	let database_pool = config.create_database_pool();

	// Set up the redis session cache.
	let redis_connection = config.create_redis_connection().await;

	let cookie_jar_key = match std::env::var("COOKIE_JAR_SECRET") {
		Ok(secret) => Key::derive_from(secret.as_bytes()),
		Err(_) => Key::generate(),
	};

	if !config.production {
		seed_database(&database_pool).await;
	}

	let state = AppState {
		config: config.clone(),
		database_pool: database_pool.clone(),
		redis_connection,
		cookie_jar_key,
	};

	tokio::spawn(run_expiry_sweep(database_pool, config.sweep_interval));

	let app = get_app_router(state);

	let listener = TcpListener::bind("0.0.0.0:80").await.unwrap();
	debug!("listening on {}", listener.local_addr().unwrap());
	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_handler())
		.await
		.unwrap();
}

async fn shutdown_handler() {
	let ctrl_c = async {
		signal::ctrl_c().await.expect("COULD NOT INSTALL CTRL+C HANDLER");
	};

	let terminate = async {
		signal::unix::signal(SignalKind::terminate())
			.expect("COULD NOT INSTALL TERMINATE SIGNAL HANDLER")
			.recv()
			.await;
	};

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}
}
