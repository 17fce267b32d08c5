//! Background sweep that expires overdue pending bookings

use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::DbPool;
use crate::models::PrimitiveBooking;

/// Periodically expire every pending booking whose hold window has lapsed
/// and release the rooms they held
///
/// Runs until the process shuts down; a failed pass is logged and retried on
/// the next tick
pub async fn run_expiry_sweep(pool: DbPool, interval: Duration) {
	let mut ticker = tokio::time::interval(interval);
	ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

	info!("starting booking expiry sweep every {interval:?}");

	loop {
		ticker.tick().await;

		let conn = match pool.get().await {
			Ok(conn) => conn,
			Err(e) => {
				error!("expiry sweep could not get a connection -- {e:?}");
				continue;
			},
		};

		match PrimitiveBooking::expire_overdue(&conn).await {
			Ok(0) => {},
			Ok(expired) => info!("expired {expired} overdue bookings"),
			Err(e) => error!("expiry sweep failed -- {e:?}"),
		}
	}
}
