//! Controllers for authorization

use axum::extract::State;
use axum::response::NoContent;
use axum::Json;
use axum_extra::extract::PrivateCookieJar;
use validator::Validate;

use crate::models::{NewProfile, Profile};
use crate::schemas::auth::{LoginRequest, RegisterRequest};
use crate::session::Session;
use crate::{Config, DbPool, Error, RedisConn};

/// Register a new profile
///
/// Every registration gets the `user` role; provider and admin profiles are
/// provisioned out of band
#[instrument(skip(pool, register_data))]
pub(crate) async fn register_profile(
	State(pool): State<DbPool>,
	Json(register_data): Json<RegisterRequest>,
) -> Result<Json<Profile>, Error> {
	register_data.validate()?;

	let new_profile = NewProfile {
		username:     register_data.username,
		password:     register_data.password,
		email:        register_data.email,
		phone:        register_data.phone,
		display_name: register_data.display_name,
	};

	let conn = pool.get().await?;
	let profile = new_profile.insert(&conn).await?;

	Ok(Json(profile))
}

/// Log in with a username and password and start a session
#[instrument(skip(pool, config, r_conn, jar, login_data))]
pub(crate) async fn login_profile(
	State(pool): State<DbPool>,
	State(config): State<Config>,
	State(mut r_conn): State<RedisConn>,
	jar: PrivateCookieJar,
	Json(login_data): Json<LoginRequest>,
) -> Result<(PrivateCookieJar, Json<Profile>), Error> {
	let conn = pool.get().await?;
	let profile = Profile::get_by_username(login_data.username, &conn).await?;

	profile.verify_password(&login_data.password)?;

	let session = Session::create(
		config.access_cookie_lifetime,
		&profile,
		&mut r_conn,
	)
	.await?;

	let access_token_cookie = session.to_access_token_cookie(
		config.access_cookie_name,
		config.access_cookie_lifetime,
		config.production,
	);

	let jar = jar.add(access_token_cookie);

	info!("logged in profile {}", profile.id);

	Ok((jar, Json(profile)))
}

/// Log out and destroy the current session
#[instrument(skip(config, r_conn, jar))]
pub(crate) async fn logout_profile(
	session: Session,
	State(config): State<Config>,
	State(mut r_conn): State<RedisConn>,
	jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, NoContent), Error> {
	Session::delete(session.id, &mut r_conn).await?;

	let jar = jar.remove(config.access_cookie_name);

	info!("logged out profile {}", session.data.profile_id);

	Ok((jar, NoContent))
}
