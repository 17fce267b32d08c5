//! Controllers for profiles

use axum::Json;
use axum::extract::State;

use crate::models::Profile;
use crate::session::Session;
use crate::{DbPool, Error};

/// Get the profile of the currently authenticated user
#[instrument(skip(pool))]
pub(crate) async fn get_current_profile(
	session: Session,
	State(pool): State<DbPool>,
) -> Result<Json<Profile>, Error> {
	let conn = pool.get().await?;
	let profile = Profile::get(session.data.profile_id, &conn).await?;

	Ok(Json(profile))
}
