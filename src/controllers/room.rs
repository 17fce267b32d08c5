//! Controllers for rooms

use axum::Json;
use axum::extract::{Path, State};
use axum::response::NoContent;
use validator::Validate;

use crate::models::{Facility, ProfileRole, Room, UpdateRoom};
use crate::schemas::room::{CreateRoomRequest, SetMaintenanceRequest};
use crate::session::ProviderSession;
use crate::{DbConn, DbPool, Error};

/// Check that a provider session may manage the facility owning the given
/// room, and return that room
async fn managed_room(
	r_id: i32,
	session: &ProviderSession,
	conn: &DbConn,
) -> Result<Room, Error> {
	let room = Room::get_by_id(r_id, conn).await?;
	let facility = Facility::get_by_id(room.facility_id, conn).await?;

	if session.data.role != ProfileRole::Admin
		&& facility.created_by != session.data.profile_id
	{
		return Err(Error::Forbidden);
	}

	Ok(room)
}

/// Get the available rooms of an approved facility
#[instrument(skip(pool))]
pub(crate) async fn get_available_rooms(
	State(pool): State<DbPool>,
	Path(f_id): Path<i32>,
) -> Result<Json<Vec<Room>>, Error> {
	let conn = pool.get().await?;

	let facility = Facility::get_approved_by_id(f_id, &conn).await?;
	let rooms = Room::available_for_facility(facility.id, &conn).await?;

	Ok(Json(rooms))
}

/// Get all rooms of an owned facility, whatever their status
#[instrument(skip(pool))]
pub(crate) async fn get_facility_rooms(
	session: ProviderSession,
	State(pool): State<DbPool>,
	Path(f_id): Path<i32>,
) -> Result<Json<Vec<Room>>, Error> {
	let conn = pool.get().await?;

	let facility = Facility::get_by_id(f_id, &conn).await?;

	if session.data.role != ProfileRole::Admin
		&& facility.created_by != session.data.profile_id
	{
		return Err(Error::Forbidden);
	}

	let rooms = Room::for_facility(f_id, &conn).await?;

	Ok(Json(rooms))
}

/// Add a room to an owned facility
#[instrument(skip(pool, request))]
pub(crate) async fn create_room(
	session: ProviderSession,
	State(pool): State<DbPool>,
	Path(f_id): Path<i32>,
	Json(request): Json<CreateRoomRequest>,
) -> Result<Json<Room>, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let facility = Facility::get_by_id(f_id, &conn).await?;

	if session.data.role != ProfileRole::Admin
		&& facility.created_by != session.data.profile_id
	{
		return Err(Error::Forbidden);
	}

	let room = request.into_new_room(f_id).insert(&conn).await?;

	Ok(Json(room))
}

/// Update a room of an owned facility
#[instrument(skip(pool, update))]
pub(crate) async fn update_room(
	session: ProviderSession,
	State(pool): State<DbPool>,
	Path(r_id): Path<i32>,
	Json(update): Json<UpdateRoom>,
) -> Result<Json<Room>, Error> {
	let conn = pool.get().await?;

	managed_room(r_id, &session, &conn).await?;

	let room = update.apply_to(r_id, &conn).await?;

	Ok(Json(room))
}

/// Toggle a room between `available` and `maintenance`
#[instrument(skip(pool))]
pub(crate) async fn set_room_maintenance(
	session: ProviderSession,
	State(pool): State<DbPool>,
	Path(r_id): Path<i32>,
	Json(request): Json<SetMaintenanceRequest>,
) -> Result<Json<Room>, Error> {
	let conn = pool.get().await?;

	managed_room(r_id, &session, &conn).await?;

	let room =
		Room::set_maintenance(r_id, request.maintenance, &conn).await?;

	Ok(Json(room))
}

/// Delete a room of an owned facility
#[instrument(skip(pool))]
pub(crate) async fn delete_room(
	session: ProviderSession,
	State(pool): State<DbPool>,
	Path(r_id): Path<i32>,
) -> Result<NoContent, Error> {
	let conn = pool.get().await?;

	managed_room(r_id, &session, &conn).await?;

	Room::delete_by_id(r_id, &conn).await?;

	Ok(NoContent)
}
