//! Controllers for facilities and their moderation

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::NoContent;
use validator::Validate;

use crate::models::{
	Booking,
	Facility,
	FacilityFilter,
	ProfileRole,
	UpdateFacility,
};
use crate::qr::CheckInCode;
use crate::schemas::facility::{
	CheckInCodeResponse,
	CreateFacilityRequest,
	FacilitySearchResult,
	RejectFacilityRequest,
};
use crate::schemas::pagination::{PaginationOptions, PaginationResponse};
use crate::session::{AdminSession, ProviderSession};
use crate::{DbPool, Error};

/// Check that a provider session may manage the given facility
///
/// Admins may manage any facility
fn assert_manages(
	facility: &Facility,
	session: &ProviderSession,
) -> Result<(), Error> {
	if session.data.role != ProfileRole::Admin
		&& facility.created_by != session.data.profile_id
	{
		return Err(Error::Forbidden);
	}

	Ok(())
}

/// Search the approved facility catalog
#[instrument(skip(pool))]
pub(crate) async fn search_facilities(
	State(pool): State<DbPool>,
	Query(f_filter): Query<FacilityFilter>,
	Query(p_opts): Query<PaginationOptions>,
) -> Result<Json<PaginationResponse<Vec<FacilitySearchResult>>>, Error> {
	let conn = pool.get().await?;
	let (total, hits) = Facility::search(f_filter, p_opts, &conn).await?;

	p_opts.check_bounds(total)?;

	let hits = hits
		.into_iter()
		.map(|(facility, meters)| FacilitySearchResult::new(facility, meters))
		.collect();

	Ok(Json(p_opts.paginate(total, hits)))
}

/// Get a single approved facility
#[instrument(skip(pool))]
pub(crate) async fn get_facility(
	State(pool): State<DbPool>,
	Path(f_id): Path<i32>,
) -> Result<Json<Facility>, Error> {
	let conn = pool.get().await?;
	let facility = Facility::get_approved_by_id(f_id, &conn).await?;

	Ok(Json(facility))
}

/// Register a new facility, to be approved by an admin before it becomes
/// visible
#[instrument(skip(pool, request))]
pub(crate) async fn create_facility(
	session: ProviderSession,
	State(pool): State<DbPool>,
	Json(request): Json<CreateFacilityRequest>,
) -> Result<Json<Facility>, Error> {
	request.validate()?;

	let conn = pool.get().await?;
	let facility = request
		.into_new_facility(session.data.profile_id)
		.insert(&conn)
		.await?;

	Ok(Json(facility))
}

/// Update an owned facility
#[instrument(skip(pool, update))]
pub(crate) async fn update_facility(
	session: ProviderSession,
	State(pool): State<DbPool>,
	Path(f_id): Path<i32>,
	Json(update): Json<UpdateFacility>,
) -> Result<Json<Facility>, Error> {
	let conn = pool.get().await?;

	let facility = Facility::get_by_id(f_id, &conn).await?;
	assert_manages(&facility, &session)?;

	let facility = update.apply_to(f_id, &conn).await?;

	Ok(Json(facility))
}

/// Delete an owned facility and its rooms
#[instrument(skip(pool))]
pub(crate) async fn delete_facility(
	session: ProviderSession,
	State(pool): State<DbPool>,
	Path(f_id): Path<i32>,
) -> Result<NoContent, Error> {
	let conn = pool.get().await?;

	let facility = Facility::get_by_id(f_id, &conn).await?;
	assert_manages(&facility, &session)?;

	Facility::delete_by_id(f_id, &conn).await?;

	Ok(NoContent)
}

/// Get all facilities owned by the current provider, whatever their
/// moderation status
#[instrument(skip(pool))]
pub(crate) async fn get_my_facilities(
	session: ProviderSession,
	State(pool): State<DbPool>,
) -> Result<Json<Vec<Facility>>, Error> {
	let conn = pool.get().await?;
	let facilities =
		Facility::for_provider(session.data.profile_id, &conn).await?;

	Ok(Json(facilities))
}

/// Get the signed check-in code payload of an owned facility
#[instrument(skip(pool))]
pub(crate) async fn get_facility_code(
	session: ProviderSession,
	State(pool): State<DbPool>,
	Path(f_id): Path<i32>,
) -> Result<Json<CheckInCodeResponse>, Error> {
	let conn = pool.get().await?;

	let facility = Facility::get_by_id(f_id, &conn).await?;
	assert_manages(&facility, &session)?;

	let payload = CheckInCode::issue(facility.id, &facility.code_secret);

	Ok(Json(CheckInCodeResponse { payload }))
}

/// Get the bookings of an owned facility, newest first
#[instrument(skip(pool))]
pub(crate) async fn get_facility_bookings(
	session: ProviderSession,
	State(pool): State<DbPool>,
	Path(f_id): Path<i32>,
) -> Result<Json<Vec<Booking>>, Error> {
	let conn = pool.get().await?;

	let facility = Facility::get_by_id(f_id, &conn).await?;
	assert_manages(&facility, &session)?;

	let bookings = Booking::for_facility(f_id, &conn).await?;

	Ok(Json(bookings))
}

/// Get the moderation queue of pending facilities
#[instrument(skip(pool))]
pub(crate) async fn get_pending_facilities(
	_session: AdminSession,
	State(pool): State<DbPool>,
) -> Result<Json<Vec<Facility>>, Error> {
	let conn = pool.get().await?;
	let facilities = Facility::get_pending(&conn).await?;

	Ok(Json(facilities))
}

/// Approve a pending facility
#[instrument(skip(pool))]
pub(crate) async fn approve_facility(
	_session: AdminSession,
	State(pool): State<DbPool>,
	Path(f_id): Path<i32>,
) -> Result<Json<Facility>, Error> {
	let conn = pool.get().await?;
	let facility = Facility::approve_by_id(f_id, &conn).await?;

	info!("approved facility {f_id}");

	Ok(Json(facility))
}

/// Reject a pending facility with a reason for its provider
#[instrument(skip(pool, request))]
pub(crate) async fn reject_facility(
	_session: AdminSession,
	State(pool): State<DbPool>,
	Path(f_id): Path<i32>,
	Json(request): Json<RejectFacilityRequest>,
) -> Result<Json<Facility>, Error> {
	request.validate()?;

	let conn = pool.get().await?;
	let facility = Facility::reject_by_id(f_id, request.reason, &conn).await?;

	info!("rejected facility {f_id}");

	Ok(Json(facility))
}
