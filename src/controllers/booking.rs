//! Controllers for the booking lifecycle

use axum::Json;
use axum::extract::{Path, State};
use validator::Validate;

use crate::models::{
	Booking,
	Facility,
	PrimitiveBooking,
	ReleaseReason,
};
use crate::qr::CheckInCode;
use crate::schemas::booking::{CheckInRequest, CreateBookingRequest};
use crate::session::Session;
use crate::{BookingError, DbConn, DbPool, Error};

/// Get a booking and check that it belongs to the current session
async fn owned_booking(
	b_id: i32,
	session: &Session,
	conn: &DbConn,
) -> Result<PrimitiveBooking, Error> {
	let booking = PrimitiveBooking::get_by_id(b_id, conn).await?;

	if booking.profile_id != session.data.profile_id {
		return Err(Error::Forbidden);
	}

	Ok(booking)
}

/// Get a booking and check that the current session may act on it: either
/// the guest who made it, or the provider of the booked facility
async fn accessible_booking(
	b_id: i32,
	session: &Session,
	conn: &DbConn,
) -> Result<PrimitiveBooking, Error> {
	let booking = PrimitiveBooking::get_by_id(b_id, conn).await?;

	if booking.profile_id == session.data.profile_id {
		return Ok(booking);
	}

	let facility = Facility::get_by_id(booking.facility_id, conn).await?;

	if facility.created_by != session.data.profile_id {
		return Err(Error::Forbidden);
	}

	Ok(booking)
}

/// Create a new booking, claiming the selected room
#[instrument(skip(pool, request))]
pub(crate) async fn create_booking(
	session: Session,
	State(pool): State<DbPool>,
	Json(request): Json<CreateBookingRequest>,
) -> Result<Json<Booking>, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let booking = request
		.into_new_booking(session.data.profile_id)
		.insert(&conn)
		.await?;

	let booking = Booking::get_by_id(booking.id, &conn).await?;

	Ok(Json(booking))
}

/// Get the booking history of the current profile, newest first
#[instrument(skip(pool))]
pub(crate) async fn get_my_bookings(
	session: Session,
	State(pool): State<DbPool>,
) -> Result<Json<Vec<Booking>>, Error> {
	let conn = pool.get().await?;
	let bookings = Booking::for_profile(session.data.profile_id, &conn).await?;

	Ok(Json(bookings))
}

/// Get a single booking, visible to its guest and to the booked facility's
/// provider
#[instrument(skip(pool))]
pub(crate) async fn get_booking(
	session: Session,
	State(pool): State<DbPool>,
	Path(b_id): Path<i32>,
) -> Result<Json<Booking>, Error> {
	let conn = pool.get().await?;

	accessible_booking(b_id, &session, &conn).await?;

	let booking = Booking::get_by_id(b_id, &conn).await?;

	Ok(Json(booking))
}

/// Check into a pending booking by scanning the facility's QR code
///
/// The scanned payload must parse, claim the booked facility, and carry a
/// valid signature under that facility's secret
#[instrument(skip(pool, request))]
pub(crate) async fn check_in_booking(
	session: Session,
	State(pool): State<DbPool>,
	Path(b_id): Path<i32>,
	Json(request): Json<CheckInRequest>,
) -> Result<Json<Booking>, Error> {
	let conn = pool.get().await?;

	let booking = owned_booking(b_id, &session, &conn).await?;
	let facility = Facility::get_by_id(booking.facility_id, &conn).await?;

	let code = CheckInCode::parse(&request.code)?;

	if code.facility_id() != facility.id {
		warn!(
			"booking {b_id} scanned code for facility {} instead of {}",
			code.facility_id(),
			facility.id
		);

		return Err(
			BookingError::CodeMismatch { expected: facility.name }.into()
		);
	}

	code.verify(&facility.code_secret)?;

	PrimitiveBooking::check_in(b_id, &conn).await?;

	let booking = Booking::get_by_id(b_id, &conn).await?;

	Ok(Json(booking))
}

/// Check out of a checked-in booking, settling its payment and releasing
/// its room
///
/// Available to the guest and to the facility's provider at the counter
#[instrument(skip(pool))]
pub(crate) async fn complete_booking(
	session: Session,
	State(pool): State<DbPool>,
	Path(b_id): Path<i32>,
) -> Result<Json<Booking>, Error> {
	let conn = pool.get().await?;

	accessible_booking(b_id, &session, &conn).await?;

	PrimitiveBooking::complete(b_id, &conn).await?;

	let booking = Booking::get_by_id(b_id, &conn).await?;

	Ok(Json(booking))
}

/// Cancel a pending booking, releasing its room
///
/// Available to the guest and to the facility's provider
#[instrument(skip(pool))]
pub(crate) async fn cancel_booking(
	session: Session,
	State(pool): State<DbPool>,
	Path(b_id): Path<i32>,
) -> Result<Json<Booking>, Error> {
	let conn = pool.get().await?;

	accessible_booking(b_id, &session, &conn).await?;

	PrimitiveBooking::release(b_id, ReleaseReason::Cancelled, &conn).await?;

	let booking = Booking::get_by_id(b_id, &conn).await?;

	Ok(Json(booking))
}
