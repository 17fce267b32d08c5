use chrono::{NaiveDateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

use crate::models::{
	BOOKING_HOLD_MINUTES,
	Facility,
	QUERY_HARD_LIMIT,
	Room,
	RoomStatus,
};
use crate::schema::{booking, facility, room};
use crate::{BookingError, DbConn, Error};

/// The lifecycle state of a booking
///
/// Transitions only ever move forward:
/// `pending` -> `checked_in` -> `completed`, with `cancelled` and `expired`
/// as terminal exits out of `pending`
#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::BookingState"]
#[serde(rename_all = "snake_case")]
pub enum BookingState {
	#[default]
	Pending,
	CheckedIn,
	Completed,
	Cancelled,
	Expired,
}

impl BookingState {
	/// Whether moving from this state to `to` is a legal forward transition
	#[must_use]
	pub(crate) fn can_transition(self, to: Self) -> bool {
		matches!(
			(self, to),
			(Self::Pending, Self::CheckedIn)
				| (Self::Pending, Self::Cancelled)
				| (Self::Pending, Self::Expired)
				| (Self::CheckedIn, Self::Completed)
		)
	}
}

impl std::fmt::Display for BookingState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let repr = match self {
			Self::Pending => "pending",
			Self::CheckedIn => "checked_in",
			Self::Completed => "completed",
			Self::Cancelled => "cancelled",
			Self::Expired => "expired",
		};

		write!(f, "{repr}")
	}
}

/// The payment state of a booking
#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::PaymentState"]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
	#[default]
	Pending,
	Paid,
	Refunded,
}

/// The reason a pending booking is being released
#[derive(Clone, Copy, Debug)]
pub enum ReleaseReason {
	/// The guest cancelled before arriving
	Cancelled,
	/// The hold window lapsed without a check-in
	Expired,
}

impl From<ReleaseReason> for BookingState {
	fn from(value: ReleaseReason) -> Self {
		match value {
			ReleaseReason::Cancelled => Self::Cancelled,
			ReleaseReason::Expired => Self::Expired,
		}
	}
}

/// A single booking row
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = booking)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveBooking {
	pub id:                i32,
	pub profile_id:        i32,
	pub facility_id:       i32,
	/// `None` means a general (whole-facility) booking without a reserved
	/// room
	pub room_id:           Option<i32>,
	pub state:             BookingState,
	pub payment:           PaymentState,
	pub total_price:       i32,
	pub guest_name:        String,
	pub guest_phone:       String,
	pub notes:             Option<String>,
	pub created_at:        NaiveDateTime,
	pub estimated_arrival: NaiveDateTime,
	pub expires_at:        NaiveDateTime,
	pub checked_in_at:     Option<NaiveDateTime>,
	pub checked_out_at:    Option<NaiveDateTime>,
}

/// A booking joined with its facility and reserved room
#[derive(Clone, Debug, Serialize)]
pub struct Booking {
	#[serde(flatten)]
	pub booking:  PrimitiveBooking,
	pub facility: Facility,
	pub room:     Option<Room>,
}

impl From<(PrimitiveBooking, Facility, Option<Room>)> for Booking {
	fn from(
		(booking, facility, room): (PrimitiveBooking, Facility, Option<Room>),
	) -> Self {
		Self { booking, facility, room }
	}
}

impl Booking {
	/// Get a joined [`Booking`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(b_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let booking = conn
			.interact(move |conn| {
				booking::table
					.find(b_id)
					.inner_join(facility::table)
					.left_outer_join(
						room::table
							.on(room::id.nullable().eq(booking::room_id)),
					)
					.select((
						PrimitiveBooking::as_select(),
						Facility::as_select(),
						Option::<Room>::as_select(),
					))
					.get_result::<(PrimitiveBooking, Facility, Option<Room>)>(
						conn,
					)
			})
			.await??;

		Ok(booking.into())
	}

	/// Get the booking history of a profile, newest first
	#[instrument(skip(conn))]
	pub async fn for_profile(
		p_id: i32,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let bookings = conn
			.interact(move |conn| {
				booking::table
					.filter(booking::profile_id.eq(p_id))
					.inner_join(facility::table)
					.left_outer_join(
						room::table
							.on(room::id.nullable().eq(booking::room_id)),
					)
					.select((
						PrimitiveBooking::as_select(),
						Facility::as_select(),
						Option::<Room>::as_select(),
					))
					.order(booking::created_at.desc())
					.limit(QUERY_HARD_LIMIT)
					.get_results::<(PrimitiveBooking, Facility, Option<Room>)>(
						conn,
					)
			})
			.await??;

		Ok(bookings.into_iter().map(Into::into).collect())
	}

	/// Get all bookings of a facility, newest first
	#[instrument(skip(conn))]
	pub async fn for_facility(
		f_id: i32,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let bookings = conn
			.interact(move |conn| {
				booking::table
					.filter(booking::facility_id.eq(f_id))
					.inner_join(facility::table)
					.left_outer_join(
						room::table
							.on(room::id.nullable().eq(booking::room_id)),
					)
					.select((
						PrimitiveBooking::as_select(),
						Facility::as_select(),
						Option::<Room>::as_select(),
					))
					.order(booking::created_at.desc())
					.limit(QUERY_HARD_LIMIT)
					.get_results::<(PrimitiveBooking, Facility, Option<Room>)>(
						conn,
					)
			})
			.await??;

		Ok(bookings.into_iter().map(Into::into).collect())
	}
}

impl PrimitiveBooking {
	/// Get a bare [`PrimitiveBooking`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(b_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let booking = conn
			.interact(move |conn| {
				use self::booking::dsl::*;

				booking.find(b_id).select(Self::as_select()).get_result(conn)
			})
			.await??;

		Ok(booking)
	}

	/// Move a pending booking to `checked_in` and mark its room occupied
	///
	/// The caller must already have verified the scanned facility code
	#[instrument(skip(conn))]
	pub async fn check_in(b_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let booking = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let now = Utc::now().naive_utc();

					let updated = diesel::update(
						booking::table.find(b_id).filter(
							booking::state.eq(BookingState::Pending),
						),
					)
					.set((
						booking::state.eq(BookingState::CheckedIn),
						booking::checked_in_at.eq(now),
					))
					.returning(Self::as_returning())
					.get_result(conn)
					.optional()?;

					let Some(updated) = updated else {
						return Err(Self::transition_error(
							b_id,
							BookingState::CheckedIn,
							conn,
						));
					};

					if let Some(r_id) = updated.room_id {
						diesel::update(room::table.find(r_id))
							.set((
								room::status.eq(RoomStatus::Occupied),
								room::updated_at.eq(now),
							))
							.execute(conn)?;
					}

					Ok(updated)
				})
			})
			.await??;

		info!("booking {b_id} checked in");

		Ok(booking)
	}

	/// Move a checked-in booking to `completed`, settle its payment, and
	/// release its room
	#[instrument(skip(conn))]
	pub async fn complete(b_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let booking = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let now = Utc::now().naive_utc();

					let updated = diesel::update(
						booking::table.find(b_id).filter(
							booking::state.eq(BookingState::CheckedIn),
						),
					)
					.set((
						booking::state.eq(BookingState::Completed),
						booking::payment.eq(PaymentState::Paid),
						booking::checked_out_at.eq(now),
					))
					.returning(Self::as_returning())
					.get_result(conn)
					.optional()?;

					let Some(updated) = updated else {
						return Err(Self::transition_error(
							b_id,
							BookingState::Completed,
							conn,
						));
					};

					if let Some(r_id) = updated.room_id {
						Self::release_room(r_id, now, conn)?;
					}

					Ok(updated)
				})
			})
			.await??;

		info!("booking {b_id} completed");

		Ok(booking)
	}

	/// Release a pending booking and free its room
	///
	/// Checked-in guests are already inside and can only leave through
	/// [`Self::complete`]
	#[instrument(skip(conn))]
	pub async fn release(
		b_id: i32,
		reason: ReleaseReason,
		conn: &DbConn,
	) -> Result<Self, Error> {
		let to: BookingState = reason.into();

		let booking = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let now = Utc::now().naive_utc();

					let updated = diesel::update(
						booking::table.find(b_id).filter(
							booking::state.eq(BookingState::Pending),
						),
					)
					.set(booking::state.eq(to))
					.returning(Self::as_returning())
					.get_result(conn)
					.optional()?;

					let Some(updated) = updated else {
						return Err(Self::transition_error(b_id, to, conn));
					};

					if let Some(r_id) = updated.room_id {
						Self::release_room(r_id, now, conn)?;
					}

					Ok(updated)
				})
			})
			.await??;

		info!("booking {b_id} released ({reason:?})");

		Ok(booking)
	}

	/// Expire every pending booking whose hold window has lapsed and free
	/// the rooms they held
	///
	/// Returns the amount of bookings expired
	#[instrument(skip(conn))]
	pub async fn expire_overdue(conn: &DbConn) -> Result<usize, Error> {
		let expired = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let now = Utc::now().naive_utc();

					let expired: Vec<(i32, Option<i32>)> = diesel::update(
						booking::table
							.filter(booking::state.eq(BookingState::Pending))
							.filter(booking::expires_at.le(now)),
					)
					.set(booking::state.eq(BookingState::Expired))
					.returning((booking::id, booking::room_id))
					.get_results(conn)?;

					let rooms = expired
						.iter()
						.filter_map(|(_, r_id)| *r_id)
						.collect::<Vec<i32>>();

					if !rooms.is_empty() {
						diesel::update(
							room::table.filter(room::id.eq_any(rooms)),
						)
						.set((
							room::status.eq(RoomStatus::Available),
							room::booking_id.eq(None::<i32>),
							room::updated_at.eq(now),
						))
						.execute(conn)?;
					}

					Ok(expired.len())
				})
			})
			.await??;

		Ok(expired)
	}

	/// Build the [`BookingError::InvalidTransition`] for a gated update that
	/// matched no row
	fn transition_error(
		b_id: i32,
		to: BookingState,
		conn: &mut PgConnection,
	) -> Error {
		let current: Result<BookingState, _> = booking::table
			.find(b_id)
			.select(booking::state)
			.get_result(conn);

		match current {
			Ok(from) => BookingError::InvalidTransition { from, to }.into(),
			Err(diesel::result::Error::NotFound) => {
				Error::NotFound(format!("booking {b_id}"))
			},
			Err(e) => e.into(),
		}
	}

	fn release_room(
		r_id: i32,
		now: NaiveDateTime,
		conn: &mut PgConnection,
	) -> Result<(), Error> {
		diesel::update(room::table.find(r_id))
			.set((
				room::status.eq(RoomStatus::Available),
				room::booking_id.eq(None::<i32>),
				room::updated_at.eq(now),
			))
			.execute(conn)?;

		Ok(())
	}
}

/// The data needed to create a new booking
#[derive(Clone, Debug, Deserialize)]
pub struct NewBooking {
	pub profile_id:        i32,
	pub facility_id:       i32,
	/// `None` requests a general booking, only legal while the facility has
	/// no available rooms to pick from
	pub room_id:           Option<i32>,
	pub guest_name:        String,
	pub guest_phone:       String,
	pub notes:             Option<String>,
	/// Minutes until the guest expects to arrive
	pub estimated_minutes: i32,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = booking)]
struct InsertableBooking {
	profile_id:        i32,
	facility_id:       i32,
	room_id:           Option<i32>,
	total_price:       i32,
	guest_name:        String,
	guest_phone:       String,
	notes:             Option<String>,
	created_at:        NaiveDateTime,
	estimated_arrival: NaiveDateTime,
	expires_at:        NaiveDateTime,
}

impl NewBooking {
	/// Atomically claim the selected room and insert this [`NewBooking`]
	///
	/// The room claim is a compare-and-swap on `status = 'available'`, so
	/// two guests racing for the same room cannot both win
	#[instrument(skip(self, conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<PrimitiveBooking, Error> {
		let booking = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let now = Utc::now().naive_utc();

					let facility: Facility = facility::table
						.find(self.facility_id)
						.filter(
							facility::status
								.eq(crate::models::FacilityStatus::Approved),
						)
						.select(Facility::as_select())
						.get_result(conn)
						.optional()?
						.ok_or_else(|| {
							Error::NotFound(format!(
								"facility {}",
								self.facility_id
							))
						})?;

					let total_price = match self.room_id {
						Some(r_id) => {
							let claimed: Room = room::table
								.find(r_id)
								.select(Room::as_select())
								.get_result(conn)
								.optional()?
								.ok_or_else(|| {
									Error::NotFound(format!("room {r_id}"))
								})?;

							if claimed.facility_id != facility.id {
								return Err(
									BookingError::RoomFacilityMismatch.into(),
								);
							}

							let won = diesel::update(
								room::table.find(r_id).filter(
									room::status.eq(RoomStatus::Available),
								),
							)
							.set((
								room::status.eq(RoomStatus::Booked),
								room::updated_at.eq(now),
							))
							.execute(conn)?;

							if won == 0 {
								return Err(
									BookingError::RoomUnavailable.into(),
								);
							}

							claimed.price
						},
						None => {
							let available: i64 = room::table
								.filter(room::facility_id.eq(facility.id))
								.filter(
									room::status.eq(RoomStatus::Available),
								)
								.count()
								.get_result(conn)?;

							if available > 0 {
								return Err(
									BookingError::MissingRoomSelection.into(),
								);
							}

							facility.base_price
						},
					};

					// One timestamp anchors creation, the arrival estimate,
					// and the hold deadline
					let insertable = InsertableBooking {
						profile_id: self.profile_id,
						facility_id: self.facility_id,
						room_id: self.room_id,
						total_price,
						guest_name: self.guest_name,
						guest_phone: self.guest_phone,
						notes: self.notes,
						created_at: now,
						estimated_arrival: now
							+ chrono::Duration::minutes(
								self.estimated_minutes.into(),
							),
						expires_at: now
							+ chrono::Duration::minutes(BOOKING_HOLD_MINUTES),
					};

					let booking: PrimitiveBooking =
						diesel::insert_into(booking::table)
							.values(insertable)
							.returning(PrimitiveBooking::as_returning())
							.get_result(conn)?;

					if let Some(r_id) = booking.room_id {
						diesel::update(room::table.find(r_id))
							.set(room::booking_id.eq(booking.id))
							.execute(conn)?;
					}

					Ok(booking)
				})
			})
			.await??;

		info!(
			"created booking {} for facility {}",
			booking.id, booking.facility_id
		);

		Ok(booking)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn forward_transitions_are_legal() {
		assert!(BookingState::Pending.can_transition(BookingState::CheckedIn));
		assert!(BookingState::Pending.can_transition(BookingState::Cancelled));
		assert!(BookingState::Pending.can_transition(BookingState::Expired));
		assert!(
			BookingState::CheckedIn.can_transition(BookingState::Completed)
		);
	}

	#[test]
	fn backward_and_terminal_transitions_are_illegal() {
		assert!(
			!BookingState::CheckedIn.can_transition(BookingState::Pending)
		);
		assert!(
			!BookingState::CheckedIn.can_transition(BookingState::Cancelled)
		);
		assert!(
			!BookingState::CheckedIn.can_transition(BookingState::Expired)
		);
		assert!(
			!BookingState::Completed.can_transition(BookingState::CheckedIn)
		);
		assert!(
			!BookingState::Cancelled.can_transition(BookingState::Pending)
		);
		assert!(
			!BookingState::Expired.can_transition(BookingState::CheckedIn)
		);
		assert!(
			!BookingState::Pending.can_transition(BookingState::Completed)
		);
	}
}
