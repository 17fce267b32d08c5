use chrono::{NaiveDateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

use crate::schema::room;
use crate::{BookingError, DbConn, Error};

/// The occupancy state of a room
#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::RoomStatus"]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
	#[default]
	Available,
	Booked,
	Occupied,
	Maintenance,
}

/// The intended party size of a room
#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::RoomCategory"]
#[serde(rename_all = "snake_case")]
pub enum RoomCategory {
	#[default]
	Single,
	Couple,
	Family,
}

/// A single bookable room within a facility
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = room)]
#[diesel(check_for_backend(Pg))]
pub struct Room {
	pub id:          i32,
	pub facility_id: i32,
	pub label:       String,
	pub category:    RoomCategory,
	pub status:      RoomStatus,
	pub price:       i32,
	pub amenities:   Vec<String>,
	/// The booking currently holding this room, if any
	pub booking_id:  Option<i32>,
	pub created_at:  NaiveDateTime,
	pub updated_at:  NaiveDateTime,
}

impl Room {
	/// Get a [`Room`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(r_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let room = conn
			.interact(move |conn| {
				use self::room::dsl::*;

				room.find(r_id).select(Self::as_select()).get_result(conn)
			})
			.await??;

		Ok(room)
	}

	/// Get all [`Room`]s of a given facility
	#[instrument(skip(conn))]
	pub async fn for_facility(
		f_id: i32,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let rooms = conn
			.interact(move |conn| {
				use self::room::dsl::*;

				room.filter(facility_id.eq(f_id))
					.select(Self::as_select())
					.order(label)
					.get_results(conn)
			})
			.await??;

		Ok(rooms)
	}

	/// Get all currently available [`Room`]s of a given facility
	#[instrument(skip(conn))]
	pub async fn available_for_facility(
		f_id: i32,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let rooms = conn
			.interact(move |conn| {
				use self::room::dsl::*;

				room.filter(facility_id.eq(f_id))
					.filter(status.eq(RoomStatus::Available))
					.select(Self::as_select())
					.order(label)
					.get_results(conn)
			})
			.await??;

		Ok(rooms)
	}

	/// Toggle a [`Room`] between `available` and `maintenance`
	///
	/// Rooms holding a live booking cannot be taken out of service; the
	/// booking lifecycle owns the `booked` and `occupied` states
	#[instrument(skip(conn))]
	pub async fn set_maintenance(
		r_id: i32,
		maintenance: bool,
		conn: &DbConn,
	) -> Result<Self, Error> {
		let (from, to) = if maintenance {
			(RoomStatus::Available, RoomStatus::Maintenance)
		} else {
			(RoomStatus::Maintenance, RoomStatus::Available)
		};

		let room = conn
			.interact(move |conn| {
				use self::room::dsl::*;

				diesel::update(room.find(r_id).filter(status.eq(from)))
					.set((
						status.eq(to),
						updated_at.eq(Utc::now().naive_utc()),
					))
					.returning(Self::as_returning())
					.get_result(conn)
					.optional()
			})
			.await??;

		room.ok_or_else(|| BookingError::RoomInUse.into())
	}

	/// Delete a [`Room`]
	///
	/// Refused while the room holds a live booking
	#[instrument(skip(conn))]
	pub async fn delete_by_id(r_id: i32, conn: &DbConn) -> Result<(), Error> {
		conn.interact(move |conn| {
			use self::room::dsl::*;

			conn.transaction::<_, Error, _>(|conn| {
				let deleted = diesel::delete(
					room.find(r_id).filter(status.eq_any([
						RoomStatus::Available,
						RoomStatus::Maintenance,
					])),
				)
				.execute(conn)?;

				if deleted == 1 {
					return Ok(());
				}

				let exists: i64 =
					room.find(r_id).count().get_result(conn)?;

				if exists > 0 {
					Err(BookingError::RoomInUse.into())
				} else {
					Err(Error::NotFound(format!("room {r_id}")))
				}
			})
		})
		.await??;

		info!("deleted room {r_id}");

		Ok(())
	}
}

/// The data needed to add a new room to a facility
#[derive(Clone, Debug, Deserialize, Insertable)]
#[diesel(table_name = room)]
pub struct NewRoom {
	pub facility_id: i32,
	pub label:       String,
	pub category:    RoomCategory,
	pub price:       i32,
	pub amenities:   Vec<String>,
}

impl NewRoom {
	/// Insert this [`NewRoom`] with status `available`
	#[instrument(skip(self, conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Room, Error> {
		let room = conn
			.interact(|conn| {
				use self::room::dsl::*;

				diesel::insert_into(room)
					.values(self)
					.returning(Room::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("created room {} ({})", room.id, room.label);

		Ok(room)
	}
}

/// A partial update to an existing room
#[derive(AsChangeset, Clone, Debug, Deserialize)]
#[diesel(table_name = room)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoom {
	pub label:     Option<String>,
	pub category:  Option<RoomCategory>,
	pub price:     Option<i32>,
	pub amenities: Option<Vec<String>>,
}

impl UpdateRoom {
	/// Apply this update to the [`Room`] with the given id
	#[instrument(skip(self, conn))]
	pub async fn apply_to(
		self,
		r_id: i32,
		conn: &DbConn,
	) -> Result<Room, Error> {
		let room = conn
			.interact(move |conn| {
				use self::room::dsl::*;

				diesel::update(room.find(r_id))
					.set((self, updated_at.eq(Utc::now().naive_utc())))
					.returning(Room::as_returning())
					.get_result(conn)
			})
			.await??;

		Ok(room)
	}
}
