use chrono::{NaiveDateTime, Utc};
use diesel::dsl::sql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Double};
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::RoomStatus;
use crate::schema::{facility, room};
use crate::schemas::pagination::PaginationOptions;
use crate::{BookingError, DbConn, Error};

/// A boxed dynamic filter condition over the facility table
type BoxedCondition<T = Bool> =
	Box<dyn BoxableExpression<facility::table, Pg, SqlType = T>>;

trait ToFilter {
	fn to_filter(&self) -> BoxedCondition;
}

/// The moderation state of a facility
#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::FacilityStatus"]
#[serde(rename_all = "snake_case")]
pub enum FacilityStatus {
	#[default]
	Pending,
	Approved,
	Rejected,
}

/// A single bathing facility
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = facility)]
#[diesel(check_for_backend(Pg))]
pub struct Facility {
	pub id:               i32,
	pub name:             String,
	pub street:           String,
	pub number:           String,
	pub zip:              String,
	pub city:             String,
	pub latitude:         f64,
	pub longitude:        f64,
	pub base_price:       i32,
	pub amenities:        Vec<String>,
	pub status:           FacilityStatus,
	/// Why an admin rejected this facility, shown to its provider
	pub rejection_reason: Option<String>,
	pub rating_average:   f64,
	pub rating_count:     i32,
	#[serde(skip)]
	pub code_secret:      Uuid,
	pub created_by:       i32,
	pub created_at:       NaiveDateTime,
	pub updated_at:       NaiveDateTime,
}

/// Composable search filter over the approved facility catalog
///
/// The distance filter only applies when all three of `center_lat`,
/// `center_lng`, and `radius_km` are given
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityFilter {
	/// Case-insensitive substring match on name or city
	pub query:      Option<String>,
	pub center_lat: Option<f64>,
	pub center_lng: Option<f64>,
	pub radius_km:  Option<f64>,
	pub max_price:  Option<i32>,
	pub min_rating: Option<f64>,
	/// Comma-separated list of required amenity tags
	pub amenities:  Option<String>,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct DistanceFilter {
	center_lat: f64,
	center_lng: f64,
	radius_km:  f64,
}

impl FacilityFilter {
	pub(crate) fn distance(&self) -> Option<DistanceFilter> {
		match (self.center_lat, self.center_lng, self.radius_km) {
			(Some(center_lat), Some(center_lng), Some(radius_km)) => {
				Some(DistanceFilter { center_lat, center_lng, radius_km })
			},
			_ => None,
		}
	}
}

impl ToFilter for FacilityFilter {
	fn to_filter(&self) -> BoxedCondition {
		// Only approved facilities are ever visible to discovery
		let mut filter: BoxedCondition =
			Box::new(facility::status.eq(FacilityStatus::Approved));

		if let Some(query) = &self.query {
			let pattern = format!("%{query}%");

			filter = Box::new(
				filter.and(
					facility::name
						.ilike(pattern.clone())
						.or(facility::city.ilike(pattern)),
				),
			);
		}

		if let Some(dist) = self.distance() {
			filter =
				Box::new(filter.and(dist.distance_sql().le(dist.radius_km)));
		}

		if let Some(max_price) = self.max_price {
			filter = Box::new(filter.and(facility::base_price.le(max_price)));
		}

		if let Some(min_rating) = self.min_rating {
			filter =
				Box::new(filter.and(facility::rating_average.ge(min_rating)));
		}

		if let Some(amenities) = &self.amenities {
			let tags = amenities
				.split(',')
				.map(|t| t.trim().to_string())
				.filter(|t| !t.is_empty())
				.collect::<Vec<String>>();

			filter = Box::new(filter.and(facility::amenities.contains(tags)));
		}

		filter
	}
}

impl DistanceFilter {
	/// Great-circle (haversine) distance in kilometers between the filter
	/// center and a facility row
	fn distance_sql(self) -> BoxedCondition<Double> {
		Box::new(
			sql::<Double>("2 * 6371 * asin(sqrt(((1 - cos(radians( ")
				.bind::<Double, _>(self.center_lat)
				.sql(
					" ) - radians( latitude ))) + cos(radians( latitude )) * \
					 cos(radians( ",
				)
				.bind::<Double, _>(self.center_lat)
				.sql(" )) * (1 - cos(radians( ")
				.bind::<Double, _>(self.center_lng)
				.sql(" ) - radians( longitude )))) / 2))"),
		)
	}
}

/// Format a distance in meters for display: whole meters below one
/// kilometer, one-decimal kilometers above
#[must_use]
pub fn format_distance(meters: f64) -> String {
	if meters < 1000.0 {
		format!("{} m", meters.round() as i64)
	} else {
		format!("{:.1} km", meters / 1000.0)
	}
}

impl Facility {
	/// Get a [`Facility`] given its id, regardless of moderation status
	#[instrument(skip(conn))]
	pub async fn get_by_id(f_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let facility = conn
			.interact(move |conn| {
				use self::facility::dsl::*;

				facility.find(f_id).select(Self::as_select()).get_result(conn)
			})
			.await??;

		Ok(facility)
	}

	/// Get an approved [`Facility`] given its id
	///
	/// Pending and rejected facilities are invisible to discovery
	#[instrument(skip(conn))]
	pub async fn get_approved_by_id(
		f_id: i32,
		conn: &DbConn,
	) -> Result<Self, Error> {
		let facility = conn
			.interact(move |conn| {
				use self::facility::dsl::*;

				facility
					.find(f_id)
					.filter(status.eq(FacilityStatus::Approved))
					.select(Self::as_select())
					.get_result(conn)
					.optional()
			})
			.await??;

		facility
			.ok_or_else(|| Error::NotFound(format!("facility {f_id}")))
	}

	/// Search through all approved [`Facility`]s with a given
	/// [`FacilityFilter`]
	///
	/// When a distance filter is present results are ordered by proximity to
	/// its center and each hit carries its distance in meters, otherwise
	/// results are ordered by id
	#[instrument(skip(conn))]
	pub async fn search(
		f_filter: FacilityFilter,
		p_opts: PaginationOptions,
		conn: &DbConn,
	) -> Result<(i64, Vec<(Self, Option<f64>)>), Error> {
		let filter = f_filter.to_filter();

		let total: i64 = conn
			.interact(|conn| {
				use diesel::dsl::count_star;

				facility::table.filter(filter).select(count_star()).first(conn)
			})
			.await??;

		let filter = f_filter.to_filter();
		let center = f_filter.distance();

		let facilities = conn
			.interact(move |conn| {
				match center {
					Some(center) => facility::table
						.filter(filter)
						.select((Self::as_select(), center.distance_sql()))
						.order(center.distance_sql().asc())
						.limit(p_opts.limit())
						.offset(p_opts.offset())
						.get_results::<(Self, f64)>(conn)
						.map(|rows| {
							rows.into_iter()
								.map(|(f, km)| (f, Some(km * 1000.0)))
								.collect()
						}),
					None => facility::table
						.filter(filter)
						.select(Self::as_select())
						.order(facility::id.asc())
						.limit(p_opts.limit())
						.offset(p_opts.offset())
						.get_results::<Self>(conn)
						.map(|rows| {
							rows.into_iter().map(|f| (f, None)).collect()
						}),
				}
			})
			.await??;

		Ok((total, facilities))
	}

	/// Get all [`Facility`]s created by a given provider, whatever their
	/// moderation status
	#[instrument(skip(conn))]
	pub async fn for_provider(
		p_id: i32,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let facilities = conn
			.interact(move |conn| {
				use self::facility::dsl::*;

				facility
					.filter(created_by.eq(p_id))
					.select(Self::as_select())
					.order(id)
					.get_results(conn)
			})
			.await??;

		Ok(facilities)
	}

	/// Get the moderation queue of pending [`Facility`]s, oldest first
	#[instrument(skip(conn))]
	pub async fn get_pending(conn: &DbConn) -> Result<Vec<Self>, Error> {
		let facilities = conn
			.interact(move |conn| {
				use self::facility::dsl::*;

				facility
					.filter(status.eq(FacilityStatus::Pending))
					.select(Self::as_select())
					.order(created_at)
					.get_results(conn)
			})
			.await??;

		Ok(facilities)
	}

	/// Approve a pending [`Facility`]
	#[instrument(skip(conn))]
	pub async fn approve_by_id(f_id: i32, conn: &DbConn) -> Result<Self, Error> {
		Self::moderate(f_id, FacilityStatus::Approved, None, conn).await
	}

	/// Reject a pending [`Facility`] with a reason for its provider
	#[instrument(skip(conn))]
	pub async fn reject_by_id(
		f_id: i32,
		reason: String,
		conn: &DbConn,
	) -> Result<Self, Error> {
		Self::moderate(f_id, FacilityStatus::Rejected, Some(reason), conn).await
	}

	async fn moderate(
		f_id: i32,
		to: FacilityStatus,
		reason: Option<String>,
		conn: &DbConn,
	) -> Result<Self, Error> {
		let facility = conn
			.interact(move |conn| {
				use self::facility::dsl::*;

				diesel::update(
					facility
						.find(f_id)
						.filter(status.eq(FacilityStatus::Pending)),
				)
				.set((
					status.eq(to),
					rejection_reason.eq(reason),
					updated_at.eq(Utc::now().naive_utc()),
				))
				.returning(Self::as_returning())
				.get_result(conn)
				.optional()
			})
			.await??;

		facility
			.ok_or_else(|| Error::NotFound(format!("pending facility {f_id}")))
	}

	/// Delete a [`Facility`] and its dependent rooms
	///
	/// Refused while any room still holds a live booking
	#[instrument(skip(conn))]
	pub async fn delete_by_id(f_id: i32, conn: &DbConn) -> Result<(), Error> {
		conn.interact(move |conn| {
			conn.transaction::<_, Error, _>(|conn| {
				let live: i64 = room::table
					.filter(room::facility_id.eq(f_id))
					.filter(room::status.eq_any([
						RoomStatus::Booked,
						RoomStatus::Occupied,
					]))
					.count()
					.get_result(conn)?;

				if live > 0 {
					return Err(BookingError::RoomInUse.into());
				}

				diesel::delete(facility::table.find(f_id)).execute(conn)?;

				Ok(())
			})
		})
		.await??;

		info!("deleted facility {f_id}");

		Ok(())
	}
}

/// The data needed to register a new facility
#[derive(Clone, Debug, Deserialize)]
pub struct NewFacility {
	pub name:       String,
	pub street:     String,
	pub number:     String,
	pub zip:        String,
	pub city:       String,
	pub latitude:   f64,
	pub longitude:  f64,
	pub base_price: i32,
	pub amenities:  Vec<String>,
	pub created_by: i32,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = facility)]
struct InsertableFacility {
	name:        String,
	street:      String,
	number:      String,
	zip:         String,
	city:        String,
	latitude:    f64,
	longitude:   f64,
	base_price:  i32,
	amenities:   Vec<String>,
	code_secret: Uuid,
	created_by:  i32,
}

impl NewFacility {
	/// Insert this [`NewFacility`] with status `pending` and a fresh
	/// check-in code secret
	#[instrument(skip(self, conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Facility, Error> {
		let insertable = InsertableFacility {
			name:        self.name,
			street:      self.street,
			number:      self.number,
			zip:         self.zip,
			city:        self.city,
			latitude:    self.latitude,
			longitude:   self.longitude,
			base_price:  self.base_price,
			amenities:   self.amenities,
			code_secret: Uuid::new_v4(),
			created_by:  self.created_by,
		};

		let facility = conn
			.interact(|conn| {
				use self::facility::dsl::*;

				diesel::insert_into(facility)
					.values(insertable)
					.returning(Facility::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("created facility {} ({})", facility.id, facility.name);

		Ok(facility)
	}
}

/// A partial update to an existing facility
#[derive(AsChangeset, Clone, Debug, Deserialize)]
#[diesel(table_name = facility)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFacility {
	pub name:       Option<String>,
	pub street:     Option<String>,
	pub number:     Option<String>,
	pub zip:        Option<String>,
	pub city:       Option<String>,
	pub latitude:   Option<f64>,
	pub longitude:  Option<f64>,
	pub base_price: Option<i32>,
	pub amenities:  Option<Vec<String>>,
}

impl UpdateFacility {
	/// Apply this update to the [`Facility`] with the given id
	#[instrument(skip(self, conn))]
	pub async fn apply_to(
		self,
		f_id: i32,
		conn: &DbConn,
	) -> Result<Facility, Error> {
		let facility = conn
			.interact(move |conn| {
				use self::facility::dsl::*;

				diesel::update(facility.find(f_id))
					.set((self, updated_at.eq(Utc::now().naive_utc())))
					.returning(Facility::as_returning())
					.get_result(conn)
			})
			.await??;

		Ok(facility)
	}
}

#[cfg(test)]
mod tests {
	use super::format_distance;

	#[test]
	fn short_distances_are_whole_meters() {
		assert_eq!(format_distance(0.0), "0 m");
		assert_eq!(format_distance(250.4), "250 m");
		assert_eq!(format_distance(999.4), "999 m");
	}

	#[test]
	fn long_distances_are_one_decimal_kilometers() {
		assert_eq!(format_distance(1000.0), "1.0 km");
		assert_eq!(format_distance(1250.0), "1.2 km");
		assert_eq!(format_distance(12_345.0), "12.3 km");
	}
}
