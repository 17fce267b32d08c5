use chrono::{NaiveDateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{Facility, Profile};
use crate::schema::{facility, profile, review};
use crate::schemas::pagination::PaginationOptions;
use crate::{DbConn, Error};

/// A single review row
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = review)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveReview {
	pub id:          i32,
	pub profile_id:  i32,
	pub facility_id: i32,
	pub rating:      i32,
	pub body:        Option<String>,
	pub created_at:  NaiveDateTime,
}

/// A review joined with the profile that wrote it
#[derive(Clone, Debug, Serialize)]
pub struct Review {
	#[serde(flatten)]
	pub review:     PrimitiveReview,
	pub created_by: Profile,
}

impl From<(PrimitiveReview, Profile)> for Review {
	fn from((review, created_by): (PrimitiveReview, Profile)) -> Self {
		Self { review, created_by }
	}
}

impl Review {
	/// Get the reviews of a facility, newest first
	#[instrument(skip(conn))]
	pub async fn for_facility(
		f_id: i32,
		p_opts: PaginationOptions,
		conn: &DbConn,
	) -> Result<(i64, Vec<Self>), Error> {
		let total: i64 = conn
			.interact(move |conn| {
				review::table
					.filter(review::facility_id.eq(f_id))
					.count()
					.get_result(conn)
			})
			.await??;

		let reviews = conn
			.interact(move |conn| {
				review::table
					.filter(review::facility_id.eq(f_id))
					.inner_join(profile::table)
					.select((
						PrimitiveReview::as_select(),
						Profile::as_select(),
					))
					.order(review::created_at.desc())
					.limit(p_opts.limit())
					.offset(p_opts.offset())
					.get_results::<(PrimitiveReview, Profile)>(conn)
			})
			.await??;

		Ok((total, reviews.into_iter().map(Into::into).collect()))
	}
}

/// The data needed to post a new review
#[derive(Clone, Debug, Deserialize, Insertable)]
#[diesel(table_name = review)]
pub struct NewReview {
	pub profile_id:  i32,
	pub facility_id: i32,
	pub rating:      i32,
	pub body:        Option<String>,
}

impl NewReview {
	/// Insert this [`NewReview`] and fold its rating into the facility's
	/// running mean
	///
	/// The facility row is locked for the duration of the transaction so
	/// concurrent reviews cannot lose each other's contribution
	#[instrument(skip(self, conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<PrimitiveReview, Error> {
		let review = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let target: Facility = facility::table
						.find(self.facility_id)
						.select(Facility::as_select())
						.for_update()
						.get_result(conn)?;

					let rating = f64::from(self.rating);

					let inserted: PrimitiveReview =
						diesel::insert_into(review::table)
							.values(&self)
							.returning(PrimitiveReview::as_returning())
							.get_result(conn)?;

					let count = target.rating_count + 1;
					let average = target.rating_average
						+ (rating - target.rating_average) / f64::from(count);

					diesel::update(facility::table.find(target.id))
						.set((
							facility::rating_average.eq(average),
							facility::rating_count.eq(count),
							facility::updated_at
								.eq(Utc::now().naive_utc()),
						))
						.execute(conn)?;

					Ok(inserted)
				})
			})
			.await??;

		info!(
			"posted review {} for facility {}",
			review.id, review.facility_id
		);

		Ok(review)
	}
}
