//! Controllers for reviews

use axum::Json;
use axum::extract::{Path, Query, State};
use validator::Validate;

use crate::models::{Facility, PrimitiveReview, Review};
use crate::schemas::pagination::{PaginationOptions, PaginationResponse};
use crate::schemas::review::CreateReviewRequest;
use crate::session::Session;
use crate::{DbPool, Error};

/// Get the reviews of an approved facility, newest first
#[instrument(skip(pool))]
pub(crate) async fn get_facility_reviews(
	State(pool): State<DbPool>,
	Path(f_id): Path<i32>,
	Query(p_opts): Query<PaginationOptions>,
) -> Result<Json<PaginationResponse<Vec<Review>>>, Error> {
	let conn = pool.get().await?;

	let facility = Facility::get_approved_by_id(f_id, &conn).await?;
	let (total, reviews) =
		Review::for_facility(facility.id, p_opts, &conn).await?;

	p_opts.check_bounds(total)?;

	Ok(Json(p_opts.paginate(total, reviews)))
}

/// Post a review for an approved facility and fold its rating into the
/// facility's running mean
#[instrument(skip(pool, request))]
pub(crate) async fn create_review(
	session: Session,
	State(pool): State<DbPool>,
	Path(f_id): Path<i32>,
	Json(request): Json<CreateReviewRequest>,
) -> Result<Json<PrimitiveReview>, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let facility = Facility::get_approved_by_id(f_id, &conn).await?;
	let review = request
		.into_new_review(session.data.profile_id, facility.id)
		.insert(&conn)
		.await?;

	Ok(Json(review))
}
