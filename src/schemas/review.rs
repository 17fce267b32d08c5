use serde::{Deserialize, Serialize};
use validator_derive::Validate;

use crate::models::NewReview;

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct CreateReviewRequest {
	#[validate(range(
		min = 1,
		max = 5,
		message = "rating must be between 1 and 5",
		code = "rating-range"
	))]
	pub rating: i32,
	#[validate(length(
		max = 2048,
		message = "review body cannot be longer than 2048 characters",
		code = "body-length"
	))]
	pub body:   Option<String>,
}

impl CreateReviewRequest {
	/// Convert this request into an insertable [`NewReview`]
	#[must_use]
	pub fn into_new_review(self, profile_id: i32, facility_id: i32) -> NewReview {
		NewReview {
			profile_id,
			facility_id,
			rating: self.rating,
			body: self.body,
		}
	}
}
