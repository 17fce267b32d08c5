use serde::{Deserialize, Serialize};
use validator_derive::Validate;

use crate::models::NewBooking;

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
	pub facility_id:       i32,
	/// Omitted for a general booking when the facility has no available
	/// rooms
	pub room_id:           Option<i32>,
	#[validate(length(
		min = 2,
		max = 64,
		message = "guest name must be between 2 and 64 characters long",
		code = "guest-name-length"
	))]
	pub guest_name:        String,
	#[validate(length(
		min = 6,
		max = 20,
		message = "guest phone must be between 6 and 20 characters long",
		code = "guest-phone-length"
	))]
	pub guest_phone:       String,
	#[validate(length(
		max = 512,
		message = "notes cannot be longer than 512 characters",
		code = "notes-length"
	))]
	pub notes:             Option<String>,
	/// Minutes until the guest expects to arrive; the arrival estimate is
	/// computed server-side and never moves the hold deadline
	#[validate(range(
		min = 0,
		max = 1440,
		message = "estimated minutes must be between 0 and 1440",
		code = "estimated-minutes-range"
	))]
	pub estimated_minutes: i32,
}

impl CreateBookingRequest {
	/// Convert this request into an insertable [`NewBooking`] for the given
	/// profile
	#[must_use]
	pub fn into_new_booking(self, profile_id: i32) -> NewBooking {
		NewBooking {
			profile_id,
			facility_id: self.facility_id,
			room_id: self.room_id,
			guest_name: self.guest_name,
			guest_phone: self.guest_phone,
			notes: self.notes,
			estimated_minutes: self.estimated_minutes,
		}
	}
}

/// The scanned QR payload presented at the facility door
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CheckInRequest {
	pub code: String,
}
