use serde::{Deserialize, Serialize};
use validator_derive::Validate;

use crate::models::{Facility, NewFacility, format_distance};

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFacilityRequest {
	#[validate(length(
		min = 2,
		max = 128,
		message = "name must be between 2 and 128 characters long",
		code = "name-length"
	))]
	pub name:       String,
	#[validate(length(min = 1, message = "street is required", code = "street"))]
	pub street:     String,
	#[validate(length(min = 1, message = "number is required", code = "number"))]
	pub number:     String,
	#[validate(length(min = 1, message = "zip is required", code = "zip"))]
	pub zip:        String,
	#[validate(length(min = 1, message = "city is required", code = "city"))]
	pub city:       String,
	#[validate(range(
		min = -90.0,
		max = 90.0,
		message = "latitude must be between -90 and 90",
		code = "latitude-range"
	))]
	pub latitude:   f64,
	#[validate(range(
		min = -180.0,
		max = 180.0,
		message = "longitude must be between -180 and 180",
		code = "longitude-range"
	))]
	pub longitude:  f64,
	#[validate(range(
		min = 0,
		message = "base price cannot be negative",
		code = "base-price-range"
	))]
	pub base_price: i32,
	#[serde(default)]
	pub amenities:  Vec<String>,
}

impl CreateFacilityRequest {
	/// Convert this request into an insertable [`NewFacility`] owned by the
	/// given provider
	#[must_use]
	pub fn into_new_facility(self, created_by: i32) -> NewFacility {
		NewFacility {
			name: self.name,
			street: self.street,
			number: self.number,
			zip: self.zip,
			city: self.city,
			latitude: self.latitude,
			longitude: self.longitude,
			base_price: self.base_price,
			amenities: self.amenities,
			created_by,
		}
	}
}

/// The reason an admin rejects a pending facility, stored on the facility
/// and surfaced to its provider
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct RejectFacilityRequest {
	#[validate(length(
		min = 1,
		max = 512,
		message = "a rejection reason is required",
		code = "reason-length"
	))]
	pub reason: String,
}

/// A single catalog search hit
///
/// `distance` is only present when the search carried a center, formatted
/// as meters below one kilometer and one-decimal kilometers above
#[derive(Clone, Debug, Serialize)]
pub struct FacilitySearchResult {
	#[serde(flatten)]
	pub facility: Facility,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub distance: Option<String>,
}

impl FacilitySearchResult {
	#[must_use]
	pub fn new(facility: Facility, meters: Option<f64>) -> Self {
		Self { facility, distance: meters.map(format_distance) }
	}
}

/// The signed check-in code payload of a facility, rendered by the frontend
/// as a QR code
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CheckInCodeResponse {
	pub payload: String,
}
