use serde::{Deserialize, Serialize};
use validator_derive::Validate;

use crate::models::{NewRoom, RoomCategory};

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
	#[validate(length(
		min = 1,
		max = 64,
		message = "label must be between 1 and 64 characters long",
		code = "label-length"
	))]
	pub label:     String,
	pub category:  RoomCategory,
	#[validate(range(
		min = 0,
		message = "price cannot be negative",
		code = "price-range"
	))]
	pub price:     i32,
	#[serde(default)]
	pub amenities: Vec<String>,
}

impl CreateRoomRequest {
	/// Convert this request into an insertable [`NewRoom`] for the given
	/// facility
	#[must_use]
	pub fn into_new_room(self, facility_id: i32) -> NewRoom {
		NewRoom {
			facility_id,
			label: self.label,
			category: self.category,
			price: self.price,
			amenities: self.amenities,
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct SetMaintenanceRequest {
	pub maintenance: bool,
}
