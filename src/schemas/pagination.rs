use serde::{Deserialize, Deserializer, Serialize};

use crate::schemas::BoundedU32Visitor;
use crate::{Error, PaginationError};

const fn page_default() -> u32 { 1 }

const fn per_page_default() -> u32 { 12 }

/// Pagination request parameters.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationOptions {
	#[serde(default = "page_default", deserialize_with = "ds_page_bounds")]
	pub page:     u32,
	#[serde(
		default = "per_page_default",
		deserialize_with = "ds_per_page_bounds"
	)]
	pub per_page: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse<T> {
	pub page:     u32,
	pub per_page: u32,
	pub total:    i64,
	pub data:     T,
}

impl Default for PaginationOptions {
	fn default() -> Self { Self { page: 1, per_page: 12 } }
}

impl PaginationOptions {
	/// Create a new [`PaginationResponse`] based on the current parameters
	/// with the given data
	pub fn paginate<T>(&self, total: i64, data: T) -> PaginationResponse<T> {
		PaginationResponse {
			page: self.page,
			per_page: self.per_page,
			total,
			data,
		}
	}

	/// Check that these parameters do not point past the end of the data
	pub fn check_bounds(&self, total: i64) -> Result<(), Error> {
		if total > 0 && self.offset() >= total {
			return Err(PaginationError::OffsetTooLarge.into());
		}

		Ok(())
	}

	/// Calculate the SQL LIMIT value of these parameters
	#[inline]
	#[must_use]
	pub fn limit(&self) -> i64 { self.per_page.into() }

	/// Calculate the SQL OFFSET value of these parameters
	///
	/// Widened to `i64` before multiplying so an extreme `page` cannot
	/// overflow
	#[inline]
	#[must_use]
	pub fn offset(&self) -> i64 {
		(i64::from(self.page) - 1) * i64::from(self.per_page)
	}
}

/// Deserialization visitor for `page` bounds.
fn ds_page_bounds<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
	d.deserialize_u32(BoundedU32Visitor { start: 1, end: u32::MAX })
}

/// Deserialization visitor for `per_page` bounds.
fn ds_per_page_bounds<'de, D: Deserializer<'de>>(
	d: D,
) -> Result<u32, D::Error> {
	d.deserialize_u32(BoundedU32Visitor { start: 1, end: 50 })
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn offset_of_an_extreme_page_does_not_overflow() {
		let opts = PaginationOptions { page: u32::MAX, per_page: 50 };

		assert_eq!(opts.offset(), (i64::from(u32::MAX) - 1) * 50);
	}

	#[test]
	fn extreme_pages_point_past_any_real_total() {
		let opts = PaginationOptions { page: u32::MAX, per_page: 50 };

		assert!(opts.check_bounds(1).is_err());
	}
}
