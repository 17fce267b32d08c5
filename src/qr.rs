//! Signed facility check-in codes
//!
//! A facility's check-in QR code carries the payload
//! `STORE_<facility id>.<signature>` where the signature is a hex HMAC-SHA256
//! over `STORE_<facility id>`, keyed with the facility's private code secret.
//! Guessing a valid payload for another facility requires its secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::{BookingError, Error};

type HmacSha256 = Hmac<Sha256>;

/// Prefix shared by every check-in code payload
pub const CODE_PREFIX: &str = "STORE_";

/// A parsed but not yet verified check-in code
#[derive(Clone, Debug)]
pub struct CheckInCode {
	facility_id: i32,
	signature:   Vec<u8>,
}

impl CheckInCode {
	/// Issue the signed code payload for a facility
	#[must_use]
	pub fn issue(facility_id: i32, secret: &Uuid) -> String {
		let body = format!("{CODE_PREFIX}{facility_id}");
		let mac = Self::mac(&body, secret);

		format!("{body}.{}", hex::encode(mac))
	}

	/// Parse a scanned payload into its claimed facility id and signature
	///
	/// Parsing checks shape only; call [`Self::verify`] with the claimed
	/// facility's secret before trusting the id
	pub fn parse(payload: &str) -> Result<Self, Error> {
		let body = payload
			.strip_prefix(CODE_PREFIX)
			.ok_or(BookingError::InvalidCode)?;

		let (id, signature) =
			body.split_once('.').ok_or(BookingError::InvalidCode)?;

		let facility_id =
			id.parse::<i32>().map_err(|_| BookingError::InvalidCode)?;

		let signature =
			hex::decode(signature).map_err(|_| BookingError::InvalidCode)?;

		Ok(Self { facility_id, signature })
	}

	/// The facility id this code claims to belong to
	#[must_use]
	pub fn facility_id(&self) -> i32 { self.facility_id }

	/// Verify the signature against a facility's secret
	pub fn verify(&self, secret: &Uuid) -> Result<(), Error> {
		let body = format!("{CODE_PREFIX}{}", self.facility_id);

		let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
			.map_err(|_| BookingError::InvalidCode)?;
		mac.update(body.as_bytes());

		mac.verify_slice(&self.signature)
			.map_err(|_| BookingError::InvalidCode.into())
	}

	fn mac(body: &str, secret: &Uuid) -> Vec<u8> {
		let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
			.expect("hmac accepts any key length");
		mac.update(body.as_bytes());

		mac.finalize().into_bytes().to_vec()
	}
}
