//! Library-wide error types and [`From`] impls

use std::collections::HashMap;
use std::sync::LazyLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diesel::result::DatabaseErrorKind;
use thiserror::Error;

use crate::models::BookingState;

/// Top level application error, can be converted into a [`Response`]
#[derive(Debug, Error)]
pub enum Error {
	/// Duplicate resource created
	#[error("{0}")]
	Duplicate(String),
	/// Request/operation forbidden
	#[error("forbidden")]
	Forbidden,
	/// An error that should never happen
	#[error("{0}")]
	Infallible(String),
	/// Opaque internal server error
	#[error("internal server error")]
	InternalServerError,
	/// Resource not found
	#[error("not found - {0}")]
	NotFound(String),
	/// Any error related to logging in
	#[error(transparent)]
	LoginError(#[from] LoginError),
	/// Invalid or missing token
	#[error(transparent)]
	TokenError(#[from] TokenError),
	/// Any error related to the booking lifecycle
	#[error(transparent)]
	BookingError(#[from] BookingError),
	/// Invalid pagination options
	#[error(transparent)]
	PaginationError(#[from] PaginationError),
	/// Resource could not be validated
	#[error("{0}")]
	ValidationError(String),
}

impl Error {
	/// Return a unique identifying code for this error
	///
	/// When modifying this function the error code should only ever increase,
	/// an error code should never be reused once its assigned to avoid
	/// unexpectedly breaking the frontend
	fn code(&self) -> i32 {
		match self {
			Self::Duplicate(_) => 1,
			Self::Forbidden => 2,
			Self::Infallible(_) => 3,
			Self::InternalServerError => 4,
			Self::NotFound(_) => 5,
			Self::LoginError(e) => {
				match e {
					LoginError::UnknownUsername(_) => 6,
					LoginError::InvalidPassword => 7,
				}
			},
			Self::TokenError(e) => {
				match e {
					TokenError::MissingAccessToken => 8,
					TokenError::MissingSession => 9,
				}
			},
			Self::ValidationError(_) => 10,
			Self::PaginationError(e) => {
				match e {
					PaginationError::OffsetTooLarge => 11,
				}
			},
			Self::BookingError(e) => {
				match e {
					BookingError::MissingRoomSelection => 12,
					BookingError::RoomUnavailable => 13,
					BookingError::RoomFacilityMismatch => 14,
					BookingError::InvalidTransition { .. } => 15,
					BookingError::CodeMismatch { .. } => 16,
					BookingError::InvalidCode => 17,
					BookingError::RoomInUse => 18,
				}
			},
		}
	}

	/// Return additional information about the error
	fn info(&self) -> Option<String> {
		match self {
			Self::Duplicate(m)
			| Self::NotFound(m)
			| Self::LoginError(LoginError::UnknownUsername(m))
			| Self::ValidationError(m) => Some(m.to_owned()),
			Self::BookingError(e) => {
				match e {
					BookingError::InvalidTransition { from, to } => Some(
						serde_json::json!({"from": from, "to": to}).to_string(),
					),
					BookingError::CodeMismatch { expected } => Some(
						serde_json::json!({"expected": expected}).to_string(),
					),
					_ => None,
				}
			},
			_ => None,
		}
	}
}

/// Convert an error into a [`Response`]
impl IntoResponse for Error {
	fn into_response(self) -> Response {
		error!("{self:?}");

		let message = self.to_string();

		let data = serde_json::json!({
			"message": message,
			"code": self.code(),
			"info": self.info(),
		});

		let status = match self {
			Self::Duplicate(_)
			| Self::BookingError(
				BookingError::RoomUnavailable
				| BookingError::RoomInUse
				| BookingError::InvalidTransition { .. },
			) => StatusCode::CONFLICT,
			Self::InternalServerError | Self::Infallible(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			},
			Self::TokenError(
				TokenError::MissingAccessToken | TokenError::MissingSession,
			) => StatusCode::UNAUTHORIZED,
			Self::Forbidden | Self::LoginError(_) => StatusCode::FORBIDDEN,
			Self::BookingError(_) | Self::PaginationError(_) => {
				StatusCode::BAD_REQUEST
			},
			Self::NotFound(_) => StatusCode::NOT_FOUND,
			Self::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
		};

		(status, axum::Json(data)).into_response()
	}
}

/// Any error related to logging in
#[derive(Debug, Error)]
pub enum LoginError {
	#[error("no profile with username '{0}' was found")]
	UnknownUsername(String),
	#[error("invalid password")]
	InvalidPassword,
}

/// Any error related to a token
#[derive(Debug, Error)]
pub enum TokenError {
	#[error("missing or invalid access token")]
	MissingAccessToken,
	#[error("missing session")]
	MissingSession,
}

/// Any error related to the booking lifecycle or its room resource
#[derive(Debug, Error)]
pub enum BookingError {
	/// The facility has available rooms but the request named none
	#[error("this facility requires a room selection")]
	MissingRoomSelection,
	/// The selected room is no longer available
	#[error("the selected room is not available")]
	RoomUnavailable,
	/// The selected room belongs to a different facility
	#[error("the selected room does not belong to this facility")]
	RoomFacilityMismatch,
	/// The requested state change is not a legal forward transition
	#[error("booking cannot move from '{from}' to '{to}'")]
	InvalidTransition { from: BookingState, to: BookingState },
	/// The scanned check-in code belongs to a different facility
	#[error("scanned code does not match the booked facility '{expected}'")]
	CodeMismatch { expected: String },
	/// The scanned check-in code is malformed or its signature is wrong
	#[error("invalid check-in code")]
	InvalidCode,
	/// The room has a live booking and cannot be deleted or repurposed
	#[error("the room is currently booked or occupied")]
	RoomInUse,
}

#[derive(Debug, Error)]
pub enum PaginationError {
	#[error("the offset is too large for the amount of data")]
	OffsetTooLarge,
}

/// A list of possible internal errors
///
/// API end users should never see these details
#[derive(Debug, Error)]
pub enum InternalServerError {
	/// Unknown database constraint violation
	#[error("constraint error -- {0:?}")]
	ConstraintError(String),
	/// Error executing some database operation
	#[error("database error -- {0:?}")]
	DatabaseError(diesel::result::Error),
	/// Error interacting with a database connection
	#[error("database interaction error -- {0:?}")]
	DatabaseInteractionError(deadpool_diesel::InteractError),
	/// Error hashing some value
	#[error("hash error -- {0:?}")]
	HashError(argon2::password_hash::Error),
	/// Error acquiring database pool connection
	#[error("database pool error -- {0:?}")]
	PoolError(deadpool_diesel::PoolError),
	/// Error executing some redis operation
	#[error("redis error -- {0:?}")]
	RedisError(redis::RedisError),
	/// Error related to `serde_json`
	#[error("serde_json error -- {0:?}")]
	SerdeJsonError(serde_json::Error),
	/// Attempted to extract a session from a request that has not been
	/// authorized
	#[error("attempted to extract session without checking authorization")]
	SessionWithoutAuthError,
}

// Map internal server errors to application errors
impl From<InternalServerError> for Error {
	fn from(value: InternalServerError) -> Self {
		error!("internal server error -- {value}");

		Self::InternalServerError
	}
}

/// Map validation errors to application errors
impl From<validator::ValidationErrors> for Error {
	fn from(err: validator::ValidationErrors) -> Self {
		let errs = err.field_errors();
		let repr = errs
			.values()
			.map(|v| {
				v.iter()
					.map(ToString::to_string)
					.collect::<Vec<String>>()
					.join("\n")
			})
			.collect::<Vec<String>>()
			.join("\n");

		Self::ValidationError(repr)
	}
}

/// Map password hashing errors to application errors
impl From<argon2::password_hash::Error> for Error {
	fn from(err: argon2::password_hash::Error) -> Self {
		match err {
			argon2::password_hash::Error::Password => {
				LoginError::InvalidPassword.into()
			},
			_ => InternalServerError::HashError(err).into(),
		}
	}
}

/// Map database interaction errors to application errors
impl From<deadpool_diesel::InteractError> for Error {
	fn from(value: deadpool_diesel::InteractError) -> Self {
		InternalServerError::DatabaseInteractionError(value).into()
	}
}

/// Map of constraint names to column names.
static CONSTRAINT_TO_COLUMN: LazyLock<HashMap<&str, &str>> =
	LazyLock::new(|| {
		HashMap::from([
			("profile_username_key", "username"),
			("profile_email_key", "email"),
			("room_facility_label_key", "room label"),
		])
	});

/// Map database result errors to application errors.
impl From<diesel::result::Error> for Error {
	fn from(err: diesel::result::Error) -> Self {
		match &err {
			// No rows returned by query that expected at least one
			diesel::result::Error::NotFound => {
				Self::NotFound("no context provided".to_string())
			},
			// Unique constraint violation
			diesel::result::Error::DatabaseError(
				DatabaseErrorKind::UniqueViolation,
				info,
			) => {
				let constraint_name = info.constraint_name().unwrap();

				match CONSTRAINT_TO_COLUMN.get(constraint_name) {
					Some(field) => {
						Self::Duplicate(format!("{field} is already in use"))
					},
					None => InternalServerError::DatabaseError(err).into(),
				}
			},
			// Foreign key constraint violation
			diesel::result::Error::DatabaseError(
				DatabaseErrorKind::ForeignKeyViolation,
				info,
			) => Self::ValidationError(info.message().to_string()),
			_ => InternalServerError::DatabaseError(err).into(),
		}
	}
}

impl From<deadpool_diesel::PoolError> for Error {
	fn from(value: deadpool_diesel::PoolError) -> Self {
		InternalServerError::PoolError(value).into()
	}
}

impl From<redis::RedisError> for Error {
	fn from(err: redis::RedisError) -> Self {
		InternalServerError::RedisError(err).into()
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		InternalServerError::SerdeJsonError(err).into()
	}
}
