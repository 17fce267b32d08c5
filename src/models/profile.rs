use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::NaiveDateTime;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

use crate::schema::profile;
use crate::{DbConn, Error, LoginError};

/// The access tier of a profile
#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::ProfileRole"]
#[serde(rename_all = "snake_case")]
pub enum ProfileRole {
	#[default]
	User,
	Provider,
	Admin,
}

/// A single profile
#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = profile)]
#[diesel(check_for_backend(Pg))]
pub struct Profile {
	pub id:            i32,
	pub username:      String,
	#[serde(skip)]
	pub password_hash: String,
	pub email:         String,
	pub phone:         Option<String>,
	pub display_name:  String,
	pub role:          ProfileRole,
	pub created_at:    NaiveDateTime,
}

impl Profile {
	/// Hash a plaintext password
	pub fn hash_password(password: &str) -> Result<String, Error> {
		let salt = SaltString::generate(&mut OsRng);
		let hash = Argon2::default()
			.hash_password(password.as_bytes(), &salt)?
			.to_string();

		Ok(hash)
	}

	/// Verify a plaintext password against this profile's stored hash
	pub fn verify_password(&self, password: &str) -> Result<(), Error> {
		let hash = PasswordHash::new(&self.password_hash)?;

		Argon2::default().verify_password(password.as_bytes(), &hash)?;

		Ok(())
	}

	/// Get a [`Profile`] given its id
	#[instrument(skip(conn))]
	pub async fn get(p_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let profile = conn
			.interact(move |conn| {
				use self::profile::dsl::*;

				profile.find(p_id).select(Self::as_select()).get_result(conn)
			})
			.await??;

		Ok(profile)
	}

	/// Get a [`Profile`] given its username
	#[instrument(skip(conn))]
	pub async fn get_by_username(
		name: String,
		conn: &DbConn,
	) -> Result<Self, Error> {
		let lookup = name.clone();

		let profile = conn
			.interact(move |conn| {
				use self::profile::dsl::*;

				profile
					.filter(username.eq(lookup))
					.select(Self::as_select())
					.get_result(conn)
					.optional()
			})
			.await??;

		profile.ok_or_else(|| LoginError::UnknownUsername(name).into())
	}
}

/// The data needed to register a new profile
#[derive(Clone, Debug, Deserialize)]
pub struct NewProfile {
	pub username:     String,
	pub password:     String,
	pub email:        String,
	pub phone:        Option<String>,
	pub display_name: String,
}

#[derive(Clone, Debug, Insertable)]
#[diesel(table_name = profile)]
struct InsertableProfile {
	username:      String,
	password_hash: String,
	email:         String,
	phone:         Option<String>,
	display_name:  String,
}

impl NewProfile {
	/// Hash the password and insert this [`NewProfile`]
	///
	/// New registrations always get the `user` role; provider and admin
	/// profiles are provisioned out of band
	#[instrument(skip(self, conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Profile, Error> {
		let insertable = InsertableProfile {
			username:      self.username,
			password_hash: Profile::hash_password(&self.password)?,
			email:         self.email,
			phone:         self.phone,
			display_name:  self.display_name,
		};

		let profile = conn
			.interact(|conn| {
				use self::profile::dsl::*;

				diesel::insert_into(profile)
					.values(insertable)
					.returning(Profile::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("registered new profile {} ({})", profile.id, profile.username);

		Ok(profile)
	}
}
