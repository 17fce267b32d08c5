use std::path::PathBuf;

use diesel::prelude::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::models::{Profile, ProfileRole};
use crate::{DbConn, DbPool, Error};

pub struct Seeder<'c> {
	connection: &'c mut DbConn,
}

impl<'c> Seeder<'c> {
	pub fn new(connection: &'c mut DbConn) -> Self { Self { connection } }

	/// Read a file into a series of deserializable items
	///
	/// # Panics
	/// Panics if reading or deserializing the file fails
	fn read_file_records<T, I>(filename: &str) -> I
	where
		T: DeserializeOwned,
		I: IntoIterator<Item = T> + DeserializeOwned,
	{
		let path = std::env::var("CARGO_MANIFEST_DIR")
			.map(PathBuf::from)
			.unwrap_or_default()
			.join(filename);

		let s = std::fs::read_to_string(path)
			.unwrap_or_else(|_| panic!("COULD NOT READ SEED FILE {filename}"));

		serde_json::from_str(&s)
			.unwrap_or_else(|_| panic!("COULD NOT MAP SEED FILE {filename}"))
	}

	/// Load a file and populate the database with it
	///
	/// # Panics
	/// Panics if reading the file or interacting with the database fails
	pub async fn populate<'s, T, F>(
		&'s mut self,
		filename: &str,
		loader: F,
	) -> &'s mut Self
	where
		T: DeserializeOwned + std::fmt::Debug,
		F: AsyncFnOnce(&DbConn, Vec<T>) -> Result<(), Error>,
	{
		let records = Self::read_file_records(filename);

		loader(self.connection, records).await.unwrap_or_else(|_| {
			panic!("COULD NOT LOAD RECORDS FOR {filename}")
		});

		info!("seeded database from {filename}");

		self
	}
}

#[derive(Clone, Debug, Deserialize)]
pub struct SeedProfile {
	pub username:     String,
	pub password:     String,
	pub email:        String,
	pub phone:        Option<String>,
	pub display_name: String,
	#[serde(default)]
	pub role:         ProfileRole,
}

#[derive(AsChangeset, Clone, Debug, Insertable)]
#[diesel(table_name = crate::schema::profile)]
struct InsertableSeedProfile {
	username:      String,
	password_hash: String,
	email:         String,
	phone:         Option<String>,
	display_name:  String,
	role:          ProfileRole,
}

impl SeedProfile {
	/// Insert this [`SeedProfile`]
	pub async fn insert(self, conn: &DbConn) -> Result<(), Error> {
		let hash = Profile::hash_password(&self.password)?;
		let insertable = InsertableSeedProfile {
			username:      self.username,
			password_hash: hash,
			email:         self.email,
			phone:         self.phone,
			display_name:  self.display_name,
			role:          self.role,
		};

		conn.interact(|conn| {
			use crate::schema::profile::dsl::*;

			diesel::insert_into(profile)
				.values(insertable.clone())
				.on_conflict(username)
				.do_update()
				.set(insertable)
				.execute(conn)
		})
		.await??;

		Ok(())
	}
}

/// Populate the database with development seed data
///
/// # Panics
/// Panics if reading the seed files or inserting the records fails
pub async fn seed_database(pool: &DbPool) {
	let mut conn = pool.get().await.expect("COULD NOT GET SEED CONNECTION");

	Seeder::new(&mut conn)
		.populate("seed/profiles.json", async |conn, records| {
			for record in records.into_iter() {
				SeedProfile::insert(record, conn).await?;
			}

			Ok(())
		})
		.await;
}
