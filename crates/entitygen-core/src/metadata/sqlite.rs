//! SQLite metadata source.
//!
//! Reads the catalog through the pragma table-valued functions:
//!
//! - `pragma_table_info`: columns, nullability and primary key membership
//! - `pragma_foreign_key_list`: imported keys (`id` groups composite keys)
//! - `pragma_index_list` / `pragma_index_info`: indexes, one row per column
//!
//! SQLite has no reverse lookup for foreign keys, so exported keys are
//! found by scanning the foreign keys of every other table.

use super::{Column, Index, Key, MetadataError, MetadataFetcher, Table};
use crate::sql_types::SqlType;
use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Reported size of character columns declared without a length.
const SQLITE_MAX_LENGTH: i32 = 1_000_000_000;

#[derive(sqlx::FromRow)]
struct TableInfoRow {
	name: String,
	type_name: String,
	not_null: i64,
	pk: i64,
}

#[derive(sqlx::FromRow)]
struct ForeignKeyRow {
	id: i64,
	ref_table: String,
	from_column: String,
	to_column: Option<String>,
}

#[derive(sqlx::FromRow)]
struct IndexListRow {
	name: String,
	is_unique: i64,
}

#[derive(sqlx::FromRow)]
struct IndexInfoRow {
	name: Option<String>,
}

/// Metadata source backed by a SQLite connection pool.
pub struct SqliteMetadataFetcher {
	pool: SqlitePool,
}

impl SqliteMetadataFetcher {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Open a pool on a `sqlite:` URL.
	///
	/// A single connection is used so that `sqlite::memory:` URLs see one
	/// database.
	pub async fn connect(url: &str) -> Result<Self, MetadataError> {
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.connect(url)
			.await?;
		tracing::debug!(url, "Connected to SQLite");
		Ok(Self::new(pool))
	}

	pub fn pool(&self) -> &SqlitePool {
		&self.pool
	}

	async fn table_info(&self, table_name: &str) -> Result<Vec<TableInfoRow>, MetadataError> {
		let rows = sqlx::query_as::<_, TableInfoRow>(
			r#"SELECT name, type AS type_name, "notnull" AS not_null, pk
			FROM pragma_table_info(?1)
			ORDER BY cid"#,
		)
		.bind(table_name)
		.fetch_all(&self.pool)
		.await?;
		Ok(rows)
	}

	async fn foreign_keys(&self, table_name: &str) -> Result<Vec<ForeignKeyRow>, MetadataError> {
		let rows = sqlx::query_as::<_, ForeignKeyRow>(
			r#"SELECT id, "table" AS ref_table, "from" AS from_column, "to" AS to_column
			FROM pragma_foreign_key_list(?1)
			ORDER BY id, seq"#,
		)
		.bind(table_name)
		.fetch_all(&self.pool)
		.await?;
		Ok(rows)
	}

	/// Primary key column names of a table, in key order.
	async fn primary_key_names(&self, table_name: &str) -> Result<Vec<String>, MetadataError> {
		let mut columns: Vec<_> = self
			.table_info(table_name)
			.await?
			.into_iter()
			.filter(|row| row.pk > 0)
			.collect();
		columns.sort_by_key(|row| row.pk);
		Ok(columns.into_iter().map(|row| row.name).collect())
	}

	/// Turn the foreign key rows of `table_name` into key edges.
	///
	/// Rows without a target column reference the primary key of the
	/// referenced table, matched by position within the constraint.
	async fn keys_of(&self, table_name: &str) -> Result<Vec<Key>, MetadataError> {
		let rows = self.foreign_keys(table_name).await?;
		let mut keys = Vec::with_capacity(rows.len());
		let mut position = 0usize;
		let mut current_id = None;

		for row in rows {
			if current_id != Some(row.id) {
				current_id = Some(row.id);
				position = 0;
			}

			let primary_key_column_name = match row.to_column {
				Some(to) => to,
				None => self
					.primary_key_names(&row.ref_table)
					.await?
					.into_iter()
					.nth(position)
					.ok_or_else(|| {
						MetadataError::Introspection(format!(
							"Foreign key {} of table {} references {} which has no matching primary key column",
							row.id, table_name, row.ref_table
						))
					})?,
			};
			position += 1;

			keys.push(
				Key::new(
					row.ref_table.clone(),
					primary_key_column_name,
					table_name,
					row.from_column,
				)
				.with_names(
					format!("pk_{}", row.ref_table),
					format!("fk_{}_{}", table_name, row.id),
				),
			);
		}

		Ok(keys)
	}

	async fn indexes(&self, table_name: &str) -> Result<Vec<Index>, MetadataError> {
		let index_list = sqlx::query_as::<_, IndexListRow>(
			r#"SELECT name, "unique" AS is_unique
			FROM pragma_index_list(?1)
			ORDER BY seq"#,
		)
		.bind(table_name)
		.fetch_all(&self.pool)
		.await?;

		let mut indexes = Vec::new();
		for index_row in index_list {
			let columns = sqlx::query_as::<_, IndexInfoRow>(
				"SELECT name FROM pragma_index_info(?1) ORDER BY seqno",
			)
			.bind(&index_row.name)
			.fetch_all(&self.pool)
			.await?;

			for column_name in columns.into_iter().filter_map(|info| info.name) {
				indexes.push(Index {
					name: Some(index_row.name.clone()),
					column_name,
					non_unique: index_row.is_unique == 0,
				});
			}
		}

		Ok(indexes)
	}

	fn convert_column(row: TableInfoRow, single_pk: bool) -> Column {
		let (sql_type, size, scale) = SqlType::from_type_name(&row.type_name);
		let is_character = matches!(
			sql_type,
			SqlType::Char
				| SqlType::VarChar
				| SqlType::LongVarChar
				| SqlType::NChar
				| SqlType::NVarChar
				| SqlType::LongNVarChar
		);
		let primary_key = row.pk > 0;

		Column {
			name: row.name,
			type_code: sql_type.code(),
			// INTEGER PRIMARY KEY aliases the rowid
			auto_increment: primary_key
				&& single_pk && row.type_name.trim().eq_ignore_ascii_case("INTEGER"),
			type_name: row.type_name,
			// SQLite allows NULL in non-rowid primary keys; JDBC drivers report them as NOT NULL
			nullable: row.not_null == 0 && !primary_key,
			primary_key,
			column_size: size.unwrap_or(if is_character { SQLITE_MAX_LENGTH } else { 0 }),
			decimal_digits: scale.unwrap_or(0),
			remarks: None,
		}
	}
}

#[async_trait]
impl MetadataFetcher for SqliteMetadataFetcher {
	async fn table_names(&self) -> Result<Vec<String>, MetadataError> {
		let names: Vec<(String,)> = sqlx::query_as(
			"SELECT name FROM sqlite_master
			WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
			ORDER BY name",
		)
		.fetch_all(&self.pool)
		.await?;
		Ok(names.into_iter().map(|(name,)| name).collect())
	}

	async fn fetch_table(&self, name: &str) -> Result<Table, MetadataError> {
		let rows = self.table_info(name).await?;
		if rows.is_empty() {
			return Err(MetadataError::TableNotFound {
				name: name.to_string(),
			});
		}

		let single_pk = rows.iter().filter(|row| row.pk > 0).count() == 1;
		let columns = rows
			.into_iter()
			.map(|row| Self::convert_column(row, single_pk))
			.collect();

		let imported_keys = self.keys_of(name).await?;

		let mut exported_keys = Vec::new();
		for other in self.table_names().await? {
			let referencing = self
				.keys_of(&other)
				.await?
				.into_iter()
				.filter(|key| key.primary_key_table_name.eq_ignore_ascii_case(name))
				.map(|mut key| {
					key.primary_key_table_name = name.to_string();
					key
				});
			exported_keys.extend(referencing);
		}

		let indexes = self.indexes(name).await?;

		tracing::debug!(
			table = name,
			imported = imported_keys.len(),
			exported = exported_keys.len(),
			"Fetched SQLite table metadata"
		);

		Ok(Table {
			name: name.to_string(),
			schema: None,
			remarks: None,
			columns,
			imported_keys,
			exported_keys,
			indexes,
		})
	}
}
