//! Database metadata model
//!
//! Tables, columns, indexes and foreign-key edges as reported by a
//! database-introspection source. Values are built once per table by a
//! [`MetadataFetcher`] and are read-only afterwards.

#[cfg(feature = "sqlite")]
mod sqlite;
mod static_source;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteMetadataFetcher;
pub use static_source::StaticMetadata;

use crate::sql_types::SqlType;
use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while fetching metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
	#[cfg(feature = "sqlite")]
	#[error("SQL error: {0}")]
	Sql(#[from] sqlx::Error),

	#[error("Table not found: {name}")]
	TableNotFound { name: String },

	#[error("Introspection error: {0}")]
	Introspection(String),
}

/// Column metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
	pub name: String,
	/// JDBC type code
	pub type_code: i32,
	/// Type name as declared in the database
	pub type_name: String,
	pub nullable: bool,
	pub primary_key: bool,
	pub auto_increment: bool,
	/// Character length, or precision for decimal columns
	pub column_size: i32,
	/// Scale for decimal columns
	pub decimal_digits: i32,
	pub remarks: Option<String>,
}

impl Column {
	/// A nullable, non-key column of the given type.
	pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
		Self {
			name: name.into(),
			type_code: sql_type.code(),
			type_name: format!("{:?}", sql_type).to_uppercase(),
			nullable: true,
			primary_key: false,
			auto_increment: false,
			column_size: 0,
			decimal_digits: 0,
			remarks: None,
		}
	}

	pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
		self.type_name = type_name.into();
		self
	}

	pub fn not_null(mut self) -> Self {
		self.nullable = false;
		self
	}

	/// Mark as primary key. Primary key columns are never nullable.
	pub fn primary_key(mut self) -> Self {
		self.primary_key = true;
		self.nullable = false;
		self
	}

	pub fn auto_increment(mut self) -> Self {
		self.auto_increment = true;
		self
	}

	pub fn with_size(mut self, column_size: i32) -> Self {
		self.column_size = column_size;
		self
	}

	pub fn with_precision(mut self, precision: i32, scale: i32) -> Self {
		self.column_size = precision;
		self.decimal_digits = scale;
		self
	}

	pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
		self.remarks = Some(remarks.into());
		self
	}
}

/// One indexed column. Multi-column indexes produce one entry per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
	/// Absent for some engine-generated indexes
	pub name: Option<String>,
	pub column_name: String,
	pub non_unique: bool,
}

impl Index {
	pub fn unique(name: Option<&str>, column_name: impl Into<String>) -> Self {
		Self {
			name: name.map(str::to_string),
			column_name: column_name.into(),
			non_unique: false,
		}
	}

	pub fn non_unique(name: Option<&str>, column_name: impl Into<String>) -> Self {
		Self {
			name: name.map(str::to_string),
			column_name: column_name.into(),
			non_unique: true,
		}
	}
}

/// A foreign-key edge from `foreign_key_table_name.foreign_key_column_name`
/// to `primary_key_table_name.primary_key_column_name`.
///
/// Composite keys are several edges sharing `foreign_key_name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Key {
	pub primary_key_name: String,
	pub primary_key_table_name: String,
	pub primary_key_column_name: String,
	pub foreign_key_name: String,
	pub foreign_key_table_name: String,
	pub foreign_key_column_name: String,
}

impl Key {
	pub fn new(
		primary_key_table_name: impl Into<String>,
		primary_key_column_name: impl Into<String>,
		foreign_key_table_name: impl Into<String>,
		foreign_key_column_name: impl Into<String>,
	) -> Self {
		Self {
			primary_key_table_name: primary_key_table_name.into(),
			primary_key_column_name: primary_key_column_name.into(),
			foreign_key_table_name: foreign_key_table_name.into(),
			foreign_key_column_name: foreign_key_column_name.into(),
			..Default::default()
		}
	}

	pub fn with_names(
		mut self,
		primary_key_name: impl Into<String>,
		foreign_key_name: impl Into<String>,
	) -> Self {
		self.primary_key_name = primary_key_name.into();
		self.foreign_key_name = foreign_key_name.into();
		self
	}
}

/// Table metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
	pub name: String,
	pub schema: Option<String>,
	pub remarks: Option<String>,
	/// Columns in catalog order
	pub columns: Vec<Column>,
	/// Keys where this table is the foreign-key side
	pub imported_keys: Vec<Key>,
	/// Keys where this table is the primary-key side
	pub exported_keys: Vec<Key>,
	pub indexes: Vec<Index>,
}

impl Table {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Default::default()
		}
	}

	pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
		self.schema = Some(schema.into());
		self
	}

	pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
		self.remarks = Some(remarks.into());
		self
	}

	pub fn with_column(mut self, column: Column) -> Self {
		self.columns.push(column);
		self
	}

	pub fn with_imported_key(mut self, key: Key) -> Self {
		self.imported_keys.push(key);
		self
	}

	pub fn with_exported_key(mut self, key: Key) -> Self {
		self.exported_keys.push(key);
		self
	}

	pub fn with_index(mut self, index: Index) -> Self {
		self.indexes.push(index);
		self
	}

	pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
		self.columns.iter().filter(|c| c.primary_key)
	}

	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.iter().find(|c| c.name == name)
	}

	/// Whether some unique index lists the column.
	pub fn is_unique(&self, column_name: &str) -> bool {
		self.indexes
			.iter()
			.any(|idx| idx.column_name == column_name && !idx.non_unique)
	}

	/// The first imported key whose foreign-key column is `column_name`.
	pub fn imported_key_for(&self, column_name: &str) -> Option<&Key> {
		self.imported_keys
			.iter()
			.find(|key| key.foreign_key_column_name == column_name)
	}
}

/// Source of table metadata.
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
	/// Table names in catalog order
	async fn table_names(&self) -> Result<Vec<String>, MetadataError>;

	/// Columns, keys and indexes of one table
	async fn fetch_table(&self, name: &str) -> Result<Table, MetadataError>;
}
