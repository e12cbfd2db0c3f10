use super::{MetadataError, MetadataFetcher, Table};
use async_trait::async_trait;

/// In-memory metadata source over prebuilt tables.
///
/// Table names are reported in insertion order.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
	tables: Vec<Table>,
}

impl StaticMetadata {
	pub fn new(tables: Vec<Table>) -> Self {
		Self { tables }
	}

	pub fn with_table(mut self, table: Table) -> Self {
		self.tables.push(table);
		self
	}

	/// Fill every table's exported keys from the imported keys of the others.
	///
	/// Lets tests and embedders describe each foreign key once, on the
	/// referencing table. Existing exported keys are replaced.
	pub fn with_derived_exported_keys(mut self) -> Self {
		let imported: Vec<_> = self
			.tables
			.iter()
			.flat_map(|t| t.imported_keys.iter().cloned())
			.collect();

		for table in &mut self.tables {
			table.exported_keys = imported
				.iter()
				.filter(|key| key.primary_key_table_name == table.name)
				.cloned()
				.collect();
		}
		self
	}
}

#[async_trait]
impl MetadataFetcher for StaticMetadata {
	async fn table_names(&self) -> Result<Vec<String>, MetadataError> {
		Ok(self.tables.iter().map(|t| t.name.clone()).collect())
	}

	async fn fetch_table(&self, name: &str) -> Result<Table, MetadataError> {
		self.tables
			.iter()
			.find(|t| t.name == name)
			.cloned()
			.ok_or_else(|| MetadataError::TableNotFound {
				name: name.to_string(),
			})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::metadata::{Column, Key};
	use crate::sql_types::SqlType;

	fn schema() -> StaticMetadata {
		StaticMetadata::default()
			.with_table(Table::new("BLOG").with_column(Column::new("ID", SqlType::Integer).primary_key()))
			.with_table(
				Table::new("ARTICLE")
					.with_column(Column::new("ID", SqlType::Integer).primary_key())
					.with_column(Column::new("BLOG_ID", SqlType::Integer))
					.with_imported_key(Key::new("BLOG", "ID", "ARTICLE", "BLOG_ID")),
			)
	}

	#[tokio::test]
	async fn test_table_names_keep_insertion_order() {
		let names = schema().table_names().await.unwrap();
		assert_eq!(names, vec!["BLOG".to_string(), "ARTICLE".to_string()]);
	}

	#[tokio::test]
	async fn test_fetch_missing_table() {
		let err = schema().fetch_table("NOPE").await.unwrap_err();
		assert!(matches!(err, MetadataError::TableNotFound { ref name } if name == "NOPE"));
	}

	#[tokio::test]
	async fn test_derived_exported_keys() {
		let metadata = schema().with_derived_exported_keys();
		let blog = metadata.fetch_table("BLOG").await.unwrap();
		assert_eq!(blog.exported_keys.len(), 1);
		assert_eq!(blog.exported_keys[0].foreign_key_table_name, "ARTICLE");

		let article = metadata.fetch_table("ARTICLE").await.unwrap();
		assert!(article.exported_keys.is_empty());
	}
}
