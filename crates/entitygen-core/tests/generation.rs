//! Generation driver integration tests
//!
//! Runs whole generation passes against metadata sources and checks the
//! produced files.
//!
//! **Test Categories:**
//! - Static metadata: table selection, per-table failure isolation
//! - SQLite: live schema introspection through to files on disk
//! - Output: writing, overwrite protection and dry-run preview

use entitygen_core::{
	Column, EntityGenError, EntityGenerator, GeneratorConfig, Key, MetadataError, SqlType,
	StaticMetadata, Table, TableExclusionRule, TableScanMode, TableScanRule, TableTarget,
	preview_output, write_output,
};
use rstest::*;
use std::path::PathBuf;

#[fixture]
fn schema() -> StaticMetadata {
	StaticMetadata::new(vec![
		Table::new("BLOG")
			.with_column(Column::new("ID", SqlType::Integer).primary_key().auto_increment())
			.with_column(Column::new("NAME", SqlType::VarChar).not_null().with_size(100)),
		Table::new("ARTICLE")
			.with_column(Column::new("ID", SqlType::Integer).primary_key().auto_increment())
			.with_column(Column::new("BLOG_ID", SqlType::Integer).not_null())
			.with_imported_key(Key::new("BLOG", "ID", "ARTICLE", "BLOG_ID")),
		Table::new("AUDIT_TRAIL").with_column(Column::new("MESSAGE", SqlType::LongVarChar)),
		Table::new("flyway_schema_history")
			.with_column(Column::new("installed_rank", SqlType::Integer).primary_key()),
	])
	.with_derived_exported_keys()
}

// ============================================================================
// Static Metadata Tests
// ============================================================================

/// **Test Intent**: A failing table is reported and the remaining tables are still generated
#[rstest]
#[tokio::test]
async fn test_failure_does_not_abort_run(schema: StaticMetadata) {
	let config = GeneratorConfig::default().with_package_name("com.example.blog");
	let report = EntityGenerator::new(config).generate(&schema).await.unwrap();

	let classes: Vec<_> = report.files.iter().map(|f| f.class_name.as_str()).collect();
	assert_eq!(classes, vec!["Blog", "Article", "FlywaySchemaHistory"]);

	assert!(!report.is_success());
	assert_eq!(report.failures.len(), 1);
	assert_eq!(report.failures[0].table_name, "AUDIT_TRAIL");
	assert!(matches!(
		report.failures[0].error,
		EntityGenError::SchemaIntegrity { .. }
	));
}

/// **Test Intent**: Rule-based scanning plus exclusions select only the wanted tables
#[rstest]
#[tokio::test]
async fn test_rule_based_selection(schema: StaticMetadata) {
	let mut config = GeneratorConfig::default().with_table_scan_mode(TableScanMode::RuleBased);
	config.table_scan_rules.push(TableScanRule::new(TableTarget::tables([".*"]).unwrap()));
	config.table_exclusion_rules.push(TableExclusionRule::new(
		TableTarget::tables(["flyway_.*", "AUDIT_.*"]).unwrap(),
	));

	let generator = EntityGenerator::new(config);
	let selected = generator.selected_tables(&schema).await.unwrap();
	assert_eq!(selected, vec!["BLOG", "ARTICLE"]);

	let report = generator.generate(&schema).await.unwrap();
	assert!(report.is_success());
	assert_eq!(report.files.len(), 2);
}

/// **Test Intent**: Derived exported keys produce the inverse side of a relationship
#[rstest]
#[tokio::test]
async fn test_both_sides_of_relationship(schema: StaticMetadata) {
	let config = GeneratorConfig::default();
	let report = EntityGenerator::new(config).generate(&schema).await.unwrap();

	let blog = report.files.iter().find(|f| f.class_name == "Blog").unwrap();
	assert!(blog.content.contains("  @OneToMany(\n      mappedBy = \"blog\"\n  )\n  private List<Article> articles;\n"));

	let article = report.files.iter().find(|f| f.class_name == "Article").unwrap();
	assert!(article.content.contains("  @ManyToOne\n"));
	assert!(article.content.contains("  private Blog blog;\n"));
}

// ============================================================================
// SQLite Tests
// ============================================================================

#[cfg(feature = "sqlite")]
async fn sqlite_schema() -> entitygen_core::SqliteMetadataFetcher {
	let fetcher = entitygen_core::SqliteMetadataFetcher::connect("sqlite::memory:")
		.await
		.expect("Failed to connect");

	for ddl in [
		"CREATE TABLE BLOG (ID INTEGER PRIMARY KEY, NAME VARCHAR(100) NOT NULL)",
		"CREATE TABLE ARTICLE (
			ID INTEGER PRIMARY KEY,
			BLOG_ID INTEGER NOT NULL REFERENCES BLOG(ID),
			TITLE VARCHAR(200) NOT NULL,
			PRICE DECIMAL(9,2)
		)",
		"CREATE TABLE AUDIT_TRAIL (MESSAGE TEXT)",
		"CREATE VIEW BLOG_SUMMARY AS SELECT ID, NAME FROM BLOG",
	] {
		sqlx::query(ddl)
			.execute(fetcher.pool())
			.await
			.expect("Failed to create schema");
	}
	fetcher
}

/// **Test Intent**: A live SQLite schema generates entity files into the package directory
#[cfg(feature = "sqlite")]
#[rstest]
#[tokio::test]
async fn test_sqlite_end_to_end() {
	let fetcher = sqlite_schema().await;
	let dir = tempfile::tempdir().unwrap();
	let config = GeneratorConfig::default()
		.with_output_dir(dir.path())
		.with_package_name("com.example.blog");

	let report = EntityGenerator::new(config).generate(&fetcher).await.unwrap();

	let classes: Vec<_> = report.files.iter().map(|f| f.class_name.as_str()).collect();
	assert_eq!(classes, vec!["Article", "Blog"]);
	assert_eq!(report.failures.len(), 1);
	assert_eq!(report.failures[0].table_name, "AUDIT_TRAIL");

	write_output(&report.files, false).unwrap();

	let article_path: PathBuf = dir.path().join("com/example/blog/Article.java");
	let article = std::fs::read_to_string(&article_path).unwrap();
	assert!(article.starts_with("package com.example.blog;\n"));
	assert!(article.contains("  @Id\n  @GeneratedValue(\n      strategy = GenerationType.IDENTITY\n  )\n  private Integer id;\n"));
	assert!(article.contains("      length = 200\n"));
	assert!(article.contains("      precision = 9,\n      scale = 2\n"));
	assert!(article.contains("      referencedColumnName = \"ID\",\n      nullable = false\n"));

	let blog = std::fs::read_to_string(dir.path().join("com/example/blog/Blog.java")).unwrap();
	assert!(blog.contains("private List<Article> articles;"));

	// Second run without force leaves the files untouched
	let err = write_output(&report.files, false).unwrap_err();
	assert!(matches!(err, EntityGenError::AlreadyExists { .. }));
	write_output(&report.files, true).unwrap();
}

/// **Test Intent**: Fetching a table that does not exist is reported as a per-table failure
#[cfg(feature = "sqlite")]
#[rstest]
#[tokio::test]
async fn test_sqlite_missing_table_error() {
	use entitygen_core::MetadataFetcher;

	let fetcher = sqlite_schema().await;
	let err = fetcher.fetch_table("MISSING").await.unwrap_err();
	assert!(matches!(err, MetadataError::TableNotFound { ref name } if name == "MISSING"));
}

// ============================================================================
// Output Tests
// ============================================================================

/// **Test Intent**: Dry-run preview lists every file with its target path
#[rstest]
#[tokio::test]
async fn test_preview(schema: StaticMetadata) {
	let config = GeneratorConfig::default()
		.with_output_dir("out")
		.with_package_name("com.example");
	let report = EntityGenerator::new(config).generate(&schema).await.unwrap();

	let preview = preview_output(&report.files);
	assert!(preview.contains("// === out/com/example/Blog.java ===\npackage com.example;\n"));
	assert!(preview.contains("// === out/com/example/Article.java ==="));
}
