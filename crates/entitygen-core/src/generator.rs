//! Generation driver.
//!
//! Selects tables through the scan and exclusion rules, assembles one entity
//! per table and lays the results out as Java source files. A table that
//! fails is reported in the [`GenerationReport`] and does not stop the
//! others.

use crate::assembler::EntityAssembler;
use crate::config::{GeneratorConfig, TableScanMode};
use crate::metadata::MetadataFetcher;
use crate::rule::TableMatcher;
use crate::{EntityGenError, Result};
use std::path::PathBuf;

/// A single generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
	pub class_name: String,
	/// Path where the file should be written
	pub path: PathBuf,
	/// File content
	pub content: String,
}

impl GeneratedFile {
	pub fn new(
		class_name: impl Into<String>,
		path: impl Into<PathBuf>,
		content: impl Into<String>,
	) -> Self {
		Self {
			class_name: class_name.into(),
			path: path.into(),
			content: content.into(),
		}
	}
}

/// A table that could not be generated.
#[derive(Debug)]
pub struct TableFailure {
	pub table_name: String,
	pub error: EntityGenError,
}

/// Outcome of one generation run.
#[derive(Debug, Default)]
pub struct GenerationReport {
	/// Generated files, in table selection order
	pub files: Vec<GeneratedFile>,
	pub failures: Vec<TableFailure>,
}

impl GenerationReport {
	pub fn is_success(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Select the tables to generate.
///
/// `All` keeps every name and `RuleBased` keeps names matched by a scan
/// rule; `RuleBased` without any scan rule keeps every name. Exclusion rules
/// then remove names in both modes. Input order is preserved.
pub fn filter_table_names(config: &GeneratorConfig, names: Vec<String>) -> Vec<String> {
	let use_scan_rules =
		config.table_scan_mode == TableScanMode::RuleBased && !config.table_scan_rules.is_empty();
	if config.table_scan_mode == TableScanMode::RuleBased && !use_scan_rules {
		tracing::warn!("Table scan mode is RuleBased but no table scan rules are configured, scanning all tables");
	}

	names
		.into_iter()
		.filter(|name| !use_scan_rules || config.table_scan_rules.iter().any(|rule| rule.matches(name)))
		.filter(|name| {
			let excluded = config
				.table_exclusion_rules
				.iter()
				.any(|rule| rule.matches(name));
			if excluded {
				tracing::debug!(table = %name, "Table excluded");
			}
			!excluded
		})
		.collect()
}

/// Path of the source file for `class_name`:
/// `<output dir>/<package as directories>/<ClassName>.java`.
pub fn output_path(config: &GeneratorConfig, class_name: &str) -> PathBuf {
	let mut path = config.output_directory.clone();
	for segment in config.package_name.split('.').filter(|s| !s.is_empty()) {
		path.push(segment);
	}
	path.push(format!("{}.java", class_name));
	path
}

/// Generates entity sources for a whole schema.
pub struct EntityGenerator {
	config: GeneratorConfig,
}

impl EntityGenerator {
	pub fn new(config: GeneratorConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &GeneratorConfig {
		&self.config
	}

	/// Names of the tables that would be generated.
	pub async fn selected_tables(&self, fetcher: &dyn MetadataFetcher) -> Result<Vec<String>> {
		let names = fetcher.table_names().await?;
		Ok(filter_table_names(&self.config, names))
	}

	/// Generate every selected table.
	///
	/// # Errors
	///
	/// Returns an error only if the table list cannot be fetched. Per-table
	/// failures are collected in the report.
	pub async fn generate(&self, fetcher: &dyn MetadataFetcher) -> Result<GenerationReport> {
		let tables = self.selected_tables(fetcher).await?;
		let assembler = EntityAssembler::new(&self.config);
		let mut report = GenerationReport::default();

		for table_name in tables {
			let generated = match fetcher.fetch_table(&table_name).await {
				Ok(table) => assembler.assemble_entity(&table),
				Err(e) => Err(EntityGenError::from(e)),
			};

			match generated {
				Ok(entity) => {
					let path = output_path(&self.config, &entity.class_name);
					let content = entity.render();
					report
						.files
						.push(GeneratedFile::new(entity.class_name, path, content));
				}
				Err(error) => {
					tracing::warn!(table = %table_name, error = %error, "Skipping table");
					report.failures.push(TableFailure { table_name, error });
				}
			}
		}

		tracing::info!(
			generated = report.files.len(),
			failed = report.failures.len(),
			"Entity generation finished"
		);
		Ok(report)
	}
}

/// Write generated files to disk.
///
/// Parent directories are created as needed. Existing files are only
/// overwritten with `force`; without it nothing is written if any target
/// exists.
pub fn write_output(files: &[GeneratedFile], force: bool) -> Result<()> {
	if !force && let Some(existing) = files.iter().find(|f| f.path.exists()) {
		return Err(EntityGenError::AlreadyExists {
			path: existing.path.clone(),
		});
	}

	for file in files {
		if let Some(parent) = file.path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&file.path, &file.content)?;
		tracing::debug!(path = %file.path.display(), "Wrote entity");
	}

	Ok(())
}

/// Preview generated code without writing to disk.
///
/// Useful for `--dry-run` mode.
pub fn preview_output(files: &[GeneratedFile]) -> String {
	let mut preview = String::new();

	for file in files {
		preview.push_str(&format!("// === {} ===\n", file.path.display()));
		preview.push_str(&file.content);
		preview.push_str("\n\n");
	}

	preview
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rule::{TableExclusionRule, TableScanRule, TableTarget};
	use rstest::rstest;

	fn names() -> Vec<String> {
		["ARTICLE", "BLOG", "flyway_schema_history", "TAG"]
			.into_iter()
			.map(String::from)
			.collect()
	}

	#[test]
	fn test_scan_all_keeps_everything() {
		let config = GeneratorConfig::default();
		assert_eq!(filter_table_names(&config, names()), names());
	}

	#[test]
	fn test_rule_based_scan() {
		let mut config = GeneratorConfig::default().with_table_scan_mode(TableScanMode::RuleBased);
		config.table_scan_rules = vec![
			TableScanRule::new(TableTarget::table("BLOG").unwrap()),
			TableScanRule::new(TableTarget::tables(["ART.*"]).unwrap()),
		];
		assert_eq!(filter_table_names(&config, names()), vec!["ARTICLE", "BLOG"]);
	}

	#[test]
	fn test_rule_based_scan_without_rules_keeps_every_table() {
		let config = GeneratorConfig::default().with_table_scan_mode(TableScanMode::RuleBased);
		assert_eq!(filter_table_names(&config, names()), names());

		let mut config = config;
		config.table_exclusion_rules = vec![TableExclusionRule::new(
			TableTarget::table("flyway_.*").unwrap(),
		)];
		assert_eq!(filter_table_names(&config, names()), vec!["ARTICLE", "BLOG", "TAG"]);
	}

	#[rstest]
	#[case(TableScanMode::All, vec!["ARTICLE", "BLOG", "TAG"])]
	#[case(TableScanMode::RuleBased, vec!["ARTICLE", "TAG"])]
	fn test_exclusion_applies_in_every_mode(#[case] mode: TableScanMode, #[case] expected: Vec<&str>) {
		let mut config = GeneratorConfig::default().with_table_scan_mode(mode);
		config.table_scan_rules = vec![TableScanRule::new(
			TableTarget::tables(["ARTICLE", "TAG", "flyway_.*"]).unwrap(),
		)];
		config.table_exclusion_rules = vec![TableExclusionRule::new(
			TableTarget::table("flyway_.*").unwrap(),
		)];
		assert_eq!(filter_table_names(&config, names()), expected);
	}

	#[test]
	fn test_output_path() {
		let config = GeneratorConfig::default()
			.with_output_dir("out")
			.with_package_name("com.example.blog");
		assert_eq!(
			output_path(&config, "Article"),
			PathBuf::from("out/com/example/blog/Article.java")
		);

		let config = GeneratorConfig::default().with_output_dir("out").with_package_name("");
		assert_eq!(output_path(&config, "Article"), PathBuf::from("out/Article.java"));
	}

	#[test]
	fn test_write_output_refuses_to_overwrite() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("com/example/Blog.java");
		let files = vec![GeneratedFile::new("Blog", &path, "class Blog {}\n")];

		write_output(&files, false).unwrap();
		assert_eq!(std::fs::read_to_string(&path).unwrap(), "class Blog {}\n");

		let err = write_output(&files, false).unwrap_err();
		assert!(matches!(err, EntityGenError::AlreadyExists { .. }));

		let files = vec![GeneratedFile::new("Blog", &path, "class Blog { int x; }\n")];
		write_output(&files, true).unwrap();
		assert_eq!(std::fs::read_to_string(&path).unwrap(), "class Blog { int x; }\n");
	}

	#[test]
	fn test_preview_output() {
		let files = vec![
			GeneratedFile::new("Blog", "out/Blog.java", "class Blog {}"),
			GeneratedFile::new("Tag", "out/Tag.java", "class Tag {}"),
		];
		let preview = preview_output(&files);
		assert!(preview.contains("// === out/Blog.java ===\nclass Blog {}\n\n"));
		assert!(preview.contains("// === out/Tag.java ===\nclass Tag {}\n\n"));
	}
}
