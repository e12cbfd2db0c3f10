//! Configuration for entity generation.
//!
//! Supports YAML and TOML configuration files and CLI argument overrides.
//! Keys are camelCase in both formats:
//!
//! ```yaml
//! database:
//!   url: sqlite://${APP_HOME}/app.db
//! packageName: com.example.blog.entity
//! tableScanMode: RuleBased
//! tableScanRules:
//!   - tableNames: [BLOG, "ARTICLE.*"]
//! fieldTypeRules:
//!   - className: Article
//!     fieldName: status
//!     typeName: com.example.blog.ArticleStatus
//! ```

use crate::rule::{
	AdditionalCodeRule, ClassAdditionalCommentRule, ClassAnnotationRule, ClassNameRule,
	FieldAdditionalCommentRule, FieldAnnotationRule, FieldDefaultValueRule, FieldTypeRule,
	ImportRule, InterfaceRule, TableExclusionRule, TableScanRule, null_as_empty,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

static ENV_PLACEHOLDER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder regex is valid"));

/// Main configuration for entity generation.
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
	/// Database connection settings
	pub database: DatabaseSettings,

	/// Root directory of generated sources
	pub output_directory: PathBuf,

	/// Java package of generated entities
	pub package_name: String,

	pub table_scan_mode: TableScanMode,
	#[serde(deserialize_with = "null_as_empty")]
	pub table_scan_rules: Vec<TableScanRule>,
	#[serde(deserialize_with = "null_as_empty")]
	pub table_exclusion_rules: Vec<TableExclusionRule>,

	/// `GenerationType` constant for `@GeneratedValue`. `None` or blank
	/// emits the annotation without a strategy.
	pub generated_value_strategy: Option<String>,

	/// Use `int`, `long`, ... for non-nullable numeric and boolean columns
	pub use_primitive_for_non_null_field: bool,

	/// Map foreign keys to `@ManyToOne` / `@OneToMany` fields
	pub generate_relationships: bool,

	/// Emit `@Data @Builder @NoArgsConstructor @AllArgsConstructor`
	pub lombok_enabled: bool,

	#[serde(deserialize_with = "null_as_empty")]
	pub import_rules: Vec<ImportRule>,
	#[serde(deserialize_with = "null_as_empty")]
	pub class_name_rules: Vec<ClassNameRule>,
	#[serde(deserialize_with = "null_as_empty")]
	pub class_annotation_rules: Vec<ClassAnnotationRule>,
	#[serde(deserialize_with = "null_as_empty")]
	pub interface_rules: Vec<InterfaceRule>,
	#[serde(deserialize_with = "null_as_empty")]
	pub class_additional_comment_rules: Vec<ClassAdditionalCommentRule>,
	#[serde(deserialize_with = "null_as_empty")]
	pub field_type_rules: Vec<FieldTypeRule>,
	#[serde(deserialize_with = "null_as_empty")]
	pub field_annotation_rules: Vec<FieldAnnotationRule>,
	#[serde(deserialize_with = "null_as_empty")]
	pub field_default_value_rules: Vec<FieldDefaultValueRule>,
	#[serde(deserialize_with = "null_as_empty")]
	pub field_additional_comment_rules: Vec<FieldAdditionalCommentRule>,
	#[serde(deserialize_with = "null_as_empty")]
	pub additional_code_rules: Vec<AdditionalCodeRule>,
}

impl Default for GeneratorConfig {
	fn default() -> Self {
		Self {
			database: DatabaseSettings::default(),
			output_directory: PathBuf::from("src/main/java"),
			package_name: "com.example.entity".to_string(),
			table_scan_mode: TableScanMode::All,
			table_scan_rules: Vec::new(),
			table_exclusion_rules: Vec::new(),
			generated_value_strategy: Some("IDENTITY".to_string()),
			use_primitive_for_non_null_field: false,
			generate_relationships: true,
			lombok_enabled: true,
			import_rules: Vec::new(),
			class_name_rules: Vec::new(),
			class_annotation_rules: Vec::new(),
			interface_rules: Vec::new(),
			class_additional_comment_rules: Vec::new(),
			field_type_rules: Vec::new(),
			field_annotation_rules: Vec::new(),
			field_default_value_rules: Vec::new(),
			field_additional_comment_rules: Vec::new(),
			additional_code_rules: Vec::new(),
		}
	}
}

impl GeneratorConfig {
	pub fn with_database_url(mut self, url: &str) -> Self {
		self.database.url = url.to_string();
		self
	}

	pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.output_directory = dir.into();
		self
	}

	pub fn with_package_name(mut self, package_name: &str) -> Self {
		self.package_name = package_name.to_string();
		self
	}

	pub fn with_table_scan_mode(mut self, mode: TableScanMode) -> Self {
		self.table_scan_mode = mode;
		self
	}

	pub fn with_generated_value_strategy(mut self, strategy: Option<&str>) -> Self {
		self.generated_value_strategy = strategy.map(str::to_string);
		self
	}

	pub fn with_primitive_for_non_null_field(mut self, enabled: bool) -> Self {
		self.use_primitive_for_non_null_field = enabled;
		self
	}

	pub fn with_relationships(mut self, enabled: bool) -> Self {
		self.generate_relationships = enabled;
		self
	}

	pub fn with_lombok(mut self, enabled: bool) -> Self {
		self.lombok_enabled = enabled;
		self
	}

	/// Load configuration from a file.
	///
	/// Files ending in `.toml` are parsed as TOML, anything else as YAML.
	/// `${NAME}` placeholders in the database settings are then resolved
	/// against `env` first and the process environment second.
	///
	/// # Errors
	///
	/// Returns error if the file cannot be read or parsed, or if a rule
	/// target is not a valid regular expression.
	pub fn from_file(
		path: impl AsRef<Path>,
		env: &HashMap<String, String>,
	) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
			path: path.to_path_buf(),
			source: e,
		})?;

		let is_toml = path
			.extension()
			.is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
		let mut config = if is_toml {
			Self::from_toml(&content)?
		} else {
			Self::from_yaml(&content)?
		};

		config.substitute_env(env);
		tracing::debug!(path = %path.display(), "Loaded generator configuration");
		Ok(config)
	}

	/// Parse configuration from a YAML string.
	pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
		// An empty document is a valid, all-default configuration
		if content.trim().is_empty() {
			return Ok(Self::default());
		}
		serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
			message: e.to_string(),
		})
	}

	/// Parse configuration from a TOML string.
	pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
		toml::from_str(content).map_err(|e| ConfigError::ParseError {
			message: e.to_string(),
		})
	}

	/// Resolve `${NAME}` placeholders in the database settings.
	///
	/// Unknown names are left as written.
	pub fn substitute_env(&mut self, env: &HashMap<String, String>) {
		let settings = &mut self.database;
		settings.url = replace_env_placeholders(&settings.url, env);
		for value in [
			&mut settings.username,
			&mut settings.password,
			&mut settings.schema_pattern,
		]
		.into_iter()
		.flatten()
		{
			*value = replace_env_placeholders(value, env);
		}
	}

	/// The `@GeneratedValue` strategy, if one should be emitted.
	pub fn generation_strategy(&self) -> Option<&str> {
		self.generated_value_strategy
			.as_deref()
			.map(str::trim)
			.filter(|s| !s.is_empty())
	}

	/// Merge CLI arguments into configuration.
	///
	/// CLI arguments take precedence over config file values.
	pub fn merge_cli_args(&mut self, args: &CliArgs) {
		if let Some(ref url) = args.database_url {
			self.database.url = url.clone();
		}

		if let Some(ref dir) = args.output_dir {
			self.output_directory = dir.clone();
		}

		if let Some(ref package_name) = args.package_name {
			self.package_name = package_name.clone();
		}
	}
}

fn replace_env_placeholders(value: &str, env: &HashMap<String, String>) -> String {
	if !value.contains("${") {
		return value.to_string();
	}

	ENV_PLACEHOLDER
		.replace_all(value, |caps: &regex::Captures<'_>| {
			let name = &caps[1];
			env.get(name)
				.cloned()
				.or_else(|| std::env::var(name).ok())
				.unwrap_or_else(|| caps[0].to_string())
		})
		.into_owned()
}

/// Database connection settings.
#[non_exhaustive]
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatabaseSettings {
	/// Connection URL, e.g. `sqlite://app.db`
	///
	/// Can include environment variable references: "${DATABASE_URL}"
	pub url: String,
	pub username: Option<String>,
	pub password: Option<String>,
	/// Schema name pattern for catalog lookups. SQLite has no schemas, so
	/// `SqliteMetadataFetcher` ignores it.
	pub schema_pattern: Option<String>,
}

impl DatabaseSettings {
	/// The configured URL.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::MissingDatabaseUrl`] if no URL is configured.
	pub fn resolve_url(&self) -> Result<&str, ConfigError> {
		if self.url.trim().is_empty() {
			Err(ConfigError::MissingDatabaseUrl)
		} else {
			Ok(&self.url)
		}
	}
}

impl fmt::Debug for DatabaseSettings {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DatabaseSettings")
			.field("url", &self.url)
			.field("username", &self.username)
			.field("password", &self.password.as_ref().map(|_| "***"))
			.field("schema_pattern", &self.schema_pattern)
			.finish()
	}
}

/// How tables are selected before exclusion rules apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TableScanMode {
	/// Every table reported by the metadata source
	#[default]
	All,
	/// Only tables matched by a table scan rule
	RuleBased,
}

impl FromStr for TableScanMode {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"all" => Ok(TableScanMode::All),
			"rulebased" => Ok(TableScanMode::RuleBased),
			_ => Err(ConfigError::InvalidScanMode {
				value: s.to_string(),
			}),
		}
	}
}

impl TryFrom<String> for TableScanMode {
	type Error = ConfigError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl From<TableScanMode> for String {
	fn from(mode: TableScanMode) -> Self {
		mode.to_string()
	}
}

impl fmt::Display for TableScanMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TableScanMode::All => f.write_str("All"),
			TableScanMode::RuleBased => f.write_str("RuleBased"),
		}
	}
}

/// CLI arguments that can override config file values.
#[non_exhaustive]
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
	pub database_url: Option<String>,
	pub output_dir: Option<PathBuf>,
	pub package_name: Option<String>,
	pub config_file: Option<PathBuf>,
	pub dry_run: bool,
	pub force: bool,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("IO error reading {}: {source}", path.display())]
	IoError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse configuration: {message}")]
	ParseError { message: String },

	#[error("Invalid regex pattern {pattern:?}: {source}")]
	InvalidPattern {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Invalid table scan mode {value:?} (expected All or RuleBased)")]
	InvalidScanMode { value: String },

	#[error("Database URL not specified. Set database.url in the configuration or use --database-url")]
	MissingDatabaseUrl,
}
