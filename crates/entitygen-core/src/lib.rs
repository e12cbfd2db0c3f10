//! # Entitygen Core
//!
//! Schema-to-entity mapping: reads relational table metadata and assembles
//! JPA entity classes from it. It follows the Database-First approach, the
//! mirror image of a migration autodetector.
//!
//! ## Features
//!
//! - **Metadata Model**: `Table`, `Column`, `Index` and `Key` values fetched
//!   through a [`MetadataFetcher`]
//! - **Type Mapping**: JDBC type codes to Java scalar types, with primitive
//!   narrowing for non-nullable columns
//! - **Rules**: class and field scoped rules overriding names, types,
//!   annotations, default values, comments and interfaces
//! - **Entity Assembly**: one deterministic Java source file per table,
//!   including `@ManyToOne` / `@OneToMany` relationships
//!
//! ## Usage
//!
//! ```rust,ignore
//! use entitygen_core::{EntityGenerator, GeneratorConfig, SqliteMetadataFetcher};
//!
//! let config = GeneratorConfig::from_file("entitygen.yml", &Default::default())?;
//! let fetcher = SqliteMetadataFetcher::connect("sqlite://app.db").await?;
//! let report = EntityGenerator::new(config).generate(&fetcher).await?;
//! entitygen_core::write_output(&report.files, false)?;
//! ```

pub mod assembler;
pub mod config;
pub mod generator;
pub mod metadata;
pub mod naming;
pub mod render;
pub mod rule;
pub mod sql_types;

pub use assembler::EntityAssembler;
pub use config::{CliArgs, ConfigError, DatabaseSettings, GeneratorConfig, TableScanMode};
pub use generator::{
	EntityGenerator, GeneratedFile, GenerationReport, TableFailure, filter_table_names,
	output_path, preview_output, write_output,
};
#[cfg(feature = "sqlite")]
pub use metadata::SqliteMetadataFetcher;
pub use metadata::{Column, Index, Key, MetadataError, MetadataFetcher, StaticMetadata, Table};
pub use naming::{pluralize, sanitize_identifier, to_class_name, to_field_name, to_list_field_name};
pub use render::{EntityClass, EntityField, FieldKind, JavaAnnotation, MemberValue};
pub use rule::{
	AdditionalCodePosition, AdditionalCodeRule, Annotation, AnnotationAttribute,
	ClassAdditionalCommentRule, ClassAnnotationRule, ClassMatcher, ClassNameRule, ClassTarget,
	FieldAdditionalCommentRule, FieldAnnotationRule, FieldDefaultValueRule, FieldMatcher,
	FieldTarget, FieldTypeRule, ImportRule, Interface, InterfaceRule, Pattern, TableExclusionRule,
	TableMatcher, TableScanRule, TableTarget,
};
pub use sql_types::{SqlType, to_java_type, to_primitive_if_possible};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EntityGenError {
	#[error("Entity {class_name} (table {table_name}) has no @Id field")]
	SchemaIntegrity {
		table_name: String,
		class_name: String,
	},

	#[error("Configuration error: {0}")]
	Configuration(#[from] ConfigError),

	#[error("Metadata fetch error: {0}")]
	MetadataFetch(#[from] MetadataError),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("File already exists: {}", path.display())]
	AlreadyExists { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, EntityGenError>;
