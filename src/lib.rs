//! # Entitygen
//!
//! Generates JPA entity classes from an existing relational database schema.
//!
//! Entitygen reads table metadata (columns, keys, unique indexes), applies a
//! set of user rules and writes one Java source file per table, complete with
//! `@ManyToOne` and `@OneToMany` relationships. Output is deterministic: an
//! unchanged schema and configuration always produce byte-identical files.
//!
//! ## Feature Flags
//!
//! - `sqlite` (default) - SQLite metadata fetcher via `sqlx`
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use entitygen::{EntityGenerator, GeneratorConfig, SqliteMetadataFetcher};
//!
//! let config = GeneratorConfig::default()
//!     .with_database_url("sqlite://blog.db")
//!     .with_package_name("com.example.blog");
//!
//! let fetcher = SqliteMetadataFetcher::connect(config.database.resolve_url()?).await?;
//! let report = EntityGenerator::new(config).generate(&fetcher).await?;
//! entitygen::write_output(&report.files, false)?;
//! ```
//!
//! Without a database, tables can be described directly:
//!
//! ```rust
//! use entitygen::{Column, EntityAssembler, GeneratorConfig, SqlType, Table};
//!
//! let table = Table::new("BLOG")
//!     .with_column(Column::new("ID", SqlType::Integer).primary_key())
//!     .with_column(Column::new("NAME", SqlType::VarChar).not_null().with_size(100));
//!
//! let config = GeneratorConfig::default();
//! let source = EntityAssembler::new(&config).assemble(&table).unwrap();
//! assert!(source.contains("public class Blog {"));
//! ```

pub use entitygen_core::*;
