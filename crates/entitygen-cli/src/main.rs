//! Entitygen CLI
//!
//! Generates JPA entity classes from an existing database schema.
//!
//! ## Usage
//!
//! ```bash
//! entitygen generate --config entitygen.yml
//! entitygen generate --config entitygen.yml --dry-run
//! entitygen tables --config entitygen.yml --database-url sqlite://app.db
//! ```

mod logging;

use std::collections::HashMap;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use entitygen_core::{
	CliArgs, EntityGenerator, GenerationReport, GeneratorConfig, SqliteMetadataFetcher,
	preview_output, write_output,
};

#[derive(Parser, Debug)]
#[command(name = "entitygen")]
#[command(about = "Generate JPA entity classes from a database schema", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Verbosity level (can be repeated)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbosity: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
	/// Generate one entity source file per selected table
	Generate {
		/// Generator configuration file (YAML, or TOML with a .toml extension)
		#[arg(short, long, value_name = "FILE")]
		config: PathBuf,

		/// Database URL (overrides database.url)
		#[arg(long, value_name = "URL")]
		database_url: Option<String>,

		/// Output directory (overrides outputDirectory)
		#[arg(short, long, value_name = "DIR")]
		output_dir: Option<PathBuf>,

		/// Java package of the generated entities (overrides packageName)
		#[arg(short, long, value_name = "NAME")]
		package: Option<String>,

		/// Print the generated sources instead of writing them
		#[arg(long)]
		dry_run: bool,

		/// Overwrite existing files
		#[arg(long)]
		force: bool,
	},

	/// List the tables selected by the scan and exclusion rules
	Tables {
		/// Generator configuration file (YAML, or TOML with a .toml extension)
		#[arg(short, long, value_name = "FILE")]
		config: PathBuf,

		/// Database URL (overrides database.url)
		#[arg(long, value_name = "URL")]
		database_url: Option<String>,
	},
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_tracing(cli.verbosity);

	let result = match cli.command {
		Commands::Generate {
			config,
			database_url,
			output_dir,
			package,
			dry_run,
			force,
		} => {
			let mut args = CliArgs::default();
			args.config_file = Some(config);
			args.database_url = database_url;
			args.output_dir = output_dir;
			args.package_name = package;
			args.dry_run = dry_run;
			args.force = force;
			run_generate(&args).await
		}
		Commands::Tables {
			config,
			database_url,
		} => {
			let mut args = CliArgs::default();
			args.config_file = Some(config);
			args.database_url = database_url;
			run_tables(&args).await
		}
	};

	match result {
		Ok(true) => {}
		Ok(false) => process::exit(1),
		Err(e) => {
			eprintln!("{} {:#}", "Error:".red().bold(), e);
			process::exit(1);
		}
	}
}

/// Load the configuration file and apply command-line overrides.
fn load_config(args: &CliArgs) -> anyhow::Result<GeneratorConfig> {
	let mut config = match &args.config_file {
		Some(path) => {
			let env: HashMap<String, String> = std::env::vars().collect();
			GeneratorConfig::from_file(path, &env)
				.with_context(|| format!("Failed to load {}", path.display()))?
		}
		None => GeneratorConfig::default(),
	};
	config.merge_cli_args(args);
	Ok(config)
}

async fn connect(config: &GeneratorConfig) -> anyhow::Result<SqliteMetadataFetcher> {
	let url = config.database.resolve_url()?;
	tracing::info!(url = %url, "Connecting to database");
	SqliteMetadataFetcher::connect(url)
		.await
		.with_context(|| format!("Failed to connect to {}", url))
}

/// Returns `Ok(false)` when at least one table failed.
async fn run_generate(args: &CliArgs) -> anyhow::Result<bool> {
	let config = load_config(args)?;
	let fetcher = connect(&config).await?;

	println!("{}", "Generating entities...".cyan().bold());
	let generator = EntityGenerator::new(config);
	let report = generator.generate(&fetcher).await?;

	if args.dry_run {
		print!("{}", preview_output(&report.files));
	} else {
		write_output(&report.files, args.force)?;
		for file in &report.files {
			println!("  {} {}", "Created:".green(), file.path.display());
		}
	}

	print_summary(&report, args.dry_run);
	Ok(report.is_success())
}

fn print_summary(report: &GenerationReport, dry_run: bool) {
	for failure in &report.failures {
		eprintln!(
			"  {} {}: {}",
			"Failed:".red(),
			failure.table_name,
			failure.error
		);
	}

	let verb = if dry_run { "Previewed" } else { "Generated" };
	let summary = format!("{} {} entity(ies)", verb, report.files.len());
	if report.is_success() {
		println!("\n{}", summary.green().bold());
	} else {
		println!(
			"\n{} {}",
			summary.yellow().bold(),
			format!("({} table(s) failed)", report.failures.len()).red()
		);
	}
}

async fn run_tables(args: &CliArgs) -> anyhow::Result<bool> {
	let config = load_config(args)?;
	let fetcher = connect(&config).await?;

	let tables = EntityGenerator::new(config).selected_tables(&fetcher).await?;
	if tables.is_empty() {
		println!("{}", "No tables selected".yellow());
	}
	for table in &tables {
		println!("{}", table);
	}
	Ok(true)
}
