//! Member Base - validation and sanitization tooling for tenant apps.
//!
//! Checks plugin manifests and tenant configurations, and scrubs JSON
//! payloads before they are shared.

#![allow(clippy::single_match_else)]

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use serde_json::{json, Value};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

use memberbase::plugin::{PluginCatalog, PluginError, PluginManifest, CATALOG_FILE, MANIFEST_FILES};
use memberbase::security::{validate_email, validate_id, validate_phone, validate_string, IdKind};
use memberbase::tenant::{
    normalize_tenant_id, validate_all_tenants, validate_company_initial, validate_logo_path,
    validate_package_name, TenantSet, TENANTS_FILE,
};
use memberbase::{logging, Config, ValidationResult};

/// Validation and sanitization tooling for Member Base tenant apps
#[derive(Parser)]
#[command(name = "memberbase")]
#[command(author, version, long_about = None)]
#[command(about = "Validation and sanitization tooling for Member Base tenant apps")]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate plugin manifests (files or directories)
    Manifest {
        /// Manifest files, or directories scanned for plugin.json / plugin.toml
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Validate every entry of a plugin catalog
    Catalog {
        /// Catalog file
        #[arg(default_value = CATALOG_FILE)]
        path: PathBuf,
    },

    /// Validate tenant configurations against the plugin catalog
    Tenants {
        /// Tenants file
        #[arg(long, default_value = TENANTS_FILE)]
        tenants: PathBuf,

        /// Plugin catalog file
        #[arg(long, default_value = CATALOG_FILE)]
        plugins: PathBuf,
    },

    /// Redact sensitive fields from JSON read from a file or stdin
    Sanitize {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Run a single input check
    Check {
        /// Kind of value
        #[arg(value_enum)]
        kind: CheckKind,

        /// Value to check
        value: String,
    },

    /// Print the normalized form of a tenant id
    NormalizeId {
        /// Tenant id
        id: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CheckKind {
    String,
    Email,
    Phone,
    Uuid,
    NumericId,
    PackageName,
    CompanyInitial,
    LogoPath,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose { EnvFilter::new("debug") } else { EnvFilter::new("warn") };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();

    let config = Config::load()?;
    logging::set_config(|logger_config| config.logging.apply(logger_config));
    logging::replace_sanitizer(config.sanitizer());

    let success = match cli.command {
        Commands::Manifest { paths } => cmd_manifest(&paths, &config)?,
        Commands::Catalog { path } => cmd_catalog(&path)?,
        Commands::Tenants { tenants, plugins } => cmd_tenants(&tenants, &plugins)?,
        Commands::Sanitize { file } => {
            cmd_sanitize(file.as_deref(), &config)?;
            true
        }
        Commands::Check { kind, value } => cmd_check(kind, &value),
        Commands::NormalizeId { id } => {
            println!("{}", normalize_tenant_id(&id));
            true
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
            true
        }
        Commands::Config { path } => {
            cmd_config(&config, path)?;
            true
        }
    };

    if !success {
        std::process::exit(1);
    }

    Ok(())
}

/// Manifest files named by `paths`, walking directories.
fn collect_manifest_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let found = WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(std::result::Result::ok)
                .filter(|entry| entry.file_type().is_file())
                .filter(|entry| {
                    entry.file_name().to_str().is_some_and(|name| MANIFEST_FILES.contains(&name))
                })
                .map(walkdir::DirEntry::into_path);
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    files.sort();
    files
}

/// Validate manifests; returns false if any is rejected.
fn cmd_manifest(paths: &[PathBuf], config: &Config) -> Result<bool> {
    let log = logging::logger().child("cli:manifest");
    let files = collect_manifest_files(paths);

    if files.is_empty() {
        println!("No manifests found.");
        return Ok(false);
    }

    let mut failures = 0;
    for file in &files {
        log.debug("validating manifest", &[json!({ "path": file.display().to_string() })]);

        let outcome = PluginManifest::from_file(file)
            .and_then(|manifest| manifest.check_allowed(&config.manifest.allowed_types).map(|()| manifest));

        match outcome {
            Ok(manifest) => {
                println!(
                    "{}: ok ({} v{}, {})",
                    file.display(),
                    manifest.id,
                    manifest.version,
                    manifest.plugin_type
                );
            }
            Err(PluginError::InvalidManifest { errors }) => {
                failures += 1;
                for error in &errors {
                    println!("{}: {}", file.display(), error);
                }
            }
            Err(e) => {
                failures += 1;
                println!("{}: {}", file.display(), e);
            }
        }
    }

    println!("\n{} manifest(s) checked, {} invalid", files.len(), failures);
    Ok(failures == 0)
}

/// Validate catalog entries; returns false if any is rejected.
fn cmd_catalog(path: &Path) -> Result<bool> {
    let catalog = PluginCatalog::load(path)
        .with_context(|| format!("Failed to load plugin catalog {}", path.display()))?;

    let mut valid = true;
    for (id, report) in catalog.validate_entries() {
        if report.valid {
            println!("{}: ok", id);
            continue;
        }

        valid = false;
        for error in &report.errors {
            println!("{}: {}", id, error);
        }
    }

    Ok(valid)
}

fn cmd_tenants(tenants_path: &Path, plugins_path: &Path) -> Result<bool> {
    let catalog = PluginCatalog::load(plugins_path)
        .with_context(|| format!("Failed to load plugin catalog {}", plugins_path.display()))?;
    let tenants = TenantSet::load(tenants_path)?;

    match validate_all_tenants(&tenants, &catalog) {
        ValidationResult::Valid => {
            println!("All {} tenant(s) valid", tenants.len());
            Ok(true)
        }
        ValidationResult::Invalid(failure) => {
            println!("{}", failure.message);
            Ok(false)
        }
    }
}

fn cmd_sanitize(file: Option<&Path>, config: &Config) -> Result<()> {
    let content = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let value: Value = serde_json::from_str(&content).context("Input is not valid JSON")?;
    let sanitized = config.sanitizer().sanitize_for_log(&value);
    println!("{}", serde_json::to_string_pretty(&sanitized)?);

    Ok(())
}

fn cmd_check(kind: CheckKind, value: &str) -> bool {
    let input = Value::String(value.to_string());

    let result = match kind {
        CheckKind::String => validate_string(&input, None, None, None, false),
        CheckKind::Email => validate_email(&input, None),
        CheckKind::Phone => validate_phone(&input, None, None, None),
        CheckKind::Uuid => validate_id(&input, None, IdKind::Uuid),
        CheckKind::NumericId => validate_id(&input, None, IdKind::Numeric),
        CheckKind::PackageName => validate_package_name(value),
        CheckKind::CompanyInitial => validate_company_initial(value),
        CheckKind::LogoPath => validate_logo_path(value),
    };

    match result {
        ValidationResult::Valid => {
            println!("valid");
            true
        }
        ValidationResult::Invalid(failure) => {
            match failure.field {
                Some(field) => println!("invalid ({}): {}", field, failure.message),
                None => println!("invalid: {}", failure.message),
            }
            false
        }
    }
}

/// Generate shell completions.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "memberbase", &mut io::stdout());
}

fn cmd_config(config: &Config, show_path: bool) -> Result<()> {
    if show_path {
        if let Some(path) = Config::config_path() {
            println!("{}", path.display());
        }
        return Ok(());
    }

    let toml = toml::to_string_pretty(config)?;
    println!("{toml}");

    Ok(())
}
