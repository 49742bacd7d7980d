//! Configuration management for doctype-check.
//!
//! Handles:
//! - Command-line argument parsing
//! - Project configuration in `.doctype-check.toml`
//! - Doctype directory configuration

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name of the project configuration, searched for upwards from the
/// working directory.
pub const PROJECT_CONFIG_FILE: &str = ".doctype-check.toml";

/// What to print for a valid document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum EmitFormat {
    /// Only the verdict
    #[default]
    None,
    /// One JSON object per validated event
    Events,
    /// Normalized markup
    Markup,
}

/// Command-line arguments for doctype-check
#[derive(Debug, Default, Parser)]
#[command(name = "doctype-check")]
#[command(about = "Validate SGML-style markup against a doctype")]
#[command(version)]
pub struct Args {
    /// Document to validate, stdin when omitted
    pub document: Option<PathBuf>,

    /// Explicitly specify the doctype to use
    #[arg(long, help = "Doctype to validate against (e.g., 'memo')")]
    pub doctype: Option<String>,

    /// A single doctype file to load
    #[arg(long, help = "Doctype file to load and use")]
    pub doctype_file: Option<PathBuf>,

    /// Custom doctype directory to search for doctype files
    #[arg(long, help = "Directory containing .doctype files")]
    pub doctype_dir: Option<PathBuf>,

    /// Explicit project configuration file
    #[arg(long, help = "Project configuration file (default: nearest .doctype-check.toml)")]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = EmitFormat::None, help = "Output for a valid document")]
    pub emit: EmitFormat,

    #[arg(long, help = "Print the selected doctype and exit")]
    pub dump_doctype: bool,

    /// Log level for doctype-check
    #[arg(
        long,
        default_value = "warn",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Contents of `.doctype-check.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Doctype used when neither the command line nor the document names one
    pub default_doctype: Option<String>,
    /// Extra doctype directories, relative to the configuration file
    pub doctype_dirs: Vec<PathBuf>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse project config {}", path.display()))
    }

    /// Find the nearest project configuration at or above `start`.
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(PROJECT_CONFIG_FILE))
            .find(|path| path.is_file())
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Document to validate, stdin when `None`
    pub document: Option<PathBuf>,
    /// Doctype name explicitly set via command line
    pub cli_doctype: Option<String>,
    /// Doctype file explicitly set via command line
    pub doctype_file: Option<PathBuf>,
    /// Doctype from project configuration
    pub project_doctype: Option<String>,
    /// Path to the project config, if one was found
    pub project_config_path: Option<PathBuf>,
    /// Doctype directories, loaded in order so later ones win
    pub doctype_dirs: Vec<PathBuf>,
    pub emit: EmitFormat,
    pub dump_doctype: bool,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments, discovering the project
    /// config from the working directory
    pub fn from_args(args: Args) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read working directory")?;
        Self::from_args_in(args, &cwd)
    }

    /// Create configuration from explicit arguments, discovering the project
    /// config from `cwd` (useful for testing)
    pub fn from_args_in(args: Args, cwd: &Path) -> Result<Self> {
        let project_config_path = match args.config {
            Some(path) => Some(path),
            None => ProjectConfig::discover(cwd),
        };
        let project = match &project_config_path {
            Some(path) => {
                debug!("Loading project config from {}", path.display());
                ProjectConfig::load(path)?
            }
            None => ProjectConfig::default(),
        };

        // Lowest priority first
        let mut doctype_dirs = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            doctype_dirs.push(config_dir.join("doctype-check").join("doctypes"));
        }

        let base = project_config_path
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(cwd);
        doctype_dirs.extend(project.doctype_dirs.iter().map(|dir| base.join(dir)));

        if let Some(custom_dir) = args.doctype_dir {
            doctype_dirs.push(custom_dir);
        }

        Ok(Config {
            document: args.document,
            cli_doctype: args.doctype,
            doctype_file: args.doctype_file,
            project_doctype: project.default_doctype,
            project_config_path,
            doctype_dirs,
            emit: args.emit,
            dump_doctype: args.dump_doctype,
            log_level: args.log_level,
        })
    }

    /// Get the doctype name requested on the command line. A doctype file
    /// given without a name selects itself, by file stem.
    pub fn get_effective_doctype(&self) -> Option<String> {
        self.cli_doctype.clone().or_else(|| {
            self.doctype_file
                .as_deref()
                .and_then(Path::file_stem)
                .map(|stem| stem.to_string_lossy().into_owned())
        })
    }

    pub fn has_project_config(&self) -> bool {
        self.project_config_path.is_some()
    }
}
