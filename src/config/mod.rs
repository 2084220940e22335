//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::infra::assets::COVER_EXTENSIONS;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "sitequery";
const ENV_PREFIX: &str = "SITEQUERY";
const DEFAULT_RECORDS_PATH: &str = "content/snippets.json";
const DEFAULT_REDIRECTS_PATH: &str = "content/redirects.yaml";
const DEFAULT_COVER_DIR: &str = "content/assets/cover";

/// Command-line arguments for the sitequery binary.
#[derive(Debug, Parser)]
#[command(
    name = "sitequery",
    version,
    about = "Prepared content queries for static site builds"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "SITEQUERY_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ContentOverrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print cover image usage counts, most used first.
    Covers,
    /// Print record counts per content type.
    Types,
    /// Print the records matching a filter.
    #[command(name = "match")]
    Match(MatchArgs),
    /// Print every slug that redirects to the given slug.
    Alternatives(AlternativesArgs),
    /// Load the content and precompute the aggregate queries.
    Warm,
}

#[derive(Debug, Args, Default, Clone)]
pub struct MatchArgs {
    /// Language id to match.
    #[arg(long, value_name = "ID")]
    pub language: Option<String>,

    /// Tag to match.
    #[arg(long, value_name = "TAG")]
    pub tag: Option<String>,

    /// Content type to match; `article` matches every non-snippet type.
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<String>,

    /// Match the tag against the primary tag only.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub primary: bool,
}

#[derive(Debug, Args, Clone)]
pub struct AlternativesArgs {
    /// Canonical slug, e.g. `/js/s/bifurcate-by`.
    #[arg(value_name = "SLUG")]
    pub slug: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentOverrides {
    /// Override the snippet records file.
    #[arg(long = "records-path", global = true, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub records_path: Option<PathBuf>,

    /// Override the redirect table file.
    #[arg(long = "redirects-path", global = true, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub redirects_path: Option<PathBuf>,

    /// Override the cover asset directory.
    #[arg(long = "cover-dir", global = true, value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub cover_dir: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        global = true,
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub content: ContentSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub records_path: PathBuf,
    pub redirects_path: PathBuf,
    pub cover_dir: PathBuf,
    /// Lowercase extensions without a leading dot.
    pub cover_extensions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("content.cover_extensions")
            .try_parsing(true),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    content: RawContentSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &ContentOverrides) {
        if let Some(path) = overrides.records_path.as_ref() {
            self.content.records_path = Some(path.clone());
        }
        if let Some(path) = overrides.redirects_path.as_ref() {
            self.content.redirects_path = Some(path.clone());
        }
        if let Some(dir) = overrides.cover_dir.as_ref() {
            self.content.cover_dir = Some(dir.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings { content, logging } = raw;

        let content = build_content_settings(content)?;
        let logging = build_logging_settings(logging)?;

        Ok(Self { content, logging })
    }
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let records_path = non_empty_path(
        content.records_path,
        DEFAULT_RECORDS_PATH,
        "content.records_path",
    )?;
    let redirects_path = non_empty_path(
        content.redirects_path,
        DEFAULT_REDIRECTS_PATH,
        "content.redirects_path",
    )?;
    let cover_dir = non_empty_path(content.cover_dir, DEFAULT_COVER_DIR, "content.cover_dir")?;

    let cover_extensions = match content.cover_extensions {
        Some(extensions) => normalize_extensions(extensions)?,
        None => COVER_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
    };

    Ok(ContentSettings {
        records_path,
        redirects_path,
        cover_dir,
        cover_extensions,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn non_empty_path(
    value: Option<PathBuf>,
    default: &str,
    key: &'static str,
) -> Result<PathBuf, LoadError> {
    let path = value.unwrap_or_else(|| PathBuf::from(default));
    if path.as_os_str().is_empty() {
        return Err(LoadError::invalid(key, "path must not be empty"));
    }
    Ok(path)
}

fn normalize_extensions(extensions: Vec<String>) -> Result<Vec<String>, LoadError> {
    let mut normalized: Vec<String> = Vec::with_capacity(extensions.len());
    for extension in extensions {
        let extension = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        if extension.is_empty() {
            return Err(LoadError::invalid(
                "content.cover_extensions",
                "extensions must not be empty",
            ));
        }
        if !normalized.contains(&extension) {
            normalized.push(extension);
        }
    }

    if normalized.is_empty() {
        return Err(LoadError::invalid(
            "content.cover_extensions",
            "at least one extension is required",
        ));
    }
    Ok(normalized)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    records_path: Option<PathBuf>,
    redirects_path: Option<PathBuf>,
    cover_dir: Option<PathBuf>,
    cover_extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}
