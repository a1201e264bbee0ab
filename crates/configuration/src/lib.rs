use std::path::Path;

// Declare the modules that make up this crate.
#[cfg(feature = "clap")]
pub mod cli;
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
#[cfg(feature = "clap")]
pub use cli::DesignArgs;
pub use error::ConfigError;
pub use logging::init_tracing;
pub use settings::{
    AnalysisSettings, DesignSettings, ImpactSettings, LoggingSettings, MetricErrorPolicy,
    SegmentDefinition, Settings,
};

/// File read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "experiment.toml";

/// Loads and validates the experiment configuration.
///
/// With `path` set the file must exist. Without it, `experiment.toml` in the working
/// directory is read if present and the built-in defaults are used otherwise.
/// Environment variables prefixed `VANTAGE` override file values, with `__`
/// separating nested keys (e.g. `VANTAGE_ANALYSIS__ALPHA=0.01`).
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("VANTAGE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;
    Ok(settings)
}
