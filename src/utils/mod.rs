/// Environment configuration (credentials, model, timeouts).
pub mod config;
/// Optional `crew.toml` prompt overrides.
pub mod toml_config;
