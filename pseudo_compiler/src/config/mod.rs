//! Configuration module for the compiler
//!
//! Compile-time limits come from the TOML profile selected at build time
//! (see `build.rs`); runtime preferences come from environment variables or
//! an optional TOML file.

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::RuntimeConfig;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("PSEUDO_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("PSEUDO_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}
