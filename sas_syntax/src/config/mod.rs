//! Configuration for the SAS syntax engine
//!
//! Compile-time limits are generated by build.rs from the TOML profile;
//! runtime preferences come from the environment or a TOML file.

// Generated at compile time from config/<profile>.toml
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

/// Build information and configuration metadata
pub mod build_info {
    /// Returns the configuration profile used during build
    pub fn profile() -> &'static str {
        option_env!("SAS_SYNTAX_BUILD_PROFILE").unwrap_or("development")
    }

    /// Returns the configuration directory used during build
    pub fn config_dir() -> &'static str {
        option_env!("SAS_SYNTAX_CONFIG_DIR").unwrap_or("config")
    }

    /// Returns configuration source information
    pub fn source_info() -> String {
        format!("Generated from {}/{}.toml", config_dir(), profile())
    }
}

#[cfg(test)]
mod tests {
    use super::compile_time;

    #[test]
    fn test_generated_limits_are_sane() {
        assert!(compile_time::buffer::MAX_BUFFER_SIZE >= compile_time::buffer::MAX_LINE_LENGTH);
        assert!(compile_time::scanning::MAX_SEARCH_RETRIES > 0);
        assert!(compile_time::indentation::MAX_INDENT_WIDTH > 0);
    }

    #[test]
    fn test_source_info_names_profile() {
        assert!(super::build_info::source_info().ends_with(".toml"));
    }
}
