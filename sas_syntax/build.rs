// build.rs - TOML-driven compile-time limit generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    buffer: BufferLimits,
    scanning: ScanningLimits,
    indentation: IndentationLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct BufferLimits {
    max_buffer_size: usize,
    max_line_length: usize,
}

#[derive(serde::Deserialize)]
struct ScanningLimits {
    max_search_retries: usize,
}

#[derive(serde::Deserialize)]
struct IndentationLimits {
    max_indent_recursion: usize,
    max_sexp_steps: usize,
    max_indent_width: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SAS_SYNTAX_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=SAS_SYNTAX_CONFIG_DIR");

    let profile =
        env::var("SAS_SYNTAX_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("SAS_SYNTAX_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of the sas_syntax directory
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_BUFFER_SIZE: usize = 1_000_000_000;

    if config.buffer.max_buffer_size > ABSOLUTE_MAX_BUFFER_SIZE {
        panic!("LIMITS: max_buffer_size exceeds absolute maximum");
    }

    if config.buffer.max_line_length == 0 || config.buffer.max_line_length > config.buffer.max_buffer_size {
        panic!("LIMITS: max_line_length must be in 1..=max_buffer_size");
    }

    if config.scanning.max_search_retries == 0 {
        panic!("LIMITS: max_search_retries must be positive");
    }

    if config.indentation.max_indent_recursion == 0 || config.indentation.max_sexp_steps == 0 {
        panic!("LIMITS: indentation recursion and sexp step limits must be positive");
    }

    if config.indentation.max_indent_width == 0 || config.indentation.max_indent_width > 64 {
        panic!("LIMITS: max_indent_width must be in 1..=64");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("LIMITS: security_min_log_level too high (max: 2)");
    }

    if profile == "production" && config.buffer.max_buffer_size > 100_000_000 {
        panic!("PRODUCTION: max_buffer_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod buffer {{
        pub const MAX_BUFFER_SIZE: usize = {};
        pub const MAX_LINE_LENGTH: usize = {};
    }}

    pub mod scanning {{
        pub const MAX_SEARCH_RETRIES: usize = {};
    }}

    pub mod indentation {{
        pub const MAX_INDENT_RECURSION: usize = {};
        pub const MAX_SEXP_STEPS: usize = {};
        pub const MAX_INDENT_WIDTH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        config.buffer.max_buffer_size,
        config.buffer.max_line_length,
        config.scanning.max_search_retries,
        config.indentation.max_indent_recursion,
        config.indentation.max_sexp_steps,
        config.indentation.max_indent_width,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
