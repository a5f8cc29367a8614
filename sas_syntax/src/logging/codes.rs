//! Error and success codes with their classification metadata
//!
//! Single source of truth for every code the engine logs. Each code maps to
//! a category, a severity and a recommended action in the registry below.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub const fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
}

/// Buffer loading error codes
pub mod buffer {
    use super::Code;

    pub const BUFFER_TOO_LARGE: Code = Code::new("E005");
    pub const IO_ERROR: Code = Code::new("E006");
    pub const INVALID_ENCODING: Code = Code::new("E007");
    pub const LINE_TOO_LONG: Code = Code::new("E008");
}

/// Lexical classification codes
pub mod lexical {
    use super::Code;

    pub const OFFSET_OUT_OF_RANGE: Code = Code::new("E020");
    pub const UNTERMINATED_COMMENT: Code = Code::new("E021");
    pub const UNTERMINATED_STRING: Code = Code::new("E022");
}

/// Statement and block scanning codes
pub mod scanning {
    use super::Code;

    pub const SEARCH_RETRY_LIMIT: Code = Code::new("E040");
    pub const MALFORMED_BLOCK_HEADER: Code = Code::new("E041");
    pub const AMBIGUOUS_BLOCK: Code = Code::new("E042");
    pub const MISMATCHED_MACRO_END: Code = Code::new("E043");
}

/// Precedence grammar construction codes
pub mod grammar {
    use super::Code;

    pub const PRECEDENCE_CYCLE: Code = Code::new("E060");
    pub const PRECEDENCE_CONFLICT: Code = Code::new("E061");
    pub const ADJACENT_NONTERMINALS: Code = Code::new("E062");
}

/// Indentation engine codes
pub mod indentation {
    use super::Code;

    pub const RECURSION_LIMIT: Code = Code::new("E080");
    pub const SEXP_STEP_LIMIT: Code = Code::new("E081");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const BUFFER_LOADED: Code = Code::new("I006");
    pub const CLASSIFICATION_COMPLETE: Code = Code::new("I020");
    pub const BLOCK_LOCATED: Code = Code::new("I040");
    pub const GRAMMAR_CONSTRUCTED: Code = Code::new("I060");
    pub const INDENTATION_COMPUTED: Code = Code::new("I080");
    pub const REGION_REINDENTED: Code = Code::new("I081");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

const REGISTRY_ENTRIES: &[ErrorMetadata] = &[
    // System
    ErrorMetadata::new(
        "ERR001",
        "System",
        Severity::Critical,
        false,
        true,
        "Internal engine invariant violated",
        "File a bug report with the buffer that triggered it",
    ),
    // Buffer
    ErrorMetadata::new(
        "E005",
        "Buffer",
        Severity::Medium,
        false,
        true,
        "Buffer exceeds maximum size limit",
        "Split the source file or raise max_buffer_size",
    ),
    ErrorMetadata::new(
        "E006",
        "Buffer",
        Severity::Medium,
        false,
        true,
        "Source file could not be read",
        "Check the path and file permissions",
    ),
    ErrorMetadata::new(
        "E007",
        "Buffer",
        Severity::Medium,
        false,
        true,
        "Source file is not valid UTF-8",
        "Convert the file to UTF-8",
    ),
    ErrorMetadata::new(
        "E008",
        "Buffer",
        Severity::Low,
        true,
        false,
        "Line exceeds maximum line length",
        "Wrap the line or raise max_line_length",
    ),
    // Lexical
    ErrorMetadata::new(
        "E020",
        "Lexical",
        Severity::High,
        false,
        true,
        "Offset lies outside the buffer",
        "Clamp caller offsets to the buffer length",
    ),
    ErrorMetadata::new(
        "E021",
        "Lexical",
        Severity::Low,
        true,
        false,
        "Comment runs to end of buffer",
        "Close the comment with */ or ;",
    ),
    ErrorMetadata::new(
        "E022",
        "Lexical",
        Severity::Low,
        true,
        false,
        "String literal runs to end of buffer",
        "Close the literal with a matching quote",
    ),
    // Scanning
    ErrorMetadata::new(
        "E040",
        "Scanning",
        Severity::High,
        true,
        false,
        "Keyword search exceeded its retry limit",
        "Report the buffer; the search anchor failed to progress",
    ),
    ErrorMetadata::new(
        "E041",
        "Scanning",
        Severity::Low,
        true,
        false,
        "Block header is missing its name",
        "Add the procedure or macro name after the keyword",
    ),
    ErrorMetadata::new(
        "E042",
        "Scanning",
        Severity::Low,
        true,
        false,
        "Block closer has no matching opener",
        "Remove the stray closer or add the missing opener",
    ),
    ErrorMetadata::new(
        "E043",
        "Scanning",
        Severity::Low,
        true,
        false,
        "%mend names a different macro than the open definition",
        "Match the %mend name to the %macro name",
    ),
    // Grammar
    ErrorMetadata::new(
        "E060",
        "Grammar",
        Severity::Critical,
        false,
        true,
        "Precedence constraints form a cycle",
        "Add a precedence table entry that breaks the cycle",
    ),
    ErrorMetadata::new(
        "E061",
        "Grammar",
        Severity::Medium,
        true,
        false,
        "Grammar rules give two tokens conflicting precedence",
        "Resolve the pair in the precedence table",
    ),
    ErrorMetadata::new(
        "E062",
        "Grammar",
        Severity::Critical,
        false,
        true,
        "Rule places two nonterminals next to each other",
        "Separate the nonterminals with a terminal",
    ),
    // Indentation
    ErrorMetadata::new(
        "E080",
        "Indentation",
        Severity::Medium,
        true,
        false,
        "Indentation anchors nested deeper than the recursion limit",
        "Raise max_indent_recursion or simplify the nesting",
    ),
    ErrorMetadata::new(
        "E081",
        "Indentation",
        Severity::Medium,
        true,
        false,
        "Backward parse exceeded the step limit",
        "Raise max_sexp_steps",
    ),
    // Success
    ErrorMetadata::new(
        "I004",
        "System",
        Severity::Low,
        true,
        false,
        "Logging system initialized",
        "Continue",
    ),
    ErrorMetadata::new(
        "I006",
        "Buffer",
        Severity::Low,
        true,
        false,
        "Buffer loaded",
        "Continue",
    ),
    ErrorMetadata::new(
        "I020",
        "Lexical",
        Severity::Low,
        true,
        false,
        "Classification pass completed",
        "Continue",
    ),
    ErrorMetadata::new(
        "I040",
        "Scanning",
        Severity::Low,
        true,
        false,
        "Enclosing block located",
        "Continue",
    ),
    ErrorMetadata::new(
        "I060",
        "Grammar",
        Severity::Low,
        true,
        false,
        "Precedence grammar constructed",
        "Continue",
    ),
    ErrorMetadata::new(
        "I080",
        "Indentation",
        Severity::Low,
        true,
        false,
        "Line indentation computed",
        "Continue",
    ),
    ErrorMetadata::new(
        "I081",
        "Indentation",
        Severity::Low,
        true,
        false,
        "Region reindented",
        "Continue",
    ),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        REGISTRY_ENTRIES
            .iter()
            .map(|metadata| (metadata.code, metadata.clone()))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
