//! Reserved words of the step and macro language
//!
//! Matching is case-insensitive; `as_str` gives the canonical lowercase
//! spelling, which is also the terminal name the indentation grammar uses.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Keyword {
    // === STEP STRUCTURE ===
    Proc,
    Data,
    Run,
    Quit,

    // === DATA STEP CONTROL FLOW ===
    Do,
    End,
    Select,
    When,
    Otherwise,
    If,
    Then,
    Else,
    Output,
    To,
    By,
    While,
    Until,

    // === MACRO LANGUAGE ===
    Macro,
    Mend,
    MacroDo,
    MacroEnd,
    MacroIf,
    MacroThen,
    MacroElse,
    MacroTo,
    MacroBy,
    MacroWhile,
    MacroUntil,
    Let,
    Put,
    Global,
    Local,
    Include,
    Return,
    Goto,
}

impl Keyword {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Proc => "proc",
            Self::Data => "data",
            Self::Run => "run",
            Self::Quit => "quit",

            Self::Do => "do",
            Self::End => "end",
            Self::Select => "select",
            Self::When => "when",
            Self::Otherwise => "otherwise",
            Self::If => "if",
            Self::Then => "then",
            Self::Else => "else",
            Self::Output => "output",
            Self::To => "to",
            Self::By => "by",
            Self::While => "while",
            Self::Until => "until",

            Self::Macro => "%macro",
            Self::Mend => "%mend",
            Self::MacroDo => "%do",
            Self::MacroEnd => "%end",
            Self::MacroIf => "%if",
            Self::MacroThen => "%then",
            Self::MacroElse => "%else",
            Self::MacroTo => "%to",
            Self::MacroBy => "%by",
            Self::MacroWhile => "%while",
            Self::MacroUntil => "%until",
            Self::Let => "%let",
            Self::Put => "%put",
            Self::Global => "%global",
            Self::Local => "%local",
            Self::Include => "%include",
            Self::Return => "%return",
            Self::Goto => "%goto",
        }
    }

    /// Look up an already-lowercased word
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "proc" => Some(Self::Proc),
            "data" => Some(Self::Data),
            "run" => Some(Self::Run),
            "quit" => Some(Self::Quit),

            "do" => Some(Self::Do),
            "end" => Some(Self::End),
            "select" => Some(Self::Select),
            "when" => Some(Self::When),
            "otherwise" => Some(Self::Otherwise),
            "if" => Some(Self::If),
            "then" => Some(Self::Then),
            "else" => Some(Self::Else),
            "output" => Some(Self::Output),
            "to" => Some(Self::To),
            "by" => Some(Self::By),
            "while" => Some(Self::While),
            "until" => Some(Self::Until),

            "%macro" => Some(Self::Macro),
            "%mend" => Some(Self::Mend),
            "%do" => Some(Self::MacroDo),
            "%end" => Some(Self::MacroEnd),
            "%if" => Some(Self::MacroIf),
            "%then" => Some(Self::MacroThen),
            "%else" => Some(Self::MacroElse),
            "%to" => Some(Self::MacroTo),
            "%by" => Some(Self::MacroBy),
            "%while" => Some(Self::MacroWhile),
            "%until" => Some(Self::MacroUntil),
            "%let" => Some(Self::Let),
            "%put" => Some(Self::Put),
            "%global" => Some(Self::Global),
            "%local" => Some(Self::Local),
            "%include" | "%inc" => Some(Self::Include),
            "%return" => Some(Self::Return),
            "%goto" => Some(Self::Goto),
            _ => None,
        }
    }

    /// Case-insensitive lookup of a source word
    pub fn lookup(word: &str) -> Option<Self> {
        Self::from_str(&word.to_ascii_lowercase())
    }

    /// Keyword that closes a block opened by this one
    pub const fn corresponding_end(self) -> Option<Self> {
        match self {
            Self::Proc | Self::Data => Some(Self::Run),
            Self::Macro => Some(Self::Mend),
            Self::Do | Self::Select => Some(Self::End),
            Self::MacroDo => Some(Self::MacroEnd),
            _ => None,
        }
    }

    pub const fn is_block_start(self) -> bool {
        matches!(
            self,
            Self::Proc | Self::Data | Self::Macro | Self::Do | Self::MacroDo | Self::Select
        )
    }

    pub const fn is_block_end(self) -> bool {
        matches!(
            self,
            Self::Run | Self::Quit | Self::Mend | Self::End | Self::MacroEnd
        )
    }

    /// Steps and macro definitions, as opposed to `do`-style groups
    pub const fn is_top_level(self) -> bool {
        matches!(
            self,
            Self::Proc | Self::Data | Self::Macro | Self::Run | Self::Quit | Self::Mend
        )
    }

    /// Keywords whose role depends on the following token
    pub const fn is_context_sensitive(self) -> bool {
        matches!(self, Self::Data | Self::Output | Self::Select)
    }
}

/// Comparison and logical operators spelled as words
pub const MNEMONIC_OPERATORS: &[&str] = &["eq", "ne", "lt", "le", "gt", "ge", "and", "or", "not", "in"];

pub fn is_mnemonic_operator(lowercase: &str) -> bool {
    MNEMONIC_OPERATORS.contains(&lowercase)
}

/// Symbolic operators, longest first so matching is greedy
pub const SYMBOL_OPERATORS: &[&str] = &[
    "**", "||", "!!", "<=", ">=", "~=", "^=", "<>", "><", "=:", "+", "-", "*", "/", "=", "<", ">",
    "^", "~", "|", "!", "&",
];
