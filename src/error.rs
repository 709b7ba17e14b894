//! Error kinds for each pipeline stage, plus the shared [`Mark`] type.
//!
//! Each stage gets its own error enum that composes into the next stage's
//! via `#[from]`, so a caller driving only the scanner never has to know
//! about parser-level variants, and so on up the stack.

/// An immutable `(input_offset, line, column)` position.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub struct Mark {
    /// Byte offset from the start of the input.
    pub index: u64,
    /// Zero-based line number.
    pub line: u64,
    /// Zero-based column number.
    pub column: u64,
}

impl std::fmt::Display for Mark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {} column {}", self.line + 1, self.column + 1)
    }
}

/// Module tag attached to a diagnostic (spec §7).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleTag {
    Scan,
    Parse,
    Doc,
    Build,
    Internal,
    System,
}

impl std::fmt::Display for ModuleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ModuleTag::Scan => "SCAN",
            ModuleTag::Parse => "PARSE",
            ModuleTag::Doc => "DOC",
            ModuleTag::Build => "BUILD",
            ModuleTag::Internal => "INTERNAL",
            ModuleTag::System => "SYSTEM",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    #[error("{problem}")]
    Problem {
        problem: &'static str,
        offset: u64,
        value: i32,
    },
    #[error("input stream produced an invalid byte order marker")]
    InvalidBom,
    #[error("invalid UTF-8 byte at offset {offset}: {value:#x}")]
    InvalidUtf8 { offset: u64, value: u8 },
    #[error("invalid UTF-16 unpaired surrogate: {value:#x}")]
    InvalidUtf16 { value: u16 },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("{}:{}: {problem} ({context} at {}:{})", problem_mark.line + 1, problem_mark.column + 1, context_mark.line + 1, context_mark.column + 1)]
    Problem {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        problem_mark: Mark,
    },
    #[error("{}:{}: {problem}", mark.line + 1, mark.column + 1)]
    Simple { problem: &'static str, mark: Mark },
    #[error(transparent)]
    Reader(#[from] ReaderError),
}

#[derive(Debug, thiserror::Error)]
pub enum ParserError {
    #[error("no more tokens")]
    UnexpectedEof,
    #[error("{}:{}: {problem}", mark.line + 1, mark.column + 1)]
    Problem { problem: &'static str, mark: Mark },
    #[error("{}:{}: {problem} ({context} at {}:{})", mark.line + 1, mark.column + 1, context_mark.line + 1, context_mark.column + 1)]
    ProblemWithContext {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        mark: Mark,
    },
    #[error(transparent)]
    Scanner(#[from] ScannerError),
}

/// Resolve/build errors (spec §7 kinds 3 and 4).
#[derive(Debug, thiserror::Error)]
pub enum ComposerError {
    #[error("{}:{}: {problem}", mark.line + 1, mark.column + 1)]
    Problem { problem: &'static str, mark: Mark },
    #[error("{}:{}: {problem} ({context} at {}:{})", mark.line + 1, mark.column + 1, context_mark.line + 1, context_mark.column + 1)]
    ProblemWithContext {
        context: &'static str,
        context_mark: Mark,
        problem: &'static str,
        mark: Mark,
    },
    #[error("alias {anchor:?} refers to an undefined anchor")]
    UndefinedAlias { anchor: String, mark: Mark },
    #[error("tag handle {handle:?} is not declared by any %TAG directive in scope")]
    UndeclaredTagHandle { handle: String, mark: Mark },
    #[error(transparent)]
    Parser(#[from] ParserError),
}

#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum EmitterError {
    #[error("{0}")]
    Problem(&'static str),
    #[error("invalid style requested for JSON mode: {0}")]
    InvalidJsonStyle(&'static str),
    #[error(transparent)]
    Writer(#[from] WriterError),
}

/// Errors raised while compiling a path expression (spec §7 kind 6).
///
/// Compilation is transactional: on error the partially built expression
/// tree is discarded and no state outside the compiler call is mutated.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathCompileError {
    #[error("unbalanced parentheses in path expression")]
    UnbalancedParens,
    #[error("unknown method or filter: {0:?}")]
    UnknownMethod(String),
    #[error("dangling operator at end of path expression")]
    DanglingOperator,
    #[error("empty path expression")]
    Empty,
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("unterminated scalar literal")]
    UnterminatedLiteral,
    #[error("the sibling operator ':' is not supported")]
    UnsupportedOperator,
}

/// Path evaluation never hard-fails per spec §7 kind 7: incompatible
/// operand types simply simplify to an empty result. This type exists for
/// the few truly exceptional cases (e.g. division by zero).
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PathEvalError {
    #[error("division by zero")]
    DivisionByZero,
}
