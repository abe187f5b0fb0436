use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("failed to load the C grammar: {0}")]
    Language(String),

    #[error("the parser produced no tree")]
    ParseFailed,

    #[error("syntax error at line {line}, column {column}")]
    SyntaxError { line: usize, column: usize },

    #[error("unsupported construct at line {line}, column {column}: {what}")]
    Unsupported {
        what: String,
        line: usize,
        column: usize,
    },

    #[error("missing {field} in {node_kind} node")]
    MissingField {
        field: &'static str,
        node_kind: String,
    },

    #[error("unresolved symbol `{0}`")]
    UnresolvedSymbol(String),

    #[error("no field named `{field}` on the accessed record")]
    UnknownField { field: String },

    #[error("cannot resolve a record type for the field access on `{0}`")]
    NotARecord(String),
}
