use std::fmt;

#[derive(Debug)]
pub enum MatchError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold order, non-positive weight, etc.).
    ConfigValidation(String),
    /// Inputs disagree on a population size (cells, clusters, preference lists).
    LengthMismatch { what: String, expected: usize, found: usize },
    /// A cell carries a NaN or infinite signal-to-noise ratio.
    InvalidSnr { cell: usize, value: f64 },
    /// Malformed row in a tabular input.
    Csv { line: usize, message: String },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::LengthMismatch { what, expected, found } => {
                write!(f, "{what}: expected {expected} entries, found {found}")
            }
            Self::InvalidSnr { cell, value } => {
                write!(f, "cell {cell}: invalid signal-to-noise ratio {value}")
            }
            Self::Csv { line, message } => write!(f, "line {line}: {message}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for MatchError {}
