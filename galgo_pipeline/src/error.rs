use std::fmt::{Display, Formatter};

use galgo_graph::Cancelled;

/// Front-end failures. Everything below the front-end degrades per item
/// instead of failing the pass.
#[derive(Debug)]
pub enum GeneratorError {
    Io(std::io::Error),
    SymbolSnapshot(serde_json::Error),
    Cancelled(Cancelled),
}

impl Display for GeneratorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::SymbolSnapshot(err) => write!(f, "malformed symbol snapshot: {err}"),
            Self::Cancelled(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for GeneratorError {}

impl From<std::io::Error> for GeneratorError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for GeneratorError {
    fn from(value: serde_json::Error) -> Self {
        Self::SymbolSnapshot(value)
    }
}

impl From<Cancelled> for GeneratorError {
    fn from(value: Cancelled) -> Self {
        Self::Cancelled(value)
    }
}
