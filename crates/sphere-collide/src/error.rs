//! Error types.

use thiserror::Error;

/// Malformed vertex or index data handed to a mesh or selector constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// Unindexed positions must come in groups of three.
    #[error("position count {0} is not a multiple of 3")]
    PositionCount(usize),

    /// Index lists must come in groups of three.
    #[error("index count {0} is not a multiple of 3")]
    IndexCount(usize),

    /// An index refers past the end of the position list.
    #[error("index {index} is out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// The offending index value.
        index: u32,
        /// Number of positions available.
        vertex_count: usize,
    },

    /// A vertex has a NaN or infinite coordinate.
    #[error("vertex {index} has a non-finite coordinate")]
    NonFinite {
        /// Position of the offending vertex in the input list.
        index: usize,
    },
}

/// Failure to load or save a controller configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Only TOML files are understood.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
