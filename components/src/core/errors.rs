// Primitive configuration errors
// Programmer-error preconditions: they fail fast during development and are
// never caught and handled at runtime

use thiserror::Error;

/// Raised when primitives are wired incorrectly.
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// A part was attached without a matching mounted root.
    #[error("{part} must be used within a mounted {root} root (no root named '{name}')")]
    OutsideRoot {
        part: &'static str,
        root: &'static str,
        name: String,
    },

    /// Two roots of the same kind were mounted under one name.
    #[error("a {root} root named '{name}' is already mounted")]
    DuplicateRoot { root: &'static str, name: String },

    /// A tabs root was mounted with an empty initial key.
    #[error("tabs root '{name}' requires a non-empty initial key")]
    EmptyInitialKey { name: String },
}
