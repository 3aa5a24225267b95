use thiserror::Error;

#[derive(Debug, Error)]
pub enum SilverError {
    /// The derived implementation name collides with an existing declaration.
    #[error("generated type `{name}` already exists")]
    DuplicateGeneratedType { name: String },

    #[error("type `{name}` is declared more than once")]
    DuplicateDeclaration { name: String },

    #[error("unknown type `{name}`")]
    UnknownType { name: String },

    #[error("`{name}` is not an interface")]
    NotAnInterface { name: String },

    #[error("invalid program manifest ({path}): {message}")]
    Manifest { path: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = SilverError> = std::result::Result<T, E>;
