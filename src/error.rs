/// Result type alias for the schema engine
pub type Result<T> = std::result::Result<T, Error>;

/// Error types raised while building schemas
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A type override string is not valid Rust type syntax
    InvalidTypeSyntax { input: String, message: String },
    /// A type override names a type that is neither known nor defined in the sources
    UnresolvedType { input: String },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidTypeSyntax { input, message } => {
                write!(f, "invalid type syntax `{}`: {}", input, message)
            }
            Error::UnresolvedType { input } => {
                write!(f, "type `{}` does not resolve to any known type", input)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = Error::UnresolvedType {
            input: "Missing".to_string(),
        };
        assert_eq!(err.to_string(), "type `Missing` does not resolve to any known type");

        let err = Error::InvalidTypeSyntax {
            input: "Vec<".to_string(),
            message: "unexpected end of input".to_string(),
        };
        assert!(err.to_string().starts_with("invalid type syntax `Vec<`"));
    }
}
