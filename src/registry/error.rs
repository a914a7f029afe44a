//! Errors raised while talking to the package registry or probing sizes.

use thiserror::Error;

/// Failure of a registry, size-probe or navigator call.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The registry does not know the package, typically because it was
    /// uninstalled between listing and lookup.
    #[error("package not found: {package_id}")]
    PackageNotFound { package_id: String },

    /// The platform command ran but reported failure.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The platform command succeeded but its output could not be parsed.
    #[error("unexpected output from `{command}`: {output}")]
    UnexpectedOutput { command: String, output: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = RegistryError::PackageNotFound {
            package_id: "com.example.gone".to_string(),
        };
        assert_eq!(err.to_string(), "package not found: com.example.gone");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "adb: not found");
        let err: RegistryError = io.into();
        assert!(matches!(err, RegistryError::Io(_)));
        assert!(err.to_string().contains("adb: not found"));
    }
}
