use thiserror::Error;

/// Error category for decision-making (fix the model, abort, reconnect, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Binding declarations or host values are wrong; fails before any I/O
    Configuration,
    /// Returned data could not be mapped onto the target type
    Mapping,
    /// Driver or transport failure
    Driver,
    /// The caller cancelled the call
    Cancelled,
    /// Bug or poisoned state inside the engine
    Internal,
}

#[derive(Error, Debug, Clone)]
pub enum RoutineError {
    #[error("Procedure name is not set")]
    MissingProcedureName,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Type mismatch on field '{field}': {message}")]
    TypeMismatch { field: String, message: String },

    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Mapping error: {0}")]
    Mapping(String),

    #[error("Error reading column '{column}' into {type_name}: {source}")]
    ColumnRead {
        column: String,
        type_name: String,
        #[source]
        source: Box<RoutineError>,
    },

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Error calling {procedure}: {source}")]
    Call {
        procedure: String,
        #[source]
        source: Box<RoutineError>,
    },

    #[error("Call was cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for RoutineError {
    fn from(err: std::io::Error) -> Self {
        RoutineError::Io(err.to_string())
    }
}

impl RoutineError {
    pub fn type_mismatch(field: &str, message: impl Into<String>) -> Self {
        RoutineError::TypeMismatch {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Strips `Call` and `ColumnRead` wrappers and returns the originating error.
    pub fn root_cause(&self) -> &RoutineError {
        match self {
            RoutineError::Call { source, .. } | RoutineError::ColumnRead { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// Returns true if this error itself, not a wrapped cause, is a bad
    /// declaration raised before any I/O.
    pub fn is_declaration_error(&self) -> bool {
        matches!(
            self,
            RoutineError::MissingProcedureName
                | RoutineError::Configuration(_)
                | RoutineError::TypeMismatch { .. }
                | RoutineError::UnsupportedFeature(_)
        )
    }

    /// Returns true when the originating error is a bad declaration.
    pub fn is_configuration_error(&self) -> bool {
        self.root_cause().is_declaration_error()
    }

    /// Returns true if the error is transient and the caller may retry.
    /// The engine itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self.root_cause() {
            RoutineError::Driver(msg) => {
                let lower = msg.to_lowercase();
                lower.contains("timeout") || lower.contains("deadlock")
            }
            _ => false,
        }
    }

    pub fn error_category(&self) -> ErrorCategory {
        if self.is_configuration_error() {
            return ErrorCategory::Configuration;
        }
        match self.root_cause() {
            RoutineError::ColumnNotFound(_) | RoutineError::Mapping(_) => ErrorCategory::Mapping,
            RoutineError::Driver(_) | RoutineError::Io(_) => ErrorCategory::Driver,
            RoutineError::Cancelled => ErrorCategory::Cancelled,
            _ => ErrorCategory::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, RoutineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routine_error_variants() {
        let err1 = RoutineError::MissingProcedureName;
        assert_eq!(err1.to_string(), "Procedure name is not set");

        let err2 = RoutineError::type_mismatch("Items", "expected a sequence");
        assert_eq!(
            err2.to_string(),
            "Type mismatch on field 'Items': expected a sequence"
        );

        let err3 = RoutineError::Configuration("duplicate binding".to_string());
        assert_eq!(err3.to_string(), "Configuration error: duplicate binding");

        let err4 = RoutineError::UnsupportedFeature("nested table".to_string());
        assert!(err4.to_string().contains("nested table"));

        let err5 = RoutineError::Driver("socket closed".to_string());
        assert!(err5.to_string().contains("socket closed"));
    }

    #[test]
    fn test_column_read_display_names_column_and_type() {
        let err = RoutineError::ColumnRead {
            column: "Amount".to_string(),
            type_name: "Order".to_string(),
            source: Box::new(RoutineError::Driver("overflow".to_string())),
        };
        let msg = err.to_string();
        assert!(msg.contains("Amount"));
        assert!(msg.contains("Order"));
        assert!(msg.contains("overflow"));
    }

    #[test]
    fn test_call_wrapper_keeps_root_cause() {
        let err = RoutineError::Call {
            procedure: "dbo.GetOrders".to_string(),
            source: Box::new(RoutineError::ColumnRead {
                column: "Id".to_string(),
                type_name: "Order".to_string(),
                source: Box::new(RoutineError::Mapping("bad".to_string())),
            }),
        };
        assert!(err.to_string().contains("dbo.GetOrders"));
        assert!(matches!(err.root_cause(), RoutineError::Mapping(_)));
        assert_eq!(err.error_category(), ErrorCategory::Mapping);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing dir");
        let err: RoutineError = io.into();
        assert!(matches!(err, RoutineError::Io(ref m) if m.contains("missing dir")));
        assert_eq!(err.error_category(), ErrorCategory::Driver);
    }

    #[test]
    fn test_is_configuration_error() {
        assert!(RoutineError::MissingProcedureName.is_configuration_error());
        assert!(RoutineError::type_mismatch("x", "y").is_configuration_error());
        assert!(RoutineError::UnsupportedFeature("x".to_string()).is_configuration_error());
        assert!(!RoutineError::Driver("x".to_string()).is_configuration_error());
        assert!(!RoutineError::Cancelled.is_configuration_error());
    }

    #[test]
    fn test_wrapped_declaration_error_is_not_top_level() {
        let err = RoutineError::ColumnRead {
            column: "Id".to_string(),
            type_name: "Order".to_string(),
            source: Box::new(RoutineError::Configuration("write rejected".to_string())),
        };
        assert!(err.is_configuration_error());
        assert!(!err.is_declaration_error());
        assert!(RoutineError::Configuration("x".to_string()).is_declaration_error());
    }

    #[test]
    fn test_is_retryable() {
        assert!(RoutineError::Driver("Query Timeout expired".to_string()).is_retryable());
        assert!(RoutineError::Driver("deadlock victim".to_string()).is_retryable());
        assert!(!RoutineError::Driver("syntax error".to_string()).is_retryable());
        assert!(!RoutineError::Configuration("timeout".to_string()).is_retryable());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            RoutineError::MissingProcedureName.error_category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            RoutineError::ColumnNotFound("x".to_string()).error_category(),
            ErrorCategory::Mapping
        );
        assert_eq!(
            RoutineError::Cancelled.error_category(),
            ErrorCategory::Cancelled
        );
        assert_eq!(
            RoutineError::InternalError("poisoned".to_string()).error_category(),
            ErrorCategory::Internal
        );
    }
}
