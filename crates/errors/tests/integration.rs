//! Integration tests for error types

#[cfg(test)]
mod tests {
    use rootstrap_errors::*;

    #[test]
    fn test_error_conversion() {
        let ops_err = OpsError::BatchFailed {
            mode: "install".into(),
            exit_code: Some(1),
        };
        let err: Error = ops_err.into();
        assert!(matches!(err, Error::Ops(_)));
        assert_eq!(err.user_code(), Some("ops.batch_failed"));
    }

    #[test]
    fn test_batch_failed_display() {
        let err = OpsError::BatchFailed {
            mode: "install".into(),
            exit_code: Some(1),
        };
        assert_eq!(err.to_string(), "install batch failed with exit code 1");

        let signalled = OpsError::BatchFailed {
            mode: "remove".into(),
            exit_code: None,
        };
        assert_eq!(
            signalled.to_string(),
            "remove batch failed with termination by signal"
        );
    }

    #[test]
    fn test_spawn_error_mapping() {
        let not_found = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = PlatformError::from_spawn("pacman", &not_found);
        assert!(matches!(err, PlatformError::CommandNotFound { .. }));
        assert!(err.is_launch_error());

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PlatformError::from_spawn("pacman", &denied);
        assert!(matches!(err, PlatformError::PermissionDenied { .. }));

        let decode = PlatformError::StreamDecodingFailed {
            command: "pacman".into(),
            bytes: 3,
        };
        assert!(!decode.is_launch_error());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::PermissionDenied,
                ..
            }
        ));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_clone() {
        let err = PlanError::UnknownMode {
            mode: "upgrade".into(),
        };
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
        assert!(err.user_hint().is_some());
    }
}
