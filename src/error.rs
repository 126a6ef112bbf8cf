// file: src/error.rs
// version: 1.0.0
// guid: 3f1c2a9e-6b0d-4e57-9a41-c28d7e5b0f13

use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Error types for the cluster lifecycle agent
#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{tool} command not found, kindly check your PATH")]
    ToolNotFound { tool: String },

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Process '{command}' failed with exit code {exit_code:?}: {stderr}")]
    Process {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Error resolving {name}: {reason}")]
    Resolution { name: String, reason: String },
}

impl ClusterError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new file not found error
    pub fn file_not_found(msg: impl Into<String>) -> Self {
        Self::FileNotFound(msg.into())
    }

    /// Create a new template error
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }
}

impl From<minijinja::Error> for ClusterError {
    fn from(err: minijinja::Error) -> Self {
        Self::Template(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_not_found_message() {
        let err = ClusterError::tool_not_found("terraform");
        assert_eq!(
            err.to_string(),
            "terraform command not found, kindly check your PATH"
        );
    }

    #[test]
    fn test_process_error_carries_exit_code() {
        let err = ClusterError::Process {
            command: "terraform apply".to_string(),
            exit_code: Some(2),
            stderr: "boom".to_string(),
        };
        assert!(err.to_string().contains("Some(2)"));
        assert!(err.to_string().contains("terraform apply"));
    }
}
