//! Error types for the prompt manager crate.

use std::path::PathBuf;

/// Errors that can occur in the prompt manager.
#[derive(thiserror::Error, Debug)]
pub enum PromptError {
    /// No loaded or bundled template matches the requested name.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Error occurred while rendering a template.
    #[error("template render error: {0}")]
    TemplateRenderError(String),

    /// A bundled or user template failed to compile.
    #[error("template syntax error: {0}")]
    TemplateSyntaxError(String),

    /// Template directory does not exist or is not a directory.
    #[error("template directory not found: {0}")]
    TemplateDirectoryNotFound(PathBuf),

    /// Template directory listing failed.
    #[error("failed to list templates in {path}")]
    TemplateListError {
        /// Path to the template directory.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for prompt manager operations.
pub type Result<T> = std::result::Result<T, PromptError>;
