//! Result and error types for page-object operations.

use thiserror::Error;

/// Result type for page-object operations
pub type PomResult<T> = Result<T, PomError>;

/// Errors raised while composing locators, resolving elements or driving them
#[derive(Debug, Error)]
pub enum PomError {
    /// Composed locator matched nothing within the poll window
    #[error("Unable to locate element with {dialect} {locator}{}", describe(.description))]
    ElementNotFound {
        /// Dialect the locator was composed in ("CSS" or "XPATH")
        dialect: &'static str,
        /// Composed locator
        locator: String,
        /// Optional diagnostic label
        description: Option<String>,
    },

    /// Removal wait elapsed while the locator still matched
    #[error("Element with locator {locator} was still present{}", describe(.description))]
    ElementStillPresent {
        /// Composed locator
        locator: String,
        /// Optional diagnostic label
        description: Option<String>,
    },

    /// An element handle was invalidated between resolution and use
    #[error("Stale element reference: {element}")]
    TransientStaleness {
        /// Opaque element id
        element: String,
    },

    /// Element is present but does not accept interaction yet
    #[error("Element {element} is not interactable")]
    NotInteractable {
        /// Opaque element id
        element: String,
    },

    /// Click poll window elapsed while the element stayed non-interactable
    #[error("Element with locator {locator} never became clickable{}", describe(.description))]
    NeverClickable {
        /// Composed locator
        locator: String,
        /// Optional diagnostic label
        description: Option<String>,
    },

    /// Another element received the click
    #[error("Click on {target} was intercepted: {message}")]
    InteractionIntercepted {
        /// Composed locator of the intended target
        target: String,
        /// Driver message naming the intercepting element
        message: String,
    },

    /// Locator strategy and dialect do not agree, or an argument is malformed
    #[error("Contract violation: {message}")]
    ContractViolation {
        /// Error message
        message: String,
    },

    /// Tree ancestor chain could not be expanded within the attempt budget
    #[error("Failed to expand tree to {path} after {attempts} attempts")]
    ExpansionFailed {
        /// Slash-joined path of the target item
        path: String,
        /// Attempts made
        attempts: u32,
        /// Failure observed on the last attempt
        #[source]
        source: Option<Box<PomError>>,
    },

    /// Text comparison condition is not recognized
    #[error("Unsupported text condition: {condition}")]
    UnsupportedCondition {
        /// Condition as supplied
        condition: String,
    },

    /// Component is covered by a quality overlay
    #[error("Quality overlay is displayed on component {locator}")]
    QualityOverlayPresent {
        /// Composed locator of the host component
        locator: String,
    },

    /// Raw poll timeout
    #[error("Operation timed out after {ms}ms")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Driver reported a failure with no more specific mapping
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl PomError {
    /// Whether the failure is expected to clear on its own after a re-render
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. }
                | Self::TransientStaleness { .. }
                | Self::NotInteractable { .. }
                | Self::Timeout { .. }
        )
    }

    /// Shorthand for a [`PomError::ContractViolation`]
    pub fn contract(message: impl Into<String>) -> Self {
        Self::ContractViolation {
            message: message.into(),
        }
    }
}

fn describe(description: &Option<String>) -> String {
    description
        .as_ref()
        .map(|d| format!("\nDescription: {d}"))
        .unwrap_or_default()
}
