//! Error Handling Module
//!
//! This module provides the error type shared by the whole crate:
//! - Core error type (`PreviewError`)
//! - Helpers for classifying errors (contract violations vs. runtime failures)
//! - Type conversions from common error types
//!
//! # Example
//!
//! ```rust,ignore
//! use rule_preview::error::PreviewError;
//! use rule_preview::types::RuleKind;
//!
//! let error = PreviewError::UnsupportedRuleKind(RuleKind::CloudRecording);
//! assert!(error.is_contract_violation());
//! ```

// Module declarations
mod conversions;
pub mod types;

// Re-exports for public API
pub use types::*;
