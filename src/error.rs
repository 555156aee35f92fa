//! Error taxonomy for the engine.
//!
//! Only `InvalidSeedInput`, `UnknownMethod` and `NotFound` are meant to reach a
//! caller. Everything else is absorbed by the assembler or the repair pipeline
//! and turned into visible, non-fatal content.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DivinationError {
  #[error("External call failed: {reason}")]
  ExternalCallFailed { reason: String },

  #[error("Timeout: {method} timed out after {timeout_ms}ms")]
  Timeout { method: String, timeout_ms: u64 },

  #[error("Parser produced no sections")]
  ParseProducedNothing,

  #[error("Persisted data corrupt: {message}")]
  PersistedDataCorrupt { message: String },

  #[error("Invalid input for '{field}': {value:?}")]
  InvalidSeedInput { field: String, value: String },

  #[error("Unknown method id: {id}")]
  UnknownMethod { id: String },

  #[error("Result not found: {id}")]
  NotFound { id: String },

  #[error("Storage error: {message}")]
  Storage { message: String },

  #[error("Configuration error: {message}")]
  Config { message: String },
}

impl DivinationError {
  /// Classes that the assembler/repair layer turns into content instead of
  /// surfacing to the caller.
  pub fn is_recoverable(&self) -> bool {
    matches!(
      self,
      DivinationError::ExternalCallFailed { .. }
        | DivinationError::Timeout { .. }
        | DivinationError::ParseProducedNothing
        | DivinationError::PersistedDataCorrupt { .. }
    )
  }

  pub fn external(reason: impl Into<String>) -> Self {
    DivinationError::ExternalCallFailed { reason: reason.into() }
  }

  pub fn invalid_input(field: &str, value: &str) -> Self {
    DivinationError::InvalidSeedInput { field: field.to_string(), value: value.to_string() }
  }
}

impl From<serde_json::Error> for DivinationError {
  fn from(err: serde_json::Error) -> Self {
    DivinationError::PersistedDataCorrupt { message: err.to_string() }
  }
}

impl From<std::io::Error> for DivinationError {
  fn from(err: std::io::Error) -> Self {
    DivinationError::Storage { message: err.to_string() }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn recoverable_classes() {
    assert!(DivinationError::external("boom").is_recoverable());
    assert!(DivinationError::Timeout { method: "bazi".into(), timeout_ms: 10 }.is_recoverable());
    assert!(DivinationError::ParseProducedNothing.is_recoverable());
    assert!(!DivinationError::invalid_input("birthDate", "x").is_recoverable());
    assert!(!DivinationError::UnknownMethod { id: "mbti".into() }.is_recoverable());
  }

  #[test]
  fn json_errors_are_corruption() {
    let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
    let mapped: DivinationError = err.into();
    assert!(matches!(mapped, DivinationError::PersistedDataCorrupt { .. }));
  }
}
