use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
  #[error("unknown module '{name}' (expected one of: {expected})")]
  UnknownModule { name: String, expected: String },

  #[error("unknown test category '{name}' (expected one of: {expected})")]
  UnknownCategory { name: String, expected: String },
}
