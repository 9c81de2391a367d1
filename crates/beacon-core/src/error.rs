//! Error types for `beacon-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("a project named {0:?} already exists")]
  DuplicateProjectName(String),

  #[error("could not allocate a unique tracking id after {0} attempts")]
  TrackingIdExhausted(u32),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
