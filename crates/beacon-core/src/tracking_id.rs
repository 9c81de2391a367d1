//! Tracking identifiers — the opaque per-project tokens that attribute a
//! collection request to a project.

use rand_core::{OsRng, RngCore};

/// Prefix common to every tracking identifier.
pub const PREFIX: &str = "PA-";

/// Number of random characters after the prefix.
pub const SUFFIX_LEN: usize = 9;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// Largest multiple of CHARSET.len() that fits in a byte; bytes at or above
// this are rejected so every character stays equally likely.
const REJECT_ABOVE: u8 = (u8::MAX as usize - (u8::MAX as usize + 1) % CHARSET.len()) as u8;

/// Generate a fresh identifier: `PA-` followed by nine characters drawn
/// uniformly from `[A-Z0-9]`.
///
/// Does not check uniqueness — that is enforced at insert time by the
/// store's unique index, with the registry regenerating on collision.
pub fn generate() -> String {
  let mut out = String::with_capacity(PREFIX.len() + SUFFIX_LEN);
  out.push_str(PREFIX);
  for _ in 0..SUFFIX_LEN {
    out.push(CHARSET[random_index()] as char);
  }
  out
}

fn random_index() -> usize {
  loop {
    let mut byte = [0u8; 1];
    OsRng.fill_bytes(&mut byte);
    if byte[0] <= REJECT_ABOVE {
      return byte[0] as usize % CHARSET.len();
    }
  }
}

/// Exact-format check: `PA-` plus nine `[A-Z0-9]` characters, nothing
/// before or after. Format validity says nothing about whether a project
/// with this identifier exists.
pub fn is_well_formed(tid: &str) -> bool {
  let Some(suffix) = tid.strip_prefix(PREFIX) else {
    return false;
  };
  suffix.len() == SUFFIX_LEN
    && suffix
      .bytes()
      .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}
