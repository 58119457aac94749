//! ID prefix constants.
//!
//! Internal IDs have the form `{prefix}-{8 hex chars}` (e.g., `asm-a3f8b2c1`)
//! and are generated by the database layer.

pub const PREFIX_ASSESSMENT: &str = "asm";
pub const PREFIX_RESULT: &str = "rsl";
pub const PREFIX_COMPANY: &str = "cmp";
pub const PREFIX_CONFIG_VERSION: &str = "cfv";

pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_ASSESSMENT,
    PREFIX_RESULT,
    PREFIX_COMPANY,
    PREFIX_CONFIG_VERSION,
];

/// Length in bytes of the random part of a public assessment token.
///
/// Rendered as lowercase hex, so tokens are twice this many characters.
pub const PUBLIC_ID_BYTES: usize = 16;

/// Check whether `s` is shaped like a public assessment token.
#[must_use]
pub fn is_public_id(s: &str) -> bool {
    s.len() == PUBLIC_ID_BYTES * 2 && s.chars().all(|c| c.is_ascii_hexdigit())
}
