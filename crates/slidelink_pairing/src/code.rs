// --- File: crates/slidelink_pairing/src/code.rs ---
//! Pairing code and device id generation.

use rand::Rng;

/// Characters a user may be asked to type from the extension popup into the
/// dashboard. Ambiguous glyphs (0/O, 1/I/L) are excluded.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Generate a fresh pairing code of `length` characters.
///
/// Uniqueness against live attempts is the registrar's job; this function
/// only draws from the alphabet.
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Generate a fresh device id for one extension installation.
pub fn generate_device_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
