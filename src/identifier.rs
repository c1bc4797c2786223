//! Document identifiers for the EPUB manifest.
//!
//! Readers key their libraries on `dc:identifier`, so every generated
//! document gets a fresh random (version 4) UUID. Identifier generation must
//! never fail a conversion: without an OS randomness source the bytes are
//! derived from the clock instead.

use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;
use uuid::Builder;

/// Generate a random identifier formatted `xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx`.
pub fn generate_identifier() -> String {
    let mut bytes = [0u8; 16];
    match getrandom::getrandom(&mut bytes) {
        Ok(()) => identifier_from_bytes(bytes),
        Err(e) => {
            warn!("Randomness source unavailable ({e}), using time-derived identifier");
            identifier_from_bytes(time_bytes())
        }
    }
}

/// Format 16 bytes as a hyphenated identifier, fixing the version nibble of
/// byte 6 to 4 and the variant bits of byte 8 to `10`.
pub fn identifier_from_bytes(bytes: [u8; 16]) -> String {
    Builder::from_random_bytes(bytes)
        .into_uuid()
        .hyphenated()
        .to_string()
}

fn time_bytes() -> [u8; 16] {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    nanos.to_be_bytes()
}
