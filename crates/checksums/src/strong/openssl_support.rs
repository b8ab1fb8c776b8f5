#![allow(clippy::module_name_repetitions)]

use openssl::hash::{Hasher, MessageDigest};
use std::sync::OnceLock;

static DETECTED: OnceLock<Result<(), ()>> = OnceLock::new();

fn detect() -> Result<(), ()> {
    Hasher::new(MessageDigest::md5()).map_err(|_| ())?;
    Ok(())
}

/// Returns whether OpenSSL-backed MD5 hashing is available.
pub fn openssl_acceleration_available() -> bool {
    DETECTED.get_or_init(detect).is_ok()
}

/// Creates an MD5 hasher backed by OpenSSL when available.
pub fn new_md5_hasher() -> Option<Hasher> {
    if !openssl_acceleration_available() {
        return None;
    }

    Hasher::new(MessageDigest::md5()).ok()
}
