//! Stable transaction ids.
//!
//! id = first 18 chars of base64(hex(md5(record text))). The hex step and the
//! truncation are kept so ids match those already imported by earlier
//! versions of the converter.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use md5::{Digest, Md5};
use mbank_core::TransactionRecord;

pub const ID_LEN: usize = 18;

/// Compute the id from the record's canonical text. `record.id` is not part of it.
pub fn transaction_id(record: &TransactionRecord) -> String {
    text_id(&record.to_string())
}

pub fn text_id(text: &str) -> String {
    let digest = hex::encode(Md5::digest(text.as_bytes()));
    let mut encoded = STANDARD.encode(digest.as_bytes());
    encoded.truncate(ID_LEN);
    encoded
}
