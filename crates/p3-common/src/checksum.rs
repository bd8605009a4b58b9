//! Content hashes for sequence text
//!
//! Feature documents reference their nucleotide sequence by the MD5 digest of
//! the sequence text (`na_sequence_md5`). The sequence store is keyed by the
//! same digest.

/// Compute the lowercase hex MD5 digest of a sequence
pub fn sequence_md5(sequence: &str) -> String {
    format!("{:x}", md5::compute(sequence.as_bytes()))
}
