//! Random keys and document bodies.
use rand::Rng;
use txload_model::WorkItem;

/// Symbols used for generated keys and bodies.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz1234567890 ";

/// Default key length.
pub const KEY_LEN: usize = 8;

pub fn random_string<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Fresh key/body pair for one transaction.
pub fn work_item<R: Rng + ?Sized>(rng: &mut R, key_len: usize, size: usize) -> WorkItem {
    let key = random_string(rng, key_len);
    let body = random_string(rng, size);
    WorkItem::new(key, body)
}
