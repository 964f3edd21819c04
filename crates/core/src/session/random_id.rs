//! Per-process random identifier sent with status and log requests.

use std::sync::OnceLock;

use rand::Rng;

/// Characters the identifier is drawn from. `0`, `1`, `O`, and `I` are left out.
pub const ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// Length of the identifier.
pub const LEN: usize = 8;

/// Generates a fresh identifier.
pub fn generate() -> String {
	let mut rng = rand::thread_rng();
	(0..LEN).map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char).collect()
}

/// The identifier for this process, generated on first use.
pub fn process_random_id() -> &'static str {
	static ID: OnceLock<String> = OnceLock::new();
	ID.get_or_init(generate)
}
