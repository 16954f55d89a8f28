//! Fixed demo accounts and the synthetic identifiers derived from them.

use rand::Rng;

/// Prefix carried by every demo address and synthetic transaction hash.
pub const DEMO_WALLET_PREFIX: &str = "0xDemo";

/// Sepolia, the chain every demo wallet pretends to be on.
pub const DEMO_CHAIN_ID: u64 = 11_155_111;

/// Balance (in ETH) reported by a freshly connected demo wallet.
pub const DEMO_BALANCE: &str = "5.5";

// The duplicates are part of the pool; uniform picks are weighted by them.
pub const DEMO_WALLETS: [&str; 11] = [
    "0xDemo12345678901234567890123456789012",
    "0xDemoABCDEF012345678901234567890123",
    "0xDemo1A2B3C4D5E6F7G8H9I0J1K2L3M4N5O6P",
    "0xDemo5F6G7H8I9J0K1L2M3N4O5P6Q7R8S9T0U",
    "0xDemoVWXYZ01234567890123456789012345678901",
    "0xDemoABCDEF012345678901234567890123",
    "0xDemo1A2B3C4D5E6F7G8H9I0J1K2L3M4N5O6P",
    "0xDemo5F6G7H8I9J0K1L2M3N4O5P6Q7R8S9T0U",
    "0xDemoVWXYZ01234567890123456789012345678901",
    "0xDemoABCDEF012345678901234567890123",
    "0xDemo1A2B3C4D5E6F7G8H9I0J1K2L3M4N5O6P",
];

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn random_demo_wallet<R: Rng>(rng: &mut R) -> &'static str {
    DEMO_WALLETS[rng.gen_range(0..DEMO_WALLETS.len())]
}

/// Derives a stable demo address from `seed`.
///
/// The seed is folded with a 32-bit `h * 31 + c` hash over its UTF-16 code
/// units. The absolute value is rendered as hex (at least 12 digits) and
/// right-padded with zeros to 34 digits.
pub fn generate_demo_wallet(seed: &str) -> String {
    let hash = seed.encode_utf16().fold(0i32, |h, c| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(c))
    });
    let hex_hash = format!("{:012x}", i64::from(hash).abs());
    let padding = 34usize.saturating_sub(hex_hash.len());
    format!("{DEMO_WALLET_PREFIX}{hex_hash}{}", "0".repeat(padding))
}

pub fn is_demo_wallet(address: &str) -> bool {
    address.starts_with(DEMO_WALLET_PREFIX)
}

/// Shortens demo addresses to `first10...last8`; other addresses pass through.
pub fn format_demo_address(address: &str) -> String {
    if !is_demo_wallet(address) {
        return address.to_string();
    }
    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(10).collect();
    let tail: String = chars[chars.len().saturating_sub(8)..].iter().collect();
    format!("{head}...{tail}")
}

/// `0xDemo` + hex millis + 13 random base-36 characters.
pub fn generate_demo_tx_hash<R: Rng>(rng: &mut R, now_ms: i64) -> String {
    let suffix = random_base36(rng, 13);
    format!("{DEMO_WALLET_PREFIX}{:x}{suffix}", now_ms.max(0))
}

/// Lowercase alphanumeric string of exactly `len` characters.
pub fn random_base36<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}
