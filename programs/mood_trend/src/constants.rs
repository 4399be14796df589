use anchor_lang::prelude::*;

/// PDA seed for a principal's mood ledger: ["mood_ledger", owner]
pub const LEDGER_SEED: &[u8] = b"mood_ledger";

/// PDA seed for one decryption grant: ["grant", handle, grantee]
pub const GRANT_SEED: &[u8] = b"grant";

/// Entries per trend window. The engine compares the last `TREND_WINDOW`
/// records against up to `TREND_WINDOW` records before them.
pub const TREND_WINDOW: usize = 7;

/// Domain prefix for handles derived from on-chain ciphertext operations.
pub const HANDLE_DOMAIN: &[u8] = b"MOOD_TREND_FHE_V1";

/// Domain prefix for the message the coprocessor signs for an input.
pub const INPUT_DOMAIN: &[u8] = b"MOOD_TREND_INPUT_V1";

/// Leading byte of every accepted input proof.
pub const INPUT_PROOF_VERSION: u8 = 1;

/// Ed25519 key the coprocessor signs input attestations with.
pub const COPROCESSOR_PUBKEY: Pubkey =
    solana_program::pubkey!("8gJWCXNEQiVawpDXjk23uUsK2BCqKBfHGCb7EVYSzJ8K");

/// Solana caps return data at 1024 bytes; 120 day keys plus the page header fit.
pub const MAX_DAYS_PER_PAGE: u16 = 120;

pub const SECONDS_PER_DAY: i64 = 86_400;
