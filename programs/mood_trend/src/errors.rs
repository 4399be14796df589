use anchor_lang::prelude::*;

#[error_code]
pub enum MoodTrendError {
    #[msg("Encrypted input proof is invalid")]
    ProofInvalid,
    #[msg("Trend needs at least 7 entries before it is computed")]
    TrendNotComputed,
    #[msg("No access grant exists for this handle and grantee")]
    AccessNotGranted,
    #[msg("Account does not belong to the signer")]
    LedgerOwnerMismatch,
    #[msg("Grant accounts do not match the grants this store issues")]
    GrantAccountMismatch,
}
