use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

#[cfg(test)]
mod testing;

use instructions::*;

declare_id!("5mVQeAFnTtWmDq2ksPReDBeT6kS3t5qvYwD4oDxXq7Fk");

#[program]
pub mod mood_trend {
    use super::*;

    /// Create the signer's mood ledger
    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize::handler(ctx)
    }

    /// Store an encrypted mood for `day`, replacing any entry already stored
    /// for that day, and recompute the trend. Grant PDAs for the new
    /// ciphertexts are passed as remaining accounts.
    pub fn store_mood<'info>(
        ctx: Context<'_, '_, 'info, 'info, StoreMood<'info>>,
        day: i64,
        raw_handle: [u8; 32],
        proof: Vec<u8>,
    ) -> Result<()> {
        instructions::store_mood::handler(ctx, day, raw_handle, proof)
    }

    /// Page through the signer's stored days in insertion order
    pub fn list_days(ctx: Context<ListDays>, start: u32, limit: u16) -> Result<DayPage> {
        instructions::list_days::handler(ctx, start, limit)
    }

    /// Handle of the signer's trend ciphertext
    pub fn get_trend_handle(ctx: Context<GetTrendHandle>) -> Result<[u8; 32]> {
        instructions::get_trend_handle::handler(ctx)
    }

    /// Check a decryption grant (for the decryption service, directly or via CPI)
    pub fn verify_access(
        ctx: Context<VerifyAccess>,
        handle: [u8; 32],
        grantee: Pubkey,
    ) -> Result<()> {
        instructions::verify_access::handler(ctx, handle, grantee)
    }
}
