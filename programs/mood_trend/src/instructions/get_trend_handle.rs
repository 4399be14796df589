use anchor_lang::prelude::*;

use crate::constants::LEDGER_SEED;
use crate::errors::MoodTrendError;
use crate::state::MoodLedger;

#[derive(Accounts)]
pub struct GetTrendHandle<'info> {
    /// CHECK: may not be initialized yet; address is the signer's ledger PDA
    /// and the data is validated by `MoodLedger::load_if_initialized`.
    #[account(
        seeds = [LEDGER_SEED, owner.key().as_ref()],
        bump,
    )]
    pub mood_ledger: UncheckedAccount<'info>,

    pub owner: Signer<'info>,
}

/// Handle of the trend ciphertext. Fails until the trend has been computed.
pub fn trend_handle(ledger: Option<&MoodLedger>) -> Result<[u8; 32]> {
    match ledger {
        Some(ledger) if ledger.trend.ready => Ok(ledger.trend.value.handle),
        _ => err!(MoodTrendError::TrendNotComputed),
    }
}

pub fn handler(ctx: Context<GetTrendHandle>) -> Result<[u8; 32]> {
    let owner = ctx.accounts.owner.key();
    let ledger = MoodLedger::load_if_initialized(ctx.accounts.mood_ledger.as_ref(), &owner)?;
    let handle = trend_handle(ledger.as_ref())?;

    msg!("MOOD_TREND: Trend handle issued to {}", owner);

    Ok(handle)
}
