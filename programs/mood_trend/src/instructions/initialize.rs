use anchor_lang::prelude::*;

use crate::constants::LEDGER_SEED;
use crate::state::{MoodLedger, TrendState};

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(
        init,
        payer = owner,
        space = MoodLedger::space(0),
        seeds = [LEDGER_SEED, owner.key().as_ref()],
        bump,
    )]
    pub mood_ledger: Account<'info, MoodLedger>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Initialize>) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let clock = Clock::get()?;

    let mood_ledger = &mut ctx.accounts.mood_ledger;
    mood_ledger.owner = owner;
    mood_ledger.trend = TrendState::default();
    mood_ledger.records = Vec::new();
    mood_ledger.last_updated = clock.unix_timestamp;
    mood_ledger.created_at = clock.unix_timestamp;
    mood_ledger.bump = ctx.bumps.mood_ledger;

    msg!("MOOD_TREND: Ledger initialized for {}", owner);

    Ok(())
}
