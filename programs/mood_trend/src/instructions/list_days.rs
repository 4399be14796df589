use anchor_lang::prelude::*;

use crate::constants::{LEDGER_SEED, MAX_DAYS_PER_PAGE};
use crate::state::{DayKey, MoodLedger};

#[derive(Accounts)]
pub struct ListDays<'info> {
    /// CHECK: may not be initialized yet; address is the signer's ledger PDA
    /// and the data is validated by `MoodLedger::load_if_initialized`.
    #[account(
        seeds = [LEDGER_SEED, owner.key().as_ref()],
        bump,
    )]
    pub mood_ledger: UncheckedAccount<'info>,

    pub owner: Signer<'info>,
}

/// A window of the signer's day keys, in insertion order.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct DayPage {
    pub days: Vec<DayKey>,
    /// Number of days stored in the ledger
    pub total: u32,
}

/// Day keys `[start, start + limit)` by insertion index. `limit` is clamped to
/// `MAX_DAYS_PER_PAGE`; a missing ledger yields an empty page.
pub fn day_page(ledger: Option<&MoodLedger>, start: u32, limit: u16) -> DayPage {
    let records = ledger.map(|l| l.records.as_slice()).unwrap_or(&[]);
    let limit = limit.min(MAX_DAYS_PER_PAGE) as usize;

    DayPage {
        days: records
            .iter()
            .skip(start as usize)
            .take(limit)
            .map(|r| r.day)
            .collect(),
        total: records.len() as u32,
    }
}

pub fn handler(ctx: Context<ListDays>, start: u32, limit: u16) -> Result<DayPage> {
    let owner = ctx.accounts.owner.key();
    let ledger = MoodLedger::load_if_initialized(ctx.accounts.mood_ledger.as_ref(), &owner)?;
    let page = day_page(ledger.as_ref(), start, limit);

    msg!(
        "MOOD_TREND: Listed {} of {} days for {}",
        page.days.len(),
        page.total,
        owner
    );

    Ok(page)
}
