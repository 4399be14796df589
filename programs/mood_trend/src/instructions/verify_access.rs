use anchor_lang::prelude::*;

use crate::constants::GRANT_SEED;
use crate::errors::MoodTrendError;
use crate::state::{AccessGrant, EncryptedScalar};

#[derive(Accounts)]
#[instruction(handle: [u8; 32], grantee: Pubkey)]
pub struct VerifyAccess<'info> {
    /// CHECK: grant PDA for (handle, grantee); may be uninitialized, in which
    /// case no grant exists. Contents are checked by `check_grant`.
    #[account(
        seeds = [GRANT_SEED, handle.as_ref(), grantee.as_ref()],
        bump,
    )]
    pub access_grant: UncheckedAccount<'info>,
}

/// Load the grant stored at `info` and confirm it covers `(value, grantee)`.
/// An empty or foreign-owned account means no grant.
pub fn check_grant(
    info: &AccountInfo,
    value: &EncryptedScalar,
    grantee: &Pubkey,
) -> Result<AccessGrant> {
    if info.data_is_empty() || *info.owner != crate::ID {
        return err!(MoodTrendError::AccessNotGranted);
    }

    let data = info.try_borrow_data()?;
    let grant = AccessGrant::try_deserialize(&mut &data[..])?;
    require!(grant.covers(value, grantee), MoodTrendError::AccessNotGranted);
    Ok(grant)
}

pub fn handler(ctx: Context<VerifyAccess>, handle: [u8; 32], grantee: Pubkey) -> Result<()> {
    let value = EncryptedScalar::from_handle(handle);
    let grant = check_grant(&ctx.accounts.access_grant, &value, &grantee)?;

    msg!(
        "MOOD_TREND: Access verified, owner={}, grantee={}",
        grant.owner,
        grantee
    );

    Ok(())
}
