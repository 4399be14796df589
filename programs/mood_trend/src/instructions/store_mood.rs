use anchor_lang::prelude::*;
use anchor_lang::system_program;
use solana_program::instruction::Instruction;
use solana_program::sysvar::instructions::load_instruction_at_checked;

use crate::constants::{COPROCESSOR_PUBKEY, GRANT_SEED, LEDGER_SEED};
use crate::errors::MoodTrendError;
use crate::events::{CiphertextOpsRequested, MoodStored, TrendUpdated};
use crate::state::{
    decode_input_proof, from_external, AccessGrant, DayKey, EncryptedScalar, FheContext, FheOp,
    GrantRequest, MoodLedger,
};

#[derive(Accounts)]
#[instruction(day: i64)]
pub struct StoreMood<'info> {
    #[account(
        mut,
        seeds = [LEDGER_SEED, owner.key().as_ref()],
        bump = mood_ledger.bump,
        has_one = owner,
        realloc = mood_ledger.space_after_store(day),
        realloc::payer = owner,
        realloc::zero = false,
    )]
    pub mood_ledger: Account<'info, MoodLedger>,

    #[account(mut)]
    pub owner: Signer<'info>,

    /// CHECK: instructions sysvar, checked by the address constraint
    #[account(address = solana_program::sysvar::instructions::ID)]
    pub instructions_sysvar: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// Something a committed store reports, in emission order.
#[derive(Debug, PartialEq, Eq)]
pub enum StoreNotice {
    MoodStored { day: DayKey, created: bool },
    TrendUpdated,
}

/// Result of one committed store.
#[derive(Debug)]
pub struct StoreOutcome {
    pub day: DayKey,
    /// A new day was appended rather than rewritten
    pub created: bool,
    /// Trend ciphertext computed by this store, if any
    pub trend: Option<EncryptedScalar>,
    /// Coprocessor work orders, in evaluation order
    pub ops: Vec<FheOp>,
    /// Grants to record; remaining accounts are expected in this order
    pub grants: Vec<GrantRequest>,
}

impl StoreOutcome {
    /// `MoodStored` always, then `TrendUpdated` when the trend moved.
    pub fn notices(&self) -> Vec<StoreNotice> {
        let mut notices = vec![StoreNotice::MoodStored {
            day: self.day,
            created: self.created,
        }];
        if self.trend.is_some() {
            notices.push(StoreNotice::TrendUpdated);
        }
        notices
    }
}

/// Verify the input, upsert it and recompute the trend.
///
/// The attestation is checked before anything is touched, so a failure
/// leaves the ledger and trend exactly as they were. Grants go to the owner
/// and `program_id` only: stored value first, then the trend.
pub fn apply_store(
    ledger: &mut MoodLedger,
    program_id: &Pubkey,
    coprocessor: &Pubkey,
    day: DayKey,
    raw_handle: [u8; 32],
    attestation: &Instruction,
    now: i64,
) -> Result<StoreOutcome> {
    let owner = ledger.owner;
    let value = from_external(raw_handle, attestation, &owner, program_id, coprocessor)?;

    let created = ledger.upsert(day, value);
    let mut grants = vec![
        GrantRequest {
            value,
            grantee: owner,
        },
        GrantRequest {
            value,
            grantee: *program_id,
        },
    ];

    let mut fhe = FheContext::new();
    let trend = ledger.recompute_trend(&mut fhe);
    if let Some(diff) = trend {
        grants.push(GrantRequest {
            value: diff,
            grantee: owner,
        });
        grants.push(GrantRequest {
            value: diff,
            grantee: *program_id,
        });
    }
    ledger.last_updated = now;

    Ok(StoreOutcome {
        day,
        created,
        trend,
        ops: fhe.into_ops(),
        grants,
    })
}

/// Create the grant PDA for `request` unless it already exists.
/// Returns `true` when a new grant account was written.
fn record_grant<'info>(
    grant_info: &AccountInfo<'info>,
    request: &GrantRequest,
    payer: &AccountInfo<'info>,
    system_info: &AccountInfo<'info>,
    program_id: &Pubkey,
) -> Result<bool> {
    let (address, bump) = AccessGrant::address(&request.value, &request.grantee, program_id);
    require_keys_eq!(
        *grant_info.key,
        address,
        MoodTrendError::GrantAccountMismatch
    );

    if !grant_info.data_is_empty() {
        require_keys_eq!(
            *grant_info.owner,
            *program_id,
            MoodTrendError::GrantAccountMismatch
        );
        return Ok(false);
    }

    let bump_seed = [bump];
    let seeds: &[&[u8]] = &[
        GRANT_SEED,
        &request.value.handle,
        request.grantee.as_ref(),
        &bump_seed,
    ];
    let signer_seeds = &[seeds];
    let rent_exempt = Rent::get()?.minimum_balance(AccessGrant::SIZE);

    if grant_info.lamports() == 0 {
        system_program::create_account(
            CpiContext::new_with_signer(
                system_info.clone(),
                system_program::CreateAccount {
                    from: payer.clone(),
                    to: grant_info.clone(),
                },
                signer_seeds,
            ),
            rent_exempt,
            AccessGrant::SIZE as u64,
            program_id,
        )?;
    } else {
        // Someone pre-funded the address; create_account would fail on it
        let shortfall = rent_exempt.saturating_sub(grant_info.lamports());
        if shortfall > 0 {
            system_program::transfer(
                CpiContext::new(
                    system_info.clone(),
                    system_program::Transfer {
                        from: payer.clone(),
                        to: grant_info.clone(),
                    },
                ),
                shortfall,
            )?;
        }
        system_program::allocate(
            CpiContext::new_with_signer(
                system_info.clone(),
                system_program::Allocate {
                    account_to_allocate: grant_info.clone(),
                },
                signer_seeds,
            ),
            AccessGrant::SIZE as u64,
        )?;
        system_program::assign(
            CpiContext::new_with_signer(
                system_info.clone(),
                system_program::Assign {
                    account_to_assign: grant_info.clone(),
                },
                signer_seeds,
            ),
            program_id,
        )?;
    }

    let grant = AccessGrant {
        owner: *payer.key,
        value: request.value,
        grantee: request.grantee,
        bump,
    };
    let mut data = grant_info.try_borrow_mut_data()?;
    grant.try_serialize(&mut &mut data[..])?;
    Ok(true)
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, StoreMood<'info>>,
    day: DayKey,
    raw_handle: [u8; 32],
    proof: Vec<u8>,
) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let clock = Clock::get()?;

    let attestation_index = decode_input_proof(&proof)?;
    let attestation = load_instruction_at_checked(
        attestation_index as usize,
        &ctx.accounts.instructions_sysvar,
    )
    .map_err(|_| error!(MoodTrendError::ProofInvalid))?;

    let outcome = apply_store(
        &mut ctx.accounts.mood_ledger,
        ctx.program_id,
        &COPROCESSOR_PUBKEY,
        day,
        raw_handle,
        &attestation,
        clock.unix_timestamp,
    )?;

    require!(
        ctx.remaining_accounts.len() == outcome.grants.len(),
        MoodTrendError::GrantAccountMismatch
    );
    let payer = ctx.accounts.owner.to_account_info();
    let system_info = ctx.accounts.system_program.to_account_info();
    let mut new_grants = 0usize;
    for (request, grant_info) in outcome.grants.iter().zip(ctx.remaining_accounts.iter()) {
        if record_grant(grant_info, request, &payer, &system_info, ctx.program_id)? {
            new_grants += 1;
        }
    }

    msg!(
        "MOOD_TREND: Mood stored for {}, day={}, created={}, entries={}, new_grants={}",
        owner,
        day,
        outcome.created,
        ctx.accounts.mood_ledger.records.len(),
        new_grants
    );

    let notices = outcome.notices();
    if !outcome.ops.is_empty() {
        emit!(CiphertextOpsRequested {
            owner,
            ops: outcome.ops,
        });
    }
    for notice in notices {
        match notice {
            StoreNotice::MoodStored { day, created } => {
                emit!(MoodStored {
                    owner,
                    day,
                    created,
                });
            }
            StoreNotice::TrendUpdated => {
                msg!("MOOD_TREND: Trend updated for {}", owner);
                emit!(TrendUpdated { owner });
            }
        }
    }

    Ok(())
}
