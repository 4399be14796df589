use anchor_lang::prelude::*;

use crate::state::FheOp;

/// Work orders for the coprocessor, in evaluation order.
#[event]
pub struct CiphertextOpsRequested {
    pub owner: Pubkey,
    pub ops: Vec<FheOp>,
}

#[event]
pub struct MoodStored {
    pub owner: Pubkey,
    pub day: i64,
    pub created: bool,
}

#[event]
pub struct TrendUpdated {
    pub owner: Pubkey,
}
