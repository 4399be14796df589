use anchor_lang::prelude::*;

use super::encrypted_scalar::{EncryptedScalar, FheContext};
use crate::constants::TREND_WINDOW;

/// Latest trend ciphertext for one principal. `ready` flips to true on the
/// first computation and never goes back.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct TrendState {
    pub value: EncryptedScalar,
    pub ready: bool,
}

impl TrendState {
    pub const SIZE: usize = EncryptedScalar::SIZE + 1;
}

/// Encrypted difference between the last `TREND_WINDOW` entries and the
/// entries before them, or `None` below `TREND_WINDOW` entries.
///
/// The baseline is the `TREND_WINDOW` entries preceding the recent window
/// when that many exist, otherwise every earlier entry, and `zero()` when
/// there are none.
pub fn window_diff(values: &[EncryptedScalar], fhe: &mut FheContext) -> Option<EncryptedScalar> {
    let n = values.len();
    if n < TREND_WINDOW {
        return None;
    }

    let recent_start = n - TREND_WINDOW;
    let previous_start = recent_start.saturating_sub(TREND_WINDOW);

    let sum_recent = fhe.sum(&values[recent_start..]);
    let sum_previous = fhe.sum(&values[previous_start..recent_start]);

    Some(fhe.sub(sum_recent, sum_previous))
}
