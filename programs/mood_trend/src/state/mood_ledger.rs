use anchor_lang::prelude::*;

use super::encrypted_scalar::{EncryptedScalar, FheContext};
use super::trend::{window_diff, TrendState};
use crate::constants::{SECONDS_PER_DAY, TREND_WINDOW};
use crate::errors::MoodTrendError;

/// Day-granularity key chosen by the caller. The program only compares it.
pub type DayKey = i64;

/// Floor a unix timestamp to the start of its UTC day.
/// Offered to clients; stored keys are used exactly as submitted.
pub fn day_key_from_timestamp(unix_timestamp: i64) -> DayKey {
    unix_timestamp.div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY
}

/// One encrypted observation.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoodRecord {
    pub day: DayKey,
    pub value: EncryptedScalar,
}

impl MoodRecord {
    pub const SIZE: usize = 8 + EncryptedScalar::SIZE; // 40 bytes per record
}

/// Mood ledger: a principal's encrypted entries in insertion order plus the
/// trend derived from them. One per user.
#[account]
pub struct MoodLedger {
    /// The wallet that owns this ledger
    pub owner: Pubkey,
    /// Latest trend ciphertext
    pub trend: TrendState,
    /// Entries in insertion order, at most one per day
    pub records: Vec<MoodRecord>,
    /// When this ledger was last written
    pub last_updated: i64,
    /// When this ledger was created
    pub created_at: i64,
    /// PDA bump seed
    pub bump: u8,
}

impl MoodLedger {
    pub const BASE_SIZE: usize = 8 +  // discriminator
        32 +                          // owner
        TrendState::SIZE +            // trend
        4 +                           // records vec prefix
        8 +                           // last_updated
        8 +                           // created_at
        1;                            // bump
    // Total: 94 bytes + 40 per record

    pub fn space(record_count: usize) -> usize {
        Self::BASE_SIZE + record_count * MoodRecord::SIZE
    }

    /// Exact account size once `day` is stored.
    pub fn space_after_store(&self, day: DayKey) -> usize {
        if self.position(day).is_some() {
            Self::space(self.records.len())
        } else {
            Self::space(self.records.len() + 1)
        }
    }

    fn position(&self, day: DayKey) -> Option<usize> {
        self.records.iter().position(|r| r.day == day)
    }

    /// Insert or replace the entry for `day`.
    /// Returns `true` when a new record was appended; a rewrite keeps the
    /// record's position.
    pub fn upsert(&mut self, day: DayKey, value: EncryptedScalar) -> bool {
        match self.position(day) {
            Some(index) => {
                self.records[index].value = value;
                false
            }
            None => {
                self.records.push(MoodRecord { day, value });
                true
            }
        }
    }

    /// Day keys in insertion order.
    pub fn days(&self) -> Vec<DayKey> {
        self.records.iter().map(|r| r.day).collect()
    }

    /// Read `owner`'s ledger from a PDA that may not have been created yet.
    /// An empty account reads as `None`, the same as an empty ledger.
    pub fn load_if_initialized(info: &AccountInfo, owner: &Pubkey) -> Result<Option<Self>> {
        if info.data_is_empty() {
            return Ok(None);
        }
        if *info.owner != crate::ID {
            return Err(anchor_lang::error::ErrorCode::AccountOwnedByWrongProgram.into());
        }

        let data = info.try_borrow_data()?;
        let ledger = Self::try_deserialize(&mut &data[..])?;
        require_keys_eq!(ledger.owner, *owner, MoodTrendError::LedgerOwnerMismatch);
        Ok(Some(ledger))
    }

    /// Run the trend engine over the current records. Returns the new trend
    /// ciphertext, or `None` when there is not enough data yet. Only the last
    /// two windows are read, so the cost does not grow with the ledger.
    pub fn recompute_trend(&mut self, fhe: &mut FheContext) -> Option<EncryptedScalar> {
        let n = self.records.len();
        if n < TREND_WINDOW {
            return None;
        }
        let tail: Vec<EncryptedScalar> = self.records[n.saturating_sub(2 * TREND_WINDOW)..]
            .iter()
            .map(|r| r.value)
            .collect();
        let diff = window_diff(&tail, fhe)?;
        self.trend = TrendState {
            value: diff,
            ready: true,
        };
        Some(diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FheOp;

    const DAY: i64 = SECONDS_PER_DAY;

    fn ledger() -> MoodLedger {
        MoodLedger {
            owner: Pubkey::new_unique(),
            trend: TrendState::default(),
            records: Vec::new(),
            last_updated: 0,
            created_at: 0,
            bump: 255,
        }
    }

    fn value(byte: u8) -> EncryptedScalar {
        EncryptedScalar::from_handle([byte; 32])
    }

    #[test]
    fn test_day_key_floors_to_utc_midnight() {
        assert_eq!(day_key_from_timestamp(0), 0);
        assert_eq!(day_key_from_timestamp(DAY - 1), 0);
        assert_eq!(day_key_from_timestamp(3 * DAY + 5), 3 * DAY);
        // Pre-epoch timestamps floor downward
        assert_eq!(day_key_from_timestamp(-1), -DAY);
    }

    #[test]
    fn test_upsert_same_day_replaces_in_place() {
        let mut ledger = ledger();
        assert!(ledger.upsert(DAY, value(1)));
        assert!(ledger.upsert(2 * DAY, value(2)));
        assert!(!ledger.upsert(DAY, value(3)));

        assert_eq!(ledger.days(), vec![DAY, 2 * DAY]);
        assert_eq!(ledger.records[0].value, value(3));
    }

    #[test]
    fn test_days_keep_insertion_order() {
        let mut ledger = ledger();
        ledger.upsert(3 * DAY, value(3));
        ledger.upsert(DAY, value(1));
        ledger.upsert(2 * DAY, value(2));

        assert_eq!(ledger.days(), vec![3 * DAY, DAY, 2 * DAY]);
    }

    #[test]
    fn test_space_after_store_grows_only_for_new_days() {
        let mut ledger = ledger();
        assert_eq!(MoodLedger::space(0), 94);
        assert_eq!(ledger.space_after_store(DAY), 94 + 40);

        ledger.upsert(DAY, value(1));
        assert_eq!(ledger.space_after_store(DAY), 94 + 40);
        assert_eq!(ledger.space_after_store(2 * DAY), 94 + 80);
    }

    #[test]
    fn test_load_if_initialized() {
        let key = Pubkey::new_unique();
        let mut stored = ledger();
        stored.upsert(DAY, value(1));
        let owner = stored.owner;

        let mut data = Vec::new();
        stored.try_serialize(&mut data).unwrap();
        let mut lamports = 1_000_000u64;
        let info = AccountInfo::new(&key, false, false, &mut lamports, &mut data, &crate::ID, false, 0);

        let loaded = MoodLedger::load_if_initialized(&info, &owner).unwrap().unwrap();
        assert_eq!(loaded.days(), vec![DAY]);
        assert!(MoodLedger::load_if_initialized(&info, &Pubkey::new_unique()).is_err());
    }

    #[test]
    fn test_load_if_initialized_absent_account() {
        let key = Pubkey::new_unique();
        let system = Pubkey::default();
        let mut data: Vec<u8> = Vec::new();
        let mut lamports = 0u64;
        let info = AccountInfo::new(&key, false, false, &mut lamports, &mut data, &system, false, 0);

        assert!(MoodLedger::load_if_initialized(&info, &Pubkey::new_unique())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_load_if_initialized_rejects_foreign_program() {
        let key = Pubkey::new_unique();
        let foreign = Pubkey::new_unique();
        let mut data = vec![1u8; 16];
        let mut lamports = 1u64;
        let info = AccountInfo::new(&key, false, false, &mut lamports, &mut data, &foreign, false, 0);

        assert!(MoodLedger::load_if_initialized(&info, &Pubkey::new_unique()).is_err());
    }

    #[test]
    fn test_recompute_trend_gated_on_window() {
        let mut ledger = ledger();
        for i in 1..=6u8 {
            ledger.upsert(i as i64 * DAY, value(i));
            assert!(ledger.recompute_trend(&mut FheContext::new()).is_none());
            assert!(!ledger.trend.ready);
        }

        ledger.upsert(7 * DAY, value(7));
        let diff = ledger.recompute_trend(&mut FheContext::new()).unwrap();
        assert!(ledger.trend.ready);
        assert_eq!(ledger.trend.value, diff);
    }

    #[test]
    fn test_recompute_trend_reads_last_two_windows_only() {
        let mut ledger = ledger();
        for i in 1..=40u8 {
            ledger.upsert(i as i64 * DAY, value(i));
        }

        let mut fhe = FheContext::new();
        ledger.recompute_trend(&mut fhe).unwrap();
        let ops = fhe.into_ops();

        // 6 adds per window plus the final sub, independent of ledger length
        assert_eq!(ops.len(), 13);
        let inputs: Vec<EncryptedScalar> = ops
            .iter()
            .filter_map(|op| match op {
                FheOp::Add { lhs, rhs, .. } => Some([*lhs, *rhs]),
                _ => None,
            })
            .flatten()
            .filter(|h| (1..=40u8).any(|i| *h == value(i)))
            .collect();
        let expected: Vec<EncryptedScalar> = (27..=40u8).map(value).collect();
        assert_eq!(inputs.len(), expected.len());
        assert!(inputs.iter().all(|h| expected.contains(h)));
    }
}
