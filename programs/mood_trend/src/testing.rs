//! Test-only coprocessor. Holds plaintexts keyed by handle and replays the
//! `FheOp` work orders the program emits, so tests can decrypt results.

use std::collections::{BTreeSet, HashMap};

use anchor_lang::prelude::*;
use solana_program::{ed25519_program, instruction::Instruction, keccak};

use crate::state::{
    input_attestation_message, EncryptedScalar, FheOp, GrantRequest, MoodLedger, TrendState,
};

/// Single-signature Ed25519 program instruction with every offset pointing
/// into itself: pubkey at 16, signature at 48, message at 112. The signature
/// bytes are zeroed; the runtime precompile is what checks them.
pub fn attestation_instruction(signer: &Pubkey, message: &[u8]) -> Instruction {
    const PUBKEY_OFFSET: u16 = 16;
    const SIGNATURE_OFFSET: u16 = 48;
    const MESSAGE_OFFSET: u16 = 112;

    let mut data = vec![1u8, 0u8];
    for field in [
        SIGNATURE_OFFSET,
        u16::MAX,
        PUBKEY_OFFSET,
        u16::MAX,
        MESSAGE_OFFSET,
        message.len() as u16,
        u16::MAX,
    ] {
        data.extend_from_slice(&field.to_le_bytes());
    }
    data.extend_from_slice(signer.as_ref());
    data.extend_from_slice(&[0u8; 64]);
    data.extend_from_slice(message);

    Instruction {
        program_id: ed25519_program::ID,
        accounts: Vec::new(),
        data,
    }
}

pub struct MockCoprocessor {
    key: Pubkey,
    plaintexts: HashMap<[u8; 32], i64>,
    inputs_issued: u64,
}

impl MockCoprocessor {
    pub fn new() -> Self {
        Self {
            key: Pubkey::new_unique(),
            plaintexts: HashMap::new(),
            inputs_issued: 0,
        }
    }

    /// Attestation signing key.
    pub fn key(&self) -> Pubkey {
        self.key
    }

    /// Encrypt `value` for `caller` targeting this program. Returns the raw
    /// handle and the attestation instruction to place in the transaction.
    pub fn encrypt_input(&mut self, value: i64, caller: &Pubkey) -> ([u8; 32], Instruction) {
        self.inputs_issued += 1;
        let raw = keccak::hashv(&[b"mock_input", &self.inputs_issued.to_le_bytes()]).to_bytes();
        self.plaintexts.insert(raw, value);
        let message = input_attestation_message(&raw, caller, &crate::ID);
        (raw, attestation_instruction(&self.key, &message))
    }

    pub fn execute(&mut self, ops: &[FheOp]) {
        for op in ops {
            let (result, plaintext) = match *op {
                FheOp::TrivialEncrypt { scalar, result } => (result, scalar),
                FheOp::Add { lhs, rhs, result } => {
                    (result, self.plaintext(&lhs).wrapping_add(self.plaintext(&rhs)))
                }
                FheOp::Sub { lhs, rhs, result } => {
                    (result, self.plaintext(&lhs).wrapping_sub(self.plaintext(&rhs)))
                }
            };
            self.plaintexts.insert(result.handle, plaintext);
        }
    }

    pub fn decrypt(&self, value: &EncryptedScalar) -> Option<i64> {
        self.plaintexts.get(&value.handle).copied()
    }

    fn plaintext(&self, value: &EncryptedScalar) -> i64 {
        match self.decrypt(value) {
            Some(v) => v,
            None => panic!("coprocessor has no ciphertext for {:?}", value.handle),
        }
    }
}

/// In-memory stand-in for the grant PDAs a store creates.
#[derive(Default, Clone, PartialEq, Eq, Debug)]
pub struct GrantStore {
    grants: BTreeSet<([u8; 32], Pubkey)>,
}

impl GrantStore {
    pub fn apply(&mut self, requests: &[GrantRequest]) {
        for request in requests {
            self.grants.insert((request.value.handle, request.grantee));
        }
    }

    pub fn is_allowed(&self, value: &EncryptedScalar, grantee: &Pubkey) -> bool {
        self.grants.contains(&(value.handle, *grantee))
    }

    pub fn grantees(&self, value: &EncryptedScalar) -> BTreeSet<Pubkey> {
        self.grants
            .iter()
            .filter(|(handle, _)| *handle == value.handle)
            .map(|(_, grantee)| *grantee)
            .collect()
    }

    pub fn all_grantees(&self) -> BTreeSet<Pubkey> {
        self.grants.iter().map(|(_, grantee)| *grantee).collect()
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum TrendLabel {
    Positive,
    Neutral,
    Negative,
}

/// Client-side reading of a decrypted trend.
pub fn classify(diff: i64) -> TrendLabel {
    if diff > 7 {
        TrendLabel::Positive
    } else if diff < 0 {
        TrendLabel::Negative
    } else {
        TrendLabel::Neutral
    }
}

pub fn new_ledger(owner: Pubkey) -> MoodLedger {
    MoodLedger {
        owner,
        trend: TrendState::default(),
        records: Vec::new(),
        last_updated: 0,
        created_at: 0,
        bump: 255,
    }
}
