use anchor_lang::prelude::*;
use solana_program::{ed25519_program, instruction::Instruction, keccak};

use crate::constants::{HANDLE_DOMAIN, INPUT_DOMAIN, INPUT_PROOF_VERSION};
use crate::errors::MoodTrendError;

pub const HANDLE_LEN: usize = 32;

/// Opaque ciphertext handle. The key material and the plaintext live with the
/// off-chain coprocessor; the program only ever sees this 32-byte reference.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct EncryptedScalar {
    pub handle: [u8; HANDLE_LEN],
}

impl EncryptedScalar {
    pub const SIZE: usize = HANDLE_LEN;

    pub fn from_handle(handle: [u8; HANDLE_LEN]) -> Self {
        Self { handle }
    }
}

/// Arithmetic domain of every scalar. Mixed into derived handles so the
/// coprocessor evaluates `Sub` as signed two's complement and a falling
/// trend decrypts to a negative number.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum ScalarType {
    Int64 = 0,
}

/// Operation tags. Also the first byte of the handle preimage.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum FheOpKind {
    TrivialEncrypt = 0,
    Add = 1,
    Sub = 2,
}

/// Work order for the coprocessor: evaluate this op and bind the ciphertext
/// to `result`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum FheOp {
    TrivialEncrypt {
        scalar: i64,
        result: EncryptedScalar,
    },
    Add {
        lhs: EncryptedScalar,
        rhs: EncryptedScalar,
        result: EncryptedScalar,
    },
    Sub {
        lhs: EncryptedScalar,
        rhs: EncryptedScalar,
        result: EncryptedScalar,
    },
}

/// Derive the handle of an op result.
/// handle = keccak256(domain || kind || scalar_type || operands...)
fn derive_handle(kind: FheOpKind, operands: &[&[u8]]) -> EncryptedScalar {
    let kind_tag = [kind as u8];
    let type_tag = [ScalarType::Int64 as u8];
    let mut input: Vec<&[u8]> = Vec::with_capacity(3 + operands.len());
    input.push(HANDLE_DOMAIN);
    input.push(&kind_tag);
    input.push(&type_tag);
    input.extend_from_slice(operands);
    EncryptedScalar::from_handle(keccak::hashv(&input).to_bytes())
}

/// Symbolic evaluator for one instruction. Every operation returns the result
/// handle immediately and queues the matching `FheOp`; the caller emits the
/// queue so the coprocessor can materialize the ciphertexts.
#[derive(Default, Debug)]
pub struct FheContext {
    ops: Vec<FheOp>,
}

impl FheContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Additive identity.
    pub fn zero(&mut self) -> EncryptedScalar {
        self.trivial_encrypt(0)
    }

    pub fn trivial_encrypt(&mut self, scalar: i64) -> EncryptedScalar {
        let result = derive_handle(FheOpKind::TrivialEncrypt, &[&scalar.to_le_bytes()]);
        self.ops.push(FheOp::TrivialEncrypt { scalar, result });
        result
    }

    pub fn add(&mut self, lhs: EncryptedScalar, rhs: EncryptedScalar) -> EncryptedScalar {
        let result = derive_handle(FheOpKind::Add, &[&lhs.handle, &rhs.handle]);
        self.ops.push(FheOp::Add { lhs, rhs, result });
        result
    }

    pub fn sub(&mut self, lhs: EncryptedScalar, rhs: EncryptedScalar) -> EncryptedScalar {
        let result = derive_handle(FheOpKind::Sub, &[&lhs.handle, &rhs.handle]);
        self.ops.push(FheOp::Sub { lhs, rhs, result });
        result
    }

    /// Left fold with `add`; an empty slice sums to `zero()`.
    pub fn sum(&mut self, values: &[EncryptedScalar]) -> EncryptedScalar {
        match values.split_first() {
            None => self.zero(),
            Some((first, rest)) => rest.iter().fold(*first, |acc, v| self.add(acc, *v)),
        }
    }

    pub fn into_ops(self) -> Vec<FheOp> {
        self.ops
    }
}

/// Ed25519 instruction layout: [count: u8][padding: u8] then 14 bytes of
/// little-endian u16 offsets per signature.
const ED25519_OFFSETS_START: usize = 2;
/// Instruction index meaning "data lives in this same instruction".
const ED25519_SELF_INDEX: u16 = u16::MAX;

/// Message the coprocessor signs for an input ciphertext.
/// message = keccak256(input_domain || raw_handle || caller || target)
pub fn input_attestation_message(
    raw_handle: &[u8; HANDLE_LEN],
    caller: &Pubkey,
    target: &Pubkey,
) -> [u8; 32] {
    keccak::hashv(&[INPUT_DOMAIN, raw_handle, caller.as_ref(), target.as_ref()]).to_bytes()
}

/// Proof wire format: `[version][index of the Ed25519 instruction]`.
/// Returns the instruction index.
pub fn decode_input_proof(proof: &[u8]) -> Result<u8> {
    match proof {
        [version, index] if *version == INPUT_PROOF_VERSION => Ok(*index),
        _ => err!(MoodTrendError::ProofInvalid),
    }
}

fn read_u16(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at + 2)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Signer key and message of a single-signature Ed25519 program instruction.
/// Offsets pointing into other instructions are refused so the checked
/// bytes are the ones the precompile verified.
fn ed25519_signed_message(ix: &Instruction) -> Option<(&[u8], &[u8])> {
    if ix.program_id != ed25519_program::ID {
        return None;
    }
    let data = ix.data.as_slice();
    if data.first() != Some(&1) {
        return None;
    }

    let o = ED25519_OFFSETS_START;
    let signature_ix = read_u16(data, o + 2)?;
    let pubkey_offset = read_u16(data, o + 4)? as usize;
    let pubkey_ix = read_u16(data, o + 6)?;
    let message_offset = read_u16(data, o + 8)? as usize;
    let message_size = read_u16(data, o + 10)? as usize;
    let message_ix = read_u16(data, o + 12)?;
    if [signature_ix, pubkey_ix, message_ix]
        .iter()
        .any(|index| *index != ED25519_SELF_INDEX)
    {
        return None;
    }

    let pubkey = data.get(pubkey_offset..pubkey_offset + 32)?;
    let message = data.get(message_offset..message_offset + message_size)?;
    Some((pubkey, message))
}

/// Accept an externally encrypted value.
///
/// `attestation` is the Ed25519 program instruction carried in the same
/// transaction; the runtime has already verified its signature. It must be
/// signed by `coprocessor` over `input_attestation_message(raw_handle,
/// caller, target)`. A zero handle is never a valid ciphertext.
pub fn from_external(
    raw_handle: [u8; HANDLE_LEN],
    attestation: &Instruction,
    caller: &Pubkey,
    target: &Pubkey,
    coprocessor: &Pubkey,
) -> Result<EncryptedScalar> {
    require!(raw_handle != [0u8; HANDLE_LEN], MoodTrendError::ProofInvalid);

    let (signer, message) =
        ed25519_signed_message(attestation).ok_or(error!(MoodTrendError::ProofInvalid))?;
    require!(
        signer == &coprocessor.to_bytes()[..],
        MoodTrendError::ProofInvalid
    );

    let expected = input_attestation_message(&raw_handle, caller, target);
    require!(message == &expected[..], MoodTrendError::ProofInvalid);

    Ok(EncryptedScalar::from_handle(raw_handle))
}
