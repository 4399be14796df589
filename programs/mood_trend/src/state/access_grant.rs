use anchor_lang::prelude::*;

use super::encrypted_scalar::EncryptedScalar;
use crate::constants::GRANT_SEED;

/// A grant the store pipeline wants recorded: `grantee` may request
/// decryption of `value` from the coprocessor.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct GrantRequest {
    pub value: EncryptedScalar,
    pub grantee: Pubkey,
}

/// One (ciphertext, grantee) permission.
/// PDA seeds: ["grant", value handle, grantee]. The account existing is the
/// grant; grants are never revoked and re-granting is a no-op.
#[account]
#[derive(Debug)]
pub struct AccessGrant {
    /// The wallet whose ciphertext this grant covers
    pub owner: Pubkey,
    /// Ciphertext the grantee may decrypt
    pub value: EncryptedScalar,
    /// Principal allowed to request decryption
    pub grantee: Pubkey,
    /// PDA bump seed
    pub bump: u8,
}

impl AccessGrant {
    pub const SIZE: usize = 8 +    // discriminator
        32 +                       // owner
        EncryptedScalar::SIZE +    // value
        32 +                       // grantee
        1;                         // bump
    // Total: 105 bytes

    pub fn address(value: &EncryptedScalar, grantee: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[GRANT_SEED, &value.handle, grantee.as_ref()], program_id)
    }

    pub fn covers(&self, value: &EncryptedScalar, grantee: &Pubkey) -> bool {
        self.value == *value && self.grantee == *grantee
    }
}
