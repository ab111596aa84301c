use solana_program::{
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};

use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};

use crate::error::EscrowError;

/// Terms of one open swap, stored in the escrow state account.
///
/// Layout (105 bytes, little-endian):
/// `is_initialized` (1) · `initializer_pubkey` (32) ·
/// `initializer_temp_token_account_pubkey` (32) ·
/// `initializer_receiving_token_account_pubkey` (32) · `expected_amount` (8)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Escrow {
    pub is_initialized: bool,
    /// Only this key may cancel.
    pub initializer_pubkey: Pubkey,
    /// Holds the asset-X deposit while the escrow is open. Its token-owner is the program PDA.
    pub initializer_temp_token_account_pubkey: Pubkey,
    /// Asset-Y lands here on exchange.
    pub initializer_receiving_token_account_pubkey: Pubkey,
    /// Asset-Y the initializer wants in return.
    pub expected_amount: u64,
}

impl Escrow {
    /// Decodes a record, rejecting anything that is not exactly `Escrow::LEN` bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProgramError> {
        if bytes.len() != Self::LEN {
            return Err(EscrowError::MalformedState.into());
        }
        Self::unpack_unchecked(bytes)
    }

    pub fn encode(&self) -> [u8; Self::LEN] {
        let mut dst = [0u8; Self::LEN];
        self.pack_into_slice(&mut dst);
        dst
    }
}

impl Sealed for Escrow {}

impl IsInitialized for Escrow {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for Escrow {
    const LEN: usize = 105;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        if src.len() < Self::LEN {
            return Err(EscrowError::MalformedState.into());
        }
        let src = array_ref![src, 0, Escrow::LEN];
        let (is_initialized, initializer, temp_token_account, receiving_token_account, amount) =
            array_refs![src, 1, 32, 32, 32, 8];
        let is_initialized = match is_initialized {
            [0] => false,
            [1] => true,
            _ => return Err(ProgramError::InvalidAccountData),
        };

        Ok(Escrow {
            is_initialized,
            initializer_pubkey: Pubkey::new_from_array(*initializer),
            initializer_temp_token_account_pubkey: Pubkey::new_from_array(*temp_token_account),
            initializer_receiving_token_account_pubkey: Pubkey::new_from_array(
                *receiving_token_account,
            ),
            expected_amount: u64::from_le_bytes(*amount),
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, Escrow::LEN];
        let (
            is_initialized_dst,
            initializer_dst,
            temp_token_account_dst,
            receiving_token_account_dst,
            amount_dst,
        ) = mut_array_refs![dst, 1, 32, 32, 32, 8];

        is_initialized_dst[0] = self.is_initialized as u8;
        initializer_dst.copy_from_slice(self.initializer_pubkey.as_ref());
        temp_token_account_dst.copy_from_slice(self.initializer_temp_token_account_pubkey.as_ref());
        receiving_token_account_dst
            .copy_from_slice(self.initializer_receiving_token_account_pubkey.as_ref());
        *amount_dst = self.expected_amount.to_le_bytes();
    }
}
