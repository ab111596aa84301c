use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    sysvar,
};

use crate::{custody::escrow_authority, error::EscrowError::InvalidInstruction};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EscrowInstruction {
    /// Opens an escrow: records the terms and hands the temp token account to the program.
    ///
    /// Accounts expected:
    ///
    /// 0. `[signer]` The account of the person initializing the escrow
    /// 1. `[writable]` Temp token account, already funded with asset X and owned by the initializer
    /// 2. `[]` The initializer's token account for asset Y
    /// 3. `[writable]` The escrow account, it will hold all necessary info about the trade
    /// 4. `[]` The rent sysvar
    /// 5. `[]` The token program
    InitEscrow {
        /// Asset Y the initializer expects to receive
        amount: u64,
    },
    /// Settles an open escrow.
    ///
    /// Accounts expected:
    ///
    /// 0. `[signer]` The account of the person taking the trade
    /// 1. `[writable]` The taker's token account for asset Y they send
    /// 2. `[writable]` The taker's token account for asset X they receive
    /// 3. `[writable]` The temp token account holding the deposit
    /// 4. `[writable]` The initializer's main account, to refund rent
    /// 5. `[writable]` The initializer's token account that will receive asset Y
    /// 6. `[writable]` The escrow account holding the escrow info
    /// 7. `[]` The token program
    /// 8. `[]` The PDA account
    Exchange {
        /// Asset Y offered by the taker. Must equal the recorded amount when present.
        amount: Option<u64>,
    },
    /// Returns the deposit to the initializer and closes the escrow.
    ///
    /// Accounts expected:
    ///
    /// 0. `[signer, writable]` The initializer
    /// 1. `[writable]` The temp token account holding the deposit
    /// 2. `[writable]` The initializer's token account for asset X
    /// 3. `[writable]` The escrow account holding the escrow info
    /// 4. `[]` The token program
    /// 5. `[]` The PDA account
    Cancel,
}

impl EscrowInstruction {
    /// Unpacks a byte buffer into an [EscrowInstruction](enum.EscrowInstruction.html).
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input.split_first().ok_or(InvalidInstruction)?;

        Ok(match tag {
            0 => Self::InitEscrow {
                amount: Self::unpack_amount(rest)?,
            },
            1 => Self::Exchange {
                amount: if rest.is_empty() {
                    None
                } else {
                    Some(Self::unpack_amount(rest)?)
                },
            },
            2 => Self::Cancel,
            _ => return Err(InvalidInstruction.into()),
        })
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(9);
        match *self {
            Self::InitEscrow { amount } => {
                buf.push(0);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::Exchange { amount } => {
                buf.push(1);
                if let Some(amount) = amount {
                    buf.extend_from_slice(&amount.to_le_bytes());
                }
            }
            Self::Cancel => buf.push(2),
        }
        buf
    }

    fn unpack_amount(input: &[u8]) -> Result<u64, ProgramError> {
        let amount = input
            .get(..8)
            .and_then(|slice| slice.try_into().ok())
            .map(u64::from_le_bytes)
            .ok_or(InvalidInstruction)?;
        Ok(amount)
    }
}

/// Creates an `InitEscrow` instruction.
pub fn init_escrow(
    program_id: &Pubkey,
    initializer: &Pubkey,
    temp_token_account: &Pubkey,
    receiving_token_account: &Pubkey,
    escrow_account: &Pubkey,
    amount: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*initializer, true),
            AccountMeta::new(*temp_token_account, false),
            AccountMeta::new_readonly(*receiving_token_account, false),
            AccountMeta::new(*escrow_account, false),
            AccountMeta::new_readonly(sysvar::rent::id(), false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data: EscrowInstruction::InitEscrow { amount }.pack(),
    }
}

/// Creates an `Exchange` instruction.
#[allow(clippy::too_many_arguments)]
pub fn exchange(
    program_id: &Pubkey,
    taker: &Pubkey,
    taker_sending_token_account: &Pubkey,
    taker_receiving_token_account: &Pubkey,
    temp_token_account: &Pubkey,
    initializer: &Pubkey,
    initializer_receiving_token_account: &Pubkey,
    escrow_account: &Pubkey,
    amount: Option<u64>,
) -> Instruction {
    let (pda, _bump) = escrow_authority(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*taker, true),
            AccountMeta::new(*taker_sending_token_account, false),
            AccountMeta::new(*taker_receiving_token_account, false),
            AccountMeta::new(*temp_token_account, false),
            AccountMeta::new(*initializer, false),
            AccountMeta::new(*initializer_receiving_token_account, false),
            AccountMeta::new(*escrow_account, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(pda, false),
        ],
        data: EscrowInstruction::Exchange { amount }.pack(),
    }
}

/// Creates a `Cancel` instruction.
pub fn cancel(
    program_id: &Pubkey,
    initializer: &Pubkey,
    temp_token_account: &Pubkey,
    refund_token_account: &Pubkey,
    escrow_account: &Pubkey,
) -> Instruction {
    let (pda, _bump) = escrow_authority(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*initializer, true),
            AccountMeta::new(*temp_token_account, false),
            AccountMeta::new(*refund_token_account, false),
            AccountMeta::new(*escrow_account, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(pda, false),
        ],
        data: EscrowInstruction::Cancel.pack(),
    }
}
