//! Account role checks for each escrow instruction.
//!
//! Every instruction parses its ordered account list into one of the structs
//! below before anything is mutated, so a mismatch aborts the transaction
//! with no side effects.

use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack},
    pubkey::Pubkey,
    sysvar::{rent::Rent, Sysvar},
};
use spl_token::state::Account as TokenAccount;

use crate::{custody::escrow_authority, error::EscrowError, state::Escrow};

pub fn expect_signer(account: &AccountInfo) -> ProgramResult {
    if !account.is_signer {
        return Err(EscrowError::InvalidAccount.into());
    }
    Ok(())
}

pub fn expect_writable(account: &AccountInfo) -> ProgramResult {
    if !account.is_writable {
        return Err(EscrowError::InvalidAccount.into());
    }
    Ok(())
}

pub fn expect_owner(account: &AccountInfo, owner: &Pubkey) -> ProgramResult {
    if account.owner != owner {
        return Err(EscrowError::InvalidAccount.into());
    }
    Ok(())
}

pub fn expect_key(account: &AccountInfo, key: &Pubkey) -> ProgramResult {
    if account.key != key {
        return Err(EscrowError::InvalidAccount.into());
    }
    Ok(())
}

pub fn expect_token_program(account: &AccountInfo) -> ProgramResult {
    if *account.key != spl_token::id() {
        return Err(ProgramError::IncorrectProgramId);
    }
    Ok(())
}

/// Reads an SPL token account, insisting the token program owns it.
pub fn unpack_token_account(account: &AccountInfo) -> Result<TokenAccount, ProgramError> {
    expect_owner(account, &spl_token::id())?;
    TokenAccount::unpack(&account.try_borrow_data()?)
}

/// Loads an escrow record that is still open.
///
/// A purged account (no lamports or no data) and a zeroed record both count as closed.
pub fn load_open_escrow(
    program_id: &Pubkey,
    escrow_account: &AccountInfo,
) -> Result<Escrow, ProgramError> {
    if escrow_account.lamports() == 0 || escrow_account.data_is_empty() {
        return Err(EscrowError::EscrowAlreadyClosed.into());
    }
    expect_owner(escrow_account, program_id)?;
    let escrow = Escrow::decode(&escrow_account.try_borrow_data()?)?;
    if !escrow.is_initialized() {
        return Err(EscrowError::EscrowAlreadyClosed.into());
    }
    Ok(escrow)
}

pub struct InitEscrowAccounts<'a, 'info> {
    pub initializer: &'a AccountInfo<'info>,
    pub temp_token_account: &'a AccountInfo<'info>,
    pub receiving_token_account: &'a AccountInfo<'info>,
    pub escrow_account: &'a AccountInfo<'info>,
    pub token_program: &'a AccountInfo<'info>,
}

impl<'a, 'info> InitEscrowAccounts<'a, 'info> {
    pub fn validate(
        program_id: &Pubkey,
        accounts: &'a [AccountInfo<'info>],
    ) -> Result<Self, ProgramError> {
        let account_info_iter = &mut accounts.iter();
        let initializer = next_account_info(account_info_iter)?;
        expect_signer(initializer)?;

        // Token-level ownership of the temp account is checked when custody is taken.
        let temp_token_account = next_account_info(account_info_iter)?;
        expect_writable(temp_token_account)?;

        let receiving_token_account = next_account_info(account_info_iter)?;
        expect_owner(receiving_token_account, &spl_token::id())?;

        let escrow_account = next_account_info(account_info_iter)?;
        expect_writable(escrow_account)?;
        expect_owner(escrow_account, program_id)?;

        let rent = &Rent::from_account_info(next_account_info(account_info_iter)?)?;
        if !rent.is_exempt(escrow_account.lamports(), escrow_account.data_len()) {
            return Err(EscrowError::NotRentExempt.into());
        }

        let escrow = Escrow::decode(&escrow_account.try_borrow_data()?)?;
        if escrow.is_initialized() {
            return Err(EscrowError::AlreadyInitialized.into());
        }

        let token_program = next_account_info(account_info_iter)?;
        expect_token_program(token_program)?;

        Ok(Self {
            initializer,
            temp_token_account,
            receiving_token_account,
            escrow_account,
            token_program,
        })
    }
}

pub struct ExchangeAccounts<'a, 'info> {
    pub taker: &'a AccountInfo<'info>,
    pub taker_sending_token_account: &'a AccountInfo<'info>,
    pub taker_receiving_token_account: &'a AccountInfo<'info>,
    pub temp_token_account: &'a AccountInfo<'info>,
    pub initializer: &'a AccountInfo<'info>,
    pub initializer_receiving_token_account: &'a AccountInfo<'info>,
    pub escrow_account: &'a AccountInfo<'info>,
    pub token_program: &'a AccountInfo<'info>,
    pub pda_account: &'a AccountInfo<'info>,
    pub escrow: Escrow,
    pub bump_seed: u8,
}

impl<'a, 'info> ExchangeAccounts<'a, 'info> {
    /// `offered` is the asset-Y amount named in the instruction, if any.
    /// Only an exact match of the recorded amount is accepted.
    pub fn validate(
        program_id: &Pubkey,
        accounts: &'a [AccountInfo<'info>],
        offered: Option<u64>,
    ) -> Result<Self, ProgramError> {
        let account_info_iter = &mut accounts.iter();
        let taker = next_account_info(account_info_iter)?;
        expect_signer(taker)?;

        let taker_sending_token_account = next_account_info(account_info_iter)?;
        let taker_receiving_token_account = next_account_info(account_info_iter)?;
        let temp_token_account = next_account_info(account_info_iter)?;
        let initializer = next_account_info(account_info_iter)?;
        let initializer_receiving_token_account = next_account_info(account_info_iter)?;
        let escrow_account = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;
        let pda_account = next_account_info(account_info_iter)?;

        let escrow = load_open_escrow(program_id, escrow_account)?;
        expect_writable(escrow_account)?;

        expect_key(temp_token_account, &escrow.initializer_temp_token_account_pubkey)?;
        expect_writable(temp_token_account)?;
        expect_key(initializer, &escrow.initializer_pubkey)?;
        expect_writable(initializer)?;
        expect_key(
            initializer_receiving_token_account,
            &escrow.initializer_receiving_token_account_pubkey,
        )?;

        expect_token_program(token_program)?;
        let (pda, bump_seed) = escrow_authority(program_id);
        expect_key(pda_account, &pda)?;

        if let Some(offered) = offered {
            if offered != escrow.expected_amount {
                return Err(EscrowError::ExpectedAmountMismatch.into());
            }
        }

        Ok(Self {
            taker,
            taker_sending_token_account,
            taker_receiving_token_account,
            temp_token_account,
            initializer,
            initializer_receiving_token_account,
            escrow_account,
            token_program,
            pda_account,
            escrow,
            bump_seed,
        })
    }
}

pub struct CancelAccounts<'a, 'info> {
    pub initializer: &'a AccountInfo<'info>,
    pub temp_token_account: &'a AccountInfo<'info>,
    pub refund_token_account: &'a AccountInfo<'info>,
    pub escrow_account: &'a AccountInfo<'info>,
    pub token_program: &'a AccountInfo<'info>,
    pub pda_account: &'a AccountInfo<'info>,
    pub escrow: Escrow,
    pub bump_seed: u8,
}

impl<'a, 'info> CancelAccounts<'a, 'info> {
    pub fn validate(
        program_id: &Pubkey,
        accounts: &'a [AccountInfo<'info>],
    ) -> Result<Self, ProgramError> {
        let account_info_iter = &mut accounts.iter();
        let initializer = next_account_info(account_info_iter)?;
        expect_signer(initializer)?;
        expect_writable(initializer)?;

        let temp_token_account = next_account_info(account_info_iter)?;
        let refund_token_account = next_account_info(account_info_iter)?;
        let escrow_account = next_account_info(account_info_iter)?;
        let token_program = next_account_info(account_info_iter)?;
        let pda_account = next_account_info(account_info_iter)?;

        let escrow = load_open_escrow(program_id, escrow_account)?;
        expect_writable(escrow_account)?;
        expect_key(initializer, &escrow.initializer_pubkey)?;
        expect_key(temp_token_account, &escrow.initializer_temp_token_account_pubkey)?;
        expect_writable(temp_token_account)?;

        expect_token_program(token_program)?;
        let (pda, bump_seed) = escrow_authority(program_id);
        expect_key(pda_account, &pda)?;

        // The deposit only ever goes back to the initializer.
        if unpack_token_account(refund_token_account)?.owner != *initializer.key {
            return Err(EscrowError::InvalidAccount.into());
        }

        Ok(Self {
            initializer,
            temp_token_account,
            refund_token_account,
            escrow_account,
            token_program,
            pda_account,
            escrow,
            bump_seed,
        })
    }
}
