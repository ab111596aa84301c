use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    msg,
    program_pack::Pack,
    pubkey::Pubkey,
    system_program,
};

use crate::{
    custody,
    error::EscrowError,
    instruction::EscrowInstruction,
    state::Escrow,
    validation::{CancelAccounts, ExchangeAccounts, InitEscrowAccounts},
};

pub struct Processor;
impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = EscrowInstruction::unpack(instruction_data)?;

        match instruction {
            EscrowInstruction::InitEscrow { amount } => {
                msg!("Instruction: InitEscrow");
                Self::process_init_escrow(accounts, amount, program_id)
            }
            EscrowInstruction::Exchange { amount } => {
                msg!("Instruction: Exchange");
                Self::process_exchange(accounts, amount, program_id)
            }
            EscrowInstruction::Cancel => {
                msg!("Instruction: Cancel");
                Self::process_cancel(accounts, program_id)
            }
        }
    }

    /// Uninitialized -> Open
    fn process_init_escrow(
        accounts: &[AccountInfo],
        amount: u64,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let accounts = InitEscrowAccounts::validate(program_id, accounts)?;

        custody::take_custody(
            program_id,
            accounts.token_program,
            accounts.temp_token_account,
            accounts.initializer,
        )?;

        let escrow = Escrow {
            is_initialized: true,
            initializer_pubkey: *accounts.initializer.key,
            initializer_temp_token_account_pubkey: *accounts.temp_token_account.key,
            initializer_receiving_token_account_pubkey: *accounts.receiving_token_account.key,
            expected_amount: amount,
        };
        Escrow::pack(escrow, &mut accounts.escrow_account.try_borrow_mut_data()?)?;
        msg!("Escrow opened, expecting {} tokens in return", amount);

        Ok(())
    }

    /// Open -> Settled
    fn process_exchange(
        accounts: &[AccountInfo],
        offered: Option<u64>,
        program_id: &Pubkey,
    ) -> ProgramResult {
        let accounts = ExchangeAccounts::validate(program_id, accounts, offered)?;

        let released = custody::settle(&accounts, accounts.escrow.expected_amount)?;
        msg!(
            "Swapped {} deposited tokens for {} tokens",
            released,
            accounts.escrow.expected_amount
        );

        close_escrow(accounts.escrow_account, accounts.initializer)
    }

    /// Open -> Cancelled
    fn process_cancel(accounts: &[AccountInfo], program_id: &Pubkey) -> ProgramResult {
        let accounts = CancelAccounts::validate(program_id, accounts)?;

        let refunded = custody::refund(&accounts)?;
        msg!("Refunded {} deposited tokens", refunded);

        close_escrow(accounts.escrow_account, accounts.initializer)
    }
}

/// Drains the escrow account's rent into `destination` and hands the emptied
/// account back to the system program, so the identity can never be opened again.
fn close_escrow(escrow_account: &AccountInfo, destination: &AccountInfo) -> ProgramResult {
    msg!("Closing the escrow account...");
    let lamports = destination
        .lamports()
        .checked_add(escrow_account.lamports())
        .ok_or(EscrowError::AmountOverflow)?;
    **destination.try_borrow_mut_lamports()? = lamports;
    **escrow_account.try_borrow_mut_lamports()? = 0;
    escrow_account.try_borrow_mut_data()?.fill(0);
    escrow_account.realloc(0, false)?;
    escrow_account.assign(&system_program::id());

    Ok(())
}
