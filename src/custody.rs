//! Moves the deposit in and out of program control through the token program.

use solana_program::{
    account_info::AccountInfo,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed},
    program_error::ProgramError,
    pubkey::Pubkey,
};
use spl_token::instruction::AuthorityType;

use crate::{
    error::EscrowError,
    validation::{unpack_token_account, CancelAccounts, ExchangeAccounts},
};

pub const ESCROW_PDA_SEED: &[u8] = b"escrow";

/// The program-derived address that owns every temp token account while its escrow is open.
pub fn escrow_authority(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[ESCROW_PDA_SEED], program_id)
}

/// Hands the temp token account over to the program PDA.
///
/// `current_authority` must be the account's token-owner and a signer of the
/// transaction. Fails if the PDA already owns the account.
pub fn take_custody<'info>(
    program_id: &Pubkey,
    token_program: &AccountInfo<'info>,
    temp_token_account: &AccountInfo<'info>,
    current_authority: &AccountInfo<'info>,
) -> ProgramResult {
    let temp = unpack_token_account(temp_token_account)?;
    let (pda, _bump_seed) = escrow_authority(program_id);
    if temp.owner == pda {
        return Err(EscrowError::AuthorityAlreadyTransferred.into());
    }
    if temp.owner != *current_authority.key || temp.close_authority.is_some() {
        return Err(EscrowError::InvalidAccount.into());
    }

    let owner_change_ix = spl_token::instruction::set_authority(
        token_program.key,
        temp_token_account.key,
        Some(&pda),
        AuthorityType::AccountOwner,
        current_authority.key,
        &[],
    )?;
    msg!("Calling the token program to transfer token account ownership...");
    invoke(
        &owner_change_ix,
        &[
            temp_token_account.clone(),
            current_authority.clone(),
            token_program.clone(),
        ],
    )
}

/// Performs both legs of the swap and closes the temp account.
///
/// The taker pays `amount_y` of asset Y to the initializer, the whole temp
/// balance of asset X goes to the taker, then the emptied temp account is
/// closed with its rent refunded to the initializer. Returns the asset-X
/// amount released.
pub fn settle(accounts: &ExchangeAccounts, amount_y: u64) -> Result<u64, ProgramError> {
    if unpack_token_account(accounts.taker_sending_token_account)?.amount < amount_y {
        return Err(EscrowError::InsufficientFunds.into());
    }
    let amount_x = unpack_token_account(accounts.temp_token_account)?.amount;

    let transfer_to_initializer_ix = spl_token::instruction::transfer(
        accounts.token_program.key,
        accounts.taker_sending_token_account.key,
        accounts.initializer_receiving_token_account.key,
        accounts.taker.key,
        &[],
        amount_y,
    )?;
    msg!("Calling the token program to transfer tokens to the escrow's initializer...");
    invoke(
        &transfer_to_initializer_ix,
        &[
            accounts.taker_sending_token_account.clone(),
            accounts.initializer_receiving_token_account.clone(),
            accounts.taker.clone(),
            accounts.token_program.clone(),
        ],
    )?;

    release(
        accounts.token_program,
        accounts.temp_token_account,
        accounts.taker_receiving_token_account,
        accounts.initializer,
        accounts.pda_account,
        accounts.bump_seed,
        amount_x,
    )?;
    Ok(amount_x)
}

/// Returns the whole deposit to the initializer and closes the temp account.
pub fn refund(accounts: &CancelAccounts) -> Result<u64, ProgramError> {
    let amount_x = unpack_token_account(accounts.temp_token_account)?.amount;
    release(
        accounts.token_program,
        accounts.temp_token_account,
        accounts.refund_token_account,
        accounts.initializer,
        accounts.pda_account,
        accounts.bump_seed,
        amount_x,
    )?;
    Ok(amount_x)
}

/// Empties the temp account into `destination` and closes it, signing as the PDA.
#[allow(clippy::too_many_arguments)]
fn release<'info>(
    token_program: &AccountInfo<'info>,
    temp_token_account: &AccountInfo<'info>,
    destination: &AccountInfo<'info>,
    rent_destination: &AccountInfo<'info>,
    pda_account: &AccountInfo<'info>,
    bump_seed: u8,
    amount: u64,
) -> ProgramResult {
    let bump = [bump_seed];
    let signer_seeds: &[&[u8]] = &[ESCROW_PDA_SEED, &bump];

    let transfer_out_ix = spl_token::instruction::transfer(
        token_program.key,
        temp_token_account.key,
        destination.key,
        pda_account.key,
        &[],
        amount,
    )?;
    msg!("Calling the token program to transfer {} tokens out of the temp account...", amount);
    invoke_signed(
        &transfer_out_ix,
        &[
            temp_token_account.clone(),
            destination.clone(),
            pda_account.clone(),
            token_program.clone(),
        ],
        &[signer_seeds],
    )?;

    let close_temp_ix = spl_token::instruction::close_account(
        token_program.key,
        temp_token_account.key,
        rent_destination.key,
        pda_account.key,
        &[],
    )?;
    msg!("Calling the token program to close the temp account...");
    invoke_signed(
        &close_temp_ix,
        &[
            temp_token_account.clone(),
            rent_destination.clone(),
            pda_account.clone(),
            token_program.clone(),
        ],
        &[signer_seeds],
    )
}
