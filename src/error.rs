use thiserror::Error;

use solana_program::program_error::ProgramError;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum EscrowError {
    /// Unknown tag or malformed amount field
    #[error("Invalid Instruction")]
    InvalidInstruction,

    #[error("NotRentExempt")]
    NotRentExempt,

    /// Taker offered something other than the recorded amount. Exchange only
    /// settles on an exact match, so partial and over-offers both land here.
    #[error("ExpectedAmountMismatch")]
    ExpectedAmountMismatch,

    #[error("AmountOverflow")]
    AmountOverflow,

    /// Escrow record is not exactly `Escrow::LEN` bytes
    #[error("MalformedState")]
    MalformedState,

    /// Signer, ownership or account identity does not match its role
    #[error("InvalidAccount")]
    InvalidAccount,

    #[error("AlreadyInitialized")]
    AlreadyInitialized,

    #[error("EscrowAlreadyClosed")]
    EscrowAlreadyClosed,

    #[error("AuthorityAlreadyTransferred")]
    AuthorityAlreadyTransferred,

    #[error("InsufficientFunds")]
    InsufficientFunds,
}

impl From<EscrowError> for ProgramError {
    fn from(e: EscrowError) -> Self {
        ProgramError::Custom(e as u32)
    }
}
