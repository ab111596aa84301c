//! Trustless two-party token swap.
//!
//! The initializer parks asset X in a temp token account whose authority is
//! handed to this program, and records the amount of asset Y they want back.
//! A taker settles the swap in a single Exchange instruction, or the
//! initializer takes the deposit back with Cancel.

pub mod custody;
pub mod error;
pub mod instruction;
pub mod processor;
pub mod state;
pub mod validation;

#[cfg(not(feature = "no-entrypoint"))]
mod entrypoint;

pub use solana_program;

solana_program::declare_id!("2DkLffhYhMtvmiNHJoB1bjwDkZ2Behx5yKxeLhiEvgPB");
