use solana_program::{decode_error::DecodeError, program_error::ProgramError};
use thiserror::Error;

/// Errors that may be returned by the raffle program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum RaffleError {
    /// Payment is below the entrance fee
    #[error("Payment is below the entrance fee")]
    InsufficientPayment,

    /// Entries are closed while a winner is being calculated
    #[error("Raffle is not open")]
    RoundNotOpen,

    /// Round is not eligible for closure yet
    #[error("Upkeep not needed")]
    UpkeepNotNeeded,

    /// Fulfillment does not match the outstanding randomness request
    #[error("Unknown or stale randomness request")]
    InvalidRequest,

    /// Prize could not be transferred to the winner
    #[error("Prize transfer to the winner failed")]
    PayoutFailed,

    /// Only the configured oracle authority may fulfill requests
    #[error("Only the oracle authority can fulfill randomness")]
    OnlyCoordinatorCanFulfill,

    /// Fulfillment carried no random words
    #[error("Fulfillment carried no random words")]
    MissingRandomWords,

    /// Round already holds the maximum number of participants
    #[error("Round is full")]
    RoundFull,

    /// Entrance fee must be positive
    #[error("Entrance fee must be greater than zero")]
    InvalidEntranceFee,

    /// Lamport arithmetic overflowed
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
}

impl From<RaffleError> for ProgramError {
    fn from(e: RaffleError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for RaffleError {
    fn type_of() -> &'static str {
        "Raffle Error"
    }
}
