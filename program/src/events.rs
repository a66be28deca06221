use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{log::sol_log_data, msg, pubkey::Pubkey};

/// First field of every `sol_log_data` record written by the raffle
pub const EVENT_TAG: &[u8] = b"raffle";

/// Events published by the raffle.
///
/// Each event is written twice: a readable `msg!` line and a borsh payload
/// through `sol_log_data`. The oracle watches for `RandomWordsRequested`
/// payloads and answers them with a `SettleRound` instruction.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub enum RaffleEvent {
    RaffleEntered {
        participant: Pubkey,
        amount: u64,
    },
    RandomWordsRequested {
        request_id: u64,
        key_hash: [u8; 32],
        subscription_id: u64,
        request_confirmations: u16,
        callback_gas_limit: u32,
        num_words: u32,
    },
    RoundClosing {
        request_id: u64,
    },
    WinnerPicked {
        winner: Pubkey,
        prize: u64,
    },
}

impl RaffleEvent {
    pub fn emit(&self) {
        match self {
            Self::RaffleEntered { participant, amount } => {
                msg!("RaffleEntered: {} paid {} lamports", participant, amount)
            }
            Self::RandomWordsRequested {
                request_id,
                subscription_id,
                num_words,
                ..
            } => msg!(
                "RandomWordsRequested: id={} subscription={} words={}",
                request_id,
                subscription_id,
                num_words
            ),
            Self::RoundClosing { request_id } => msg!("RoundClosing: request {}", request_id),
            Self::WinnerPicked { winner, prize } => {
                msg!("WinnerPicked: {} won {} lamports", winner, prize)
            }
        }

        match self.try_to_vec() {
            Ok(payload) => sol_log_data(&[EVENT_TAG, payload.as_slice()]),
            Err(err) => msg!("Failed to serialize event: {}", err),
        }
    }
}
