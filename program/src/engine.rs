// Raffle state machine: entry, eligibility, closure and settlement
use solana_program::{clock::UnixTimestamp, msg, pubkey::Pubkey};

use crate::{
    error::RaffleError,
    events::RaffleEvent,
    state::{RaffleConfig, Round, RoundState, MAX_PARTICIPANTS, NUM_WORDS, REQUEST_CONFIRMATIONS},
    vrf,
};

/// Parameters of a randomness request sent to the oracle
#[derive(Clone, Debug, PartialEq)]
pub struct RandomnessRequest {
    pub key_hash: [u8; 32],
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
    pub request_confirmations: u16,
    pub num_words: u32,
    /// Per-raffle request counter, lets the oracle derive unique ids
    pub nonce: u64,
}

/// External source of verifiable randomness.
///
/// Returns the id the later fulfillment will be keyed by.
pub trait RandomnessOracle {
    fn request_random_words(&mut self, request: &RandomnessRequest) -> Result<u64, RaffleError>;
}

/// Holds the pot and pays the winner
pub trait PrizeVault {
    fn pay_out(&mut self, winner: &Pubkey, amount: u64) -> Result<(), RaffleError>;
}

/// Owns one raffle: its immutable config and the single live round
#[derive(Clone, Debug, PartialEq)]
pub struct RaffleEngine {
    config: RaffleConfig,
    round: Round,
}

impl RaffleEngine {
    /// Starts a raffle with an open, empty round
    pub fn new(config: RaffleConfig, now: UnixTimestamp) -> Result<Self, RaffleError> {
        if config.entrance_fee == 0 {
            return Err(RaffleError::InvalidEntranceFee);
        }
        Ok(Self {
            config,
            round: Round::new(now),
        })
    }

    /// Rebuilds an engine from stored state
    pub fn from_parts(config: RaffleConfig, round: Round) -> Self {
        Self { config, round }
    }

    pub fn config(&self) -> &RaffleConfig {
        &self.config
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn enter(&mut self, participant: Pubkey, amount: u64) -> Result<(), RaffleError> {
        if amount < self.config.entrance_fee {
            msg!(
                "Payment of {} lamports is below the entrance fee of {}",
                amount,
                self.config.entrance_fee
            );
            return Err(RaffleError::InsufficientPayment);
        }
        if self.round.state != RoundState::Open {
            return Err(RaffleError::RoundNotOpen);
        }
        if self.round.participants.len() >= MAX_PARTICIPANTS {
            return Err(RaffleError::RoundFull);
        }

        let pot = self
            .round
            .pot
            .checked_add(amount)
            .ok_or(RaffleError::ArithmeticOverflow)?;

        self.round.pot = pot;
        self.round.participants.push(participant);

        RaffleEvent::RaffleEntered {
            participant,
            amount,
        }
        .emit();
        Ok(())
    }

    /// True when the round is open, the interval has passed and someone has paid in
    pub fn check_eligibility(&self, now: UnixTimestamp) -> bool {
        let is_open = self.round.state == RoundState::Open;
        let elapsed = now.saturating_sub(self.round.last_closure_timestamp);
        let time_passed = u64::try_from(elapsed).map_or(false, |e| e >= self.config.interval);
        let has_players = !self.round.participants.is_empty();
        let has_balance = self.round.pot > 0;

        is_open && time_passed && has_players && has_balance
    }

    /// Closes entry and asks the oracle for randomness
    pub fn close_round<O: RandomnessOracle>(
        &mut self,
        now: UnixTimestamp,
        oracle: &mut O,
    ) -> Result<u64, RaffleError> {
        if !self.check_eligibility(now) {
            msg!(
                "Upkeep not needed: state={:?} players={} pot={}",
                self.round.state,
                self.round.participants.len(),
                self.round.pot
            );
            return Err(RaffleError::UpkeepNotNeeded);
        }

        // Entries are shut before the oracle sees the request
        self.round.state = RoundState::Calculating;

        let request = RandomnessRequest {
            key_hash: self.config.key_hash,
            subscription_id: self.config.subscription_id,
            callback_gas_limit: self.config.callback_gas_limit,
            request_confirmations: REQUEST_CONFIRMATIONS,
            num_words: NUM_WORDS,
            nonce: self.round.request_nonce,
        };

        let request_id = match oracle.request_random_words(&request) {
            Ok(id) => id,
            Err(err) => {
                self.round.state = RoundState::Open;
                return Err(err);
            }
        };

        self.round.pending_request_id = Some(request_id);
        self.round.request_nonce = self.round.request_nonce.wrapping_add(1);

        RaffleEvent::RoundClosing { request_id }.emit();
        Ok(request_id)
    }

    /// Consumes a fulfillment, pays the winner and reopens the round
    pub fn settle_round<V: PrizeVault>(
        &mut self,
        request_id: u64,
        random_words: &[u64],
        now: UnixTimestamp,
        vault: &mut V,
    ) -> Result<Pubkey, RaffleError> {
        match self.round.pending_request_id {
            Some(pending) if pending == request_id && self.round.state == RoundState::Calculating => {}
            _ => {
                msg!("Rejected fulfillment for unknown request {}", request_id);
                return Err(RaffleError::InvalidRequest);
            }
        }

        let random_word = *random_words
            .first()
            .ok_or(RaffleError::MissingRandomWords)?;
        let index = vrf::get_random_winner_index(random_word, self.round.participants.len())
            .ok_or(RaffleError::InvalidRequest)?;
        let winner = self.round.participants[index];
        let prize = self.round.pot;

        msg!(
            "Random word {} picks index {} of {}",
            random_word,
            index,
            self.round.participants.len()
        );

        vault
            .pay_out(&winner, prize)
            .map_err(|_| RaffleError::PayoutFailed)?;

        self.round.recent_winner = Some(winner);
        self.round.participants.clear();
        self.round.pot = 0;
        self.round.pending_request_id = None;
        self.round.last_closure_timestamp = now;
        self.round.state = RoundState::Open;

        RaffleEvent::WinnerPicked { winner, prize }.emit();
        Ok(winner)
    }

    pub fn state(&self) -> RoundState {
        self.round.state
    }

    pub fn entrance_fee(&self) -> u64 {
        self.config.entrance_fee
    }

    pub fn interval(&self) -> u64 {
        self.config.interval
    }

    pub fn participant(&self, index: usize) -> Option<&Pubkey> {
        self.round.participants.get(index)
    }

    pub fn participant_count(&self) -> usize {
        self.round.participants.len()
    }

    pub fn recent_winner(&self) -> Option<&Pubkey> {
        self.round.recent_winner.as_ref()
    }

    pub fn last_closure_timestamp(&self) -> UnixTimestamp {
        self.round.last_closure_timestamp
    }

    pub fn pending_request_id(&self) -> Option<u64> {
        self.round.pending_request_id
    }

    pub fn pot(&self) -> u64 {
        self.round.pot
    }

    pub fn subscription_id(&self) -> u64 {
        self.config.subscription_id
    }

    pub fn key_hash(&self) -> &[u8; 32] {
        &self.config.key_hash
    }

    pub fn callback_gas_limit(&self) -> u32 {
        self.config.callback_gas_limit
    }

    pub fn request_confirmations(&self) -> u16 {
        REQUEST_CONFIRMATIONS
    }

    pub fn num_words(&self) -> u32 {
        NUM_WORDS
    }
}
