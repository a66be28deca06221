// Randomness oracle integration: request publication and winner index selection
use solana_program::{keccak, pubkey::Pubkey};

use crate::{
    engine::{RandomnessOracle, RandomnessRequest},
    error::RaffleError,
    events::RaffleEvent,
};

/// Oracle adapter used on chain.
///
/// A request is published as a `RandomWordsRequested` event; the off-chain
/// oracle picks it up from the transaction logs and later answers with a
/// `SettleRound` instruction signed by the configured oracle authority.
pub struct CoordinatorOracle<'a> {
    raffle: &'a Pubkey,
}

impl<'a> CoordinatorOracle<'a> {
    pub fn new(raffle: &'a Pubkey) -> Self {
        Self { raffle }
    }
}

impl RandomnessOracle for CoordinatorOracle<'_> {
    fn request_random_words(&mut self, request: &RandomnessRequest) -> Result<u64, RaffleError> {
        let request_id = derive_request_id(
            &request.key_hash,
            self.raffle,
            request.subscription_id,
            request.nonce,
        );

        RaffleEvent::RandomWordsRequested {
            request_id,
            key_hash: request.key_hash,
            subscription_id: request.subscription_id,
            request_confirmations: request.request_confirmations,
            callback_gas_limit: request.callback_gas_limit,
            num_words: request.num_words,
        }
        .emit();

        Ok(request_id)
    }
}

/// Request id: first 8 bytes (LE) of keccak(key_hash, raffle, subscription, nonce)
pub fn derive_request_id(
    key_hash: &[u8; 32],
    raffle: &Pubkey,
    subscription_id: u64,
    nonce: u64,
) -> u64 {
    let hash = keccak::hashv(&[
        key_hash,
        raffle.as_ref(),
        &subscription_id.to_le_bytes(),
        &nonce.to_le_bytes(),
    ])
    .to_bytes();

    let mut id = [0u8; 8];
    id.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(id)
}

// Get the winner index from a random word
pub fn get_random_winner_index(random_word: u64, participant_count: usize) -> Option<usize> {
    if participant_count == 0 {
        return None;
    }
    Some((random_word % participant_count as u64) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winner_index_is_word_mod_count() {
        assert_eq!(get_random_winner_index(7, 1), Some(0));
        assert_eq!(get_random_winner_index(10, 3), Some(1));
        assert_eq!(get_random_winner_index(u64::MAX, 100), Some(15));
        assert_eq!(get_random_winner_index(5, 0), None);
    }

    #[test]
    fn request_ids_differ_per_nonce_and_raffle() {
        let key_hash = [3u8; 32];
        let raffle = Pubkey::new_unique();
        let other = Pubkey::new_unique();

        let first = derive_request_id(&key_hash, &raffle, 1, 0);
        assert_eq!(first, derive_request_id(&key_hash, &raffle, 1, 0));
        assert_ne!(first, derive_request_id(&key_hash, &raffle, 1, 1));
        assert_ne!(first, derive_request_id(&key_hash, &other, 1, 0));
    }

    #[test]
    fn coordinator_oracle_returns_derived_id() {
        let raffle = Pubkey::new_unique();
        let request = RandomnessRequest {
            key_hash: [9u8; 32],
            subscription_id: 77,
            callback_gas_limit: 500_000,
            request_confirmations: 3,
            num_words: 1,
            nonce: 4,
        };

        let id = CoordinatorOracle::new(&raffle)
            .request_random_words(&request)
            .unwrap();
        assert_eq!(id, derive_request_id(&[9u8; 32], &raffle, 77, 4));
    }
}
