use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    entrypoint::ProgramResult,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};

/// Maximum number of entries a single round can hold
pub const MAX_PARTICIPANTS: usize = 100;

/// Number of random words requested per round
pub const NUM_WORDS: u32 = 1;

/// Confirmation depth asked of the oracle before it fulfills
pub const REQUEST_CONFIRMATIONS: u16 = 3;

/// Size of a raffle account: packed config followed by the borsh encoded round
pub const RAFFLE_ACCOUNT_LEN: usize = RaffleConfig::LEN + Round::MAX_LEN;

/// Status of the live round
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    /// Accepting entries
    Open,
    /// Entries closed, waiting for the oracle to fulfill
    Calculating,
}

/// Immutable raffle parameters, written once by `InitializeRaffle`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaffleConfig {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Minimum payment, in lamports, to enter a round
    pub entrance_fee: u64,
    /// Seconds a round must stay open before it can be closed
    pub interval: u64,
    /// Identifies the oracle key and request parameters
    pub key_hash: [u8; 32],
    /// Pre-provisioned oracle subscription that pays for requests
    pub subscription_id: u64,
    /// Compute budget granted to the fulfillment callback
    pub callback_gas_limit: u32,
    /// The only signer allowed to deliver fulfillments
    pub oracle_authority: Pubkey,
}

impl Sealed for RaffleConfig {}

impl IsInitialized for RaffleConfig {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for RaffleConfig {
    const LEN: usize = 1 + 8 + 8 + 32 + 8 + 4 + 32;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, RaffleConfig::LEN];
        let (
            is_initialized,
            entrance_fee,
            interval,
            key_hash,
            subscription_id,
            callback_gas_limit,
            oracle_authority,
        ) = array_refs![src, 1, 8, 8, 32, 8, 4, 32];

        let is_initialized = match is_initialized {
            [0] => false,
            [1] => true,
            _ => return Err(ProgramError::InvalidAccountData),
        };

        Ok(RaffleConfig {
            is_initialized,
            entrance_fee: u64::from_le_bytes(*entrance_fee),
            interval: u64::from_le_bytes(*interval),
            key_hash: *key_hash,
            subscription_id: u64::from_le_bytes(*subscription_id),
            callback_gas_limit: u32::from_le_bytes(*callback_gas_limit),
            oracle_authority: Pubkey::new_from_array(*oracle_authority),
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, RaffleConfig::LEN];
        let (
            is_initialized_dst,
            entrance_fee_dst,
            interval_dst,
            key_hash_dst,
            subscription_id_dst,
            callback_gas_limit_dst,
            oracle_authority_dst,
        ) = mut_array_refs![dst, 1, 8, 8, 32, 8, 4, 32];

        is_initialized_dst[0] = self.is_initialized as u8;
        *entrance_fee_dst = self.entrance_fee.to_le_bytes();
        *interval_dst = self.interval.to_le_bytes();
        key_hash_dst.copy_from_slice(&self.key_hash);
        *subscription_id_dst = self.subscription_id.to_le_bytes();
        *callback_gas_limit_dst = self.callback_gas_limit.to_le_bytes();
        oracle_authority_dst.copy_from_slice(self.oracle_authority.as_ref());
    }
}

/// The single live round of a raffle
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct Round {
    pub state: RoundState,
    /// Time of the most recent reset
    pub last_closure_timestamp: UnixTimestamp,
    /// Entrants of the current round, in entry order
    pub participants: Vec<Pubkey>,
    /// Lamports collected since the last settlement
    pub pot: u64,
    /// Outstanding randomness request, set only while calculating
    pub pending_request_id: Option<u64>,
    pub recent_winner: Option<Pubkey>,
    /// Randomness requests issued so far
    pub request_nonce: u64,
}

impl Round {
    /// Upper bound of the borsh encoding with a full participant list
    pub const MAX_LEN: usize = 1 + 8 + (4 + 32 * MAX_PARTICIPANTS) + 8 + (1 + 8) + (1 + 32) + 8;

    pub fn new(now: UnixTimestamp) -> Self {
        Self {
            state: RoundState::Open,
            last_closure_timestamp: now,
            participants: Vec::new(),
            pot: 0,
            pending_request_id: None,
            recent_winner: None,
            request_nonce: 0,
        }
    }
}

/// Reads the config and round out of raffle account data
pub fn unpack_raffle(data: &[u8]) -> Result<(RaffleConfig, Round), ProgramError> {
    if data.len() < RAFFLE_ACCOUNT_LEN {
        return Err(ProgramError::AccountDataTooSmall);
    }
    let config = RaffleConfig::unpack(&data[..RaffleConfig::LEN])?;
    let round = Round::deserialize(&mut &data[RaffleConfig::LEN..])
        .map_err(|e| ProgramError::BorshIoError(e.to_string()))?;
    Ok((config, round))
}

/// Writes the round back behind the config region
pub fn pack_round(round: &Round, data: &mut [u8]) -> ProgramResult {
    if data.len() < RAFFLE_ACCOUNT_LEN {
        return Err(ProgramError::AccountDataTooSmall);
    }
    round
        .serialize(&mut &mut data[RaffleConfig::LEN..])
        .map_err(|e| ProgramError::BorshIoError(e.to_string()))
}

/// Writes a freshly initialized raffle
pub fn pack_raffle(config: RaffleConfig, round: &Round, data: &mut [u8]) -> ProgramResult {
    if data.len() < RAFFLE_ACCOUNT_LEN {
        return Err(ProgramError::AccountDataTooSmall);
    }
    RaffleConfig::pack(config, &mut data[..RaffleConfig::LEN])?;
    pack_round(round, data)
}
