use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

#[derive(Clone, Debug, PartialEq)]
pub enum RaffleInstruction {
    /// Initialize a raffle and open its first round
    ///
    /// Accounts expected:
    /// 0. `[signer]` The account setting up the raffle
    /// 1. `[signer, writable]` The raffle account, pre-created with the program as owner
    InitializeRaffle {
        /// Minimum payment to enter, in lamports
        entrance_fee: u64,
        /// Seconds a round stays open before it can be closed
        interval: u64,
        /// Oracle key hash
        key_hash: [u8; 32],
        /// Oracle subscription paying for requests
        subscription_id: u64,
        /// Compute budget for the fulfillment
        callback_gas_limit: u32,
        /// Signer allowed to deliver fulfillments
        oracle_authority: Pubkey,
    },

    /// Enter the current round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The participant, pays `amount`
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The system program
    Enter {
        /// Lamports paid, at least the entrance fee
        amount: u64,
    },

    /// Report whether the round can be closed (return data `[0|1]`)
    ///
    /// Accounts expected:
    /// 0. `[]` The raffle account
    CheckEligibility,

    /// Close entry and request randomness (anyone may call)
    ///
    /// Accounts expected:
    /// 0. `[signer]` Any caller, usually the automation trigger
    /// 1. `[writable]` The raffle account
    CloseRound,

    /// Deliver the oracle fulfillment and pay the winner
    ///
    /// Accounts expected:
    /// 0. `[signer]` The oracle authority
    /// 1. `[writable]` The raffle account
    /// 2.. `[writable]` Winner candidate accounts
    SettleRound {
        /// Id of the outstanding request
        request_id: u64,
        /// Random words produced by the oracle
        random_words: Vec<u64>,
    },
}

impl RaffleInstruction {
    /// Unpacks a byte buffer into a RaffleInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input
            .split_first()
            .ok_or(ProgramError::InvalidInstructionData)?;

        Ok(match tag {
            0 => {
                let (entrance_fee, rest) = Self::unpack_u64(rest)?;
                let (interval, rest) = Self::unpack_u64(rest)?;
                let (key_hash, rest) = Self::unpack_fixed_bytes::<32>(rest)?;
                let (subscription_id, rest) = Self::unpack_u64(rest)?;
                let (callback_gas_limit, rest) = Self::unpack_u32(rest)?;
                let (oracle_authority, _) = Self::unpack_fixed_bytes::<32>(rest)?;
                Self::InitializeRaffle {
                    entrance_fee,
                    interval,
                    key_hash,
                    subscription_id,
                    callback_gas_limit,
                    oracle_authority: Pubkey::new_from_array(oracle_authority),
                }
            }
            1 => {
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::Enter { amount }
            }
            2 => Self::CheckEligibility,
            3 => Self::CloseRound,
            4 => {
                let (request_id, rest) = Self::unpack_u64(rest)?;
                let (count, mut rest) = Self::unpack_u32(rest)?;
                let mut random_words = Vec::with_capacity((count as usize).min(rest.len() / 8));
                for _ in 0..count {
                    let (word, tail) = Self::unpack_u64(rest)?;
                    random_words.push(word);
                    rest = tail;
                }
                Self::SettleRound {
                    request_id,
                    random_words,
                }
            }
            _ => return Err(ProgramError::InvalidInstructionData),
        })
    }

    /// Packs a RaffleInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            Self::InitializeRaffle {
                entrance_fee,
                interval,
                key_hash,
                subscription_id,
                callback_gas_limit,
                oracle_authority,
            } => {
                buf.push(0);
                buf.extend_from_slice(&entrance_fee.to_le_bytes());
                buf.extend_from_slice(&interval.to_le_bytes());
                buf.extend_from_slice(key_hash);
                buf.extend_from_slice(&subscription_id.to_le_bytes());
                buf.extend_from_slice(&callback_gas_limit.to_le_bytes());
                buf.extend_from_slice(oracle_authority.as_ref());
            }
            Self::Enter { amount } => {
                buf.push(1);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckEligibility => buf.push(2),
            Self::CloseRound => buf.push(3),
            Self::SettleRound {
                request_id,
                random_words,
            } => {
                buf.push(4);
                buf.extend_from_slice(&request_id.to_le_bytes());
                buf.extend_from_slice(&(random_words.len() as u32).to_le_bytes());
                for word in random_words {
                    buf.extend_from_slice(&word.to_le_bytes());
                }
            }
        }
        buf
    }

    fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
        let (bytes, rest) = Self::unpack_fixed_bytes::<8>(input)?;
        Ok((u64::from_le_bytes(bytes), rest))
    }

    fn unpack_u32(input: &[u8]) -> Result<(u32, &[u8]), ProgramError> {
        let (bytes, rest) = Self::unpack_fixed_bytes::<4>(input)?;
        Ok((u32::from_le_bytes(bytes), rest))
    }

    fn unpack_fixed_bytes<const N: usize>(input: &[u8]) -> Result<([u8; N], &[u8]), ProgramError> {
        if input.len() < N {
            return Err(ProgramError::InvalidInstructionData);
        }
        let (bytes, rest) = input.split_at(N);
        let bytes = bytes
            .try_into()
            .map_err(|_| ProgramError::InvalidInstructionData)?;
        Ok((bytes, rest))
    }
}

/// Create initialize_raffle instruction
#[allow(clippy::too_many_arguments)]
pub fn initialize_raffle(
    program_id: &Pubkey,
    authority: &Pubkey,
    raffle_account: &Pubkey,
    entrance_fee: u64,
    interval: u64,
    key_hash: [u8; 32],
    subscription_id: u64,
    callback_gas_limit: u32,
    oracle_authority: &Pubkey,
) -> Instruction {
    let data = RaffleInstruction::InitializeRaffle {
        entrance_fee,
        interval,
        key_hash,
        subscription_id,
        callback_gas_limit,
        oracle_authority: *oracle_authority,
    }
    .pack();

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*authority, true),
            AccountMeta::new(*raffle_account, true),
        ],
        data,
    }
}

/// Create enter instruction
pub fn enter(
    program_id: &Pubkey,
    participant: &Pubkey,
    raffle_account: &Pubkey,
    amount: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*participant, true),
            AccountMeta::new(*raffle_account, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: RaffleInstruction::Enter { amount }.pack(),
    }
}

/// Create check_eligibility instruction
pub fn check_eligibility(program_id: &Pubkey, raffle_account: &Pubkey) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![AccountMeta::new_readonly(*raffle_account, false)],
        data: RaffleInstruction::CheckEligibility.pack(),
    }
}

/// Create close_round instruction
pub fn close_round(program_id: &Pubkey, caller: &Pubkey, raffle_account: &Pubkey) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*caller, true),
            AccountMeta::new(*raffle_account, false),
        ],
        data: RaffleInstruction::CloseRound.pack(),
    }
}

/// Create settle_round instruction
pub fn settle_round(
    program_id: &Pubkey,
    oracle_authority: &Pubkey,
    raffle_account: &Pubkey,
    winner_candidates: &[Pubkey],
    request_id: u64,
    random_words: Vec<u64>,
) -> Instruction {
    let mut accounts = vec![
        AccountMeta::new_readonly(*oracle_authority, true),
        AccountMeta::new(*raffle_account, false),
    ];
    accounts.extend(
        winner_candidates
            .iter()
            .map(|candidate| AccountMeta::new(*candidate, false)),
    );

    Instruction {
        program_id: *program_id,
        accounts,
        data: RaffleInstruction::SettleRound {
            request_id,
            random_words,
        }
        .pack(),
    }
}
