use solana_program::{
    account_info::{next_account_info, AccountInfo},
    clock::Clock,
    entrypoint::ProgramResult,
    msg,
    program::{invoke, set_return_data},
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack},
    pubkey::Pubkey,
    rent::Rent,
    system_instruction,
    sysvar::Sysvar,
};

use crate::{
    engine::RaffleEngine,
    error::RaffleError,
    instruction::RaffleInstruction,
    state::{pack_raffle, pack_round, unpack_raffle, RaffleConfig, RAFFLE_ACCOUNT_LEN},
    utils::AccountVault,
    vrf::CoordinatorOracle,
};

/// Program state handler.
pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = RaffleInstruction::unpack(instruction_data)?;

        match instruction {
            RaffleInstruction::InitializeRaffle {
                entrance_fee,
                interval,
                key_hash,
                subscription_id,
                callback_gas_limit,
                oracle_authority,
            } => {
                msg!("Instruction: Initialize Raffle");
                let config = RaffleConfig {
                    is_initialized: true,
                    entrance_fee,
                    interval,
                    key_hash,
                    subscription_id,
                    callback_gas_limit,
                    oracle_authority,
                };
                Self::process_initialize_raffle(program_id, accounts, config)
            }
            RaffleInstruction::Enter { amount } => {
                msg!("Instruction: Enter");
                Self::process_enter(program_id, accounts, amount)
            }
            RaffleInstruction::CheckEligibility => {
                msg!("Instruction: Check Eligibility");
                Self::process_check_eligibility(program_id, accounts)
            }
            RaffleInstruction::CloseRound => {
                msg!("Instruction: Close Round");
                Self::process_close_round(program_id, accounts)
            }
            RaffleInstruction::SettleRound {
                request_id,
                random_words,
            } => {
                msg!("Instruction: Settle Round");
                Self::process_settle_round(program_id, accounts, request_id, &random_words)
            }
        }
    }

    fn process_initialize_raffle(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        config: RaffleConfig,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let authority_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        if !authority_info.is_signer {
            msg!("Authority must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        // Only the holder of the raffle keypair may pick its oracle
        if !raffle_info.is_signer {
            msg!("Raffle account must sign its initialization");
            return Err(ProgramError::MissingRequiredSignature);
        }

        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }

        if raffle_info.data_len() < RAFFLE_ACCOUNT_LEN {
            msg!(
                "Raffle account does not have enough space. Need {} bytes",
                RAFFLE_ACCOUNT_LEN
            );
            return Err(ProgramError::AccountDataTooSmall);
        }

        let rent = Rent::get()?;
        if !rent.is_exempt(raffle_info.lamports(), raffle_info.data_len()) {
            msg!("Raffle account must be rent exempt");
            return Err(ProgramError::AccountNotRentExempt);
        }

        let existing = RaffleConfig::unpack_unchecked(&raffle_info.data.borrow()[..RaffleConfig::LEN])?;
        if existing.is_initialized() {
            msg!("Raffle account is already initialized");
            return Err(ProgramError::AccountAlreadyInitialized);
        }

        let clock = Clock::get()?;
        let engine = RaffleEngine::new(config, clock.unix_timestamp)?;
        pack_raffle(*engine.config(), engine.round(), &mut raffle_info.data.borrow_mut())?;

        msg!(
            "Raffle initialized: fee={} interval={}s subscription={}",
            config.entrance_fee,
            config.interval,
            config.subscription_id
        );
        Ok(())
    }

    fn process_enter(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let participant_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !participant_info.is_signer {
            msg!("Participant must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut engine = Self::load_engine(program_id, raffle_info)?;
        engine.enter(*participant_info.key, amount)?;

        invoke(
            &system_instruction::transfer(participant_info.key, raffle_info.key, amount),
            &[
                participant_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        pack_round(engine.round(), &mut raffle_info.data.borrow_mut())
    }

    fn process_check_eligibility(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        let engine = Self::load_engine(program_id, raffle_info)?;
        let clock = Clock::get()?;
        let eligible = engine.check_eligibility(clock.unix_timestamp);

        msg!("Upkeep needed: {}", eligible);
        set_return_data(&[eligible as u8]);
        Ok(())
    }

    fn process_close_round(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let caller_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        // Anyone may close an eligible round
        if !caller_info.is_signer {
            msg!("Caller must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut engine = Self::load_engine(program_id, raffle_info)?;
        let clock = Clock::get()?;
        let mut oracle = CoordinatorOracle::new(raffle_info.key);
        let request_id = engine.close_round(clock.unix_timestamp, &mut oracle)?;

        pack_round(engine.round(), &mut raffle_info.data.borrow_mut())?;

        msg!("Randomness requested for raffle {}: {}", raffle_info.key, request_id);
        Ok(())
    }

    fn process_settle_round(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        request_id: u64,
        random_words: &[u64],
    ) -> ProgramResult {
        let (oracle_info, rest) = accounts
            .split_first()
            .ok_or(ProgramError::NotEnoughAccountKeys)?;
        let (raffle_info, winner_candidates) = rest
            .split_first()
            .ok_or(ProgramError::NotEnoughAccountKeys)?;

        let mut engine = Self::load_engine(program_id, raffle_info)?;

        if !oracle_info.is_signer || *oracle_info.key != engine.config().oracle_authority {
            msg!("Fulfillment must be signed by {}", engine.config().oracle_authority);
            return Err(RaffleError::OnlyCoordinatorCanFulfill.into());
        }

        let clock = Clock::get()?;
        let rent = Rent::get()?;
        let mut vault = AccountVault {
            source: raffle_info,
            recipients: winner_candidates,
            rent_floor: rent.minimum_balance(raffle_info.data_len()),
        };
        let winner = engine.settle_round(request_id, random_words, clock.unix_timestamp, &mut vault)?;

        pack_round(engine.round(), &mut raffle_info.data.borrow_mut())?;

        msg!("Raffle {} settled, winner {}", raffle_info.key, winner);
        Ok(())
    }

    fn load_engine(program_id: &Pubkey, raffle_info: &AccountInfo) -> Result<RaffleEngine, ProgramError> {
        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by this program");
            return Err(ProgramError::IncorrectProgramId);
        }
        let (config, round) = unpack_raffle(&raffle_info.data.borrow())?;
        Ok(RaffleEngine::from_parts(config, round))
    }
}
