// Lamport helpers and the on-chain prize vault
use solana_program::{account_info::AccountInfo, msg, pubkey::Pubkey};

use crate::{engine::PrizeVault, error::RaffleError};

/// Pays prizes straight out of the raffle account's lamports.
///
/// The raffle account is owned by the program, so its balance can be debited
/// directly. The winner must be among `recipients` and writable, and the
/// raffle account never drops below `rent_floor`.
pub struct AccountVault<'a, 'info> {
    pub source: &'a AccountInfo<'info>,
    pub recipients: &'a [AccountInfo<'info>],
    pub rent_floor: u64,
}

impl PrizeVault for AccountVault<'_, '_> {
    fn pay_out(&mut self, winner: &Pubkey, amount: u64) -> Result<(), RaffleError> {
        let recipient = self
            .recipients
            .iter()
            .find(|account| account.key == winner && account.is_writable)
            .ok_or_else(|| {
                msg!("Winner account {} was not supplied as writable", winner);
                RaffleError::PayoutFailed
            })?;

        let remaining = self
            .source
            .lamports()
            .checked_sub(amount)
            .filter(|left| *left >= self.rent_floor)
            .ok_or(RaffleError::PayoutFailed)?;
        let credited = recipient
            .lamports()
            .checked_add(amount)
            .ok_or(RaffleError::PayoutFailed)?;

        **self
            .source
            .try_borrow_mut_lamports()
            .map_err(|_| RaffleError::PayoutFailed)? = remaining;
        **recipient
            .try_borrow_mut_lamports()
            .map_err(|_| RaffleError::PayoutFailed)? = credited;

        msg!("Paid {} SOL to {}", lamports_to_sol(amount), winner);
        Ok(())
    }
}

/// Convert lamports to SOL (for display purposes)
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / 1_000_000_000.0
}
