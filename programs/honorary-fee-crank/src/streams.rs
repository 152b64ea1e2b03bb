//! Sources for an investor's still-locked balance.

use anchor_lang::prelude::*;
use streamflow_sdk::state::Contract as StreamflowContract;

use crate::{constants::STREAMFLOW_PROGRAM_ID, errors::FeeRoutingError};

/// Reports how much of an investor's allocation is still locked at `now`.
pub trait LockedBalanceSource {
    fn locked_amount(&self, now: i64) -> Result<u64>;
}

/// Cliff plus streamed amount released by `now`. Withdrawals only ever take
/// from this, so they never change what is still locked.
fn unlocked_at(contract: &StreamflowContract, now: u64) -> Result<u64> {
    require!(contract.ix.period > 0, FeeRoutingError::InvalidStreamflowContract);
    require!(contract.current_pause_start <= now, FeeRoutingError::InvalidStreamflowContract);

    let streaming_from = contract
        .effective_start_time()
        .checked_add(contract.pause_time(now))
        .ok_or(FeeRoutingError::ArithmeticOverflow)?;

    let vested = if now < streaming_from {
        contract.funds_unlocked_at_last_rate_change
    } else {
        let periods = (now - streaming_from) / contract.ix.period;
        let streamed = periods
            .checked_mul(contract.ix.amount_per_period)
            .and_then(|amount| amount.checked_add(contract.funds_unlocked_at_last_rate_change));
        match streamed {
            Some(_) => contract.vested_available(now),
            // Released more than a u64 can hold: everything is unlocked
            None => return Ok(contract.ix.net_amount_deposited),
        }
    };

    vested.checked_add(contract.cliff_available(now)).ok_or_else(|| error!(FeeRoutingError::ArithmeticOverflow))
}

impl LockedBalanceSource for StreamflowContract {
    fn locked_amount(&self, now: i64) -> Result<u64> {
        let deposited = self.ix.net_amount_deposited;
        if self.closed || self.canceled_at > 0 {
            return Ok(0);
        }

        let now = u64::try_from(now).unwrap_or_default();
        if now < self.start_time() {
            return Ok(deposited);
        }
        if now >= self.end_time && self.current_pause_start == 0 {
            return Ok(0);
        }

        let unlocked = unlocked_at(self, now)?;
        Ok(deposited - unlocked.min(deposited))
    }
}

/// Streamflow stream account passed in the remaining accounts of a page
pub struct StreamflowStream {
    key: Pubkey,
    contract: StreamflowContract,
}

impl StreamflowStream {
    /// Checks the owner and deserializes the contract
    pub fn load(account: &AccountInfo) -> Result<Self> {
        require_keys_eq!(*account.owner, STREAMFLOW_PROGRAM_ID, FeeRoutingError::InvalidStreamflowContract);

        // Streamflow contracts don't have discriminators; trailing padding is ignored
        let data = account.try_borrow_data()?;
        let contract = StreamflowContract::deserialize(&mut &data[..])
            .map_err(|_| FeeRoutingError::InvalidStreamflowContract)?;

        Ok(Self { key: account.key(), contract })
    }

    pub fn key(&self) -> Pubkey {
        self.key
    }

    /// Beneficiary of the vested tokens
    pub fn recipient(&self) -> Pubkey {
        self.contract.recipient
    }

    /// Mint of the vested tokens
    pub fn mint(&self) -> Pubkey {
        self.contract.mint
    }
}

impl LockedBalanceSource for StreamflowStream {
    fn locked_amount(&self, now: i64) -> Result<u64> {
        let locked = self.contract.locked_amount(now)?;

        msg!(
            "Stream {}: deposited {}, withdrawn {}, end {}, closed {}, locked {}",
            self.key,
            self.contract.ix.net_amount_deposited,
            self.contract.amount_withdrawn,
            self.contract.end_time,
            self.contract.closed,
            locked
        );

        Ok(locked)
    }
}
