//! Distribution engine: day gating, pagination and pro-rata payout math.
//!
//! Everything here is pure. `process_page` works on copies of the ledger and
//! returns the new state together with the transfers to execute, so a failed
//! call has no effect on the caller's accounts.

use anchor_lang::prelude::*;

use crate::{
    constants::BASIS_POINTS_DIVISOR,
    day_clock,
    errors::FeeRoutingError,
    state::{CrankState, DayProgress, DistributionConfig},
};

/// One investor in a page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvestorEntry {
    /// Identity used for ordering (the investor's stream account)
    pub investor: Pubkey,
    /// Quote token account that receives the payout
    pub destination: Pubkey,
    /// Amount still locked at the time of the call
    pub locked_amount: u64,
}

/// Caller-supplied facts for a single crank call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageInput {
    pub day_id: i64,
    pub page_index: u32,
    pub is_final_page: bool,
    pub quote_fees_claimed_this_call: u64,
    pub now: i64,
    pub investors: Vec<InvestorEntry>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlannedTransfer {
    pub destination: Pubkey,
    pub amount: u64,
}

/// Result of an accepted page
#[derive(Clone, Debug, PartialEq)]
pub struct PageOutcome {
    pub crank: CrankState,
    pub progress: DayProgress,
    /// True when this call created the day's progress record
    pub opened_day: bool,
    /// Investor pool for the day as of this call
    pub pool: u64,
    pub investor_transfers: Vec<PlannedTransfer>,
    pub page_distributed: u64,
    /// Sub-minimum payouts and rounding dust moved to carry-over by this page
    pub page_deferred: u64,
    pub investors_paid: u32,
    /// Set on the final page
    pub creator_amount: Option<u64>,
}

impl PageOutcome {
    /// Every token leaving the treasury in this call
    pub fn total_outflow(&self) -> Result<u64> {
        self.page_distributed
            .checked_add(self.creator_amount.unwrap_or(0))
            .ok_or_else(|| error!(FeeRoutingError::ArithmeticOverflow))
    }
}

/// `floor(a * b / c)` in u128, failing if the result does not fit a u64.
pub fn mul_div(a: u64, b: u64, c: u64) -> Result<u64> {
    let value = (a as u128)
        .checked_mul(b as u128)
        .ok_or(FeeRoutingError::ArithmeticOverflow)?
        .checked_div(c as u128)
        .ok_or(FeeRoutingError::ArithmeticOverflow)?;
    u64::try_from(value).map_err(|_| error!(FeeRoutingError::ArithmeticOverflow))
}

/// Investor budget for a day: the fee share plus inherited carry,
/// bounded by what was claimed and by the daily cap.
///
/// Inherited carry is investor money from earlier days, so the pool may exceed
/// `claimed * bps / 10000` by up to `carry_in`. It never exceeds `claimed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DayPool {
    /// `floor(claimed * bps / 10000)`
    pub share: u64,
    /// `share + carry_in` before any bound
    pub uncapped: u64,
    /// `uncapped` bounded by what was claimed, before the daily cap
    pub funded: u64,
    pub pool: u64,
}

impl DayPool {
    /// Investor money that has not been funded by claims yet and stays reserved
    pub fn unfunded(&self) -> u64 {
        self.uncapped - self.funded
    }

    /// Investor share above the daily cap, released to the creator at close
    pub fn over_cap(&self) -> u64 {
        self.funded - self.pool
    }
}

pub fn day_pool(config: &DistributionConfig, progress: &DayProgress) -> Result<DayPool> {
    let share = mul_div(
        progress.claimed_quote_for_day,
        config.investor_fee_share_bps as u64,
        BASIS_POINTS_DIVISOR,
    )?;
    let uncapped = share.checked_add(progress.carry_in).ok_or(FeeRoutingError::ArithmeticOverflow)?;
    let funded = uncapped.min(progress.claimed_quote_for_day);
    let pool = match config.daily_cap_lamports {
        Some(cap) => funded.min(cap),
        None => funded,
    };

    Ok(DayPool { share, uncapped, funded, pool })
}

/// Decides whether a call for `day_id` may touch the ledger at all.
pub fn check_day_gate(crank: &CrankState, existing: Option<&DayProgress>, day_id: i64, today: i64) -> Result<()> {
    require!(day_id <= today, FeeRoutingError::DayGateNotPassed);

    if let Some(latest) = crank.latest_day_id {
        require!(day_id >= latest, FeeRoutingError::DayGateNotPassed);
        if day_id == latest {
            require!(!crank.latest_day_closed, FeeRoutingError::DayAlreadyClosed);
        } else {
            require!(crank.latest_day_closed, FeeRoutingError::PreviousDayNotClosed);
        }
    }

    match existing {
        Some(progress) => {
            require!(progress.day_id == day_id, FeeRoutingError::InvalidProgressAccount);
            require!(!progress.is_day_closed, FeeRoutingError::DayAlreadyClosed);
        }
        None => {
            // Past days can be resumed but never opened
            require!(day_id == today, FeeRoutingError::DayGateNotPassed);
            require!(crank.latest_day_id != Some(day_id), FeeRoutingError::InvalidProgressAccount);
        }
    }

    Ok(())
}

fn check_investor_order(progress: &DayProgress, investors: &[InvestorEntry]) -> Result<()> {
    let mut previous = (progress.investors_seen_today > 0).then_some(progress.last_investor);
    for entry in investors {
        if let Some(previous) = previous {
            require!(entry.investor > previous, FeeRoutingError::InvestorOrderViolation);
        }
        previous = Some(entry.investor);
    }
    Ok(())
}

/// Runs one crank call against the ledger.
pub fn process_page(
    config: &DistributionConfig,
    crank: &CrankState,
    existing: Option<&DayProgress>,
    input: &PageInput,
) -> Result<PageOutcome> {
    let today = day_clock::day_id(input.now);
    check_day_gate(crank, existing, input.day_id, today)?;

    let mut crank = crank.clone();
    let opened_day = existing.is_none();
    let mut progress = match existing {
        Some(progress) => {
            require_keys_eq!(progress.target_id, config.target_id, FeeRoutingError::InvalidProgressAccount);
            progress.clone()
        }
        None => {
            let progress = DayProgress::open(config.target_id, input.day_id, crank.carry_over);
            crank.latest_day_id = Some(input.day_id);
            crank.latest_day_closed = false;
            crank.carry_over = 0;
            msg!("Opened day {} with carry-over {}", input.day_id, progress.carry_in);
            progress
        }
    };

    require!(input.page_index == progress.pagination_cursor, FeeRoutingError::InvalidPaginationCursor);
    check_investor_order(&progress, &input.investors)?;

    progress.claimed_quote_for_day = progress
        .claimed_quote_for_day
        .checked_add(input.quote_fees_claimed_this_call)
        .ok_or(FeeRoutingError::ArithmeticOverflow)?;

    let day = day_pool(config, &progress)?;
    let DayPool { share, pool, .. } = day;
    let mut remaining = pool
        .saturating_sub(progress.cumulative_distributed_today)
        .saturating_sub(progress.reserved_today()?);

    msg!("Day {} page {}:", progress.day_id, input.page_index);
    msg!("  - Claimed for day: {} (+{})", progress.claimed_quote_for_day, input.quote_fees_claimed_this_call);
    msg!("  - Investor pool: {} (share {}, carry-in {})", pool, share, progress.carry_in);
    msg!("  - Remaining budget: {}", remaining);

    let y0 = config.y0;
    let mut investor_transfers = Vec::with_capacity(input.investors.len());
    let mut page_distributed = 0u64;
    let mut page_deferred = 0u64;
    let mut page_locked = 0u64;
    let mut page_weighted = 0u64;
    let mut investors_paid = 0u32;

    for entry in &input.investors {
        if entry.locked_amount == 0 {
            continue;
        }

        page_locked = page_locked.checked_add(entry.locked_amount).ok_or(FeeRoutingError::ArithmeticOverflow)?;

        // A single investor never weighs more than the whole original allocation
        let weighted = entry.locked_amount.min(y0);
        page_weighted = page_weighted.checked_add(weighted).ok_or(FeeRoutingError::ArithmeticOverflow)?;

        let raw_payout = mul_div(pool, weighted, y0)?.min(remaining);
        remaining -= raw_payout;

        if raw_payout == 0 || raw_payout < config.min_payout_lamports {
            msg!("Deferring payout below minimum threshold: {} < {}", raw_payout, config.min_payout_lamports);
            page_deferred = page_deferred.checked_add(raw_payout).ok_or(FeeRoutingError::ArithmeticOverflow)?;
            continue;
        }

        investor_transfers.push(PlannedTransfer { destination: entry.destination, amount: raw_payout });
        page_distributed = page_distributed.checked_add(raw_payout).ok_or(FeeRoutingError::ArithmeticOverflow)?;
        investors_paid += 1;

        msg!("Investor {} payout {} (locked {})", entry.investor, raw_payout, entry.locked_amount);
    }

    // Rounding dust of this page stays reserved for investors
    let page_entitled = mul_div(pool, page_weighted.min(y0), y0)?;
    let dust = page_entitled.saturating_sub(page_distributed).saturating_sub(page_deferred).min(remaining);
    page_deferred = page_deferred.checked_add(dust).ok_or(FeeRoutingError::ArithmeticOverflow)?;

    progress.cumulative_distributed_today = progress
        .cumulative_distributed_today
        .checked_add(page_distributed)
        .ok_or(FeeRoutingError::ArithmeticOverflow)?;
    progress.carry_over = progress.carry_over.checked_add(page_deferred).ok_or(FeeRoutingError::ArithmeticOverflow)?;
    progress.locked_seen_today =
        progress.locked_seen_today.checked_add(page_locked).ok_or(FeeRoutingError::ArithmeticOverflow)?;
    if let Some(last) = input.investors.last() {
        progress.last_investor = last.investor;
    }
    progress.investors_seen_today = u32::try_from(input.investors.len())
        .ok()
        .and_then(|count| progress.investors_seen_today.checked_add(count))
        .ok_or(FeeRoutingError::ArithmeticOverflow)?;
    progress.pagination_cursor =
        progress.pagination_cursor.checked_add(1).ok_or(FeeRoutingError::ArithmeticOverflow)?;
    progress.last_update_ts = input.now;

    let creator_amount = if input.is_final_page {
        let settlement = settle_day(&progress, &day, y0)?;
        progress.carry_over = settlement.carry_over;
        progress.creator_amount = settlement.creator_amount;
        progress.is_day_closed = true;

        crank.latest_day_closed = true;
        crank.carry_over = settlement.carry_over;
        crank.days_closed = crank.days_closed.checked_add(1).ok_or(FeeRoutingError::ArithmeticOverflow)?;

        msg!("Closing day {}:", progress.day_id);
        msg!("  - Distributed to investors: {}", progress.cumulative_distributed_today);
        msg!("  - Carry-over reserved: {}", settlement.carry_over);
        msg!("  - Creator remainder: {}", settlement.creator_amount);

        Some(settlement.creator_amount)
    } else {
        None
    };

    check_invariants(config, &progress)?;

    Ok(PageOutcome {
        crank,
        progress,
        opened_day,
        pool,
        investor_transfers,
        page_distributed,
        page_deferred,
        investors_paid,
        creator_amount,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub carry_over: u64,
    pub creator_amount: u64,
}

/// Splits what is left of the day between next day's investors and the creator.
///
/// The still-locked cohort is entitled to `pool * locked_seen / y0`. Whatever of
/// that was not transferred carries over, together with inherited carry that
/// today's claims could not fund. The share above the daily cap goes to the
/// creator with the rest, which is always
/// `(claimed - share) + (funded - entitlement)`.
pub fn settle_day(progress: &DayProgress, day: &DayPool, y0: u64) -> Result<Settlement> {
    let entitlement = mul_div(day.pool, progress.locked_seen_today.min(y0), y0)?;

    let carry_over = entitlement
        .checked_sub(progress.cumulative_distributed_today)
        .ok_or(FeeRoutingError::ArithmeticOverflow)?
        .checked_add(day.unfunded())
        .ok_or(FeeRoutingError::ArithmeticOverflow)?;

    let creator_amount = progress
        .claimed_quote_for_day
        .checked_add(progress.carry_in)
        .ok_or(FeeRoutingError::ArithmeticOverflow)?
        .checked_sub(progress.cumulative_distributed_today)
        .ok_or(FeeRoutingError::ArithmeticOverflow)?
        .checked_sub(carry_over)
        .ok_or(FeeRoutingError::ArithmeticOverflow)?;

    if day.over_cap() > 0 {
        msg!("  - Released above daily cap: {}", day.over_cap());
    }

    Ok(Settlement { carry_over, creator_amount })
}

fn check_invariants(config: &DistributionConfig, progress: &DayProgress) -> Result<()> {
    require!(
        progress.cumulative_distributed_today <= progress.claimed_quote_for_day,
        FeeRoutingError::InvariantViolation
    );
    if let Some(cap) = config.daily_cap_lamports {
        require!(progress.cumulative_distributed_today <= cap, FeeRoutingError::InvariantViolation);
    }
    Ok(())
}
