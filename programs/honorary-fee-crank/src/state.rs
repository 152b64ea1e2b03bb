use anchor_lang::prelude::*;

use crate::{constants::BASIS_POINTS_DIVISOR, errors::FeeRoutingError};

/// Immutable distribution configuration, one per target
#[account]
#[derive(Default, Debug, PartialEq)]
pub struct DistributionConfig {
    /// Fee-generating position or pool this distribution is keyed by
    pub target_id: Pubkey,
    /// Quote mint; the only mint whose fees are distributed
    pub quote_mint: Pubkey,
    /// Base mint of the pool
    pub base_mint: Pubkey,
    /// Creator's quote token account receiving the day-end remainder
    pub creator_quote_ata: Pubkey,
    /// Program quote treasury (ATA owned by the treasury authority PDA)
    pub quote_treasury: Pubkey,
    /// Lower tick of the honorary position
    pub tick_lower: i32,
    /// Upper tick of the honorary position
    pub tick_upper: i32,
    /// Maximum investor share of claimed fees in basis points (out of 10000)
    pub investor_fee_share_bps: u16,
    /// Optional daily cap on investor distributions in lamports
    pub daily_cap_lamports: Option<u64>,
    /// Minimum payout threshold in lamports; smaller payouts are carried over
    pub min_payout_lamports: u64,
    /// Total original locked allocation (Y0), the pro-rata denominator
    pub y0: u64,
    /// Creation timestamp
    pub creation_ts: i64,
    /// Set once at creation
    pub initialized: bool,
    /// Bump seed for the PDA
    pub bump: u8,
}

impl DistributionConfig {
    pub const LEN: usize = 8 + 32 * 5 + 4 + 4 + 2 + 9 + 8 + 8 + 8 + 1 + 1; // discriminator + fields + bump

    /// Checks creation parameters. Nothing is ever clamped into range.
    pub fn validate_params(tick_lower: i32, tick_upper: i32, investor_fee_share_bps: u16, y0: u64) -> Result<()> {
        require!(tick_lower < tick_upper, FeeRoutingError::InvalidTickRange);
        require!(investor_fee_share_bps as u64 <= BASIS_POINTS_DIVISOR, FeeRoutingError::InvalidFeeShare);
        require!(y0 > 0, FeeRoutingError::InvalidY0);
        Ok(())
    }
}

/// Head of the per-day progress ledger for one target
#[account]
#[derive(Default, Debug, PartialEq)]
pub struct CrankState {
    /// Target this ledger belongs to
    pub target_id: Pubkey,
    /// Most recent day that has a progress record
    pub latest_day_id: Option<i64>,
    /// Whether the most recent day has been closed
    pub latest_day_closed: bool,
    /// Carry-over left by the latest closed day, inherited by the next day
    pub carry_over: u64,
    /// Number of days closed so far
    pub days_closed: u64,
    /// Quote treasury balance already accounted for by the ledger
    pub reserved_treasury_balance: u64,
    /// Bump seed for the PDA
    pub bump: u8,
}

impl CrankState {
    pub const LEN: usize = 8 + 32 + 9 + 1 + 8 + 8 + 8 + 1;

    /// True when there is a day that still needs its final page
    pub fn has_open_day(&self) -> bool {
        self.latest_day_id.is_some() && !self.latest_day_closed
    }
}

/// Distribution progress for one (target, day) pair. Never deleted.
#[account]
#[derive(Default, Debug, PartialEq)]
pub struct DayProgress {
    /// Target this record belongs to
    pub target_id: Pubkey,
    /// Day index (unix seconds / 86400)
    pub day_id: i64,
    /// Total quote fees claimed so far this day
    pub claimed_quote_for_day: u64,
    /// Running sum transferred to investors this day
    pub cumulative_distributed_today: u64,
    /// Carry-over inherited from the previous closed day
    pub carry_in: u64,
    /// Running carry-over (inherited + deferred + dust); final value at close
    pub carry_over: u64,
    /// Sum of locked amounts presented on this day's pages
    pub locked_seen_today: u64,
    /// Highest investor identity processed this day
    pub last_investor: Pubkey,
    /// Number of investors presented this day
    pub investors_seen_today: u32,
    /// Pages processed so far this day
    pub pagination_cursor: u32,
    /// Set once the final page is accepted
    pub is_day_closed: bool,
    /// Amount paid to the creator at close
    pub creator_amount: u64,
    /// Timestamp of the last accepted page
    pub last_update_ts: i64,
    /// Set when the record is first written
    pub initialized: bool,
    /// Bump seed for the PDA
    pub bump: u8,
}

impl DayProgress {
    pub const LEN: usize = 8 + 32 + 8 + 8 + 8 + 8 + 8 + 8 + 32 + 4 + 4 + 1 + 8 + 8 + 1 + 1;

    /// Fresh record for a new day, inheriting the previous day's carry-over
    pub fn open(target_id: Pubkey, day_id: i64, carry_in: u64) -> Self {
        Self {
            target_id,
            day_id,
            carry_in,
            carry_over: carry_in,
            initialized: true,
            ..Default::default()
        }
    }

    /// Carry-over added during this day (deferred payouts and dust)
    pub fn reserved_today(&self) -> Result<u64> {
        self.carry_over.checked_sub(self.carry_in).ok_or_else(|| error!(FeeRoutingError::ArithmeticOverflow))
    }
}
