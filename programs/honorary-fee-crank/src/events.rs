use anchor_lang::prelude::*;

/// Event emitted when a distribution target is configured
#[event]
pub struct DistributionInitialized {
    /// The fee-generating position or pool this config belongs to
    pub target_id: Pubkey,
    /// Quote mint (the only mint distributed)
    pub quote_mint: Pubkey,
    /// Base mint of the pool
    pub base_mint: Pubkey,
    /// Lower tick of the honorary position
    pub tick_lower: i32,
    /// Upper tick of the honorary position
    pub tick_upper: i32,
    /// Maximum investor share in basis points
    pub investor_fee_share_bps: u16,
    /// Total original locked allocation
    pub y0: u64,
}

/// Event emitted when the first page of a new day creates its progress record
#[event]
pub struct DayOpened {
    pub target_id: Pubkey,
    pub day_id: i64,
    /// Carry-over inherited from the previous closed day
    pub carry_in: u64,
}

/// Event emitted when new quote fees are accounted for the day
#[event]
pub struct QuoteFeesClaimed {
    pub target_id: Pubkey,
    pub day_id: i64,
    /// Amount newly claimed by this call
    pub amount_claimed: u64,
    /// Running total for the day
    pub claimed_quote_for_day: u64,
}

/// Event emitted for each investor payout page
#[event]
pub struct InvestorPayoutPage {
    pub target_id: Pubkey,
    pub day_id: i64,
    /// Page index that was processed
    pub page_index: u32,
    /// Number of investors presented in this page
    pub investor_count: u32,
    /// Number of investors that received a transfer
    pub investors_paid: u32,
    /// Total amount transferred in this page
    pub total_distributed: u64,
    /// Amount deferred to carry-over in this page (sub-minimum payouts and dust)
    pub deferred: u64,
    /// Timestamp of distribution
    pub timestamp: i64,
}

/// Event emitted when creator receives remainder and day is closed
#[event]
pub struct CreatorPayoutDayClosed {
    pub target_id: Pubkey,
    pub day_id: i64,
    /// Amount sent to creator
    pub creator_amount: u64,
    /// Total distributed to investors today
    pub total_investor_distributed: u64,
    /// Carry-over reserved for the next day
    pub carry_over: u64,
    /// Timestamp when day closed
    pub timestamp: i64,
}
