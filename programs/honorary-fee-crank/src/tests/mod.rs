
use anchor_lang::prelude::{msg, Pubkey, Result};
use streamflow_sdk::state::{Contract as StreamflowContract, CreateParams};

use crate::{
    engine::{self, InvestorEntry, PageInput, PageOutcome},
    errors::FeeRoutingError,
    state::{CrankState, DayProgress, DistributionConfig},
    SECONDS_PER_DAY,
};

/// Day used by the engine tests
pub(crate) const TODAY: i64 = 20_000;

/// A timestamp one hour into `TODAY`
pub(crate) const NOW: i64 = TODAY * SECONDS_PER_DAY + 3_600;

pub(crate) fn config(investor_fee_share_bps: u16, daily_cap: Option<u64>, min_payout: u64, y0: u64) -> DistributionConfig {
    DistributionConfig {
        target_id: Pubkey::new_from_array([7; 32]),
        quote_mint: Pubkey::new_from_array([8; 32]),
        base_mint: Pubkey::new_from_array([9; 32]),
        creator_quote_ata: Pubkey::new_from_array([10; 32]),
        quote_treasury: Pubkey::new_from_array([11; 32]),
        tick_lower: -100,
        tick_upper: 100,
        investor_fee_share_bps,
        daily_cap_lamports: daily_cap,
        min_payout_lamports: min_payout,
        y0,
        creation_ts: NOW - SECONDS_PER_DAY,
        initialized: true,
        bump: 255,
    }
}

pub(crate) fn fresh_crank(config: &DistributionConfig) -> CrankState {
    CrankState { target_id: config.target_id, ..Default::default() }
}

/// Investor whose identity orders by `seed`
pub(crate) fn investor(seed: u8, locked_amount: u64) -> InvestorEntry {
    InvestorEntry {
        investor: Pubkey::new_from_array([seed; 32]),
        destination: Pubkey::new_from_array([seed.wrapping_add(100); 32]),
        locked_amount,
    }
}

pub(crate) fn page(
    day_id: i64,
    page_index: u32,
    is_final_page: bool,
    claimed: u64,
    investors: Vec<InvestorEntry>,
) -> PageInput {
    PageInput { day_id, page_index, is_final_page, quote_fees_claimed_this_call: claimed, now: NOW, investors }
}

/// Runs a page and applies the outcome to the caller's ledger copies
pub(crate) fn run_page(
    config: &DistributionConfig,
    crank: &mut CrankState,
    progress: &mut Option<DayProgress>,
    input: &PageInput,
) -> Result<PageOutcome> {
    let outcome = engine::process_page(config, crank, progress.as_ref(), input)?;
    *crank = outcome.crank.clone();
    *progress = Some(outcome.progress.clone());
    Ok(outcome)
}

pub(crate) fn assert_fee_error<T>(result: Result<T>, expected: FeeRoutingError) {
    match result.err() {
        Some(anchor_lang::error::Error::AnchorError(error)) => {
            msg!("Got expected error: {}", error.error_name);
            assert_eq!(error.error_code_number, u32::from(expected));
        }
        Some(other) => panic!("Expected {} but got {:?}", expected, other),
        None => panic!("Expected {} but the call succeeded", expected),
    }
}

/// Open Streamflow contract vesting `deposited` linearly, one unit of time per period
pub(crate) fn stream_contract(recipient: Pubkey, mint: Pubkey, deposited: u64, start: u64, end: u64) -> StreamflowContract {
    StreamflowContract {
        magic: 0,
        version: 2,
        created_at: start,
        amount_withdrawn: 0,
        canceled_at: 0,
        end_time: end,
        last_withdrawn_at: 0,
        sender: Pubkey::new_from_array([1; 32]),
        sender_tokens: Pubkey::new_from_array([2; 32]),
        recipient,
        recipient_tokens: Pubkey::new_from_array([3; 32]),
        mint,
        escrow_tokens: Pubkey::new_from_array([4; 32]),
        streamflow_treasury: Pubkey::new_from_array([5; 32]),
        streamflow_treasury_tokens: Pubkey::new_from_array([6; 32]),
        streamflow_fee_total: 0,
        streamflow_fee_withdrawn: 0,
        streamflow_fee_percent: 0.0,
        partner: Pubkey::default(),
        partner_tokens: Pubkey::default(),
        partner_fee_total: 0,
        partner_fee_withdrawn: 0,
        partner_fee_percent: 0.0,
        ix: CreateParams {
            start_time: start,
            net_amount_deposited: deposited,
            period: 1,
            amount_per_period: deposited / (end - start),
            cliff: 0,
            cliff_amount: 0,
            cancelable_by_sender: false,
            cancelable_by_recipient: false,
            automatic_withdrawal: false,
            transferable_by_sender: false,
            transferable_by_recipient: false,
            can_topup: false,
            stream_name: [0; 64],
            withdraw_frequency: 1,
            ghost: 0,
            pausable: false,
            can_update_rate: false,
        },
        ix_padding: vec![],
        closed: false,
        current_pause_start: 0,
        pause_cumulative: 0,
        last_rate_change_time: 0,
        funds_unlocked_at_last_rate_change: 0,
    }
}
