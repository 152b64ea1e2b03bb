use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{self, Mint, Token, TokenAccount, Transfer},
};

declare_id!("HfcRnk7a5V2qUwZq7m2mB8w4oVxY9xP3cJ1Lr6uD2sTe");

pub mod constants;
pub mod day_clock;
pub mod engine;
pub mod errors;
pub mod events;
pub mod state;
pub mod streams;

#[cfg(test)]
mod tests;

pub use constants::*;
pub use errors::*;
pub use events::*;
pub use state::*;

use engine::{InvestorEntry, PageInput, PageOutcome};
use streams::{LockedBalanceSource, StreamflowStream};

#[program]
pub mod honorary_fee_crank {
    use super::*;

    /// @notice Create the immutable distribution config for a fee-generating target
    /// @dev Also creates the crank ledger head and the program-owned quote treasury
    /// @param target_id Opaque key of the honorary position or pool
    /// @param tick_lower Lower tick of the honorary position, must be below tick_upper
    /// @param tick_upper Upper tick of the honorary position
    /// @param investor_fee_share_bps Maximum investor share of claimed fees (<= 10000)
    /// @param daily_cap_lamports Optional daily cap on investor distributions
    /// @param min_payout_lamports Payouts below this are deferred to carry-over
    /// @param y0 Total original locked allocation used as the pro-rata denominator
    #[allow(clippy::too_many_arguments)]
    pub fn initialize_distribution(
        ctx: Context<InitializeDistribution>,
        target_id: Pubkey,
        tick_lower: i32,
        tick_upper: i32,
        investor_fee_share_bps: u16,
        daily_cap_lamports: Option<u64>,
        min_payout_lamports: u64,
        y0: u64,
    ) -> Result<()> {
        require!(!ctx.accounts.config.initialized, FeeRoutingError::AlreadyInitialized);
        DistributionConfig::validate_params(tick_lower, tick_upper, investor_fee_share_bps, y0)?;
        require_keys_neq!(
            ctx.accounts.quote_mint.key(),
            ctx.accounts.base_mint.key(),
            FeeRoutingError::InvalidQuoteMint
        );

        let clock = Clock::get()?;

        let config = &mut ctx.accounts.config;
        config.target_id = target_id;
        config.quote_mint = ctx.accounts.quote_mint.key();
        config.base_mint = ctx.accounts.base_mint.key();
        config.creator_quote_ata = ctx.accounts.creator_quote_ata.key();
        config.quote_treasury = ctx.accounts.quote_treasury.key();
        config.tick_lower = tick_lower;
        config.tick_upper = tick_upper;
        config.investor_fee_share_bps = investor_fee_share_bps;
        config.daily_cap_lamports = daily_cap_lamports;
        config.min_payout_lamports = min_payout_lamports;
        config.y0 = y0;
        config.creation_ts = clock.unix_timestamp;
        config.initialized = true;
        config.bump = ctx.bumps.config;

        let crank_state = &mut ctx.accounts.crank_state;
        crank_state.target_id = target_id;
        crank_state.latest_day_id = None;
        crank_state.latest_day_closed = false;
        crank_state.carry_over = 0;
        crank_state.days_closed = 0;
        crank_state.reserved_treasury_balance = ctx.accounts.quote_treasury.amount;
        crank_state.bump = ctx.bumps.crank_state;

        msg!("Distribution initialized:");
        msg!("  Target: {}", target_id);
        msg!("  Quote mint: {}", ctx.accounts.quote_mint.key());
        msg!("  Ticks: [{}, {})", tick_lower, tick_upper);
        msg!("  Investor share: {} bps, cap {:?}, min payout {}", investor_fee_share_bps, daily_cap_lamports, min_payout_lamports);
        msg!("  Y0: {}", y0);

        emit!(DistributionInitialized {
            target_id,
            quote_mint: ctx.accounts.quote_mint.key(),
            base_mint: ctx.accounts.base_mint.key(),
            tick_lower,
            tick_upper,
            investor_fee_share_bps,
            y0,
        });

        Ok(())
    }

    /// @notice Permissionless crank processing one page of investors for a day
    /// @dev Fees newly deposited into the quote treasury since the last call are accrued to the day
    /// @dev Remaining accounts are passed as: [stream_1, investor_ata_1, stream_2, investor_ata_2, ...]
    /// @param day_id Day being processed; today to open or continue, an earlier open day to finish it
    /// @param page_index Must equal the day's pagination cursor (0-based)
    /// @param is_final_page Settles the creator remainder and closes the day
    pub fn process_page<'info>(
        ctx: Context<'_, '_, '_, 'info, ProcessPage<'info>>,
        day_id: i64,
        page_index: u32,
        is_final_page: bool,
    ) -> Result<()> {
        let clock = Clock::get()?;
        let now = clock.unix_timestamp;

        let treasury_balance = ctx.accounts.quote_treasury.amount;
        let quote_fees_claimed_this_call = treasury_balance
            .checked_sub(ctx.accounts.crank_state.reserved_treasury_balance)
            .ok_or(FeeRoutingError::TreasuryUnderfunded)?;

        let investors = read_investor_page(ctx.remaining_accounts, &ctx.accounts.config, now)?;
        let investor_count = investors.len() as u32;

        let input = PageInput { day_id, page_index, is_final_page, quote_fees_claimed_this_call, now, investors };

        let existing = if ctx.accounts.day_progress.initialized { Some(&**ctx.accounts.day_progress) } else { None };
        let outcome = engine::process_page(&ctx.accounts.config, &ctx.accounts.crank_state, existing, &input)?;

        execute_transfers(&ctx, &outcome)?;

        let target_id = ctx.accounts.config.target_id;
        let post_balance =
            treasury_balance.checked_sub(outcome.total_outflow()?).ok_or(FeeRoutingError::TreasuryUnderfunded)?;

        let mut crank_state = outcome.crank.clone();
        crank_state.reserved_treasury_balance = post_balance;
        **ctx.accounts.crank_state = crank_state;

        let mut progress = outcome.progress.clone();
        if outcome.opened_day {
            progress.bump = ctx.bumps.day_progress;
            msg!("Day {} window starts at {}", day_id, day_clock::day_start(day_id));
            emit!(DayOpened { target_id, day_id, carry_in: progress.carry_in });
        }
        **ctx.accounts.day_progress = progress;

        if quote_fees_claimed_this_call > 0 {
            emit!(QuoteFeesClaimed {
                target_id,
                day_id,
                amount_claimed: quote_fees_claimed_this_call,
                claimed_quote_for_day: outcome.progress.claimed_quote_for_day,
            });
        }

        emit!(InvestorPayoutPage {
            target_id,
            day_id,
            page_index,
            investor_count,
            investors_paid: outcome.investors_paid,
            total_distributed: outcome.page_distributed,
            deferred: outcome.page_deferred,
            timestamp: now,
        });

        if let Some(creator_amount) = outcome.creator_amount {
            emit!(CreatorPayoutDayClosed {
                target_id,
                day_id,
                creator_amount,
                total_investor_distributed: outcome.progress.cumulative_distributed_today,
                carry_over: outcome.progress.carry_over,
                timestamp: now,
            });
        }

        Ok(())
    }
}

/// @notice Build the engine's view of a page from (stream, investor_ata) account pairs
/// @dev Locked balances come from Streamflow streams of the base mint
/// @dev Each ATA must be a quote mint token account owned by its stream's recipient
fn read_investor_page(accounts: &[AccountInfo], config: &DistributionConfig, now: i64) -> Result<Vec<InvestorEntry>> {
    require!(
        accounts.len() % 2 == 0 && accounts.len() / 2 <= MAX_PAGE_SIZE,
        FeeRoutingError::InvalidInvestorData
    );

    accounts
        .chunks_exact(2)
        .map(|pair| -> Result<InvestorEntry> {
            let stream_account = &pair[0];
            let investor_ata = &pair[1];

            require_keys_eq!(*investor_ata.owner, token::ID, FeeRoutingError::InvalidInvestorAta);
            let ata_data = investor_ata.try_borrow_data()?;
            let token_account = TokenAccount::try_deserialize(&mut &ata_data[..])
                .map_err(|_| FeeRoutingError::InvalidInvestorAta)?;
            require_keys_eq!(token_account.mint, config.quote_mint, FeeRoutingError::InvalidInvestorAta);

            let stream = StreamflowStream::load(stream_account)?;
            require_keys_eq!(stream.mint(), config.base_mint, FeeRoutingError::InvalidStreamflowContract);
            require_keys_eq!(token_account.owner, stream.recipient(), FeeRoutingError::InvalidInvestorAta);

            let locked_amount = stream.locked_amount(now)?;

            Ok(InvestorEntry { investor: stream.key(), destination: investor_ata.key(), locked_amount })
        })
        .collect()
}

/// @notice Execute the plan's investor payouts and creator remainder from the quote treasury
/// @dev Signs with the treasury authority PDA; runs only after the engine accepted the page
fn execute_transfers<'info>(ctx: &Context<'_, '_, '_, 'info, ProcessPage<'info>>, outcome: &PageOutcome) -> Result<()> {
    for planned in &outcome.investor_transfers {
        let investor_ata = ctx
            .remaining_accounts
            .iter()
            .skip(1)
            .step_by(2)
            .find(|account| account.key() == planned.destination)
            .ok_or(FeeRoutingError::InvalidInvestorData)?;

        transfer_from_treasury(ctx, investor_ata.clone(), planned.amount)?;
    }

    if let Some(creator_amount) = outcome.creator_amount {
        if creator_amount > 0 {
            transfer_from_treasury(ctx, ctx.accounts.creator_quote_ata.to_account_info(), creator_amount)?;
        }
    }

    Ok(())
}

fn transfer_from_treasury<'info>(
    ctx: &Context<'_, '_, '_, 'info, ProcessPage<'info>>,
    to: AccountInfo<'info>,
    amount: u64,
) -> Result<()> {
    let transfer_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        Transfer {
            from: ctx.accounts.quote_treasury.to_account_info(),
            to,
            authority: ctx.accounts.quote_treasury_authority.to_account_info(),
        },
    );

    let target_id = ctx.accounts.config.target_id;
    let seeds = &[QUOTE_TREASURY_SEED, target_id.as_ref(), &[ctx.bumps.quote_treasury_authority]];
    let signer_seeds = &[&seeds[..]];

    token::transfer(transfer_ctx.with_signer(signer_seeds), amount)
}

/// @notice Accounts for creating a distribution config
/// @dev Config and crank state are PDAs keyed by target_id; the treasury is an ATA of the treasury authority PDA
#[derive(Accounts)]
#[instruction(target_id: Pubkey)]
pub struct InitializeDistribution<'info> {
    #[account(
        init_if_needed,
        payer = payer,
        space = DistributionConfig::LEN,
        seeds = [CONFIG_SEED, target_id.as_ref()],
        bump
    )]
    pub config: Box<Account<'info, DistributionConfig>>,

    #[account(
        init_if_needed,
        payer = payer,
        space = CrankState::LEN,
        seeds = [CRANK_STATE_SEED, target_id.as_ref()],
        bump
    )]
    pub crank_state: Box<Account<'info, CrankState>>,

    /// Quote mint; the only mint distributed
    pub quote_mint: Box<Account<'info, Mint>>,

    /// Base mint of the pool
    pub base_mint: Box<Account<'info, Mint>>,

    /// Quote treasury ATA owned by the program
    #[account(
        init_if_needed,
        payer = payer,
        associated_token::mint = quote_mint,
        associated_token::authority = quote_treasury_authority
    )]
    pub quote_treasury: Box<Account<'info, TokenAccount>>,

    /// Authority for the quote treasury (PDA)
    /// CHECK: This is a PDA derived from target_id and validated by seeds constraint
    #[account(
        seeds = [QUOTE_TREASURY_SEED, target_id.as_ref()],
        bump
    )]
    pub quote_treasury_authority: UncheckedAccount<'info>,

    /// Creator's quote token account receiving the day-end remainder
    #[account(token::mint = quote_mint)]
    pub creator_quote_ata: Box<Account<'info, TokenAccount>>,

    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,

    pub token_program: Program<'info, Token>,

    pub associated_token_program: Program<'info, AssociatedToken>,
}

/// @notice Accounts for one crank call
/// @dev The day's progress PDA is created on the first page of the day
/// @dev Remaining accounts should be passed as: [stream_1, investor_ata_1, ...]
#[derive(Accounts)]
#[instruction(day_id: i64)]
pub struct ProcessPage<'info> {
    #[account(
        seeds = [CONFIG_SEED, config.target_id.as_ref()],
        bump = config.bump,
        has_one = quote_mint,
        has_one = quote_treasury,
        has_one = creator_quote_ata,
    )]
    pub config: Box<Account<'info, DistributionConfig>>,

    #[account(
        mut,
        seeds = [CRANK_STATE_SEED, config.target_id.as_ref()],
        bump = crank_state.bump
    )]
    pub crank_state: Box<Account<'info, CrankState>>,

    #[account(
        init_if_needed,
        payer = payer,
        space = DayProgress::LEN,
        seeds = [PROGRESS_SEED, config.target_id.as_ref(), &day_id.to_le_bytes()],
        bump
    )]
    pub day_progress: Box<Account<'info, DayProgress>>,

    pub quote_mint: Box<Account<'info, Mint>>,

    #[account(
        mut,
        associated_token::mint = quote_mint,
        associated_token::authority = quote_treasury_authority
    )]
    pub quote_treasury: Box<Account<'info, TokenAccount>>,

    /// CHECK: This is a PDA derived from target_id and validated by seeds constraint
    #[account(
        seeds = [QUOTE_TREASURY_SEED, config.target_id.as_ref()],
        bump
    )]
    pub quote_treasury_authority: UncheckedAccount<'info>,

    #[account(mut)]
    pub creator_quote_ata: Box<Account<'info, TokenAccount>>,

    /// Permissionless caller; pays for the day's progress account
    #[account(mut)]
    pub payer: Signer<'info>,

    pub system_program: Program<'info, System>,

    pub token_program: Program<'info, Token>,
}
