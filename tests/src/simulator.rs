use std::collections::BTreeMap;

use anchor_lang::prelude::*;
use honorary_fee_crank::{
    day_clock,
    engine::{self, InvestorEntry, PageInput, PageOutcome},
    CrankState, DayProgress, DistributionConfig, FeeRoutingError,
};

/// Ledger plus token balances, advanced one crank call at a time
#[derive(Debug)]
pub struct CrankSimulator {
    pub config: DistributionConfig,
    pub crank: CrankState,
    pub days: BTreeMap<i64, DayProgress>,
    pub now: i64,
    pub treasury: u64,
    pub creator_balance: u64,
    pub investor_balances: BTreeMap<Pubkey, u64>,
    pub total_deposited: u64,
}

impl CrankSimulator {
    pub fn new(config: DistributionConfig, now: i64) -> Self {
        let crank = CrankState { target_id: config.target_id, ..Default::default() };
        Self {
            config,
            crank,
            days: BTreeMap::new(),
            now,
            treasury: 0,
            creator_balance: 0,
            investor_balances: BTreeMap::new(),
            total_deposited: 0,
        }
    }

    pub fn today(&self) -> i64 {
        day_clock::day_id(self.now)
    }

    pub fn advance_days(&mut self, days: i64) {
        self.now += days * honorary_fee_crank::SECONDS_PER_DAY;
    }

    /// Fees landing in the quote treasury outside of the crank
    pub fn deposit_fees(&mut self, amount: u64) {
        self.treasury += amount;
        self.total_deposited += amount;
    }

    pub fn investor_balance(&self, destination: &Pubkey) -> u64 {
        self.investor_balances.get(destination).copied().unwrap_or_default()
    }

    pub fn total_investor_balance(&self) -> u64 {
        self.investor_balances.values().sum()
    }

    /// One `process_page` call, accounted the way the program accounts it
    pub fn crank(
        &mut self,
        day_id: i64,
        page_index: u32,
        is_final_page: bool,
        investors: Vec<InvestorEntry>,
    ) -> Result<PageOutcome> {
        let quote_fees_claimed_this_call = self
            .treasury
            .checked_sub(self.crank.reserved_treasury_balance)
            .ok_or(FeeRoutingError::TreasuryUnderfunded)?;

        let input = PageInput { day_id, page_index, is_final_page, quote_fees_claimed_this_call, now: self.now, investors };
        let outcome = engine::process_page(&self.config, &self.crank, self.days.get(&day_id), &input)?;

        for transfer in &outcome.investor_transfers {
            *self.investor_balances.entry(transfer.destination).or_default() += transfer.amount;
        }
        self.creator_balance += outcome.creator_amount.unwrap_or_default();
        self.treasury = self.treasury.checked_sub(outcome.total_outflow()?).ok_or(FeeRoutingError::TreasuryUnderfunded)?;

        self.crank = outcome.crank.clone();
        self.crank.reserved_treasury_balance = self.treasury;
        self.days.insert(day_id, outcome.progress.clone());

        Ok(outcome)
    }

    /// Cranks today through every page, closing the day on the last one.
    /// An empty page list still closes the day with a single empty page.
    pub fn run_day(&mut self, pages: &[Vec<InvestorEntry>]) -> Result<Vec<PageOutcome>> {
        let day_id = self.today();
        let start = self.days.get(&day_id).map(|progress| progress.pagination_cursor).unwrap_or_default();

        if pages.is_empty() {
            return Ok(vec![self.crank(day_id, start, true, vec![])?]);
        }

        let last = pages.len() - 1;
        pages
            .iter()
            .enumerate()
            .map(|(index, page)| self.crank(day_id, start + index as u32, index == last, page.clone()))
            .collect()
    }

    /// Every deposited lamport is either still in the treasury or was paid out
    pub fn is_conserved(&self) -> bool {
        self.treasury + self.creator_balance + self.total_investor_balance() == self.total_deposited
    }

    /// Once a day closes, and before new fees arrive, the treasury holds exactly the carry-over
    pub fn treasury_matches_carry(&self) -> bool {
        self.crank.has_open_day() || self.treasury == self.crank.carry_over
    }
}
