use anchor_lang::prelude::*;

/// Seeds for PDAs
pub const CONFIG_SEED: &[u8] = b"investor_fee_config";
pub const PROGRESS_SEED: &[u8] = b"investor_fee_progress";
pub const CRANK_STATE_SEED: &[u8] = b"crank_state";
pub const QUOTE_TREASURY_SEED: &[u8] = b"quote_treasury";

pub const SECONDS_PER_DAY: i64 = 86_400;

pub const BASIS_POINTS_DIVISOR: u64 = 10_000;

/// Maximum investors per page (each investor uses two remaining accounts)
pub const MAX_PAGE_SIZE: usize = 16;

#[constant]
pub const STREAMFLOW_PROGRAM_ID: Pubkey = pubkey!("strmRqUCoQUgGUan5YhzUZa6KqdzwX5L6FpUxfmKg5m");
