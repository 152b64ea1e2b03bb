use anchor_lang::prelude::*;

#[error_code]
pub enum FeeRoutingError {
    #[msg("Invalid tick range - lower tick must be strictly below upper tick")]
    InvalidTickRange,

    #[msg("Invalid investor fee share - basis points must be <= 10000")]
    InvalidFeeShare,

    #[msg("Distribution already initialized for this target")]
    AlreadyInitialized,

    #[msg("Y0 (total original locked allocation) must be non-zero")]
    InvalidY0,

    #[msg("Invalid quote mint - quote and base mints must differ and match the treasury")]
    InvalidQuoteMint,

    #[msg("Day gate not passed - day is in the future or older than the latest day")]
    DayGateNotPassed,

    #[msg("Distribution already closed for this day")]
    DayAlreadyClosed,

    #[msg("Previous day was never closed - finish it before opening a new day")]
    PreviousDayNotClosed,

    #[msg("Invalid pagination cursor - page index does not match progress")]
    InvalidPaginationCursor,

    #[msg("Investors must be presented in strictly increasing order within a day")]
    InvestorOrderViolation,

    #[msg("Invalid investor data - remaining accounts must be (stream, ata) pairs within page size")]
    InvalidInvestorData,

    #[msg("Progress account does not match the declared day")]
    InvalidProgressAccount,

    #[msg("Invalid Streamflow contract data - unable to deserialize")]
    InvalidStreamflowContract,

    #[msg("Investor ATA is not a quote mint token account")]
    InvalidInvestorAta,

    #[msg("Quote treasury holds less than the ledger has reserved")]
    TreasuryUnderfunded,

    #[msg("Distribution would exceed claimed fees or the daily cap")]
    InvariantViolation,

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
}
