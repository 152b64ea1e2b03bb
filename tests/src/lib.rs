//! Off-chain harness for the honorary fee crank.
//!
//! [`simulator::CrankSimulator`] keeps the same ledger the program keeps
//! (config, crank head, one progress record per day) together with token
//! balances, and feeds every call through the program's distribution engine.
//! [`fixtures`] loads the JSON scenarios under `fixtures/`.

pub mod simulator;

pub use simulator::CrankSimulator;
