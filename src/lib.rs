//! Rendimento - Brazilian fixed-income yield and tax engine
//!
//! This library evaluates fixed-income investments (CDB, LCI/LCA, Tesouro,
//! debentures, funds): gross value, regressive income tax and IOF, net value,
//! period and annualized returns, and assembles immutable dashboard snapshots
//! with risk and liquidity alerts.

pub mod calculator;
pub mod calendar;
pub mod cli;
pub mod config;
pub mod db;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod snapshot;
pub mod tax;
pub mod utils;

pub use calculator::YieldCalculator;
pub use error::{CalcError, RendimentoError};
pub use models::{InstrumentKind, InvestmentTerms, MarketIndicators, RateBasis, YieldResult};
pub use snapshot::{Alert, DashboardSnapshot, SnapshotBuilder};
