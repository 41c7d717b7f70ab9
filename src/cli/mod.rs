use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::models::{InstrumentKind, RateBasis};
use crate::utils;

pub mod formatters;

#[derive(Parser)]
#[command(name = "rendimento")]
#[command(
    version,
    about = "Brazilian fixed-income yield and tax calculator"
)]
#[command(
    long_about = "Evaluate CDB, LCI/LCA, Tesouro and other fixed-income investments: gross and net value after IR and IOF, period and annualized returns, risk alerts, and stored dashboard snapshots."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Path to config.toml (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate an investment and build its dashboard snapshot
    Evaluate(EvaluateArgs),

    /// Stored dashboard snapshots
    Snapshots {
        #[command(subcommand)]
        action: SnapshotCommands,
    },

    /// Show the income tax (IR) and IOF tables
    Tables,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Amount invested (1234.56 or 1.234,56)
    #[arg(long, value_parser = amount_arg)]
    pub principal: Decimal,

    /// Investment date (YYYY-MM-DD or DD/MM/YYYY)
    #[arg(long, value_parser = date_arg)]
    pub start: NaiveDate,

    /// Maturity date (YYYY-MM-DD or DD/MM/YYYY)
    #[arg(long, value_parser = date_arg)]
    pub maturity: NaiveDate,

    #[command(flatten)]
    pub rate: RateArgs,

    /// Evaluation date, defaults to today
    #[arg(long, value_parser = date_arg)]
    pub as_of: Option<NaiveDate>,

    /// Instrument kind (CDB, LCI, LCA, CRI, CRA, DEBENTURE, TESOURO_SELIC, ...)
    #[arg(long, default_value = "CDB", value_parser = kind_arg)]
    pub kind: InstrumentKind,

    /// Bank or issuer name
    #[arg(long, default_value = "N/A")]
    pub issuer: String,

    /// Liquidity class, 1 (daily) to 5 (only at maturity)
    #[arg(long, default_value_t = 1)]
    pub liquidity: u8,

    /// Risk class, 1 (lowest) to 5 (highest)
    #[arg(long, default_value_t = 1)]
    pub risk: u8,

    /// Covered by the FGC deposit guarantee
    #[arg(long)]
    pub fgc: bool,

    /// Exempt from income tax (e.g. LCI/LCA for individuals)
    #[arg(long)]
    pub tax_exempt: bool,

    /// Flat fees charged over the period
    #[arg(long, default_value = "0", value_parser = amount_arg)]
    pub fees: Decimal,

    /// SELIC annual % (overrides config)
    #[arg(long, value_parser = amount_arg)]
    pub selic: Option<Decimal>,

    /// CDI annual % (overrides config)
    #[arg(long, value_parser = amount_arg)]
    pub cdi: Option<Decimal>,

    /// IPCA annual % (overrides config)
    #[arg(long, value_parser = amount_arg)]
    pub ipca: Option<Decimal>,

    /// User id the snapshot belongs to
    #[arg(long)]
    pub owner: Option<String>,

    /// Store the snapshot in the database
    #[arg(long)]
    pub save: bool,
}

/// Exactly one way of stating the rate.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct RateArgs {
    /// Fixed annual rate in % (prefixado), e.g. 12.5
    #[arg(long, value_parser = amount_arg)]
    pub fixed: Option<Decimal>,

    /// Percentage of the CDI, e.g. 110
    #[arg(long, value_parser = amount_arg)]
    pub cdi_percent: Option<Decimal>,

    /// Annual spread over IPCA in %, e.g. 6
    #[arg(long, value_parser = amount_arg)]
    pub ipca_spread: Option<Decimal>,
}

impl RateArgs {
    pub fn to_basis(&self) -> Option<RateBasis> {
        match (self.fixed, self.cdi_percent, self.ipca_spread) {
            (Some(annual_rate), None, None) => Some(RateBasis::Fixed { annual_rate }),
            (None, Some(cdi_percent), None) => Some(RateBasis::CdiIndexed { cdi_percent }),
            (None, None, Some(spread)) => Some(RateBasis::IpcaIndexed { spread }),
            _ => None,
        }
    }
}

#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// List stored snapshots, newest first
    List {
        /// Only snapshots of this user
        #[arg(long)]
        owner: Option<String>,
    },

    /// Show a stored snapshot
    Show {
        /// Snapshot id
        id: String,
    },

    /// Delete a stored snapshot
    Delete {
        /// Snapshot id
        id: String,

        /// Only delete if the snapshot belongs to this user
        #[arg(long)]
        owner: Option<String>,
    },
}

fn amount_arg(s: &str) -> Result<Decimal, String> {
    utils::parse_amount(s).map_err(|e| e.to_string())
}

fn date_arg(s: &str) -> Result<NaiveDate, String> {
    utils::parse_date(s).map_err(|e| e.to_string())
}

fn kind_arg(s: &str) -> Result<InstrumentKind, String> {
    s.parse::<InstrumentKind>()
        .map_err(|_| format!("Unknown instrument kind '{}'", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn verify_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_evaluate_with_brazilian_notation() {
        let cli = Cli::try_parse_from([
            "rendimento",
            "evaluate",
            "--principal",
            "10.000,00",
            "--start",
            "01/01/2023",
            "--maturity",
            "2026-01-01",
            "--cdi-percent",
            "110",
            "--kind",
            "lci",
            "--tax-exempt",
        ])
        .expect("valid arguments");

        match cli.command {
            Commands::Evaluate(args) => {
                assert_eq!(args.principal, dec!(10000));
                assert_eq!(args.start, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
                assert_eq!(args.kind, InstrumentKind::Lci);
                assert!(args.tax_exempt);
                assert_eq!(
                    args.rate.to_basis(),
                    Some(RateBasis::CdiIndexed {
                        cdi_percent: dec!(110)
                    })
                );
            }
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn rate_options_are_mutually_exclusive_and_required() {
        let base = [
            "rendimento",
            "evaluate",
            "--principal",
            "1000",
            "--start",
            "2025-01-01",
            "--maturity",
            "2026-01-01",
        ];
        assert!(Cli::try_parse_from(base).is_err());

        let mut both = base.to_vec();
        both.extend(["--fixed", "12", "--ipca-spread", "6"]);
        assert!(Cli::try_parse_from(both).is_err());
    }
}
