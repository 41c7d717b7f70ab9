//! Command dispatcher: turns parsed CLI commands into calls to the
//! calculator, the snapshot builder and the snapshot store.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use colored::Colorize;
use tracing::info;

use crate::calculator::YieldCalculator;
use crate::cli::formatters;
use crate::cli::{Cli, Commands, EvaluateArgs, SnapshotCommands};
use crate::config::Config;
use crate::db;
use crate::error::RendimentoError;
use crate::models::InvestmentTerms;
use crate::snapshot::{DashboardSnapshot, SnapshotBuilder};

/// Route a parsed command to its handler
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let json_output = cli.json;

    match cli.command {
        Commands::Evaluate(args) => dispatch_evaluate(&args, &config, json_output),
        Commands::Snapshots { action } => dispatch_snapshots(action, json_output),
        Commands::Tables => {
            print!("{}", formatters::format_tax_tables(json_output));
            if json_output {
                println!();
            }
            Ok(())
        }
    }
}

/// Validate CLI input into terms and market indicators, then evaluate.
pub fn evaluate(args: &EvaluateArgs, config: &Config) -> Result<DashboardSnapshot> {
    let rate = args.rate.to_basis().ok_or_else(|| {
        anyhow!("Specify exactly one of --fixed, --cdi-percent or --ipca-spread")
    })?;

    let terms = InvestmentTerms {
        issuer: args.issuer.trim().to_string(),
        instrument: args.kind,
        principal: args.principal,
        start_date: args.start,
        maturity_date: args.maturity,
        rate,
        liquidity_class: args.liquidity,
        risk_class: args.risk,
        fgc_guaranteed: args.fgc,
        tax_exempt: args.tax_exempt,
        other_fees: args.fees,
    };
    let market = config.market.resolve(args.selic, args.cdi, args.ipca)?;
    let evaluated_on = args.as_of.unwrap_or_else(|| Local::now().date_naive());

    info!(
        "Evaluating {} {} ({}) on {}",
        terms.instrument.as_str(),
        terms.issuer,
        terms.rate.describe(),
        evaluated_on
    );

    let result = YieldCalculator::new(config.calculator)
        .calculate(&terms, &market, evaluated_on)
        .context("Failed to evaluate investment")?;

    Ok(SnapshotBuilder::new(config.alerts).build(
        args.owner.as_deref(),
        &terms,
        &market,
        result,
    ))
}

fn dispatch_evaluate(args: &EvaluateArgs, config: &Config, json_output: bool) -> Result<()> {
    let snapshot = evaluate(args, config)?;

    if args.save {
        db::init_database(None)?;
        let conn = db::open_db(None)?;
        let is_new = db::save_snapshot(&conn, &snapshot)?;
        info!("Snapshot {} stored (new: {})", snapshot.id, is_new);

        if !json_output {
            let note = if is_new { "saved" } else { "already saved" };
            println!("{} Snapshot {} {}", "✓".green().bold(), snapshot.id, note);
        }
    }

    if json_output {
        println!("{}", formatters::format_snapshot_json(&snapshot));
    } else {
        print!("{}", formatters::format_snapshot_table(&snapshot));
    }
    Ok(())
}

fn dispatch_snapshots(action: SnapshotCommands, json_output: bool) -> Result<()> {
    db::init_database(None)?;
    let conn = db::open_db(None)?;

    match action {
        SnapshotCommands::List { owner } => {
            let summaries = db::list_snapshots(&conn, owner.as_deref())?;
            if json_output {
                println!("{}", formatters::format_snapshot_list_json(&summaries));
            } else {
                print!("{}", formatters::format_snapshot_list_table(&summaries));
            }
        }
        SnapshotCommands::Show { id } => {
            let snapshot =
                db::get_snapshot(&conn, &id)?.ok_or(RendimentoError::SnapshotNotFound(id))?;
            if json_output {
                println!("{}", formatters::format_snapshot_json(&snapshot));
            } else {
                print!("{}", formatters::format_snapshot_table(&snapshot));
            }
        }
        SnapshotCommands::Delete { id, owner } => {
            if !db::delete_snapshot(&conn, &id, owner.as_deref())? {
                return Err(RendimentoError::SnapshotNotFound(id).into());
            }
            if json_output {
                println!("{}", serde_json::json!({ "deleted": id }));
            } else {
                println!("{} Snapshot {} deleted", "✓".green().bold(), id);
            }
        }
    }
    Ok(())
}
