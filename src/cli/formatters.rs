//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::db::SnapshotSummary;
use crate::snapshot::DashboardSnapshot;
use crate::tax::{iof_table, INCOME_TAX_BRACKETS, IOF_FREE_AFTER_DAYS};
use crate::utils::{format_currency, format_percent};

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a snapshot for JSON output
pub fn format_snapshot_json(snapshot: &DashboardSnapshot) -> String {
    to_json(snapshot)
}

fn signed_currency(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format_currency(value).green().to_string()
    } else {
        format_currency(value).red().to_string()
    }
}

fn signed_percent(value: Decimal) -> String {
    if value >= Decimal::ZERO {
        format_percent(value).green().to_string()
    } else {
        format_percent(value).red().to_string()
    }
}

/// Format a snapshot as a dashboard for the terminal
pub fn format_snapshot_table(snapshot: &DashboardSnapshot) -> String {
    let terms = &snapshot.terms;
    let result = &snapshot.result;
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} {} - {} ({})\n",
        "📈".cyan().bold(),
        terms.issuer.bold(),
        terms.instrument.display_name(),
        terms.rate.describe()
    ));
    output.push_str(&format!(
        "   Snapshot {}  |  {} → {}  |  evaluated on {}\n\n",
        snapshot.id.bright_black(),
        terms.start_date.format("%d/%m/%Y"),
        terms.maturity_date.format("%d/%m/%Y"),
        result.evaluated_on.format("%d/%m/%Y")
    ));

    #[derive(Tabled)]
    struct MetricRow {
        #[tabled(rename = "Metric")]
        metric: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let row = |metric: &str, value: String| MetricRow {
        metric: metric.to_string(),
        value,
    };

    let annualized = if result.annualized_available {
        signed_percent(result.annualized_return_percent)
    } else {
        "N/A".to_string()
    };

    let rows = vec![
        row("Principal", format_currency(terms.principal)),
        row("Elapsed days", result.elapsed_days.to_string()),
        row("Effective rate (a.a.)", format_percent(result.effective_rate_percent)),
        row("Gross value", format_currency(result.gross_value)),
        row("Gross gain", signed_currency(result.gross_gain(terms.principal))),
        row(
            &format!("IOF ({})", format_percent(result.iof_rate_percent)),
            format_currency(result.iof_amount),
        ),
        row(
            &format!("IR ({})", format_percent(result.income_tax_rate_percent)),
            format_currency(result.income_tax_amount),
        ),
        row("Other fees", format_currency(result.other_fees_amount)),
        row("Total deductions", format_currency(result.total_deductions())),
        row("Net value", format_currency(result.net_value).bold().to_string()),
        row("Net gain", signed_currency(snapshot.gain())),
        row("Period return", signed_percent(result.period_return_percent)),
        row("Annualized return", annualized),
    ];

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');

    output.push_str(&format!(
        "\n{:<14} SELIC {}  CDI {}  IPCA {}\n",
        "Market:".bold(),
        format_percent(snapshot.market.selic),
        format_percent(snapshot.market.cdi),
        format_percent(snapshot.market.ipca)
    ));
    output.push_str(&format!(
        "{:<14} liquidity {}/5, risk {}/5, FGC {}, IR {}\n",
        "Profile:".bold(),
        terms.liquidity_class,
        terms.risk_class,
        if terms.fgc_guaranteed { "yes" } else { "no" },
        if terms.tax_exempt { "exempt" } else { "due" }
    ));
    if result.net_value_clamped {
        output.push_str(&format!(
            "{:<14} net value clamped to zero\n",
            "Note:".bold()
        ));
    }

    if snapshot.alerts.is_empty() {
        output.push_str(&format!("\n{} No alerts\n", "✓".green().bold()));
    } else {
        output.push_str(&format!("\n{} Alerts\n", "⚠".yellow().bold()));
        for alert in &snapshot.alerts {
            output.push_str(&format!("  - {}\n", alert.to_string().yellow()));
        }
    }

    output
}

/// Format stored snapshot listing for JSON output
pub fn format_snapshot_list_json(summaries: &[SnapshotSummary]) -> String {
    #[derive(Serialize)]
    struct JsonSummary<'a> {
        id: &'a str,
        owner: Option<&'a str>,
        issuer: &'a str,
        instrument: &'a str,
        rate_type: &'a str,
        principal: String,
        net_value: String,
        evaluated_on: String,
    }

    let items: Vec<JsonSummary> = summaries
        .iter()
        .map(|s| JsonSummary {
            id: &s.id,
            owner: s.owner.as_deref(),
            issuer: &s.issuer,
            instrument: &s.instrument,
            rate_type: &s.rate_type,
            principal: s.principal.to_string(),
            net_value: s.net_value.to_string(),
            evaluated_on: s.evaluated_on.to_string(),
        })
        .collect();

    to_json(&items)
}

/// Format stored snapshot listing for the terminal
pub fn format_snapshot_list_table(summaries: &[SnapshotSummary]) -> String {
    if summaries.is_empty() {
        return format!(
            "{} No snapshots found\nCreate one with: {} evaluate ... --save\n",
            "ℹ".blue().bold(),
            "rendimento".bold()
        );
    }

    #[derive(Tabled)]
    struct SnapshotRow {
        #[tabled(rename = "Id")]
        id: String,
        #[tabled(rename = "Owner")]
        owner: String,
        #[tabled(rename = "Issuer")]
        issuer: String,
        #[tabled(rename = "Type")]
        instrument: String,
        #[tabled(rename = "Rate")]
        rate_type: String,
        #[tabled(rename = "Evaluated")]
        evaluated_on: String,
        #[tabled(rename = "Principal")]
        principal: String,
        #[tabled(rename = "Net Value")]
        net_value: String,
    }

    let rows: Vec<SnapshotRow> = summaries
        .iter()
        .map(|s| SnapshotRow {
            id: s.id.clone(),
            owner: s.owner.clone().unwrap_or_else(|| "-".to_string()),
            issuer: s.issuer.clone(),
            instrument: s.instrument.clone(),
            rate_type: s.rate_type.clone(),
            evaluated_on: s.evaluated_on.format("%d/%m/%Y").to_string(),
            principal: format_currency(s.principal),
            net_value: format_currency(s.net_value),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    // Right-align money columns
    table.modify(Columns::new(6..), Alignment::right());
    format!("{}\n", table)
}

/// Format the IR bracket and IOF tables
pub fn format_tax_tables(json: bool) -> String {
    if json {
        #[derive(Serialize)]
        struct IofDay {
            day: usize,
            rate_percent: Decimal,
        }
        #[derive(Serialize)]
        struct Tables {
            income_tax: &'static [crate::tax::TaxBracket],
            iof: Vec<IofDay>,
            iof_free_after_days: i64,
        }

        let iof = iof_table()
            .iter()
            .enumerate()
            .map(|(day, rate)| IofDay {
                day,
                rate_percent: *rate,
            })
            .collect();
        return to_json(&Tables {
            income_tax: &INCOME_TAX_BRACKETS,
            iof,
            iof_free_after_days: IOF_FREE_AFTER_DAYS,
        });
    }

    #[derive(Tabled)]
    struct BracketRow {
        #[tabled(rename = "Holding period")]
        period: String,
        #[tabled(rename = "IR")]
        rate: String,
    }

    let brackets: Vec<BracketRow> = INCOME_TAX_BRACKETS
        .iter()
        .map(|b| BracketRow {
            period: match b.max_days {
                Some(max) => format!("{} to {} days", b.min_days, max),
                None => format!("over {} days", b.min_days - 1),
            },
            rate: format_percent(b.rate_percent),
        })
        .collect();

    #[derive(Tabled)]
    struct IofRow {
        #[tabled(rename = "Days")]
        days: String,
        #[tabled(rename = "IOF")]
        rate: String,
    }

    let iof_rows: Vec<IofRow> = iof_table()
        .iter()
        .enumerate()
        .skip(1)
        .map(|(day, rate)| IofRow {
            days: day.to_string(),
            rate: format_percent(*rate),
        })
        .collect();

    let mut ir_table = Table::new(&brackets);
    ir_table.with(Style::modern());
    ir_table.modify(Columns::new(1..), Alignment::right());

    let mut iof_table_out = Table::new(&iof_rows);
    iof_table_out.with(Style::modern());
    iof_table_out.modify(Columns::new(..), Alignment::right());

    format!(
        "\n{} Income tax (regressive)\n{}\n\n{} IOF on redemptions\n{}\n  0% from day {} on\n",
        "🧾".cyan().bold(),
        ir_table,
        "🧾".cyan().bold(),
        iof_table_out,
        IOF_FREE_AFTER_DAYS
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_year_snapshot() -> DashboardSnapshot {
        use crate::calculator::YieldCalculator;
        use crate::models::{InstrumentKind, InvestmentTerms, MarketIndicators, RateBasis};
        use crate::snapshot::SnapshotBuilder;
        use chrono::NaiveDate;
        use rust_decimal_macros::dec;

        let terms = InvestmentTerms {
            issuer: "Banco Inter".to_string(),
            instrument: InstrumentKind::Cdb,
            principal: dec!(10000),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            maturity_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            rate: RateBasis::Fixed {
                annual_rate: dec!(12),
            },
            liquidity_class: 1,
            risk_class: 1,
            fgc_guaranteed: true,
            tax_exempt: false,
            other_fees: dec!(15),
        };
        let market = MarketIndicators {
            selic: dec!(10.5),
            cdi: dec!(10),
            ipca: dec!(4.5),
        };
        let result = YieldCalculator::default()
            .calculate(&terms, &market, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .unwrap();
        SnapshotBuilder::default().build(None, &terms, &market, result)
    }

    #[test]
    fn test_dashboard_shows_gain_and_deductions() {
        colored::control::set_override(false);
        let text = format_snapshot_table(&one_year_snapshot());
        assert!(text.contains("Banco Inter"));
        assert!(text.contains("Gross gain"));
        assert!(text.contains("R$ 1.200,00"));
        // IR 210,00 + fees 15,00
        assert!(text.contains("Total deductions"));
        assert!(text.contains("R$ 225,00"));
        assert!(text.contains("R$ 10.975,00"));
    }

    #[test]
    fn test_empty_snapshot_list_message() {
        let msg = format_snapshot_list_table(&[]);
        assert!(msg.contains("No snapshots found"));
        assert!(msg.contains("evaluate"));
    }

    #[test]
    fn test_tax_tables_list_every_bracket() {
        colored::control::set_override(false);
        let text = format_tax_tables(false);
        assert!(text.contains("0 to 180 days"));
        assert!(text.contains("over 720 days"));
        assert!(text.contains("22,5%"));
        assert!(text.contains("96%"));
    }

    #[test]
    fn test_tax_tables_json() {
        let value: serde_json::Value = serde_json::from_str(&format_tax_tables(true)).unwrap();
        assert_eq!(value["income_tax"].as_array().unwrap().len(), 4);
        assert_eq!(value["iof"].as_array().unwrap().len(), 30);
        assert_eq!(value["iof"][1]["rate_percent"], "96");
        assert_eq!(value["iof_free_after_days"], 30);
    }
}
