//! Dashboard snapshots
//!
//! A snapshot freezes one evaluation: the terms, a copy of the market
//! indicators at the time, the yield result and the derived alerts. Snapshots
//! are never updated; evaluating again produces a new one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendar;
use crate::config::AlertConfig;
use crate::models::{InvestmentTerms, MarketIndicators, YieldResult};

const SNAPSHOT_ID_LEN: usize = 32;

/// Warnings attached to a snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    HighRisk,
    ApproachingMaturityLowLiquidity,
    CapitalLoss,
    Matured,
    NoFgcCoverage,
}

impl Alert {
    pub fn message(&self) -> &'static str {
        match self {
            Alert::HighRisk => "high risk: issuer or instrument rated 4 or above",
            Alert::ApproachingMaturityLowLiquidity => {
                "approaching maturity, low liquidity: plan the redemption"
            }
            Alert::CapitalLoss => "capital loss: net value is below the amount invested",
            Alert::Matured => "matured: the investment reached its maturity date",
            Alert::NoFgcCoverage => "not covered by the FGC deposit guarantee",
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardSnapshot {
    pub id: String,
    /// User id supplied by the authentication layer, if any
    pub owner: Option<String>,
    pub terms: InvestmentTerms,
    pub market: MarketIndicators,
    pub result: YieldResult,
    pub alerts: Vec<Alert>,
}

impl DashboardSnapshot {
    pub fn gain(&self) -> Decimal {
        self.result.net_value - self.terms.principal
    }
}

/// Assembles snapshots. Pure: no clock, no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotBuilder {
    alerts: AlertConfig,
}

impl SnapshotBuilder {
    pub fn new(alerts: AlertConfig) -> Self {
        Self { alerts }
    }

    pub fn build(
        &self,
        owner: Option<&str>,
        terms: &InvestmentTerms,
        market: &MarketIndicators,
        result: YieldResult,
    ) -> DashboardSnapshot {
        let alerts = self.derive_alerts(terms, &result);
        DashboardSnapshot {
            id: snapshot_id(owner, terms, market, &result, &alerts),
            owner: owner.map(str::to_string),
            terms: terms.clone(),
            market: *market,
            result,
            alerts,
        }
    }

    /// Fixed rules, emitted in a fixed order.
    pub fn derive_alerts(&self, terms: &InvestmentTerms, result: &YieldResult) -> Vec<Alert> {
        let mut alerts = Vec::new();
        let matured = calendar::is_matured(terms.maturity_date, result.evaluated_on);

        if terms.risk_class >= self.alerts.high_risk_threshold {
            alerts.push(Alert::HighRisk);
        }

        if terms.liquidity_class >= self.alerts.low_liquidity_threshold && !matured {
            let remaining = calendar::days_to_maturity(terms.maturity_date, result.evaluated_on);
            if remaining <= self.alerts.maturity_window_days {
                alerts.push(Alert::ApproachingMaturityLowLiquidity);
            }
        }

        if result.net_value < terms.principal {
            alerts.push(Alert::CapitalLoss);
        }

        if matured {
            alerts.push(Alert::Matured);
        }

        if !terms.fgc_guaranteed {
            alerts.push(Alert::NoFgcCoverage);
        }

        alerts
    }
}

/// Content-derived id: the same evaluation always maps to the same id.
/// Result figures and alerts are part of the content, so a different
/// calculation policy or alert threshold yields a different snapshot.
fn snapshot_id(
    owner: Option<&str>,
    terms: &InvestmentTerms,
    market: &MarketIndicators,
    result: &YieldResult,
    alerts: &[Alert],
) -> String {
    let mut fields = vec![
        owner.unwrap_or("").to_string(),
        terms.issuer.clone(),
        terms.instrument.as_str().to_string(),
        terms.principal.normalize().to_string(),
        terms.start_date.to_string(),
        terms.maturity_date.to_string(),
        terms.rate.as_str().to_string(),
        terms.rate.contractual_rate().normalize().to_string(),
        terms.liquidity_class.to_string(),
        terms.risk_class.to_string(),
        terms.fgc_guaranteed.to_string(),
        terms.tax_exempt.to_string(),
        terms.other_fees.normalize().to_string(),
        market.selic.normalize().to_string(),
        market.cdi.normalize().to_string(),
        market.ipca.normalize().to_string(),
        result.evaluated_on.to_string(),
        result.elapsed_days.to_string(),
        result.gross_value.normalize().to_string(),
        result.iof_amount.normalize().to_string(),
        result.income_tax_amount.normalize().to_string(),
        result.other_fees_amount.normalize().to_string(),
        result.net_value.normalize().to_string(),
        result.annualized_return_percent.normalize().to_string(),
        result.net_value_clamped.to_string(),
    ];
    fields.extend(alerts.iter().map(|alert| format!("{:?}", alert)));

    let mut hasher = blake3::Hasher::new();
    for field in &fields {
        hasher.update(field.as_bytes());
        hasher.update(b"\x1f");
    }
    let hex = hasher.finalize().to_hex();
    hex[..SNAPSHOT_ID_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::YieldCalculator;
    use crate::models::{InstrumentKind, RateBasis};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn market() -> MarketIndicators {
        MarketIndicators {
            selic: dec!(10.50),
            cdi: dec!(10.40),
            ipca: dec!(4.50),
        }
    }

    fn lci() -> InvestmentTerms {
        InvestmentTerms {
            issuer: "Banco do Brasil".to_string(),
            instrument: InstrumentKind::Lci,
            principal: dec!(5000),
            start_date: date(2025, 1, 10),
            maturity_date: date(2026, 1, 10),
            rate: RateBasis::CdiIndexed {
                cdi_percent: dec!(95),
            },
            liquidity_class: 5,
            risk_class: 1,
            fgc_guaranteed: true,
            tax_exempt: true,
            other_fees: Decimal::ZERO,
        }
    }

    fn evaluate(terms: &InvestmentTerms, on: NaiveDate) -> YieldResult {
        YieldCalculator::default()
            .calculate(terms, &market(), on)
            .unwrap()
    }

    #[test]
    fn test_healthy_investment_has_no_alerts() {
        let terms = lci();
        let result = evaluate(&terms, date(2025, 6, 1));
        let snapshot = SnapshotBuilder::default().build(Some("user-1"), &terms, &market(), result);

        assert!(snapshot.alerts.is_empty());
        assert_eq!(snapshot.owner.as_deref(), Some("user-1"));
        assert_eq!(snapshot.market, market());
        assert_eq!(snapshot.id.len(), 32);
    }

    #[test]
    fn test_low_liquidity_near_maturity() {
        let terms = lci();
        let builder = SnapshotBuilder::default();

        let just_outside = evaluate(&terms, date(2025, 12, 10)); // 31 days left
        assert!(builder.derive_alerts(&terms, &just_outside).is_empty());

        let inside = evaluate(&terms, date(2025, 12, 11)); // 30 days left
        assert_eq!(
            builder.derive_alerts(&terms, &inside),
            vec![Alert::ApproachingMaturityLowLiquidity]
        );
    }

    #[test]
    fn test_maturity_window_is_configurable() {
        let terms = lci();
        let builder = SnapshotBuilder::new(AlertConfig {
            maturity_window_days: 60,
            ..AlertConfig::default()
        });
        let result = evaluate(&terms, date(2025, 11, 20)); // 51 days left
        assert_eq!(
            builder.derive_alerts(&terms, &result),
            vec![Alert::ApproachingMaturityLowLiquidity]
        );
    }

    #[test]
    fn test_matured_replaces_approaching_alert() {
        let terms = lci();
        let result = evaluate(&terms, date(2026, 2, 1));
        assert_eq!(
            SnapshotBuilder::default().derive_alerts(&terms, &result),
            vec![Alert::Matured]
        );
    }

    #[test]
    fn test_risk_fees_and_fgc_rules_in_order() {
        let mut terms = lci();
        terms.risk_class = 4;
        terms.liquidity_class = 1;
        terms.fgc_guaranteed = false;
        terms.other_fees = dec!(1000);
        let result = evaluate(&terms, date(2025, 6, 1));

        assert_eq!(
            SnapshotBuilder::default().derive_alerts(&terms, &result),
            vec![Alert::HighRisk, Alert::CapitalLoss, Alert::NoFgcCoverage]
        );
    }

    #[test]
    fn test_identical_inputs_give_identical_snapshots() {
        let terms = lci();
        let builder = SnapshotBuilder::default();
        let first = builder.build(None, &terms, &market(), evaluate(&terms, date(2025, 6, 1)));
        let second = builder.build(None, &terms, &market(), evaluate(&terms, date(2025, 6, 1)));
        assert_eq!(first, second);

        let other_day = builder.build(None, &terms, &market(), evaluate(&terms, date(2025, 6, 2)));
        assert_ne!(first.id, other_day.id);

        let other_owner =
            builder.build(Some("someone"), &terms, &market(), evaluate(&terms, date(2025, 6, 1)));
        assert_ne!(first.id, other_owner.id);
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let terms = lci();
        let snapshot =
            SnapshotBuilder::default().build(None, &terms, &market(), evaluate(&terms, date(2025, 6, 1)));
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: DashboardSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_alert_messages() {
        assert!(Alert::HighRisk.to_string().starts_with("high risk"));
        assert!(Alert::ApproachingMaturityLowLiquidity
            .to_string()
            .starts_with("approaching maturity, low liquidity"));
        assert!(Alert::CapitalLoss.to_string().starts_with("capital loss"));
    }

    #[test]
    fn test_policy_change_gives_a_new_snapshot() {
        use crate::config::{CalculatorConfig, IncomeTaxBase};

        let mut terms = lci();
        terms.tax_exempt = false;
        terms.rate = RateBasis::Fixed {
            annual_rate: dec!(12),
        };
        let on = date(2025, 1, 20);

        let net_of_iof = YieldCalculator::default()
            .calculate(&terms, &market(), on)
            .unwrap();
        let gross_gain = YieldCalculator::new(CalculatorConfig {
            income_tax_base: IncomeTaxBase::GrossGain,
            ..CalculatorConfig::default()
        })
        .calculate(&terms, &market(), on)
        .unwrap();
        assert_ne!(net_of_iof.net_value, gross_gain.net_value);

        let builder = SnapshotBuilder::default();
        let a = builder.build(None, &terms, &market(), net_of_iof);
        let b = builder.build(None, &terms, &market(), gross_gain);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_alert_threshold_change_gives_a_new_snapshot() {
        let terms = lci();
        let on = date(2025, 11, 20); // 51 days left
        let default_window =
            SnapshotBuilder::default().build(None, &terms, &market(), evaluate(&terms, on));
        let wide_window = SnapshotBuilder::new(AlertConfig {
            maturity_window_days: 60,
            ..AlertConfig::default()
        })
        .build(None, &terms, &market(), evaluate(&terms, on));

        assert!(default_window.alerts.is_empty());
        assert_eq!(wide_window.alerts, vec![Alert::ApproachingMaturityLowLiquidity]);
        assert_ne!(default_window.id, wide_window.id);
    }
}
