use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CalcError;

/// Fixed-income instrument kinds. Display metadata only: tax exemption is
/// carried separately by [`InvestmentTerms::tax_exempt`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstrumentKind {
    Cdb,              // Certificado de Depósito Bancário
    Lci,              // Letra de Crédito Imobiliário
    Lca,              // Letra de Crédito do Agronegócio
    Cri,              // Certificado de Recebíveis Imobiliários
    Cra,              // Certificado de Recebíveis do Agronegócio
    Debenture,        // Corporate debenture
    TesouroSelic,     // Tesouro Selic
    TesouroPrefixado, // Tesouro Prefixado
    TesouroIpca,      // Tesouro IPCA+
    Fund,             // Fixed-income fund
    Other,
}

impl InstrumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentKind::Cdb => "CDB",
            InstrumentKind::Lci => "LCI",
            InstrumentKind::Lca => "LCA",
            InstrumentKind::Cri => "CRI",
            InstrumentKind::Cra => "CRA",
            InstrumentKind::Debenture => "DEBENTURE",
            InstrumentKind::TesouroSelic => "TESOURO_SELIC",
            InstrumentKind::TesouroPrefixado => "TESOURO_PREFIXADO",
            InstrumentKind::TesouroIpca => "TESOURO_IPCA",
            InstrumentKind::Fund => "FUND",
            InstrumentKind::Other => "OTHER",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            InstrumentKind::Cdb => "CDB",
            InstrumentKind::Lci => "LCI",
            InstrumentKind::Lca => "LCA",
            InstrumentKind::Cri => "CRI",
            InstrumentKind::Cra => "CRA",
            InstrumentKind::Debenture => "Debênture",
            InstrumentKind::TesouroSelic => "Tesouro Selic",
            InstrumentKind::TesouroPrefixado => "Tesouro Prefixado",
            InstrumentKind::TesouroIpca => "Tesouro IPCA+",
            InstrumentKind::Fund => "Fundo",
            InstrumentKind::Other => "Outro",
        }
    }
}

impl FromStr for InstrumentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "CDB" => Ok(InstrumentKind::Cdb),
            "LCI" => Ok(InstrumentKind::Lci),
            "LCA" => Ok(InstrumentKind::Lca),
            "CRI" => Ok(InstrumentKind::Cri),
            "CRA" => Ok(InstrumentKind::Cra),
            "DEBENTURE" | "DEBENTURES" => Ok(InstrumentKind::Debenture),
            "TESOURO_SELIC" | "SELIC" => Ok(InstrumentKind::TesouroSelic),
            "TESOURO_PREFIXADO" | "PREFIXADO" => Ok(InstrumentKind::TesouroPrefixado),
            "TESOURO_IPCA" | "TESOURO_IPCA+" | "IPCA" => Ok(InstrumentKind::TesouroIpca),
            "FUND" | "FUNDO" => Ok(InstrumentKind::Fund),
            "OTHER" | "OUTRO" => Ok(InstrumentKind::Other),
            _ => Err(()),
        }
    }
}

/// How the annual rate of an instrument is defined.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "rate_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateBasis {
    /// Nominal annual rate in percent (prefixado)
    Fixed { annual_rate: Decimal },
    /// Percentage of the CDI (e.g. 110 = 110% do CDI)
    CdiIndexed { cdi_percent: Decimal },
    /// IPCA plus an annual spread in percent
    IpcaIndexed { spread: Decimal },
}

impl RateBasis {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateBasis::Fixed { .. } => "FIXED",
            RateBasis::CdiIndexed { .. } => "CDI_INDEXED",
            RateBasis::IpcaIndexed { .. } => "IPCA_INDEXED",
        }
    }

    /// The contractual figure: nominal rate, CDI percentage or IPCA spread.
    pub fn contractual_rate(&self) -> Decimal {
        match *self {
            RateBasis::Fixed { annual_rate } => annual_rate,
            RateBasis::CdiIndexed { cdi_percent } => cdi_percent,
            RateBasis::IpcaIndexed { spread } => spread,
        }
    }

    /// Human-readable description, e.g. "110% do CDI" or "IPCA + 6%".
    pub fn describe(&self) -> String {
        match *self {
            RateBasis::Fixed { annual_rate } => format!("{}% a.a.", annual_rate.normalize()),
            RateBasis::CdiIndexed { cdi_percent } => format!("{}% do CDI", cdi_percent.normalize()),
            RateBasis::IpcaIndexed { spread } => format!("IPCA + {}% a.a.", spread.normalize()),
        }
    }
}

/// Contract terms of a single investment. Immutable input of the calculator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvestmentTerms {
    pub issuer: String,
    pub instrument: InstrumentKind,
    pub principal: Decimal,
    pub start_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub rate: RateBasis,
    pub liquidity_class: u8, // 1 (daily) ..= 5 (locked until maturity)
    pub risk_class: u8,      // 1 (sovereign) ..= 5 (speculative)
    pub fgc_guaranteed: bool,
    pub tax_exempt: bool, // LCI/LCA and similar; supplied by the caller
    #[serde(default)]
    pub other_fees: Decimal,
}

pub const CLASS_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

impl InvestmentTerms {
    /// Check the terms are internally consistent.
    pub fn validate(&self) -> Result<(), CalcError> {
        if self.principal <= Decimal::ZERO {
            return Err(CalcError::InvalidTerms(format!(
                "principal must be positive, got {}",
                self.principal
            )));
        }
        if self.rate.contractual_rate() <= Decimal::ZERO {
            return Err(CalcError::InvalidTerms(format!(
                "{} rate must be positive, got {}",
                self.rate.as_str(),
                self.rate.contractual_rate()
            )));
        }
        if self.maturity_date <= self.start_date {
            return Err(CalcError::InvalidTerms(format!(
                "maturity {} must be after start {}",
                self.maturity_date, self.start_date
            )));
        }
        if !CLASS_RANGE.contains(&self.liquidity_class) {
            return Err(CalcError::InvalidTerms(format!(
                "liquidity class must be between 1 and 5, got {}",
                self.liquidity_class
            )));
        }
        if !CLASS_RANGE.contains(&self.risk_class) {
            return Err(CalcError::InvalidTerms(format!(
                "risk class must be between 1 and 5, got {}",
                self.risk_class
            )));
        }
        if self.other_fees < Decimal::ZERO {
            return Err(CalcError::InvalidTerms(format!(
                "fees cannot be negative, got {}",
                self.other_fees
            )));
        }
        Ok(())
    }
}

/// Market benchmarks supplied by the caller, annual percentages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarketIndicators {
    pub selic: Decimal,
    pub cdi: Decimal,
    pub ipca: Decimal,
}

/// Outcome of one evaluation. Produced once per snapshot, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct YieldResult {
    pub evaluated_on: NaiveDate,
    pub elapsed_days: i64,
    pub effective_rate_percent: Decimal,
    pub income_tax_rate_percent: Decimal,
    pub iof_rate_percent: Decimal,
    pub gross_value: Decimal,
    pub income_tax_amount: Decimal,
    pub iof_amount: Decimal,
    pub other_fees_amount: Decimal,
    pub net_value: Decimal,
    pub period_return_percent: Decimal,
    pub annualized_return_percent: Decimal,
    /// False on day zero, where annualizing is undefined and reported as 0.
    pub annualized_available: bool,
    /// Set when a negative net value was clamped to zero by policy.
    pub net_value_clamped: bool,
}

impl YieldResult {
    /// Gain before taxes and fees.
    pub fn gross_gain(&self, principal: Decimal) -> Decimal {
        self.gross_value - principal
    }

    /// Sum of every deduction applied to the gross value.
    pub fn total_deductions(&self) -> Decimal {
        self.income_tax_amount + self.iof_amount + self.other_fees_amount
    }
}
