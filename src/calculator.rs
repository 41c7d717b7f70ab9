//! Yield calculator for fixed-income investments.
//!
//! Computes gross value, IOF, income tax, fees and net value of an investment
//! at an evaluation date, plus period and annualized returns.
//!
//! Conventions:
//! - actual/365 compounding: `(1 + r)^(days / 365)`
//! - whole years use an exact integer power, only the remaining fraction of a
//!   year goes through `powd`, so long horizons do not accumulate drift
//! - money is rounded to cents per component and the net value is derived from
//!   the rounded components, so `net = gross - ir - iof - fees` holds exactly
//! - IOF is settled before income tax (configurable, see [`IncomeTaxBase`])

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::calendar::{self, DAYS_PER_YEAR};
use crate::config::{CalculatorConfig, IncomeTaxBase, NegativeNetPolicy};
use crate::error::CalcError;
use crate::models::{InvestmentTerms, MarketIndicators, RateBasis, YieldResult};
use crate::tax;

const MONEY_DP: u32 = 2;
const PERCENT_DP: u32 = 4;
const HUNDRED: Decimal = dec!(100);

/// Pure calculator; holds only the policy configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct YieldCalculator {
    config: CalculatorConfig,
}

impl YieldCalculator {
    pub fn new(config: CalculatorConfig) -> Self {
        Self { config }
    }

    /// Evaluate `terms` at `evaluated_on`. Past maturity, the position is
    /// valued at maturity.
    pub fn calculate(
        &self,
        terms: &InvestmentTerms,
        market: &MarketIndicators,
        evaluated_on: NaiveDate,
    ) -> Result<YieldResult, CalcError> {
        terms.validate()?;
        if evaluated_on < terms.start_date {
            return Err(CalcError::InvalidEvaluationDate {
                start: terms.start_date,
                evaluated_on,
            });
        }

        let horizon_end = evaluated_on.min(terms.maturity_date);
        let elapsed_days = calendar::elapsed_days(terms.start_date, horizon_end)?;

        let effective_rate = effective_annual_rate(&terms.rate, market)?;
        if effective_rate <= -HUNDRED {
            return Err(CalcError::InvalidTerms(format!(
                "effective annual rate {}% would wipe out the principal",
                effective_rate
            )));
        }

        let factor = compound_factor(effective_rate, elapsed_days)?;
        let gross_value = round_money(
            terms
                .principal
                .checked_mul(factor)
                .ok_or(CalcError::Overflow("gross value"))?,
        );
        let period_return_percent = round_percent(percent_change(factor, "period return")?);

        let gain = (gross_value - terms.principal).max(Decimal::ZERO);

        let iof_rate_percent = tax::iof_rate(elapsed_days);
        let iof_amount = round_money(percent_of(gain, iof_rate_percent, "IOF")?);

        let income_tax_rate_percent = tax::income_tax_rate(elapsed_days, terms.tax_exempt);
        let taxable_gain = match self.config.income_tax_base {
            IncomeTaxBase::NetOfIof => gain - iof_amount,
            IncomeTaxBase::GrossGain => gain,
        };
        let income_tax_amount = round_money(percent_of(
            taxable_gain,
            income_tax_rate_percent,
            "income tax",
        )?);

        let other_fees_amount = round_money(terms.other_fees);

        let mut net_value = gross_value - income_tax_amount - iof_amount - other_fees_amount;
        let mut net_value_clamped = false;
        if net_value < Decimal::ZERO && self.config.negative_net == NegativeNetPolicy::ClampToZero
        {
            net_value = Decimal::ZERO;
            net_value_clamped = true;
        }

        let (annualized_return_percent, annualized_available) = if elapsed_days == 0 {
            (Decimal::ZERO, false)
        } else {
            let exponent = Decimal::from(DAYS_PER_YEAR) / Decimal::from(elapsed_days);
            let annual_factor = pow_split(factor, exponent, "annualized return")?;
            (
                round_percent(percent_change(annual_factor, "annualized return")?),
                true,
            )
        };

        Ok(YieldResult {
            evaluated_on,
            elapsed_days,
            effective_rate_percent: round_percent(effective_rate),
            income_tax_rate_percent,
            iof_rate_percent,
            gross_value,
            income_tax_amount,
            iof_amount,
            other_fees_amount,
            net_value,
            period_return_percent,
            annualized_return_percent,
            annualized_available,
            net_value_clamped,
        })
    }
}

/// Annual rate in percent actually earned by the instrument.
///
/// - fixed: the nominal rate
/// - CDI-indexed: `CDI * cdi_percent / 100`
/// - IPCA-indexed: `IPCA + spread` (additive)
pub fn effective_annual_rate(
    rate: &RateBasis,
    market: &MarketIndicators,
) -> Result<Decimal, CalcError> {
    match *rate {
        RateBasis::Fixed { annual_rate } => Ok(annual_rate),
        RateBasis::CdiIndexed { cdi_percent } => {
            percent_of(market.cdi, cdi_percent, "effective rate")
        }
        RateBasis::IpcaIndexed { spread } => market
            .ipca
            .checked_add(spread)
            .ok_or(CalcError::Overflow("effective rate")),
    }
}

/// Growth factor `(1 + rate/100)^(days/365)`.
pub fn compound_factor(annual_rate_percent: Decimal, days: i64) -> Result<Decimal, CalcError> {
    if days < 0 {
        return Err(CalcError::InvalidTerms(format!(
            "cannot compound over a negative period of {} days",
            days
        )));
    }
    let base = Decimal::ONE + annual_rate_percent / HUNDRED;
    let whole_years = days / DAYS_PER_YEAR;
    let remaining_days = days % DAYS_PER_YEAR;

    let mut factor = base
        .checked_powu(whole_years as u64)
        .ok_or(CalcError::Overflow("compound factor"))?;
    if remaining_days > 0 {
        let fraction = Decimal::from(remaining_days) / Decimal::from(DAYS_PER_YEAR);
        let partial = base
            .checked_powd(fraction)
            .ok_or(CalcError::Overflow("compound factor"))?;
        factor = factor
            .checked_mul(partial)
            .ok_or(CalcError::Overflow("compound factor"))?;
    }
    Ok(factor)
}

/// `base^exponent` for a non-negative exponent: integer part exact, fraction
/// through `powd`.
fn pow_split(base: Decimal, exponent: Decimal, what: &'static str) -> Result<Decimal, CalcError> {
    let whole = exponent.trunc();
    let fraction = exponent - whole;
    let whole = whole.to_u64().ok_or(CalcError::Overflow(what))?;

    let mut result = base.checked_powu(whole).ok_or(CalcError::Overflow(what))?;
    if !fraction.is_zero() {
        let partial = base.checked_powd(fraction).ok_or(CalcError::Overflow(what))?;
        result = result.checked_mul(partial).ok_or(CalcError::Overflow(what))?;
    }
    Ok(result)
}

/// `amount * rate_percent / 100`
fn percent_of(
    amount: Decimal,
    rate_percent: Decimal,
    what: &'static str,
) -> Result<Decimal, CalcError> {
    amount
        .checked_mul(rate_percent)
        .and_then(|v| v.checked_div(HUNDRED))
        .ok_or(CalcError::Overflow(what))
}

/// `(factor - 1) * 100`
fn percent_change(factor: Decimal, what: &'static str) -> Result<Decimal, CalcError> {
    (factor - Decimal::ONE)
        .checked_mul(HUNDRED)
        .ok_or(CalcError::Overflow(what))
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

fn round_percent(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PERCENT_DP, RoundingStrategy::MidpointAwayFromZero)
}
