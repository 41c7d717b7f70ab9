use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// One row of the regressive income-tax schedule (tabela regressiva do IR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxBracket {
    pub min_days: i64,
    /// Inclusive upper bound; `None` for the open-ended last bracket
    pub max_days: Option<i64>,
    pub rate_percent: Decimal,
}

impl TaxBracket {
    pub fn contains(&self, days: i64) -> bool {
        days >= self.min_days && self.max_days.map_or(true, |max| days <= max)
    }
}

/// Fixed-income IR brackets, ascending by `min_days`.
pub static INCOME_TAX_BRACKETS: [TaxBracket; 4] = [
    TaxBracket {
        min_days: 0,
        max_days: Some(180),
        rate_percent: dec!(22.5),
    },
    TaxBracket {
        min_days: 181,
        max_days: Some(360),
        rate_percent: dec!(20),
    },
    TaxBracket {
        min_days: 361,
        max_days: Some(720),
        rate_percent: dec!(17.5),
    },
    TaxBracket {
        min_days: 721,
        max_days: None,
        rate_percent: dec!(15),
    },
];

/// Income-tax rate in percent for a holding period.
///
/// Exempt instruments (LCI, LCA, ...) skip the table entirely; the flag comes
/// from the caller and is never derived from the instrument kind.
pub fn income_tax_rate(elapsed_days: i64, tax_exempt: bool) -> Decimal {
    if tax_exempt {
        return Decimal::ZERO;
    }
    let days = elapsed_days.max(0);
    INCOME_TAX_BRACKETS
        .iter()
        .find(|bracket| bracket.contains(days))
        .map(|bracket| bracket.rate_percent)
        .unwrap_or(Decimal::ZERO)
}
