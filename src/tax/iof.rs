use once_cell::sync::Lazy;
use rust_decimal::Decimal;

/// IOF is charged only on redemptions before this many days.
pub const IOF_FREE_AFTER_DAYS: i64 = 30;

/// Regressive IOF table indexed by elapsed days (0..30).
///
/// Day `d` keeps `(30 - d) / 30` of the gain as tax, truncated to a whole
/// percent: 100, 96, 93, 90, 86, ... 6, 3.
static IOF_TABLE: Lazy<Vec<Decimal>> = Lazy::new(|| {
    (0..IOF_FREE_AFTER_DAYS)
        .map(|day| Decimal::from((IOF_FREE_AFTER_DAYS - day) * 100 / IOF_FREE_AFTER_DAYS))
        .collect()
});

/// IOF rate in percent applied to the gain after `elapsed_days`.
pub fn iof_rate(elapsed_days: i64) -> Decimal {
    if elapsed_days >= IOF_FREE_AFTER_DAYS {
        return Decimal::ZERO;
    }
    let day = elapsed_days.max(0) as usize;
    IOF_TABLE.get(day).copied().unwrap_or(Decimal::ZERO)
}

/// The full decay table, one entry per day starting at day 0.
pub fn iof_table() -> &'static [Decimal] {
    &IOF_TABLE
}
