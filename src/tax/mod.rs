// Tax module - Brazilian fixed-income taxes (regressive IR, IOF)

pub mod income_tax;
pub mod iof;

pub use income_tax::{income_tax_rate, TaxBracket, INCOME_TAX_BRACKETS};
pub use iof::{iof_rate, iof_table, IOF_FREE_AFTER_DAYS};
