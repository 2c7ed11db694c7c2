use serde::Serialize;

/// Regressive income-tax schedule for fixed-income holdings.
///
/// Only realized income is taxed, never principal. Breakpoints are inclusive on
/// the upper bound: exactly 6 months still pays 22.5%.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxBracket {
    UpToSixMonths,
    UpToOneYear,
    UpToTwoYears,
    OverTwoYears,
}

impl TaxBracket {
    pub fn for_months(months: u32) -> Self {
        match months {
            0..=6 => TaxBracket::UpToSixMonths,
            7..=12 => TaxBracket::UpToOneYear,
            13..=24 => TaxBracket::UpToTwoYears,
            _ => TaxBracket::OverTwoYears,
        }
    }

    /// Day-count form of the same schedule (180 / 360 / 720 days).
    pub fn for_holding_days(days: u32) -> Self {
        match days {
            0..=180 => TaxBracket::UpToSixMonths,
            181..=360 => TaxBracket::UpToOneYear,
            361..=720 => TaxBracket::UpToTwoYears,
            _ => TaxBracket::OverTwoYears,
        }
    }

    pub fn rate(self) -> f64 {
        match self {
            TaxBracket::UpToSixMonths => 0.225,
            TaxBracket::UpToOneYear => 0.20,
            TaxBracket::UpToTwoYears => 0.175,
            TaxBracket::OverTwoYears => 0.15,
        }
    }
}

pub fn tax_rate_for_months(months: u32) -> f64 {
    TaxBracket::for_months(months).rate()
}
