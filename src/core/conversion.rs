use super::types::RateConvention;

/// Converts an annual rate (fraction) to a monthly one under `convention`.
pub fn monthly_rate(annual_rate: f64, convention: RateConvention) -> f64 {
    match convention {
        RateConvention::Effective => (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0,
        RateConvention::Nominal => annual_rate / 12.0,
    }
}

/// Inverse of [`monthly_rate`].
pub fn annual_rate(monthly_rate: f64, convention: RateConvention) -> f64 {
    match convention {
        RateConvention::Effective => (1.0 + monthly_rate).powi(12) - 1.0,
        RateConvention::Nominal => monthly_rate * 12.0,
    }
}

/// Periodic rate over `periods_per_year` compounding periods, e.g. 252 business days.
pub fn periodic_effective_rate(annual_rate: f64, periods_per_year: u32) -> f64 {
    (1.0 + annual_rate).powf(1.0 / periods_per_year as f64) - 1.0
}
