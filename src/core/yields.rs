use super::conversion::periodic_effective_rate;
use super::error::{ValidationError, ensure_non_negative};
use super::format::{format_currency, format_percent};
use super::input::{Field, SimulationInput};
use super::types::{DayCountConvention, YieldBreakdown, YieldFormatted};

pub const CALENDAR_DAYS_PER_YEAR: u32 = 365;
pub const BUSINESS_DAYS_PER_YEAR: u32 = 252;

/// Simple division: `annual/365` per day, `annual/12` per month.
pub fn calendar_yield(principal: f64, annual_rate: f64) -> Result<YieldBreakdown, ValidationError> {
    ensure_non_negative(principal, "principal")?;
    ensure_non_negative(annual_rate, "annual rate")?;
    Ok(breakdown(
        DayCountConvention::Calendar,
        principal,
        annual_rate / CALENDAR_DAYS_PER_YEAR as f64,
        annual_rate / 12.0,
        annual_rate,
    ))
}

/// Geometric conversion over 252 business days and 12 months.
pub fn business_day_yield(
    principal: f64,
    annual_rate: f64,
) -> Result<YieldBreakdown, ValidationError> {
    ensure_non_negative(principal, "principal")?;
    ensure_non_negative(annual_rate, "annual rate")?;
    Ok(breakdown(
        DayCountConvention::BusinessDay,
        principal,
        periodic_effective_rate(annual_rate, BUSINESS_DAYS_PER_YEAR),
        periodic_effective_rate(annual_rate, 12),
        annual_rate,
    ))
}

pub fn decompose_yield(
    principal: f64,
    annual_rate: f64,
    convention: DayCountConvention,
) -> Result<YieldBreakdown, ValidationError> {
    match convention {
        DayCountConvention::Calendar => calendar_yield(principal, annual_rate),
        DayCountConvention::BusinessDay => business_day_yield(principal, annual_rate),
    }
}

/// Reads `initialAmount` and `annualRate` (percent).
pub fn decompose_yield_from_input(
    input: &SimulationInput,
    convention: DayCountConvention,
) -> Result<YieldBreakdown, ValidationError> {
    let principal = input.required(Field::InitialAmount)?;
    let annual_pct = input.required(Field::AnnualRate)?;
    decompose_yield(principal, annual_pct / 100.0, convention)
}

fn breakdown(
    convention: DayCountConvention,
    principal: f64,
    daily_rate: f64,
    monthly_rate: f64,
    annual_rate: f64,
) -> YieldBreakdown {
    let daily = principal * daily_rate;
    let monthly = principal * monthly_rate;
    let annual = principal * annual_rate;
    let label = match convention {
        DayCountConvention::Calendar => "calendar days",
        DayCountConvention::BusinessDay => "business days",
    };
    YieldBreakdown {
        convention,
        principal,
        daily_rate,
        monthly_rate,
        annual_rate,
        daily,
        monthly,
        annual,
        formatted: YieldFormatted {
            daily: format_currency(daily),
            monthly: format_currency(monthly),
            annual: format_currency(annual),
        },
        summary: format!(
            "{} at {} a year yields {} per day, {} per month and {} per year ({label}).",
            format_currency(principal),
            format_percent(annual_rate),
            format_currency(daily),
            format_currency(monthly),
            format_currency(annual),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn calendar_convention_divides_simply() {
        let y = calendar_yield(10_000.0, 0.12).expect("valid");
        assert_eq!(y.convention, DayCountConvention::Calendar);
        assert_approx_tol(y.daily, 3.287671232876712, 1e-9);
        assert_approx_tol(y.monthly, 100.0, 1e-9);
        assert_approx_tol(y.annual, 1200.0, 1e-9);
        assert_eq!(y.formatted.monthly, "R$ 100,00");
    }

    #[test]
    fn business_day_convention_compounds() {
        let y = business_day_yield(10_000.0, 0.12).expect("valid");
        assert_eq!(y.convention, DayCountConvention::BusinessDay);
        assert_approx_tol(y.monthly, 94.88792934583046, 1e-9);
        assert_approx_tol(y.daily, 4.498181430394599, 1e-9);
        assert_approx_tol(y.annual, 1200.0, 1e-9);
    }

    #[test]
    fn conventions_disagree_on_the_same_inputs() {
        let calendar = calendar_yield(10_000.0, 0.12).expect("valid");
        let business = business_day_yield(10_000.0, 0.12).expect("valid");
        assert!(business.monthly < calendar.monthly);
        assert!(business.daily > calendar.daily);
    }

    #[test]
    fn from_input_takes_percent() {
        let input = SimulationInput::new()
            .with(Field::InitialAmount, "10000")
            .with(Field::AnnualRate, "12");
        let y = decompose_yield_from_input(&input, DayCountConvention::Calendar).expect("valid");
        assert_approx_tol(y.annual, 1200.0, 1e-9);
        assert!(y.summary.contains("R$ 1.200,00"));
    }

    #[test]
    fn rejects_negative_rate() {
        assert_eq!(
            calendar_yield(100.0, -0.1),
            Err(ValidationError::InvalidArgument("annual rate"))
        );
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_yields_scale_with_principal(principal in 1u32..1_000_000, rate_bp in 0u32..5_000) {
            let rate = rate_bp as f64 / 10_000.0;
            for convention in [DayCountConvention::Calendar, DayCountConvention::BusinessDay] {
                let one = decompose_yield(1.0, rate, convention).expect("valid");
                let many = decompose_yield(principal as f64, rate, convention).expect("valid");
                prop_assert!((many.monthly - one.monthly * principal as f64).abs() <= 1e-6);
                prop_assert!(many.daily <= many.monthly + 1e-12);
                prop_assert!(many.monthly <= many.annual + 1e-12);
            }
        }
    }
}
