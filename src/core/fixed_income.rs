//! CDB-style fixed income: a lump sum growing at a percentage of the benchmark
//! rate, with regressive tax charged on income only.

use serde::Serialize;

use super::accumulation::MAX_GOAL_MONTHS;
use super::conversion::monthly_rate;
use super::error::{ValidationError, ensure_at_most, ensure_finite_result, ensure_non_negative};
use super::format::{format_currency, format_duration, format_percent};
use super::input::{Field, SimulationInput};
use super::tax::TaxBracket;
use super::types::{NetYieldFormatted, NetYieldResult, RateConvention};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CdbTerms {
    pub principal: f64,
    /// Benchmark annual rate in percent, e.g. `13.75`.
    pub benchmark_annual_rate: f64,
    /// Share of the benchmark paid, in percent, e.g. `110`.
    pub benchmark_percentage: f64,
    pub months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "threshold", rename_all = "kebab-case")]
pub enum BonusCondition {
    Always,
    /// Strictly greater than the threshold amount.
    PrincipalAbove(f64),
    /// Strictly longer than the threshold in months.
    MonthsAbove(u32),
}

impl BonusCondition {
    fn applies(self, terms: &CdbTerms) -> bool {
        match self {
            BonusCondition::Always => true,
            BonusCondition::PrincipalAbove(threshold) => terms.principal > threshold,
            BonusCondition::MonthsAbove(threshold) => terms.months > threshold,
        }
    }
}

/// Additive bump on the monthly rate, applied before compounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateBonus {
    pub condition: BonusCondition,
    pub monthly_bonus: f64,
}

/// Product definition: how the benchmark becomes a monthly rate, plus any
/// bonuses the issuer layers on top.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CdbProduct {
    pub convention: RateConvention,
    pub bonuses: Vec<RateBonus>,
}

impl Default for CdbProduct {
    fn default() -> Self {
        Self::plain()
    }
}

impl CdbProduct {
    pub fn plain() -> Self {
        Self {
            convention: RateConvention::Nominal,
            bonuses: Vec::new(),
        }
    }

    pub fn high_balance(threshold: f64, monthly_bonus: f64) -> Self {
        Self::plain().with_bonus(BonusCondition::PrincipalAbove(threshold), monthly_bonus)
    }

    pub fn long_term(threshold_months: u32, monthly_bonus: f64) -> Self {
        Self::plain().with_bonus(BonusCondition::MonthsAbove(threshold_months), monthly_bonus)
    }

    pub fn with_bonus(mut self, condition: BonusCondition, monthly_bonus: f64) -> Self {
        self.bonuses.push(RateBonus {
            condition,
            monthly_bonus,
        });
        self
    }

    pub fn with_convention(mut self, convention: RateConvention) -> Self {
        self.convention = convention;
        self
    }

    fn bonus_for(&self, terms: &CdbTerms) -> f64 {
        self.bonuses
            .iter()
            .filter(|bonus| bonus.condition.applies(terms))
            .map(|bonus| bonus.monthly_bonus)
            .sum()
    }
}

pub fn calculate_net_yield(
    terms: &CdbTerms,
    product: &CdbProduct,
) -> Result<NetYieldResult, ValidationError> {
    if terms.months == 0 {
        return Err(ValidationError::NonPositivePeriod);
    }
    ensure_at_most(terms.months, MAX_GOAL_MONTHS, Field::PeriodMonths)?;
    ensure_non_negative(terms.principal, "principal")?;
    ensure_non_negative(terms.benchmark_annual_rate, "benchmark annual rate")?;
    ensure_non_negative(terms.benchmark_percentage, "benchmark percentage")?;
    for bonus in &product.bonuses {
        ensure_non_negative(bonus.monthly_bonus, "rate bonus")?;
    }

    let annual = terms.benchmark_annual_rate / 100.0 * terms.benchmark_percentage / 100.0;
    let base_rate = monthly_rate(annual, product.convention);
    let applied_bonus = product.bonus_for(terms);
    let rate = base_rate + applied_bonus;

    // months <= MAX_GOAL_MONTHS, so the exponent fits in i32.
    let gross = ensure_finite_result(
        terms.principal * (1.0 + rate).powi(terms.months as i32),
        "gross amount",
    )?;
    let income = gross - terms.principal;
    let tax_bracket = TaxBracket::for_months(terms.months);
    let tax_rate = tax_bracket.rate();
    let tax = income.max(0.0) * tax_rate;
    let net = gross - tax;
    let net_income = net - terms.principal;

    Ok(NetYieldResult {
        principal: terms.principal,
        months: terms.months,
        monthly_rate: rate,
        applied_bonus,
        gross,
        income,
        tax_bracket,
        tax_rate,
        tax,
        net,
        net_income,
        formatted: NetYieldFormatted {
            gross: format_currency(gross),
            tax: format_currency(tax),
            net: format_currency(net),
            net_income: format_currency(net_income),
            tax_rate: format_percent(tax_rate),
        },
        summary: format!(
            "After {} the investment grows to {} gross; {} income tax ({}) leaves {} net, {} of net income.",
            format_duration(terms.months),
            format_currency(gross),
            format_currency(tax),
            format_percent(tax_rate),
            format_currency(net),
            format_currency(net_income),
        ),
    })
}

/// Reads `initialAmount`, `benchmarkPercentage` and `periodMonths`. The benchmark
/// rate is resolved by the caller, from the form's `benchmarkRate` override or the
/// fetched snapshot.
pub fn terms_from_input(
    input: &SimulationInput,
    benchmark_annual_rate: f64,
) -> Result<CdbTerms, ValidationError> {
    let principal = input.required(Field::InitialAmount)?;
    let benchmark_percentage = input.required(Field::BenchmarkPercentage)?;
    let months = input.required_count(Field::PeriodMonths)?;
    if months == 0 {
        return Err(ValidationError::NonPositivePeriod);
    }
    ensure_at_most(months, MAX_GOAL_MONTHS, Field::PeriodMonths)?;
    Ok(CdbTerms {
        principal,
        benchmark_annual_rate,
        benchmark_percentage,
        months,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assume, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn reference_terms() -> CdbTerms {
        CdbTerms {
            principal: 10_000.0,
            benchmark_annual_rate: 13.75,
            benchmark_percentage: 110.0,
            months: 12,
        }
    }

    #[test]
    fn reference_scenario_matches_closed_form() {
        let result = calculate_net_yield(&reference_terms(), &CdbProduct::plain()).expect("valid");
        assert_approx_tol(result.monthly_rate, 0.1375 * 1.10 / 12.0, 1e-15);
        assert_approx_tol(result.gross, 11_621.88, 0.005);
        assert_approx_tol(result.income, 1_621.88, 0.005);
        assert_eq!(result.tax_bracket, TaxBracket::UpToOneYear);
        assert_eq!(result.tax_rate, 0.20);
        assert_approx_tol(result.tax, 324.38, 0.005);
        assert_approx_tol(result.net, 11_297.51, 0.005);
        assert_approx_tol(result.net_income, 1_297.51, 0.005);
        assert_eq!(result.formatted.net, "R$ 11.297,51");
        assert_eq!(result.formatted.tax_rate, "20,00%");
    }

    #[test]
    fn zero_months_is_rejected() {
        let terms = CdbTerms {
            months: 0,
            ..reference_terms()
        };
        assert_eq!(
            calculate_net_yield(&terms, &CdbProduct::plain()),
            Err(ValidationError::NonPositivePeriod)
        );
    }

    #[test]
    fn period_is_capped_at_one_hundred_years() {
        let longest = CdbTerms {
            months: MAX_GOAL_MONTHS,
            ..reference_terms()
        };
        let result = calculate_net_yield(&longest, &CdbProduct::plain()).expect("cap is accepted");
        assert!(result.gross.is_finite() && result.gross > result.principal);
        assert_eq!(result.tax_bracket, TaxBracket::OverTwoYears);

        for months in [MAX_GOAL_MONTHS + 1, 100_000, 3_000_000_000] {
            let terms = CdbTerms {
                months,
                ..reference_terms()
            };
            assert_eq!(
                calculate_net_yield(&terms, &CdbProduct::plain()),
                Err(ValidationError::TooLarge {
                    field: Field::PeriodMonths,
                    max: MAX_GOAL_MONTHS
                })
            );
        }

        let input = SimulationInput::new()
            .with(Field::InitialAmount, "10000")
            .with(Field::BenchmarkPercentage, "110")
            .with(Field::PeriodMonths, "3000000000");
        assert!(matches!(
            terms_from_input(&input, 13.75),
            Err(ValidationError::TooLarge { .. })
        ));
    }

    #[test]
    fn overflowing_gross_is_rejected() {
        let terms = CdbTerms {
            benchmark_annual_rate: 1e300,
            months: 1200,
            ..reference_terms()
        };
        assert_eq!(
            calculate_net_yield(&terms, &CdbProduct::plain()),
            Err(ValidationError::Overflow("gross amount"))
        );
    }

    #[test]
    fn high_balance_bonus_needs_principal_strictly_above_threshold() {
        let product = CdbProduct::high_balance(10_000.0, 0.001);
        let at_threshold = calculate_net_yield(&reference_terms(), &product).expect("valid");
        assert_eq!(at_threshold.applied_bonus, 0.0);

        let terms = CdbTerms {
            principal: 10_000.01,
            ..reference_terms()
        };
        let above = calculate_net_yield(&terms, &product).expect("valid");
        assert_approx_tol(above.applied_bonus, 0.001, 1e-15);
        assert!(above.gross > at_threshold.gross);
    }

    #[test]
    fn bonuses_stack_and_toggle_independently() {
        let product = CdbProduct::plain()
            .with_bonus(BonusCondition::PrincipalAbove(5_000.0), 0.0005)
            .with_bonus(BonusCondition::MonthsAbove(24), 0.0010)
            .with_bonus(BonusCondition::Always, 0.0001);

        let short = calculate_net_yield(&reference_terms(), &product).expect("valid");
        assert_approx_tol(short.applied_bonus, 0.0006, 1e-15);

        let long_terms = CdbTerms {
            months: 36,
            ..reference_terms()
        };
        let long = calculate_net_yield(&long_terms, &product).expect("valid");
        assert_approx_tol(long.applied_bonus, 0.0016, 1e-15);
        assert_eq!(long.tax_rate, 0.15);

        let base = calculate_net_yield(&long_terms, &CdbProduct::plain()).expect("valid");
        let expected_gross = 10_000.0 * (1.0 + base.monthly_rate + 0.0016_f64).powi(36);
        assert_approx_tol(long.gross, expected_gross, 1e-6);
    }

    #[test]
    fn effective_convention_is_selectable() {
        let product = CdbProduct::plain().with_convention(RateConvention::Effective);
        let result = calculate_net_yield(&reference_terms(), &product).expect("valid");
        assert_approx_tol(result.gross, 10_000.0 * (1.0 + 0.1375 * 1.10), 1e-6);
    }

    #[test]
    fn terms_from_input_parses_form() {
        let input = SimulationInput::new()
            .with(Field::InitialAmount, "10.000,00")
            .with(Field::BenchmarkPercentage, "110")
            .with(Field::PeriodMonths, "12");
        let terms = terms_from_input(&input, 13.75).expect("valid");
        assert_eq!(terms, reference_terms());

        let zero = input.clone().with(Field::PeriodMonths, "0");
        assert_eq!(
            terms_from_input(&zero, 13.75),
            Err(ValidationError::NonPositivePeriod)
        );
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(96))]

        #[test]
        fn prop_net_never_exceeds_gross(
            principal in 1u32..1_000_000,
            benchmark_bp in 0u32..3_000,
            pct in 50u32..150,
            months in 1u32..120,
            bonus_bp in 0u32..20
        ) {
            let terms = CdbTerms {
                principal: principal as f64,
                benchmark_annual_rate: benchmark_bp as f64 / 100.0,
                benchmark_percentage: pct as f64,
                months,
            };
            let product = CdbProduct::long_term(12, bonus_bp as f64 / 10_000.0);
            let result = calculate_net_yield(&terms, &product).expect("valid");
            prop_assume!(result.income > 0.0);
            prop_assert!(result.tax >= 0.0);
            prop_assert!(result.net <= result.gross);
            prop_assert!(result.net_income <= result.income);
            prop_assert!(result.net >= terms.principal);
        }
    }
}
