//! Retirement planner: how big a pot a monthly income needs, and what monthly
//! contribution builds it by retirement age.

use super::accumulation::project_balance;
use super::conversion::monthly_rate;
use super::error::{ValidationError, ensure_at_most, ensure_finite_result, ensure_non_negative};
use super::format::{format_currency, format_duration};
use super::input::{Field, SimulationInput};
use super::solver::{ContributionGoal, GoalSolveConfig, solve_required_contribution};
use super::types::{RateConvention, RetirementFormatted, RetirementPlan};

/// Ages and payout horizons are in years and capped here, which keeps every
/// month count well inside `i32`.
pub const MAX_AGE: u32 = 150;
pub const MAX_RETIREMENT_YEARS: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetirementInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_savings: f64,
    pub desired_monthly_income: f64,
    /// Annual return as a fraction.
    pub annual_rate: f64,
    /// Years the pot must last. `None` means living off interest forever.
    pub retirement_years: Option<u32>,
}

impl RetirementInputs {
    pub fn from_input(input: &SimulationInput) -> Result<Self, ValidationError> {
        Ok(Self {
            current_age: input.required_count(Field::CurrentAge)?,
            retirement_age: input.required_count(Field::RetirementAge)?,
            current_savings: input.optional(Field::InitialAmount)?.unwrap_or(0.0),
            desired_monthly_income: input.required(Field::DesiredMonthlyIncome)?,
            annual_rate: input.required(Field::AnnualRate)? / 100.0,
            retirement_years: input.optional_count(Field::RetirementYears)?,
        })
    }
}

/// Pot needed to pay `income` every month at `rate`.
pub fn target_corpus(
    desired_monthly_income: f64,
    monthly_rate: f64,
    retirement_years: Option<u32>,
) -> Result<f64, ValidationError> {
    match retirement_years {
        None if monthly_rate == 0.0 => Err(ValidationError::ZeroRateRequiresHorizon),
        None => Ok(desired_monthly_income / monthly_rate),
        Some(0) => Err(ValidationError::InvalidArgument(
            "retirement duration must be at least one year",
        )),
        Some(years) => {
            ensure_at_most(years, MAX_RETIREMENT_YEARS, Field::RetirementYears)?;
            let payments = years * 12;
            if monthly_rate == 0.0 {
                return Ok(desired_monthly_income * payments as f64);
            }
            let discount = (1.0 + monthly_rate).powi(-(payments as i32));
            Ok(desired_monthly_income * (1.0 - discount) / monthly_rate)
        }
    }
}

pub fn plan_retirement(inputs: &RetirementInputs) -> Result<RetirementPlan, ValidationError> {
    ensure_at_most(inputs.current_age, MAX_AGE, Field::CurrentAge)?;
    ensure_at_most(inputs.retirement_age, MAX_AGE, Field::RetirementAge)?;
    if inputs.retirement_age <= inputs.current_age {
        return Err(ValidationError::RetirementAgeNotAfterCurrent {
            current: inputs.current_age,
            retirement: inputs.retirement_age,
        });
    }
    ensure_non_negative(inputs.current_savings, "current savings")?;
    ensure_non_negative(inputs.desired_monthly_income, "desired monthly income")?;
    ensure_non_negative(inputs.annual_rate, "annual rate")?;

    let months = (inputs.retirement_age - inputs.current_age) * 12;
    let rate = monthly_rate(inputs.annual_rate, RateConvention::Effective);
    let target = target_corpus(inputs.desired_monthly_income, rate, inputs.retirement_years)?;
    let target = ensure_finite_result(target, "target corpus")?;
    let projected_savings = ensure_finite_result(
        project_balance(inputs.current_savings, 0.0, rate, months),
        "projected savings",
    )?;
    let shortfall = (target - projected_savings).max(0.0);

    let goal = ContributionGoal {
        principal: inputs.current_savings,
        monthly_rate: rate,
        months,
        target_balance: target,
    };
    let solved = solve_required_contribution(&goal, GoalSolveConfig::for_goal(&goal))?;
    let required = solved.solved_value.ok_or(ValidationError::InvalidArgument(
        "no feasible monthly contribution",
    ))?;

    let summary = if shortfall == 0.0 {
        format!(
            "Your savings alone grow to {} in {}, covering the {} you need.",
            format_currency(projected_savings),
            format_duration(months),
            format_currency(target),
        )
    } else {
        format!(
            "You need {} by retirement in {}; contributing {} a month gets you there.",
            format_currency(target),
            format_duration(months),
            format_currency(required),
        )
    };

    Ok(RetirementPlan {
        months_to_retirement: months,
        monthly_rate: rate,
        target_corpus: target,
        projected_savings,
        shortfall,
        required_monthly_contribution: required,
        solver: solved.trace,
        formatted: RetirementFormatted {
            target_corpus: format_currency(target),
            projected_savings: format_currency(projected_savings),
            shortfall: format_currency(shortfall),
            required_monthly_contribution: format_currency(required),
        },
        summary,
    })
}
