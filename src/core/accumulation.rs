use super::conversion::monthly_rate;
use super::error::{ValidationError, ensure_at_most, ensure_finite_result, ensure_non_negative};
use super::format::{format_currency, format_duration};
use super::input::{Field, SimulationInput};
use super::types::{
    GoalFormatted, GoalOutcome, GoalResult, ProjectionMonth, ProjectionResult, ProjectionYear,
    RateConvention, UnreachableReason,
};

/// Longest monthly horizon any calculator accepts or searches: 100 years.
pub const MAX_GOAL_MONTHS: u32 = 1200;

/// Contribution made at the end of each month, after interest.
fn step(balance: f64, monthly_contribution: f64, monthly_rate: f64) -> f64 {
    balance * (1.0 + monthly_rate) + monthly_contribution
}

pub fn project_balance(
    principal: f64,
    monthly_contribution: f64,
    monthly_rate: f64,
    months: u32,
) -> f64 {
    let mut balance = principal;
    for _ in 0..months {
        balance = step(balance, monthly_contribution, monthly_rate);
    }
    balance
}

pub fn projection_schedule(
    principal: f64,
    monthly_contribution: f64,
    monthly_rate: f64,
    months: u32,
) -> Vec<ProjectionMonth> {
    let mut rows = Vec::with_capacity(months.min(MAX_GOAL_MONTHS) as usize);
    let mut balance = principal;
    let mut contributed = 0.0;
    for month in 1..=months {
        balance = step(balance, monthly_contribution, monthly_rate);
        contributed += monthly_contribution;
        rows.push(ProjectionMonth {
            month,
            balance,
            contributed,
            interest: balance - principal - contributed,
        });
    }
    rows
}

/// Folds monthly rows into per-year rows; a trailing partial year is kept.
pub fn yearly_schedule(principal: f64, rows: &[ProjectionMonth]) -> Vec<ProjectionYear> {
    let mut years = Vec::with_capacity(rows.len().div_ceil(12));
    let mut prev_balance = principal;
    let mut prev_contributed = 0.0;
    for chunk in rows.chunks(12) {
        let Some(last) = chunk.last() else {
            continue;
        };
        let contributed = last.contributed - prev_contributed;
        years.push(ProjectionYear {
            year: last.month.div_ceil(12),
            end_balance: last.balance,
            contributed,
            interest: last.balance - prev_balance - contributed,
        });
        prev_balance = last.balance;
        prev_contributed = last.contributed;
    }
    years
}

pub fn project(
    principal: f64,
    monthly_contribution: f64,
    annual_rate: f64,
    months: u32,
    convention: RateConvention,
) -> Result<ProjectionResult, ValidationError> {
    ensure_non_negative(principal, "principal")?;
    ensure_non_negative(monthly_contribution, "monthly contribution")?;
    ensure_non_negative(annual_rate, "annual rate")?;
    ensure_at_most(months, MAX_GOAL_MONTHS, Field::PeriodMonths)?;

    let rate = monthly_rate(annual_rate, convention);
    let rows = projection_schedule(principal, monthly_contribution, rate, months);
    let final_balance =
        ensure_finite_result(rows.last().map_or(principal, |row| row.balance), "final balance")?;
    let total_contributed = monthly_contribution * months as f64;
    let interest_earned = final_balance - principal - total_contributed;

    Ok(ProjectionResult {
        months,
        monthly_rate: rate,
        convention,
        final_balance,
        total_contributed,
        interest_earned,
        years: yearly_schedule(principal, &rows),
        formatted: goal_formatted(final_balance, total_contributed, interest_earned),
        summary: format!(
            "After {} you will have {} ({} contributed, {} in interest).",
            format_duration(months),
            format_currency(final_balance),
            format_currency(total_contributed),
            format_currency(interest_earned),
        ),
    })
}

pub fn months_to_goal(
    principal: f64,
    monthly_contribution: f64,
    monthly_rate: f64,
    goal: f64,
) -> Result<GoalOutcome, ValidationError> {
    ensure_non_negative(principal, "principal")?;
    ensure_non_negative(monthly_contribution, "monthly contribution")?;
    ensure_non_negative(monthly_rate, "monthly rate")?;
    ensure_non_negative(goal, "goal")?;

    if principal >= goal {
        return Err(ValidationError::GoalAlreadyMet { principal, goal });
    }

    if monthly_contribution == 0.0 {
        if monthly_rate == 0.0 || principal == 0.0 {
            return Ok(unreachable(UnreachableReason::InfiniteHorizon));
        }
        let exact = (goal / principal).ln() / (1.0 + monthly_rate).ln();
        let months = exact.ceil();
        if months > MAX_GOAL_MONTHS as f64 {
            let balance = project_balance(principal, 0.0, monthly_rate, MAX_GOAL_MONTHS);
            return Ok(unreachable(UnreachableReason::ExceedsHorizon {
                months: MAX_GOAL_MONTHS,
                balance,
            }));
        }
        let months = months as u32;
        let final_balance = principal * (1.0 + monthly_rate).powi(months as i32);
        return Ok(GoalOutcome::Reached(goal_result(
            principal,
            monthly_contribution,
            months,
            final_balance,
        )));
    }

    let mut balance = principal;
    let mut months = 0;
    while balance < goal && months < MAX_GOAL_MONTHS {
        balance = step(balance, monthly_contribution, monthly_rate);
        months += 1;
    }
    if balance < goal {
        return Ok(unreachable(UnreachableReason::ExceedsHorizon { months, balance }));
    }

    Ok(GoalOutcome::Reached(goal_result(
        principal,
        monthly_contribution,
        months,
        balance,
    )))
}

/// Goal-time calculator over a raw form. Reads `initialAmount`,
/// `monthlyContribution`, `annualRate` (percent) and `targetAmount`.
pub fn months_to_goal_from_input(
    input: &SimulationInput,
    convention: RateConvention,
) -> Result<GoalOutcome, ValidationError> {
    let principal = input.optional(Field::InitialAmount)?.unwrap_or(0.0);
    let contribution = input.optional(Field::MonthlyContribution)?.unwrap_or(0.0);
    let annual_pct = input.required(Field::AnnualRate)?;
    let goal = input.required(Field::TargetAmount)?;

    let rate = monthly_rate(annual_pct / 100.0, convention);
    months_to_goal(principal, contribution, rate, goal)
}

pub fn project_from_input(
    input: &SimulationInput,
    convention: RateConvention,
) -> Result<ProjectionResult, ValidationError> {
    let principal = input.optional(Field::InitialAmount)?.unwrap_or(0.0);
    let contribution = input.optional(Field::MonthlyContribution)?.unwrap_or(0.0);
    let annual_pct = input.required(Field::AnnualRate)?;
    let months = input.required_count(Field::PeriodMonths)?;

    project(principal, contribution, annual_pct / 100.0, months, convention)
}

fn goal_result(
    principal: f64,
    monthly_contribution: f64,
    months: u32,
    final_balance: f64,
) -> GoalResult {
    let total_contributed = monthly_contribution * months as f64;
    let interest_earned = final_balance - principal - total_contributed;
    GoalResult {
        months,
        years: months / 12,
        remainder_months: months % 12,
        final_balance,
        total_contributed,
        interest_earned,
        formatted: goal_formatted(final_balance, total_contributed, interest_earned),
        summary: format!(
            "You reach your goal in {} with {}.",
            format_duration(months),
            format_currency(final_balance),
        ),
    }
}

fn goal_formatted(final_balance: f64, total_contributed: f64, interest_earned: f64) -> GoalFormatted {
    GoalFormatted {
        final_balance: format_currency(final_balance),
        total_contributed: format_currency(total_contributed),
        interest_earned: format_currency(interest_earned),
    }
}

fn unreachable(reason: UnreachableReason) -> GoalOutcome {
    let summary = match &reason {
        UnreachableReason::InfiniteHorizon => {
            "The goal is unreachable without contributions or interest.".to_string()
        }
        UnreachableReason::ExceedsHorizon { months, balance } => format!(
            "The goal is not reached within {}; the balance would be {}.",
            format_duration(*months),
            format_currency(*balance),
        ),
    };
    GoalOutcome::Unreachable { reason, summary }
}
