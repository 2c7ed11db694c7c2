mod accumulation;
mod conversion;
mod error;
mod fixed_income;
mod format;
mod input;
mod retirement;
mod solver;
mod tax;
mod types;
mod yields;

pub use accumulation::{
    MAX_GOAL_MONTHS, months_to_goal, months_to_goal_from_input, project, project_balance,
    project_from_input, projection_schedule, yearly_schedule,
};
pub use conversion::{annual_rate, monthly_rate, periodic_effective_rate};
pub use error::{CalcError, ValidationError};
pub use fixed_income::{
    BonusCondition, CdbProduct, CdbTerms, RateBonus, calculate_net_yield, terms_from_input,
};
pub use format::{CurrencyFormat, format_currency, format_duration, format_percent};
pub use input::{Field, SimulationInput, parse_decimal};
pub use retirement::{
    MAX_AGE, MAX_RETIREMENT_YEARS, RetirementInputs, plan_retirement, target_corpus,
};
pub use solver::{ContributionGoal, GoalSolveConfig, GoalSolveResult, solve_required_contribution};
pub use tax::{TaxBracket, tax_rate_for_months};
pub use types::{
    DayCountConvention, GoalFormatted, GoalOutcome, GoalResult, NetYieldFormatted,
    NetYieldResult, ProjectionMonth, ProjectionResult, ProjectionYear, RateConvention,
    RetirementFormatted, RetirementPlan, SolveIteration, SolveTrace, UnreachableReason,
    YieldBreakdown, YieldFormatted,
};
pub use yields::{
    BUSINESS_DAYS_PER_YEAR, CALENDAR_DAYS_PER_YEAR, business_day_yield, calendar_yield,
    decompose_yield, decompose_yield_from_input,
};
