use serde::Serialize;

use super::tax::TaxBracket;

/// How an annual rate becomes a monthly one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RateConvention {
    /// `(1 + annual)^(1/12) - 1`, compounding-equivalent.
    Effective,
    /// `annual / 12`.
    Nominal,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DayCountConvention {
    /// 365-day year, twelve equal months, simple division.
    Calendar,
    /// 252 business days, geometric conversion.
    BusinessDay,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResult {
    pub months: u32,
    pub years: u32,
    pub remainder_months: u32,
    pub final_balance: f64,
    pub total_contributed: f64,
    pub interest_earned: f64,
    pub formatted: GoalFormatted,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalFormatted {
    pub final_balance: String,
    pub total_contributed: String,
    pub interest_earned: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum UnreachableReason {
    /// No contribution and no growth: the balance never moves.
    InfiniteHorizon,
    /// Still short of the goal after the month cap.
    #[serde(rename_all = "camelCase")]
    ExceedsHorizon { months: u32, balance: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum GoalOutcome {
    Reached(GoalResult),
    Unreachable {
        reason: UnreachableReason,
        summary: String,
    },
}

impl GoalOutcome {
    pub fn reached(&self) -> Option<&GoalResult> {
        match self {
            GoalOutcome::Reached(result) => Some(result),
            GoalOutcome::Unreachable { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionMonth {
    pub month: u32,
    pub balance: f64,
    pub contributed: f64,
    pub interest: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionYear {
    pub year: u32,
    pub end_balance: f64,
    pub contributed: f64,
    pub interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub months: u32,
    pub monthly_rate: f64,
    pub convention: RateConvention,
    pub final_balance: f64,
    pub total_contributed: f64,
    pub interest_earned: f64,
    pub years: Vec<ProjectionYear>,
    pub formatted: GoalFormatted,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetYieldResult {
    pub principal: f64,
    pub months: u32,
    pub monthly_rate: f64,
    pub applied_bonus: f64,
    pub gross: f64,
    pub income: f64,
    pub tax_bracket: TaxBracket,
    pub tax_rate: f64,
    pub tax: f64,
    pub net: f64,
    pub net_income: f64,
    pub formatted: NetYieldFormatted,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetYieldFormatted {
    pub gross: String,
    pub tax: String,
    pub net: String,
    pub net_income: String,
    pub tax_rate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldBreakdown {
    pub convention: DayCountConvention,
    pub principal: f64,
    pub daily_rate: f64,
    pub monthly_rate: f64,
    pub annual_rate: f64,
    pub daily: f64,
    pub monthly: f64,
    pub annual: f64,
    pub formatted: YieldFormatted,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldFormatted {
    pub daily: String,
    pub monthly: String,
    pub annual: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub projected_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveTrace {
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub iterations: Vec<SolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementPlan {
    pub months_to_retirement: u32,
    pub monthly_rate: f64,
    pub target_corpus: f64,
    pub projected_savings: f64,
    pub shortfall: f64,
    pub required_monthly_contribution: f64,
    pub solver: SolveTrace,
    pub formatted: RetirementFormatted,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementFormatted {
    pub target_corpus: String,
    pub projected_savings: String,
    pub shortfall: String,
    pub required_monthly_contribution: String,
}
