use super::accumulation::project_balance;
use super::error::ValidationError;
use super::types::{SolveIteration, SolveTrace};

/// Accumulation target for the contribution search.
#[derive(Debug, Clone, Copy)]
pub struct ContributionGoal {
    pub principal: f64,
    pub monthly_rate: f64,
    pub months: u32,
    pub target_balance: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveConfig {
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl GoalSolveConfig {
    /// `target / months` always suffices when rates are non-negative, so it bounds
    /// the search from above (plus one unit to absorb summation rounding).
    pub fn for_goal(goal: &ContributionGoal) -> Self {
        let months = goal.months.max(1) as f64;
        Self {
            search_min: 0.0,
            search_max: goal.target_balance / months + 1.0,
            tolerance: 0.01,
            max_iterations: 200,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoalSolveResult {
    pub solved_value: Option<f64>,
    pub trace: SolveTrace,
}

/// Bisects for the smallest monthly contribution that reaches the target.
///
/// Returns the upper end of the final bracket, so the answer always reaches the
/// target rather than falling a cent short.
pub fn solve_required_contribution(
    goal: &ContributionGoal,
    config: GoalSolveConfig,
) -> Result<GoalSolveResult, ValidationError> {
    validate_config(goal, config)?;

    let reaches = |contribution: f64| {
        let balance = project_balance(goal.principal, contribution, goal.monthly_rate, goal.months);
        (balance, balance + 1e-9 >= goal.target_balance)
    };

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    let (_, low_ok) = reaches(config.search_min);
    let (_, high_ok) = reaches(config.search_max);

    if low_ok {
        solved_value = Some(config.search_min);
        converged = true;
        feasible = true;
        message = "Already meets target at lower contribution bound.".to_string();
    } else if !high_ok {
        feasible = false;
        message = "No feasible contribution found within the search bounds.".to_string();
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let (balance, ok) = reaches(mid);
            iterations.push(SolveIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_value: mid,
                projected_balance: balance,
            });

            if ok {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                solved_value = Some(hi);
                break;
            }
        }
        if solved_value.is_none() {
            solved_value = Some(hi);
        }
        feasible = true;
        message = if converged {
            "Solved required contribution.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate."
                .to_string()
        };
    }

    Ok(GoalSolveResult {
        solved_value,
        trace: SolveTrace {
            search_min: config.search_min,
            search_max: config.search_max,
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
            iterations,
            converged,
            feasible,
            message,
        },
    })
}

fn validate_config(goal: &ContributionGoal, config: GoalSolveConfig) -> Result<(), ValidationError> {
    if !goal.principal.is_finite() || goal.principal < 0.0 {
        return Err(ValidationError::InvalidArgument("principal must be >= 0"));
    }
    if !goal.monthly_rate.is_finite() || goal.monthly_rate < 0.0 {
        return Err(ValidationError::InvalidArgument("monthly rate must be >= 0"));
    }
    if !goal.target_balance.is_finite() || goal.target_balance < 0.0 {
        return Err(ValidationError::InvalidArgument("target balance must be >= 0"));
    }
    if goal.months == 0 {
        return Err(ValidationError::NonPositivePeriod);
    }
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err(ValidationError::InvalidArgument("search bounds must be finite"));
    }
    if config.search_min < 0.0 {
        return Err(ValidationError::InvalidArgument("search_min must be >= 0"));
    }
    if config.search_max <= config.search_min {
        return Err(ValidationError::InvalidArgument(
            "search_max must be greater than search_min",
        ));
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(ValidationError::InvalidArgument("tolerance must be > 0"));
    }
    if config.max_iterations == 0 {
        return Err(ValidationError::InvalidArgument("max_iterations must be > 0"));
    }
    Ok(())
}
