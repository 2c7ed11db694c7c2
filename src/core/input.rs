use std::collections::BTreeMap;
use std::fmt;

use super::error::ValidationError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Field {
    InitialAmount,
    MonthlyContribution,
    TargetAmount,
    AnnualRate,
    BenchmarkRate,
    BenchmarkPercentage,
    PeriodMonths,
    CurrentAge,
    RetirementAge,
    DesiredMonthlyIncome,
    RetirementYears,
    BonusThreshold,
    MonthlyBonus,
}

impl Field {
    /// Wire name, matching the camelCase keys of the JSON API.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::InitialAmount => "initialAmount",
            Field::MonthlyContribution => "monthlyContribution",
            Field::TargetAmount => "targetAmount",
            Field::AnnualRate => "annualRate",
            Field::BenchmarkRate => "benchmarkRate",
            Field::BenchmarkPercentage => "benchmarkPercentage",
            Field::PeriodMonths => "periodMonths",
            Field::CurrentAge => "currentAge",
            Field::RetirementAge => "retirementAge",
            Field::DesiredMonthlyIncome => "desiredMonthlyIncome",
            Field::RetirementYears => "retirementYears",
            Field::BonusThreshold => "bonusThreshold",
            Field::MonthlyBonus => "monthlyBonus",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw calculator form: field name to the text the user typed.
///
/// The engine never mutates it; each calculator pulls the fields it needs and
/// validates them before computing anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationInput {
    fields: BTreeMap<Field, String>,
}

impl SimulationInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn raw(&self, field: Field) -> Option<&str> {
        self.fields
            .get(&field)
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn required(&self, field: Field) -> Result<f64, ValidationError> {
        self.optional(field)?
            .ok_or(ValidationError::MissingField(field))
    }

    /// Blank text counts as absent.
    pub fn optional(&self, field: Field) -> Result<Option<f64>, ValidationError> {
        let Some(raw) = self.raw(field) else {
            return Ok(None);
        };
        let value = parse_decimal(raw).ok_or_else(|| ValidationError::InvalidNumber {
            field,
            value: raw.to_string(),
        })?;
        if !value.is_finite() {
            return Err(ValidationError::NotFinite(field));
        }
        if value < 0.0 {
            return Err(ValidationError::Negative(field));
        }
        Ok(Some(value))
    }

    /// Whole-number fields such as months and ages.
    pub fn required_count(&self, field: Field) -> Result<u32, ValidationError> {
        self.optional_count(field)?
            .ok_or(ValidationError::MissingField(field))
    }

    pub fn optional_count(&self, field: Field) -> Result<Option<u32>, ValidationError> {
        let Some(value) = self.optional(field)? else {
            return Ok(None);
        };
        if value.fract() != 0.0 || value > u32::MAX as f64 {
            return Err(ValidationError::InvalidNumber {
                field,
                value: self.raw(field).unwrap_or_default().to_string(),
            });
        }
        Ok(Some(value as u32))
    }
}

/// Parses user-typed decimal text.
///
/// Accepts `1234.56`, `1234,56` and pt-BR grouping `1.234,56`, with an optional
/// `R$` prefix and `%` suffix. Exponents, `inf` and `NaN` are rejected.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("R$") {
        text = rest.trim_start();
    }
    if let Some(rest) = text.strip_suffix('%') {
        text = rest.trim_end();
    }
    if text.is_empty() {
        return None;
    }

    let commas = text.matches(',').count();
    let dots = text.matches('.').count();
    let normalized = match (commas, dots) {
        (0, 0) | (0, 1) => text.to_string(),
        (1, 0) => text.replace(',', "."),
        (1, _) => {
            let (int_part, frac_part) = text.split_once(',')?;
            format!("{}.{}", ungroup(int_part)?, frac_part)
        }
        (0, _) => ungroup(text)?,
        _ => return None,
    };

    let digits = normalized.strip_prefix('-').unwrap_or(&normalized);
    if digits.is_empty()
        || digits == "."
        || !digits.chars().all(|c| c.is_ascii_digit() || c == '.')
    {
        return None;
    }
    normalized.parse::<f64>().ok()
}

/// Strips `.` thousands separators, requiring every group after the first to be
/// three digits long.
fn ungroup(text: &str) -> Option<String> {
    let mut groups = text.split('.');
    let head = groups.next()?;
    let head_digits = head.strip_prefix('-').unwrap_or(head);
    if head_digits.is_empty() || head_digits.len() > 3 {
        return None;
    }
    let mut out = head.to_string();
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        out.push_str(group);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decimal_accepts_common_forms() {
        assert_eq!(parse_decimal("1234.56"), Some(1234.56));
        assert_eq!(parse_decimal("1234,56"), Some(1234.56));
        assert_eq!(parse_decimal("1.234,56"), Some(1234.56));
        assert_eq!(parse_decimal("1.234.567"), Some(1_234_567.0));
        assert_eq!(parse_decimal(" R$ 50.000,00 "), Some(50_000.0));
        assert_eq!(parse_decimal("13,75%"), Some(13.75));
        assert_eq!(parse_decimal(".5"), Some(0.5));
        assert_eq!(parse_decimal("42"), Some(42.0));
    }

    #[test]
    fn parse_decimal_rejects_garbage() {
        for raw in ["", "  ", "abc", "1e5", "inf", "NaN", "1,2,3", "1.23.4", ".", "12.34,5,6"] {
            assert_eq!(parse_decimal(raw), None, "{raw:?} should not parse");
        }
    }

    #[test]
    fn required_reports_missing_and_blank_fields() {
        let input = SimulationInput::new().with(Field::TargetAmount, "   ");
        assert_eq!(
            input.required(Field::InitialAmount),
            Err(ValidationError::MissingField(Field::InitialAmount))
        );
        assert_eq!(
            input.required(Field::TargetAmount),
            Err(ValidationError::MissingField(Field::TargetAmount))
        );
    }

    #[test]
    fn required_rejects_negative_and_non_numeric() {
        let input = SimulationInput::new()
            .with(Field::InitialAmount, "-10")
            .with(Field::AnnualRate, "ten");
        assert_eq!(
            input.required(Field::InitialAmount),
            Err(ValidationError::Negative(Field::InitialAmount))
        );
        let err = input.required(Field::AnnualRate).expect_err("must reject text");
        assert!(err.to_string().contains("annualRate"));
    }

    #[test]
    fn count_fields_span_the_u32_range() {
        let input = SimulationInput::new()
            .with(Field::PeriodMonths, "4294967295")
            .with(Field::RetirementAge, "4294967296");
        assert_eq!(input.required_count(Field::PeriodMonths), Ok(u32::MAX));
        assert_eq!(
            input.required_count(Field::RetirementAge),
            Err(ValidationError::InvalidNumber {
                field: Field::RetirementAge,
                value: "4294967296".to_string(),
            })
        );
    }

    #[test]
    fn required_count_rejects_fractions() {
        let input = SimulationInput::new()
            .with(Field::PeriodMonths, "12")
            .with(Field::CurrentAge, "30,5");
        assert_eq!(input.required_count(Field::PeriodMonths), Ok(12));
        assert!(matches!(
            input.required_count(Field::CurrentAge),
            Err(ValidationError::InvalidNumber { field: Field::CurrentAge, .. })
        ));
    }
}
