/// Locale settings for money and percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyFormat {
    pub symbol: &'static str,
    /// Space between symbol and amount.
    pub spaced: bool,
    pub thousands: char,
    pub decimal: char,
}

impl CurrencyFormat {
    pub const fn brl() -> Self {
        Self {
            symbol: "R$",
            spaced: true,
            thousands: '.',
            decimal: ',',
        }
    }

    pub const fn usd() -> Self {
        Self {
            symbol: "$",
            spaced: false,
            thousands: ',',
            decimal: '.',
        }
    }

    pub fn money(&self, value: f64) -> String {
        let amount = self.number(value.abs(), 2);
        let sign = if value < 0.0 && amount.chars().any(|c| c.is_ascii_digit() && c != '0') {
            "-"
        } else {
            ""
        };
        let gap = if self.spaced { " " } else { "" };
        format!("{sign}{}{gap}{amount}", self.symbol)
    }

    /// Renders a fraction as a percentage, `0.125` -> `12,50%`.
    pub fn percent(&self, fraction: f64, decimals: usize) -> String {
        let pct = fraction * 100.0;
        let body = self.number(pct.abs(), decimals);
        let sign = if pct < 0.0 { "-" } else { "" };
        format!("{sign}{body}%")
    }

    fn number(&self, value: f64, decimals: usize) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let fixed = format!("{value:.decimals$}");
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (fixed.as_str(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (idx, ch) in int_part.chars().enumerate() {
            if idx > 0 && (int_part.len() - idx) % 3 == 0 {
                grouped.push(self.thousands);
            }
            grouped.push(ch);
        }
        if let Some(frac) = frac_part {
            grouped.push(self.decimal);
            grouped.push_str(frac);
        }
        grouped
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self::brl()
    }
}

pub fn format_currency(value: f64) -> String {
    CurrencyFormat::brl().money(value)
}

pub fn format_percent(fraction: f64) -> String {
    CurrencyFormat::brl().percent(fraction, 2)
}

/// `38` -> `3 years and 2 months`.
pub fn format_duration(months: u32) -> String {
    let years = months / 12;
    let rem = months % 12;
    let plural = |n: u32, one: &str, many: &str| {
        if n == 1 {
            format!("{n} {one}")
        } else {
            format!("{n} {many}")
        }
    };
    match (years, rem) {
        (0, m) => plural(m, "month", "months"),
        (y, 0) => plural(y, "year", "years"),
        (y, m) => format!(
            "{} and {}",
            plural(y, "year", "years"),
            plural(m, "month", "months")
        ),
    }
}
