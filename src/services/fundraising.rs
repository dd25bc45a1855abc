use crate::domain::Translation;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundraisingProgress {
    pub current: f64,
    pub goal: f64,
    pub percentage: u8,
    pub is_completed: bool,
    pub formatted_current: String,
    pub formatted_goal: String,
}

impl FundraisingProgress {
    /// `None` when there is no positive goal, in which case nothing about
    /// fundraising is shown.
    pub fn new(current: Option<f64>, goal: Option<f64>) -> Option<Self> {
        let goal = goal.filter(|g| *g > 0.0)?;
        let current = current.unwrap_or(0.0);
        let percentage = ((current / goal) * 100.0).round().clamp(0.0, 100.0) as u8;

        Some(Self {
            current,
            goal,
            percentage,
            is_completed: current >= goal,
            formatted_current: format_amount(current),
            formatted_goal: format_amount(goal),
        })
    }

    pub fn for_translation(translation: &Translation) -> Option<Self> {
        Self::new(
            translation.fundraising_current,
            translation.fundraising_goal,
        )
    }
}

/// Formats an amount the way `uk-UA` does: thousands grouped with a
/// no-break space, a decimal comma and at most three fraction digits,
/// e.g. `12 000` or `1 234,5`.
pub fn format_amount(amount: f64) -> String {
    let thousandths = (amount * 1000.0).round() as i64;
    let whole = (thousandths.unsigned_abs() / 1000).to_string();
    let fraction = thousandths.unsigned_abs() % 1000;

    let mut formatted = String::with_capacity(whole.len() + whole.len() / 3 * 2 + 5);
    if thousandths < 0 {
        formatted.push('-');
    }
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            formatted.push('\u{a0}');
        }
        formatted.push(c);
    }
    if fraction > 0 {
        let digits = format!("{fraction:03}");
        formatted.push(',');
        formatted.push_str(digits.trim_end_matches('0'));
    }

    formatted
}
