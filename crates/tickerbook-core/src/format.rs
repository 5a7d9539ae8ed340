//! Display formatting for numeric provider values.
//!
//! | Helper | Example |
//! |--------|---------|
//! | [`magnitude`] | `2_500_000_000.0` → `2.50B` |
//! | [`money`] | `2_500_000_000.0` → `$2.50B` |
//! | [`percent`] | `0.07` → `7.00%` |
//! | [`thousands`] | `1234567.0` → `1,234,567` |

const TRILLION: f64 = 1_000_000_000_000.0;
const BILLION: f64 = 1_000_000_000.0;
const MILLION: f64 = 1_000_000.0;

/// Renders a value with a `T`/`B`/`M` suffix chosen by magnitude.
pub fn magnitude(value: f64, decimals: usize) -> String {
    let abs = value.abs();
    if abs >= TRILLION {
        format!("{:.*}T", decimals, value / TRILLION)
    } else if abs >= BILLION {
        format!("{:.*}B", decimals, value / BILLION)
    } else if abs >= MILLION {
        format!("{:.*}M", decimals, value / MILLION)
    } else {
        format!("{value:.decimals$}")
    }
}

pub fn money(value: f64) -> String {
    if value < 0.0 {
        format!("-${}", magnitude(-value, 2))
    } else {
        format!("${}", magnitude(value, 2))
    }
}

/// Percent rendering. Fractions (`|value| < 1`) are scaled by 100 unless the
/// field is already published as a percentage.
pub fn percent(value: f64, already_percent: bool) -> String {
    if value.abs() < 1.0 && !already_percent {
        format!("{:.2}%", value * 100.0)
    } else {
        format!("{value:.2}%")
    }
}

pub fn fixed2(value: f64) -> String {
    format!("{value:.2}")
}

/// Integer rendering with comma grouping.
pub fn thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Parses display numbers such as `3.12T`, `$1,234.50`, `-12.5%` or `(1,200)`.
pub fn parse_display_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "N/A" || trimmed == "--" || trimmed == "-" {
        return None;
    }

    let negative_parens = trimmed.starts_with('(') && trimmed.ends_with(')');
    let cleaned: String = trimmed
        .chars()
        .filter(|ch| !matches!(ch, ',' | '$' | '%' | '(' | ')' | ' '))
        .collect();

    let (number, scale) = match cleaned.chars().last()? {
        'T' | 't' => (&cleaned[..cleaned.len() - 1], TRILLION),
        'B' | 'b' => (&cleaned[..cleaned.len() - 1], BILLION),
        'M' | 'm' => (&cleaned[..cleaned.len() - 1], MILLION),
        'k' | 'K' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        _ => (cleaned.as_str(), 1.0),
    };

    let value = number.parse::<f64>().ok()? * scale;
    if !value.is_finite() {
        return None;
    }
    Some(if negative_parens { -value } else { value })
}
