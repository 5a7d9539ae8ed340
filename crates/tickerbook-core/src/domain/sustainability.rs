use std::fmt::{Display, Formatter};

/// Controversy severity as published on the sustainability page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ControversyLevel {
    Negligible,
    Low,
    Moderate,
    Significant,
    High,
    Severe,
}

impl ControversyLevel {
    pub const ALL: [ControversyLevel; 6] = [
        Self::Negligible,
        Self::Low,
        Self::Moderate,
        Self::Significant,
        Self::High,
        Self::Severe,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Negligible => "Negligible",
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::Significant => "Significant",
            Self::High => "High",
            Self::Severe => "Severe",
        }
    }

    /// First level named anywhere in `text`, case-insensitive.
    pub fn find_in(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| lowered.contains(&level.as_str().to_lowercase()))
    }

    /// Maps the provider's `highestControversy` (0–5) onto the six levels.
    pub fn from_highest_controversy(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let index = value.round().min(5.0) as usize;
        Self::ALL.get(index).copied()
    }
}

impl Display for ControversyLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product involvement areas listed on the sustainability page.
pub const INVOLVEMENT_AREAS: &[&str] = &[
    "Adult Entertainment",
    "Alcohol",
    "Animal Testing",
    "Controversial Weapons",
    "Small Arms",
    "Fur and Specialty Leather",
    "Gambling",
    "Genetic Engineering",
    "Military Contracting",
    "Nuclear",
    "Pesticides",
    "Palm Oil",
    "Thermal Coal",
    "Tobacco",
];

/// `(area name, esgScores flag key)` for the structured fallback.
pub const INVOLVEMENT_FLAGS: &[(&str, &str)] = &[
    ("Adult Entertainment", "adult"),
    ("Alcohol", "alcoholic"),
    ("Animal Testing", "animalTesting"),
    ("Catholic Values", "catholic"),
    ("Controversial Weapons", "controversialWeapons"),
    ("Small Arms", "smallArms"),
    ("Fur and Specialty Leather", "furLeather"),
    ("Gambling", "gambling"),
    ("Genetic Engineering", "gmo"),
    ("Military Contracting", "militaryContract"),
    ("Nuclear", "nuclear"),
    ("Pesticides", "pesticides"),
    ("Palm Oil", "palmOil"),
    ("Thermal Coal", "coal"),
    ("Tobacco", "tobacco"),
];

const MARKET_TERMS: &[&str] = &[
    "market", "stock", "stocks", "indices", "bonds", "rates", "futures", "currencies", "crypto",
    "etfs", "mutual", "options",
];

/// Words that qualify a scraped involvement value.
const INVOLVEMENT_VALUE_HINTS: &[&str] = &["yes", "no", "%", "minor", "major", "significant"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Involvement {
    pub category: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SustainabilityReport {
    pub controversy_level: Option<ControversyLevel>,
    pub involvements: Vec<Involvement>,
}

impl SustainabilityReport {
    pub fn is_empty(&self) -> bool {
        self.controversy_level.is_none() && self.involvements.is_empty()
    }

    /// Adds an involvement unless it looks like navigation noise (market
    /// menus, ticker links) or duplicates an existing category.
    pub fn push_involvement(&mut self, category: &str, value: &str) {
        let category = collapse_whitespace(category);
        let value = collapse_whitespace(value);
        if category.is_empty() || is_noise_label(&category) || value == "19" {
            return;
        }
        if self
            .involvements
            .iter()
            .any(|existing| existing.category.eq_ignore_ascii_case(&category))
        {
            return;
        }
        self.involvements.push(Involvement { category, value });
    }
}

/// Splits a `Category: value` span; spans without a colon are ignored.
pub fn split_involvement(text: &str) -> Option<(&str, &str)> {
    let (category, value) = text.split_once(':')?;
    let category = category.trim();
    (!category.is_empty() && !category.starts_with("Product Involvement"))
        .then_some((category, value.trim()))
}

pub fn is_involvement_value(text: &str) -> bool {
    let lowered = text.to_lowercase();
    INVOLVEMENT_VALUE_HINTS.iter().any(|hint| lowered.contains(hint))
}

/// True for market-menu entries and ticker-like labels (`AAPL`, `XYZ Inc.`).
pub fn is_noise_label(label: &str) -> bool {
    let lowered = label.to_lowercase();
    if MARKET_TERMS.iter().any(|term| lowered.contains(term)) {
        return true;
    }
    if label.contains("Inc.") {
        return true;
    }
    label.split_whitespace().next().is_some_and(|first| {
        first.len() <= 5
            && first.chars().any(|ch| ch.is_ascii_alphabetic())
            && first
                .chars()
                .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '.')
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controversy_levels_parse_from_text_and_scale() {
        assert_eq!(
            ControversyLevel::find_in("Controversy level: SIGNIFICANT"),
            Some(ControversyLevel::Significant)
        );
        assert_eq!(ControversyLevel::find_in("none"), None);
        assert_eq!(
            ControversyLevel::from_highest_controversy(0.0),
            Some(ControversyLevel::Negligible)
        );
        assert_eq!(
            ControversyLevel::from_highest_controversy(3.0),
            Some(ControversyLevel::Significant)
        );
        assert_eq!(
            ControversyLevel::from_highest_controversy(9.0),
            Some(ControversyLevel::Severe)
        );
        assert_eq!(ControversyLevel::from_highest_controversy(-1.0), None);
    }

    #[test]
    fn noise_labels_are_filtered() {
        let mut report = SustainabilityReport::default();
        report.push_involvement("Alcohol", "No");
        report.push_involvement("Stock Market News", "Yes");
        report.push_involvement("AAPL Apple", "Yes");
        report.push_involvement("Acme Inc.", "Yes");
        report.push_involvement("Gambling", "19");
        report.push_involvement("alcohol", "Yes");
        report.push_involvement("Thermal  Coal", "Minor");

        let categories: Vec<&str> = report
            .involvements
            .iter()
            .map(|involvement| involvement.category.as_str())
            .collect();
        assert_eq!(categories, vec!["Alcohol", "Thermal Coal"]);
    }

    #[test]
    fn involvement_spans_split_on_colon() {
        assert_eq!(split_involvement("Tobacco: No"), Some(("Tobacco", "No")));
        assert_eq!(split_involvement("Product Involvement Areas: x"), None);
        assert_eq!(split_involvement("Gambling"), None);
        assert!(is_involvement_value("Yes (5%)"));
        assert!(!is_involvement_value("Learn more"));
    }
}
