use crate::domain::date::{month_end_day, month_name};
use crate::domain::facts::Facts;
use crate::domain::quality::{Provenance, Sourced, NOT_AVAILABLE};
use crate::format;

/// Company profile attributes, each tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyProfile {
    pub name: Sourced<String>,
    pub sector: Sourced<String>,
    pub industry: Sourced<String>,
    pub employees: Sourced<String>,
    pub fiscal_year_end: Sourced<String>,
    pub description: Sourced<String>,
}

impl CompanyProfile {
    /// Profile where every attribute is a fixed fallback.
    pub fn defaults(symbol: &str) -> Self {
        let fallback = |value: &str| Sourced::new(value.to_string(), Provenance::Default);
        Self {
            name: fallback(symbol),
            sector: Sourced::not_available(),
            industry: Sourced::not_available(),
            employees: Sourced::not_available(),
            fiscal_year_end: fallback("December 31"),
            description: fallback("No description available."),
        }
    }

    /// Reads `assetProfile`/`price` facts; attributes the facts lack keep
    /// their current value.
    pub fn apply_facts(&mut self, facts: &Facts) {
        let tagged = |key: &str| {
            facts
                .text(key)
                .map(|text| Sourced::new(text.to_string(), facts.provenance(key).unwrap_or(Provenance::Primary)))
        };

        if let Some(name) = tagged("longName").or_else(|| tagged("shortName")) {
            self.name = name;
        }
        if let Some(sector) = tagged("sector") {
            self.sector = sector;
        }
        if let Some(industry) = tagged("industry") {
            self.industry = industry;
        }
        if let Some(description) = tagged("longBusinessSummary") {
            self.description = description;
        }
        if let Some(count) = facts.number("fullTimeEmployees") {
            let provenance = facts.provenance("fullTimeEmployees").unwrap_or(Provenance::Primary);
            self.employees = Sourced::new(format::thousands(count), provenance);
        }
        if let Some(month) = facts
            .number("fiscalYearEnd")
            .and_then(|month| u8::try_from(month as i64).ok())
            .and_then(fiscal_year_end_label)
        {
            let provenance = facts.provenance("fiscalYearEnd").unwrap_or(Provenance::Primary);
            self.fiscal_year_end = Sourced::new(month, provenance);
        } else if let Some(text) = tagged("fiscalYearEnd") {
            self.fiscal_year_end = text;
        }
    }

    /// Applies `(label, value)` pairs scraped from the profile page.
    pub fn apply_scraped(&mut self, pairs: &[(String, String)]) {
        for (label, value) in pairs {
            let value = value.trim();
            if value.is_empty() || value == NOT_AVAILABLE {
                continue;
            }
            let label = label.trim_end_matches(':').trim().to_ascii_lowercase();
            let slot = match label.as_str() {
                "sector" | "sector(s)" => &mut self.sector,
                "industry" => &mut self.industry,
                "full time employees" => &mut self.employees,
                "fiscal year ends" | "fiscal year end" => &mut self.fiscal_year_end,
                _ => continue,
            };
            if slot.provenance == Provenance::Default {
                *slot = Sourced::scraped(value.to_string());
            }
        }
    }

    pub fn apply_scraped_description(&mut self, description: &str) {
        let description = description.trim();
        if !description.is_empty() && self.description.provenance == Provenance::Default {
            self.description = Sourced::scraped(description.to_string());
        }
    }

    /// True when at least one attribute came from the provider.
    pub fn has_observed(&self) -> bool {
        [
            &self.name,
            &self.sector,
            &self.industry,
            &self.employees,
            &self.fiscal_year_end,
            &self.description,
        ]
        .iter()
        .any(|attribute| !attribute.provenance.is_synthetic())
    }
}

/// `12` → `December 31`.
pub fn fiscal_year_end_label(month: u8) -> Option<String> {
    Some(format!("{} {}", month_name(month)?, month_end_day(month)?))
}
