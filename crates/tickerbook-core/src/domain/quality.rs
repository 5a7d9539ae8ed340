use std::fmt::{Display, Formatter};

/// Text shown for a value no source published.
pub const NOT_AVAILABLE: &str = "N/A";

/// Where a displayed value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Structured provider endpoint or module.
    Primary,
    /// Parsed out of a rendered provider page.
    Scraped,
    /// Derived from other observed values.
    Estimated,
    /// Randomized plausible value.
    Placeholder,
    /// Fixed fallback text.
    Default,
}

impl Provenance {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Scraped => "scraped",
            Self::Estimated => "estimated",
            Self::Placeholder => "placeholder",
            Self::Default => "default",
        }
    }

    pub const fn is_synthetic(self) -> bool {
        matches!(self, Self::Estimated | Self::Placeholder | Self::Default)
    }

    /// Suffix appended to rendered values so guesses never read as facts.
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Primary | Self::Scraped => "",
            Self::Estimated => " (est.)",
            Self::Placeholder => " (placeholder)",
            Self::Default => " (default)",
        }
    }
}

impl Display for Provenance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality tag carried by ESG records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataQuality {
    /// All component scores were published.
    Observed,
    /// At least one component was derived from the total score.
    Estimated,
    /// Components were carried back from the current snapshot onto an
    /// earlier date.
    Extrapolated,
}

impl DataQuality {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Observed => "observed",
            Self::Estimated => "estimated",
            Self::Extrapolated => "extrapolated",
        }
    }
}

/// A value paired with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Sourced<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> Sourced<T> {
    pub fn new(value: T, provenance: Provenance) -> Self {
        Self { value, provenance }
    }

    pub fn primary(value: T) -> Self {
        Self::new(value, Provenance::Primary)
    }

    pub fn scraped(value: T) -> Self {
        Self::new(value, Provenance::Scraped)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sourced<U> {
        Sourced {
            value: f(self.value),
            provenance: self.provenance,
        }
    }
}

impl Sourced<String> {
    /// Placeholder for a missing value. It stays replaceable like any
    /// default but renders without a marker.
    pub fn not_available() -> Self {
        Self::new(String::from(NOT_AVAILABLE), Provenance::Default)
    }

    /// Rendered text with the provenance marker appended. Missing values
    /// render as a bare `N/A`.
    pub fn display(&self) -> String {
        if self.value == NOT_AVAILABLE {
            return self.value.clone();
        }
        format!("{}{}", self.value, self.provenance.marker())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observed_sources_render_without_marker() {
        assert_eq!(Sourced::primary(String::from("1.20")).display(), "1.20");
        assert_eq!(Sourced::scraped(String::from("1.20")).display(), "1.20");
    }

    #[test]
    fn synthetic_sources_are_always_marked() {
        for provenance in [
            Provenance::Estimated,
            Provenance::Placeholder,
            Provenance::Default,
        ] {
            assert!(provenance.is_synthetic());
            let rendered = Sourced::new(String::from("1.20"), provenance).display();
            assert_ne!(rendered, "1.20", "{provenance} must carry a marker");
        }
    }

    #[test]
    fn missing_values_render_without_default_marker() {
        let missing = Sourced::not_available();
        assert_eq!(missing.provenance, Provenance::Default);
        assert_eq!(missing.display(), "N/A");
    }
}
