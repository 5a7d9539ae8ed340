use crate::domain::date::CalendarDate;
use crate::domain::quality::DataQuality;

/// Fraction of the total score used for a missing component.
pub const COMPONENT_ESTIMATE_FRACTION: f64 = 0.33;

/// Accepts scores inside `[0, 100]`; anything else is treated as missing.
pub fn valid_score(value: Option<f64>) -> Option<f64> {
    value.filter(|score| score.is_finite() && (0.0..=100.0).contains(score))
}

/// Latest published ESG snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EsgComponents {
    pub total: Option<f64>,
    pub environmental: Option<f64>,
    pub social: Option<f64>,
    pub governance: Option<f64>,
    pub controversy_level: Option<String>,
}

impl EsgComponents {
    /// Keeps only in-range scores.
    pub fn sanitized(self) -> Self {
        Self {
            total: valid_score(self.total),
            environmental: valid_score(self.environmental),
            social: valid_score(self.social),
            governance: valid_score(self.governance),
            controversy_level: self.controversy_level.filter(|level| !level.trim().is_empty()),
        }
    }

    /// Fills fields this snapshot lacks from `other`.
    pub fn fill_from(&mut self, other: EsgComponents) {
        let other = other.sanitized();
        self.total = valid_score(self.total).or(other.total);
        self.environmental = valid_score(self.environmental).or(other.environmental);
        self.social = valid_score(self.social).or(other.social);
        self.governance = valid_score(self.governance).or(other.governance);
        if self.controversy_level.is_none() {
            self.controversy_level = other.controversy_level;
        }
    }

    pub fn has_any_score(&self) -> bool {
        [self.total, self.environmental, self.social, self.governance]
            .iter()
            .any(|score| valid_score(*score).is_some())
    }

    pub fn is_complete(&self) -> bool {
        valid_score(self.total).is_some()
            && valid_score(self.environmental).is_some()
            && valid_score(self.social).is_some()
            && valid_score(self.governance).is_some()
    }
}

/// One dated point of a provider ESG series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EsgObservation {
    pub timestamp: i64,
    pub total: Option<f64>,
    pub environmental: Option<f64>,
    pub social: Option<f64>,
    pub governance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EsgRecord {
    pub date: CalendarDate,
    pub total_score: f64,
    pub environmental: f64,
    pub social: f64,
    pub governance: f64,
    pub controversy_level: Option<String>,
    pub data_quality: DataQuality,
}

/// Dated ESG records (newest first) plus the snapshot they were built from.
#[derive(Debug, Clone, PartialEq)]
pub struct EsgReport {
    pub records: Vec<EsgRecord>,
    pub latest: EsgComponents,
    pub note: String,
}

impl EsgReport {
    /// Builds the report from a (possibly empty) series and the latest
    /// snapshot. Without a series, a snapshot total becomes a single point
    /// dated `today`. Returns `None` when no total score exists anywhere.
    pub fn build(
        series: Vec<EsgObservation>,
        snapshot: EsgComponents,
        today: CalendarDate,
    ) -> Option<Self> {
        let snapshot = snapshot.sanitized();

        let mut points: Vec<(i64, CalendarDate, EsgObservation)> = series
            .into_iter()
            .filter(|point| valid_score(point.total).is_some())
            .filter_map(|point| {
                CalendarDate::from_epoch_seconds(point.timestamp).map(|date| (point.timestamp, date, point))
            })
            .collect();
        points.sort_by(|a, b| b.0.cmp(&a.0));
        points.dedup_by(|later, earlier| later.1 == earlier.1);

        let single_snapshot_point = points.is_empty();
        if single_snapshot_point {
            let total = snapshot.total?;
            points.push((
                0,
                today,
                EsgObservation {
                    timestamp: 0,
                    total: Some(total),
                    ..EsgObservation::default()
                },
            ));
        }

        let records = points
            .into_iter()
            .filter_map(|(_, date, point)| {
                let total_score = valid_score(point.total)?;
                let estimate = total_score * COMPONENT_ESTIMATE_FRACTION;
                let components = [
                    component(point.environmental, snapshot.environmental),
                    component(point.social, snapshot.social),
                    component(point.governance, snapshot.governance),
                ];
                let data_quality = if components.iter().any(Option::is_none) {
                    DataQuality::Estimated
                } else if date != today && components.iter().flatten().any(|(_, from_snapshot)| *from_snapshot) {
                    DataQuality::Extrapolated
                } else {
                    DataQuality::Observed
                };
                let [environmental, social, governance] =
                    components.map(|value| value.map_or(estimate, |(score, _)| score));

                Some(EsgRecord {
                    date,
                    total_score,
                    environmental,
                    social,
                    governance,
                    controversy_level: snapshot.controversy_level.clone(),
                    data_quality,
                })
            })
            .collect();

        let note = if single_snapshot_point {
            String::from(
                "Only a current total score is published; the series holds a single point dated today.",
            )
        } else {
            String::from(
                "Current component values (historical components not available); earlier dates using them are tagged extrapolated.",
            )
        };

        Some(Self {
            records,
            latest: snapshot,
            note,
        })
    }
}

/// Score for one component and whether it came from the snapshot rather
/// than the dated point.
fn component(point: Option<f64>, snapshot: Option<f64>) -> Option<(f64, bool)> {
    valid_score(point)
        .map(|score| (score, false))
        .or_else(|| snapshot.map(|score| (score, true)))
}
