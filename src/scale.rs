//! Time and band scales for the timeline chart.
//!
//! Scales are cheap values rebuilt from scratch on every render pass: a
//! continuous mapping from calendar dates to a column range, and a discrete
//! mapping from item names to padded row slots. `build_scales` implements
//! the shared-axis rule: one time domain spanning every valid date across
//! all three lanes, one band domain covering every item name.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::{parse_plan_date, ReleasePlan};

/// Padding between bands, as a fraction of the band step. Applied on both
/// the inner gaps and the outer edges, like the chart this replaces.
pub const BAND_PADDING: f64 = 0.1;

/// Reasons the scale pair cannot be built from a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScaleError {
    /// Every lane is absent or empty.
    #[error("invalid release plan structure: no epics, features, or sprints")]
    InvalidStructure,
    /// Items exist, but not one date string parses to a valid calendar date.
    #[error("no valid dates found in the release plan")]
    NoValidDates,
}

/// Continuous mapping from datetimes to a fractional pixel/column range.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeScale {
    domain: (NaiveDateTime, NaiveDateTime),
    range: (f64, f64),
}

impl TimeScale {
    pub fn new(domain: (NaiveDateTime, NaiveDateTime), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (NaiveDateTime, NaiveDateTime) {
        self.domain
    }

    /// Map a datetime into the range. A degenerate domain (min == max) maps
    /// every input to the range midpoint so outputs stay finite.
    pub fn scale(&self, t: NaiveDateTime) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = (d1 - d0).num_seconds() as f64;
        if span == 0.0 {
            return r0 + (r1 - r0) * 0.5;
        }
        let frac = (t - d0).num_seconds() as f64 / span;
        r0 + frac * (r1 - r0)
    }

    /// Evenly spaced tick datetimes across the domain, endpoints included.
    pub fn ticks(&self, count: usize) -> Vec<NaiveDateTime> {
        let (d0, d1) = self.domain;
        if count < 2 || d0 == d1 {
            return vec![d0];
        }
        let span = d1 - d0;
        (0..count)
            .map(|i| d0 + span * i as i32 / (count - 1) as i32)
            .collect()
    }

    /// Days spanned by the domain; drives tick label formatting.
    pub fn span_days(&self) -> i64 {
        (self.domain.1 - self.domain.0).num_days()
    }
}

/// Discrete mapping from ordered item names to equal-width row slots with
/// inter-slot padding.
#[derive(Debug, Clone)]
pub struct BandScale {
    domain: Vec<String>,
    index: HashMap<String, usize>,
    start: f64,
    step: f64,
    bandwidth: f64,
}

impl BandScale {
    /// Build from an ordered name sequence. Duplicate names keep their first
    /// occurrence, so an epic and a sprint sharing a name share a row.
    pub fn new<I, S>(names: I, range: (f64, f64), padding: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut domain: Vec<String> = Vec::new();
        let mut index = HashMap::new();
        for name in names {
            let name = name.into();
            if !index.contains_key(&name) {
                index.insert(name.clone(), domain.len());
                domain.push(name);
            }
        }

        let (r0, r1) = range;
        let width = r1 - r0;
        let n = domain.len() as f64;
        let step = width / (n - padding + padding * 2.0).max(1.0);
        // Center the occupied slots within the range.
        let start = r0 + (width - step * (n - padding)) * 0.5;
        let bandwidth = step * (1.0 - padding);

        Self { domain, index, start, step, bandwidth }
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn len(&self) -> usize {
        self.domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }

    /// Top edge of the named band, or `None` for names outside the domain.
    pub fn position(&self, name: &str) -> Option<f64> {
        self.index.get(name).map(|i| self.start + self.step * *i as f64)
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// `(name, band center)` pairs in domain order, for the band axis ticks.
    pub fn centers(&self) -> impl Iterator<Item = (&str, f64)> {
        self.domain.iter().enumerate().map(|(i, name)| {
            (name.as_str(), self.start + self.step * i as f64 + self.bandwidth * 0.5)
        })
    }
}

/// Scan the plan for its shared time domain: the min and max of every date
/// string that parses, across all lanes. Unparseable values are logged and
/// dropped individually; they never abort the scan.
fn collect_time_domain(
    plan: &ReleasePlan,
) -> Result<(NaiveDateTime, NaiveDateTime), ScaleError> {
    if plan.is_structurally_empty() {
        return Err(ScaleError::InvalidStructure);
    }

    let mut bounds: Option<(NaiveDateTime, NaiveDateTime)> = None;
    for item in plan.all_items() {
        for raw in [item.start_date.as_deref(), item.end_date.as_deref()] {
            let Some(raw) = raw else { continue };
            if raw.trim().is_empty() {
                continue;
            }
            match parse_plan_date(raw) {
                Some(t) => {
                    bounds = Some(match bounds {
                        Some((min, max)) => (min.min(t), max.max(t)),
                        None => (t, t),
                    });
                }
                None => {
                    log::warn!("dropping unparseable date {:?} on item {:?}", raw, item.name);
                }
            }
        }
    }

    bounds.ok_or(ScaleError::NoValidDates)
}

/// Check whether a payload can produce a scale pair at all, independent of
/// viewport size. Used at accept time so an invalid payload never replaces
/// the chart currently on screen.
pub fn validate_plan(plan: &ReleasePlan) -> Result<(), ScaleError> {
    collect_time_domain(plan).map(|_| ())
}

/// Build the scale pair for one render pass: time scale over `[0, width]`,
/// band scale over `[0, height]` keyed by item name in lane order.
pub fn build_scales(
    plan: &ReleasePlan,
    width: f64,
    height: f64,
) -> Result<(TimeScale, BandScale), ScaleError> {
    let domain = collect_time_domain(plan)?;
    let time = TimeScale::new(domain, (0.0, width));
    let band = BandScale::new(
        plan.all_items().map(|item| item.name.clone()),
        (0.0, height),
        BAND_PADDING,
    );
    Ok((time, band))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlanItem;

    fn dt(s: &str) -> NaiveDateTime {
        parse_plan_date(s).unwrap()
    }

    fn plan_with(
        epics: Vec<PlanItem>,
        features: Vec<PlanItem>,
        sprints: Vec<PlanItem>,
    ) -> ReleasePlan {
        ReleasePlan {
            epics: Some(epics),
            features: Some(features),
            sprints: Some(sprints),
        }
    }

    #[test]
    fn time_domain_spans_all_lanes() {
        let plan = plan_with(
            vec![PlanItem::new("E1", "2024-02-01", "2024-04-01")],
            vec![PlanItem::new("F1", "2024-01-15", "2024-02-20")],
            vec![PlanItem::new("S1", "2024-03-01", "2024-05-01")],
        );
        let (time, band) = build_scales(&plan, 900.0, 450.0).unwrap();

        assert_eq!(time.domain(), (dt("2024-01-15"), dt("2024-05-01")));
        assert_eq!(band.domain(), ["E1", "F1", "S1"]);
    }

    #[test]
    fn empty_structure_fails() {
        assert_eq!(
            build_scales(&ReleasePlan::default(), 900.0, 450.0).unwrap_err(),
            ScaleError::InvalidStructure
        );
        let empty = plan_with(vec![], vec![], vec![]);
        assert_eq!(
            build_scales(&empty, 900.0, 450.0).unwrap_err(),
            ScaleError::InvalidStructure
        );
    }

    #[test]
    fn dateless_items_fail_with_no_valid_dates() {
        let plan = plan_with(
            vec![PlanItem::new("E1", "", "")],
            vec![PlanItem::new("F1", "garbage", "also garbage")],
            vec![],
        );
        assert_eq!(
            build_scales(&plan, 900.0, 450.0).unwrap_err(),
            ScaleError::NoValidDates
        );
        assert_eq!(validate_plan(&plan), Err(ScaleError::NoValidDates));
    }

    #[test]
    fn one_bad_date_does_not_abort_the_batch() {
        let plan = plan_with(
            vec![PlanItem::new("E1", "not-a-date", "2024-06-01")],
            vec![PlanItem::new("F1", "2024-01-01", "2024-02-01")],
            vec![],
        );
        let (time, _) = build_scales(&plan, 900.0, 450.0).unwrap();
        assert_eq!(time.domain(), (dt("2024-01-01"), dt("2024-06-01")));
    }

    #[test]
    fn time_scale_maps_domain_to_range() {
        let time = TimeScale::new((dt("2024-01-01"), dt("2024-01-11")), (0.0, 100.0));
        assert_eq!(time.scale(dt("2024-01-01")), 0.0);
        assert_eq!(time.scale(dt("2024-01-11")), 100.0);
        assert_eq!(time.scale(dt("2024-01-06")), 50.0);
        // Out-of-domain values extrapolate, they do not clamp.
        assert_eq!(time.scale(dt("2024-01-21")), 200.0);
    }

    #[test]
    fn degenerate_domain_maps_to_midpoint() {
        let time = TimeScale::new((dt("2024-01-01"), dt("2024-01-01")), (0.0, 100.0));
        let x = time.scale(dt("2024-01-01"));
        assert!(x.is_finite());
        assert_eq!(x, 50.0);
        assert_eq!(time.scale(dt("2030-12-31")), 50.0);
    }

    #[test]
    fn band_scale_padding_layout() {
        let band = BandScale::new(["A", "B", "C", "D"], (0.0, 450.0), 0.1);
        let step = 450.0 / (4.0 - 0.1 + 0.2);
        assert!((band.bandwidth() - step * 0.9).abs() < 1e-9);

        let a = band.position("A").unwrap();
        let b = band.position("B").unwrap();
        assert!((b - a - step).abs() < 1e-9);
        assert!(a > 0.0);

        // Last band ends one outer pad short of the range end.
        let d = band.position("D").unwrap();
        assert!(d + band.bandwidth() < 450.0);
        assert!(band.position("missing").is_none());
    }

    #[test]
    fn band_scale_keeps_first_duplicate() {
        let band = BandScale::new(["A", "B", "A"], (0.0, 300.0), 0.1);
        assert_eq!(band.len(), 2);
        assert_eq!(band.domain(), ["A", "B"]);
    }

    #[test]
    fn ticks_cover_the_domain() {
        let time = TimeScale::new((dt("2024-01-01"), dt("2024-01-31")), (0.0, 300.0));
        let ticks = time.ticks(4);
        assert_eq!(ticks.first().copied(), Some(dt("2024-01-01")));
        assert_eq!(ticks.last().copied(), Some(dt("2024-01-31")));
        assert_eq!(ticks.len(), 4);
    }
}
