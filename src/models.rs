//! Wire model for the release-plan API.
//!
//! These structs match the backend JSON verbatim. Date fields arrive as raw
//! ISO-8601 strings and may be absent, empty, or malformed; they stay raw
//! here and are parsed per item at layout time, so one dirty item never
//! poisons the batch.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// The three fixed item categories, each rendered in its own visual lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Epic,
    Feature,
    Sprint,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[Category::Epic, Category::Feature, Category::Sprint]
    }

    /// Lowercase class name, matching the upstream payload keys.
    pub fn class_name(&self) -> &'static str {
        match self {
            Category::Epic => "epic",
            Category::Feature => "feature",
            Category::Sprint => "sprint",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.class_name())
    }
}

/// One timeline item (epic, feature, or sprint).
///
/// `id` comes from the upstream tracker (an integer for work items, a GUID
/// string for sprints) and is carried opaquely; `name` is the row key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl PlanItem {
    pub fn new(name: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            start_date: Some(start.into()),
            end_date: Some(end.into()),
        }
    }

    /// True when both date fields are present and non-empty (not yet parsed).
    pub fn has_complete_dates(&self) -> bool {
        fn present(field: &Option<String>) -> bool {
            field.as_deref().is_some_and(|s| !s.trim().is_empty())
        }
        present(&self.start_date) && present(&self.end_date)
    }

    pub fn start_parsed(&self) -> Option<NaiveDateTime> {
        parse_plan_date(self.start_date.as_deref()?)
    }

    pub fn end_parsed(&self) -> Option<NaiveDateTime> {
        parse_plan_date(self.end_date.as_deref()?)
    }
}

/// Parse a date string as the backend emits them: either a full RFC 3339
/// timestamp (`2024-01-02T00:00:00Z`), a naive timestamp, or a bare
/// calendar date. Empty and unparseable strings yield `None`.
pub fn parse_plan_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// A full release plan. Any of the three lanes may be absent or empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReleasePlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epics: Option<Vec<PlanItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<PlanItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprints: Option<Vec<PlanItem>>,
}

impl ReleasePlan {
    pub fn lane(&self, category: Category) -> &[PlanItem] {
        let lane = match category {
            Category::Epic => &self.epics,
            Category::Feature => &self.features,
            Category::Sprint => &self.sprints,
        };
        lane.as_deref().unwrap_or(&[])
    }

    /// All items in lane order: epics, then features, then sprints.
    pub fn all_items(&self) -> impl Iterator<Item = &PlanItem> {
        Category::all().iter().flat_map(|c| self.lane(*c).iter())
    }

    pub fn item_count(&self) -> usize {
        self.all_items().count()
    }

    /// True when every lane is absent or empty; such a payload is never
    /// rendered.
    pub fn is_structurally_empty(&self) -> bool {
        Category::all().iter().all(|c| self.lane(*c).is_empty())
    }
}

/// Selectable view types for the customize-view endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewType {
    #[default]
    All,
    Epics,
    Features,
    Sprints,
}

impl ViewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewType::All => "all",
            ViewType::Epics => "epics",
            ViewType::Features => "features",
            ViewType::Sprints => "sprints",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            ViewType::All => ViewType::Epics,
            ViewType::Epics => ViewType::Features,
            ViewType::Features => ViewType::Sprints,
            ViewType::Sprints => ViewType::All,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            ViewType::All => ViewType::Sprints,
            ViewType::Epics => ViewType::All,
            ViewType::Features => ViewType::Epics,
            ViewType::Sprints => ViewType::Features,
        }
    }
}

impl std::fmt::Display for ViewType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/customize_view`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomizeViewRequest {
    pub view_type: String,
    pub filters: ViewFilters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewFilters {
    pub name: String,
}

impl CustomizeViewRequest {
    pub fn new(view_type: ViewType, name_filter: impl Into<String>) -> Self {
        Self {
            view_type: view_type.as_str().to_string(),
            filters: ViewFilters { name: name_filter.into() },
        }
    }
}

/// Body of `GET /api/test_connection`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionProbe {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl ConnectionProbe {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_upstream_date_forms() {
        let bare = parse_plan_date("2024-01-01").unwrap();
        let stamped = parse_plan_date("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(bare, stamped);
        assert!(parse_plan_date("2024-03-15T09:30:00").is_some());
    }

    #[test]
    fn rejects_empty_and_malformed_dates() {
        assert!(parse_plan_date("").is_none());
        assert!(parse_plan_date("   ").is_none());
        assert!(parse_plan_date("not-a-date").is_none());
        assert!(parse_plan_date("2024-13-40").is_none());
    }

    #[test]
    fn item_date_completeness() {
        let ok = PlanItem::new("A", "2024-01-01", "2024-01-10");
        assert!(ok.has_complete_dates());

        let empty_end = PlanItem::new("B", "2024-01-01", "");
        assert!(!empty_end.has_complete_dates());

        let missing: PlanItem = serde_json::from_str(r#"{"name":"C"}"#).unwrap();
        assert!(!missing.has_complete_dates());
    }

    #[test]
    fn deserializes_upstream_payload_shapes() {
        // Work items carry integer ids, sprints carry GUID strings, and any
        // lane may be missing entirely.
        let plan: ReleasePlan = serde_json::from_str(
            r#"{
                "epics": [{"id": 12, "name": "Checkout", "startDate": "2024-01-01T00:00:00Z", "endDate": "2024-03-01T00:00:00Z"}],
                "sprints": [{"id": "a1b2", "name": "Sprint 1", "startDate": "", "endDate": ""}]
            }"#,
        )
        .unwrap();

        assert_eq!(plan.lane(Category::Epic).len(), 1);
        assert!(plan.features.is_none());
        assert_eq!(plan.lane(Category::Feature).len(), 0);
        assert_eq!(plan.item_count(), 2);
        assert!(!plan.is_structurally_empty());
    }

    #[test]
    fn empty_plan_is_structurally_empty() {
        let absent: ReleasePlan = serde_json::from_str("{}").unwrap();
        assert!(absent.is_structurally_empty());

        let empty: ReleasePlan =
            serde_json::from_str(r#"{"epics": [], "features": [], "sprints": []}"#).unwrap();
        assert!(empty.is_structurally_empty());
    }

    #[test]
    fn customize_request_wire_shape() {
        let req = CustomizeViewRequest::new(ViewType::Epics, "check");
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["view_type"], "epics");
        assert_eq!(body["filters"]["name"], "check");
    }
}
