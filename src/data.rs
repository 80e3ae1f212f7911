use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// Type aliases for clarity
pub type GuestId = String;
pub type TableId = String;
pub type ConstraintId = String;

/// RSVP state of a guest. Declined guests are never moved by the optimizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    #[default]
    Pending,
    Confirmed,
    Declined,
}

/// Kind of social link carried by a relationship edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    Partner,
    Family,
    Friend,
    Colleague,
    Avoid,
    /// Any label this engine does not know; always weighs zero.
    #[serde(other)]
    Unknown,
}

/// A directed, typed edge from the owning guest to `target_guest_id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub target_guest_id: GuestId,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    /// 1 (weak) to 5 (strong).
    #[serde(default = "default_strength", deserialize_with = "clamped_strength")]
    pub strength: u8,
}

fn default_strength() -> u8 {
    3
}

fn clamped_strength<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(1, 5) as u8)
}

/// A person to be seated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: GuestId,
    pub name: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub rsvp_status: RsvpStatus,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub table_id: Option<TableId>,
    #[serde(default)]
    pub seat_index: Option<u32>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

impl Guest {
    pub fn new(id: impl Into<GuestId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            group: None,
            rsvp_status: RsvpStatus::Pending,
            relationships: Vec::new(),
            table_id: None,
            seat_index: None,
            interests: Vec::new(),
            industry: None,
        }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_rsvp(mut self, status: RsvpStatus) -> Self {
        self.rsvp_status = status;
        self
    }

    pub fn with_relationship(
        mut self,
        target: impl Into<GuestId>,
        kind: RelationshipType,
        strength: u8,
    ) -> Self {
        self.relationships.push(Relationship {
            target_guest_id: target.into(),
            kind,
            strength: strength.clamp(1, 5),
        });
        self
    }

    pub fn at_table(mut self, table_id: impl Into<TableId>) -> Self {
        self.table_id = Some(table_id.into());
        self
    }

    pub fn with_interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn is_eligible(&self) -> bool {
        self.rsvp_status != RsvpStatus::Declined
    }

    /// First edge on this guest's own list that points at `target`.
    pub fn relationship_to(&self, target: &str) -> Option<&Relationship> {
        self.relationships
            .iter()
            .find(|r| r.target_guest_id == target)
    }

    /// Non-empty, trimmed group label.
    pub fn group_label(&self) -> Option<&str> {
        self.group
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }
}

/// A capacity-limited seating group. A capacity of zero seats nobody.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Table {
    pub id: TableId,
    pub capacity: u32,
}

impl Table {
    pub fn new(id: impl Into<TableId>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            capacity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintType {
    SameTable,
    DifferentTable,
    MustSitTogether,
    MustNotSitTogether,
    NearFront,
    Accessibility,
    #[serde(other)]
    Unknown,
}

impl ConstraintType {
    pub fn requires_together(self) -> bool {
        matches!(self, Self::SameTable | Self::MustSitTogether)
    }

    pub fn requires_apart(self) -> bool {
        matches!(self, Self::DifferentTable | Self::MustNotSitTogether)
    }
}

impl fmt::Display for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SameTable => "same_table",
            Self::DifferentTable => "different_table",
            Self::MustSitTogether => "must_sit_together",
            Self::MustNotSitTogether => "must_not_sit_together",
            Self::NearFront => "near_front",
            Self::Accessibility => "accessibility",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Required,
    Preferred,
    Optional,
}

/// A user-declared placement rule over a set of guests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    pub id: ConstraintId,
    #[serde(rename = "type")]
    pub kind: ConstraintType,
    pub guest_ids: Vec<GuestId>,
    pub priority: Priority,
    #[serde(default)]
    pub description: Option<String>,
}

impl Constraint {
    pub fn new<I, S>(
        id: impl Into<ConstraintId>,
        kind: ConstraintType,
        priority: Priority,
        guests: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<GuestId>,
    {
        Self {
            id: id.into(),
            kind,
            guest_ids: guests.into_iter().map(Into::into).collect(),
            priority,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A detected breach of a constraint under the current assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintViolation {
    pub constraint_id: ConstraintId,
    pub constraint_type: ConstraintType,
    pub priority: Priority,
    pub guest_ids: Vec<GuestId>,
    pub table_ids: Vec<TableId>,
    pub description: String,
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.constraint_type, self.description)
    }
}

/// Where one guest sat when a snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub guest_id: GuestId,
    pub table_id: Option<TableId>,
    #[serde(default)]
    pub seat_index: Option<u32>,
}

/// Assignment state captured immediately before an optimization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct OptimizationSnapshot {
    pub entries: Vec<SnapshotEntry>,
}

impl OptimizationSnapshot {
    pub fn capture(guests: &[Guest]) -> Self {
        Self {
            entries: guests
                .iter()
                .map(|g| SnapshotEntry {
                    guest_id: g.id.clone(),
                    table_id: g.table_id.clone(),
                    seat_index: g.seat_index,
                })
                .collect(),
        }
    }
}

/// Guests seated at one table, in seat order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableAssignment {
    pub table_id: TableId,
    pub guest_ids: Vec<GuestId>,
}

/// Percentages (0 to 100) reported alongside the headline score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub constraints: u8,
    pub relationships: u8,
    pub groups: u8,
    pub capacity: u8,
    pub overall: u8,
}

/// Conditions the caller should surface even though the pass succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizationWarning {
    NoTablesAvailable,
    InsufficientCapacity { unassigned: usize },
}

impl fmt::Display for OptimizationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTablesAvailable => f.write_str("no tables with free seats are available"),
            Self::InsufficientCapacity { unassigned } => {
                write!(f, "{unassigned} guest(s) could not be seated")
            }
        }
    }
}

/// The final output of an optimization pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub before_score: i32,
    pub after_score: i32,
    pub moved_guest_ids: Vec<GuestId>,
    pub assignment: Vec<TableAssignment>,
    pub unassigned_guest_ids: Vec<GuestId>,
    pub breakdown: ScoreBreakdown,
    pub warnings: Vec<OptimizationWarning>,
}
