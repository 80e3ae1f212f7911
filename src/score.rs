use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::config::OptimizerConfig;
use crate::data::{Constraint, Guest, Priority, RelationshipType, ScoreBreakdown, Table};
use crate::violations;

/// Headline score and percentage breakdown of an assignment.
#[derive(Debug, Clone, Copy)]
pub struct ScoreCalculator<'a> {
    config: &'a OptimizerConfig,
}

impl<'a> ScoreCalculator<'a> {
    pub fn new(config: &'a OptimizerConfig) -> Self {
        Self { config }
    }

    /// Sums every relationship edge whose two ends are both seated: the
    /// together weight when they share a table, the apart adjustment when they
    /// don't. Mutual edges are seen from both sides, so the total is halved
    /// (integer division, truncating toward zero).
    pub fn score(&self, guests: &[Guest]) -> i32 {
        let seating = seating_map(guests);

        let total: i32 = guests
            .iter()
            .filter_map(|g| g.table_id.as_deref().map(|table| (g, table)))
            .flat_map(|(guest, table)| {
                let seating = &seating;
                guest.relationships.iter().filter_map(move |edge| {
                    let other = (*seating.get(edge.target_guest_id.as_str())?)?;
                    Some(if other == table {
                        self.config.together.weight(edge.kind)
                    } else {
                        self.config.apart.weight(edge.kind)
                    })
                })
            })
            .sum();

        total / 2
    }

    pub fn breakdown(
        &self,
        guests: &[Guest],
        tables: &[Table],
        constraints: &[Constraint],
    ) -> ScoreBreakdown {
        let constraints_pct = self.constraint_compliance(guests, constraints);
        let relationships_pct = self.relationship_satisfaction(guests);
        let groups_pct = group_cohesion(guests);
        let capacity_pct = capacity_sufficiency(guests, tables);

        let overall = (u32::from(constraints_pct)
            + u32::from(relationships_pct)
            + u32::from(groups_pct)
            + u32::from(capacity_pct)
            + 2)
            / 4;

        ScoreBreakdown {
            constraints: constraints_pct,
            relationships: relationships_pct,
            groups: groups_pct,
            capacity: capacity_pct,
            overall: overall as u8,
        }
    }

    fn constraint_compliance(&self, guests: &[Guest], constraints: &[Constraint]) -> u8 {
        let required = violations::detect(guests, constraints)
            .iter()
            .filter(|v| v.priority == Priority::Required)
            .count() as u32;
        let penalty = required.saturating_mul(self.config.penalties.required_violation);
        100u32.saturating_sub(penalty) as u8
    }

    fn relationship_satisfaction(&self, guests: &[Guest]) -> u8 {
        let seating = seating_map(guests);
        let mut avoid_together = HashSet::new();
        let mut separated = HashSet::new();

        for guest in guests {
            let Some(table) = guest.table_id.as_deref() else {
                continue;
            };
            for edge in &guest.relationships {
                let Some(Some(other)) = seating.get(edge.target_guest_id.as_str()) else {
                    continue;
                };
                let key = unordered(&guest.id, &edge.target_guest_id);
                match edge.kind {
                    RelationshipType::Avoid if *other == table => {
                        avoid_together.insert(key);
                    }
                    RelationshipType::Partner | RelationshipType::Family if *other != table => {
                        separated.insert(key);
                    }
                    _ => {}
                }
            }
        }

        let penalties = &self.config.penalties;
        let penalty = (avoid_together.len() as u32).saturating_mul(penalties.avoid_together)
            + (separated.len() as u32).saturating_mul(penalties.separated_pair);
        100u32.saturating_sub(penalty) as u8
    }
}

/// Seat lookup by guest id; `None` for guests without a table.
fn seating_map(guests: &[Guest]) -> HashMap<&str, Option<&str>> {
    guests
        .iter()
        .map(|g| (g.id.as_str(), g.table_id.as_deref()))
        .collect()
}

fn unordered<'g>(a: &'g str, b: &'g str) -> (&'g str, &'g str) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Share of same-label clusters (two or more eligible guests) seated entirely
/// at one table.
fn group_cohesion(guests: &[Guest]) -> u8 {
    let clusters = guests
        .iter()
        .filter(|g| g.is_eligible())
        .filter_map(|g| g.group_label().map(|label| (label.to_lowercase(), g)))
        .into_group_map();

    let sized: Vec<&Vec<&Guest>> = clusters.values().filter(|c| c.len() > 1).collect();
    if sized.is_empty() {
        return 100;
    }

    let cohesive = sized
        .iter()
        .filter(|cluster| {
            cluster.iter().all(|g| g.table_id.is_some())
                && cluster.iter().map(|g| g.table_id.as_deref()).all_equal()
        })
        .count();

    (cohesive * 100 / sized.len()) as u8
}

/// Total capacity against eligible guests, capped at 100.
fn capacity_sufficiency(guests: &[Guest], tables: &[Table]) -> u8 {
    let eligible = guests.iter().filter(|g| g.is_eligible()).count() as u64;
    if eligible == 0 {
        return 100;
    }
    let capacity: u64 = tables.iter().map(|t| u64::from(t.capacity)).sum();
    (capacity * 100 / eligible).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApartAdjustments;
    use crate::data::{ConstraintType, RsvpStatus};
    use pretty_assertions::assert_eq;

    fn score(guests: &[Guest]) -> i32 {
        ScoreCalculator::new(&OptimizerConfig::default()).score(guests)
    }

    #[test]
    fn mutual_partners_at_one_table_score_ten() {
        let guests = vec![
            Guest::new("a", "A")
                .with_relationship("b", RelationshipType::Partner, 5)
                .at_table("t1"),
            Guest::new("b", "B")
                .with_relationship("a", RelationshipType::Partner, 5)
                .at_table("t1"),
        ];
        assert_eq!(score(&guests), 10);
    }

    #[test]
    fn one_sided_avoid_edge_is_halved() {
        let guests = vec![
            Guest::new("a", "A")
                .with_relationship("b", RelationshipType::Avoid, 5)
                .at_table("t1"),
            Guest::new("b", "B").at_table("t1"),
        ];
        assert_eq!(score(&guests), -10);
    }

    #[test]
    fn apart_adjustments_apply_to_seated_pairs_only() {
        let guests = vec![
            Guest::new("a", "A")
                .with_relationship("b", RelationshipType::Partner, 5)
                .with_relationship("c", RelationshipType::Avoid, 5)
                .with_relationship("d", RelationshipType::Friend, 5)
                .with_relationship("e", RelationshipType::Partner, 5)
                .with_relationship("ghost", RelationshipType::Avoid, 5)
                .at_table("t1"),
            Guest::new("b", "B").at_table("t2"),
            Guest::new("c", "C").at_table("t2"),
            Guest::new("d", "D").at_table("t2"),
            Guest::new("e", "E"),
        ];
        // partner apart -5, avoid apart +5, friend apart 0, unseated/missing skipped
        assert_eq!(score(&guests), 0);
    }

    #[test]
    fn apart_table_is_configurable() {
        let config = OptimizerConfig {
            apart: ApartAdjustments {
                partner: -8,
                ..ApartAdjustments::default()
            },
            ..OptimizerConfig::default()
        };
        let guests = vec![
            Guest::new("a", "A")
                .with_relationship("b", RelationshipType::Partner, 5)
                .at_table("t1"),
            Guest::new("b", "B")
                .with_relationship("a", RelationshipType::Partner, 5)
                .at_table("t2"),
        ];
        assert_eq!(ScoreCalculator::new(&config).score(&guests), -8);
    }

    #[test]
    fn score_ignores_guest_order() {
        let mut guests = vec![
            Guest::new("a", "A")
                .with_relationship("b", RelationshipType::Friend, 3)
                .with_relationship("c", RelationshipType::Avoid, 1)
                .at_table("t1"),
            Guest::new("b", "B")
                .with_relationship("a", RelationshipType::Family, 2)
                .at_table("t1"),
            Guest::new("c", "C")
                .with_relationship("b", RelationshipType::Partner, 5)
                .at_table("t2"),
        ];
        let forward = score(&guests);
        guests.reverse();
        assert_eq!(score(&guests), forward);
    }

    #[test]
    fn capacity_counts_only_eligible_guests() {
        let guests = vec![
            Guest::new("a", "A"),
            Guest::new("b", "B"),
            Guest::new("c", "C").with_rsvp(RsvpStatus::Declined),
            Guest::new("d", "D"),
            Guest::new("e", "E"),
        ];
        assert_eq!(capacity_sufficiency(&guests, &[Table::new("t1", 3)]), 75);
        assert_eq!(capacity_sufficiency(&guests, &[Table::new("t1", 9)]), 100);
        assert_eq!(capacity_sufficiency(&[], &[]), 100);
    }

    #[test]
    fn group_cohesion_counts_whole_clusters() {
        let guests = vec![
            Guest::new("a", "A").with_group("Family").at_table("t1"),
            Guest::new("b", "B").with_group("family").at_table("t1"),
            Guest::new("c", "C").with_group("Work").at_table("t1"),
            Guest::new("d", "D").with_group("Work"),
            Guest::new("e", "E").with_group("Solo").at_table("t2"),
        ];
        assert_eq!(group_cohesion(&guests), 50);
        assert_eq!(group_cohesion(&guests[4..]), 100);
    }

    #[test]
    fn breakdown_penalizes_required_violations_and_bad_pairs() {
        let guests = vec![
            Guest::new("a", "A")
                .with_relationship("b", RelationshipType::Avoid, 5)
                .at_table("t1"),
            Guest::new("b", "B")
                .with_relationship("a", RelationshipType::Avoid, 5)
                .at_table("t1"),
            Guest::new("c", "C")
                .with_relationship("d", RelationshipType::Partner, 5)
                .at_table("t1"),
            Guest::new("d", "D").at_table("t2"),
        ];
        let tables = vec![Table::new("t1", 3), Table::new("t2", 3)];
        let constraints = vec![
            Constraint::new("c1", ConstraintType::DifferentTable, Priority::Required, ["a", "b"]),
            Constraint::new("c2", ConstraintType::SameTable, Priority::Preferred, ["c", "d"]),
        ];

        let breakdown =
            ScoreCalculator::new(&OptimizerConfig::default()).breakdown(&guests, &tables, &constraints);

        assert_eq!(
            breakdown,
            ScoreBreakdown {
                constraints: 80,
                relationships: 75,
                groups: 100,
                capacity: 100,
                overall: 89,
            }
        );
    }
}
