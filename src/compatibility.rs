use crate::config::{HeuristicConfig, RelationshipWeights};
use crate::data::Guest;

/// Scores how well two guests fit at the same table.
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityScorer<'a> {
    weights: &'a RelationshipWeights,
    heuristics: &'a HeuristicConfig,
}

impl<'a> CompatibilityScorer<'a> {
    pub fn new(weights: &'a RelationshipWeights, heuristics: &'a HeuristicConfig) -> Self {
        Self {
            weights,
            heuristics,
        }
    }

    /// Relationship weight of `a`'s own edge towards `b`, or 0 without one.
    ///
    /// Directional: an edge stored only on `b` is not seen here.
    pub fn score(&self, a: &Guest, b: &Guest) -> i32 {
        a.relationship_to(&b.id)
            .map_or(0, |edge| self.weights.weight(edge.kind))
    }

    /// `score` plus whichever heuristic terms are switched on.
    pub fn pair_score(&self, a: &Guest, b: &Guest) -> i32 {
        let mut total = self.score(a, b);

        if self.heuristics.group_cohesion {
            if let (Some(left), Some(right)) = (a.group_label(), b.group_label()) {
                if left.eq_ignore_ascii_case(right) {
                    total += self.heuristics.group_weight;
                }
            }
        }

        if self.heuristics.interest_matching {
            let shared = a
                .interests
                .iter()
                .filter(|interest| {
                    b.interests
                        .iter()
                        .any(|other| other.eq_ignore_ascii_case(interest))
                })
                .count() as i32;
            total += shared * self.heuristics.interest_weight;

            if let (Some(left), Some(right)) = (&a.industry, &b.industry) {
                if left.eq_ignore_ascii_case(right) {
                    total += self.heuristics.industry_weight;
                }
            }
        }

        total
    }

    /// Sum of `pair_score(member, occupant)` over every member of a placement
    /// unit and every guest already seated at the candidate table.
    pub fn placement_score(&self, unit: &[&Guest], occupants: &[&Guest]) -> i32 {
        unit.iter()
            .flat_map(|member| occupants.iter().map(move |occupant| (*member, *occupant)))
            .map(|(member, occupant)| self.pair_score(member, occupant))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RelationshipType;

    fn scorer_with<'a>(
        weights: &'a RelationshipWeights,
        heuristics: &'a HeuristicConfig,
    ) -> CompatibilityScorer<'a> {
        CompatibilityScorer::new(weights, heuristics)
    }

    #[test]
    fn maps_each_relationship_type_to_its_weight() {
        let weights = RelationshipWeights::default();
        let heuristics = HeuristicConfig::default();
        let scorer = scorer_with(&weights, &heuristics);
        let b = Guest::new("b", "B");

        let cases = [
            (RelationshipType::Partner, 10),
            (RelationshipType::Family, 5),
            (RelationshipType::Friend, 3),
            (RelationshipType::Colleague, 1),
            (RelationshipType::Avoid, -20),
            (RelationshipType::Unknown, 0),
        ];
        for (kind, expected) in cases {
            let a = Guest::new("a", "A").with_relationship("b", kind, 3);
            assert_eq!(scorer.score(&a, &b), expected, "{kind:?}");
        }
    }

    #[test]
    fn score_is_directional() {
        let weights = RelationshipWeights::default();
        let heuristics = HeuristicConfig::default();
        let scorer = scorer_with(&weights, &heuristics);
        let a = Guest::new("a", "A").with_relationship("b", RelationshipType::Avoid, 5);
        let b = Guest::new("b", "B");

        assert_eq!(scorer.score(&a, &b), -20);
        assert_eq!(scorer.score(&b, &a), 0);
    }

    #[test]
    fn first_matching_edge_wins() {
        let weights = RelationshipWeights::default();
        let heuristics = HeuristicConfig::default();
        let scorer = scorer_with(&weights, &heuristics);
        let a = Guest::new("a", "A")
            .with_relationship("b", RelationshipType::Friend, 2)
            .with_relationship("b", RelationshipType::Partner, 5);

        assert_eq!(scorer.score(&a, &Guest::new("b", "B")), 3);
    }

    #[test]
    fn placement_score_sums_member_occupant_pairs() {
        let weights = RelationshipWeights::default();
        let heuristics = HeuristicConfig::default();
        let scorer = scorer_with(&weights, &heuristics);
        let a = Guest::new("a", "A")
            .with_relationship("c", RelationshipType::Friend, 3)
            .with_relationship("d", RelationshipType::Avoid, 3);
        let b = Guest::new("b", "B").with_relationship("c", RelationshipType::Family, 3);
        let c = Guest::new("c", "C");
        let d = Guest::new("d", "D");

        assert_eq!(scorer.placement_score(&[&a, &b], &[&c, &d]), 3 - 20 + 5);
        assert_eq!(scorer.placement_score(&[&a, &b], &[]), 0);
    }

    #[test]
    fn heuristics_only_apply_when_enabled() {
        let weights = RelationshipWeights::default();
        let off = HeuristicConfig::default();
        let on = HeuristicConfig {
            group_cohesion: true,
            interest_matching: true,
            ..HeuristicConfig::default()
        };
        let a = Guest::new("a", "A")
            .with_group("Family")
            .with_interests(["Sailing", "chess"])
            .with_industry("Finance");
        let b = Guest::new("b", "B")
            .with_group("family")
            .with_interests(["sailing", "Chess", "golf"])
            .with_industry("finance");

        assert_eq!(scorer_with(&weights, &off).pair_score(&a, &b), 0);
        // group 2 + two shared interests + same industry
        assert_eq!(scorer_with(&weights, &on).pair_score(&a, &b), 2 + 2 + 1);
    }
}
