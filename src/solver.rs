use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use itertools::Itertools;
use log::{debug, info, trace};

use crate::compatibility::CompatibilityScorer;
use crate::config::OptimizerConfig;
use crate::data::{Constraint, Guest, GuestId, Priority, Table, TableAssignment};
use crate::grouping::PlacementUnit;

/// Outcome of one greedy assignment pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeatingPlan {
    /// One entry per input table, in the caller's table order.
    pub tables: Vec<TableAssignment>,
    /// Members of units that fit no table, in unit order.
    pub unassigned: Vec<GuestId>,
}

/// Greedy bin packing of placement units onto tables.
///
/// Tables are visited largest first; each unit goes to the table with the
/// strictly highest placement score among those with room for the whole unit.
/// There is no backtracking: a placement is final for the pass.
pub struct TableAssigner<'a> {
    config: &'a OptimizerConfig,
    constraints: &'a [Constraint],
}

impl<'a> TableAssigner<'a> {
    pub fn new(config: &'a OptimizerConfig) -> Self {
        Self {
            config,
            constraints: &[],
        }
    }

    /// Constraints consulted when constraint enforcement is switched on.
    pub fn with_constraints(mut self, constraints: &'a [Constraint]) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn assign(
        &self,
        units: &[PlacementUnit],
        guests: &[Guest],
        tables: &[Table],
    ) -> SeatingPlan {
        let start_time = Instant::now();
        info!(
            "Assigning {} placement units to {} tables...",
            units.len(),
            tables.len()
        );

        // lookups
        let guest_map: HashMap<&str, &Guest> =
            guests.iter().map(|g| (g.id.as_str(), g)).collect();
        let scorer = CompatibilityScorer::new(&self.config.together, &self.config.heuristics);
        let rules = self.constraint_rules();

        // largest first; sort is stable so equal capacities keep caller order
        let order: Vec<usize> = tables
            .iter()
            .enumerate()
            .sorted_by_key(|(_, table)| Reverse(table.capacity))
            .map(|(index, _)| index)
            .collect();

        // declined guests are never moved, but a seat they still hold is taken
        let reserved: Vec<usize> = tables
            .iter()
            .map(|table| {
                guests
                    .iter()
                    .filter(|g| {
                        !g.is_eligible() && g.table_id.as_deref() == Some(table.id.as_str())
                    })
                    .count()
            })
            .collect();

        let mut occupants: Vec<Vec<&Guest>> = vec![Vec::new(); tables.len()];
        let mut unassigned = Vec::new();

        for unit in units {
            let members: Vec<&Guest> = unit
                .guest_ids
                .iter()
                .filter_map(|id| guest_map.get(id.as_str()).copied())
                .collect();
            if members.is_empty() {
                continue;
            }

            let mut best: Option<(usize, i32)> = None;
            for &index in &order {
                let table = &tables[index];
                let free = (table.capacity as usize)
                    .saturating_sub(reserved[index] + occupants[index].len());
                if free < members.len() {
                    continue;
                }
                if rules.forbids(&members, &occupants[index]) {
                    trace!(
                        "Table {} skipped for {:?}: required separation.",
                        table.id, unit.guest_ids
                    );
                    continue;
                }

                let score = scorer.placement_score(&members, &occupants[index])
                    + rules.placement_bonus(&members, &occupants[index]);
                trace!("Unit {:?} at table {} scores {}.", unit.guest_ids, table.id, score);

                if best.is_none_or(|(_, best_score)| score > best_score) {
                    best = Some((index, score));
                }
            }

            match best {
                Some((index, score)) => {
                    trace!(
                        "Placed {:?} at table {} (score {}).",
                        unit.guest_ids, tables[index].id, score
                    );
                    occupants[index].extend(members);
                }
                None => {
                    debug!("No table can seat {:?}; leaving unassigned.", unit.guest_ids);
                    unassigned.extend(members.iter().map(|g| g.id.clone()));
                }
            }
        }

        let plan = SeatingPlan {
            tables: tables
                .iter()
                .zip(occupants)
                .map(|(table, seated)| TableAssignment {
                    table_id: table.id.clone(),
                    guest_ids: seated.iter().map(|g| g.id.clone()).collect(),
                })
                .collect(),
            unassigned,
        };

        info!(
            "Assignment finished in {:.2?}; {} guest(s) left unassigned.",
            start_time.elapsed(),
            plan.unassigned.len()
        );
        plan
    }

    fn constraint_rules(&self) -> ConstraintRules<'a> {
        if !self.config.heuristics.constraint_enforcement {
            return ConstraintRules::default();
        }
        ConstraintRules::build(self.constraints, self.config.heuristics.constraint_weight)
    }
}

/// Pairwise view of the constraints used while placing units.
#[derive(Debug, Default)]
struct ConstraintRules<'a> {
    together: HashSet<(&'a str, &'a str)>,
    required_apart: HashSet<(&'a str, &'a str)>,
    preferred_apart: HashSet<(&'a str, &'a str)>,
    weight: i32,
}

impl<'a> ConstraintRules<'a> {
    fn build(constraints: &'a [Constraint], weight: i32) -> Self {
        let mut rules = Self {
            weight,
            ..Self::default()
        };

        for constraint in constraints {
            let target = if constraint.kind.requires_together() {
                &mut rules.together
            } else if constraint.kind.requires_apart() {
                if constraint.priority == Priority::Required {
                    &mut rules.required_apart
                } else {
                    &mut rules.preferred_apart
                }
            } else {
                continue;
            };

            for (a, b) in constraint
                .guest_ids
                .iter()
                .map(String::as_str)
                .unique()
                .tuple_combinations()
            {
                target.insert(pair_key(a, b));
            }
        }
        rules
    }

    fn forbids(&self, unit: &[&Guest], occupants: &[&Guest]) -> bool {
        !self.required_apart.is_empty()
            && pairs(unit, occupants).any(|key| self.required_apart.contains(&key))
    }

    fn placement_bonus(&self, unit: &[&Guest], occupants: &[&Guest]) -> i32 {
        if self.weight == 0 {
            return 0;
        }
        pairs(unit, occupants)
            .map(|key| {
                let mut bonus = 0;
                if self.together.contains(&key) {
                    bonus += self.weight;
                }
                if self.preferred_apart.contains(&key) {
                    bonus -= self.weight;
                }
                bonus
            })
            .sum()
    }
}

fn pair_key<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}

fn pairs<'g>(
    unit: &'g [&'g Guest],
    occupants: &'g [&'g Guest],
) -> impl Iterator<Item = (&'g str, &'g str)> + 'g {
    unit.iter().flat_map(move |member| {
        occupants
            .iter()
            .map(move |occupant| pair_key(member.id.as_str(), occupant.id.as_str()))
    })
}
