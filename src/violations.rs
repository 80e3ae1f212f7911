use std::collections::HashMap;

use itertools::Itertools;
use log::trace;

use crate::data::{Constraint, ConstraintType, ConstraintViolation, Guest, TableId};

/// Evaluates every constraint against the table ids the guests carry right
/// now, whether they came from the optimizer or from manual placement.
///
/// Constraints naming fewer than two distinct existing guests are skipped.
/// `near_front` and `accessibility` need floor-plan geometry and never
/// produce violations.
pub fn detect(guests: &[Guest], constraints: &[Constraint]) -> Vec<ConstraintViolation> {
    let guest_map: HashMap<&str, &Guest> = guests.iter().map(|g| (g.id.as_str(), g)).collect();

    let mut violations = Vec::new();
    for constraint in constraints {
        let members: Vec<&Guest> = constraint
            .guest_ids
            .iter()
            .map(String::as_str)
            .unique()
            .filter_map(|id| guest_map.get(id).copied())
            .collect();
        if members.len() < 2 {
            continue;
        }

        let assigned: Vec<(&Guest, &TableId)> = members
            .iter()
            .filter_map(|g| g.table_id.as_ref().map(|table| (*g, table)))
            .collect();

        match constraint.kind {
            ConstraintType::SameTable | ConstraintType::MustSitTogether => {
                if let Some(violation) = split_violation(constraint, &assigned) {
                    violations.push(violation);
                }
            }
            ConstraintType::DifferentTable | ConstraintType::MustNotSitTogether => {
                violations.extend(colocation_violations(constraint, &assigned));
            }
            ConstraintType::NearFront | ConstraintType::Accessibility | ConstraintType::Unknown => {}
        }
    }

    for violation in &violations {
        trace!("{violation}");
    }
    violations
}

/// Violations that involve `table_id`.
pub fn detect_for_table(
    guests: &[Guest],
    constraints: &[Constraint],
    table_id: &str,
) -> Vec<ConstraintViolation> {
    detect(guests, constraints)
        .into_iter()
        .filter(|v| v.table_ids.iter().any(|t| t == table_id))
        .collect()
}

fn split_violation(
    constraint: &Constraint,
    assigned: &[(&Guest, &TableId)],
) -> Option<ConstraintViolation> {
    if assigned.len() < 2 {
        return None;
    }
    let tables: Vec<TableId> = assigned.iter().map(|(_, t)| (*t).clone()).unique().collect();
    if tables.len() < 2 {
        return None;
    }

    let names = assigned.iter().map(|(g, _)| g.name.as_str()).join(", ");
    let description = constraint.description.clone().unwrap_or_else(|| {
        format!(
            "{} should sit together but are spread across tables {}.",
            names,
            tables.join(", ")
        )
    });

    Some(ConstraintViolation {
        constraint_id: constraint.id.clone(),
        constraint_type: constraint.kind,
        priority: constraint.priority,
        guest_ids: assigned.iter().map(|(g, _)| g.id.clone()).collect(),
        table_ids: tables,
        description,
    })
}

fn colocation_violations(
    constraint: &Constraint,
    assigned: &[(&Guest, &TableId)],
) -> Vec<ConstraintViolation> {
    // first-seen table order keeps the output stable across calls
    let mut by_table: Vec<(&TableId, Vec<&Guest>)> = Vec::new();
    for &(guest, table) in assigned {
        match by_table.iter_mut().find(|(t, _)| *t == table) {
            Some((_, seated)) => seated.push(guest),
            None => by_table.push((table, vec![guest])),
        }
    }

    by_table
        .into_iter()
        .filter(|(_, seated)| seated.len() > 1)
        .map(|(table, seated)| {
            let description = constraint.description.clone().unwrap_or_else(|| {
                format!(
                    "{} should not share a table but are all seated at table {}.",
                    seated.iter().map(|g| g.name.as_str()).join(", "),
                    table
                )
            });
            ConstraintViolation {
                constraint_id: constraint.id.clone(),
                constraint_type: constraint.kind,
                priority: constraint.priority,
                guest_ids: seated.iter().map(|g| g.id.clone()).collect(),
                table_ids: vec![table.clone()],
                description,
            }
        })
        .collect()
}
