use std::collections::{HashMap, HashSet};

use log::trace;

use crate::data::{Guest, GuestId, RelationshipType};

/// Guests that must be placed at the same table together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementUnit {
    pub guest_ids: Vec<GuestId>,
}

impl PlacementUnit {
    pub fn len(&self) -> usize {
        self.guest_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guest_ids.is_empty()
    }
}

/// Partitions the eligible guests into placement units.
///
/// Declined guests are left out entirely. A guest with an outgoing partner
/// edge towards another eligible guest that has not been paired yet forms a
/// two-member unit with them; everyone else becomes a singleton. Units come
/// out in the order their first member appears in `guests`.
///
/// Mutual partner edges take precedence: a one-directional edge never claims
/// a guest who is still free to pair with their own mutual partner.
pub fn form_units(guests: &[Guest]) -> Vec<PlacementUnit> {
    let eligible: HashMap<&str, &Guest> = guests
        .iter()
        .filter(|g| g.is_eligible())
        .map(|g| (g.id.as_str(), g))
        .collect();

    let mut processed: HashSet<&str> = HashSet::new();
    let mut units = Vec::new();

    for guest in guests.iter().filter(|g| g.is_eligible()) {
        if !processed.insert(guest.id.as_str()) {
            continue;
        }

        let candidates: Vec<&str> = partner_targets(guest)
            .filter(|target| {
                *target != guest.id && eligible.contains_key(target) && !processed.contains(target)
            })
            .collect();

        let mutual = candidates
            .iter()
            .copied()
            .find(|target| is_partner_of(eligible[target], &guest.id));
        let partner = mutual.or_else(|| {
            candidates.iter().copied().find(|target| {
                !has_free_mutual_partner(eligible[target], &eligible, &processed)
            })
        });

        match partner {
            Some(partner) => {
                processed.insert(partner);
                trace!("Pairing partners {} and {}.", guest.id, partner);
                units.push(PlacementUnit {
                    guest_ids: vec![guest.id.clone(), partner.to_string()],
                });
            }
            None => units.push(PlacementUnit {
                guest_ids: vec![guest.id.clone()],
            }),
        }
    }

    units
}

fn partner_targets(guest: &Guest) -> impl Iterator<Item = &str> {
    guest
        .relationships
        .iter()
        .filter(|edge| edge.kind == RelationshipType::Partner)
        .map(|edge| edge.target_guest_id.as_str())
}

fn is_partner_of(guest: &Guest, other: &str) -> bool {
    partner_targets(guest).any(|target| target == other)
}

fn has_free_mutual_partner(
    guest: &Guest,
    eligible: &HashMap<&str, &Guest>,
    processed: &HashSet<&str>,
) -> bool {
    partner_targets(guest).any(|target| {
        target != guest.id
            && !processed.contains(target)
            && eligible
                .get(target)
                .is_some_and(|other| is_partner_of(other, &guest.id))
    })
}
