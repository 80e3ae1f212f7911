use std::collections::{HashMap, HashSet};

use log::{info, warn};

use crate::config::OptimizerConfig;
use crate::data::{
    Constraint, Guest, GuestId, OptimizationResult, OptimizationSnapshot, OptimizationWarning,
    Table, TableId,
};
use crate::error::SeatingError;
use crate::grouping::form_units;
use crate::score::ScoreCalculator;
use crate::solver::TableAssigner;

/// One optimize/undo cycle over a caller-owned guest list.
///
/// Holds at most one snapshot; a new `run` replaces it. Independent sessions
/// (one per event, say) share nothing.
#[derive(Debug, Clone, Default)]
pub struct OptimizationSession {
    config: OptimizerConfig,
    snapshot: Option<OptimizationSnapshot>,
}

impl OptimizationSession {
    pub fn new(config: OptimizerConfig) -> Self {
        Self {
            config,
            snapshot: None,
        }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn snapshot(&self) -> Option<&OptimizationSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn run(&mut self, guests: &mut [Guest], tables: &[Table]) -> OptimizationResult {
        self.run_with_constraints(guests, tables, &[])
    }

    /// Reseats every eligible guest and remembers the previous seating for
    /// one `rollback`. Declined guests keep whatever seat they had.
    ///
    /// When no table can seat anyone the guests are left untouched, no
    /// snapshot is taken and the result carries
    /// [`OptimizationWarning::NoTablesAvailable`].
    pub fn run_with_constraints(
        &mut self,
        guests: &mut [Guest],
        tables: &[Table],
        constraints: &[Constraint],
    ) -> OptimizationResult {
        let calculator = ScoreCalculator::new(&self.config);
        let before_score = calculator.score(guests);

        if tables.iter().all(|t| t.capacity == 0) {
            warn!(
                "No tables with free seats among {} table(s); nothing to optimize.",
                tables.len()
            );
            return OptimizationResult {
                before_score,
                after_score: before_score,
                moved_guest_ids: Vec::new(),
                assignment: Vec::new(),
                unassigned_guest_ids: Vec::new(),
                breakdown: calculator.breakdown(guests, tables, constraints),
                warnings: vec![OptimizationWarning::NoTablesAvailable],
            };
        }

        let snapshot = OptimizationSnapshot::capture(guests);

        let units = form_units(guests);
        let plan = TableAssigner::new(&self.config)
            .with_constraints(constraints)
            .assign(&units, guests, tables);

        let mut held: HashMap<TableId, HashSet<u32>> = HashMap::new();
        for guest in guests.iter().filter(|g| !g.is_eligible()) {
            if let (Some(table), Some(seat)) = (&guest.table_id, guest.seat_index) {
                held.entry(table.clone()).or_default().insert(seat);
            }
        }

        // lowest seat numbers first, skipping any a declined guest still holds
        let mut seats: HashMap<&str, (&TableId, u32)> = HashMap::new();
        for table in &plan.tables {
            let taken = held.get(&table.table_id);
            let free_seats = (0u32..).filter(|seat| taken.is_none_or(|t| !t.contains(seat)));
            for (id, seat) in table.guest_ids.iter().zip(free_seats) {
                seats.insert(id.as_str(), (&table.table_id, seat));
            }
        }

        let mut moved_guest_ids = Vec::new();
        for guest in guests.iter_mut().filter(|g| g.is_eligible()) {
            let (table_id, seat_index) = match seats.get(guest.id.as_str()) {
                Some(&(table, seat)) => (Some(table.clone()), Some(seat)),
                None => (None, None),
            };
            if guest.table_id != table_id {
                moved_guest_ids.push(guest.id.clone());
            }
            guest.table_id = table_id;
            guest.seat_index = seat_index;
        }

        let after_score = calculator.score(guests);
        let mut warnings = Vec::new();
        if !plan.unassigned.is_empty() {
            let warning = OptimizationWarning::InsufficientCapacity {
                unassigned: plan.unassigned.len(),
            };
            warn!("{warning}");
            warnings.push(warning);
        }
        info!(
            "Optimization moved {} guest(s); score {} -> {}.",
            moved_guest_ids.len(),
            before_score,
            after_score
        );

        self.snapshot = Some(snapshot);

        OptimizationResult {
            before_score,
            after_score,
            moved_guest_ids,
            breakdown: calculator.breakdown(guests, tables, constraints),
            assignment: plan.tables,
            unassigned_guest_ids: plan.unassigned,
            warnings,
        }
    }

    /// Restores the seating captured by the last `run` and forgets it.
    ///
    /// Returns the guests whose table changed back; empty when there was
    /// nothing to undo. A failed restore keeps the snapshot so the caller can
    /// retry with the full guest list.
    pub fn rollback(&mut self, guests: &mut [Guest]) -> Result<Vec<GuestId>, SeatingError> {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return Ok(Vec::new());
        };
        let moved = restore_snapshot(guests, snapshot)?;
        self.snapshot = None;
        info!("Rolled back optimization; {} guest(s) moved back.", moved.len());
        Ok(moved)
    }
}

/// Writes the snapshot's tables and seats back onto `guests`.
///
/// Guests the snapshot doesn't mention are left alone. A snapshot that names
/// an unknown guest or repeats one is rejected before anything is modified.
pub fn restore_snapshot(
    guests: &mut [Guest],
    snapshot: &OptimizationSnapshot,
) -> Result<Vec<GuestId>, SeatingError> {
    let mut seen = HashSet::new();
    for entry in &snapshot.entries {
        if !seen.insert(entry.guest_id.as_str()) {
            return Err(SeatingError::DuplicateSnapshotGuest(entry.guest_id.clone()));
        }
    }
    let known: HashSet<&str> = guests.iter().map(|g| g.id.as_str()).collect();
    if let Some(entry) = snapshot
        .entries
        .iter()
        .find(|e| !known.contains(e.guest_id.as_str()))
    {
        return Err(SeatingError::UnknownSnapshotGuest(entry.guest_id.clone()));
    }

    let entries: HashMap<&str, _> = snapshot
        .entries
        .iter()
        .map(|e| (e.guest_id.as_str(), e))
        .collect();

    let mut moved = Vec::new();
    for guest in guests.iter_mut() {
        let Some(entry) = entries.get(guest.id.as_str()) else {
            continue;
        };
        if guest.table_id != entry.table_id {
            moved.push(guest.id.clone());
        }
        guest.table_id = entry.table_id.clone();
        guest.seat_index = entry.seat_index;
    }
    Ok(moved)
}
