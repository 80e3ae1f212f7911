//! Seating assignment optimizer.
//!
//! Assigns guests to capacity-limited tables by greedily packing placement
//! units (partners travel together) where their relationship edges score
//! best, then reports constraint violations and a before/after score. Every
//! function works on plain data owned by the caller; the only state kept
//! between calls is the single undo snapshot held by an
//! [`OptimizationSession`].
//!
//! ```
//! use seating_solver::{calculate_score, Guest, OptimizationSession, RelationshipType, Table};
//!
//! let mut guests = vec![
//!     Guest::new("a", "Ada").with_relationship("b", RelationshipType::Partner, 5),
//!     Guest::new("b", "Bo").with_relationship("a", RelationshipType::Partner, 5),
//! ];
//! let mut session = OptimizationSession::default();
//!
//! let result = session.run(&mut guests, &[Table::new("t1", 2)]);
//! assert_eq!(result.after_score, 10);
//! assert_eq!(calculate_score(&guests), 10);
//!
//! session.rollback(&mut guests).unwrap();
//! assert!(guests.iter().all(|g| g.table_id.is_none()));
//! ```

pub mod compatibility;
pub mod config;
pub mod data;
pub mod error;
pub mod grouping;
pub mod score;
pub mod server;
pub mod session;
pub mod solver;
pub mod violations;

pub use compatibility::CompatibilityScorer;
pub use config::{AppConfig, OptimizerConfig};
pub use data::{
    Constraint, ConstraintType, ConstraintViolation, Guest, GuestId, OptimizationResult,
    OptimizationSnapshot, OptimizationWarning, Priority, RelationshipType, RsvpStatus,
    ScoreBreakdown, Table, TableAssignment, TableId,
};
pub use error::SeatingError;
pub use grouping::{PlacementUnit, form_units};
pub use score::ScoreCalculator;
pub use session::{OptimizationSession, restore_snapshot};
pub use solver::{SeatingPlan, TableAssigner};

/// Headline score of the current seating under the default weights.
pub fn calculate_score(guests: &[Guest]) -> i32 {
    ScoreCalculator::new(&OptimizerConfig::default()).score(guests)
}

/// Restores `snapshot` onto `guests`, returning the ids that moved back.
pub fn rollback(
    guests: &mut [Guest],
    snapshot: &OptimizationSnapshot,
) -> Result<Vec<GuestId>, SeatingError> {
    restore_snapshot(guests, snapshot)
}

pub fn detect_violations(guests: &[Guest], constraints: &[Constraint]) -> Vec<ConstraintViolation> {
    violations::detect(guests, constraints)
}

pub fn detect_violations_for_table(
    guests: &[Guest],
    constraints: &[Constraint],
    table_id: &str,
) -> Vec<ConstraintViolation> {
    violations::detect_for_table(guests, constraints, table_id)
}
