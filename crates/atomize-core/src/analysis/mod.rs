/*! Build the equivalence graph and push a qualifier through it.
 *
 * The builder walks expressions bottom-up, tracking which declarations each expression can denote
 * and at what pointer depth, and records an edge whenever a value moves between two storage
 * locations. The propagation pass then closes over those edges from a single seed, and seed
 * selection picks that starting declaration by name or reproducibly at random.
 */

pub mod equivalence;
pub mod propagate;
pub mod seed;

pub use equivalence::EquivalenceBuilder;
pub use propagate::{propagate, TraceStep, UpgradeSet};
pub use seed::select_seed;
