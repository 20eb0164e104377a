//! SAT encoding of the loop puzzle and the solver boundary

pub mod batsat_solver;
pub mod constraints;
pub mod encoder;
pub mod enumerator;
pub mod model;
pub mod presets;
pub mod region;
pub mod solver;
pub mod solver_factory;
pub mod topology;
pub mod variables;

pub use constraints::{Clause, Formula};
pub use encoder::{EncodingOptions, EncodingStatistics, SatEncoder};
pub use enumerator::{Enumeration, EnumerationStrategy, SolutionEnumerator};
pub use model::{AllSolutions, CompiledModel};
pub use solver::{Assignment, SatSolver};
pub use solver_factory::UnifiedSatSolver;
pub use variables::{VariableManager, VariableType};
