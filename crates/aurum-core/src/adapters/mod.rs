mod nbp;
mod synthetic;

pub use nbp::{NbpAdapter, NBP_GOLD_BASE_URL};
pub use synthetic::SyntheticSource;
