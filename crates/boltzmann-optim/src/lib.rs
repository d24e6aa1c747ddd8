pub mod optimizer;
pub mod scheduler;

pub use optimizer::*;
pub use scheduler::*;
