pub mod engine;
pub mod measure;
pub mod placement;
pub mod rendered;
pub mod scheduler;
pub mod timers;


pub use engine::*;
pub use measure::*;
pub use rendered::*;
pub use scheduler::*;
