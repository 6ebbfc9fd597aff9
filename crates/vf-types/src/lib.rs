#[macro_use]
pub mod errors;
pub mod constants;
pub mod design;
pub mod simulation;

pub use errors::*;
pub use constants::*;
pub use design::*;
pub use simulation::*;
