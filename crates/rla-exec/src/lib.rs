pub mod contracts;
pub mod installer;
pub mod runner;

pub use contracts::*;
pub use installer::*;
pub use runner::*;
