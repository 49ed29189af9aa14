//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod evaluate;
mod inspect_flags;
mod repair_flags;

pub use evaluate::Evaluate;
pub use inspect_flags::InspectFlags;
pub use repair_flags::RepairFlags;
