//! Type definitions for the executor
//!
//! - Runtime values (`Value`)
//! - Variable environment (`Environment`)
//! - Program counter (`Cursor`)
//! - Loop and conditional guards (`Condition`, `LoopFrame`)
//! - Execution context (`Scope`, `Capabilities`)

pub mod context;
pub mod control;
pub mod env;
pub mod pc;
pub mod values;

pub use context::{Capabilities, Scope};
pub use control::{Condition, LoopFrame, Operand, Polarity};
pub use env::Environment;
pub use pc::{Cursor, Located};
pub use values::{unquote, Value, ValueError, ValueType};
