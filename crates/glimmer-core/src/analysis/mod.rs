pub mod cfg;
pub mod verify;

pub use cfg::ControlFlowGraph;
pub use verify::{verify_function, verify_module, VerifyError};
