// Payment API Tools
//
// MCP tool descriptors and the executor that runs them.

pub mod catalog;
pub mod executor;

pub use catalog::{descriptors, find, ToolSpec, TOOLS};
pub use executor::{prepare, tool_result, PreparedCall, ToolError, ToolExecutor};
