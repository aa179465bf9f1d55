//! Browser automation error types - re-exports the unified error from callcheck-core
//!
//! Browser failures map onto the unified taxonomy:
//! - `NavigationTimeout` - page load exceeded its budget
//! - `Browser(String)` - launch, CDP, and interaction failures
//! - `Screenshot(String)` - capture failures
//! - `PageContract(String)` - the page is missing a control the scenario drives

pub use callcheck_core::{CallcheckError, Result};
