//! Terminal display system
//!
//! User-facing output (status lines, tables) kept apart from logging, which
//! goes through `tracing`. Handlers receive a [`DisplayProvider`] from their
//! session instead of printing directly.

pub mod live;
pub mod mock;
pub mod providers;
pub mod status;
pub mod structured;
pub mod styling;

pub use live::LiveDisplayProvider;
pub use mock::{DisplayCall, MockDisplayProvider};
pub use providers::{
    DisplayProvider, DisplayProviderExt, OperationSummary, StatusProvider, StructuredProvider,
};
pub use styling::StyleManager;
