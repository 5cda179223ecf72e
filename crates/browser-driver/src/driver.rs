//! The driver capability trait.

use async_trait::async_trait;
use pagepilot_core_types::ScrollDirection;
use serde_json::Value;

use crate::errors::DriverError;

/// Primitive page interactions the automation core consumes.
///
/// Implementations are expected to be non-reentrant against a single page;
/// the executor never issues overlapping calls.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Click the first element matching `selector`.
    async fn click(&self, selector: &str) -> Result<(), DriverError>;

    /// Focus the element matching `selector` and type `text` into it.
    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError>;

    /// Press a keyboard key (e.g. "Enter", "Escape") on the focused element.
    async fn press(&self, key: &str) -> Result<(), DriverError>;

    /// Scroll the page by `amount` pixels in `direction`.
    async fn scroll(&self, direction: ScrollDirection, amount: i32) -> Result<(), DriverError>;

    /// Move the pointer over the first element matching `selector`.
    async fn hover(&self, selector: &str) -> Result<(), DriverError>;

    /// Sleep for `ms` milliseconds.
    async fn wait(&self, ms: u64) -> Result<(), DriverError>;

    /// Evaluate a script in the page context and return its JSON result.
    ///
    /// This is also the mechanism the settle detector and the page probes
    /// use, so a driver must support it even if it supports nothing else
    /// beyond the interaction primitives.
    async fn evaluate(&self, script: &str) -> Result<Value, DriverError>;

    /// Click at an absolute viewport coordinate. Fallback for operations
    /// that carry a recorded position but no resolvable selector.
    async fn click_at(&self, x: i64, y: i64) -> Result<(), DriverError>;
}
