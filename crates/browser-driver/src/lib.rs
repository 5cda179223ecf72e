//! Browser driver boundary.
//!
//! The automation core never talks to a real browser directly; it consumes
//! the [`BrowserDriver`] capability defined here. A production driver wraps
//! CDP or WebDriver; tests script one in memory.

pub mod errors;
pub mod probes;

mod driver;

pub use driver::BrowserDriver;
pub use errors::DriverError;
