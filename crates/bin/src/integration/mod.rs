//! Glue between the command line and the `itr` library.
//!
//! Configuration discovery, log initialization and rendering of reports.

pub(crate) mod config_loader;
pub(crate) mod logging;
pub(crate) mod render;
