// SPDX-License-Identifier: GPL-3.0-only

//! Frame scanning
//!
//! The decode strategy, the per-tick scan semantics, and the loop
//! controller that drives ticks for headless runs.

pub mod content;
pub mod decoder;
pub mod scan_loop;

pub use content::QrContent;
pub use decoder::{QrDecoder, RqrrDecoder};
pub use scan_loop::{ScanLoopController, TickOutcome, run_tick};
