//! Building blocks shared by the batch converter and the comparator.
//!
//! ## Data Flow
//!
//! ```text
//! scan ──▶ (external converter) ──▶ text ──▶ diff
//! (*.pdf)   (subprocess)            (lossy)   (unified)
//! ```
//!
//! 1. [`scan`]: enumerate `*.pdf` inputs and pick one at random
//! 2. [`text`]: read converter output with an explicit decoding strategy
//!    and split it into lines
//! 3. [`diff`]: unified line diff between two outputs

pub mod diff;
pub mod scan;
pub mod text;
