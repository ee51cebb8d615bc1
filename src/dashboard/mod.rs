//! Presentation seam.
//!
//! [`Dashboard`] receives finished [`Snapshot`]s and alert records; nothing
//! behind it feeds back into filtering or aggregation.
//! [`ConsoleDashboard`] draws to any `Write`r, normally stdout.

mod console;

pub use console::ConsoleDashboard;

use anyhow::Result;

use crate::presentation::{PresentationRecord, Snapshot};

pub trait Dashboard {
    /// Replaces everything currently shown with `snapshot`.
    fn render(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Raises the major-earthquake alert for one record.
    fn alert(&mut self, record: &PresentationRecord) -> Result<()>;
}
