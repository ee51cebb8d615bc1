//! Interactive commands read from stdin while watching.

use anyhow::{Result, bail};
use std::io::BufRead;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::filter::{FilterSelection, Region, parse_min_magnitude};

const LINE_BUFFER: usize = 16;

/// Reads lines from `reader` on a dedicated OS thread and forwards them.
///
/// The thread is never joined, so a read blocked on an idle terminal does not
/// hold up shutdown. The channel closes at EOF or on a read error.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_BUFFER);

    std::thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read controls");
                    break;
                }
            }
        }
        debug!("Control input closed");
    });

    rx
}

#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// `min <value>`
    MinMagnitude(f64),
    /// `region <token>`; `all` clears the region filter.
    Region(Region),
    /// `refresh`
    Refresh,
    /// `quit`
    Quit,
}

impl Control {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (command, arg) = match line.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line, ""),
        };

        let control = match (command, arg) {
            ("min", "") => bail!("usage: min <magnitude>"),
            ("min", value) => Control::MinMagnitude(parse_min_magnitude(value)?),
            ("region", "") => bail!("usage: region <token|all>"),
            ("region", token) => Control::Region(Region::from_token(token)),
            ("refresh", _) => Control::Refresh,
            ("quit" | "exit", _) => Control::Quit,
            (other, _) => bail!("unknown command: {other}"),
        };

        Ok(Some(control))
    }

    /// Applies a filter change. Returns `true` when the filter was modified
    /// and a refresh should follow.
    pub fn apply(&self, filter: &mut FilterSelection) -> bool {
        match self {
            Control::MinMagnitude(value) => {
                filter.min_magnitude = *value;
                true
            }
            Control::Region(region) => {
                filter.region = region.clone();
                true
            }
            Control::Refresh | Control::Quit => false,
        }
    }
}
