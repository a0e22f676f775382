//! Teaching log: a fixed-width narration of a run's trade events.
//!
//! Rendering is pure: the table is returned as a `String` and the caller
//! decides where it goes.

use std::fmt::Write;

use swinglab_core::TradeEvent;

/// Default number of events rendered.
pub const DEFAULT_TEACHING_ROWS: usize = 20;

const BANNER: &str = "==================== TEACHING LOG ====================";
const HEADER: &str =
    "Index | Timestamp           | Action | Sig | Price    | Shares     | PnL        | Equity";
const RULE: &str = "-------------------------------------------------------";
const FOOTER: &str = "=======================================================";

/// Render the first `max_rows` events as a table.
///
/// Entries have no realized PnL and show `0.00`.
pub fn format_teaching_log(events: &[TradeEvent], max_rows: usize) -> String {
    if events.is_empty() {
        return "No teaching logs available.\n".to_string();
    }

    let mut out = String::new();
    out.push('\n');
    out.push_str(BANNER);
    out.push('\n');
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(RULE);
    out.push('\n');

    for (i, event) in events.iter().take(max_rows).enumerate() {
        // Writing into a String cannot fail
        let _ = writeln!(
            out,
            "{:5} | {:19} | {:6} | {:+3} | {:8.2} | {:10.2} | {:10.2} | {:10.2}",
            i + 1,
            event.timestamp.to_string(),
            event.action.label(),
            event.signal.value(),
            event.price,
            event.shares,
            event.realized_pnl(),
            event.equity,
        );
    }

    out.push_str(FOOTER);
    out.push('\n');
    out
}
