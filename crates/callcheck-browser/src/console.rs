//! In-page console capture
//!
//! The page under test logs its signaling and negotiation progress through
//! `console.log`; relaying those lines makes a failed run debuggable. The
//! capture works by wrapping the console methods in the page and buffering
//! lines in `window.__callcheck_log`, which the runner drains between polls.
//!
//! The hook is installed after navigation completes, so output emitted
//! during initial page load is not captured. Everything from the join
//! actions onward (which is what matters for diagnosis) is.
//!
//! Capture is purely observational: failures here are logged and never
//! affect control flow.

use crate::browser::PeerSession;
use crate::error::Result;
use tracing::{debug, info};

const INSTALL_SCRIPT: &str = r#"(() => {
    if (window.__callcheck_log) { return true; }
    window.__callcheck_log = [];
    for (const level of ['log', 'info', 'warn', 'error']) {
        const original = console[level].bind(console);
        console[level] = (...args) => {
            try {
                window.__callcheck_log.push(args.map(a => {
                    if (typeof a === 'string') { return a; }
                    try { return JSON.stringify(a); } catch (_) { return String(a); }
                }).join(' '));
            } catch (_) {}
            original(...args);
        };
    }
    return true;
})()"#;

const DRAIN_SCRIPT: &str = r#"(() => {
    const buf = window.__callcheck_log || [];
    window.__callcheck_log = [];
    return JSON.stringify(buf);
})()"#;

/// Install the console hook into a session's page
///
/// Idempotent: re-installing after the hook exists is a no-op.
pub fn install_hook(session: &PeerSession) -> Result<()> {
    session.evaluate(INSTALL_SCRIPT)?;
    debug!("{}: console hook installed", session.slot());
    Ok(())
}

/// Drain buffered console lines from a session's page
pub fn drain(session: &PeerSession) -> Result<Vec<String>> {
    let value = session.evaluate(DRAIN_SCRIPT)?;
    Ok(parse_drained(&value))
}

/// Drain and relay console lines through the runner's log, tagged by peer
pub fn relay(session: &PeerSession) {
    match drain(session) {
        Ok(lines) => {
            for line in lines {
                info!("{} console: {}", session.slot(), line);
            }
        }
        Err(e) => debug!("{}: console drain failed: {}", session.slot(), e),
    }
}

/// Decode the JSON-stringified line buffer returned by the drain script
fn parse_drained(value: &serde_json::Value) -> Vec<String> {
    let Some(raw) = value.as_str() else {
        return Vec::new();
    };
    serde_json::from_str(raw).unwrap_or_default()
}
