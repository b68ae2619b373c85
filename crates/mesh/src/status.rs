//! Live status parsing and reconciliation rules
//!
//! Parses the line-oriented `wg show` output into per-peer reports and
//! decides connectivity conservatively: a peer is `connected` only on
//! evidence of a fresh handshake. Stale or missing evidence means
//! `disconnected`, never "unknown".

use crate::model::PeerLinkState;

/// Handshake freshness window; older handshakes count as disconnected
pub const DEFAULT_FRESHNESS_SECS: i64 = 300;

/// One peer's entry in the daemon's status output
#[derive(Debug, Clone, Default)]
pub struct PeerReport {
    pub public_key: String,
    pub endpoint: Option<String>,
    pub allowed_ips: Option<String>,
    pub latest_handshake_at: Option<i64>,
    pub rx_bytes: Option<u64>,
    pub tx_bytes: Option<u64>,
}

/// Parse `wg show <iface>` output.
///
/// Line-oriented state machine: a `peer:` header opens a report, indented
/// `key: value` lines fill it in, an `interface:` header closes it.
/// Relative handshake phrases are anchored to `now` (epoch seconds).
pub fn parse_wg_show(output: &str, now: i64) -> Vec<PeerReport> {
    let mut reports = Vec::new();
    let mut current: Option<PeerReport> = None;

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(key) = line.strip_prefix("peer:") {
            if let Some(done) = current.take() {
                reports.push(done);
            }
            current = Some(PeerReport {
                public_key: key.trim().to_string(),
                ..Default::default()
            });
            continue;
        }

        if line.starts_with("interface:") {
            if let Some(done) = current.take() {
                reports.push(done);
            }
            continue;
        }

        let Some(report) = current.as_mut() else {
            continue;
        };
        let Some((field, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        match field.trim() {
            "endpoint" => report.endpoint = Some(value.to_string()),
            "allowed ips" => report.allowed_ips = Some(value.to_string()),
            "latest handshake" => {
                report.latest_handshake_at = parse_handshake_phrase(value, now);
            }
            "transfer" => {
                let (rx, tx) = parse_transfer(value);
                report.rx_bytes = rx;
                report.tx_bytes = tx;
            }
            _ => {}
        }
    }

    if let Some(done) = current.take() {
        reports.push(done);
    }
    reports
}

/// Convert a relative handshake phrase ("1 minute, 52 seconds ago", "Now")
/// into epoch seconds anchored at `now`
fn parse_handshake_phrase(phrase: &str, now: i64) -> Option<i64> {
    let phrase = phrase.trim();
    if phrase.eq_ignore_ascii_case("now") {
        return Some(now);
    }

    let phrase = phrase.strip_suffix("ago")?.trim();
    let mut total: i64 = 0;
    for part in phrase.split(',') {
        let mut words = part.split_whitespace();
        let count: i64 = words.next()?.parse().ok()?;
        let unit = words.next()?;
        let secs = match unit.trim_end_matches('s') {
            "second" => 1,
            "minute" => 60,
            "hour" => 3600,
            "day" => 86_400,
            "year" => 31_536_000,
            _ => return None,
        };
        total += count * secs;
    }
    Some(now - total)
}

/// Parse "1.21 MiB received, 4.37 MiB sent" into byte counters
fn parse_transfer(value: &str) -> (Option<u64>, Option<u64>) {
    let mut rx = None;
    let mut tx = None;
    for part in value.split(',') {
        let part = part.trim();
        if let Some(size) = part.strip_suffix("received") {
            rx = parse_size(size.trim());
        } else if let Some(size) = part.strip_suffix("sent") {
            tx = parse_size(size.trim());
        }
    }
    (rx, tx)
}

fn parse_size(s: &str) -> Option<u64> {
    let (amount, unit) = s.split_once(' ')?;
    let amount: f64 = amount.parse().ok()?;
    let scale: u64 = match unit {
        "B" => 1,
        "KiB" => 1 << 10,
        "MiB" => 1 << 20,
        "GiB" => 1 << 30,
        "TiB" => 1 << 40,
        _ => return None,
    };
    Some((amount * scale as f64) as u64)
}

/// Decide a peer's link state from its (possibly absent) status report.
///
/// Returns the state plus the handshake timestamp to persist, if any.
/// Absence of evidence is disconnection; only a handshake inside the
/// freshness window yields `connected`.
pub fn reconcile_link(
    report: Option<&PeerReport>,
    now: i64,
    freshness_secs: i64,
) -> (PeerLinkState, Option<i64>) {
    match report.and_then(|r| r.latest_handshake_at) {
        Some(at) if now - at <= freshness_secs => (PeerLinkState::Connected, Some(at)),
        Some(at) => (PeerLinkState::Disconnected, Some(at)),
        None => (PeerLinkState::Disconnected, None),
    }
}
