//! Labeled wall-clock regions, aggregated process-wide.
//!
//! `start`/`stop` bracket a named region; repeated regions accumulate. The
//! CLI dumps the totals on exit when verbose tracing is on.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

#[derive(Default)]
struct State {
    totals: HashMap<String, Duration>,
    open: HashMap<String, Instant>,
}

static TIMERS: OnceLock<Mutex<State>> = OnceLock::new();

fn state() -> &'static Mutex<State> {
    TIMERS.get_or_init(Default::default)
}

pub fn start(label: &str) {
    let mut s = state().lock().unwrap();
    s.open.insert(label.to_string(), Instant::now());
}

pub fn stop(label: &str) {
    let mut s = state().lock().unwrap();
    if let Some(t0) = s.open.remove(label) {
        *s.totals.entry(label.to_string()).or_default() += t0.elapsed();
    }
}

/// Accumulated totals, sorted by label.
pub fn report() -> Vec<(String, Duration)> {
    let s = state().lock().unwrap();
    let mut out: Vec<(String, Duration)> = s
        .totals
        .iter()
        .map(|(k, v)| (k.clone(), *v))
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}
