//! Traversal metrics, emitted through the `metrics` facade.
//!
//! Nothing is recorded unless the application installs a recorder. Every
//! series carries a `label` tag taken from [`DriverConfig::label`], or
//! `"unlabeled"` when none was set.
//!
//! [`DriverConfig::label`]: crate::driver::DriverConfig::label

use metrics::{counter, histogram};

use crate::driver::Traversal;

pub const TRAVERSALS: &str = "passweld_traversals_total";
pub const ELEMENTS_PULLED: &str = "passweld_elements_pulled_total";
pub const EARLY_STOPS: &str = "passweld_early_stops_total";
pub const FAILURES: &str = "passweld_traversal_failures_total";
pub const SINKS_PER_TRAVERSAL: &str = "passweld_sinks_per_traversal";

fn tag(label: Option<&str>) -> String {
    label.unwrap_or("unlabeled").to_owned()
}

/// Record a completed traversal
pub fn record_traversal(label: Option<&str>, traversal: &Traversal) {
    let label = tag(label);
    counter!(TRAVERSALS, "label" => label.clone()).increment(1);
    counter!(ELEMENTS_PULLED, "label" => label.clone()).increment(traversal.pulled as u64);
    if traversal.stopped_early {
        counter!(EARLY_STOPS, "label" => label.clone()).increment(1);
    }
    histogram!(SINKS_PER_TRAVERSAL, "label" => label).record(traversal.sinks as f64);
}

/// Record a traversal aborted by a sink error
pub fn record_failure(label: Option<&str>) {
    counter!(FAILURES, "label" => tag(label)).increment(1);
}
