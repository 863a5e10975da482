//! Prometheus metrics
//!
//! Installs the global recorder and describes the bridge counters.

use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

pub const INCOMING_REPORTED: &str = "ringbridge_incoming_reported_total";
pub const CALLS_ENDED: &str = "ringbridge_calls_ended_total";
pub const VENDOR_RPC_FAILURES: &str = "ringbridge_vendor_rpc_failures_total";
pub const MISSED_CALL_NOTIFICATIONS: &str = "ringbridge_missed_call_notifications_total";

/// Initialize the Prometheus metrics exporter
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(
        INCOMING_REPORTED,
        "Incoming calls reported to the native call UI"
    );
    describe_counter!(
        CALLS_ENDED,
        "Calls reported ended to the native call UI, by end reason"
    );
    describe_counter!(
        VENDOR_RPC_FAILURES,
        "Failed vendor session RPCs, by RPC"
    );
    describe_counter!(
        MISSED_CALL_NOTIFICATIONS,
        "Missed call notifications scheduled"
    );

    Ok(handle)
}
