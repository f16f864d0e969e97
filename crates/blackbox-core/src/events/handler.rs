//! BlackboxEventHandler trait, all methods with no-op defaults.

use super::types::*;

/// Receives scan lifecycle notifications.
///
/// Handlers override only the events they care about.
pub trait BlackboxEventHandler: Send + Sync {
    fn on_scan_started(&self, _event: &ScanStartedEvent) {}
    fn on_scan_progress(&self, _event: &ScanProgressEvent) {}
    fn on_scan_complete(&self, _event: &ScanCompleteEvent) {}
    fn on_scan_error(&self, _event: &ScanErrorEvent) {}
}
