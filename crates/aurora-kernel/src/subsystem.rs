//! The lifecycle contract every component registers with the Control
//! Plane under.

use async_trait::async_trait;

/// A component the Control Plane starts, stops, and restarts in order.
///
/// Registered with [`crate::ControlPlane::register`] in dependency order
/// (Policy before Audit before Cache, ...); shutdown and emergency stop
/// run in the reverse and concurrently respectively — see spec §4.9.
#[async_trait]
pub trait Subsystem: Send + Sync {
    /// Stable name used in audit events and error messages. Must be
    /// unique among subsystems registered with the same Control Plane.
    fn name(&self) -> &str;

    /// Bring the subsystem up. Called once per
    /// [`crate::ControlPlane::start_all`] or
    /// [`crate::ControlPlane::restart`].
    async fn start(&self) -> Result<(), String>;

    /// Tear the subsystem down. Called once per
    /// [`crate::ControlPlane::stop_all`] or
    /// [`crate::ControlPlane::emergency_stop`]. Must not panic; a
    /// failing stop is recorded but does not prevent other subsystems
    /// from stopping.
    async fn stop(&self) -> Result<(), String>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::Subsystem;
    use async_trait::async_trait;

    pub struct RecordingSubsystem {
        pub name: &'static str,
        pub starts: Arc<AtomicUsize>,
        pub stops: Arc<AtomicUsize>,
        pub fail_start: bool,
        pub fail_stop: bool,
    }

    #[async_trait]
    impl Subsystem for RecordingSubsystem {
        fn name(&self) -> &str {
            self.name
        }

        async fn start(&self) -> Result<(), String> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            if self.fail_start {
                return Err(format!("{} refused to start", self.name));
            }
            Ok(())
        }

        async fn stop(&self) -> Result<(), String> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            if self.fail_stop {
                return Err(format!("{} refused to stop", self.name));
            }
            Ok(())
        }
    }
}
