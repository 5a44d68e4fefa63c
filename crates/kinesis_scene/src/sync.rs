//! Physics -> render transform sync

use crate::binding::ProxyBindings;
use crate::proxy::{ProxyHandle, ProxyHost};
use kinesis_physics::{BodyHandle, PhysicsWorld};

/// Why a binding could not be synced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    /// The body was removed without severing its binding
    BodyRemoved,
    /// The host no longer has the proxy
    ProxyMissing,
}

/// A binding skipped during sync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleBinding {
    pub body: BodyHandle,
    pub proxy: ProxyHandle,
    pub reason: StaleReason,
}

/// Outcome of one sync pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Proxies that received a transform
    pub synced: usize,
    /// Bindings that point at something gone
    pub stale: Vec<StaleBinding>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.stale.is_empty()
    }
}

/// Copy every bound body's pose onto its proxy
///
/// Run once per frame, after the last step and before drawing. Taking the
/// world by shared reference means no step can be in progress. Stale bindings
/// are reported and left in place.
pub fn sync_all(world: &PhysicsWorld, bindings: &ProxyBindings, host: &mut dyn ProxyHost) -> SyncReport {
    let mut report = SyncReport::default();

    for (body, proxy) in bindings.iter() {
        let reason = match world.pose(body) {
            Ok(pose) => {
                if host.apply_transform(proxy, pose.position, pose.orientation) {
                    report.synced += 1;
                    continue;
                }
                StaleReason::ProxyMissing
            }
            Err(_) => StaleReason::BodyRemoved,
        };
        log::warn!("Stale binding {:?} -> {:?}: {:?}", body, proxy, reason);
        report.stale.push(StaleBinding {
            body,
            proxy,
            reason,
        });
    }

    report
}
