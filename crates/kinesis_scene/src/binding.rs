//! Body <-> proxy bindings
//!
//! Bindings live in their own table rather than on either side, so removing a
//! body or a proxy never dangles a pointer: a binding can only go stale, and
//! stale bindings are reported by the sync layer until severed explicitly.

use crate::proxy::ProxyHandle;
use kinesis_physics::BodyHandle;
use std::collections::HashMap;

/// Bidirectional one-to-one table of body/proxy pairs
#[derive(Debug, Default, Clone)]
pub struct ProxyBindings {
    by_body: HashMap<BodyHandle, ProxyHandle>,
    by_proxy: HashMap<ProxyHandle, BodyHandle>,
}

impl ProxyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a body to a proxy
    ///
    /// Any existing binding of either the body or the proxy is severed first.
    pub fn bind(&mut self, body: BodyHandle, proxy: ProxyHandle) {
        if let Some(old_proxy) = self.by_body.remove(&body) {
            self.by_proxy.remove(&old_proxy);
            log::debug!("Rebinding body {:?}: dropped proxy {:?}", body, old_proxy);
        }
        if let Some(old_body) = self.by_proxy.remove(&proxy) {
            self.by_body.remove(&old_body);
            log::debug!("Rebinding proxy {:?}: dropped body {:?}", proxy, old_body);
        }
        self.by_body.insert(body, proxy);
        self.by_proxy.insert(proxy, body);
    }

    /// Sever the binding of a body
    pub fn unbind_body(&mut self, body: BodyHandle) -> Option<ProxyHandle> {
        let proxy = self.by_body.remove(&body)?;
        self.by_proxy.remove(&proxy);
        Some(proxy)
    }

    /// Sever the binding of a proxy
    pub fn unbind_proxy(&mut self, proxy: ProxyHandle) -> Option<BodyHandle> {
        let body = self.by_proxy.remove(&proxy)?;
        self.by_body.remove(&body);
        Some(body)
    }

    pub fn proxy_for(&self, body: BodyHandle) -> Option<ProxyHandle> {
        self.by_body.get(&body).copied()
    }

    pub fn body_for(&self, proxy: ProxyHandle) -> Option<BodyHandle> {
        self.by_proxy.get(&proxy).copied()
    }

    /// Iterate (body, proxy) pairs
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, ProxyHandle)> + '_ {
        self.by_body.iter().map(|(b, p)| (*b, *p))
    }

    pub fn len(&self) -> usize {
        self.by_body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_body.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_body.clear();
        self.by_proxy.clear();
    }
}
