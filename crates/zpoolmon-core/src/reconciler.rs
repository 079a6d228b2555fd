//! Keeps one long-lived panel per pool in step with successive snapshots.
//!
//! Panels are keyed by pool name. A pool that stays in the snapshot keeps its
//! panel (and whatever scroll or focus state the panel holds); only pools that
//! appear or vanish cause a mount or a dispose. Newly seen pools are mounted in
//! ascending name order after the panels that already exist.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::snapshot::{PoolEntry, PoolSnapshot};

/// A display element bound to a single pool.
pub trait Panel: Sized {
    fn mount(name: &str, entry: &PoolEntry) -> Self;

    fn update(&mut self, entry: &PoolEntry);

    /// Release whatever the panel holds. Called exactly once, when its pool
    /// leaves the snapshot or the reconciler is disposed.
    fn dispose(self) {}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub removed: Vec<String>,
}

impl ReconcileReport {
    pub fn changed_layout(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

pub struct Reconciler<P: Panel> {
    panels: BTreeMap<String, P>,
    order: Vec<String>,
    disposed: bool,
}

impl<P: Panel> Default for Reconciler<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Panel> Reconciler<P> {
    pub fn new() -> Self {
        Self {
            panels: BTreeMap::new(),
            order: Vec::new(),
            disposed: false,
        }
    }

    /// Bring the panel set in line with `snapshot`: update survivors in place,
    /// dispose panels whose pool is gone, mount panels for new pools.
    pub fn reconcile(&mut self, snapshot: &PoolSnapshot) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        if self.disposed {
            debug!("reconcile after dispose ignored");
            return report;
        }

        let gone: Vec<String> = self
            .order
            .iter()
            .filter(|name| snapshot.get(name).is_none())
            .cloned()
            .collect();
        for name in gone {
            if let Some(panel) = self.panels.remove(&name) {
                panel.dispose();
            }
            info!(pool = %name, "pool removed");
            report.removed.push(name);
        }
        self.order.retain(|name| self.panels.contains_key(name));

        for name in &self.order {
            if let (Some(panel), Some(entry)) = (self.panels.get_mut(name), snapshot.get(name)) {
                panel.update(entry);
                report.updated.push(name.clone());
            }
        }

        for (name, entry) in snapshot.iter() {
            if self.panels.contains_key(name) {
                continue;
            }
            self.panels.insert(name.to_string(), P::mount(name, entry));
            self.order.push(name.to_string());
            info!(pool = %name, "pool added");
            report.added.push(name.to_string());
        }

        debug!(
            added = report.added.len(),
            updated = report.updated.len(),
            removed = report.removed.len(),
            "reconciled"
        );
        report
    }

    /// Dispose every panel. Later reconciles do nothing.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for name in self.order.drain(..) {
            if let Some(panel) = self.panels.remove(&name) {
                panel.dispose();
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Panels in mount order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &P)> {
        self.order
            .iter()
            .filter_map(|name| self.panels.get(name).map(|panel| (name.as_str(), panel)))
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn get(&self, name: &str) -> Option<&P> {
        self.panels.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut P> {
        self.panels.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}
