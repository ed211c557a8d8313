//! Material consumption engine
//!
//! Applies and reverses an order's material usage against the inventory
//! ledger. Stock never goes negative: deductions clamp at zero and proceed.
//! Unknown materials (deleted since the order was taken) are skipped.

use shared::{DeductedMaterial, UsedMaterial};
use uuid::Uuid;

use super::inventory::InventoryLedger;

/// Stateless engine; every call takes the ledger it acts on
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialConsumptionEngine;

impl MaterialConsumptionEngine {
    /// Take `materials` out of stock, clamping each at zero.
    /// Returns the resulting deduction snapshot.
    pub fn deduct(
        ledger: &mut InventoryLedger,
        materials: &[UsedMaterial],
    ) -> Vec<DeductedMaterial> {
        Self::reconcile(ledger, &[], materials)
    }

    /// Put `materials` back into stock
    pub fn restore(ledger: &mut InventoryLedger, materials: &[UsedMaterial]) {
        for line in materials {
            if ledger.put_back(line.inventory_id, line.quantity).is_none() {
                tracing::warn!(
                    inventory_id = %line.inventory_id,
                    "restore skipped unknown material"
                );
            }
        }
    }

    /// Return everything a snapshot actually took out of stock
    pub fn release(ledger: &mut InventoryLedger, snapshot: &[DeductedMaterial]) {
        for entry in snapshot.iter().filter(|entry| entry.removed > 0) {
            if ledger.put_back(entry.inventory_id, entry.removed).is_none() {
                tracing::warn!(
                    inventory_id = %entry.inventory_id,
                    "release skipped unknown material"
                );
            }
        }
    }

    /// Move stock from what `previous` accounts for to what `target` needs,
    /// touching the ledger only by the difference.
    ///
    /// When a requested quantity shrinks, the unfulfilled shortfall is
    /// released first and only the remainder goes back to stock, so the
    /// ledger gets back exactly what it gave.
    pub fn reconcile(
        ledger: &mut InventoryLedger,
        previous: &[DeductedMaterial],
        target: &[UsedMaterial],
    ) -> Vec<DeductedMaterial> {
        let mut ids: Vec<Uuid> = previous.iter().map(|entry| entry.inventory_id).collect();
        for line in target {
            if !ids.contains(&line.inventory_id) {
                ids.push(line.inventory_id);
            }
        }

        let mut snapshot = Vec::with_capacity(ids.len());
        for id in ids {
            let before = previous
                .iter()
                .find(|entry| entry.inventory_id == id)
                .cloned()
                .unwrap_or(DeductedMaterial {
                    inventory_id: id,
                    requested: 0,
                    removed: 0,
                });
            let wanted: u32 = target
                .iter()
                .filter(|line| line.inventory_id == id)
                .map(|line| line.quantity)
                .fold(0, u32::saturating_add);

            let after = if wanted > before.requested {
                let delta = wanted - before.requested;
                let removed = ledger.take(id, delta).unwrap_or_else(|| {
                    tracing::warn!(inventory_id = %id, "deduction skipped unknown material");
                    0
                });
                tracing::debug!(inventory_id = %id, delta, removed, "materials deducted");
                DeductedMaterial {
                    inventory_id: id,
                    requested: wanted,
                    removed: before.removed + removed,
                }
            } else if wanted < before.requested {
                let release = before.requested - wanted;
                let give_back = release - release.min(before.shortfall());
                if give_back > 0 && ledger.put_back(id, give_back).is_none() {
                    tracing::warn!(inventory_id = %id, "restore skipped unknown material");
                }
                tracing::debug!(inventory_id = %id, release, give_back, "materials restored");
                DeductedMaterial {
                    inventory_id: id,
                    requested: wanted,
                    removed: before.removed - give_back,
                }
            } else {
                before
            };

            if after.requested > 0 {
                snapshot.push(after);
            }
        }
        snapshot
    }
}
