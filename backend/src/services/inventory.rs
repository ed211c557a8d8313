//! Inventory ledger: on-hand quantity per raw material

use chrono::Utc;
use shared::{
    validate_new_inventory_item, InventoryItem, InventoryItemUpdate, NewInventoryItem, UsedMaterial,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Current stock of every raw material of one account.
///
/// Quantities change through manual edits, purchase restocks and the
/// material consumption engine only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryLedger {
    items: Vec<InventoryItem>,
}

impl InventoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<InventoryItem>) -> Self {
        Self { items }
    }

    pub fn list(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn find(&self, id: Uuid) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get(&self, id: Uuid) -> AppResult<&InventoryItem> {
        self.find(id)
            .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
    }

    pub fn quantity_of(&self, id: Uuid) -> Option<u32> {
        self.find(id).map(|item| item.quantity)
    }

    /// (name, unit) label of a material
    pub fn describe(&self, id: Uuid) -> Option<(String, String)> {
        self.find(id).map(|item| (item.name.clone(), item.unit.clone()))
    }

    /// Add a material; newest first
    pub fn add_item(&mut self, input: NewInventoryItem) -> AppResult<InventoryItem> {
        validate_new_inventory_item(&input)?;

        let item = InventoryItem {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            quantity: input.quantity,
            unit: input.unit.trim().to_string(),
            import_price: input.import_price,
            updated_at: Utc::now(),
        };
        self.items.insert(0, item.clone());

        tracing::info!(
            item_id = %item.id,
            name = %item.name,
            quantity = item.quantity,
            "inventory item added"
        );
        Ok(item)
    }

    /// Manual edit, including setting the on-hand quantity directly
    pub fn update_item(
        &mut self,
        id: Uuid,
        update: InventoryItemUpdate,
    ) -> AppResult<InventoryItem> {
        let item = self.find_mut(id)?;

        let name = update.name.unwrap_or_else(|| item.name.clone());
        let unit = update.unit.unwrap_or_else(|| item.unit.clone());
        validate_new_inventory_item(&NewInventoryItem {
            name: name.clone(),
            quantity: update.quantity.unwrap_or(item.quantity),
            unit: unit.clone(),
            import_price: update.import_price.or(item.import_price),
        })?;

        item.name = name.trim().to_string();
        item.unit = unit.trim().to_string();
        if let Some(quantity) = update.quantity {
            item.quantity = quantity;
        }
        if update.import_price.is_some() {
            item.import_price = update.import_price;
        }
        item.updated_at = Utc::now();

        tracing::info!(item_id = %id, quantity = item.quantity, "inventory item updated");
        Ok(item.clone())
    }

    /// Remove a material. Orders and recipes referencing it keep their copies.
    pub fn delete_item(&mut self, id: Uuid) -> AppResult<InventoryItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        let removed = self.items.remove(index);
        tracing::info!(item_id = %id, name = %removed.name, "inventory item deleted");
        Ok(removed)
    }

    /// Add purchased materials to stock.
    ///
    /// Returns the lines that were applied, labelled with the ledger's
    /// current name and unit; unknown materials are skipped.
    pub fn restock(&mut self, materials: &[UsedMaterial]) -> Vec<UsedMaterial> {
        let mut applied = Vec::with_capacity(materials.len());
        for line in materials {
            match self.put_back(line.inventory_id, line.quantity) {
                Some(_) => {
                    let (name, unit) = self
                        .describe(line.inventory_id)
                        .unwrap_or_else(|| (line.name.clone(), line.unit.clone()));
                    applied.push(UsedMaterial::new(line.inventory_id, name, unit, line.quantity));
                }
                None => {
                    tracing::warn!(
                        inventory_id = %line.inventory_id,
                        "restock skipped unknown material"
                    );
                }
            }
        }
        applied
    }

    /// Materials at or below `threshold`
    pub fn low_stock(&self, threshold: u32) -> Vec<&InventoryItem> {
        self.items.iter().filter(|item| item.quantity <= threshold).collect()
    }

    /// Remove up to `quantity`, clamping at zero. Returns what actually left
    /// stock, or `None` for an unknown material.
    pub(crate) fn take(&mut self, id: Uuid, quantity: u32) -> Option<u32> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        let removed = quantity.min(item.quantity);
        item.quantity -= removed;
        item.updated_at = Utc::now();
        Some(removed)
    }

    /// Return `quantity` to stock. `None` for an unknown material.
    pub(crate) fn put_back(&mut self, id: Uuid, quantity: u32) -> Option<u32> {
        let item = self.items.iter_mut().find(|item| item.id == id)?;
        item.quantity = item.quantity.saturating_add(quantity);
        item.updated_at = Utc::now();
        Some(item.quantity)
    }

    fn find_mut(&mut self, id: Uuid) -> AppResult<&mut InventoryItem> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
    }
}
