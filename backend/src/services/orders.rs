//! Order store: order entities, their lifecycle and their hold on stock

use std::collections::BTreeMap;

use chrono::Utc;
use rand::Rng;
use shared::materials::{expand_recipes, materials_mode, merge_materials, merge_recipe};
use shared::{
    validate_order_draft, BulkOrderRow, Customer, MaterialsMode, Order, OrderContent, OrderDraft,
    OrderExportRow, OrderItem, OrderItemDraft, OrderStatus, PaymentMethod, ShippingPayer,
    UsedMaterial,
};
use uuid::Uuid;

use super::catalog::ProductCatalog;
use super::consumption::MaterialConsumptionEngine;
use super::inventory::InventoryLedger;
use crate::error::{AppError, AppResult};

/// Customer name used for imported rows that leave it blank
pub const WALK_IN_CUSTOMER: &str = "Khách lẻ";

/// Carrier assumed for imported orders
pub const DEFAULT_CARRIER: &str = "Giao Hàng Nhanh";

/// Delivery code prefix of a carrier
pub fn delivery_code_prefix(carrier: &str) -> &'static str {
    match carrier.trim() {
        "Giao Hàng Nhanh" => "GHN",
        "Giao Hàng Tiết Kiệm" => "GHTK",
        "Viettel Post" => "VTP",
        _ => "AHA",
    }
}

/// All orders of one account, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderStore {
    orders: Vec<Order>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap persisted orders, recomputing any COD amount that no longer
    /// matches its items. An order whose amounts are out of range is
    /// rejected rather than loaded.
    pub fn from_orders(mut orders: Vec<Order>) -> AppResult<Self> {
        for order in &mut orders {
            let drifted = order.refresh_total().map_err(|err| {
                tracing::error!(
                    order_id = %order.id,
                    error = %err,
                    "stored order amounts out of range"
                );
                AppError::from(err)
            })?;
            if drifted {
                tracing::warn!(order_id = %order.id, "stored COD amount drifted, recomputed");
            }
        }
        Ok(Self { orders })
    }

    pub fn list(&self) -> &[Order] {
        &self.orders
    }

    pub fn get(&self, id: Uuid) -> AppResult<&Order> {
        self.orders
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    /// Create an order. A dispatched order (non-empty delivery code) takes
    /// its materials out of stock immediately.
    pub fn create(
        &mut self,
        draft: OrderDraft,
        catalog: &ProductCatalog,
        inventory: &mut InventoryLedger,
    ) -> AppResult<Order> {
        let content = resolve(draft, None, catalog, inventory)?;
        let mut order = Order::new(Uuid::new_v4(), Utc::now(), content)?;
        apply_consumption(&mut order, inventory);

        tracing::info!(
            order_id = %order.id,
            order_code = %order.order_code,
            cod = %order.total_amount(),
            dispatched = order.is_dispatched(),
            "order created"
        );

        self.orders.insert(0, order.clone());
        Ok(order)
    }

    /// Replace an order's content. Stock moves only by the difference
    /// between what the order already holds and what it now needs.
    pub fn update(
        &mut self,
        id: Uuid,
        draft: OrderDraft,
        catalog: &ProductCatalog,
        inventory: &mut InventoryLedger,
    ) -> AppResult<Order> {
        let index = self.index_of(id)?;
        let content = resolve(draft, Some(&self.orders[index]), catalog, inventory)?;

        let order = &mut self.orders[index];
        order.revise(content, Utc::now())?;
        apply_consumption(order, inventory);

        tracing::info!(
            order_id = %id,
            cod = %order.total_amount(),
            dispatched = order.is_dispatched(),
            "order updated"
        );
        Ok(order.clone())
    }

    /// Remove an order, returning whatever stock it held
    pub fn delete(&mut self, id: Uuid, inventory: &mut InventoryLedger) -> AppResult<Order> {
        let index = self.index_of(id)?;
        let order = self.orders.remove(index);
        MaterialConsumptionEngine::release(inventory, order.deducted_materials());

        tracing::info!(order_id = %id, order_code = %order.order_code, "order deleted");
        Ok(order)
    }

    /// Move an order to any status; stock is unaffected
    pub fn set_status(&mut self, id: Uuid, status: OrderStatus) -> AppResult<Order> {
        let index = self.index_of(id)?;
        let order = &mut self.orders[index];
        let from = order.status;
        order.status = status;
        order.updated_at = Utc::now();

        tracing::info!(order_id = %id, %from, to = %status, "order status changed");
        Ok(order.clone())
    }

    /// Hand an order to a carrier, generating a delivery code when it has
    /// none, and take its materials out of stock
    pub fn dispatch(
        &mut self,
        id: Uuid,
        carrier: &str,
        inventory: &mut InventoryLedger,
    ) -> AppResult<Order> {
        let carrier = carrier.trim();
        if carrier.is_empty() {
            return Err(AppError::validation(
                "delivery_unit",
                "Carrier is required",
                "Vui lòng chọn đơn vị vận chuyển",
            ));
        }

        let index = self.index_of(id)?;
        let order = &mut self.orders[index];
        order.delivery_unit = Some(carrier.to_string());
        if !order.is_dispatched() {
            order.delivery_code = Some(generate_delivery_code(carrier));
        }
        order.updated_at = Utc::now();
        apply_consumption(order, inventory);

        tracing::info!(
            order_id = %id,
            carrier,
            delivery_code = order.delivery_code.as_deref().unwrap_or_default(),
            "order dispatched"
        );
        Ok(order.clone())
    }

    /// Create one pending order per imported row. Every row is validated
    /// before any order is created.
    pub fn import_rows(&mut self, rows: Vec<BulkOrderRow>) -> AppResult<Vec<Order>> {
        let drafts: Vec<OrderDraft> = rows.into_iter().map(draft_from_row).collect();
        for (index, draft) in drafts.iter().enumerate() {
            validate_order_draft(draft).map_err(|e| e.within(&format!("rows[{}]", index)))?;
        }

        let catalog = ProductCatalog::default();
        let inventory = InventoryLedger::default();
        let now = Utc::now();

        let mut created = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let content = resolve(draft, None, &catalog, &inventory)?;
            created.push(Order::new(Uuid::new_v4(), now, content)?);
        }

        tracing::info!(count = created.len(), "orders imported");
        for order in created.iter().rev() {
            self.orders.insert(0, order.clone());
        }
        Ok(created)
    }

    /// Flat rows for spreadsheet export
    pub fn export_rows(&self) -> Vec<OrderExportRow> {
        self.orders.iter().map(OrderExportRow::from).collect()
    }

    /// Orders matching both filters, newest first; `None` matches anything
    pub fn filter(
        &self,
        status: Option<OrderStatus>,
        payment_method: Option<PaymentMethod>,
    ) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .filter(|o| payment_method.map_or(true, |m| o.payment_method == m))
            .collect()
    }

    /// Number of orders in each status, including empty ones
    pub fn status_counts(&self) -> BTreeMap<OrderStatus, usize> {
        let mut counts: BTreeMap<OrderStatus, usize> =
            OrderStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for order in &self.orders {
            *counts.entry(order.status).or_default() += 1;
        }
        counts
    }

    fn index_of(&self, id: Uuid) -> AppResult<usize> {
        self.orders
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }
}

/// Bring the order's hold on stock in line with its current state: all of
/// its materials once dispatched, nothing otherwise
fn apply_consumption(order: &mut Order, inventory: &mut InventoryLedger) {
    let target: &[UsedMaterial] = if order.is_dispatched() {
        &order.used_materials
    } else {
        &[]
    };
    let snapshot =
        MaterialConsumptionEngine::reconcile(inventory, order.deducted_materials(), target);
    order.set_deducted_materials(snapshot);
}

/// Validate a draft and derive everything the order stores from it.
/// Reads only; nothing is mutated until this succeeds.
fn resolve(
    draft: OrderDraft,
    existing: Option<&Order>,
    catalog: &ProductCatalog,
    inventory: &InventoryLedger,
) -> AppResult<OrderContent> {
    validate_order_draft(&draft)?;

    let items = draft
        .items
        .into_iter()
        .map(|item| resolve_item(item, existing, catalog))
        .collect::<AppResult<Vec<_>>>()?;

    let mode = materials_mode(&items);
    let used_materials = match mode {
        MaterialsMode::Auto => {
            if !draft.used_materials.is_empty() {
                tracing::debug!("manual materials ignored on an order with linked products");
            }
            let known: Vec<&UsedMaterial> = existing
                .map(|o| o.used_materials.iter().collect())
                .unwrap_or_default();
            expand_recipes(&items, |id| {
                inventory.describe(id).or_else(|| {
                    known
                        .iter()
                        .find(|m| m.inventory_id == id)
                        .map(|m| (m.name.clone(), m.unit.clone()))
                })
            })
        }
        MaterialsMode::Manual => merge_materials(draft.used_materials)
            .into_iter()
            .map(|mut line| {
                if line.name.trim().is_empty() {
                    if let Some((name, unit)) = inventory.describe(line.inventory_id) {
                        line.name = name;
                        line.unit = unit;
                    }
                }
                line
            })
            .collect(),
    };

    let order_code = non_empty(draft.order_code)
        .or_else(|| existing.map(|o| o.order_code.clone()))
        .unwrap_or_else(generate_order_code);
    let tracking_number = non_empty(draft.tracking_number)
        .or_else(|| existing.map(|o| o.tracking_number.clone()))
        .unwrap_or_else(generate_tracking_number);

    Ok(OrderContent {
        order_code,
        tracking_number,
        customer: Customer {
            name: draft.customer.name.trim().to_string(),
            phone: draft.customer.phone.trim().to_string(),
            address: draft.customer.address.trim().to_string(),
            email: draft.customer.email.trim().to_string(),
        },
        items,
        used_materials,
        materials_mode: mode,
        status: draft.status,
        shipping_fee: draft.shipping_fee,
        shipping_payer: draft.shipping_payer,
        payment_method: draft.payment_method,
        delivery_unit: draft.delivery_unit.and_then(non_empty),
        delivery_code: draft.delivery_code.and_then(non_empty),
        notes: draft.notes.and_then(non_empty),
    })
}

/// Attach the recipe snapshot to a linked line: the one it carries, else
/// the one the order already holds for that product, else the catalog's
fn resolve_item(
    item: OrderItemDraft,
    existing: Option<&Order>,
    catalog: &ProductCatalog,
) -> AppResult<OrderItem> {
    let recipe = match item.product_id {
        None => Vec::new(),
        Some(product_id) => match item.recipe {
            Some(recipe) => merge_recipe(recipe),
            None => existing
                .and_then(|o| o.items.iter().find(|i| i.product_id == Some(product_id)))
                .map(|i| i.recipe.clone())
                .or_else(|| catalog.find(product_id).map(|p| p.recipe.clone()))
                .ok_or_else(|| AppError::NotFound("Product".to_string()))?,
        },
    };

    Ok(OrderItem {
        product_id: item.product_id,
        product_name: item.product_name.trim().to_string(),
        price: item.price,
        quantity: item.quantity,
        recipe,
    })
}

fn draft_from_row(row: BulkOrderRow) -> OrderDraft {
    let customer_name =
        non_empty(row.customer_name).unwrap_or_else(|| WALK_IN_CUSTOMER.to_string());
    OrderDraft {
        customer: Customer {
            name: customer_name,
            phone: row.phone,
            address: row.address,
            email: String::new(),
        },
        items: vec![OrderItemDraft::unlinked(row.product_name, row.price, row.quantity.max(1))],
        status: OrderStatus::Pending,
        shipping_fee: row.shipping_fee,
        shipping_payer: ShippingPayer::Shop,
        payment_method: PaymentMethod::Cod,
        delivery_unit: Some(DEFAULT_CARRIER.to_string()),
        notes: Some(row.notes),
        ..Default::default()
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn generate_order_code() -> String {
    format!("DH{:03}", rand::thread_rng().gen_range(0..1000))
}

fn generate_tracking_number() -> String {
    format!("HFL{}", rand::thread_rng().gen_range(10_000_000..100_000_000))
}

fn generate_delivery_code(carrier: &str) -> String {
    format!(
        "{}{}",
        delivery_code_prefix(carrier),
        rand::thread_rng().gen_range(0..1_000_000)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_code_prefixes() {
        assert_eq!(delivery_code_prefix("Giao Hàng Nhanh"), "GHN");
        assert_eq!(delivery_code_prefix("Giao Hàng Tiết Kiệm"), "GHTK");
        assert_eq!(delivery_code_prefix("Viettel Post"), "VTP");
        assert_eq!(delivery_code_prefix("Ahamove"), "AHA");
    }

    #[test]
    fn test_generated_codes_shape() {
        let order_code = generate_order_code();
        assert!(order_code.starts_with("DH"));
        assert_eq!(order_code.len(), 5);

        let tracking = generate_tracking_number();
        assert!(tracking.starts_with("HFL"));
        assert_eq!(tracking.len(), 11);

        assert!(generate_delivery_code("Viettel Post").starts_with("VTP"));
    }

    #[test]
    fn test_row_defaults() {
        let draft = draft_from_row(BulkOrderRow {
            phone: "0912345678".to_string(),
            address: "123 Đường ABC, Hà Nội".to_string(),
            product_name: "Hoa Hồng Đỏ".to_string(),
            ..Default::default()
        });

        assert_eq!(draft.customer.name, WALK_IN_CUSTOMER);
        assert_eq!(draft.items[0].quantity, 1);
        assert_eq!(draft.shipping_payer, ShippingPayer::Shop);
        assert!(draft.delivery_code.is_none());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  GHN1  ".to_string()), Some("GHN1".to_string()));
        assert_eq!(non_empty("   ".to_string()), None);
    }
}
