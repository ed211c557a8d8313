//! Material requirement rules for orders

use uuid::Uuid;

use crate::models::{MaterialsMode, OrderItem, RecipeLine, UsedMaterial};

/// An order is in auto mode as soon as one of its items is linked to a product
pub fn materials_mode(items: &[OrderItem]) -> MaterialsMode {
    if items.iter().any(OrderItem::is_linked) {
        MaterialsMode::Auto
    } else {
        MaterialsMode::Manual
    }
}

/// Merge material lines by inventory id, keeping first-seen order.
/// Lines that end up with a zero quantity are dropped.
pub fn merge_materials<I>(lines: I) -> Vec<UsedMaterial>
where
    I: IntoIterator<Item = UsedMaterial>,
{
    let mut merged: Vec<UsedMaterial> = Vec::new();
    for line in lines {
        match merged.iter_mut().find(|m| m.inventory_id == line.inventory_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => merged.push(line),
        }
    }
    merged.retain(|m| m.quantity > 0);
    merged
}

/// Merge recipe lines by inventory id
pub fn merge_recipe<I>(lines: I) -> Vec<RecipeLine>
where
    I: IntoIterator<Item = RecipeLine>,
{
    let mut merged: Vec<RecipeLine> = Vec::new();
    for line in lines {
        match merged.iter_mut().find(|r| r.inventory_id == line.inventory_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => merged.push(line),
        }
    }
    merged
}

/// Materials consumed by the linked items of an order:
/// `recipe.quantity x item.quantity`, merged by inventory id.
///
/// `describe` supplies the (name, unit) label of a material; unknown
/// materials are labelled with their id.
pub fn expand_recipes<F>(items: &[OrderItem], describe: F) -> Vec<UsedMaterial>
where
    F: Fn(Uuid) -> Option<(String, String)>,
{
    let lines = items
        .iter()
        .filter(|item| item.is_linked())
        .flat_map(|item| {
            item.recipe
                .iter()
                .map(move |line| (line.inventory_id, line.quantity.saturating_mul(item.quantity)))
        })
        .map(|(inventory_id, quantity)| {
            let (name, unit) = describe(inventory_id)
                .unwrap_or_else(|| (inventory_id.to_string(), String::new()));
            UsedMaterial {
                inventory_id,
                name,
                unit,
                quantity,
            }
        });

    merge_materials(lines)
}
