//! WebAssembly module for the shop ledger
//!
//! Provides client-side computation for the order form:
//! - COD and net receipt preview
//! - Material usage preview from product recipes

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use wasm_bindgen::prelude::*;

use shared::materials::expand_recipes;
use shared::money::{self, MoneyError, Settlement};
use shared::{InventoryItem, OrderItem, Product, RecipeLine, ShippingPayer};

/// Order line as the form holds it; the recipe is filled from the catalog
/// when missing
#[derive(Debug, Deserialize)]
struct FormItem {
    product_id: Option<Uuid>,
    #[serde(default)]
    product_name: String,
    price: Decimal,
    quantity: u32,
    recipe: Option<Vec<RecipeLine>>,
}

fn js_err(context: &str, err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, err))
}

fn parse_amount(value: &str) -> Result<Decimal, JsValue> {
    Decimal::from_str(value.trim()).map_err(|e| js_err("Invalid amount", e))
}

fn parse_payer(value: &str) -> Result<ShippingPayer, JsValue> {
    match value.trim() {
        v if v.eq_ignore_ascii_case("shop") => Ok(ShippingPayer::Shop),
        v if v.eq_ignore_ascii_case("customer") => Ok(ShippingPayer::Customer),
        other => Err(js_err("Invalid shipping payer", other)),
    }
}

/// COD amount the courier collects
#[wasm_bindgen]
pub fn calculate_cod(subtotal: &str, shipping_fee: &str, payer: &str) -> Result<String, JsValue> {
    let cod = money::cod(parse_amount(subtotal)?, parse_amount(shipping_fee)?, parse_payer(payer)?)
        .map_err(|e| js_err("Invalid COD", e))?;
    Ok(cod.to_string())
}

/// Net receipt for a COD amount, whoever pays shipping
#[wasm_bindgen]
pub fn calculate_net_received(cod: &str, shipping_fee: &str) -> Result<String, JsValue> {
    money::net_received(parse_amount(cod)?, parse_amount(shipping_fee)?)
        .map(|net| net.to_string())
        .map_err(|e| js_err("Invalid net receipt", e))
}

/// Full settlement of the form's items as JSON
#[wasm_bindgen]
pub fn preview_settlement(
    items_json: &str,
    shipping_fee: &str,
    payer: &str,
) -> Result<String, JsValue> {
    let items: Vec<FormItem> =
        serde_json::from_str(items_json).map_err(|e| js_err("Invalid items JSON", e))?;
    let settlement = settle_form(&items, parse_amount(shipping_fee)?, parse_payer(payer)?)
        .map_err(|e| js_err("Invalid order total", e))?;
    serde_json::to_string(&settlement).map_err(|e| js_err("Serialization failed", e))
}

fn settle_form(
    items: &[FormItem],
    shipping_fee: Decimal,
    payer: ShippingPayer,
) -> Result<Settlement, MoneyError> {
    let subtotal = money::line_subtotal(items.iter().map(|item| (item.price, item.quantity)))?;
    money::settle(subtotal, shipping_fee, payer)
}

/// Materials the form's linked items will consume, merged by material, as
/// JSON. `products_json` supplies recipes for items that carry none;
/// `inventory_json` supplies material names and units.
#[wasm_bindgen]
pub fn preview_materials(
    items_json: &str,
    products_json: &str,
    inventory_json: &str,
) -> Result<String, JsValue> {
    let items: Vec<FormItem> =
        serde_json::from_str(items_json).map_err(|e| js_err("Invalid items JSON", e))?;
    let products: Vec<Product> =
        serde_json::from_str(products_json).map_err(|e| js_err("Invalid products JSON", e))?;
    let inventory: Vec<InventoryItem> =
        serde_json::from_str(inventory_json).map_err(|e| js_err("Invalid inventory JSON", e))?;

    let materials = expand_recipes(&resolve_items(items, &products), |id| {
        inventory
            .iter()
            .find(|item| item.id == id)
            .map(|item| (item.name.clone(), item.unit.clone()))
    });
    serde_json::to_string(&materials).map_err(|e| js_err("Serialization failed", e))
}

fn resolve_items(items: Vec<FormItem>, products: &[Product]) -> Vec<OrderItem> {
    items
        .into_iter()
        .map(|item| {
            let recipe = match (item.product_id, item.recipe) {
                (Some(_), Some(recipe)) => recipe,
                (Some(id), None) => products
                    .iter()
                    .find(|p| p.id == id)
                    .map(|p| p.recipe.clone())
                    .unwrap_or_default(),
                (None, _) => Vec::new(),
            };
            OrderItem {
                product_id: item.product_id,
                product_name: item.product_name,
                price: item.price,
                quantity: item.quantity,
                recipe,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::UsedMaterial;

    #[test]
    fn test_cod_scenarios() {
        assert_eq!(calculate_cod("500000", "30000", "SHOP").unwrap(), "500000");
        assert_eq!(calculate_cod("500000", "30000", "CUSTOMER").unwrap(), "530000");
        assert_eq!(calculate_net_received("530000", "30000").unwrap(), "500000");
    }

    fn form_item(price: Decimal, quantity: u32) -> FormItem {
        FormItem {
            product_id: None,
            product_name: "Red Passion".to_string(),
            price,
            quantity,
            recipe: None,
        }
    }

    #[test]
    fn test_settle_form() {
        let items = vec![form_item(Decimal::from(500_000), 2)];
        let settlement =
            settle_form(&items, Decimal::from(30_000), ShippingPayer::Customer).unwrap();

        assert_eq!(settlement.subtotal, Decimal::from(1_000_000));
        assert_eq!(settlement.cod, Decimal::from(1_030_000));
        assert_eq!(settlement.net_received, Decimal::from(1_000_000));
    }

    #[test]
    fn test_settle_form_rejects_oversized_price() {
        let items = vec![form_item(Decimal::MAX, 2)];
        let result = settle_form(&items, Decimal::from(30_000), ShippingPayer::Shop);

        assert_eq!(result, Err(MoneyError::OutOfRange));
    }

    #[test]
    fn test_resolve_items_uses_catalog_recipe() {
        let rose = Uuid::new_v4();
        let product = Product {
            id: Uuid::new_v4(),
            name: "Red Passion".to_string(),
            price: Decimal::from(500_000),
            image: None,
            recipe: vec![RecipeLine::new(rose, 12)],
        };
        let items = vec![
            FormItem {
                product_id: Some(product.id),
                product_name: product.name.clone(),
                price: product.price,
                quantity: 2,
                recipe: None,
            },
            FormItem {
                product_id: None,
                product_name: "Thiệp".to_string(),
                price: Decimal::from(20_000),
                quantity: 1,
                recipe: None,
            },
        ];

        let resolved = resolve_items(items, &[product]);
        let materials =
            expand_recipes(&resolved, |_| Some(("Rose".to_string(), "stem".to_string())));

        assert_eq!(materials, vec![UsedMaterial::new(rose, "Rose", "stem", 24)]);
    }
}
