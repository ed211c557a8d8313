//! Validation utilities for the shop ledger
//!
//! Every check runs before any store is touched, so a rejected input leaves
//! nothing partially applied.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::money::{self, max_amount};

use crate::models::{
    Customer, NewInventoryItem, NewTransaction, OrderDraft, ProductInput, TransactionCategory,
    TransactionKind, UsedMaterial,
};

/// A rejected input field, with English and Vietnamese messages
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: &'static str,
    pub message_vi: &'static str,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: &'static str, message_vi: &'static str) -> Self {
        Self {
            field: field.into(),
            message,
            message_vi,
        }
    }

    /// Prefix the field path, e.g. `items[2].quantity`
    pub fn within(mut self, parent: &str) -> Self {
        self.field = format!("{}.{}", parent, self.field);
        self
    }
}

// ============================================================================
// Basic Checks
// ============================================================================

pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Value is required");
    }
    Ok(())
}

/// Prices must be strictly positive and no larger than the amount ceiling
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price must be positive");
    }
    validate_ceiling(price)
}

pub fn validate_ceiling(amount: Decimal) -> Result<(), &'static str> {
    if amount > max_amount() {
        return Err("Amount exceeds the maximum allowed");
    }
    Ok(())
}

pub fn validate_quantity(quantity: u32) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Quantity must be at least 1");
    }
    Ok(())
}

/// Shipping may be free but never negative
pub fn validate_shipping_fee(fee: Decimal) -> Result<(), &'static str> {
    if fee < Decimal::ZERO {
        return Err("Shipping fee cannot be negative");
    }
    validate_ceiling(fee)
}

// ============================================================================
// Entity Checks
// ============================================================================

pub fn validate_customer(customer: &Customer) -> Result<(), FieldError> {
    let required = [
        ("name", &customer.name, "Vui lòng nhập tên khách hàng"),
        ("phone", &customer.phone, "Vui lòng nhập số điện thoại"),
        ("address", &customer.address, "Vui lòng nhập địa chỉ"),
    ];
    for (field, value, message_vi) in required {
        validate_required(value)
            .map_err(|message| FieldError::new(field, message, message_vi).within("customer"))?;
    }
    Ok(())
}

pub fn validate_material_lines(lines: &[UsedMaterial], parent: &str) -> Result<(), FieldError> {
    for (index, line) in lines.iter().enumerate() {
        validate_quantity(line.quantity).map_err(|message| {
            FieldError::new(
                format!("{}[{}].quantity", parent, index),
                message,
                "Số lượng vật tư phải lớn hơn 0",
            )
        })?;
    }
    Ok(())
}

pub fn validate_order_draft(draft: &OrderDraft) -> Result<(), FieldError> {
    validate_customer(&draft.customer)?;

    if draft.items.is_empty() {
        return Err(FieldError::new(
            "items",
            "An order needs at least one item",
            "Đơn hàng phải có ít nhất một sản phẩm",
        ));
    }

    for (index, item) in draft.items.iter().enumerate() {
        let parent = format!("items[{}]", index);
        validate_required(&item.product_name).map_err(|message| {
            FieldError::new(
                "product_name",
                message,
                "Vui lòng nhập tên sản phẩm cho tất cả các dòng",
            )
            .within(&parent)
        })?;
        validate_quantity(item.quantity).map_err(|message| {
            FieldError::new("quantity", message, "Số lượng phải lớn hơn 0").within(&parent)
        })?;
        validate_price(item.price).map_err(|message| {
            FieldError::new("price", message, "Đơn giá phải lớn hơn 0 và không vượt quá giới hạn")
                .within(&parent)
        })?;
    }

    validate_shipping_fee(draft.shipping_fee).map_err(|message| {
        FieldError::new(
            "shipping_fee",
            message,
            "Phí ship không được âm hoặc vượt quá giới hạn",
        )
    })?;

    let lines = draft.items.iter().map(|item| (item.price, item.quantity));
    money::line_subtotal(lines)
        .and_then(|subtotal| money::settle(subtotal, draft.shipping_fee, draft.shipping_payer))
        .map_err(|_| {
            FieldError::new(
                "items",
                "Order total exceeds the maximum allowed",
                "Tổng tiền đơn hàng vượt quá giới hạn",
            )
        })?;

    validate_material_lines(&draft.used_materials, "used_materials")
}

pub fn validate_product_input(input: &ProductInput) -> Result<(), FieldError> {
    validate_required(&input.name)
        .map_err(|message| FieldError::new("name", message, "Vui lòng nhập tên sản phẩm"))?;
    validate_price(input.price).map_err(|message| {
        FieldError::new("price", message, "Giá bán phải lớn hơn 0 và không vượt quá giới hạn")
    })?;

    for (index, line) in input.recipe.iter().enumerate() {
        validate_quantity(line.quantity).map_err(|message| {
            FieldError::new(
                format!("recipe[{}].quantity", index),
                message,
                "Định lượng vật tư phải lớn hơn 0",
            )
        })?;
    }
    Ok(())
}

pub fn validate_new_inventory_item(input: &NewInventoryItem) -> Result<(), FieldError> {
    validate_required(&input.name)
        .map_err(|message| FieldError::new("name", message, "Vui lòng nhập tên vật tư"))?;
    validate_required(&input.unit)
        .map_err(|message| FieldError::new("unit", message, "Vui lòng nhập đơn vị tính"))?;
    if let Some(price) = input.import_price {
        if price < Decimal::ZERO {
            return Err(FieldError::new(
                "import_price",
                "Import price cannot be negative",
                "Giá nhập không được âm",
            ));
        }
        validate_ceiling(price).map_err(|message| {
            FieldError::new("import_price", message, "Giá nhập vượt quá giới hạn")
        })?;
    }
    Ok(())
}

pub fn validate_new_transaction(input: &NewTransaction) -> Result<(), FieldError> {
    if input.amount <= Decimal::ZERO {
        return Err(FieldError::new(
            "amount",
            "Amount must be positive",
            "Số tiền phải lớn hơn 0",
        ));
    }
    validate_ceiling(input.amount)
        .map_err(|message| FieldError::new("amount", message, "Số tiền vượt quá giới hạn"))?;

    if let Some(lines) = &input.related_materials {
        let is_purchase = input.kind == TransactionKind::Expense
            && input.category == TransactionCategory::MaterialPurchase;
        if !is_purchase {
            return Err(FieldError::new(
                "related_materials",
                "Only material purchase expenses can restock inventory",
                "Chỉ khoản chi mua vật tư mới được cộng kho",
            ));
        }
        validate_material_lines(lines, "related_materials")?;
    }
    Ok(())
}
