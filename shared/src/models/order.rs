//! Order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DeductedMaterial, RecipeLine, UsedMaterial};
use crate::money::{self, MoneyError, Settlement};

/// Order lifecycle status.
///
/// Statuses are ordered for display only; any status may follow any other.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    #[default]
    Pending,
    Processing,
    Shipping,
    Delivered,
    /// Courier has remitted the COD proceeds; revenue is recognized
    Reconciliation,
    Cancelled,
    Returned,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Draft,
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipping,
        OrderStatus::Delivered,
        OrderStatus::Reconciliation,
        OrderStatus::Cancelled,
        OrderStatus::Returned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "DRAFT",
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipping => "SHIPPING",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Reconciliation => "RECONCILIATION",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Returned => "RETURNED",
        }
    }

    /// Label shown to shop staff
    pub fn label_vi(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "Chưa lên đơn",
            OrderStatus::Pending => "Chờ lấy hàng",
            OrderStatus::Processing => "Đang xử lý",
            OrderStatus::Shipping => "Đang giao",
            OrderStatus::Delivered => "Đã giao",
            OrderStatus::Reconciliation => "Đối soát",
            OrderStatus::Cancelled => "Đã hủy",
            OrderStatus::Returned => "Trả hàng",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s) || status.label_vi() == s)
    }

    /// Only reconciled orders count as recognized revenue
    pub fn recognizes_revenue(&self) -> bool {
        matches!(self, OrderStatus::Reconciliation)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who bears the courier's shipping fee
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingPayer {
    #[default]
    Shop,
    Customer,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cod,
    BankTransfer,
    Momo,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Cod,
        PaymentMethod::BankTransfer,
        PaymentMethod::Momo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Momo => "momo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "COD",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Momo => "Momo",
        }
    }

    /// Accepts the wire name or the display label, ignoring case
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        PaymentMethod::ALL.into_iter().find(|method| {
            method.as_str().eq_ignore_ascii_case(s) || method.label().eq_ignore_ascii_case(s)
        })
    }
}

/// How an order's material list is maintained
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MaterialsMode {
    /// Derived from the recipes of linked products
    Auto,
    /// Curated by staff; no linked products on the order
    #[default]
    Manual,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub email: String,
}

/// A line of an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: u32,
    /// Recipe copied from the product when it was selected
    #[serde(default)]
    pub recipe: Vec<RecipeLine>,
}

impl OrderItem {
    pub fn is_linked(&self) -> bool {
        self.product_id.is_some()
    }
}

/// Caller input for an order line.
///
/// A linked item without a `recipe` snapshot picks one up when the order is
/// saved: from the same product already on the order, else from the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderItemDraft {
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub recipe: Option<Vec<RecipeLine>>,
}

impl OrderItemDraft {
    /// Free-text line with no catalog link
    pub fn unlinked(product_name: impl Into<String>, price: Decimal, quantity: u32) -> Self {
        Self {
            product_id: None,
            product_name: product_name.into(),
            price,
            quantity,
            recipe: None,
        }
    }
}

/// Caller input for creating or updating an order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderDraft {
    /// Empty to have one generated
    #[serde(default)]
    pub order_code: String,
    /// Empty to have one generated
    #[serde(default)]
    pub tracking_number: String,
    pub customer: Customer,
    pub items: Vec<OrderItemDraft>,
    /// Only honoured when no item is linked to a product
    #[serde(default)]
    pub used_materials: Vec<UsedMaterial>,
    #[serde(default)]
    pub status: OrderStatus,
    pub shipping_fee: Decimal,
    #[serde(default)]
    pub shipping_payer: ShippingPayer,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub delivery_unit: Option<String>,
    /// Carrier tracking identifier; a non-empty code means the order is dispatched
    pub delivery_code: Option<String>,
    pub notes: Option<String>,
}

/// Fully resolved order content, ready to be written onto an [`Order`]
#[derive(Debug, Clone)]
pub struct OrderContent {
    pub order_code: String,
    pub tracking_number: String,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    pub used_materials: Vec<UsedMaterial>,
    pub materials_mode: MaterialsMode,
    pub status: OrderStatus,
    pub shipping_fee: Decimal,
    pub shipping_payer: ShippingPayer,
    pub payment_method: PaymentMethod,
    pub delivery_unit: Option<String>,
    pub delivery_code: Option<String>,
    pub notes: Option<String>,
}

impl OrderContent {
    pub fn settlement(&self) -> Result<Settlement, MoneyError> {
        settle_items(&self.items, self.shipping_fee, self.shipping_payer)
    }
}

fn settle_items(
    items: &[OrderItem],
    shipping_fee: Decimal,
    payer: ShippingPayer,
) -> Result<Settlement, MoneyError> {
    money::settle(money::product_subtotal(items)?, shipping_fee, payer)
}

/// A customer order.
///
/// `total_amount` is the COD figure and is only ever written through
/// [`money::cod`]. `deducted_materials` is the snapshot of stock this order
/// currently holds out of the inventory ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub order_code: String,
    pub tracking_number: String,
    pub customer: Customer,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub used_materials: Vec<UsedMaterial>,
    #[serde(default)]
    pub materials_mode: MaterialsMode,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub shipping_fee: Decimal,
    pub shipping_payer: ShippingPayer,
    total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub delivery_unit: Option<String>,
    pub delivery_code: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    deducted_materials: Vec<DeductedMaterial>,
}

impl Order {
    /// Fails only when the content's money figures are out of range
    pub fn new(
        id: Uuid,
        created_at: DateTime<Utc>,
        content: OrderContent,
    ) -> Result<Self, MoneyError> {
        let settlement = content.settlement()?;
        Ok(Self {
            id,
            order_code: content.order_code,
            tracking_number: content.tracking_number,
            customer: content.customer,
            items: content.items,
            used_materials: content.used_materials,
            materials_mode: content.materials_mode,
            status: content.status,
            created_at,
            updated_at: created_at,
            shipping_fee: content.shipping_fee,
            shipping_payer: content.shipping_payer,
            total_amount: settlement.cod,
            payment_method: content.payment_method,
            delivery_unit: content.delivery_unit,
            delivery_code: content.delivery_code,
            notes: content.notes,
            deducted_materials: Vec::new(),
        })
    }

    /// Replace the order's content, keeping identity, creation time and the
    /// deduction snapshot. Out-of-range content leaves the order untouched.
    pub fn revise(&mut self, content: OrderContent, now: DateTime<Utc>) -> Result<(), MoneyError> {
        let settlement = content.settlement()?;
        self.order_code = content.order_code;
        self.tracking_number = content.tracking_number;
        self.customer = content.customer;
        self.items = content.items;
        self.used_materials = content.used_materials;
        self.materials_mode = content.materials_mode;
        self.status = content.status;
        self.shipping_fee = content.shipping_fee;
        self.shipping_payer = content.shipping_payer;
        self.payment_method = content.payment_method;
        self.delivery_unit = content.delivery_unit;
        self.delivery_code = content.delivery_code;
        self.notes = content.notes;
        self.updated_at = now;
        self.total_amount = settlement.cod;
        Ok(())
    }

    /// Recompute the stored COD figure. Returns `true` if it had drifted.
    pub fn refresh_total(&mut self) -> Result<bool, MoneyError> {
        let cod = settle_items(&self.items, self.shipping_fee, self.shipping_payer)?.cod;
        let drifted = cod != self.total_amount;
        self.total_amount = cod;
        Ok(drifted)
    }

    /// Product subtotal, recovered from the stored COD figure
    pub fn subtotal(&self) -> Decimal {
        // Both figures were range-checked when the total was written
        match self.shipping_payer {
            ShippingPayer::Shop => self.total_amount,
            ShippingPayer::Customer => self.total_amount.saturating_sub(self.shipping_fee),
        }
    }

    /// COD amount the courier collects
    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Amount that ultimately belongs to the shop
    pub fn net_received(&self) -> Decimal {
        self.total_amount.saturating_sub(self.shipping_fee)
    }

    /// A non-empty delivery code confirms the order for dispatch
    pub fn is_dispatched(&self) -> bool {
        self.delivery_code
            .as_deref()
            .map(|code| !code.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn deducted_materials(&self) -> &[DeductedMaterial] {
        &self.deducted_materials
    }

    /// Record the snapshot produced by the consumption engine
    pub fn set_deducted_materials(&mut self, snapshot: Vec<DeductedMaterial>) {
        self.deducted_materials = snapshot;
    }

    /// "2x Red Passion, 1x Greeting card"
    pub fn item_summary(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{}x {}", item.quantity, item.product_name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One row of a bulk order import
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BulkOrderRow {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub shipping_fee: Decimal,
    #[serde(default)]
    pub notes: String,
}

/// Flat order row for spreadsheet export
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderExportRow {
    pub order_code: String,
    pub tracking_number: String,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub items: String,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub shipping_payer: ShippingPayer,
    pub cod_amount: Decimal,
    pub net_received: Decimal,
    pub status: String,
    pub payment_method: String,
    pub delivery_unit: String,
    pub delivery_code: String,
    pub created_at: DateTime<Utc>,
    pub notes: String,
}

impl From<&Order> for OrderExportRow {
    fn from(order: &Order) -> Self {
        Self {
            order_code: order.order_code.clone(),
            tracking_number: order.tracking_number.clone(),
            customer_name: order.customer.name.clone(),
            phone: order.customer.phone.clone(),
            address: order.customer.address.clone(),
            items: order.item_summary(),
            subtotal: order.subtotal(),
            shipping_fee: order.shipping_fee,
            shipping_payer: order.shipping_payer,
            cod_amount: order.total_amount(),
            net_received: order.net_received(),
            status: order.status.label_vi().to_string(),
            payment_method: order.payment_method.label().to_string(),
            delivery_unit: order.delivery_unit.clone().unwrap_or_default(),
            delivery_code: order.delivery_code.clone().unwrap_or_default(),
            created_at: order.created_at,
            notes: order.notes.clone().unwrap_or_default(),
        }
    }
}
