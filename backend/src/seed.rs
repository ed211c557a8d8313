//! Built-in starter catalog, written to a new account on first open

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{InventoryItem, Product, RecipeLine};
use uuid::Uuid;

pub const RED_ROSE: Uuid = Uuid::from_u128(0x5e3d_0001_0000_4000_8000_000000000001);
pub const KRAFT_PAPER: Uuid = Uuid::from_u128(0x5e3d_0001_0000_4000_8000_000000000002);
pub const SILK_RIBBON: Uuid = Uuid::from_u128(0x5e3d_0001_0000_4000_8000_000000000003);
pub const FLORAL_FOAM: Uuid = Uuid::from_u128(0x5e3d_0001_0000_4000_8000_000000000004);
pub const BABY_BREATH: Uuid = Uuid::from_u128(0x5e3d_0001_0000_4000_8000_000000000005);
pub const RATTAN_BASKET: Uuid = Uuid::from_u128(0x5e3d_0001_0000_4000_8000_000000000006);

pub const RED_PASSION: Uuid = Uuid::from_u128(0x5e3d_0002_0000_4000_8000_000000000001);
pub const ROSE_BABY_BASKET: Uuid = Uuid::from_u128(0x5e3d_0002_0000_4000_8000_000000000002);
pub const WHITE_BABY_BOUQUET: Uuid = Uuid::from_u128(0x5e3d_0002_0000_4000_8000_000000000003);

/// Starter raw materials: (id, name, on hand, unit)
const MATERIALS: [(Uuid, &str, u32, &str); 6] = [
    (RED_ROSE, "Hoa Hồng Đỏ Đà Lạt", 150, "cành"),
    (KRAFT_PAPER, "Giấy Gói Kraft Hàn Quốc", 50, "tờ"),
    (SILK_RIBBON, "Ruy Băng Lụa 2cm", 200, "mét"),
    (FLORAL_FOAM, "Xốp Cắm Hoa Oasis", 40, "viên"),
    (BABY_BREATH, "Hoa Baby Trắng", 30, "bó"),
    (RATTAN_BASKET, "Giỏ Mây Size M", 15, "cái"),
];

pub fn starter_inventory(now: DateTime<Utc>) -> Vec<InventoryItem> {
    MATERIALS
        .into_iter()
        .map(|(id, name, quantity, unit)| InventoryItem {
            id,
            name: name.to_string(),
            quantity,
            unit: unit.to_string(),
            import_price: None,
            updated_at: now,
        })
        .collect()
}

pub fn starter_products() -> Vec<Product> {
    let product = |id: Uuid, name: &str, price: i64, recipe: &[(Uuid, u32)]| Product {
        id,
        name: name.to_string(),
        price: Decimal::from(price),
        image: None,
        recipe: recipe.iter().map(|&(material, qty)| RecipeLine::new(material, qty)).collect(),
    };

    vec![
        product(
            RED_PASSION,
            "Bó Hoa Hồng Đỏ (Red Passion)",
            500_000,
            &[(RED_ROSE, 12), (KRAFT_PAPER, 2), (SILK_RIBBON, 1)],
        ),
        product(
            ROSE_BABY_BASKET,
            "Lẵng Hoa Hồng & Baby",
            850_000,
            &[(RED_ROSE, 20), (BABY_BREATH, 3), (FLORAL_FOAM, 1), (RATTAN_BASKET, 1)],
        ),
        product(
            WHITE_BABY_BOUQUET,
            "Bó Hoa Baby Trắng Tinh Khôi",
            350_000,
            &[(BABY_BREATH, 5), (KRAFT_PAPER, 3), (SILK_RIBBON, 2)],
        ),
    ]
}
