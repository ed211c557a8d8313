//! Product catalog: sale items and their recipes

use shared::materials::merge_recipe;
use shared::{validate_product_input, OrderItemDraft, Product, ProductInput};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCatalog {
    products: Vec<Product>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_products(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn list(&self) -> &[Product] {
        &self.products
    }

    pub fn find(&self, id: Uuid) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn get(&self, id: Uuid) -> AppResult<&Product> {
        self.find(id).ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    pub fn add(&mut self, input: ProductInput) -> AppResult<Product> {
        validate_product_input(&input)?;

        let product = Product {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            price: input.price,
            image: input.image,
            recipe: merge_recipe(input.recipe),
        };
        self.products.insert(0, product.clone());

        tracing::info!(product_id = %product.id, name = %product.name, "product added");
        Ok(product)
    }

    /// Replace a product's details and recipe. Existing orders keep the
    /// recipe they copied when the product was selected.
    pub fn update(&mut self, id: Uuid, input: ProductInput) -> AppResult<Product> {
        validate_product_input(&input)?;

        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        product.name = input.name.trim().to_string();
        product.price = input.price;
        product.image = input.image;
        product.recipe = merge_recipe(input.recipe);

        tracing::info!(product_id = %id, "product updated");
        Ok(product.clone())
    }

    pub fn delete(&mut self, id: Uuid) -> AppResult<Product> {
        let index = self
            .products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        let removed = self.products.remove(index);
        tracing::info!(product_id = %id, "product deleted");
        Ok(removed)
    }

    /// Order line for `quantity` units of a product, carrying a copy of the
    /// product's current name, price and recipe
    pub fn select(&self, id: Uuid, quantity: u32) -> AppResult<OrderItemDraft> {
        let product = self.get(id)?;
        Ok(OrderItemDraft {
            product_id: Some(product.id),
            product_name: product.name.clone(),
            price: product.price,
            quantity,
            recipe: Some(product.recipe.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::RecipeLine;

    fn bouquet(recipe: Vec<RecipeLine>) -> ProductInput {
        ProductInput {
            name: "Bó Hoa Hồng Đỏ (Red Passion)".to_string(),
            price: Decimal::from(500_000),
            image: None,
            recipe,
        }
    }

    #[test]
    fn test_add_merges_recipe_lines() {
        let rose = Uuid::new_v4();
        let mut catalog = ProductCatalog::new();
        let product = catalog
            .add(bouquet(vec![RecipeLine::new(rose, 10), RecipeLine::new(rose, 2)]))
            .unwrap();

        assert_eq!(product.recipe, vec![RecipeLine::new(rose, 12)]);
    }

    #[test]
    fn test_zero_recipe_quantity_rejected() {
        let mut catalog = ProductCatalog::new();
        let err = catalog
            .add(bouquet(vec![RecipeLine::new(Uuid::new_v4(), 0)]))
            .unwrap_err();

        assert!(err.is_validation());
        assert!(catalog.list().is_empty());
    }

    #[test]
    fn test_select_copies_recipe() {
        let rose = Uuid::new_v4();
        let mut catalog = ProductCatalog::new();
        let product = catalog.add(bouquet(vec![RecipeLine::new(rose, 12)])).unwrap();

        let line = catalog.select(product.id, 2).unwrap();
        catalog
            .update(product.id, bouquet(vec![RecipeLine::new(rose, 20)]))
            .unwrap();

        assert_eq!(line.quantity, 2);
        assert_eq!(line.price, Decimal::from(500_000));
        assert_eq!(line.recipe, Some(vec![RecipeLine::new(rose, 12)]));
    }

    #[test]
    fn test_missing_product() {
        let mut catalog = ProductCatalog::new();
        assert!(catalog.select(Uuid::new_v4(), 1).unwrap_err().is_not_found());
        assert!(catalog.delete(Uuid::new_v4()).unwrap_err().is_not_found());
    }
}
