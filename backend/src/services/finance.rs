//! Finance ledger: manually entered income and expense records

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    validate_new_transaction, NewTransaction, Transaction, TransactionCategory, UsedMaterial,
};
use uuid::Uuid;

use super::consumption::MaterialConsumptionEngine;
use super::inventory::InventoryLedger;
use crate::error::{AppError, AppResult};

/// What deleting a material purchase does to the stock it added
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RestockPolicy {
    /// A restock stays in stock once recorded
    #[default]
    Final,
    /// Deleting the purchase takes its materials back out, clamped at zero
    Reversible,
}

/// Materials to take back out of stock when `transaction` is deleted
pub fn restock_reversal(
    policy: RestockPolicy,
    transaction: &Transaction,
) -> Option<&[UsedMaterial]> {
    match policy {
        RestockPolicy::Final => None,
        RestockPolicy::Reversible => {
            let lines = transaction.restock_lines();
            (!lines.is_empty()).then_some(lines)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinanceLedger {
    transactions: Vec<Transaction>,
    policy: RestockPolicy,
}

impl FinanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            policy: RestockPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RestockPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RestockPolicy {
        self.policy
    }

    pub fn list(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn get(&self, id: Uuid) -> AppResult<&Transaction> {
        self.transactions
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound("Transaction".to_string()))
    }

    /// Record a transaction. A material purchase carrying materials restocks
    /// them; only the lines actually applied are kept on the entry.
    pub fn add_transaction(
        &mut self,
        input: NewTransaction,
        inventory: &mut InventoryLedger,
    ) -> AppResult<Transaction> {
        validate_new_transaction(&input)?;

        let related_materials = match (input.category, input.related_materials) {
            (TransactionCategory::MaterialPurchase, Some(lines)) => {
                let applied = inventory.restock(&lines);
                (!applied.is_empty()).then_some(applied)
            }
            _ => None,
        };

        let transaction = Transaction {
            id: Uuid::new_v4(),
            date: input.date,
            amount: input.amount,
            kind: input.kind,
            category: input.category,
            description: input.description.trim().to_string(),
            related_materials,
        };
        self.transactions.insert(0, transaction.clone());

        tracing::info!(
            transaction_id = %transaction.id,
            amount = %transaction.amount,
            restocked = transaction.restock_lines().len(),
            "transaction recorded"
        );
        Ok(transaction)
    }

    pub fn delete(&mut self, id: Uuid, inventory: &mut InventoryLedger) -> AppResult<Transaction> {
        let index = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| AppError::NotFound("Transaction".to_string()))?;

        let removed = self.transactions.remove(index);
        if let Some(lines) = restock_reversal(self.policy, &removed) {
            MaterialConsumptionEngine::deduct(inventory, lines);
            tracing::info!(transaction_id = %id, lines = lines.len(), "restock reversed");
        }

        tracing::info!(transaction_id = %id, "transaction deleted");
        Ok(removed)
    }

    pub fn total_expenses(&self) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.is_expense())
            .map(|t| t.amount)
            .sum()
    }

    pub fn total_income(&self) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.is_income())
            .map(|t| t.amount)
            .sum()
    }
}
