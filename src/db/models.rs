use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Legacy users
// ---------------------------------------------------------------------------

/// A row from the previous system's user table. Existence of the row means
/// the user has not yet been migrated to the auth provider.
#[derive(Debug, Clone)]
pub struct LegacyUser {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Minimal identity tuple returned by a successful legacy credential check.
/// The stored hash never leaves the legacy-users repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyIdentity {
    pub user_id: i64,
    pub username: String,
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub category: Option<String>,
    pub price: f64,
    pub stock: Option<i64>,
}

/// Partial product update. Absent fields keep their current value; an
/// explicit JSON null is treated the same way, so a category cannot be
/// cleared through PUT — delete and recreate the product to drop it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub total: f64,
    pub created_at: String,
    pub completed_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionItem {
    pub id: String,
    pub transaction_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionInput {
    pub user_id: String,
    pub items: Vec<CreateTransactionItemInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionItemInput {
    pub product_id: String,
    pub quantity: i64,
}

/// A transaction with its line items, as returned to API consumers.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionDetail {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// One aggregate bucket of the sales summary (a day, ISO week, or month).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SalesBucket {
    pub bucket: String,
    pub orders: i64,
    pub revenue: f64,
}
