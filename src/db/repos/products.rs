use rusqlite::{params, Row};

use crate::db::models::{CreateProductInput, Product, UpdateProductInput};
use crate::db::DbPool;
use crate::error::AppError;
use crate::validation::{require_non_empty, require_non_negative};

fn row_to_product(row: &Row) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get("id")?,
        name: row.get("name")?,
        category: row.get("category")?,
        price: row.get("price")?,
        stock: row.get("stock")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn get_all(pool: &DbPool) -> Result<Vec<Product>, AppError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare("SELECT * FROM products ORDER BY name")?;
    let rows = stmt.query_map([], row_to_product)?;
    Ok(rows.filter_map(|r| r.ok()).collect())
}

pub fn get_by_id(pool: &DbPool, id: &str) -> Result<Product, AppError> {
    let conn = pool.get()?;
    conn.query_row("SELECT * FROM products WHERE id = ?1", params![id], row_to_product)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Product {id}")),
            other => AppError::Database(other),
        })
}

pub fn create(pool: &DbPool, input: CreateProductInput) -> Result<Product, AppError> {
    require_non_empty("name", &input.name)?;
    require_non_negative("price", input.price)?;
    let stock = input.stock.unwrap_or(0);
    if stock < 0 {
        return Err(AppError::Validation("stock must be >= 0".into()));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO products (id, name, category, price, stock, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![id, input.name, input.category, input.price, stock, now],
    )?;

    get_by_id(pool, &id)
}

pub fn update(pool: &DbPool, id: &str, input: UpdateProductInput) -> Result<Product, AppError> {
    let existing = get_by_id(pool, id)?;

    if let Some(ref name) = input.name {
        require_non_empty("name", name)?;
    }
    if let Some(price) = input.price {
        require_non_negative("price", price)?;
    }

    let name = input.name.unwrap_or(existing.name);
    let category = input.category.or(existing.category);
    let price = input.price.unwrap_or(existing.price);
    let now = chrono::Utc::now().to_rfc3339();

    let conn = pool.get()?;
    conn.execute(
        "UPDATE products SET name = ?1, category = ?2, price = ?3, updated_at = ?4 WHERE id = ?5",
        params![name, category, price, now, id],
    )?;

    get_by_id(pool, id)
}

pub fn delete(pool: &DbPool, id: &str) -> Result<bool, AppError> {
    let conn = pool.get()?;
    let rows = conn.execute("DELETE FROM products WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}

/// Adjust stock by a signed delta. The WHERE clause guards against going
/// negative, so a concurrent oversell loses the race instead of corrupting
/// the count.
pub fn adjust_stock(pool: &DbPool, id: &str, delta: i64) -> Result<Product, AppError> {
    let now = chrono::Utc::now().to_rfc3339();
    let conn = pool.get()?;
    let rows = conn.execute(
        "UPDATE products SET stock = stock + ?1, updated_at = ?2
         WHERE id = ?3 AND stock + ?1 >= 0",
        params![delta, now, id],
    )?;
    drop(conn);
    if rows == 0 {
        // Zero rows means the product is gone (404) or the guard refused the
        // delta; check which so the error names the actual cause.
        get_by_id(pool, id)?;
        return Err(AppError::Validation(format!(
            "stock adjustment of {delta} would make product {id} negative"
        )));
    }

    get_by_id(pool, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;

    fn sample() -> CreateProductInput {
        CreateProductInput {
            name: "Chocolate Cake".into(),
            category: Some("cakes".into()),
            price: 18.5,
            stock: Some(4),
        }
    }

    #[test]
    fn test_crud_product() {
        let pool = init_test_db().unwrap();

        let product = create(&pool, sample()).unwrap();
        assert_eq!(product.name, "Chocolate Cake");
        assert_eq!(product.stock, 4);

        let fetched = get_by_id(&pool, &product.id).unwrap();
        assert_eq!(fetched.price, 18.5);

        let all = get_all(&pool).unwrap();
        assert_eq!(all.len(), 1);

        let updated = update(
            &pool,
            &product.id,
            UpdateProductInput {
                name: Some("Dark Chocolate Cake".into()),
                price: Some(21.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.name, "Dark Chocolate Cake");
        assert_eq!(updated.price, 21.0);
        // Stock untouched by update
        assert_eq!(updated.stock, 4);

        assert!(delete(&pool, &product.id).unwrap());
        assert!(get_by_id(&pool, &product.id).is_err());
    }

    #[test]
    fn test_update_keeps_category_on_absent_or_null_field() {
        let pool = init_test_db().unwrap();
        let product = create(&pool, sample()).unwrap();

        // Absent field (None after deserializing either `{}` or a null)
        let updated = update(
            &pool,
            &product.id,
            UpdateProductInput {
                price: Some(20.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.category.as_deref(), Some("cakes"));

        // An explicit JSON null deserializes to the same None
        let from_null: UpdateProductInput =
            serde_json::from_str(r#"{"category": null}"#).unwrap();
        assert!(from_null.category.is_none());
        let updated = update(&pool, &product.id, from_null).unwrap();
        assert_eq!(updated.category.as_deref(), Some("cakes"));
    }

    #[test]
    fn test_create_validation() {
        let pool = init_test_db().unwrap();

        let mut input = sample();
        input.name = "".into();
        assert!(create(&pool, input).is_err());

        let mut input = sample();
        input.price = -1.0;
        assert!(create(&pool, input).is_err());

        let mut input = sample();
        input.stock = Some(-2);
        assert!(create(&pool, input).is_err());
    }

    #[test]
    fn test_adjust_stock() {
        let pool = init_test_db().unwrap();
        let product = create(&pool, sample()).unwrap();

        let restocked = adjust_stock(&pool, &product.id, 6).unwrap();
        assert_eq!(restocked.stock, 10);

        let sold = adjust_stock(&pool, &product.id, -10).unwrap();
        assert_eq!(sold.stock, 0);

        // Going negative is rejected and leaves the count alone
        let err = adjust_stock(&pool, &product.id, -1);
        assert!(matches!(err, Err(AppError::Validation(_))));
        assert_eq!(get_by_id(&pool, &product.id).unwrap().stock, 0);

        // Unknown product is a NotFound, not a stock error
        let missing = adjust_stock(&pool, "nope", 1);
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
