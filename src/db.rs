//! Database operations for the address service.
//!
//! All functions operate on a shared SQLite connection pool. The partial
//! update reads and writes inside one explicit transaction to ensure
//! atomicity; the deletes are single scoped statements.

use crate::models::{AddressRow, AddressUpdate};
use sqlx::{Pool, Sqlite};
use tracing::info;

/// Inserts a new address row.
///
/// The caller supplies the generated `address_id` and both timestamps, so
/// the response it builds is exactly what was stored.
pub async fn insert_address(pool: &Pool<Sqlite>, row: &AddressRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO addresses (address_id, university_id, street, city, state, postal_code, country, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&row.address_id)
    .bind(&row.university_id)
    .bind(&row.street)
    .bind(&row.city)
    .bind(&row.state)
    .bind(&row.postal_code)
    .bind(&row.country)
    .bind(&row.created_at)
    .bind(&row.updated_at)
    .execute(pool)
    .await?;

    info!("Stored address {}", row.address_id);
    Ok(())
}

/// Fetches a single address by its primary key.
///
/// Lookup is unscoped: direct fetches do not check which customer owns the
/// address.
pub async fn fetch_address(
    pool: &Pool<Sqlite>,
    address_id: &str,
) -> Result<Option<AddressRow>, sqlx::Error> {
    sqlx::query_as::<_, AddressRow>(
        "SELECT address_id, university_id, street, city, state, postal_code, country, created_at, updated_at \
         FROM addresses WHERE address_id = ?",
    )
    .bind(address_id)
    .fetch_optional(pool)
    .await
}

/// Lists every address owned by `university_id`, oldest first.
pub async fn list_addresses_for_university(
    pool: &Pool<Sqlite>,
    university_id: &str,
) -> Result<Vec<AddressRow>, sqlx::Error> {
    sqlx::query_as::<_, AddressRow>(
        "SELECT address_id, university_id, street, city, state, postal_code, country, created_at, updated_at \
         FROM addresses WHERE university_id = ? ORDER BY created_at, address_id",
    )
    .bind(university_id)
    .fetch_all(pool)
    .await
}

/// Applies a partial update to an address owned by `university_id`.
///
/// The select and update run inside a single transaction so concurrent
/// PATCHes serialize and a reader never observes a half-applied update.
/// An `address_id` owned by a different customer behaves exactly like a
/// missing row. Only the `Some` fields of `update` change; `updated_at`
/// is always rewritten to the supplied timestamp.
///
/// # Returns
/// - `Ok(Some(row))` — updated; the row reflects the post-update state
/// - `Ok(None)` — no address with this id belongs to this customer
/// - `Err(_)` — database error
pub async fn update_address(
    pool: &Pool<Sqlite>,
    university_id: &str,
    address_id: &str,
    update: &AddressUpdate,
    updated_at: &str,
) -> Result<Option<AddressRow>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let row: Option<AddressRow> = sqlx::query_as::<_, AddressRow>(
        "SELECT address_id, university_id, street, city, state, postal_code, country, created_at, updated_at \
         FROM addresses WHERE address_id = ? AND university_id = ?",
    )
    .bind(address_id)
    .bind(university_id)
    .fetch_optional(&mut *tx)
    .await?;

    if let Some(mut r) = row {
        if let Some(street) = &update.street {
            r.street = street.clone();
        }
        if let Some(city) = &update.city {
            r.city = city.clone();
        }
        if let Some(state) = &update.state {
            r.state = state.clone();
        }
        if let Some(postal_code) = &update.postal_code {
            r.postal_code = postal_code.clone();
        }
        if let Some(country) = &update.country {
            r.country = country.clone();
        }
        r.updated_at = updated_at.to_string();

        sqlx::query(
            "UPDATE addresses SET street = ?, city = ?, state = ?, postal_code = ?, country = ?, updated_at = ? \
             WHERE address_id = ?",
        )
        .bind(&r.street)
        .bind(&r.city)
        .bind(&r.state)
        .bind(&r.postal_code)
        .bind(&r.country)
        .bind(&r.updated_at)
        .bind(address_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!("Updated address {}", address_id);
        Ok(Some(r))
    } else {
        tx.commit().await?;
        Ok(None)
    }
}

/// Deletes a single address, scoped by its owning customer.
///
/// A matching `address_id` under a different `university_id` deletes
/// nothing. Returns `true` iff a row was removed.
pub async fn delete_address(
    pool: &Pool<Sqlite>,
    university_id: &str,
    address_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM addresses WHERE address_id = ? AND university_id = ?")
        .bind(address_id)
        .bind(university_id)
        .execute(pool)
        .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        info!("Deleted address {}", address_id);
    }
    Ok(deleted)
}

/// Removes every address owned by `university_id`.
///
/// Deleting zero rows is not an error; the operation is idempotent.
/// Returns the number of rows deleted.
pub async fn delete_addresses_for_university(
    pool: &Pool<Sqlite>,
    university_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM addresses WHERE university_id = ?")
        .bind(university_id)
        .execute(pool)
        .await?;

    info!(
        "Deleted {} addresses for customer {}",
        result.rows_affected(),
        university_id
    );
    Ok(result.rows_affected())
}
