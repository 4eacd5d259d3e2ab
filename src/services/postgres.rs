use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::collections::HashMap;
use std::time::Duration;
use crate::config::DatabaseSettings;
use crate::models::{
    Account, AccountRole, BookingRequest, BookingStatus, Event, EventStatus, PriceTier,
    SelectedVendors, VendorFilter, VendorListing,
};
use crate::services::store::{
    AccountStore, BookingStore, EventStore, Store, StoreError, StoreResult, VendorStore,
};

const ACCOUNT_COLUMNS: &str = "id, email, name, role, password_hash, created_at";

const VENDOR_COLUMNS: &str = "id, owner_account_id, business_name, category, description, location, \
     price_range, price_estimate, services, portfolio_images, contact_phone, contact_email, \
     rating, review_count, is_active, created_at";

const EVENT_COLUMNS: &str = "id, owner_account_id, event_name, event_date, event_time, guest_count, \
     budget, location_preference, special_requirements, selected_vendor_ids, status, created_at";

const BOOKING_COLUMNS: &str = "id, event_id, vendor_id, requester_account_id, message, \
     response_message, event_date, status, created_at, updated_at";

/// PostgreSQL-backed store
///
/// Each operation is a single statement, so every write is atomic at the
/// level of one record. Listing ownership uniqueness is enforced by the
/// `vendors.owner_account_id` UNIQUE constraint.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string and run pending migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        tracing::info!(
            "Connecting to PostgreSQL (max: {} connections)",
            settings.max_connections.unwrap_or(10)
        );

        Self::new(
            &settings.url,
            settings.max_connections.unwrap_or(10),
            settings.min_connections.unwrap_or(1),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

/// Case-insensitive substring pattern with LIKE metacharacters escaped
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn int_column(value: u32, field: &'static str) -> StoreResult<i32> {
    i32::try_from(value).map_err(|_| StoreError::OutOfRange(field))
}

fn map_unique_violation(err: sqlx::Error, what: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(what.to_string()),
        _ => StoreError::SqlxError(err),
    }
}

fn account_from_row(row: &PgRow) -> StoreResult<Account> {
    let role: String = row.try_get("role")?;
    Ok(Account {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        role: role.parse::<AccountRole>().map_err(StoreError::Corrupt)?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

fn vendor_from_row(row: &PgRow) -> StoreResult<VendorListing> {
    let category: String = row.try_get("category")?;
    let review_count: i32 = row.try_get("review_count")?;
    Ok(VendorListing {
        id: row.try_get("id")?,
        owner_account_id: row.try_get("owner_account_id")?,
        business_name: row.try_get("business_name")?,
        category: category.parse().map_err(StoreError::Corrupt)?,
        description: row.try_get("description")?,
        location: row.try_get("location")?,
        price_range: row.try_get("price_range")?,
        price_estimate: row.try_get("price_estimate")?,
        services: row.try_get("services")?,
        portfolio_images: row.try_get("portfolio_images")?,
        contact_phone: row.try_get("contact_phone")?,
        contact_email: row.try_get("contact_email")?,
        rating: row.try_get("rating")?,
        review_count: review_count.max(0) as u32,
        active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn event_from_row(row: &PgRow) -> StoreResult<Event> {
    let budget: String = row.try_get("budget")?;
    let status: String = row.try_get("status")?;
    let guest_count: i32 = row.try_get("guest_count")?;
    let selected: Vec<String> = row.try_get("selected_vendor_ids")?;
    Ok(Event {
        id: row.try_get("id")?,
        owner_account_id: row.try_get("owner_account_id")?,
        event_name: row.try_get("event_name")?,
        event_date: row.try_get("event_date")?,
        event_time: row.try_get("event_time")?,
        guest_count: guest_count.max(0) as u32,
        budget_tier: PriceTier::parse(&budget).unwrap_or_default(),
        location_preference: row.try_get("location_preference")?,
        special_requirements: row.try_get("special_requirements")?,
        selected_vendor_ids: SelectedVendors::from(selected),
        status: status.parse::<EventStatus>().map_err(StoreError::Corrupt)?,
        created_at: row.try_get("created_at")?,
    })
}

fn booking_from_row(row: &PgRow) -> StoreResult<BookingRequest> {
    let status: String = row.try_get("status")?;
    Ok(BookingRequest {
        id: row.try_get("id")?,
        event_id: row.try_get("event_id")?,
        vendor_id: row.try_get("vendor_id")?,
        requester_account_id: row.try_get("requester_account_id")?,
        message: row.try_get("message")?,
        response_message: row.try_get("response_message")?,
        event_date: row.try_get("event_date")?,
        status: status.parse::<BookingStatus>().map_err(StoreError::Corrupt)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Map rows, dropping (and logging) any that fail to decode
fn decode_rows<T>(rows: &[PgRow], decode: fn(&PgRow) -> StoreResult<T>) -> Vec<T> {
    rows.iter()
        .filter_map(|row| match decode(row) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Skipping undecodable row: {}", e);
                None
            }
        })
        .collect()
}

impl AccountStore for PostgresStore {
    async fn insert_account(&self, account: &Account) -> StoreResult<()> {
        let query = r#"
            INSERT INTO accounts (id, email, name, role, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
        "#;

        sqlx::query(query)
            .bind(&account.id)
            .bind(&account.email)
            .bind(&account.name)
            .bind(account.role.as_str())
            .bind(&account.password_hash)
            .bind(account.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Account already exists"))?;

        Ok(())
    }

    async fn get_account(&self, id: &str) -> StoreResult<Option<Account>> {
        let query = format!("SELECT {} FROM accounts WHERE id = $1", ACCOUNT_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn get_accounts_by_ids(&self, ids: &[String]) -> StoreResult<HashMap<String, Account>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let query = format!("SELECT {} FROM accounts WHERE id = ANY($1)", ACCOUNT_COLUMNS);
        let rows = sqlx::query(&query).bind(ids.to_vec()).fetch_all(&self.pool).await?;

        Ok(decode_rows(&rows, account_from_row)
            .into_iter()
            .map(|a| (a.id.clone(), a))
            .collect())
    }
}

impl VendorStore for PostgresStore {
    async fn insert_vendor(&self, listing: &VendorListing) -> StoreResult<()> {
        let query = format!(
            "INSERT INTO vendors ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
            VENDOR_COLUMNS
        );

        sqlx::query(&query)
            .bind(&listing.id)
            .bind(&listing.owner_account_id)
            .bind(&listing.business_name)
            .bind(listing.category.as_str())
            .bind(&listing.description)
            .bind(&listing.location)
            .bind(&listing.price_range)
            .bind(&listing.price_estimate)
            .bind(&listing.services)
            .bind(&listing.portfolio_images)
            .bind(&listing.contact_phone)
            .bind(&listing.contact_email)
            .bind(listing.rating)
            .bind(int_column(listing.review_count, "review_count")?)
            .bind(listing.active)
            .bind(listing.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, "Vendor profile already exists"))?;

        tracing::debug!("Inserted vendor listing {} for owner {}", listing.id, listing.owner_account_id);
        Ok(())
    }

    async fn update_vendor(&self, listing: &VendorListing) -> StoreResult<()> {
        // rating and review_count are maintained outside this service
        let query = r#"
            UPDATE vendors SET
                business_name = $2,
                description = $3,
                location = $4,
                price_range = $5,
                price_estimate = $6,
                services = $7,
                portfolio_images = $8,
                contact_phone = $9,
                contact_email = $10,
                is_active = $11
            WHERE id = $1
        "#;

        sqlx::query(query)
            .bind(&listing.id)
            .bind(&listing.business_name)
            .bind(&listing.description)
            .bind(&listing.location)
            .bind(&listing.price_range)
            .bind(&listing.price_estimate)
            .bind(&listing.services)
            .bind(&listing.portfolio_images)
            .bind(&listing.contact_phone)
            .bind(&listing.contact_email)
            .bind(listing.active)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_vendor(&self, id: &str) -> StoreResult<Option<VendorListing>> {
        let query = format!("SELECT {} FROM vendors WHERE id = $1", VENDOR_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(vendor_from_row).transpose()
    }

    async fn find_vendor_by_owner(&self, owner_account_id: &str) -> StoreResult<Option<VendorListing>> {
        let query = format!("SELECT {} FROM vendors WHERE owner_account_id = $1", VENDOR_COLUMNS);
        let row = sqlx::query(&query)
            .bind(owner_account_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(vendor_from_row).transpose()
    }

    async fn find_vendors(&self, filter: &VendorFilter) -> StoreResult<Vec<VendorListing>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM vendors WHERE is_active = TRUE",
            VENDOR_COLUMNS
        ));

        if let Some(category) = filter.category {
            builder.push(" AND category = ").push_bind(category.as_str());
        }
        if let Some(location) = &filter.location {
            builder.push(" AND location ILIKE ").push_bind(like_pattern(location));
        }
        if let Some(tier) = filter.price_range {
            builder.push(" AND price_range = ").push_bind(tier.symbol());
        }
        if let Some(search) = &filter.search {
            let pattern = like_pattern(search);
            builder
                .push(" AND (business_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        builder
            .push(" ORDER BY created_at, id LIMIT ")
            .push_bind(i64::try_from(filter.limit).unwrap_or(i64::MAX));

        let rows = builder.build().fetch_all(&self.pool).await?;
        let listings = decode_rows(&rows, vendor_from_row);

        tracing::debug!("Vendor query returned {} listings", listings.len());
        Ok(listings)
    }

    async fn get_vendors_by_ids(&self, ids: &[String]) -> StoreResult<HashMap<String, VendorListing>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let query = format!("SELECT {} FROM vendors WHERE id = ANY($1)", VENDOR_COLUMNS);
        let rows = sqlx::query(&query).bind(ids.to_vec()).fetch_all(&self.pool).await?;

        Ok(decode_rows(&rows, vendor_from_row)
            .into_iter()
            .map(|v| (v.id.clone(), v))
            .collect())
    }
}

impl EventStore for PostgresStore {
    async fn insert_event(&self, event: &Event) -> StoreResult<()> {
        let query = format!(
            "INSERT INTO events ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            EVENT_COLUMNS
        );

        sqlx::query(&query)
            .bind(&event.id)
            .bind(&event.owner_account_id)
            .bind(&event.event_name)
            .bind(event.event_date)
            .bind(&event.event_time)
            .bind(int_column(event.guest_count, "guest_count")?)
            .bind(event.budget_tier.symbol())
            .bind(&event.location_preference)
            .bind(&event.special_requirements)
            .bind(event.selected_vendor_ids.as_slice().to_vec())
            .bind(event.status.as_str())
            .bind(event.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_event(&self, event: &Event) -> StoreResult<()> {
        let query = r#"
            UPDATE events SET
                event_name = $2,
                event_date = $3,
                event_time = $4,
                guest_count = $5,
                budget = $6,
                location_preference = $7,
                special_requirements = $8,
                selected_vendor_ids = $9,
                status = $10
            WHERE id = $1
        "#;

        sqlx::query(query)
            .bind(&event.id)
            .bind(&event.event_name)
            .bind(event.event_date)
            .bind(&event.event_time)
            .bind(int_column(event.guest_count, "guest_count")?)
            .bind(event.budget_tier.symbol())
            .bind(&event.location_preference)
            .bind(&event.special_requirements)
            .bind(event.selected_vendor_ids.as_slice().to_vec())
            .bind(event.status.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_event(&self, id: &str) -> StoreResult<Option<Event>> {
        let query = format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(event_from_row).transpose()
    }

    async fn list_events_for_owner(&self, owner_account_id: &str) -> StoreResult<Vec<Event>> {
        let query = format!(
            "SELECT {} FROM events WHERE owner_account_id = $1 ORDER BY created_at, id LIMIT 100",
            EVENT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(owner_account_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(decode_rows(&rows, event_from_row))
    }

    async fn get_events_by_ids(&self, ids: &[String]) -> StoreResult<HashMap<String, Event>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let query = format!("SELECT {} FROM events WHERE id = ANY($1)", EVENT_COLUMNS);
        let rows = sqlx::query(&query).bind(ids.to_vec()).fetch_all(&self.pool).await?;

        Ok(decode_rows(&rows, event_from_row)
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect())
    }

    async fn add_selected_vendor(&self, event_id: &str, vendor_id: &str) -> StoreResult<bool> {
        let query = r#"
            UPDATE events
            SET selected_vendor_ids = array_append(selected_vendor_ids, $2)
            WHERE id = $1 AND NOT ($2 = ANY(selected_vendor_ids))
        "#;

        let result = sqlx::query(query)
            .bind(event_id)
            .bind(vendor_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_selected_vendor(&self, event_id: &str, vendor_id: &str) -> StoreResult<bool> {
        let query = r#"
            UPDATE events
            SET selected_vendor_ids = array_remove(selected_vendor_ids, $2)
            WHERE id = $1 AND $2 = ANY(selected_vendor_ids)
        "#;

        let result = sqlx::query(query)
            .bind(event_id)
            .bind(vendor_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl BookingStore for PostgresStore {
    async fn insert_booking(&self, booking: &BookingRequest) -> StoreResult<()> {
        let query = format!(
            "INSERT INTO bookings ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            BOOKING_COLUMNS
        );

        sqlx::query(&query)
            .bind(&booking.id)
            .bind(&booking.event_id)
            .bind(&booking.vendor_id)
            .bind(&booking.requester_account_id)
            .bind(&booking.message)
            .bind(&booking.response_message)
            .bind(booking.event_date)
            .bind(booking.status.as_str())
            .bind(booking.created_at)
            .bind(booking.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_booking(&self, id: &str) -> StoreResult<Option<BookingRequest>> {
        let query = format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(booking_from_row).transpose()
    }

    async fn list_bookings_for_requester(&self, account_id: &str) -> StoreResult<Vec<BookingRequest>> {
        let query = format!(
            "SELECT {} FROM bookings WHERE requester_account_id = $1 ORDER BY created_at, id LIMIT 100",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query(&query).bind(account_id).fetch_all(&self.pool).await?;
        Ok(decode_rows(&rows, booking_from_row))
    }

    async fn list_bookings_for_vendor(&self, vendor_id: &str) -> StoreResult<Vec<BookingRequest>> {
        let query = format!(
            "SELECT {} FROM bookings WHERE vendor_id = $1 ORDER BY created_at, id LIMIT 100",
            BOOKING_COLUMNS
        );
        let rows = sqlx::query(&query).bind(vendor_id).fetch_all(&self.pool).await?;
        Ok(decode_rows(&rows, booking_from_row))
    }

    async fn transition_booking(
        &self,
        id: &str,
        status: BookingStatus,
        response_message: Option<&str>,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<BookingRequest>> {
        let query = format!(
            r#"
            UPDATE bookings SET
                status = $2,
                response_message = COALESCE($3, response_message),
                updated_at = $4
            WHERE id = $1 AND status = 'pending'
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(response_message)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(booking_from_row).transpose()
    }
}

impl Store for PostgresStore {
    async fn health_check(&self) -> StoreResult<bool> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("Fremont"), "%Fremont%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern(""), "%%");
    }

    #[test]
    fn test_int_column_rejects_values_past_i32() {
        assert_eq!(int_column(150, "guest_count").unwrap(), 150);
        assert_eq!(int_column(i32::MAX as u32, "guest_count").unwrap(), i32::MAX);
        assert!(matches!(
            int_column(u32::MAX, "review_count"),
            Err(StoreError::OutOfRange("review_count"))
        ));
    }
}
