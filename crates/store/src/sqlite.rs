//! SQLite-backed repository.
//!
//! Single-file database with:
//! - WAL mode for durability and concurrent readers
//! - A busy timeout so lock waits are bounded rather than indefinite
//! - Atomic conditional status updates (compare-and-swap in one statement)
//! - Append-only location trail (no updates or deletes)

use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use courier_core::{LocationSample, Order, OrderStatus};

use crate::error::{Result, StoreError};
use crate::repository::{LocationStore, OrderStore};

/// Upper bound on waiting for a locked database before the call fails.
const BUSY_TIMEOUT_MS: u64 = 5_000;

/// SQLite store implementing both repository traits.
pub struct SqliteStore {
    /// Connection behind a mutex; statements on it are serialized
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Create or open a store at the specified path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        info!(path = %path.display(), "Opening courier store");

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        Self::configure(&conn)?;
        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store. Used by tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(&conn)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn configure(conn: &Connection) -> Result<()> {
        // WAL mode is a no-op for in-memory databases
        let _ = conn.pragma_update(None, "journal_mode", "WAL");
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(std::time::Duration::from_millis(BUSY_TIMEOUT_MS))?;
        Ok(())
    }

    /// Initialize database schema
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id TEXT PRIMARY KEY,
                customer_id TEXT NOT NULL,
                driver_id TEXT,
                pickup_lat REAL NOT NULL,
                pickup_lng REAL NOT NULL,
                dropoff_lat REAL NOT NULL,
                dropoff_lng REAL NOT NULL,
                status TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_orders_driver ON orders(driver_id, created_at);

            CREATE TABLE IF NOT EXISTS drivers (
                id TEXT PRIMARY KEY,
                registered_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS location_updates (
                seq_no INTEGER PRIMARY KEY AUTOINCREMENT,
                order_id TEXT NOT NULL,
                lat REAL NOT NULL,
                lng REAL NOT NULL,
                recorded_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_location_order ON location_updates(order_id, seq_no);
            "#,
        )?;

        Ok(())
    }

    fn map_order_row(row: &Row<'_>) -> rusqlite::Result<Order> {
        let status_text: String = row.get(7)?;
        let status: OrderStatus = status_text.parse().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Order {
            id: row.get(0)?,
            customer_id: row.get(1)?,
            driver_id: row.get(2)?,
            pickup_lat: row.get(3)?,
            pickup_lng: row.get(4)?,
            dropoff_lat: row.get(5)?,
            dropoff_lng: row.get(6)?,
            status,
            created_at: row.get::<_, i64>(8)? as u64,
        })
    }

    fn get_internal(conn: &Connection, id: &str) -> Result<Option<Order>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, customer_id, driver_id, pickup_lat, pickup_lng,
                   dropoff_lat, dropoff_lng, status, created_at
            FROM orders
            WHERE id = ?1
            "#,
        )?;

        let order = stmt.query_row([id], Self::map_order_row).optional()?;
        Ok(order)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().expect("courier store connection lock poisoned")
    }
}

impl OrderStore for SqliteStore {
    fn insert(&self, order: &Order) -> Result<Order> {
        let conn = self.lock();
        conn.execute(
            r#"
            INSERT INTO orders (
                id, customer_id, driver_id, pickup_lat, pickup_lng,
                dropoff_lat, dropoff_lng, status, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                order.id,
                order.customer_id,
                order.driver_id,
                order.pickup_lat,
                order.pickup_lng,
                order.dropoff_lat,
                order.dropoff_lng,
                order.status.as_str(),
                order.created_at as i64,
            ],
        )?;

        debug!(order_id = %order.id, status = %order.status, "Order persisted");

        Ok(order.clone())
    }

    fn get(&self, id: &str) -> Result<Option<Order>> {
        let conn = self.lock();
        Self::get_internal(&conn, id)
    }

    fn conditional_update_status(
        &self,
        id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> Result<Order> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        // Compare and write in one statement; zero rows means the
        // precondition did not hold at commit time.
        let changed = tx.execute(
            "UPDATE orders SET status = ?1 WHERE id = ?2 AND status = ?3",
            params![next.as_str(), id, expected.as_str()],
        )?;

        if changed == 0 {
            return Err(StoreError::PreconditionFailed {
                id: id.to_string(),
                expected,
            });
        }

        let order = Self::get_internal(&tx, id)?.ok_or(StoreError::PreconditionFailed {
            id: id.to_string(),
            expected,
        })?;

        tx.commit()?;

        debug!(order_id = %id, from = %expected, to = %next, "Order status updated");

        Ok(order)
    }

    fn list_by_driver(&self, driver_id: &str) -> Result<Vec<Order>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT id, customer_id, driver_id, pickup_lat, pickup_lng,
                   dropoff_lat, dropoff_lng, status, created_at
            FROM orders
            WHERE driver_id = ?1
            ORDER BY created_at DESC
            "#,
        )?;

        let orders = stmt
            .query_map([driver_id], Self::map_order_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(orders)
    }

    fn find_earliest_registered_driver(&self) -> Result<Option<String>> {
        let conn = self.lock();
        let driver = conn
            .query_row(
                "SELECT id FROM drivers ORDER BY registered_at ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(driver)
    }

    fn register_driver(&self, driver_id: &str, registered_at: u64) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT OR IGNORE INTO drivers (id, registered_at) VALUES (?1, ?2)",
            params![driver_id, registered_at as i64],
        )?;

        debug!(driver_id = %driver_id, "Driver registered");

        Ok(())
    }
}

impl LocationStore for SqliteStore {
    fn append(&self, sample: &LocationSample) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO location_updates (order_id, lat, lng, recorded_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                sample.order_id,
                sample.lat,
                sample.lng,
                sample.recorded_at as i64,
            ],
        )?;

        Ok(())
    }

    fn list_by_order(&self, order_id: &str) -> Result<Vec<LocationSample>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            r#"
            SELECT order_id, lat, lng, recorded_at
            FROM location_updates
            WHERE order_id = ?1
            ORDER BY seq_no ASC
            "#,
        )?;

        let samples = stmt
            .query_map([order_id], |row| {
                Ok(LocationSample {
                    order_id: row.get(0)?,
                    lat: row.get(1)?,
                    lng: row.get(2)?,
                    recorded_at: row.get::<_, i64>(3)? as u64,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(samples)
    }
}
