use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection};
use tracing::debug;

use crate::error::Result;
use crate::models::PayeeDetails;

/// Lookup-or-create store of payee identities
///
/// Every distinct [`PayeeDetails`] tuple maps to one stable identifier. A
/// tuple that is already known returns its existing identifier; an unknown
/// one is inserted exactly once and its new identifier returned.
///
/// # Absent building society numbers
///
/// `building_society_num: None` matches only another `None`. It never
/// matches a tuple that carries a real number, and vice versa.
///
/// # Example
///
/// ```
/// use bpy331_aggregator::models::PayeeDetails;
/// use bpy331_aggregator::registry::{IdentityRegistry, InMemoryRegistry};
///
/// let mut registry = InMemoryRegistry::new();
/// let payee = PayeeDetails {
///     bank_account: "12345678".to_string(),
///     sort_code: "12-34-56".to_string(),
///     payee_name: "ACME LTD".to_string(),
///     building_society_num: None,
/// };
///
/// let first = registry.find_or_create(&payee).unwrap();
/// let again = registry.find_or_create(&payee).unwrap();
/// assert_eq!(first, again);
/// assert_eq!(registry.len(), 1);
/// ```
pub trait IdentityRegistry {
    /// Return the identifier of `payee`, registering it first if unknown
    fn find_or_create(&mut self, payee: &PayeeDetails) -> Result<i64>;
}

impl<R: IdentityRegistry + ?Sized> IdentityRegistry for Box<R> {
    fn find_or_create(&mut self, payee: &PayeeDetails) -> Result<i64> {
        (**self).find_or_create(payee)
    }
}

/// Registry held in memory for the lifetime of the value
///
/// Identifiers are assigned sequentially from 1. Used for tests and for runs
/// without a configured database; identities are stable within one run only.
#[derive(Debug)]
pub struct InMemoryRegistry {
    ids: HashMap<PayeeDetails, i64>,
    next_id: i64,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            next_id: 1,
        }
    }

    /// Number of registered identities
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityRegistry for InMemoryRegistry {
    fn find_or_create(&mut self, payee: &PayeeDetails) -> Result<i64> {
        if let Some(&id) = self.ids.get(payee) {
            return Ok(id);
        }

        let id = self.next_id;
        self.next_id += 1;
        self.ids.insert(payee.clone(), id);
        debug!(id, payee = %payee.payee_name, "registered new payee");
        Ok(id)
    }
}

/// Registry persisted in a SQLite database
///
/// Payees live in a `payees` table whose unique index over the lookup tuple
/// guarantees at most one row per payee, even when several processes share
/// the database file. `NULL` building society numbers are indexed as the
/// empty string, which a normalized number can never be.
pub struct SqliteRegistry {
    conn: Connection,
}

impl SqliteRegistry {
    /// Open (and create if needed) the registry database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        setup_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Number of registered identities
    pub fn count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM payees", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn setup_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS payees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bank_account TEXT NOT NULL,
            sort_code TEXT NOT NULL,
            payee_name TEXT NOT NULL,
            building_society_num TEXT
        );
        CREATE UNIQUE INDEX IF NOT EXISTS payees_identity ON payees (
            bank_account,
            sort_code,
            payee_name,
            IFNULL(building_society_num, '')
        );",
    )?;
    Ok(())
}

impl IdentityRegistry for SqliteRegistry {
    fn find_or_create(&mut self, payee: &PayeeDetails) -> Result<i64> {
        let tx = self.conn.transaction()?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO payees (bank_account, sort_code, payee_name, building_society_num)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                payee.bank_account,
                payee.sort_code,
                payee.payee_name,
                payee.building_society_num,
            ],
        )?;

        let id: i64 = tx.query_row(
            "SELECT id FROM payees
             WHERE bank_account = ?1 AND sort_code = ?2 AND payee_name = ?3
               AND building_society_num IS ?4",
            params![
                payee.bank_account,
                payee.sort_code,
                payee.payee_name,
                payee.building_society_num,
            ],
            |row| row.get(0),
        )?;

        tx.commit()?;

        if inserted > 0 {
            debug!(id, payee = %payee.payee_name, "registered new payee");
        }
        Ok(id)
    }
}
