//! Loads the user→organization mapping from the user-administration
//! database.
//!
//! The store is a pluggable trait so the engine's tests (and the renderer
//! demos) can swap the MySQL collaborator for an in-memory double. The
//! query is hardcoded here in order to not duplicate code from / be
//! dependent on the user-management project that owns the schema.

use std::collections::HashMap;

use acct_core::config::DatabaseConfig;
use acct_core::error::Result;
use acct_core::models::Affiliation;
use chrono::NaiveDate;
use sqlx::mysql::MySql;
use sqlx::{MySqlPool, QueryBuilder, Row};
use tracing::debug;

// ── AffiliationStore ──────────────────────────────────────────────────────────

/// Backing store for the user→organization mapping.
///
/// `load` returns every (faculty, department) affiliation valid inside the
/// report's date window for each requested login. Users without a row
/// simply stay absent from the map; the resolver supplies the unknown
/// sentinel for them.
pub trait AffiliationStore {
    fn load(
        &self,
        logins: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> impl std::future::Future<Output = Result<HashMap<String, Vec<Affiliation>>>> + Send;
}

// ── MySQL store ───────────────────────────────────────────────────────────────

/// The production store, backed by the MySQL user-administration database.
pub struct MysqlAffiliationStore {
    pool: MySqlPool,
}

impl MysqlAffiliationStore {
    /// Open a connection pool from the config-file credentials.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        debug!("Connecting to database '{}' on {}", config.database, config.host);
        let pool = MySqlPool::connect(&config.url()).await?;
        Ok(Self { pool })
    }
}

impl AffiliationStore for MysqlAffiliationStore {
    async fn load(
        &self,
        logins: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<String, Vec<Affiliation>>> {
        if logins.is_empty() {
            return Ok(HashMap::new());
        }

        debug!("Querying the database for {} users", logins.len());

        let mut qb: QueryBuilder<MySql> = QueryBuilder::new(
            "SELECT \
                users.username AS login, \
                faculties.name AS faculty, \
                departments.name AS department \
             FROM users \
             LEFT JOIN affiliations ON users.id = affiliations.user_id \
             LEFT JOIN departments ON affiliations.department_id = departments.id \
             LEFT JOIN faculties ON departments.faculty_id = faculties.id \
             WHERE users.username IN (",
        );
        {
            let mut separated = qb.separated(", ");
            for login in logins {
                separated.push_bind(login.clone());
            }
        }
        qb.push(") AND users.start_date < ");
        qb.push_bind(end);
        qb.push(" AND (users.end_date >= ");
        qb.push_bind(start);
        qb.push(" OR users.end_date IS NULL)");
        qb.push(" AND affiliations.start_date < ");
        qb.push_bind(end);
        qb.push(" AND (affiliations.end_date >= ");
        qb.push_bind(start);
        qb.push(" OR affiliations.end_date IS NULL)");
        qb.push(" AND departments.date_added < ");
        qb.push_bind(end);
        qb.push(" AND (departments.date_removed >= ");
        qb.push_bind(start);
        qb.push(" OR departments.date_removed IS NULL)");
        qb.push(" AND faculties.date_added < ");
        qb.push_bind(end);
        qb.push(" AND (faculties.date_removed >= ");
        qb.push_bind(start);
        qb.push(" OR faculties.date_removed IS NULL)");

        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut mapping: HashMap<String, Vec<Affiliation>> = HashMap::new();
        for row in rows {
            let login: String = row.try_get("login")?;
            let faculty: Option<String> = row.try_get("faculty")?;
            let department: Option<String> = row.try_get("department")?;
            // NULL organization fields degrade to the unknown sentinel
            // field-wise inside Affiliation::new.
            mapping.entry(login).or_default().push(Affiliation::new(
                faculty.unwrap_or_default(),
                department.unwrap_or_default(),
            ));
        }

        debug!("Loaded affiliations for {} users", mapping.len());
        Ok(mapping)
    }
}

// ── In-memory store ───────────────────────────────────────────────────────────

/// Test double holding a fixed mapping.
#[derive(Debug, Clone, Default)]
pub struct MemoryAffiliationStore {
    mapping: HashMap<String, Vec<Affiliation>>,
}

impl MemoryAffiliationStore {
    pub fn new(mapping: HashMap<String, Vec<Affiliation>>) -> Self {
        Self { mapping }
    }
}

impl AffiliationStore for MemoryAffiliationStore {
    async fn load(
        &self,
        logins: &[String],
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<HashMap<String, Vec<Affiliation>>> {
        Ok(self
            .mapping
            .iter()
            .filter(|(login, _)| logins.contains(login))
            .map(|(login, affs)| (login.clone(), affs.clone()))
            .collect())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
