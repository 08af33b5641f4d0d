//! SQLite-backed repositories for the import jobs.
//!
//! Every `save_all` call runs in its own transaction: either the whole chunk
//! is committed or none of it is.

use crate::config::DatabaseConfig;
use crate::domain::model::{Employee, Person};
use crate::domain::ports::Repository;
use crate::utils::error::Result;
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Executor, Row, Sqlite};

const CREATE_EMPLOYEE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS employee (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    id_cliente INTEGER NOT NULL,
    nombre TEXT,
    apellido TEXT,
    email TEXT,
    fecha_registro TEXT
)
"#;

const CREATE_PERSON_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS person (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    person_index TEXT,
    user_id TEXT,
    first_name TEXT,
    last_name TEXT,
    gender TEXT,
    email TEXT,
    phone TEXT,
    date_of_birth TEXT,
    job_title TEXT
)
"#;

/// Opens the pool. In-memory databases are pinned to one long-lived
/// connection, otherwise every new connection would see an empty database.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    let options = if config.url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    let pool = options.connect(&config.url).await?;
    tracing::info!("🗄️ Database connection pool established ({})", config.url);
    Ok(pool)
}

pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_EMPLOYEE_TABLE).execute(pool).await?;
    sqlx::query(CREATE_PERSON_TABLE).execute(pool).await?;
    tracing::debug!("Schema ready (employee, person)");
    Ok(())
}

async fn insert_employee<'e, E>(executor: E, employee: &Employee) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO employee (id_cliente, nombre, apellido, email, fecha_registro)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(employee.external_id)
    .bind(&employee.first_name)
    .bind(&employee.last_name)
    .bind(&employee.email)
    .bind(employee.registration_date)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

fn employee_from_row(row: &SqliteRow) -> Result<Employee> {
    Ok(Employee {
        id: Some(row.try_get("id")?),
        external_id: row.try_get("id_cliente")?,
        first_name: row.try_get("nombre")?,
        last_name: row.try_get("apellido")?,
        email: row.try_get("email")?,
        registration_date: row.try_get("fecha_registro")?,
    })
}

async fn insert_person<'e, E>(executor: E, person: &Person) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO person (
            person_index, user_id, first_name, last_name, gender,
            email, phone, date_of_birth, job_title
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&person.index)
    .bind(&person.user_id)
    .bind(&person.first_name)
    .bind(&person.last_name)
    .bind(&person.gender)
    .bind(&person.email)
    .bind(&person.phone)
    .bind(&person.date_of_birth)
    .bind(&person.job_title)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

fn person_from_row(row: &SqliteRow) -> Result<Person> {
    Ok(Person {
        id: Some(row.try_get("id")?),
        index: row.try_get("person_index")?,
        user_id: row.try_get("user_id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        gender: row.try_get("gender")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        date_of_birth: row.try_get("date_of_birth")?,
        job_title: row.try_get("job_title")?,
    })
}

#[derive(Debug, Clone)]
pub struct SqliteEmployeeRepository {
    pool: SqlitePool,
}

impl SqliteEmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Employee> for SqliteEmployeeRepository {
    async fn save(&self, item: &Employee) -> Result<i64> {
        insert_employee(&self.pool, item).await
    }

    async fn save_all(&self, items: &[Employee]) -> Result<Vec<i64>> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(items.len());

        for item in items {
            ids.push(insert_employee(&mut *tx, item).await?);
        }

        tx.commit().await?;
        Ok(ids)
    }

    async fn find_first_by_order_by_id_asc(&self) -> Result<Option<Employee>> {
        sqlx::query("SELECT * FROM employee ORDER BY id ASC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(employee_from_row)
            .transpose()
    }

    async fn find_top_by_order_by_id_desc(&self) -> Result<Option<Employee>> {
        sqlx::query("SELECT * FROM employee ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(employee_from_row)
            .transpose()
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employee")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[derive(Debug, Clone)]
pub struct SqlitePersonRepository {
    pool: SqlitePool,
}

impl SqlitePersonRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Person> for SqlitePersonRepository {
    async fn save(&self, item: &Person) -> Result<i64> {
        insert_person(&self.pool, item).await
    }

    async fn save_all(&self, items: &[Person]) -> Result<Vec<i64>> {
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(items.len());

        for item in items {
            ids.push(insert_person(&mut *tx, item).await?);
        }

        tx.commit().await?;
        Ok(ids)
    }

    async fn find_first_by_order_by_id_asc(&self) -> Result<Option<Person>> {
        sqlx::query("SELECT * FROM person ORDER BY id ASC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(person_from_row)
            .transpose()
    }

    async fn find_top_by_order_by_id_desc(&self) -> Result<Option<Person>> {
        sqlx::query("SELECT * FROM person ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(person_from_row)
            .transpose()
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM person")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
