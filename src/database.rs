use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

use crate::cpf::Cpf;
use crate::models::{Address, Client, Contract, ContractStatus, NewClient, NewContract, Vehicle};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a client with CPF {0} is already registered")]
    DuplicateCpf(Cpf),

    #[error("client {client_id} already has a signed contract")]
    AlreadySigned { client_id: i64 },

    #[error("contract number {0} is already in use")]
    DuplicateContractNumber(String),

    #[error("contract {id} is no longer {expected}")]
    StaleTransition { id: i64, expected: ContractStatus },

    #[error("corrupt row in {table}: {reason}")]
    Corrupt { table: &'static str, reason: String },

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

fn unique_violation_on(err: &sqlx::Error, column: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation() && db.message().contains(column),
        _ => false,
    }
}

/// SQLite-backed store for clients and contracts
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect, creating the database file if needed, and optionally migrate
    pub async fn connect(database_url: &str, max_connections: u32, auto_migrate: bool) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections.max(1));
        if database_url.contains(":memory:") {
            // Every connection to :memory: is its own database; keep exactly one alive.
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        info!(url = %database_url, "Connecting to database");
        let pool = pool_options.connect_with(options).await?;

        if auto_migrate {
            info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations completed");
        }

        Ok(Self { pool })
    }

    pub async fn insert_client(&self, client: &NewClient) -> Result<Client, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO clients (
                full_name, cpf, email, phone,
                postal_code, street, street_number, complement, district, city, state,
                vehicle_plate, vehicle_model, vehicle_make, vehicle_year,
                created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
        )
        .bind(&client.full_name)
        .bind(client.cpf.digits())
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address.postal_code)
        .bind(&client.address.street)
        .bind(&client.address.number)
        .bind(&client.address.complement)
        .bind(&client.address.district)
        .bind(&client.address.city)
        .bind(&client.address.state)
        .bind(&client.vehicle.plate)
        .bind(&client.vehicle.model)
        .bind(&client.vehicle.make)
        .bind(&client.vehicle.year)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation_on(&e, "clients.cpf") {
                StoreError::DuplicateCpf(client.cpf)
            } else {
                StoreError::Sqlx(e)
            }
        })?;

        let id = result.last_insert_rowid();
        self.get_client(id).await?.ok_or(StoreError::Corrupt {
            table: "clients",
            reason: format!("row {id} vanished after insert"),
        })
    }

    pub async fn get_client(&self, id: i64) -> Result<Option<Client>, StoreError> {
        let row = sqlx::query("SELECT * FROM clients WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(client_from_row).transpose()
    }

    pub async fn find_client_by_cpf(&self, cpf: &Cpf) -> Result<Option<Client>, StoreError> {
        let row = sqlx::query("SELECT * FROM clients WHERE cpf = ?1")
            .bind(cpf.digits())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(client_from_row).transpose()
    }

    pub async fn insert_contract(&self, contract: &NewContract) -> Result<Contract, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO contracts (
                client_id, contract_number, status, plan_name, plan_value,
                terms_accepted, accepted_at, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(contract.client_id)
        .bind(&contract.number)
        .bind(ContractStatus::Pending.as_str())
        .bind(&contract.plan_name)
        .bind(&contract.plan_value)
        .bind(contract.terms_accepted)
        .bind(contract.accepted_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation_on(&e, "contracts.contract_number") {
                StoreError::DuplicateContractNumber(contract.number.clone())
            } else {
                StoreError::Sqlx(e)
            }
        })?;

        let id = result.last_insert_rowid();
        self.get_contract(id).await?.ok_or(StoreError::Corrupt {
            table: "contracts",
            reason: format!("row {id} vanished after insert"),
        })
    }

    pub async fn get_contract(&self, id: i64) -> Result<Option<Contract>, StoreError> {
        let row = sqlx::query("SELECT * FROM contracts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(contract_from_row).transpose()
    }

    pub async fn has_signed_contract(&self, client_id: i64) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM contracts WHERE client_id = ?1 AND status = ?2) AS signed",
        )
        .bind(client_id)
        .bind(ContractStatus::Signed.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get::<i64, _>("signed")? != 0)
    }

    /// Pending contracts of a client, oldest first
    pub async fn pending_contracts(&self, client_id: i64) -> Result<Vec<Contract>, StoreError> {
        let rows = sqlx::query("SELECT * FROM contracts WHERE client_id = ?1 AND status = ?2 ORDER BY id")
            .bind(client_id)
            .bind(ContractStatus::Pending.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(contract_from_row).collect()
    }

    /// Persist a status change made with `Contract::apply`.
    ///
    /// The write only lands if the row is still in `previous`; the partial
    /// unique index turns a second signed contract into `AlreadySigned`.
    pub async fn persist_transition(&self, contract: &Contract, previous: ContractStatus) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE contracts
            SET status = ?1, signed_at = ?2, document_url = ?3, signature_id = ?4
            WHERE id = ?5 AND status = ?6
            "#,
        )
        .bind(contract.status.as_str())
        .bind(contract.signed_at)
        .bind(&contract.document_url)
        .bind(&contract.signature_id)
        .bind(contract.id)
        .bind(previous.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if unique_violation_on(&e, "contracts.client_id") {
                StoreError::AlreadySigned { client_id: contract.client_id }
            } else {
                StoreError::Sqlx(e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::StaleTransition {
                id: contract.id,
                expected: previous,
            });
        }
        Ok(())
    }

    /// Close database connections gracefully
    pub async fn shutdown(&self) {
        info!("Shutting down database connections...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}

fn client_from_row(row: &SqliteRow) -> Result<Client, StoreError> {
    let raw_cpf: String = row.try_get("cpf")?;
    let cpf = Cpf::parse(&raw_cpf).map_err(|e| StoreError::Corrupt {
        table: "clients",
        reason: format!("cpf {raw_cpf}: {e}"),
    })?;

    Ok(Client {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        cpf,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        address: Address {
            postal_code: row.try_get("postal_code")?,
            street: row.try_get("street")?,
            number: row.try_get("street_number")?,
            complement: row.try_get("complement")?,
            district: row.try_get("district")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
        },
        vehicle: Vehicle {
            plate: row.try_get("vehicle_plate")?,
            model: row.try_get("vehicle_model")?,
            make: row.try_get("vehicle_make")?,
            year: row.try_get("vehicle_year")?,
        },
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn contract_from_row(row: &SqliteRow) -> Result<Contract, StoreError> {
    let raw_status: String = row.try_get("status")?;
    let status = ContractStatus::parse(&raw_status).ok_or_else(|| StoreError::Corrupt {
        table: "contracts",
        reason: format!("unknown status {raw_status}"),
    })?;

    Ok(Contract {
        id: row.try_get("id")?,
        client_id: row.try_get("client_id")?,
        number: row.try_get("contract_number")?,
        status,
        document_url: row.try_get("document_url")?,
        plan_name: row.try_get("plan_name")?,
        plan_value: row.try_get("plan_value")?,
        terms_accepted: row.try_get("terms_accepted")?,
        accepted_at: row.try_get("accepted_at")?,
        created_at: row.try_get("created_at")?,
        signed_at: row.try_get("signed_at")?,
        signature_id: row.try_get("signature_id")?,
    })
}
