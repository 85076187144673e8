use tracing::info;

use crate::database::Database;
use crate::error::AppError;
use crate::models::{Client, NewClient};

/// Registration and lookup of clients. Clients are never updated or deleted.
#[derive(Debug, Clone)]
pub struct ClientRegistry {
    db: Database,
}

impl ClientRegistry {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn register(&self, new_client: NewClient) -> Result<Client, AppError> {
        if self.db.find_client_by_cpf(&new_client.cpf).await?.is_some() {
            return Err(AppError::DuplicateCpf);
        }

        // The UNIQUE constraint still catches a concurrent duplicate.
        let client = self.db.insert_client(&new_client).await?;
        info!(client_id = client.id, "Client registered");
        Ok(client)
    }

    pub async fn get(&self, id: i64) -> Result<Client, AppError> {
        self.db
            .get_client(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Cliente não encontrado".to_string()))
    }
}
