//! Device token persistence.
//!
//! The provider is the source of truth for devices; the gateway keeps a copy
//! of each issued token so operators can see which devices it registered.
//! A device id may hold one token at a time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use kaspi_core::GatewayError;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub device_id: String,
    pub device_token: String,
    pub trade_point_id: i64,
    pub organization_bin: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub registered_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("device {0} is already registered")]
    AlreadyExists(String),

    #[error("device store failure: {0}")]
    Backend(#[source] anyhow::Error),
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(_) => {
                GatewayError::Conflict("Device is already registered".to_string())
            }
            StoreError::Backend(source) => GatewayError::Internal(source),
        }
    }
}

#[async_trait]
pub trait DeviceTokenStore: Send + Sync {
    async fn contains(&self, device_id: &str) -> Result<bool, StoreError>;

    /// Fails with [`StoreError::AlreadyExists`] if the device id is taken.
    async fn save(&self, record: DeviceRecord) -> Result<(), StoreError>;

    /// Forget the device holding `device_token`. Unknown tokens are ignored.
    async fn remove(&self, device_token: &str) -> Result<(), StoreError>;
}

/// Process-local store, used when no database is configured.
#[derive(Debug, Default)]
pub struct InMemoryDeviceTokenStore {
    devices: DashMap<String, DeviceRecord>,
}

impl InMemoryDeviceTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, device_id: &str) -> Option<DeviceRecord> {
        self.devices.get(device_id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

#[async_trait]
impl DeviceTokenStore for InMemoryDeviceTokenStore {
    async fn contains(&self, device_id: &str) -> Result<bool, StoreError> {
        Ok(self.devices.contains_key(device_id))
    }

    async fn save(&self, record: DeviceRecord) -> Result<(), StoreError> {
        match self.devices.entry(record.device_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(record.device_id)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn remove(&self, device_token: &str) -> Result<(), StoreError> {
        self.devices.retain(|_, r| r.device_token != device_token);
        Ok(())
    }
}

#[derive(Clone)]
pub struct MongoDeviceTokenStore {
    collection: Collection<DeviceRecord>,
}

impl MongoDeviceTokenStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("devices"),
        }
    }

    pub async fn init_indexes(&self) -> anyhow::Result<()> {
        let device_id_index = IndexModel::builder()
            .keys(doc! { "device_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("device_id_unique_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        let device_token_index = IndexModel::builder()
            .keys(doc! { "device_token": 1 })
            .options(
                IndexOptions::builder()
                    .name("device_token_idx".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_indexes([device_id_index, device_token_index], None)
            .await?;

        tracing::info!("Device store indexes initialized");
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl DeviceTokenStore for MongoDeviceTokenStore {
    async fn contains(&self, device_id: &str) -> Result<bool, StoreError> {
        let found = self
            .collection
            .find_one(doc! { "device_id": device_id }, None)
            .await
            .map_err(|e| StoreError::Backend(e.into()))?;
        Ok(found.is_some())
    }

    async fn save(&self, record: DeviceRecord) -> Result<(), StoreError> {
        match self.collection.insert_one(&record, None).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::AlreadyExists(record.device_id)),
            Err(e) => Err(StoreError::Backend(e.into())),
        }
    }

    async fn remove(&self, device_token: &str) -> Result<(), StoreError> {
        self.collection
            .delete_many(doc! { "device_token": device_token }, None)
            .await
            .map_err(|e| StoreError::Backend(e.into()))?;
        Ok(())
    }
}
