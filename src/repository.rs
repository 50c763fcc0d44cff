// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Typed entity repositories over the [`ResourceStore`].
//!
//! Every entity is stored as JSON under the key `<fabricID>:<resource URI>` in
//! its own table, and its URI is added to the set `<table>:<fabricID>` so the
//! fabric's members can be enumerated without a key scan.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::constants::{
    KEY_SEPARATOR, TABLE_ADDRESS_POOL, TABLE_ENDPOINT, TABLE_FABRIC, TABLE_ZONE,
    TABLE_ZONE_DOMAIN,
};
use crate::errors::FabricError;
use crate::model::{AciDomainData, AddressPool, Endpoint, Fabric, Zone};
use crate::store::{ResourceStore, StoreError};

/// An entity persisted by a [`Repository`].
pub trait StoredEntity: Serialize + DeserializeOwned + Send + Sync {
    /// Store table of the entity
    const TABLE: &'static str;
    /// Kind reported in `NotFound` errors
    const KIND: &'static str;

    /// Resource URI of this entity.
    fn uri(&self) -> &str;
}

impl StoredEntity for Fabric {
    const TABLE: &'static str = TABLE_FABRIC;
    const KIND: &'static str = "Fabric";

    fn uri(&self) -> &str {
        &self.odata_id
    }
}

impl StoredEntity for Zone {
    const TABLE: &'static str = TABLE_ZONE;
    const KIND: &'static str = "Zone";

    fn uri(&self) -> &str {
        &self.odata_id
    }
}

impl StoredEntity for Endpoint {
    const TABLE: &'static str = TABLE_ENDPOINT;
    const KIND: &'static str = "Endpoint";

    fn uri(&self) -> &str {
        &self.odata_id
    }
}

impl StoredEntity for AddressPool {
    const TABLE: &'static str = TABLE_ADDRESS_POOL;
    const KIND: &'static str = "AddressPool";

    fn uri(&self) -> &str {
        &self.odata_id
    }
}

impl StoredEntity for AciDomainData {
    const TABLE: &'static str = TABLE_ZONE_DOMAIN;
    const KIND: &'static str = "ZoneDomain";

    fn uri(&self) -> &str {
        &self.zone_uri
    }
}

/// Store key of an entity.
#[must_use]
pub fn entity_key(fabric_id: &str, uri: &str) -> String {
    format!("{fabric_id}{KEY_SEPARATOR}{uri}")
}

/// Typed get/save/update/delete/list access to one entity kind.
pub struct Repository<T> {
    store: Arc<dyn ResourceStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<T: StoredEntity> Repository<T> {
    /// Create a repository backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn set_key(fabric_id: &str) -> String {
        format!("{}{KEY_SEPARATOR}{fabric_id}", T::TABLE)
    }

    fn decode(key: &str, raw: &str) -> Result<T, FabricError> {
        serde_json::from_str(raw).map_err(|e| {
            StoreError::Corrupt {
                table: T::TABLE.to_string(),
                key: key.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn encode(entity: &T) -> Result<String, FabricError> {
        serde_json::to_string(entity).map_err(|e| {
            FabricError::StoreUnavailable(format!("cannot encode {}: {e}", T::KIND))
        })
    }

    /// Read an entity, mapping an absent key to `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::NotFound`] if absent, [`FabricError::StoreUnavailable`]
    /// if the store fails or the snapshot cannot be decoded.
    pub async fn get(&self, fabric_id: &str, uri: &str) -> Result<T, FabricError> {
        self.find(fabric_id, uri)
            .await?
            .ok_or_else(|| FabricError::not_found(T::KIND, uri))
    }

    /// Read an entity if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::StoreUnavailable`] if the store fails.
    pub async fn find(&self, fabric_id: &str, uri: &str) -> Result<Option<T>, FabricError> {
        let key = entity_key(fabric_id, uri);
        match self.store.get(T::TABLE, &key).await {
            Ok(raw) => Self::decode(&key, &raw).map(Some),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist a new entity and register it in the fabric's membership set.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::Conflict`] if the key is taken.
    pub async fn save(&self, fabric_id: &str, entity: &T) -> Result<(), FabricError> {
        let key = entity_key(fabric_id, entity.uri());
        self.store
            .create(T::TABLE, &key, &Self::encode(entity)?)
            .await?;
        self.store
            .add_to_set(&Self::set_key(fabric_id), entity.uri())
            .await?;
        debug!(table = T::TABLE, key = %key, "Saved entity");
        Ok(())
    }

    /// Replace an existing entity.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::NotFound`] if the entity does not exist.
    pub async fn update(&self, fabric_id: &str, entity: &T) -> Result<(), FabricError> {
        let key = entity_key(fabric_id, entity.uri());
        match self
            .store
            .update(T::TABLE, &key, &Self::encode(entity)?)
            .await
        {
            Ok(()) => {
                debug!(table = T::TABLE, key = %key, "Updated entity");
                Ok(())
            }
            Err(StoreError::NotFound { .. }) => {
                Err(FabricError::not_found(T::KIND, entity.uri()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Remove an entity and its membership.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::NotFound`] if the entity does not exist.
    pub async fn delete(&self, fabric_id: &str, uri: &str) -> Result<(), FabricError> {
        let key = entity_key(fabric_id, uri);
        match self.store.delete(T::TABLE, &key).await {
            Ok(()) => {}
            Err(StoreError::NotFound { .. }) => {
                return Err(FabricError::not_found(T::KIND, uri));
            }
            Err(e) => return Err(e.into()),
        }
        self.store
            .remove_from_set(&Self::set_key(fabric_id), uri)
            .await?;
        debug!(table = T::TABLE, key = %key, "Deleted entity");
        Ok(())
    }

    /// URIs of all entities of this kind in a fabric.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::StoreUnavailable`] if the store fails.
    pub async fn list_uris(&self, fabric_id: &str) -> Result<Vec<String>, FabricError> {
        Ok(self.store.list_set(&Self::set_key(fabric_id)).await?)
    }

    /// All entities of this kind in a fabric.
    ///
    /// Members whose snapshot vanished between the set read and the get are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::StoreUnavailable`] if the store fails.
    pub async fn list(&self, fabric_id: &str) -> Result<Vec<T>, FabricError> {
        let mut entities = Vec::new();
        for uri in self.list_uris(fabric_id).await? {
            if let Some(entity) = self.find(fabric_id, &uri).await? {
                entities.push(entity);
            }
        }
        Ok(entities)
    }

    /// All entities of this kind across every fabric.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::StoreUnavailable`] if the store fails.
    pub async fn list_all(&self) -> Result<Vec<T>, FabricError> {
        let mut entities = Vec::new();
        for key in self.store.list_keys_matching(T::TABLE, "*").await? {
            match self.store.get(T::TABLE, &key).await {
                Ok(raw) => entities.push(Self::decode(&key, &raw)?),
                Err(StoreError::NotFound { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(entities)
    }
}

/// Fabric repository
pub type FabricRepository = Repository<Fabric>;
/// Zone repository
pub type ZoneRepository = Repository<Zone>;
/// Endpoint repository
pub type EndpointRepository = Repository<Endpoint>;
/// AddressPool repository
pub type AddressPoolRepository = Repository<AddressPool>;
/// Zone to controller-domain cross-reference repository
pub type ZoneDomainRepository = Repository<AciDomainData>;

/// All repositories sharing one store.
#[derive(Clone)]
pub struct Repositories {
    /// Fabrics
    pub fabrics: FabricRepository,
    /// Zones
    pub zones: ZoneRepository,
    /// Endpoints
    pub endpoints: EndpointRepository,
    /// Address pools
    pub address_pools: AddressPoolRepository,
    /// Zone domain cross references
    pub zone_domains: ZoneDomainRepository,
}

impl Repositories {
    /// Create every repository on top of `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            fabrics: Repository::new(Arc::clone(&store)),
            zones: Repository::new(Arc::clone(&store)),
            endpoints: Repository::new(Arc::clone(&store)),
            address_pools: Repository::new(Arc::clone(&store)),
            zone_domains: Repository::new(store),
        }
    }

    /// Read a fabric by ID.
    ///
    /// # Errors
    ///
    /// Returns [`FabricError::NotFound`] for an unknown fabric.
    pub async fn fabric(&self, fabric_id: &str) -> Result<Fabric, FabricError> {
        self.fabrics
            .get(fabric_id, &crate::model::fabric_uri(fabric_id))
            .await
    }
}
