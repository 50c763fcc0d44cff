// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Fabric Provisioner - Redfish Fabric zones on an SDN controller
//!
//! The provisioner exposes the Redfish `Fabric` resource tree (Zones,
//! Endpoints, AddressPools) and turns every create, update and delete into
//! an ordered sequence of object operations against a policy-driven fabric
//! controller, keeping its own record of what it built in a resource store.
//!
//! ## Overview
//!
//! A Redfish zone hierarchy maps onto controller objects as follows:
//!
//! - **Default** zone - a tenant
//! - **ZoneOfZones** - application profile, VRF, contract, physical domain,
//!   VLAN pool and attachable entity profile
//! - **ZoneOfEndpoints** - bridge domain with gateway subnet and an EPG that
//!   binds its member endpoints on one VLAN
//! - **Endpoint** - interface policy group, port selector and leaf profile
//!   for a redundant set of switch ports
//! - **AddressPool** - a VLAN range and optional gateway drawn on by zones
//!
//! ## Modules
//!
//! - [`orchestrators`] - Create, update and delete workflows per resource type
//! - [`builder`] - Controller object constructors and provisioning plans
//! - [`naming`] - Controller names and distinguished names
//! - [`topology`] - Port URI parsing and switch/port pattern derivation
//! - [`controller`] - Controller client trait, REST transport and in-memory fake
//! - [`repository`] - Typed entity access over the [`store`]
//! - [`locks`] - Per-resource mutual exclusion
//! - [`events`] - Outbound resource event queue
//! - [`api`] - HTTP routes
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use fabric_provisioner::context::Context;
//! use fabric_provisioner::controller::memory::MemoryController;
//! use fabric_provisioner::events::{EventPublisher, LogSink};
//! use fabric_provisioner::model::{ZoneRequest, ZoneType};
//! use fabric_provisioner::orchestrators::zone::create_zone;
//! use fabric_provisioner::store::MemoryStore;
//!
//! # async fn example() -> Result<(), fabric_provisioner::errors::FabricError> {
//! let (events, _worker) = EventPublisher::spawn(1024, Arc::new(LogSink));
//! let ctx = Context::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryController::new()),
//!     events,
//! );
//!
//! let request = ZoneRequest {
//!     name: Some("blue".to_string()),
//!     zone_type: Some(ZoneType::Default),
//!     ..ZoneRequest::default()
//! };
//! let zone = create_zone(&ctx, "fabric1", request).await?;
//! println!("created {}", zone.odata_id);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod builder;
pub mod config;
pub mod constants;
pub mod context;
pub mod controller;
pub mod errors;
pub mod events;
pub mod locks;
pub mod metrics;
pub mod model;
pub mod naming;
pub mod orchestrators;
pub mod repository;
pub mod status_reasons;
pub mod store;
pub mod topology;

#[cfg(test)]
mod repository_tests;
#[cfg(test)]
mod status_reasons_tests;
#[cfg(test)]
mod store_tests;
#[cfg(test)]
mod topology_tests;
