// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command line and environment configuration.
//!
//! Every option can be given as a flag or through the environment variable
//! named next to it. Fabric discovery is not part of this service, so the
//! fabric to manage is seeded from configuration at startup.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::constants::{
    DEFAULT_CONTROLLER_TIMEOUT_SECS, DEFAULT_EVENT_QUEUE_CAPACITY, DEFAULT_LISTEN_ADDR,
};
use crate::controller::apic::ApicConfig;
use crate::model::Fabric;

/// Errors raised while validating a parsed [`Config`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A live controller needs its URL and credentials
    #[error("--controller-url, --controller-username and --controller-password are required unless --dry-run is set")]
    MissingController,

    /// No switches were given for the seeded fabric
    #[error("at least one --switch-id is required")]
    NoSwitches,
}

/// Runtime configuration of the provisioner.
#[derive(Debug, Clone, Parser)]
#[command(name = "fabric-provisioner")]
#[command(version)]
#[command(about = "Redfish Fabric zone provisioning service for SDN fabric controllers")]
pub struct Config {
    /// Address the HTTP API listens on
    #[arg(long, env = "FABRIC_LISTEN_ADDR", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Base URL of the fabric controller, e.g. https://apic.example.net
    #[arg(long, env = "FABRIC_CONTROLLER_URL")]
    pub controller_url: Option<String>,

    /// Controller login user
    #[arg(long, env = "FABRIC_CONTROLLER_USERNAME")]
    pub controller_username: Option<String>,

    /// Controller login password
    #[arg(long, env = "FABRIC_CONTROLLER_PASSWORD", hide_env_values = true)]
    pub controller_password: Option<String>,

    /// Per-request controller timeout in seconds
    #[arg(long, env = "FABRIC_CONTROLLER_TIMEOUT_SECS", default_value_t = DEFAULT_CONTROLLER_TIMEOUT_SECS)]
    pub controller_timeout_secs: u64,

    /// Provision against an in-memory controller instead of a live one
    #[arg(long, env = "FABRIC_DRY_RUN")]
    pub dry_run: bool,

    /// Capacity of the outbound event queue
    #[arg(long, env = "FABRIC_EVENT_QUEUE_CAPACITY", default_value_t = DEFAULT_EVENT_QUEUE_CAPACITY)]
    pub event_queue_capacity: usize,

    /// Identifier of the fabric to manage
    #[arg(long, env = "FABRIC_ID", default_value = "fabric1")]
    pub fabric_id: String,

    /// Controller pod of the fabric's switches
    #[arg(long, env = "FABRIC_POD_ID", default_value = "1")]
    pub pod_id: String,

    /// Redfish switch identifier (`<chassis>:<node>`), repeatable
    #[arg(long = "switch-id", env = "FABRIC_SWITCH_IDS", value_delimiter = ',')]
    pub switch_ids: Vec<String>,
}

impl Config {
    /// Check option combinations clap cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when controller settings or switches are missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.switch_ids.is_empty() {
            return Err(ConfigError::NoSwitches);
        }
        if !self.dry_run && self.apic().is_none() {
            return Err(ConfigError::MissingController);
        }
        Ok(())
    }

    /// Controller connection settings, if all of them are present.
    #[must_use]
    pub fn apic(&self) -> Option<ApicConfig> {
        Some(ApicConfig {
            base_url: self.controller_url.clone()?,
            username: self.controller_username.clone()?,
            password: self.controller_password.clone()?,
            timeout: Duration::from_secs(self.controller_timeout_secs),
        })
    }

    /// The fabric record seeded at startup.
    #[must_use]
    pub fn fabric(&self) -> Fabric {
        Fabric::new(&self.fabric_id, &self.pod_id, self.switch_ids.clone())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
