// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Network configuration.
//!
//! A [NocConfig] is built from, in increasing order of priority:
//!  - the defaults below.
//!  - an optional TOML file.
//!  - environment variables prefixed with `NOC_` (nested fields use `__`, for
//!    example `NOC_ACO__ANT_PERIOD=50`).

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use noc_engine::sim_error;
use noc_engine::types::{SimError, SimResult};
use serde::{Deserialize, Serialize};

use crate::mesh::Mesh;

#[derive(clap::ValueEnum, Clone, Copy, Default, Debug, Serialize, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingAlgorithm {
    #[default]
    /// Dimension order: all X hops before any Y hops
    Xy,

    /// Odd-even turn model
    OddEven,

    /// Ant-colony optimisation over the odd-even turn model
    Aco,
}

/// Settings for the ant-colony routing agents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcoConfig {
    /// Cycles between forward ants from each agent. 0 disables them.
    pub ant_period: u64,

    /// Pheromone reinforcement applied by backward ants, in (0, 1).
    pub reinforcement_factor: f64,

    /// Size of an ant packet in bytes.
    pub ant_packet_size: usize,
}

impl Default for AcoConfig {
    fn default() -> Self {
        Self {
            ant_period: 100,
            reinforcement_factor: 0.3,
            ant_packet_size: 8,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NocConfig {
    pub mesh_width: usize,
    pub mesh_height: usize,

    /// Virtual channels per port.
    pub num_virtual_channels: usize,

    /// Flits held by each input virtual channel.
    pub max_input_buffer_size: usize,

    /// Packets that can wait at a router before injection is refused.
    pub max_injection_buffer_size: usize,

    /// Bytes carried by one flit.
    pub link_width: usize,

    /// Cycles for a flit to cross a link.
    pub link_delay: u64,

    pub routing: RoutingAlgorithm,
    pub aco: AcoConfig,

    /// Seed for all random number generators.
    pub seed: u64,
}

impl Default for NocConfig {
    fn default() -> Self {
        Self {
            mesh_width: 4,
            mesh_height: 4,
            num_virtual_channels: 2,
            max_input_buffer_size: 4,
            max_injection_buffer_size: 16,
            link_width: 16,
            link_delay: 1,
            routing: RoutingAlgorithm::default(),
            aco: AcoConfig::default(),
            seed: 1,
        }
    }
}

impl NocConfig {
    /// Load the configuration from defaults, an optional TOML file and the
    /// environment.
    pub fn load(conf_file: Option<&Path>) -> Result<Self, SimError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(conf_file) = conf_file {
            if !conf_file.exists() {
                return sim_error!(format!(
                    "Config file {} does not exist",
                    conf_file.display()
                ));
            }
            figment = figment.merge(Toml::file(conf_file));
        }
        figment = figment.merge(Env::prefixed("NOC_").split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| SimError(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration describes a network that can be built.
    pub fn validate(&self) -> SimResult {
        if self.mesh_width == 0 || self.mesh_height == 0 {
            return sim_error!("Mesh dimensions must be non-zero");
        }
        if self.num_virtual_channels == 0 {
            return sim_error!("At least one virtual channel is required");
        }
        if self.max_input_buffer_size == 0 {
            return sim_error!("Input buffers must hold at least one flit");
        }
        if self.max_injection_buffer_size == 0 {
            return sim_error!("Injection buffers must hold at least one packet");
        }
        if self.link_width == 0 {
            return sim_error!("Link width must be non-zero");
        }
        if self.link_delay == 0 {
            return sim_error!("Link delay must be at least one cycle");
        }
        let r = self.aco.reinforcement_factor;
        if !(r > 0.0 && r < 1.0) {
            return sim_error!(format!("Reinforcement factor {r} must be in (0, 1)"));
        }
        if self.aco.ant_packet_size == 0 {
            return sim_error!("Ant packets must be at least one byte");
        }
        if self.routing == RoutingAlgorithm::Aco {
            if self.num_virtual_channels < 2 {
                return sim_error!(
                    "ACO routing needs at least two virtual channels, one is kept for backward ants"
                );
            }
            let ant_flits = self.num_flits(self.aco.ant_packet_size);
            if ant_flits > self.max_input_buffer_size {
                return sim_error!(format!(
                    "Ant packets of {ant_flits} flits can never fit an input buffer of {}",
                    self.max_input_buffer_size
                ));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn mesh(&self) -> Mesh {
        Mesh::new(self.mesh_width, self.mesh_height)
    }

    /// Number of flits needed to carry `size_bytes`.
    ///
    /// Every packet has at least one flit.
    #[must_use]
    pub fn num_flits(&self, size_bytes: usize) -> usize {
        size_bytes.div_ceil(self.link_width).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        NocConfig::default().validate().unwrap();
    }

    #[test]
    fn flit_counts() {
        let config = NocConfig {
            link_width: 8,
            ..NocConfig::default()
        };
        assert_eq!(config.num_flits(0), 1);
        assert_eq!(config.num_flits(1), 1);
        assert_eq!(config.num_flits(8), 1);
        assert_eq!(config.num_flits(9), 2);
        assert_eq!(config.num_flits(64), 8);
    }

    #[test]
    fn rejects_zero_link_delay() {
        let config = NocConfig {
            link_delay: 0,
            ..NocConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn aco_needs_a_channel_for_backward_ants() {
        let mut config = NocConfig {
            routing: RoutingAlgorithm::Aco,
            num_virtual_channels: 1,
            ..NocConfig::default()
        };
        assert!(config.validate().is_err());
        config.num_virtual_channels = 2;
        config.validate().unwrap();
    }

    #[test]
    fn aco_ants_must_fit_a_buffer() {
        let mut config = NocConfig {
            routing: RoutingAlgorithm::Aco,
            link_width: 8,
            max_input_buffer_size: 4,
            ..NocConfig::default()
        };
        config.aco.ant_packet_size = 64;
        let err = config.validate().unwrap_err();
        assert!(err.0.contains("8 flits"));

        config.aco.ant_packet_size = 32;
        config.validate().unwrap();

        // Without ants the size is irrelevant.
        config.aco.ant_packet_size = 64;
        config.routing = RoutingAlgorithm::OddEven;
        config.validate().unwrap();
    }

    #[test]
    fn rejects_bad_reinforcement() {
        let mut config = NocConfig::default();
        config.aco.reinforcement_factor = 1.0;
        assert!(config.validate().is_err());
    }
}
