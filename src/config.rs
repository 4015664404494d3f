//! Host configuration.
//!
//! Slider bounds and the energy scan are fixed; the listen address and the
//! model source can be overridden with `WELLVIZ_ADDR` and `WELLVIZ_MODEL`.

use std::env;
use std::net::SocketAddr;

use serde::Serialize;

pub const ADDR_VAR: &str = "WELLVIZ_ADDR";
pub const MODEL_VAR: &str = "WELLVIZ_MODEL";

/// Inclusive slider range with its starting value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
    pub default: T,
    pub step: T,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub fn clamp(&self, value: T) -> T {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }
}

/// Widths (nm) and level of the energy-vs-width plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScanConfig {
    pub min_width: f64,
    pub max_width: f64,
    pub steps: usize,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostConfig {
    pub addr: SocketAddr,
    pub model_source: String,
    pub width: Range<f64>,
    pub level: Range<u32>,
    pub resolution: Range<usize>,
    pub scan: ScanConfig,
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            model_source: "data/rf_infinite_well_model.json".to_string(),
            width: Range { min: 0.1, max: 10.0, default: 1.0, step: 0.1 },
            level: Range { min: 1, max: 10, default: 1, step: 1 },
            resolution: Range { min: 200, max: 2000, default: 500, step: 100 },
            scan: ScanConfig { min_width: 0.1, max_width: 5.0, steps: 300, level: 1 },
        }
    }
}

impl HostConfig {
    /// Defaults overlaid with whatever the environment sets.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String>
    {
        let mut config = HostConfig::default();
        if let Some(raw) = lookup(ADDR_VAR) {
            match raw.trim().parse::<SocketAddr>() {
                Ok(addr) => config.addr = addr,
                Err(e) => log::warn!("ignoring {ADDR_VAR}={raw:?}: {e}"),
            }
        }
        if let Some(raw) = lookup(MODEL_VAR) {
            let raw = raw.trim();
            if raw.is_empty() {
                log::warn!("ignoring empty {MODEL_VAR}");
            } else {
                config.model_source = raw.to_string();
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HostConfig::from_lookup(|_| None);
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.resolution.default, 500);
    }

    #[test]
    fn test_overrides() {
        let config = HostConfig::from_lookup(|key| match key {
            ADDR_VAR => Some("0.0.0.0:8080".to_string()),
            MODEL_VAR => Some(" https://host/model.json ".to_string()),
            _ => None,
        });
        assert_eq!(config.addr, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.model_source, "https://host/model.json");
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = HostConfig::from_lookup(|key| match key {
            ADDR_VAR => Some("not an address".to_string()),
            MODEL_VAR => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config, HostConfig::default());
    }

    #[test]
    fn test_range_clamp() {
        let config = HostConfig::default();
        assert_eq!(config.width.clamp(-3.0), 0.1);
        assert_eq!(config.width.clamp(42.0), 10.0);
        assert_eq!(config.width.clamp(2.5), 2.5);
        assert_eq!(config.level.clamp(0), 1);
        assert_eq!(config.resolution.clamp(5), 200);
    }
}
