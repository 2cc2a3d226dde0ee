//! Simulation configuration
//!
//! Defaults reproduce the reference scenario: eight cloudlets with levels
//! `2,1,5,6,3,4,2,5`, four 250-MIPS VMs, 250 000 MI cloudlets and a 2 s
//! stagger between per-job refreshes. A JSON file can override any field.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::aging::{AgingPolicy, LinearAging, NoAging, DEFAULT_NORMALIZATION_MS, DEFAULT_SCALE};
use crate::error::{PriorityError, Result};
use crate::queue::DEFAULT_REFRESH_INTERVAL_MS;
use crate::types::{Cloudlet, CloudletTemplate, JobId, VmSpec};

/// Static levels used when none are configured
pub const DEFAULT_LEVELS: [f64; 8] = [2.0, 1.0, 5.0, 6.0, 3.0, 4.0, 2.0, 5.0];

/// Longest total simulated wait across a staggered refresh (about 3000 years)
///
/// Keeps every refresh instant well inside the representable date range.
pub const MAX_TOTAL_WAIT_MS: u128 = 100_000_000_000_000;

/// Highest level produced by random batch generation
pub const MAX_RANDOM_LEVEL: u32 = 10;

/// Which aging policy to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    #[default]
    Linear,
    Static,
}

impl PolicyKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "linear" => Some(Self::Linear),
            "static" => Some(Self::Static),
            _ => None,
        }
    }
}

/// Aging policy settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgingConfig {
    pub policy: PolicyKind,
    pub scale: f64,
    pub normalization_ms: f64,
}

impl Default for AgingConfig {
    fn default() -> Self {
        AgingConfig {
            policy: PolicyKind::Linear,
            scale: DEFAULT_SCALE,
            normalization_ms: DEFAULT_NORMALIZATION_MS,
        }
    }
}

impl AgingConfig {
    pub fn build(&self) -> Result<Box<dyn AgingPolicy>> {
        Ok(match self.policy {
            PolicyKind::Linear => Box::new(LinearAging::new(self.scale, self.normalization_ms)?),
            PolicyKind::Static => Box::new(NoAging::new(self.scale)?),
        })
    }
}

/// VM pool offered by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VmPoolConfig {
    pub count: u64,
    pub mips: f64,
}

impl Default for VmPoolConfig {
    fn default() -> Self {
        VmPoolConfig {
            count: 4,
            mips: 250.0,
        }
    }
}

/// Full run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub aging: AgingConfig,
    pub vms: VmPoolConfig,
    pub cloudlet: CloudletTemplate,
    /// One entry per cloudlet; cloudlet ids are the indices
    pub levels: Vec<f64>,
    /// Wait between successive per-job refreshes
    pub refresh_interval_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            aging: AgingConfig::default(),
            vms: VmPoolConfig::default(),
            cloudlet: CloudletTemplate::default(),
            levels: DEFAULT_LEVELS.to_vec(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

impl SimulationConfig {
    /// Load and validate a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config: SimulationConfig = serde_json::from_str(&contents)?;
        config.validate()?;

        info!(path = %path.display(), cloudlets = config.levels.len(), "Loaded config");
        Ok(config)
    }

    /// Replace the levels with `count` random integer levels in `1..=10`
    pub fn with_random_levels(mut self, count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        self.levels = (0..count)
            .map(|_| rng.gen_range(1..=MAX_RANDOM_LEVEL) as f64)
            .collect();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.levels.is_empty() {
            return Err(PriorityError::config("at least one cloudlet level is required"));
        }
        if let Some(level) = self.levels.iter().find(|l| !l.is_finite()) {
            return Err(PriorityError::config(format!("level {level} is not finite")));
        }
        if self.vms.count == 0 {
            return Err(PriorityError::config("at least one VM is required"));
        }
        let total_wait_ms = self.levels.len() as u128 * self.refresh_interval_ms as u128;
        if total_wait_ms > MAX_TOTAL_WAIT_MS {
            return Err(PriorityError::config(format!(
                "{} refreshes of {}ms exceed the {}ms simulated wait limit",
                self.levels.len(),
                self.refresh_interval_ms,
                MAX_TOTAL_WAIT_MS
            )));
        }
        if !(self.vms.mips.is_finite() && self.vms.mips > 0.0) {
            return Err(PriorityError::config(format!(
                "VM MIPS must be positive, got {}",
                self.vms.mips
            )));
        }
        self.aging.build()?;
        Ok(())
    }

    /// `(id, level)` pairs for batch assembly
    pub fn entries(&self) -> Vec<(JobId, f64)> {
        self.levels
            .iter()
            .enumerate()
            .map(|(id, &level)| (id as JobId, level))
            .collect()
    }

    pub fn cloudlets(&self) -> Vec<Cloudlet> {
        (0..self.levels.len() as JobId)
            .map(|id| self.cloudlet.build(id))
            .collect()
    }

    pub fn vm_specs(&self) -> Vec<VmSpec> {
        (0..self.vms.count)
            .map(|id| VmSpec::new(id, self.vms.mips))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_reference_scenario() {
        let config = SimulationConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.levels, vec![2.0, 1.0, 5.0, 6.0, 3.0, 4.0, 2.0, 5.0]);
        assert_eq!(config.vm_specs().len(), 4);
        assert_eq!(config.cloudlets().len(), 8);
        assert_eq!(config.entries()[3], (3, 6.0));
        assert_eq!(config.refresh_interval_ms, 2000);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "levels": [1, 9], "aging": { "scale": 10.0 } }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.levels, vec![1.0, 9.0]);
        assert_eq!(config.aging.scale, 10.0);
        assert_eq!(config.aging.normalization_ms, 1000.0);
        assert_eq!(config.aging.policy, PolicyKind::Linear);
        assert_eq!(config.vms.count, 4);
    }

    #[test]
    fn test_policy_kind_from_json() {
        let json = r#"{ "aging": { "policy": "static" } }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();

        let policy = config.aging.build().unwrap();
        assert_eq!(policy.name(), "NoAging");
    }

    #[test]
    fn test_validation_errors() {
        let mut config = SimulationConfig::default();
        config.levels.clear();
        assert!(matches!(config.validate(), Err(PriorityError::Config(_))));

        let mut config = SimulationConfig::default();
        config.vms.count = 0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.refresh_interval_ms = u64::MAX;
        assert!(matches!(config.validate(), Err(PriorityError::Config(_))));

        let mut config = SimulationConfig::default();
        config.vms.mips = f64::NAN;
        assert!(matches!(config.validate(), Err(PriorityError::Config(_))));

        let mut config = SimulationConfig::default();
        config.vms.mips = f64::INFINITY;
        assert!(matches!(config.validate(), Err(PriorityError::Config(_))));

        let mut config = SimulationConfig::default();
        config.aging.normalization_ms = 0.0;
        assert!(matches!(config.validate(), Err(PriorityError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_aging_constants_in_json_rejected() {
        let json = r#"{ "aging": { "normalization_ms": 0 } }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();

        assert!(matches!(config.validate(), Err(PriorityError::InvalidInput(_))));
        assert!(config.aging.build().is_err());

        let json = r#"{ "aging": { "policy": "static", "scale": -1 } }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_random_levels_are_seeded() {
        let a = SimulationConfig::default().with_random_levels(20, 42);
        let b = SimulationConfig::default().with_random_levels(20, 42);

        assert_eq!(a.levels, b.levels);
        assert_eq!(a.levels.len(), 20);
        assert!(a.levels.iter().all(|&l| (1.0..=10.0).contains(&l)));
    }

    #[test]
    fn test_from_file() {
        let name = format!("priority-sim-config-{}.json", std::process::id());
        let path = std::env::temp_dir().join(name);
        fs::write(&path, r#"{ "levels": [3, 1], "vms": { "count": 2 } }"#).unwrap();

        let config = SimulationConfig::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.entries(), vec![(0, 3.0), (1, 1.0)]);
        assert_eq!(config.vm_specs().len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = SimulationConfig::from_file("/nonexistent/priority-sim.json").unwrap_err();
        assert!(matches!(err, PriorityError::Io(_)));
    }
}
