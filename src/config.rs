//! Run configuration.
//!
//! Sources, later overriding earlier:
//!
//! 1. Built-in defaults
//! 2. A YAML file, either the given path or `toffoli-tune.yaml` in the working directory
//! 3. Environment variables (`TOFFOLI_TUNE_*`)
//!
//! Command line flags are applied on top by the binary.

use std::env;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cost::CostFunction;
use crate::errors::{TuneError, TuneResult};
use crate::simulate::SimulationMode;
use crate::tuning::DifferentialEvolutionOptions;

/// File looked for in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "toffoli-tune.yaml";

/// Everything a tuning session needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Differential evolution settings.
    #[serde(default)]
    pub optimizer: DifferentialEvolutionOptions,

    /// How measurement based costs are simulated.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Cost functions to tune against, one search each.
    #[serde(default = "default_cost_functions")]
    pub cost_functions: Vec<CostFunction>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            optimizer: DifferentialEvolutionOptions::default(),
            simulation: SimulationConfig::default(),
            cost_functions: default_cost_functions(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load(config_path: Option<&Path>) -> TuneResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Config::default()
                }
            }
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Parse a YAML file. Missing sections take their defaults.
    pub fn from_file(path: &Path) -> TuneResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a YAML document. Missing sections take their defaults.
    pub fn from_yaml(content: &str) -> TuneResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> TuneResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Apply `TOFFOLI_TUNE_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> TuneResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = parse_var(&lookup, "TOFFOLI_TUNE_SEED")? {
            self.optimizer.seed = Some(seed);
            self.simulation.seed = Some(seed);
        }
        if let Some(n) = parse_var(&lookup, "TOFFOLI_TUNE_MAX_ITERATIONS")? {
            self.optimizer.max_iterations = n;
        }
        if let Some(n) = parse_var(&lookup, "TOFFOLI_TUNE_POPSIZE")? {
            self.optimizer.popsize = n;
        }
        if let Some(shots) = parse_var(&lookup, "TOFFOLI_TUNE_SHOTS")? {
            self.simulation.shots = Some(shots);
        }
        if let Some(level) = lookup("TOFFOLI_TUNE_LOG_LEVEL") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> TuneResult<()> {
        self.optimizer.validate()?;
        if self.simulation.shots == Some(0) {
            return Err(TuneError::Config("shots cannot be 0".into()));
        }
        if self.cost_functions.is_empty() {
            return Err(TuneError::Config("no cost functions configured".into()));
        }
        Ok(())
    }
}

/// Simulation settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Sample this many shots per input instead of using exact probabilities.
    #[serde(default)]
    pub shots: Option<u32>,

    /// Seed for shot sampling.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// The simulation mode these settings describe.
    pub fn mode(&self) -> SimulationMode {
        match self.shots {
            Some(shots) => SimulationMode::Shots {
                shots,
                seed: self.seed,
            },
            None => SimulationMode::Exact,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_cost_functions() -> Vec<CostFunction> {
    vec![
        CostFunction::TraceNorm,
        CostFunction::Frobenius,
        CostFunction::CountComparison,
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn parse_var<F, T>(lookup: &F, key: &str) -> TuneResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .map(|val| {
            val.trim()
                .parse()
                .map_err(|_| TuneError::Config(format!("cannot parse {}={:?}", key, val)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.optimizer.max_iterations, 1000);
        assert_eq!(config.optimizer.popsize, 15);
        assert_eq!(config.simulation.mode(), SimulationMode::Exact);
        assert_eq!(config.cost_functions.len(), 3);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
optimizer:
  max_iterations: 50
  seed: 3
simulation:
  shots: 1024
cost_functions: [trace_overlap, frobenius_norm]
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.optimizer.max_iterations, 50);
        assert_eq!(config.optimizer.popsize, 15);
        assert_eq!(config.optimizer.seed, Some(3));
        assert_eq!(
            config.cost_functions,
            vec![CostFunction::TraceOverlap, CostFunction::Frobenius]
        );
        assert_eq!(
            config.simulation.mode(),
            SimulationMode::Shots {
                shots: 1024,
                seed: None
            }
        );
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = Config::default();
        let back = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_unknown_cost_function() {
        assert!(Config::from_yaml("cost_functions: [fidelity]").is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TOFFOLI_TUNE_SEED", "42"),
            ("TOFFOLI_TUNE_MAX_ITERATIONS", "10"),
            ("TOFFOLI_TUNE_SHOTS", "100"),
            ("TOFFOLI_TUNE_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config
            .apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.optimizer.seed, Some(42));
        assert_eq!(config.optimizer.max_iterations, 10);
        assert_eq!(config.optimizer.popsize, 15);
        assert_eq!(
            config.simulation.mode(),
            SimulationMode::Shots {
                shots: 100,
                seed: Some(42)
            }
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_bad_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(|k| {
            (k == "TOFFOLI_TUNE_POPSIZE").then(|| "many".to_string())
        });
        assert!(matches!(result, Err(TuneError::Config(_))));
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        config.simulation.shots = Some(0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cost_functions.clear();
        assert!(config.validate().is_err());
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(format!("toffoli-tune-{}-{}.yaml", std::process::id(), name))
    }

    #[test]
    fn test_load_from_file() {
        let path = temp_path("load");
        std::fs::write(
            &path,
            "optimizer:\n  tol: 0.5\ncost_functions: [count_comparison]\n",
        )
        .unwrap();
        let config = Config::load(Some(path.as_path()));
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.optimizer.tol, 0.5);
        assert_eq!(config.cost_functions, vec![CostFunction::CountComparison]);
    }

    #[test]
    fn test_load_missing_file() {
        let path = temp_path("missing");
        assert!(matches!(Config::load(Some(path.as_path())), Err(TuneError::Io(_))));
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        // No toffoli-tune.yaml lives in the crate root.
        let config = Config::load(None).unwrap();
        assert_eq!(config.cost_functions, default_cost_functions());
        assert_eq!(config.optimizer.tol, 0.01);
    }
}
