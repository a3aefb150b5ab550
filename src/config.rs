use std::env;
use std::path::{Path, PathBuf};

use crate::algorithm::Algorithm;
use crate::packer::PackerConfig;
use crate::service::SolverSettings;

/// Complete application configuration, loaded from environment variables or default values.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub solver: SolverConfig,
}

impl AppConfig {
    /// Creates a configuration from the currently available environment variables.
    pub fn from_env() -> Self {
        Self {
            store: StoreConfig::from_env(),
            solver: SolverConfig::from_env(),
        }
    }
}

/// Configuration for the manifest store backing the batch binary.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    path: PathBuf,
}

impl StoreConfig {
    const DEFAULT_PATH: &'static str = "manifest-store.json";
    const PATH_VAR: &'static str = "STOW_IT_NOW_STORE_PATH";

    fn from_env() -> Self {
        let path = env_string(Self::PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_PATH));
        Self { path }
    }

    /// Location of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Configuration for the packing solver.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    settings: SolverSettings,
}

impl SolverConfig {
    const NO_IMPROVE_VAR: &'static str = "STOW_IT_NOW_SOLVER_NO_IMPROVE_PERMUTATIONS";
    const ALGORITHMS_VAR: &'static str = "STOW_IT_NOW_SOLVER_ALGORITHMS";
    const GENERAL_EPSILON_VAR: &'static str = "STOW_IT_NOW_PACKING_GENERAL_EPSILON";
    const MIN_SPACE_DIM_VAR: &'static str = "STOW_IT_NOW_PACKING_MIN_SPACE_DIM";

    fn from_env() -> Self {
        let defaults = SolverSettings::default();

        let no_improve_permutations = load_u32_with_warning(
            Self::NO_IMPROVE_VAR,
            defaults.no_improve_permutations,
            |value| value > 0,
            "must be greater than 0",
            "Warning: Adjusted permutation cutoff changes how long the solver searches",
        );

        let general_epsilon = load_f64_with_warning(
            Self::GENERAL_EPSILON_VAR,
            PackerConfig::DEFAULT_GENERAL_EPSILON,
            |value| value > 0.0,
            "must be greater than 0",
            "Warning: Adjusted tolerances may cause numerical instabilities",
        );

        let min_space_dim = load_f64_with_warning(
            Self::MIN_SPACE_DIM_VAR,
            PackerConfig::DEFAULT_MIN_SPACE_DIM,
            |value| value > 0.0,
            "must be greater than 0",
            "Warning: Adjusted free-space threshold may change packing density",
        );

        let algorithms = match env_string(Self::ALGORITHMS_VAR) {
            Some(raw) => parse_algorithm_list(&raw, Self::ALGORITHMS_VAR),
            None => defaults.algorithms,
        };

        let packer = PackerConfig::builder()
            .general_epsilon(general_epsilon)
            .min_space_dim(min_space_dim)
            .build();

        Self {
            settings: SolverSettings {
                algorithms,
                no_improve_permutations,
                packer,
            },
        }
    }

    /// Returns the configured solver settings.
    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            eprintln!(
                "⚠️ Access to {} failed: {}. Using default value.",
                name, err
            );
            None
        }
    }
}

/// Parses a comma-separated list of algorithm type ids.
///
/// Unknown ids are skipped with a warning; an entirely invalid list falls
/// back to the default algorithm.
fn parse_algorithm_list(raw: &str, var_name: &str) -> Vec<Algorithm> {
    let mut algorithms: Vec<Algorithm> = Vec::new();

    for part in raw.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }

        match trimmed
            .parse::<u32>()
            .ok()
            .and_then(|id| Algorithm::from_id(id).ok())
        {
            Some(algorithm) => {
                if !algorithms.contains(&algorithm) {
                    algorithms.push(algorithm);
                }
            }
            None => {
                eprintln!(
                    "⚠️ {} contains unknown algorithm id '{}'. Ignoring it.",
                    var_name, trimmed
                );
            }
        }
    }

    if algorithms.is_empty() {
        eprintln!(
            "⚠️ {} did not contain any valid algorithm ids. Using default.",
            var_name
        );
        SolverSettings::default().algorithms
    } else {
        algorithms
    }
}

fn load_f64_with_warning(
    var_name: &str,
    default: f64,
    validator: impl Fn(f64) -> bool,
    invalid_hint: &str,
    warning: &str,
) -> f64 {
    match env_string(var_name) {
        Some(raw) => match raw.parse::<f64>() {
            Ok(value) => {
                if !validator(value) {
                    eprintln!(
                        "⚠️ {} contains invalid value '{}': {}. Using {}.",
                        var_name, raw, invalid_hint, default
                    );
                    default
                } else {
                    let tolerance = (default.abs().max(1.0)) * 1e-9;
                    if (value - default).abs() > tolerance {
                        println!("⚠️ {} ({} = {}).", warning, var_name, value);
                    }
                    value
                }
            }
            Err(err) => {
                eprintln!(
                    "⚠️ Could not parse {} ('{}') as number: {}. Using {}.",
                    var_name, raw, err, default
                );
                default
            }
        },
        None => default,
    }
}

fn load_u32_with_warning(
    var_name: &str,
    default: u32,
    validator: impl Fn(u32) -> bool,
    invalid_hint: &str,
    warning: &str,
) -> u32 {
    match env_string(var_name) {
        Some(raw) => match raw.parse::<u32>() {
            Ok(value) => {
                if !validator(value) {
                    eprintln!(
                        "⚠️ {} contains invalid value '{}': {}. Using {}.",
                        var_name, raw, invalid_hint, default
                    );
                    default
                } else {
                    if value != default {
                        println!("⚠️ {} ({} = {}).", warning, var_name, value);
                    }
                    value
                }
            }
            Err(err) => {
                eprintln!(
                    "⚠️ Could not parse {} ('{}') as number: {}. Using {}.",
                    var_name, raw, err, default
                );
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_algorithm_list_valid_ids() {
        let algorithms = parse_algorithm_list("1,2", "TEST_VAR");
        assert_eq!(
            algorithms,
            vec![
                Algorithm::DecompositionVolumeFirst,
                Algorithm::DecompositionWeightFirst,
            ]
        );

        // Whitespace and duplicates are tolerated.
        let algorithms = parse_algorithm_list(" 2 , 2 ,1 ", "TEST_VAR");
        assert_eq!(
            algorithms,
            vec![
                Algorithm::DecompositionWeightFirst,
                Algorithm::DecompositionVolumeFirst,
            ]
        );
    }

    #[test]
    fn test_parse_algorithm_list_skips_unknown_ids() {
        let algorithms = parse_algorithm_list("1,99", "TEST_VAR");
        assert_eq!(algorithms, vec![Algorithm::DecompositionVolumeFirst]);
    }

    #[test]
    fn test_parse_algorithm_list_falls_back_to_default() {
        let algorithms = parse_algorithm_list("99,abc", "TEST_VAR");
        assert_eq!(algorithms, SolverSettings::default().algorithms);

        let algorithms = parse_algorithm_list("", "TEST_VAR");
        assert_eq!(algorithms, SolverSettings::default().algorithms);
    }

    #[test]
    fn test_default_solver_settings() {
        let defaults = SolverSettings::default();
        assert_eq!(defaults.no_improve_permutations, 15);
        assert_eq!(
            defaults.algorithms,
            vec![Algorithm::DecompositionVolumeFirst]
        );
    }
}
