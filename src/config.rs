//! Named parameter sets injected into strain and outbreak construction.
//!
//! A [`Config`] carries the documented defaults for strain timing and transmission parameters.
//! It is passed explicitly, by reference, wherever defaults are resolved; nothing in the crate
//! reads configuration through a global.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::error::OutbreakError;

/// Name given to strains constructed without an explicit one.
pub const DEFAULT_STRAIN_NAME: &str = "wild-type";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Incubation lag before an infected person can transmit, in days.
    pub days_before_infectious: f64,
    /// Lag from the start of infectiousness to symptom onset, in days.
    pub days_infectious_to_symptoms: f64,
    /// Canonical symptomatic duration, in days. Strain derivation recomputes this from the
    /// infectious period and overrides it when the two disagree.
    pub days_of_symptoms: f64,
    /// Probability of transmission per contact per day.
    pub prob_infect_if_together_on_a_day: f64,
    /// Probability an infected person ever develops symptoms.
    pub prob_symptomatic: f64,
    /// Default strain name.
    pub default_strain: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            days_before_infectious: 2.0,
            days_infectious_to_symptoms: 3.0,
            days_of_symptoms: 7.0,
            prob_infect_if_together_on_a_day: 0.025,
            prob_symptomatic: 0.6,
            default_strain: DEFAULT_STRAIN_NAME.to_string(),
        }
    }
}

impl Config {
    /// Loads a configuration from a JSON file. Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns an `OutbreakError` if the file cannot be opened or parsed.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Config, OutbreakError> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }
}
