//! The disease parameterization model: age-based severity curves and per-strain parameters.
//!
//! The free functions are pure. [`Strain`] is an immutable parameter set; its construction
//! resolves the transmission probability exactly once and derives the symptomatic duration from
//! the infectious period, so downstream code never re-inspects the configuration.

use std::collections::HashMap;
use std::fmt::{self, Display};

use serde_derive::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::OutbreakError;
use crate::log::info;

/// Relative mortality hazard by age bracket, normalized to the 50-60 bracket. A boundary age
/// falls into the lower bracket.
#[must_use]
pub fn hazard(age: f64) -> f64 {
    if age > 80.0 {
        38.29
    } else if age > 70.0 {
        8.63
    } else if age > 60.0 {
        2.79
    } else if age > 50.0 {
        1.00
    } else if age > 40.0 {
        0.28
    } else if age > 18.0 {
        0.05
    } else {
        0.0
    }
}

const HAZARD_TO_IFR: f64 = 0.004;

/// Probability that an infected individual of the given age dies.
#[must_use]
pub fn infection_fatality_ratio(age: f64) -> f64 {
    hazard(age) * HAZARD_TO_IFR
}

// Peak daily hospital admissions and peak daily deaths over the same winter wave
// (7-day smoothed). Their ratio converts a fatality rate into an admission rate.
const PEAK_DAILY_ADMISSIONS: f64 = 4232.0;
const PEAK_DAILY_DEATHS: f64 = 1283.0;

/// Probability that an infected individual of the given age is hospitalized.
#[must_use]
pub fn hospitalization_rate(age: f64) -> f64 {
    infection_fatality_ratio(age) * (PEAK_DAILY_ADMISSIONS / PEAK_DAILY_DEATHS)
}

/// A transmission-probability specification: either one scalar for every strain, or a
/// name-keyed mapping. Resolved to a scalar exactly once, at strain construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransmissionProb {
    Scalar(f64),
    PerStrain(HashMap<String, f64>),
}

impl TransmissionProb {
    /// Resolves this specification for the named strain.
    ///
    /// # Errors
    ///
    /// Returns `OutbreakError::UnknownStrainName` if a per-strain mapping has no entry for
    /// `name`.
    pub fn resolve(&self, name: &str) -> Result<f64, OutbreakError> {
        match self {
            TransmissionProb::Scalar(pr_transmission) => Ok(*pr_transmission),
            TransmissionProb::PerStrain(by_name) => by_name
                .get(name)
                .copied()
                .ok_or_else(|| OutbreakError::UnknownStrainName(name.to_string())),
        }
    }
}

impl From<f64> for TransmissionProb {
    fn from(pr_transmission: f64) -> Self {
        TransmissionProb::Scalar(pr_transmission)
    }
}

/// A strain of the disease, not a case of it: the immutable infectious-period and
/// transmissibility parameters shared by every infection with this variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Strain {
    name: String,
    days_infectious: f64,
    days_before_infectious: f64,
    days_to_symptoms: f64,
    days_of_symptoms: f64,
    prob_symptomatic: f64,
    pr_transmit_per_day: f64,
}

/// Optional overrides for [`Strain::derive`]. Fields left `None` fall back to the
/// configuration.
#[derive(Debug, Clone, Default)]
pub struct StrainOverrides {
    pub days_infectious: Option<f64>,
    pub transmission: Option<TransmissionProb>,
    pub name: Option<String>,
}

impl Strain {
    /// Constructs a strain with an explicit infectious period, transmission specification and
    /// name; symptom timing comes from the configuration.
    ///
    /// The symptomatic duration is always `days_infectious - days_to_symptoms` because
    /// infectiousness ends when symptoms end. If the configured canonical value disagrees, the
    /// derived value wins and a diagnostic is logged.
    ///
    /// # Errors
    ///
    /// Returns `OutbreakError::UnknownStrainName` if a per-strain transmission mapping has no
    /// entry for `name`.
    pub fn new(
        days_infectious: f64,
        transmission: &TransmissionProb,
        name: &str,
        config: &Config,
    ) -> Result<Strain, OutbreakError> {
        let pr_transmit_per_day = transmission.resolve(name)?;

        let days_to_symptoms = config.days_infectious_to_symptoms;
        // When you stop showing symptoms, you stop being infectious.
        let days_of_symptoms = days_infectious - days_to_symptoms;
        if (days_of_symptoms - config.days_of_symptoms).abs() > f64::EPSILON {
            info!(
                "setting days of symptoms to {} rather than {}",
                days_of_symptoms, config.days_of_symptoms
            );
        }

        Ok(Strain {
            name: name.to_string(),
            days_infectious,
            days_before_infectious: config.days_before_infectious,
            days_to_symptoms,
            days_of_symptoms,
            prob_symptomatic: config.prob_symptomatic,
            pr_transmit_per_day,
        })
    }

    /// Constructs the configuration's default strain.
    ///
    /// # Errors
    ///
    /// Returns an `OutbreakError` if the default transmission specification cannot be resolved.
    pub fn from_config(config: &Config) -> Result<Strain, OutbreakError> {
        Strain::derive(StrainOverrides::default(), config)
    }

    /// Derives a strain from the configuration, with any of the infectious period, transmission
    /// specification and name overridden.
    ///
    /// # Errors
    ///
    /// Returns `OutbreakError::UnknownStrainName` if a per-strain transmission mapping has no
    /// entry for the resolved name.
    pub fn derive(overrides: StrainOverrides, config: &Config) -> Result<Strain, OutbreakError> {
        let days_infectious = overrides
            .days_infectious
            .unwrap_or(config.days_infectious_to_symptoms + config.days_of_symptoms);
        let transmission = overrides.transmission.unwrap_or_else(|| {
            TransmissionProb::Scalar(config.prob_infect_if_together_on_a_day)
        });
        let name = overrides
            .name
            .unwrap_or_else(|| config.default_strain.clone());
        Strain::new(days_infectious, &transmission, &name, config)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total duration an infected individual can transmit, in days.
    #[must_use]
    pub fn days_infectious(&self) -> f64 {
        self.days_infectious
    }

    /// Incubation lag before transmission begins, in days.
    #[must_use]
    pub fn days_before_infectious(&self) -> f64 {
        self.days_before_infectious
    }

    /// Lag from the start of infectiousness to symptom onset, in days.
    #[must_use]
    pub fn days_to_symptoms(&self) -> f64 {
        self.days_to_symptoms
    }

    /// Symptomatic duration, always `days_infectious - days_to_symptoms`.
    #[must_use]
    pub fn days_of_symptoms(&self) -> f64 {
        self.days_of_symptoms
    }

    #[must_use]
    pub fn prob_symptomatic(&self) -> f64 {
        self.prob_symptomatic
    }

    /// Transmission probability per contact per day, resolved at construction.
    #[must_use]
    pub fn pr_transmit_per_day(&self) -> f64 {
        self.pr_transmit_per_day
    }
}

impl Display for Strain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One strain or a set of them, as supplied to the outbreak engine. The distinction survives
/// to finalization: a single strain yields a single configuration snapshot, a set yields a
/// list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StrainSet {
    Single(Strain),
    Many(Vec<Strain>),
}

impl StrainSet {
    #[must_use]
    pub fn as_slice(&self) -> &[Strain] {
        match self {
            StrainSet::Single(strain) => std::slice::from_ref(strain),
            StrainSet::Many(strains) => strains.as_slice(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Strain> {
        self.as_slice().iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl From<Strain> for StrainSet {
    fn from(strain: Strain) -> Self {
        StrainSet::Single(strain)
    }
}

impl From<Vec<Strain>> for StrainSet {
    fn from(strains: Vec<Strain>) -> Self {
        StrainSet::Many(strains)
    }
}
