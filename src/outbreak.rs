//! The outbreak engine: drives one simulation run over a strict per-period timeline.
//!
//! An [`Outbreak`] owns its society, strain set, population and recorder for the duration of
//! the run. Each period fully completes (time advance, outbreak management, attack round,
//! recording) before the next begins; isolation decisions taken during a period are visible
//! to that same period's attack step. There is no internal concurrency and no mid-run
//! cancellation: a run either completes all its periods or the engine is discarded.

use crate::disease::StrainSet;
use crate::error::OutbreakError;
use crate::log::warn;
use crate::population::Population;
use crate::recorder::{Component, OutbreakRecorder, StepSnapshot};
use crate::society::Society;

/// Sizing of one run. All-zero parameters are valid and produce an empty-story run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutbreakParams {
    /// Expected population size; 0 accepts any adopted population.
    pub pop_size: usize,
    /// Number of initial infections to seed.
    pub seed_size: usize,
    /// Simulated days to run.
    pub n_days: u32,
}

pub struct Outbreak<S, P> {
    society: S,
    strains: StrainSet,
    population: P,
    recorder: OutbreakRecorder<S, P>,
    n_periods: u32,
    time_increment: f64,
    time: f64,
    step_num: u32,
    group_size: usize,
}

impl<S, P> Outbreak<S, P>
where
    S: Society<P> + 'static,
    P: Population<S> + 'static,
{
    /// Builds a fresh population of `params.pop_size` members through `factory` and prepares
    /// a run. Callers without a custom factory pass their population type's own constructor.
    ///
    /// # Errors
    ///
    /// Returns an `OutbreakError` if the society defines no episodes per day.
    pub fn build<F>(
        society: S,
        strains: impl Into<StrainSet>,
        params: OutbreakParams,
        factory: F,
    ) -> Result<Self, OutbreakError>
    where
        F: FnOnce(usize, &S) -> P,
    {
        let population = factory(params.pop_size, &society);
        Self::finish_setup(society, strains.into(), params, population)
    }

    /// Adopts a pre-existing population and prepares a run. The population must have
    /// `params.pop_size` members (unless `pop_size` is 0) and, when a `member_check` is
    /// given, every member must satisfy it. The adopted population is reset against the new
    /// society before use.
    ///
    /// # Errors
    ///
    /// Returns `OutbreakError::PopulationMismatch` if the size or member checks fail; both
    /// run before the society or population is touched.
    pub fn with_population(
        society: S,
        strains: impl Into<StrainSet>,
        params: OutbreakParams,
        mut population: P,
        member_check: Option<fn(&P::Member) -> bool>,
    ) -> Result<Self, OutbreakError> {
        let n_people = population.people().len();
        if params.pop_size != 0 && n_people != params.pop_size {
            return Err(OutbreakError::PopulationMismatch(format!(
                "expected a population of {} people, found {n_people}",
                params.pop_size
            )));
        }
        if let Some(check) = member_check {
            if !population.people().iter().all(check) {
                return Err(OutbreakError::PopulationMismatch(
                    "a member of this population failed the member check".to_string(),
                ));
            }
        }
        warn!("using a pre-existing population - does it have the right network structure?");
        population.reset_people(&society);
        Self::finish_setup(society, strains.into(), params, population)
    }

    fn finish_setup(
        mut society: S,
        strains: StrainSet,
        params: OutbreakParams,
        mut population: P,
    ) -> Result<Self, OutbreakError> {
        let episodes_per_day = society.episodes_per_day();
        if episodes_per_day == 0 {
            return Err(OutbreakError::from(
                "society must define at least one episode per day",
            ));
        }

        // Clean slate before seeding.
        society.clear_queues();
        population.seed_infections(params.seed_size, &strains);

        let group_size = society.encounter_size();
        Ok(Outbreak {
            society,
            strains,
            population,
            recorder: OutbreakRecorder::new(),
            n_periods: params.n_days * episodes_per_day,
            time_increment: 1.0 / f64::from(episodes_per_day),
            time: 0.0,
            step_num: 0,
            group_size,
        })
    }

    /// Attaches an additional observer to the recorder before the run.
    pub fn add_component(&mut self, component: Box<dyn Component<S, P>>) {
        self.recorder.add_component(component);
    }

    /// Runs exactly `n_periods` strictly sequential periods, then finalizes the recorder
    /// with the realized R0 and configuration snapshots.
    pub fn simulate(&mut self) -> &OutbreakRecorder<S, P> {
        for _ in 0..self.n_periods {
            self.update_time();
            self.society.manage_outbreak(&mut self.population);
            self.population.attack_in_groupings(self.group_size);
            self.record_state();
        }

        self.recorder.finalize(
            self.population.realized_r0(),
            self.society.config().clone(),
            &self.strains,
        );
        &self.recorder
    }

    fn update_time(&mut self) {
        self.population.update_time();
        self.time += self.time_increment;
        self.step_num += 1;
    }

    fn record_state(&mut self) {
        let snapshot = StepSnapshot {
            time: self.time,
            step_num: self.step_num,
            n_periods: self.n_periods,
            time_increment: self.time_increment,
            society: &self.society,
            population: &self.population,
        };
        self.recorder.record_step(&snapshot);
    }

    #[must_use]
    pub fn recorder(&self) -> &OutbreakRecorder<S, P> {
        &self.recorder
    }

    #[must_use]
    pub fn into_recorder(self) -> OutbreakRecorder<S, P> {
        self.recorder
    }

    #[must_use]
    pub fn population(&self) -> &P {
        &self.population
    }

    #[must_use]
    pub fn society(&self) -> &S {
        &self.society
    }

    #[must_use]
    pub fn strains(&self) -> &StrainSet {
        &self.strains
    }

    #[must_use]
    pub fn n_periods(&self) -> u32 {
        self.n_periods
    }

    /// Simulated days per period.
    #[must_use]
    pub fn time_increment(&self) -> f64 {
        self.time_increment
    }

    /// Elapsed simulated time, in days.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[must_use]
    pub fn step_num(&self) -> u32 {
        self.step_num
    }

    #[must_use]
    pub fn group_size(&self) -> usize {
        self.group_size
    }
}
