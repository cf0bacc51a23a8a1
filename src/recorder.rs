//! The recorder: pluggable observers over per-period simulation snapshots.
//!
//! An [`OutbreakRecorder`] always carries exactly one [`MainComponent`]; further components
//! ([`VariantComponent`], visualization observers, ...) can be attached before the run. Each
//! component keeps its own append-only story of derived metrics, one record per completed
//! period. After the run, the main story can be assembled into a labeled, time-indexed
//! [`MetricsTable`]; rendering beyond CSV is an external presentation concern.

use std::any::Any;
use std::collections::BTreeSet;
use std::io::Write;

use serde_derive::Serialize;

use crate::config::Config;
use crate::disease::{Strain, StrainSet};
use crate::error::OutbreakError;
use crate::log::info;
use crate::population::{Person, Population};
use crate::society::{Society, TestQueue};

/// Borrowed view of the engine, population and society state after one completed period.
pub struct StepSnapshot<'a, S, P> {
    /// Elapsed simulated time, in days.
    pub time: f64,
    /// Periods completed so far, starting at 1 for the first record.
    pub step_num: u32,
    /// Total periods in the run.
    pub n_periods: u32,
    /// Simulated days per period.
    pub time_increment: f64,
    pub society: &'a S,
    pub population: &'a P,
}

/// A metric observer. Components consume one snapshot per period and update their own
/// internal story; they never mutate the simulation.
pub trait Component<S, P>: Any {
    fn update(&mut self, snapshot: &StepSnapshot<S, P>);
}

/// One period's aggregate metrics. All fields except `time` and `tested_daily` are fractions
/// of the population in `[0, 1]`; `tested_daily` is a per-day rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricRecord {
    /// Days of epidemic.
    pub time: f64,
    /// Fraction of the population ever infected.
    pub ever_infected: f64,
    /// Fraction currently infectious.
    pub infectious: f64,
    /// Completed tests per capita, normalized to a per-day rate.
    pub tested_daily: f64,
    /// Fraction with a swab taken, awaiting results.
    pub awaiting_results: f64,
    /// Fraction currently isolating.
    pub isolating: f64,
}

/// The aggregate prevalence/testing/isolation observer. Always present on a recorder.
#[derive(Debug, Default)]
pub struct MainComponent {
    story: Vec<MetricRecord>,
}

impl MainComponent {
    /// The append-only story, one record per completed period, indexed by period.
    #[must_use]
    pub fn story(&self) -> &[MetricRecord] {
        &self.story
    }
}

impl<S, P> Component<S, P> for MainComponent
where
    S: Society<P> + 'static,
    P: Population<S> + 'static,
{
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn update(&mut self, snapshot: &StepSnapshot<S, P>) {
        let people = snapshot.population.people();
        let record = if people.is_empty() {
            // An empty population has nothing to count; record zeros rather than NaNs.
            MetricRecord {
                time: snapshot.time,
                ever_infected: 0.0,
                infectious: 0.0,
                tested_daily: 0.0,
                awaiting_results: 0.0,
                isolating: 0.0,
            }
        } else {
            let n = people.len() as f64;
            let queues = snapshot.society.queues();
            let completed: usize = queues.iter().map(|q| q.completed_tests().len()).sum();
            let awaiting: usize = queues
                .iter()
                .map(|q| q.pending_tests().iter().filter(|t| t.swab_taken).count())
                .sum();
            let isolating = people.iter().filter(|p| p.is_isolating()).count();

            MetricRecord {
                time: snapshot.time,
                ever_infected: snapshot.population.count_infected(None) as f64 / n,
                infectious: snapshot.population.count_infectious(None) as f64 / n,
                tested_daily: completed as f64 / n / snapshot.time_increment,
                awaiting_results: awaiting as f64 / n,
                isolating: isolating as f64 / n,
            }
        };
        self.story.push(record);

        // Clamp so a zero-episode society cannot make the stride a zero divisor.
        let progress_stride = (50 * snapshot.society.episodes_per_day()).max(1);
        if snapshot.step_num % progress_stride == 1 || snapshot.step_num == snapshot.n_periods {
            info!(
                "day {}, prop infected is {:.2}, prop infectious is {:.4}",
                record.time as u64, record.ever_infected, record.infectious
            );
        }
    }
}

/// One period's per-strain breakdown. `infected` and `infectious` are parallel to `variants`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantRecord {
    pub time: f64,
    /// Sorted union of every person's historical strain-exposure set.
    pub variants: Vec<String>,
    pub infected: Vec<usize>,
    pub infectious: Vec<usize>,
}

/// The per-strain observer, for multi-strain runs. Attach with
/// [`OutbreakRecorder::add_component`].
#[derive(Debug, Default)]
pub struct VariantComponent {
    story: Vec<VariantRecord>,
}

impl VariantComponent {
    #[must_use]
    pub fn story(&self) -> &[VariantRecord] {
        &self.story
    }
}

impl<S, P> Component<S, P> for VariantComponent
where
    S: Society<P> + 'static,
    P: Population<S> + 'static,
{
    fn update(&mut self, snapshot: &StepSnapshot<S, P>) {
        // A BTreeSet keeps the variant ordering stable from period to period.
        let variants: BTreeSet<&String> = snapshot
            .population
            .people()
            .iter()
            .flat_map(Person::strain_exposures)
            .collect();
        let variants: Vec<String> = variants.into_iter().cloned().collect();
        let infected = variants
            .iter()
            .map(|v| snapshot.population.count_infected(Some(v)))
            .collect();
        let infectious = variants
            .iter()
            .map(|v| snapshot.population.count_infectious(Some(v)))
            .collect();
        self.story.push(VariantRecord {
            time: snapshot.time,
            variants,
            infected,
            infectious,
        });
    }
}

/// Per-strain configuration snapshot taken at finalization: one snapshot for a single strain,
/// a list for a set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StrainSnapshot {
    Single(Strain),
    Many(Vec<Strain>),
}

impl From<&StrainSet> for StrainSnapshot {
    fn from(strains: &StrainSet) -> Self {
        match strains {
            StrainSet::Single(strain) => StrainSnapshot::Single(strain.clone()),
            StrainSet::Many(strains) => StrainSnapshot::Many(strains.clone()),
        }
    }
}

/// Fans per-period snapshots out to every attached component, in registration order, with the
/// main component always first. Ordering only matters to side-effecting observers; metric
/// correctness never depends on it.
pub struct OutbreakRecorder<S, P> {
    realized_r0: Option<f64>,
    society_config: Option<Config>,
    strain_configs: Option<StrainSnapshot>,
    main: MainComponent,
    extras: Vec<Box<dyn Component<S, P>>>,
}

impl<S, P> Default for OutbreakRecorder<S, P>
where
    S: Society<P> + 'static,
    P: Population<S> + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, P> OutbreakRecorder<S, P>
where
    S: Society<P> + 'static,
    P: Population<S> + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        OutbreakRecorder {
            realized_r0: None,
            society_config: None,
            strain_configs: None,
            main: MainComponent::default(),
            extras: Vec::new(),
        }
    }

    /// Attaches an additional observer after the main component.
    pub fn add_component(&mut self, component: Box<dyn Component<S, P>>) {
        self.extras.push(component);
    }

    /// Forwards the snapshot to every component in registration order.
    pub fn record_step(&mut self, snapshot: &StepSnapshot<S, P>) {
        self.main.update(snapshot);
        for component in &mut self.extras {
            component.update(snapshot);
        }
    }

    pub(crate) fn finalize(
        &mut self,
        realized_r0: f64,
        society_config: Config,
        strains: &StrainSet,
    ) {
        self.realized_r0 = Some(realized_r0);
        self.society_config = Some(society_config);
        self.strain_configs = Some(StrainSnapshot::from(strains));
    }

    /// Realized R0 of the run's early infections; `None` until the run completes.
    #[must_use]
    pub fn realized_r0(&self) -> Option<f64> {
        self.realized_r0
    }

    #[must_use]
    pub fn society_config(&self) -> Option<&Config> {
        self.society_config.as_ref()
    }

    #[must_use]
    pub fn strain_configs(&self) -> Option<&StrainSnapshot> {
        self.strain_configs.as_ref()
    }

    #[must_use]
    pub fn main_component(&self) -> &MainComponent {
        &self.main
    }

    /// Looks up an attached extra component by type.
    #[must_use]
    pub fn component<C: Component<S, P>>(&self) -> Option<&C> {
        self.extras.iter().find_map(|component| {
            let component: &dyn Any = component.as_ref();
            component.downcast_ref::<C>()
        })
    }

    /// Assembles the main story into a labeled, time-indexed table.
    #[must_use]
    pub fn metrics_table(&self) -> MetricsTable {
        MetricsTable {
            rows: self.main.story.clone(),
        }
    }

    /// Logs the run's headline numbers.
    pub fn log_summary(&self) {
        if let Some(realized_r0) = self.realized_r0 {
            info!("realized R0 of early infections is {realized_r0:.2}");
        }
        if let Some(last) = self.main.story.last() {
            info!(
                "{:.1} percent of the population was infected during the epidemic",
                last.ever_infected * 100.0
            );
        }
    }
}

/// Fixed column labels of the metrics table, index column first.
pub const METRIC_COLUMNS: [&str; 6] = [
    "days of epidemic",
    "ever infected",
    "infectious",
    "tested daily",
    "waiting for test results",
    "isolating",
];

/// The main story with its fixed column labels, indexed by days of epidemic.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsTable {
    rows: Vec<MetricRecord>,
}

impl MetricsTable {
    #[must_use]
    pub fn columns() -> &'static [&'static str] {
        &METRIC_COLUMNS
    }

    #[must_use]
    pub fn rows(&self) -> &[MetricRecord] {
        &self.rows
    }

    /// Writes the table as CSV, header first.
    ///
    /// # Errors
    ///
    /// Returns an `OutbreakError` if writing fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), OutbreakError> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(METRIC_COLUMNS)?;
        for row in &self.rows {
            writer.write_record(&[
                row.time.to_string(),
                row.ever_infected.to_string(),
                row.infectious.to_string(),
                row.tested_daily.to_string(),
                row.awaiting_results.to_string(),
                row.isolating.to_string(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}
