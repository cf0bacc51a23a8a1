pub use crate::config::Config;
pub use crate::disease::{
    hazard, hospitalization_rate, infection_fatality_ratio, Strain, StrainOverrides, StrainSet,
    TransmissionProb,
};
pub use crate::error::OutbreakError;
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::outbreak::{Outbreak, OutbreakParams};
pub use crate::population::{Person, Population};
pub use crate::recorder::{
    Component, MainComponent, MetricRecord, MetricsTable, OutbreakRecorder, StepSnapshot,
    StrainSnapshot, VariantComponent, VariantRecord,
};
pub use crate::society::{Society, Test, TestQueue};
