pub mod consumption;
pub mod device_data;
pub mod meta;
pub mod period;

pub use consumption::{ConsumptionPoint, ConsumptionSummary, PeriodComparison};
pub use device_data::{DeviceData, Series, SeriesField};
pub use meta::{MetaKey, MetaRecord, Namespace};
pub use period::{EntityId, PeriodKind};
