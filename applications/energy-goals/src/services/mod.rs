pub mod aggregator;
pub mod keyed_store;
pub mod meta_resolver;
pub mod multi_device;
pub mod validation;

pub use keyed_store::KeyedValueStore;
pub use meta_resolver::{GoalDefaults, GoalSource, MetaResolver, RemoteDefaults, ResolvedGoal};
pub use multi_device::combine;
pub use validation::{validate_device_data, DataIssue, ValidationReport};
