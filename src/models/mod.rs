pub mod observation;
pub mod observer;

pub use observation::{Observation, ObservationRecord, PRECIPITATION_OCCURRED, UNSPECIFIED};
pub use observer::{month_key, ObserverSite, SiteRegions};
