pub mod address;
pub mod event;
pub mod fields;
pub mod ids;
pub mod page;
pub mod schedule;

pub use address::{Address, Location, DEFAULT_COUNTRY};
pub use event::{CoverImage, EventPayload, EventRecord};
pub use fields::{Extracted, ExtractedFields, RawDate, RawTimeRange, VenueReference};
pub use page::RawPage;
pub use schedule::TimeWindow;
