pub mod app_settings;
pub mod event;
pub mod gateway;
pub mod persistence;
pub mod venue;

pub use app_settings::AppSettings;
pub use event::{Event, EventData, MusicItem, MusicList, ScheduleItem};
pub use gateway::{DirEventSink, EventSink, GatewayResponse, SubmitError};
pub use persistence::Persistable;
pub use venue::{DirVenueSource, Venue, VenueData, VenueSource};
