pub mod assemble;
pub mod focus;
pub mod form;
pub mod present;
pub mod schedule;
pub mod services;
pub mod view_state;

pub use assemble::{assemble, AssembleError};
pub use form::{DetailField, EventForm};
pub use schedule::{ScheduleEditor, ScheduleEntry, ScheduleField};
pub use services::{ItemField, ServiceCategory, ServiceEditor};
pub use view_state::{CellRef, ViewState};
