use crate::data::persistence::get_data_dir;
use crate::data::{AppSettings, DirEventSink, DirVenueSource, EventData, Persistable, VenueSource};
use crate::editor::EventForm;
use crate::ui::edit_view::{run_app, App};
use crate::ui::{restore_terminal, setup_terminal};
use anyhow::{Context, Result};
use chrono_tz::Tz;
use std::sync::Arc;

pub fn run(slug: &str, token: &str) -> Result<()> {
    let settings = AppSettings::load()?;
    let event_data = EventData::load()?;
    let event = event_data
        .find(slug)
        .with_context(|| format!("no event with slug '{slug}'"))?;

    let data_dir = get_data_dir()?;
    let venue_source = DirVenueSource::new(data_dir.clone());
    let tz = editor_timezone(&settings, &venue_source, &event.venue_id);
    tracing::info!(slug, %tz, "opening editor");

    let form = EventForm::from_event(event, tz);
    let sink = Arc::new(DirEventSink::new(data_dir));
    let mut app = App::new(form, &venue_source, sink, token.to_string());

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = crossterm::terminal::disable_raw_mode();
        let _ = crossterm::execute!(
            std::io::stdout(),
            crossterm::terminal::LeaveAlternateScreen
        );
        original_hook(info);
    }));

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result?;

    if app.submitted() {
        println!("Event '{slug}' updated.");
    }
    Ok(())
}

/// The event's venue timezone if it can be found, else the configured default.
/// A venue list that fails to load is reported by the editor itself.
pub(crate) fn editor_timezone(
    settings: &AppSettings,
    venues: &dyn VenueSource,
    venue_id: &str,
) -> Tz {
    let venue_tz = venues
        .list_venues()
        .ok()
        .and_then(|list| list.into_iter().find(|v| v.id == venue_id))
        .map(|v| v.timezone);
    settings.timezone_for(venue_tz.as_deref())
}
