use crate::calc::civil_time::to_civil_date;
use crate::data::{AppSettings, EventData, Persistable, VenueData};
use anyhow::Result;

pub fn run() -> Result<()> {
    let settings = AppSettings::load()?;
    let event_data = EventData::load()?;
    let venue_data = VenueData::load()?;
    write_events(&event_data, &venue_data, &settings, &mut std::io::stdout())
}

/// One line per event, dated in its venue's timezone.
pub(crate) fn write_events<W: std::io::Write>(
    data: &EventData,
    venues: &VenueData,
    settings: &AppSettings,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "Events")?;
    writeln!(out, "---")?;
    writeln!(
        out,
        "  {:<24} {:<12} {:<10} {}",
        "Slug", "Date", "Services", "Title"
    )?;
    for e in &data.events {
        let venue_tz = venues.find(&e.venue_id).map(|v| v.timezone.as_str());
        let tz = settings.timezone_for(venue_tz);
        writeln!(
            out,
            "  {:<24} {:<12} {:<10} {}",
            e.slug,
            to_civil_date(e.date, tz),
            e.music_list.len(),
            e.title
        )?;
    }
    writeln!(out, "---")?;
    writeln!(out, "Total: {} event(s)", data.events.len())?;
    Ok(())
}
