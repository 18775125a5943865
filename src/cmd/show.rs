use crate::calc::civil_time::{to_civil_date, to_civil_time};
use crate::data::{AppSettings, Event, EventData, Persistable, Venue, VenueData};
use anyhow::{Context, Result};
use chrono_tz::Tz;

pub fn run(slug: &str) -> Result<()> {
    let settings = AppSettings::load()?;
    let event_data = EventData::load()?;
    let venue_data = VenueData::load()?;
    let event = event_data
        .find(slug)
        .with_context(|| format!("no event with slug '{slug}'"))?;
    let venue = venue_data.find(&event.venue_id);
    let tz = settings.timezone_for(venue.map(|v| v.timezone.as_str()));
    write_event(event, venue, tz, &mut std::io::stdout())
}

pub(crate) fn write_event<W: std::io::Write>(
    event: &Event,
    venue: Option<&Venue>,
    tz: Tz,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "{}", event.title)?;
    if !event.subtitle.is_empty() {
        writeln!(out, "{}", event.subtitle)?;
    }
    writeln!(out, "---")?;
    writeln!(
        out,
        "  Dates:  {} to {}",
        to_civil_date(event.date, tz),
        to_civil_date(event.end_date, tz)
    )?;
    let venue_name = venue.map_or(event.venue_id.as_str(), |v| v.name.as_str());
    writeln!(out, "  Venue:  {venue_name} ({tz})")?;
    writeln!(out, "  Slug:   {}", event.slug)?;
    if !event.description.is_empty() {
        writeln!(out, "  {}", event.description)?;
    }

    writeln!(out, "Schedule")?;
    writeln!(out, "---")?;
    for item in &event.schedule {
        let (date, time) = match item.date {
            Some(at) => (to_civil_date(at, tz), to_civil_time(at, tz)),
            None => ("(no date)".to_string(), String::new()),
        };
        writeln!(out, "  {:<12} {:<6} {}", date, time, item.description)?;
    }

    writeln!(out, "Music")?;
    writeln!(out, "---")?;
    for (service, items) in &event.music_list {
        writeln!(out, "  {service}")?;
        for (i, item) in items.iter().enumerate() {
            writeln!(out, "    {}. {}", i + 1, item.display_line())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MusicItem, MusicList, ScheduleItem};
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn event() -> Event {
        let mut music_list = MusicList::new();
        music_list.insert(
            "Evensong".to_string(),
            vec![
                MusicItem::new("Magnificat in G", "Stanford", "Magnificat"),
                MusicItem::new("", "", ""),
            ],
        );
        Event {
            id: "1".to_string(),
            title: "Choral Evensong".to_string(),
            subtitle: String::new(),
            date: at("2025-06-14T23:00:00Z"),
            end_date: at("2025-06-14T23:00:00Z"),
            venue_id: "kings".to_string(),
            slug: "evensong".to_string(),
            description: String::new(),
            schedule: vec![
                ScheduleItem {
                    date: Some(at("2025-06-15T13:30:00Z")),
                    description: "Rehearsal".to_string(),
                },
                ScheduleItem {
                    date: None,
                    description: "Tea".to_string(),
                },
            ],
            music_list,
        }
    }

    fn render(venue: Option<&Venue>) -> String {
        let mut buf = Vec::new();
        write_event(&event(), venue, chrono_tz::Europe::London, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_write_event_local_times() {
        let out = render(None);
        assert!(out.contains("Dates:  2025-06-15 to 2025-06-15"));
        assert!(out.contains("14:30"));
        assert!(out.contains("(no date)"));
        assert!(out.contains("Tea"));
    }

    #[test]
    fn test_write_event_music_lines() {
        let out = render(None);
        assert!(out.contains("1. Magnificat in G by Stanford (Magnificat)"));
        assert!(out.contains("2. Untitled"));
    }

    #[test]
    fn test_write_event_venue_name() {
        let venue = Venue::new("kings", "King's College Chapel", "Europe/London");
        assert!(render(Some(&venue)).contains("Venue:  King's College Chapel (Europe/London)"));
        assert!(render(None).contains("Venue:  kings"));
    }
}
