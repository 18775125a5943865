use crate::data::{
    AppSettings, Event, EventData, MusicItem, MusicList, Persistable, ScheduleItem, Venue,
    VenueData,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

pub fn run() -> Result<()> {
    let dir = crate::data::persistence::get_data_dir()?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data directory {}", dir.display()))?;
    run_in_dir(&dir)?;
    tracing::info!(dir = %dir.display(), "data files initialized");
    println!("Data files initialized successfully.");
    Ok(())
}

/// Writes all default data files into `dir`. Exposed for unit testing.
pub(crate) fn run_in_dir(dir: &Path) -> Result<()> {
    write_config(dir)?;
    write_venues(dir)?;
    write_events(dir)?;
    Ok(())
}

fn write_config(dir: &Path) -> Result<()> {
    AppSettings::default().save_to(dir)
}

fn write_venues(dir: &Path) -> Result<()> {
    let mut data = VenueData::default();
    data.add(Venue::new("kings", "King's College Chapel", "Europe/London"));
    data.add(Venue::new("trinity", "Trinity Church Wall Street", "America/New_York"));
    data.save_to(dir)
}

fn write_events(dir: &Path) -> Result<()> {
    let mut data = EventData::default();
    data.add(evensong()?);
    data.add(carols()?);
    data.save_to(dir)
}

fn at(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("bad sample timestamp {s}"))?
        .with_timezone(&Utc))
}

fn evensong() -> Result<Event> {
    let mut music_list = MusicList::new();
    music_list.insert(
        "Evensong".to_string(),
        vec![
            MusicItem::new("Preces and Responses", "Smith", "Responses"),
            MusicItem::new("Psalm 121", "Walford Davies", "Psalm"),
            MusicItem::new("Magnificat in G", "Stanford", "Magnificat"),
            MusicItem::new("Nunc Dimittis in G", "Stanford", "Nunc Dimittis"),
            MusicItem::new("Beati quorum via", "Stanford", "Anthem"),
        ],
    );
    music_list.insert(
        "Eucharist".to_string(),
        vec![MusicItem::new("Missa Brevis", "Palestrina", "")],
    );
    Ok(Event {
        id: "1".to_string(),
        title: "Choral Evensong".to_string(),
        subtitle: "Trinity Sunday".to_string(),
        date: at("2025-06-14T23:00:00Z")?,
        end_date: at("2025-06-15T23:00:00Z")?,
        venue_id: "kings".to_string(),
        slug: "trinity-evensong".to_string(),
        description: "Sung by the visiting choir.".to_string(),
        schedule: vec![
            ScheduleItem {
                date: Some(at("2025-06-15T13:30:00Z")?),
                description: "Rehearsal".to_string(),
            },
            ScheduleItem {
                date: Some(at("2025-06-15T15:00:00Z")?),
                description: "Service".to_string(),
            },
        ],
        music_list,
    })
}

fn carols() -> Result<Event> {
    let mut music_list = MusicList::new();
    music_list.insert(
        "Carol Service".to_string(),
        vec![
            MusicItem::new("Once in Royal David's City", "Gauntlett", "Anthem"),
            MusicItem::new("In the Bleak Midwinter", "Darke", "Anthem"),
        ],
    );
    Ok(Event {
        id: "2".to_string(),
        title: "Advent Carols".to_string(),
        subtitle: String::new(),
        date: at("2025-11-30T05:00:00Z")?,
        end_date: at("2025-11-30T05:00:00Z")?,
        venue_id: "trinity".to_string(),
        slug: "advent-carols".to_string(),
        description: String::new(),
        schedule: vec![ScheduleItem {
            date: Some(at("2025-11-30T21:00:00Z")?),
            description: "Service".to_string(),
        }],
        music_list,
    })
}
