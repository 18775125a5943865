use crate::data::{Persistable, VenueData};
use anyhow::Result;

pub fn run() -> Result<()> {
    let venue_data = VenueData::load()?;
    write_venues(&venue_data, &mut std::io::stdout())
}

pub(crate) fn write_venues<W: std::io::Write>(data: &VenueData, out: &mut W) -> Result<()> {
    writeln!(out, "Venues")?;
    writeln!(out, "---")?;
    writeln!(out, "  {:<12} {:<32} {}", "Id", "Name", "Timezone")?;
    for v in &data.venues {
        writeln!(out, "  {:<12} {:<32} {}", v.id, v.name, v.timezone)?;
    }
    writeln!(out, "---")?;
    writeln!(out, "Total: {} venue(s)", data.venues.len())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Venue;

    fn make_data(venues: Vec<Venue>) -> VenueData {
        VenueData { venues }
    }

    #[test]
    fn test_write_venues_empty() {
        let data = make_data(vec![]);
        let mut buf = Vec::new();
        write_venues(&data, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("Total: 0 venue(s)"));
    }

    #[test]
    fn test_write_venues_lists_timezones() {
        let data = make_data(vec![
            Venue::new("kings", "King's College Chapel", "Europe/London"),
            Venue::new("trinity", "Trinity Church Wall Street", "America/New_York"),
        ]);
        let mut buf = Vec::new();
        write_venues(&data, &mut buf).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("King's College Chapel"));
        assert!(out.contains("America/New_York"));
        assert!(out.contains("Total: 2 venue(s)"));
    }
}
