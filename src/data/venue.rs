use crate::data::persistence::Persistable;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Venue {
    pub id: String,
    pub name: String,
    /// IANA timezone name, e.g. `Europe/London`.
    pub timezone: String,
}

impl Venue {
    pub fn new(id: &str, name: &str, timezone: &str) -> Self {
        Venue {
            id: id.to_string(),
            name: name.to_string(),
            timezone: timezone.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Default, Debug)]
pub struct VenueData {
    pub venues: Vec<Venue>,
}

impl Persistable for VenueData {
    fn filename() -> &'static str {
        "venues.yaml"
    }
    fn is_json() -> bool {
        false
    }
}

impl VenueData {
    pub fn add(&mut self, venue: Venue) {
        self.venues.push(venue);
    }

    pub fn find(&self, id: &str) -> Option<&Venue> {
        self.venues.iter().find(|v| v.id == id)
    }
}

/// Where the editor gets its venue list from.
pub trait VenueSource {
    fn list_venues(&self) -> Result<Vec<Venue>>;
}

/// Reads `venues.yaml` from a data directory.
pub struct DirVenueSource {
    dir: PathBuf,
}

impl DirVenueSource {
    pub fn new(dir: PathBuf) -> Self {
        DirVenueSource { dir }
    }
}

impl VenueSource for DirVenueSource {
    fn list_venues(&self) -> Result<Vec<Venue>> {
        Ok(VenueData::load_from(&self.dir)?.venues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_venue_by_id() {
        let mut data = VenueData::default();
        data.add(Venue::new("kings", "King's College Chapel", "Europe/London"));
        data.add(Venue::new("trinity", "Trinity Wall Street", "America/New_York"));
        assert_eq!(data.find("trinity").unwrap().timezone, "America/New_York");
        assert!(data.find("nowhere").is_none());
    }

    #[test]
    fn test_dir_source_lists_saved_venues() {
        let tmp = TempDir::new().unwrap();
        let mut data = VenueData::default();
        data.add(Venue::new("kings", "King's College Chapel", "Europe/London"));
        data.save_to(tmp.path()).unwrap();

        let venues = DirVenueSource::new(tmp.path().to_path_buf())
            .list_venues()
            .unwrap();
        assert_eq!(venues.len(), 1);
        assert_eq!(venues[0].name, "King's College Chapel");
    }

    #[test]
    fn test_dir_source_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let venues = DirVenueSource::new(tmp.path().to_path_buf())
            .list_venues()
            .unwrap();
        assert!(venues.is_empty());
    }

    #[test]
    fn test_dir_source_reports_corrupt_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("venues.yaml"), "venues: [unterminated").unwrap();
        assert!(DirVenueSource::new(tmp.path().to_path_buf())
            .list_venues()
            .is_err());
    }
}
