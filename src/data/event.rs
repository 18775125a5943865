use crate::data::persistence::Persistable;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Service name → music performed in that service, in display order.
pub type MusicList = IndexMap<String, Vec<MusicItem>>;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct MusicItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub composer: String,
    /// Free text, usually one of the suggested music types.
    #[serde(default, rename = "type")]
    pub kind: String,
}

impl MusicItem {
    pub fn new(title: &str, composer: &str, kind: &str) -> Self {
        MusicItem {
            title: title.to_string(),
            composer: composer.to_string(),
            kind: kind.to_string(),
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// `Title by Composer (Type)`, omitting whatever is blank.
    pub fn display_line(&self) -> String {
        let mut line = if self.has_title() {
            self.title.clone()
        } else {
            "Untitled".to_string()
        };
        if !self.composer.trim().is_empty() {
            line.push_str(&format!(" by {}", self.composer));
        }
        if !self.kind.trim().is_empty() {
            line.push_str(&format!(" ({})", self.kind));
        }
        line
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ScheduleItem {
    /// `None` when the row was saved without a usable date.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub venue_id: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schedule: Vec<ScheduleItem>,
    #[serde(default)]
    pub music_list: MusicList,
}

#[derive(Serialize, Deserialize, Default, Debug)]
pub struct EventData {
    pub events: Vec<Event>,
}

impl Persistable for EventData {
    fn filename() -> &'static str {
        "events.json"
    }
    fn is_json() -> bool {
        true
    }
}

impl EventData {
    pub fn add(&mut self, event: Event) {
        self.events.push(event);
        self.events.sort_by(|a, b| a.date.cmp(&b.date));
    }

    pub fn find(&self, slug: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.slug == slug)
    }

    /// Replaces the event currently stored under `slug`. Returns false when
    /// no such event exists.
    pub fn replace(&mut self, slug: &str, event: Event) -> bool {
        match self.events.iter_mut().find(|e| e.slug == slug) {
            Some(slot) => {
                *slot = event;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn event(slug: &str, date: &str) -> Event {
        Event {
            id: format!("id-{slug}"),
            title: format!("Title {slug}"),
            subtitle: String::new(),
            date: at(date),
            end_date: at(date),
            venue_id: "v1".to_string(),
            slug: slug.to_string(),
            description: String::new(),
            schedule: Vec::new(),
            music_list: MusicList::new(),
        }
    }

    #[test]
    fn test_music_item_display_line() {
        assert_eq!(
            MusicItem::new("Magnificat in G", "Stanford", "Magnificat").display_line(),
            "Magnificat in G by Stanford (Magnificat)"
        );
        assert_eq!(MusicItem::new("", "", "").display_line(), "Untitled");
        assert_eq!(MusicItem::new("Psalm 23", "", "").display_line(), "Psalm 23");
    }

    #[test]
    fn test_music_item_type_key_in_json() {
        let json = serde_json::to_string(&MusicItem::new("A", "B", "Anthem")).unwrap();
        assert!(json.contains("\"type\":\"Anthem\""));
        let parsed: MusicItem = serde_json::from_str(r#"{"title":"Only title"}"#).unwrap();
        assert_eq!(parsed.composer, "");
        assert_eq!(parsed.kind, "");
    }

    #[test]
    fn test_event_json_uses_camel_case() {
        let json = serde_json::to_string(&event("e1", "2025-06-01T18:00:00Z")).unwrap();
        assert!(json.contains("\"endDate\""));
        assert!(json.contains("\"venueId\""));
        assert!(json.contains("\"musicList\""));
    }

    #[test]
    fn test_music_list_keeps_service_order() {
        let raw = r#"{
            "id": "1", "title": "T", "date": "2025-06-01T18:00:00Z",
            "endDate": "2025-06-01T20:00:00Z", "slug": "t",
            "musicList": {
                "Mass": [{"title": "Kyrie"}],
                "Evensong": [{"title": "Responses"}],
                "Compline": []
            }
        }"#;
        let parsed: Event = serde_json::from_str(raw).unwrap();
        let names: Vec<_> = parsed.music_list.keys().cloned().collect();
        assert_eq!(names, vec!["Mass", "Evensong", "Compline"]);

        let again: Event =
            serde_json::from_str(&serde_json::to_string(&parsed).unwrap()).unwrap();
        let names: Vec<_> = again.music_list.keys().cloned().collect();
        assert_eq!(names, vec!["Mass", "Evensong", "Compline"]);
    }

    #[test]
    fn test_schedule_item_null_date() {
        let item: ScheduleItem =
            serde_json::from_str(r#"{"date": null, "description": "Rehearsal"}"#).unwrap();
        assert!(item.date.is_none());
        assert_eq!(item.description, "Rehearsal");
    }

    #[test]
    fn test_add_sorts_by_date() {
        let mut data = EventData::default();
        data.add(event("later", "2025-09-01T10:00:00Z"));
        data.add(event("earlier", "2025-03-01T10:00:00Z"));
        assert_eq!(data.events[0].slug, "earlier");
        assert_eq!(data.events[1].slug, "later");
    }

    #[test]
    fn test_find_by_slug() {
        let mut data = EventData::default();
        data.add(event("advent-carols", "2025-11-30T17:00:00Z"));
        assert!(data.find("advent-carols").is_some());
        assert!(data.find("missing").is_none());
    }

    #[test]
    fn test_replace_existing() {
        let mut data = EventData::default();
        data.add(event("a", "2025-03-01T10:00:00Z"));
        let mut updated = event("a-renamed", "2025-03-01T10:00:00Z");
        updated.title = "New".to_string();
        assert!(data.replace("a", updated));
        assert!(data.find("a").is_none());
        assert_eq!(data.find("a-renamed").unwrap().title, "New");
    }

    #[test]
    fn test_replace_missing_is_noop() {
        let mut data = EventData::default();
        data.add(event("a", "2025-03-01T10:00:00Z"));
        assert!(!data.replace("b", event("b", "2025-03-01T10:00:00Z")));
        assert_eq!(data.events.len(), 1);
    }

    #[test]
    fn test_save_to_load_from() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut data = EventData::default();
        let mut e = event("st-john", "2025-06-24T17:30:00Z");
        e.music_list
            .insert("Evensong".to_string(), vec![MusicItem::new("Responses", "Smith", "Responses")]);
        data.add(e.clone());
        data.save_to(tmp.path()).unwrap();
        let loaded = EventData::load_from(tmp.path()).unwrap();
        assert_eq!(loaded.events, vec![e]);
    }
}
