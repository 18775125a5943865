use super::schedule::ScheduleEditor;
use super::services::ServiceEditor;
use crate::calc::civil_time::to_civil_date;
use crate::data::event::Event;
use chrono_tz::Tz;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetailField {
    Title,
    Subtitle,
    StartDate,
    EndDate,
    Venue,
    Slug,
    Description,
}

impl DetailField {
    pub const ALL: [DetailField; 7] = [
        DetailField::Title,
        DetailField::Subtitle,
        DetailField::StartDate,
        DetailField::EndDate,
        DetailField::Venue,
        DetailField::Slug,
        DetailField::Description,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DetailField::Title => "Title",
            DetailField::Subtitle => "Subtitle",
            DetailField::StartDate => "Start Date",
            DetailField::EndDate => "End Date",
            DetailField::Venue => "Venue",
            DetailField::Slug => "Slug",
            DetailField::Description => "Description",
        }
    }

    pub fn is_required(self) -> bool {
        matches!(
            self,
            DetailField::Title | DetailField::StartDate | DetailField::EndDate | DetailField::Venue
        )
    }

    pub fn is_date(self) -> bool {
        matches!(self, DetailField::StartDate | DetailField::EndDate)
    }
}

/// Everything the editor holds for one event, as the user sees it.
#[derive(Clone, Debug)]
pub struct EventForm {
    pub id: String,
    /// Slug the event was loaded under; updates are addressed to it even if
    /// the slug field is edited.
    pub original_slug: String,
    pub title: String,
    pub subtitle: String,
    pub start_date: String,
    pub end_date: String,
    pub venue_id: String,
    pub slug: String,
    pub description: String,
    pub schedule: ScheduleEditor,
    pub services: ServiceEditor,
    pub timezone: Tz,
}

impl EventForm {
    pub fn from_event(event: &Event, timezone: Tz) -> Self {
        EventForm {
            id: event.id.clone(),
            original_slug: event.slug.clone(),
            title: event.title.clone(),
            subtitle: event.subtitle.clone(),
            start_date: to_civil_date(event.date, timezone),
            end_date: to_civil_date(event.end_date, timezone),
            venue_id: event.venue_id.clone(),
            slug: event.slug.clone(),
            description: event.description.clone(),
            schedule: ScheduleEditor::from_items(&event.schedule, timezone),
            services: ServiceEditor::from_music_list(&event.music_list),
            timezone,
        }
    }

    pub fn detail(&self, field: DetailField) -> &str {
        match field {
            DetailField::Title => &self.title,
            DetailField::Subtitle => &self.subtitle,
            DetailField::StartDate => &self.start_date,
            DetailField::EndDate => &self.end_date,
            DetailField::Venue => &self.venue_id,
            DetailField::Slug => &self.slug,
            DetailField::Description => &self.description,
        }
    }

    pub fn set_detail(&mut self, field: DetailField, value: &str) {
        let slot = match field {
            DetailField::Title => &mut self.title,
            DetailField::Subtitle => &mut self.subtitle,
            DetailField::StartDate => &mut self.start_date,
            DetailField::EndDate => &mut self.end_date,
            DetailField::Venue => &mut self.venue_id,
            DetailField::Slug => &mut self.slug,
            DetailField::Description => &mut self.description,
        };
        *slot = value.to_string();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::event::{MusicItem, MusicList, ScheduleItem};
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    /// A two-service evensong at King's, shared by the editor and UI tests.
    pub(crate) fn sample_event() -> Event {
        let mut music_list = MusicList::new();
        music_list.insert(
            "Evensong".to_string(),
            vec![
                MusicItem::new("Responses", "Smith", "Responses"),
                MusicItem::new("Magnificat in G", "Stanford", "Magnificat"),
            ],
        );
        music_list.insert(
            "Mass".to_string(),
            vec![MusicItem::new("Missa Brevis", "Palestrina", "")],
        );
        Event {
            id: "42".to_string(),
            title: "Choral Evensong".to_string(),
            subtitle: "Trinity Sunday".to_string(),
            date: at("2025-06-14T23:00:00Z"),
            end_date: at("2025-06-15T23:00:00Z"),
            venue_id: "kings".to_string(),
            slug: "trinity-evensong".to_string(),
            description: "Sung by the visiting choir.".to_string(),
            schedule: vec![ScheduleItem {
                date: Some(at("2025-06-15T14:00:00Z")),
                description: "Rehearsal".to_string(),
            }],
            music_list,
        }
    }

    #[test]
    fn test_from_event_uses_local_dates() {
        let form = EventForm::from_event(&sample_event(), chrono_tz::Europe::London);
        assert_eq!(form.start_date, "2025-06-15");
        assert_eq!(form.end_date, "2025-06-16");
        assert_eq!(form.schedule.get(0).unwrap().time, "15:00");
        assert_eq!(form.services.len(), 2);
        assert_eq!(form.original_slug, "trinity-evensong");
    }

    #[test]
    fn test_detail_round_trip() {
        let mut form = EventForm::from_event(&sample_event(), chrono_tz::Europe::London);
        for field in DetailField::ALL {
            form.set_detail(field, field.label());
        }
        for field in DetailField::ALL {
            assert_eq!(form.detail(field), field.label());
        }
        assert_eq!(form.original_slug, "trinity-evensong");
    }

    #[test]
    fn test_required_fields() {
        let required: Vec<_> = DetailField::ALL
            .into_iter()
            .filter(|f| f.is_required())
            .collect();
        assert_eq!(
            required,
            vec![
                DetailField::Title,
                DetailField::StartDate,
                DetailField::EndDate,
                DetailField::Venue
            ]
        );
    }
}
