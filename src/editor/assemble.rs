//! Turns the editing tree back into the stored event shape. View state is
//! left behind.

use super::form::EventForm;
use super::services::ServiceCategory;
use crate::calc::civil_time::{combine, from_civil_date, CivilTimeError};
use crate::data::event::{Event, MusicList, ScheduleItem};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AssembleError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field}: {source}")]
    InvalidDate {
        field: &'static str,
        source: CivilTimeError,
    },
}

pub fn assemble(form: &EventForm) -> Result<Event, AssembleError> {
    let title = form.title.trim();
    if title.is_empty() {
        return Err(AssembleError::MissingField("Title"));
    }
    let date = required_date("Start Date", &form.start_date, form)?;
    let end_date = required_date("End Date", &form.end_date, form)?;

    Ok(Event {
        id: form.id.clone(),
        title: title.to_string(),
        subtitle: form.subtitle.clone(),
        date,
        end_date,
        venue_id: form.venue_id.clone(),
        slug: form.slug.clone(),
        description: form.description.clone(),
        schedule: assemble_schedule(form),
        music_list: fold_services(form.services.categories()),
    })
}

fn required_date(
    field: &'static str,
    value: &str,
    form: &EventForm,
) -> Result<chrono::DateTime<chrono::Utc>, AssembleError> {
    if value.trim().is_empty() {
        return Err(AssembleError::MissingField(field));
    }
    from_civil_date(value, form.timezone)
        .map_err(|source| AssembleError::InvalidDate { field, source })
}

/// Every row is kept, complete or not. A row whose date can't be read is
/// sent with no date.
fn assemble_schedule(form: &EventForm) -> Vec<ScheduleItem> {
    form.schedule
        .entries()
        .iter()
        .enumerate()
        .map(|(row, entry)| {
            if !entry.is_complete() {
                tracing::warn!(row, "submitting incomplete schedule row");
            }
            let date = match combine(&entry.date, &entry.time, form.timezone) {
                Ok(at) => Some(at),
                Err(err) => {
                    tracing::warn!(row, %err, "schedule row has no usable date");
                    None
                }
            };
            ScheduleItem {
                date,
                description: entry.description.clone(),
            }
        })
        .collect()
}

/// Keys the services by name. A later service with the same name replaces
/// the earlier one's items in the earlier one's position.
pub fn fold_services(categories: &[ServiceCategory]) -> MusicList {
    let mut list = MusicList::new();
    for category in categories {
        if list
            .insert(category.name.clone(), category.items.clone())
            .is_some()
        {
            tracing::warn!(name = %category.name, "duplicate service name, keeping the last");
        }
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::event::MusicItem;
    use crate::editor::form::tests::sample_event;
    use crate::editor::schedule::ScheduleField;
    use chrono::{DateTime, Utc};
    use chrono_tz::Europe::London;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn category(name: &str, title: &str) -> ServiceCategory {
        ServiceCategory {
            name: name.to_string(),
            items: vec![MusicItem::new(title, "", "")],
        }
    }

    #[test]
    fn test_unedited_form_reproduces_event() {
        let event = sample_event();
        let form = EventForm::from_event(&event, London);
        assert_eq!(assemble(&form).unwrap(), event);
    }

    #[test]
    fn test_view_state_does_not_leak() {
        let event = sample_event();
        let mut form = EventForm::from_event(&event, London);
        form.services.toggle_service_expanded(1);
        form.services.clear_editing_cell();
        assert_eq!(assemble(&form).unwrap(), event);
    }

    #[test]
    fn test_required_fields() {
        let mut form = EventForm::from_event(&sample_event(), London);
        form.title = "  ".to_string();
        assert_eq!(assemble(&form), Err(AssembleError::MissingField("Title")));

        form.title = "Evensong".to_string();
        form.end_date.clear();
        assert_eq!(
            assemble(&form).unwrap_err().to_string(),
            "End Date is required"
        );

        form.end_date = "2025-13-01".to_string();
        assert!(matches!(
            assemble(&form),
            Err(AssembleError::InvalidDate { field: "End Date", .. })
        ));
    }

    #[test]
    fn test_incomplete_schedule_rows_still_sent() {
        let mut form = EventForm::from_event(&sample_event(), London);
        let row = form.schedule.add();
        form.schedule.set_field(row, ScheduleField::Date, "2025-06-15");
        let blank = form.schedule.add();
        form.schedule.set_field(blank, ScheduleField::Description, "Drinks");

        let event = assemble(&form).unwrap();
        assert_eq!(event.schedule.len(), 3);
        // Empty time means local midnight.
        assert_eq!(event.schedule[1].date, Some(at("2025-06-14T23:00:00Z")));
        assert_eq!(event.schedule[1].description, "");
        assert_eq!(event.schedule[2].date, None);
        assert_eq!(event.schedule[2].description, "Drinks");
    }

    #[test]
    fn test_schedule_time_combined_in_form_timezone() {
        let mut form = EventForm::from_event(&sample_event(), chrono_tz::America::New_York);
        form.schedule.set_field(0, ScheduleField::Date, "2025-06-15");
        form.schedule.set_field(0, ScheduleField::Time, "19:30");
        let event = assemble(&form).unwrap();
        assert_eq!(event.schedule[0].date, Some(at("2025-06-15T23:30:00Z")));
    }

    #[test]
    fn test_fold_services_preserves_order() {
        let list = fold_services(&[category("Mass", "Kyrie"), category("Evensong", "Psalm 23")]);
        let names: Vec<_> = list.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Mass", "Evensong"]);
    }

    #[test]
    fn test_fold_services_duplicate_name_last_wins() {
        let list = fold_services(&[
            category("Evensong", "First"),
            category("Mass", "Kyrie"),
            category("Evensong", "Second"),
        ]);
        assert_eq!(list.len(), 2);
        assert_eq!(list.get_index(0).unwrap().0, "Evensong");
        assert_eq!(list["Evensong"][0].title, "Second");
    }

    #[test]
    fn test_reordered_services_submit_in_new_order() {
        let mut form = EventForm::from_event(&sample_event(), London);
        form.services.move_category_down(0, std::time::Instant::now());
        let event = assemble(&form).unwrap();
        let names: Vec<_> = event.music_list.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Mass", "Evensong"]);
    }
}
