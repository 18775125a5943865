//! Inline warnings for rows the server will ignore. None of these block
//! editing or submission.

use crate::editor::form::EventForm;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Warning {
    ScheduleIncomplete { row: usize },
    ServiceUnnamed { service: usize },
    ItemUntitled { service: usize, item: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ScheduleIncomplete { .. } => write!(
                f,
                "Both date and description are required for each schedule item to be saved."
            ),
            Warning::ServiceUnnamed { .. } => {
                write!(f, "Service name is required for music items to be saved.")
            }
            Warning::ItemUntitled { .. } => {
                write!(f, "Title is required for this item to be saved.")
            }
        }
    }
}

pub fn collect_warnings(form: &EventForm) -> Vec<Warning> {
    let mut warnings: Vec<Warning> = form
        .schedule
        .incomplete_rows()
        .into_iter()
        .map(|row| Warning::ScheduleIncomplete { row })
        .collect();

    for (service, category) in form.services.categories().iter().enumerate() {
        if category.needs_name() {
            warnings.push(Warning::ServiceUnnamed { service });
        }
        for (item, music) in category.items.iter().enumerate() {
            if !music.has_title() {
                warnings.push(Warning::ItemUntitled { service, item });
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::form::tests::sample_event;
    use crate::editor::schedule::ScheduleField;
    use crate::editor::services::ItemField;
    use crate::editor::view_state::CellRef;
    use chrono_tz::Europe::London;

    #[test]
    fn test_clean_form_has_no_warnings() {
        let form = EventForm::from_event(&sample_event(), London);
        assert!(collect_warnings(&form).is_empty());
    }

    #[test]
    fn test_warnings_for_each_kind() {
        let mut form = EventForm::from_event(&sample_event(), London);
        form.schedule.set_field(0, ScheduleField::Description, "");
        let fresh = form.services.add_category();
        form.services
            .set_item_field(CellRef::new(fresh, 0), ItemField::Title, "Ave verum");
        form.services.add_item(fresh);

        assert_eq!(
            collect_warnings(&form),
            vec![
                Warning::ScheduleIncomplete { row: 0 },
                Warning::ServiceUnnamed { service: 2 },
                Warning::ItemUntitled { service: 2, item: 1 },
            ]
        );
    }

    #[test]
    fn test_blank_new_service_only_flags_item() {
        let mut form = EventForm::from_event(&sample_event(), London);
        form.services.add_category();
        assert_eq!(
            collect_warnings(&form),
            vec![Warning::ItemUntitled { service: 2, item: 0 }]
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Warning::ItemUntitled { service: 0, item: 0 }.to_string(),
            "Title is required for this item to be saved."
        );
        assert!(Warning::ScheduleIncomplete { row: 3 }
            .to_string()
            .starts_with("Both date and description"));
    }
}
