use crate::calc::civil_time::{to_civil_date, to_civil_time};
use crate::data::event::ScheduleItem;
use chrono_tz::Tz;

/// One schedule row as the user edits it: civil strings, not instants.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub date: String,
    pub time: String,
    pub description: String,
}

impl ScheduleEntry {
    pub fn from_item(item: &ScheduleItem, tz: Tz) -> Self {
        let (date, time) = match item.date {
            Some(at) => (to_civil_date(at, tz), to_civil_time(at, tz)),
            None => (String::new(), String::new()),
        };
        ScheduleEntry {
            date,
            time,
            description: item.description.clone(),
        }
    }

    /// Date and description both present. Display-only; incomplete rows are
    /// still submitted.
    pub fn is_complete(&self) -> bool {
        !self.date.trim().is_empty() && !self.description.trim().is_empty()
    }

    pub fn field(&self, field: ScheduleField) -> &str {
        match field {
            ScheduleField::Date => &self.date,
            ScheduleField::Time => &self.time,
            ScheduleField::Description => &self.description,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScheduleField {
    Date,
    Time,
    Description,
}

impl ScheduleField {
    pub const ALL: [ScheduleField; 3] = [
        ScheduleField::Date,
        ScheduleField::Time,
        ScheduleField::Description,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScheduleField::Date => "Date",
            ScheduleField::Time => "Time",
            ScheduleField::Description => "Description",
        }
    }

    pub fn next(self) -> Option<ScheduleField> {
        match self {
            ScheduleField::Date => Some(ScheduleField::Time),
            ScheduleField::Time => Some(ScheduleField::Description),
            ScheduleField::Description => None,
        }
    }
}

/// The flat schedule list. Append, remove and edit in place; no reordering.
#[derive(Clone, Debug, Default)]
pub struct ScheduleEditor {
    entries: Vec<ScheduleEntry>,
}

impl ScheduleEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: &[ScheduleItem], tz: Tz) -> Self {
        ScheduleEditor {
            entries: items.iter().map(|i| ScheduleEntry::from_item(i, tz)).collect(),
        }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&ScheduleEntry> {
        self.entries.get(i)
    }

    /// Appends an empty row and returns its index.
    pub fn add(&mut self) -> usize {
        self.entries.push(ScheduleEntry::default());
        tracing::debug!(index = self.entries.len() - 1, "schedule row added");
        self.entries.len() - 1
    }

    pub fn remove(&mut self, i: usize) -> bool {
        if i >= self.entries.len() {
            return false;
        }
        self.entries.remove(i);
        tracing::debug!(index = i, "schedule row removed");
        true
    }

    pub fn set_field(&mut self, i: usize, field: ScheduleField, value: &str) -> bool {
        let Some(entry) = self.entries.get_mut(i) else {
            return false;
        };
        let slot = match field {
            ScheduleField::Date => &mut entry.date,
            ScheduleField::Time => &mut entry.time,
            ScheduleField::Description => &mut entry.description,
        };
        *slot = value.to_string();
        true
    }

    pub fn incomplete_rows(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.is_complete())
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_add_appends_blank_row() {
        let mut schedule = ScheduleEditor::new();
        assert_eq!(schedule.add(), 0);
        assert_eq!(schedule.add(), 1);
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.get(1), Some(&ScheduleEntry::default()));
    }

    #[test]
    fn test_remove_deletes_only_that_row() {
        let mut schedule = ScheduleEditor::new();
        for desc in ["Rehearsal", "Robing", "Service"] {
            let i = schedule.add();
            schedule.set_field(i, ScheduleField::Description, desc);
        }
        assert!(schedule.remove(1));
        let descs: Vec<_> = schedule.entries().iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descs, vec!["Rehearsal", "Service"]);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut schedule = ScheduleEditor::new();
        assert!(!schedule.remove(0));
        assert!(!schedule.set_field(3, ScheduleField::Date, "2025-06-01"));
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_incomplete_rows_flagged() {
        let mut schedule = ScheduleEditor::new();
        let a = schedule.add();
        schedule.set_field(a, ScheduleField::Date, "2025-06-01");
        schedule.set_field(a, ScheduleField::Description, "Rehearsal");
        let b = schedule.add();
        schedule.set_field(b, ScheduleField::Description, "Tea");
        let c = schedule.add();
        schedule.set_field(c, ScheduleField::Date, "2025-06-01");
        schedule.set_field(c, ScheduleField::Description, "   ");

        assert_eq!(schedule.incomplete_rows(), vec![b, c]);
    }

    #[test]
    fn test_from_items_uses_civil_strings() {
        let items = vec![
            ScheduleItem {
                date: Some(at("2025-06-01T13:30:00Z")),
                description: "Rehearsal".to_string(),
            },
            ScheduleItem {
                date: Some(at("2025-06-01T23:00:00Z")),
                description: "Day marker".to_string(),
            },
            ScheduleItem {
                date: None,
                description: "TBC".to_string(),
            },
        ];
        let schedule = ScheduleEditor::from_items(&items, chrono_tz::Europe::London);

        assert_eq!(schedule.get(0).unwrap().date, "2025-06-01");
        assert_eq!(schedule.get(0).unwrap().time, "14:30");
        // Local midnight carries no time of day.
        assert_eq!(schedule.get(1).unwrap().date, "2025-06-02");
        assert_eq!(schedule.get(1).unwrap().time, "");
        assert_eq!(schedule.get(2).unwrap().date, "");
    }

    #[test]
    fn test_field_order() {
        assert_eq!(ScheduleField::Date.next(), Some(ScheduleField::Time));
        assert_eq!(ScheduleField::Description.next(), None);
    }
}
