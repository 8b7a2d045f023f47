use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::datastore::Row;
use crate::models::time::timestamp;
use crate::models::{EventItem, NewsItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title is required")]
    TitleRequired,
    #[error("Content is required")]
    ContentRequired,
    #[error("Image URL must be a valid http(s) link")]
    ImageUrl,
    #[error("Start date and time are required")]
    StartRequired,
    #[error("Start date must be in YYYY-MM-DD format")]
    StartDateFormat,
    #[error("Start time must be in HH:MM format")]
    StartTimeFormat,
    #[error("Provide both end date and end time, or leave both empty")]
    EndIncomplete,
    #[error("End date must be in YYYY-MM-DD format")]
    EndDateFormat,
    #[error("End time must be in HH:MM format")]
    EndTimeFormat,
    #[error("End must be after the start")]
    EndBeforeStart,
    #[error("Capacity must be a positive number")]
    Capacity,
    #[error("Adhan time must be in HH:MM format")]
    AdhanTimeFormat,
    #[error("Iqama time must be in HH:MM format")]
    IqamaTimeFormat,
    #[error("Name is required")]
    NameRequired,
    #[error("A valid email address is required")]
    Email,
}

fn blank_to_none(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn opt_text(value: &str) -> Value {
    blank_to_none(value).map_or(Value::Null, |v| Value::String(v.to_string()))
}

fn parse_image_url(raw: &str) -> Result<Value, ValidationError> {
    match blank_to_none(raw) {
        None => Ok(Value::Null),
        Some(raw) => {
            let url = Url::parse(raw).map_err(|_| ValidationError::ImageUrl)?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ValidationError::ImageUrl);
            }
            Ok(Value::String(url.to_string()))
        }
    }
}

/// Strict `HH:MM`, the shape the time inputs produce.
fn parse_hhmm(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if raw.len() != 5 {
        return None;
    }
    NaiveTime::parse_from_str(raw, "%H:%M").ok()
}

fn parse_ymd(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn to_utc<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Announcement editor contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsForm {
    pub title: String,
    pub content: String,
    pub image_url: String,
}

impl NewsForm {
    pub fn from_item(item: &NewsItem) -> Self {
        Self {
            title: item.title.clone(),
            content: item.content.clone(),
            image_url: item.image_url.clone().unwrap_or_default(),
        }
    }

    /// Editable columns, validated. Publication columns are set by the caller.
    pub fn validate(&self) -> Result<Row, ValidationError> {
        let title = blank_to_none(&self.title).ok_or(ValidationError::TitleRequired)?;
        let content = blank_to_none(&self.content).ok_or(ValidationError::ContentRequired)?;

        let mut row = Row::new();
        row.insert("title".into(), title.into());
        row.insert("content".into(), content.into());
        row.insert("image_url".into(), parse_image_url(&self.image_url)?);
        Ok(row)
    }
}

/// Event editor contents. Dates and times are local wall-clock text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub location: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub capacity: String,
    pub image_url: String,
}

impl EventForm {
    pub fn from_item(item: &EventItem) -> Self {
        Self::from_item_in(item, &Local)
    }

    pub fn from_item_in<Tz: TimeZone>(item: &EventItem, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let start = item.start_time.with_timezone(tz);
        let end = item.end_time.map(|end| end.with_timezone(tz));
        Self {
            title: item.title.clone(),
            description: item.description.clone().unwrap_or_default(),
            location: item.location.clone().unwrap_or_default(),
            start_date: start.format("%Y-%m-%d").to_string(),
            start_time: start.format("%H:%M").to_string(),
            end_date: end
                .as_ref()
                .map(|e| e.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            end_time: end
                .as_ref()
                .map(|e| e.format("%H:%M").to_string())
                .unwrap_or_default(),
            capacity: item.capacity.map(|c| c.to_string()).unwrap_or_default(),
            image_url: item.image_url.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<Row, ValidationError> {
        self.validate_in(&Local)
    }

    /// Validates with local times interpreted in `tz`.
    pub fn validate_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<Row, ValidationError> {
        let title = blank_to_none(&self.title).ok_or(ValidationError::TitleRequired)?;

        let (Some(start_date), Some(start_time)) =
            (blank_to_none(&self.start_date), blank_to_none(&self.start_time))
        else {
            return Err(ValidationError::StartRequired);
        };
        let start_date = parse_ymd(start_date).ok_or(ValidationError::StartDateFormat)?;
        let start_time = parse_hhmm(start_time).ok_or(ValidationError::StartTimeFormat)?;
        let start = to_utc(tz, start_date.and_time(start_time))
            .ok_or(ValidationError::StartTimeFormat)?;

        let end = match (blank_to_none(&self.end_date), blank_to_none(&self.end_time)) {
            (None, None) => None,
            (Some(date), Some(time)) => {
                let date = parse_ymd(date).ok_or(ValidationError::EndDateFormat)?;
                let time = parse_hhmm(time).ok_or(ValidationError::EndTimeFormat)?;
                let end = to_utc(tz, date.and_time(time)).ok_or(ValidationError::EndTimeFormat)?;
                if end <= start {
                    return Err(ValidationError::EndBeforeStart);
                }
                Some(end)
            }
            _ => return Err(ValidationError::EndIncomplete),
        };

        let capacity = match blank_to_none(&self.capacity) {
            None => Value::Null,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if n > 0 => Value::from(n),
                _ => return Err(ValidationError::Capacity),
            },
        };

        let mut row = Row::new();
        row.insert("title".into(), title.into());
        row.insert("description".into(), opt_text(&self.description));
        row.insert("location".into(), opt_text(&self.location));
        row.insert("start_time".into(), timestamp::format(&start).into());
        row.insert(
            "end_time".into(),
            end.map_or(Value::Null, |e| timestamp::format(&e).into()),
        );
        row.insert("capacity".into(), capacity);
        row.insert("image_url".into(), parse_image_url(&self.image_url)?);
        Ok(row)
    }
}

/// A partial change to one prayer slot. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotPatch {
    pub adhan: Option<String>,
    pub clear_adhan: bool,
    pub iqama: Option<String>,
    pub active: Option<bool>,
    pub note: Option<String>,
    pub clear_note: bool,
}

impl SlotPatch {
    /// The columns to write; empty when nothing was asked for.
    pub fn validate(&self) -> Result<Row, ValidationError> {
        let mut row = Row::new();

        if self.clear_adhan {
            row.insert("adhan_time".into(), Value::Null);
        } else if let Some(raw) = &self.adhan {
            let t = parse_hhmm(raw).ok_or(ValidationError::AdhanTimeFormat)?;
            row.insert("adhan_time".into(), time_text(t).into());
        }

        if let Some(raw) = &self.iqama {
            let t = parse_hhmm(raw).ok_or(ValidationError::IqamaTimeFormat)?;
            row.insert("iqama_time".into(), time_text(t).into());
        }

        if let Some(active) = self.active {
            row.insert("is_active".into(), active.into());
        }

        if self.clear_note {
            row.insert("notes".into(), Value::Null);
        } else if let Some(note) = &self.note {
            row.insert("notes".into(), opt_text(note));
        }

        Ok(row)
    }
}

fn time_text(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactForm {
    pub name: String,
    pub description: String,
    pub email: String,
    pub display_order: Option<i64>,
}

impl ContactForm {
    pub fn validate(&self) -> Result<Row, ValidationError> {
        let name = blank_to_none(&self.name).ok_or(ValidationError::NameRequired)?;
        let email = blank_to_none(&self.email).ok_or(ValidationError::Email)?;
        match email.split_once('@') {
            Some((user, domain)) if !user.is_empty() && !domain.is_empty() => {}
            _ => return Err(ValidationError::Email),
        }
        if email.contains(char::is_whitespace) {
            return Err(ValidationError::Email);
        }

        let mut row = Row::new();
        row.insert("name".into(), name.into());
        row.insert("description".into(), opt_text(&self.description));
        row.insert("contact_email".into(), email.into());
        if let Some(order) = self.display_order {
            row.insert("display_order".into(), order.into());
        }
        Ok(row)
    }
}
