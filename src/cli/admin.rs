use anyhow::{Result, anyhow};
use chrono::Utc;
use std::io::{self, BufRead, Write};

use super::args::{AdminCommands, ContactCommands, EventCommands, EventFields, NewsCommands, NewsFields};
use super::{AMBER, DIM, GREEN};
use crate::admin::actions;
use crate::admin::{ContactForm, EventForm, NewsForm, SlotPatch};
use crate::datastore::DataStore;
use crate::models::PrayerName;

pub fn handle_admin(store: &dyn DataStore, action: AdminCommands) -> Result<()> {
    match action {
        AdminCommands::Prayer {
            name,
            adhan,
            clear_adhan,
            iqama,
            active,
            note,
            clear_note,
        } => {
            let prayer: PrayerName = name.parse()?;
            let patch = SlotPatch {
                adhan,
                clear_adhan,
                iqama,
                active,
                note,
                clear_note,
            };
            if actions::update_prayer_slot(store, prayer, &patch)? {
                println_colored!(GREEN, "  ✓ {} updated", prayer.display_name());
            } else {
                println_colored!(DIM, "  Nothing to change for {}", prayer.display_name());
            }
        }
        AdminCommands::News { action } => handle_news(store, action)?,
        AdminCommands::Event { action } => handle_event(store, action)?,
        AdminCommands::Contact { action } => handle_contact(store, action)?,
    }
    Ok(())
}

fn apply_news_fields(form: &mut NewsForm, fields: NewsFields) {
    if let Some(title) = fields.title {
        form.title = title;
    }
    if let Some(content) = fields.content {
        form.content = content;
    }
    if let Some(image) = fields.image {
        form.image_url = image;
    }
}

fn handle_news(store: &dyn DataStore, action: NewsCommands) -> Result<()> {
    match action {
        NewsCommands::Create { fields } => {
            let mut form = NewsForm::default();
            apply_news_fields(&mut form, fields);
            let id = actions::create_announcement(store, &form, Utc::now())?;
            println_colored!(GREEN, "  ✓ Draft announcement created ({})", id);
            println_colored!(DIM, "  Publish it with: jamaat admin news publish {}", id);
        }
        NewsCommands::Edit { id, fields } => {
            let mut form = NewsForm::from_item(&actions::find_announcement(store, &id)?);
            apply_news_fields(&mut form, fields);
            actions::update_announcement(store, &id, &form)?;
            println_colored!(GREEN, "  ✓ Announcement updated");
        }
        NewsCommands::Publish { id } => {
            actions::set_announcement_published(store, &id, true, Utc::now())?;
            println_colored!(GREEN, "  ✓ Announcement published");
        }
        NewsCommands::Unpublish { id } => {
            actions::set_announcement_published(store, &id, false, Utc::now())?;
            println_colored!(AMBER, "  Announcement moved back to drafts");
        }
        NewsCommands::Delete { id, yes } => {
            let item = actions::find_announcement(store, &id)?;
            if !yes && !confirm(&format!("Delete announcement \"{}\"?", item.title))? {
                println_colored!(DIM, "  Cancelled");
                return Ok(());
            }
            actions::delete_announcement(store, &id)?;
            println_colored!(GREEN, "  ✓ Announcement deleted");
        }
    }
    Ok(())
}

fn apply_event_fields(form: &mut EventForm, fields: EventFields) {
    let EventFields {
        title,
        description,
        location,
        start_date,
        start_time,
        end_date,
        end_time,
        capacity,
        image,
    } = fields;
    let slots = [
        (title, &mut form.title),
        (description, &mut form.description),
        (location, &mut form.location),
        (start_date, &mut form.start_date),
        (start_time, &mut form.start_time),
        (end_date, &mut form.end_date),
        (end_time, &mut form.end_time),
        (capacity, &mut form.capacity),
        (image, &mut form.image_url),
    ];
    for (value, target) in slots {
        if let Some(value) = value {
            *target = value;
        }
    }
}

fn handle_event(store: &dyn DataStore, action: EventCommands) -> Result<()> {
    match action {
        EventCommands::Create { fields } => {
            let mut form = EventForm::default();
            apply_event_fields(&mut form, fields);
            let id = actions::create_event(store, &form, Utc::now())?;
            println_colored!(GREEN, "  ✓ Draft event created ({})", id);
            println_colored!(DIM, "  Publish it with: jamaat admin event publish {}", id);
        }
        EventCommands::Edit { id, fields } => {
            let mut form = EventForm::from_item(&actions::find_event(store, &id)?);
            apply_event_fields(&mut form, fields);
            actions::update_event(store, &id, &form)?;
            println_colored!(GREEN, "  ✓ Event updated");
        }
        EventCommands::Publish { id } => {
            actions::set_event_published(store, &id, true)?;
            println_colored!(GREEN, "  ✓ Event published");
        }
        EventCommands::Unpublish { id } => {
            actions::set_event_published(store, &id, false)?;
            println_colored!(AMBER, "  Event moved back to drafts");
        }
        EventCommands::Delete { id, yes } => {
            let event = actions::find_event(store, &id)?;
            if !yes && !confirm(&format!("Delete event \"{}\"?", event.title))? {
                println_colored!(DIM, "  Cancelled");
                return Ok(());
            }
            actions::delete_event(store, &id)?;
            println_colored!(GREEN, "  ✓ Event deleted");
        }
    }
    Ok(())
}

fn handle_contact(store: &dyn DataStore, action: ContactCommands) -> Result<()> {
    match action {
        ContactCommands::Add {
            name,
            email,
            description,
            order,
        } => {
            let form = ContactForm {
                name,
                description: description.unwrap_or_default(),
                email,
                display_order: order,
            };
            let id = actions::add_contact(store, &form)?;
            println_colored!(GREEN, "  ✓ Contact channel added ({})", id);
        }
        ContactCommands::Remove { id, yes } => {
            if !yes && !confirm(&format!("Remove contact channel {}?", id))? {
                println_colored!(DIM, "  Cancelled");
                return Ok(());
            }
            actions::remove_contact(store, &id)?;
            println_colored!(GREEN, "  ✓ Contact channel removed");
        }
    }
    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("  {} This cannot be undone. [y/N] ", question))?;
    Ok(parse_confirmation(&answer))
}

fn parse_confirmation(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut buf = String::new();
    let read = io::stdin().lock().read_line(&mut buf)?;
    if read == 0 {
        return Err(anyhow!("No answer given; pass --yes to skip the prompt"));
    }
    Ok(buf.trim_end_matches('\n').trim_end_matches('\r').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_yes_confirms() {
        assert!(parse_confirmation("y"));
        assert!(parse_confirmation(" YES "));
        assert!(!parse_confirmation(""));
        assert!(!parse_confirmation("n"));
        assert!(!parse_confirmation("sure"));
    }

    #[test]
    fn edit_overlays_only_given_fields() {
        let mut form = EventForm {
            title: "Family Night".into(),
            start_date: "2026-05-01".into(),
            start_time: "18:30".into(),
            ..Default::default()
        };
        apply_event_fields(
            &mut form,
            EventFields {
                start_time: Some("19:00".into()),
                capacity: Some(String::new()),
                ..Default::default()
            },
        );
        assert_eq!(form.title, "Family Night");
        assert_eq!(form.start_time, "19:00");
        assert_eq!(form.capacity, "");
    }
}
