use anyhow::Result;
use chrono::{Local, NaiveDate};
use inquire::{Confirm, CustomType, DateSelect, MultiSelect, Select, Text};
use std::fmt;

use opsboard::form::{ContactForm, EventForm, QuoteForm};
use opsboard::model::{
    Choice, Contact, ContactKind, ContactSource, Event, EventStatus, PaymentMethod, Priority,
    Quote, ReservedMaterial,
};
use opsboard::sample::Technician;
use opsboard::{EntityId, FieldErrors, Form, Record};

// ==========================================
// Helpers
// ==========================================

/// An entry of a record picker.
struct Pick {
    id: EntityId,
    label: String,
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl fmt::Display for TechnicianOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0.name, self.0.specialty)
    }
}

struct TechnicianOption(Technician);

pub fn print_errors(errors: &FieldErrors) {
    println!("\n❌ Please fix the following:");
    for (field, message) in errors.iter() {
        println!("   • {}: {}", field, message);
    }
    println!();
}

fn select_choice<T: Choice + fmt::Display>(message: &str, current: &str) -> Result<T> {
    let options = T::ALL.to_vec();
    let cursor = T::parse_choice(current)
        .ok()
        .and_then(|c| T::ALL.iter().position(|o| o.code() == c.code()))
        .unwrap_or(0);
    Ok(Select::new(message, options).with_starting_cursor(cursor).prompt()?)
}

fn text(message: &str, current: &str) -> Result<String> {
    Ok(Text::new(message).with_initial_value(current).prompt()?)
}

fn optional_text(message: &str, current: Option<&str>) -> Result<Option<String>> {
    let value = Text::new(message)
        .with_initial_value(current.unwrap_or(""))
        .with_help_message("Leave empty to skip")
        .prompt()?;
    Ok(if value.trim().is_empty() {
        None
    } else {
        Some(value)
    })
}

fn date(message: &str, current: &str) -> Result<String> {
    let default = NaiveDate::parse_from_str(current, "%Y-%m-%d")
        .unwrap_or_else(|_| Local::now().date_naive());
    let picked = DateSelect::new(message).with_default(default).prompt()?;
    Ok(picked.format("%Y-%m-%d").to_string())
}

/// Lets the user pick one record; `None` when there is nothing to pick.
pub fn pick_record<T>(
    message: &str,
    records: &[Record<T>],
    describe: impl Fn(&Record<T>) -> String,
) -> Result<Option<EntityId>> {
    if records.is_empty() {
        return Ok(None);
    }
    let options: Vec<Pick> = records
        .iter()
        .map(|r| Pick {
            id: r.id,
            label: describe(r),
        })
        .collect();
    let picked = Select::new(message, options).prompt()?;
    Ok(Some(picked.id))
}

// ==========================================
// Forms
// ==========================================

pub fn contact_form(assignees: &[&str]) -> Result<Contact> {
    println!("\n--- New Contact ---");
    let mut form = ContactForm::default();

    loop {
        form.name = text("Name:", &form.name)?;
        form.company = text("Company:", &form.company)?;
        form.email = text("Email:", &form.email)?;
        form.phone = text("Phone:", &form.phone)?;
        form.kind = select_choice::<ContactKind>("Type:", &form.kind)?.code().to_string();
        form.source = select_choice::<ContactSource>("Source:", &form.source)?.code().to_string();
        form.notes = optional_text("Notes:", form.notes.as_deref())?;

        let mut options = vec!["Unassigned"];
        options.extend_from_slice(assignees);
        let assignee = Select::new("Assigned to:", options).prompt()?;
        form.assigned_to = if assignee == "Unassigned" {
            None
        } else {
            Some(assignee.to_string())
        };

        match form.submit() {
            Ok(contact) => return Ok(contact),
            Err(errors) => print_errors(&errors),
        }
    }
}

/// Prompts every event field, starting from `form`, until it validates.
pub fn event_form(mut form: EventForm) -> Result<Event> {
    loop {
        form.title = text("Title:", &form.title)?;
        form.start_date = date("Start date:", &form.start_date)?;
        form.end_date = date("End date:", &form.end_date)?;
        form.start_time = text("Start time (HH:MM):", &form.start_time)?;
        form.end_time = text("End time (HH:MM):", &form.end_time)?;
        form.location = text("Location:", &form.location)?;
        form.client = text("Client:", &form.client)?;
        form.status = select_choice::<EventStatus>("Status:", &form.status)?.code().to_string();
        form.priority = select_choice::<Priority>("Priority:", &form.priority)?.code().to_string();
        form.team_members = text("Technicians needed:", &form.team_members)?;
        form.equipments = text("Equipments:", &form.equipments)?;
        form.description = text("Description:", &form.description)?;

        match form.submit() {
            Ok(event) => return Ok(event),
            Err(errors) => print_errors(&errors),
        }
    }
}

pub fn quote_form(currency: &str) -> Result<Quote> {
    println!("\n--- New Quote ---");
    let mut form = QuoteForm::default();

    loop {
        form.client = text("Client:", &form.client)?;
        form.date = date("Date:", &form.date)?;
        form.client_phone = optional_text("Client phone:", form.client_phone.as_deref())?;
        form.client_email = optional_text("Client email:", form.client_email.as_deref())?;
        form.amount = text(&format!("Total amount ({}):", currency), &form.amount)?;
        form.advance_amount = text(&format!("Advance ({}):", currency), &form.advance_amount)?;

        if let Some((remaining, ratio)) = form.preview() {
            let ratio = ratio.map(|r| format!(" ({}%)", r)).unwrap_or_default();
            println!("💡 Remaining to pay: {:.2} {}{}", remaining, currency, ratio);
        }

        form.payment_method =
            select_choice::<PaymentMethod>("Payment method:", &form.payment_method)?
                .code()
                .to_string();
        form.description = text("Description:", &form.description)?;

        match form.submit() {
            Ok(quote) => {
                println!("✅ Payment status: {}", quote.payment_status());
                return Ok(quote);
            }
            Err(errors) => print_errors(&errors),
        }
    }
}

pub fn technicians(roster: &[Technician], assigned: &[EntityId]) -> Result<Vec<EntityId>> {
    let defaults: Vec<usize> = roster
        .iter()
        .enumerate()
        .filter(|(_, t)| assigned.contains(&t.id))
        .map(|(i, _)| i)
        .collect();
    let options: Vec<TechnicianOption> = roster.iter().cloned().map(TechnicianOption).collect();
    let picked = MultiSelect::new("Technicians (space to toggle):", options)
        .with_default(&defaults)
        .prompt()?;
    Ok(picked.into_iter().map(|t| t.0.id).collect())
}

pub fn materials() -> Result<Vec<ReservedMaterial>> {
    let mut lines = Vec::new();
    println!("\n--- Reserve Materials ---");
    println!("(Leave Product empty to finish)");

    loop {
        let product_name = Text::new("Product (leave empty to finish):").prompt()?;
        if product_name.trim().is_empty() {
            break;
        }
        let quantity = CustomType::<u32>::new("Quantity:")
            .with_default(1)
            .with_error_message("Please type a whole number")
            .prompt()?;
        lines.push(ReservedMaterial {
            product_name: product_name.trim().to_string(),
            quantity,
        });
    }
    Ok(lines)
}

pub fn advance(current: f64, currency: &str) -> Result<f64> {
    Ok(CustomType::<f64>::new(&format!("Total advance received ({}):", currency))
        .with_default(current)
        .with_error_message("Please type a number")
        .prompt()?)
}

pub fn confirm(message: &str, default: bool) -> Result<bool> {
    Ok(Confirm::new(message).with_default(default).prompt()?)
}
