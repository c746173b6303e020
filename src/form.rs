//! Form schemas for contacts, events and quotes.
//!
//! A form holds exactly what the user typed. `submit` checks it against the
//! schema and either returns a typed record or every failing field with its
//! message, keyed by the camelCase field name the form uses.

use chrono::{Local, NaiveDate, NaiveTime};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;
use validator::Validate;

use crate::model::{
    Choice, Contact, ContactKind, ContactSource, Event, EventPatch, EventStatus, PaymentMethod,
    Priority, Quote,
};

const DATE_INPUT: &str = "%Y-%m-%d";
const TIME_INPUT: &str = "%H:%M";

static TIME_OF_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("time-of-day pattern compiles")
});

/// Values the assignee select uses for "nobody".
const UNASSIGNED: &[&str] = &["unassigned", "non-attribue", "non attribué"];

// ==========================================
// Field errors
// ==========================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("form has {} invalid field(s)", .0.len())]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keeps the first message reported for a field.
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Records `parsed`'s error under `field` unless the field already failed
    /// an earlier rule, and hands back the value on success.
    fn check<T, E: ToString>(&mut self, field: &str, parsed: Result<T, E>) -> Option<T> {
        match parsed {
            Ok(value) => Some(value),
            Err(err) => {
                self.insert(field, err.to_string());
                None
            }
        }
    }

    fn from_validation(errors: Result<(), validator::ValidationErrors>) -> Self {
        let mut out = FieldErrors::default();
        if let Err(errors) = errors {
            for (field, failures) in errors.field_errors() {
                if let Some(first) = failures.first() {
                    let message = first
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| first.code.to_string());
                    out.insert(&camel_case(&*field), message);
                }
            }
        }
        out
    }
}

fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

// ==========================================
// Form trait & field-map boundary
// ==========================================

pub trait Form: DeserializeOwned + Validate {
    type Output;

    fn submit(&self) -> Result<Self::Output, FieldErrors>;

    /// Builds a form from `field name -> value` pairs. Unknown names are
    /// ignored; missing ones take the form's defaults.
    fn from_fields(fields: &BTreeMap<String, String>) -> Result<Self, FieldErrors> {
        let object: serde_json::Map<String, serde_json::Value> = fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(object)).map_err(|err| {
            let mut errors = FieldErrors::default();
            errors.insert("form", err.to_string());
            errors
        })
    }
}

/// Validates a raw field map in one step.
pub fn submit_fields<F: Form>(fields: &BTreeMap<String, String>) -> Result<F::Output, FieldErrors> {
    F::from_fields(fields)?.submit()
}

fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(non_blank(value))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_date(input: &str) -> Result<NaiveDate, &'static str> {
    NaiveDate::parse_from_str(input.trim(), DATE_INPUT).map_err(|_| "Use the YYYY-MM-DD format")
}

fn parse_time(input: &str) -> Result<NaiveTime, &'static str> {
    let input = input.trim();
    if !TIME_OF_DAY.is_match(input) {
        return Err("Use the HH:MM format");
    }
    NaiveTime::parse_from_str(input, TIME_INPUT).map_err(|_| "Use the HH:MM format")
}

fn parse_count(input: &str) -> Result<u32, &'static str> {
    input.trim().parse::<u32>().map_err(|_| "Must be a whole number")
}

fn parse_amount(input: &str) -> Result<f64, &'static str> {
    match input.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err("Must be a number"),
    }
}

// ==========================================
// Contact
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactForm {
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[validate(length(min = 1, message = "Company is required"))]
    pub company: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Phone number must be at least 8 characters"))]
    pub phone: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub source: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub notes: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    pub assigned_to: Option<String>,
}

impl Default for ContactForm {
    fn default() -> Self {
        ContactForm {
            name: String::new(),
            company: String::new(),
            email: String::new(),
            phone: String::new(),
            kind: ContactKind::Prospect.code().to_string(),
            source: ContactSource::Website.code().to_string(),
            notes: None,
            assigned_to: None,
        }
    }
}

impl Form for ContactForm {
    type Output = Contact;

    fn submit(&self) -> Result<Contact, FieldErrors> {
        let normalized = ContactForm {
            email: self.email.trim().to_string(),
            ..self.clone()
        };

        let mut errors = FieldErrors::from_validation(normalized.validate());
        let kind = errors.check("type", ContactKind::parse_choice(&self.kind));
        let source = errors.check("source", ContactSource::parse_choice(&self.source));

        let (Some(kind), Some(source), true) = (kind, source, errors.is_empty()) else {
            return Err(errors);
        };

        let assigned_to = non_blank(self.assigned_to.clone())
            .filter(|who| !UNASSIGNED.iter().any(|u| u.eq_ignore_ascii_case(who.trim())));

        Ok(Contact {
            name: self.name.clone(),
            company: self.company.clone(),
            email: normalized.email,
            phone: self.phone.clone(),
            kind,
            source,
            notes: non_blank(self.notes.clone()),
            assigned_to,
        })
    }
}

// ==========================================
// Event
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct EventForm {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Start date is required"))]
    pub start_date: String,
    #[validate(length(min = 1, message = "End date is required"))]
    pub end_date: String,
    #[validate(length(min = 1, message = "Start time is required"))]
    pub start_time: String,
    #[validate(length(min = 1, message = "End time is required"))]
    pub end_time: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(length(min = 1, message = "Client is required"))]
    pub client: String,
    pub status: String,
    pub priority: String,
    #[validate(length(min = 1, message = "Number of technicians is required"))]
    pub team_members: String,
    #[validate(length(min = 1, message = "Number of equipments is required"))]
    pub equipments: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

impl Default for EventForm {
    fn default() -> Self {
        EventForm::blank(Local::now().date_naive())
    }
}

impl EventForm {
    /// A fresh form scheduled on `today`, 09:00 to 18:00.
    pub fn blank(today: NaiveDate) -> Self {
        let day = today.format(DATE_INPUT).to_string();
        EventForm {
            title: String::new(),
            start_date: day.clone(),
            end_date: day,
            start_time: "09:00".into(),
            end_time: "18:00".into(),
            location: String::new(),
            client: String::new(),
            status: EventStatus::Planned.code().into(),
            priority: Priority::Medium.code().into(),
            team_members: "1".into(),
            equipments: "0".into(),
            description: String::new(),
        }
    }

    /// Pre-fills an edit form from a stored event.
    pub fn from_event(event: &Event) -> Self {
        EventForm {
            title: event.title.clone(),
            start_date: event.start_date.format(DATE_INPUT).to_string(),
            end_date: event.end_date.format(DATE_INPUT).to_string(),
            start_time: event.start_time.format(TIME_INPUT).to_string(),
            end_time: event.end_time.format(TIME_INPUT).to_string(),
            location: event.location.clone(),
            client: event.client.clone(),
            status: event.status.code().into(),
            priority: event.priority.code().into(),
            team_members: event.team_members.to_string(),
            equipments: event.equipments.to_string(),
            description: event.description.clone(),
        }
    }

    /// Validates an edit. Every form field is replaced; reservations and
    /// technician assignments are left as they are.
    pub fn submit_edit(&self) -> Result<EventPatch, FieldErrors> {
        self.submit().map(EventPatch::from)
    }
}

impl Form for EventForm {
    type Output = Event;

    fn submit(&self) -> Result<Event, FieldErrors> {
        let mut errors = FieldErrors::from_validation(self.validate());
        let start_date = errors.check("startDate", parse_date(&self.start_date));
        let end_date = errors.check("endDate", parse_date(&self.end_date));
        let start_time = errors.check("startTime", parse_time(&self.start_time));
        let end_time = errors.check("endTime", parse_time(&self.end_time));
        let status = errors.check("status", EventStatus::parse_choice(&self.status));
        let priority = if self.priority.trim().is_empty() {
            Some(Priority::default())
        } else {
            errors.check("priority", Priority::parse_choice(&self.priority))
        };
        let team_members = errors.check("teamMembers", parse_count(&self.team_members));
        let equipments = errors.check("equipments", parse_count(&self.equipments));

        let (
            Some(start_date),
            Some(end_date),
            Some(start_time),
            Some(end_time),
            Some(status),
            Some(priority),
            Some(team_members),
            Some(equipments),
            true,
        ) = (
            start_date,
            end_date,
            start_time,
            end_time,
            status,
            priority,
            team_members,
            equipments,
            errors.is_empty(),
        )
        else {
            return Err(errors);
        };

        Ok(Event {
            title: self.title.clone(),
            start_date,
            end_date,
            start_time,
            end_time,
            location: self.location.clone(),
            client: self.client.clone(),
            status,
            priority,
            team_members,
            equipments,
            description: self.description.clone(),
            reserved_materials: Vec::new(),
            assigned_technicians: Vec::new(),
        })
    }
}

// ==========================================
// Quote
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteForm {
    #[validate(length(min = 1, message = "Client is required"))]
    pub client: String,
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,
    #[validate(length(min = 1, message = "Amount is required"))]
    pub amount: String,
    pub advance_amount: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub payment_method: String,
    #[serde(deserialize_with = "empty_as_none")]
    pub client_phone: Option<String>,
    #[serde(deserialize_with = "empty_as_none")]
    #[validate(email(message = "Invalid email"))]
    pub client_email: Option<String>,
}

impl Default for QuoteForm {
    fn default() -> Self {
        QuoteForm::blank(Local::now().date_naive())
    }
}

impl QuoteForm {
    pub fn blank(today: NaiveDate) -> Self {
        QuoteForm {
            client: String::new(),
            date: today.format(DATE_INPUT).to_string(),
            amount: String::new(),
            advance_amount: "0".into(),
            description: String::new(),
            payment_method: PaymentMethod::default().code().into(),
            client_phone: None,
            client_email: None,
        }
    }

    /// Remaining balance and payment ratio as the form would show them while
    /// typing: only once both amounts parse.
    pub fn preview(&self) -> Option<(f64, Option<i64>)> {
        let amount = parse_amount(&self.amount).ok()?;
        let advance = parse_amount(&self.advance_amount).ok()?;
        Some((
            crate::derived::remaining(amount, advance),
            crate::derived::payment_ratio(amount, advance),
        ))
    }
}

impl Form for QuoteForm {
    type Output = Quote;

    fn submit(&self) -> Result<Quote, FieldErrors> {
        // "" for an optional email means "not given", not "malformed".
        let normalized = QuoteForm {
            client_phone: non_blank(self.client_phone.clone()),
            client_email: non_blank(self.client_email.clone()).map(|e| e.trim().to_string()),
            ..self.clone()
        };

        let mut errors = FieldErrors::from_validation(normalized.validate());
        let date = errors.check("date", parse_date(&normalized.date));
        let amount = errors.check("amount", parse_amount(&normalized.amount));
        let advance_amount = if normalized.advance_amount.trim().is_empty() {
            Some(0.0)
        } else {
            errors.check("advanceAmount", parse_amount(&normalized.advance_amount))
        };
        let payment_method = errors.check(
            "paymentMethod",
            PaymentMethod::parse_choice(&normalized.payment_method),
        );

        let (Some(date), Some(amount), Some(advance_amount), Some(payment_method), true) =
            (date, amount, advance_amount, payment_method, errors.is_empty())
        else {
            return Err(errors);
        };

        Ok(Quote {
            client: normalized.client,
            date,
            amount,
            advance_amount,
            description: normalized.description,
            payment_method,
            client_phone: normalized.client_phone,
            client_email: normalized.client_email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::PaymentStatus;
    use pretty_assertions::assert_eq;

    fn valid_contact() -> ContactForm {
        ContactForm {
            name: "Karim Idrissi".into(),
            company: "Idrissi Traiteur".into(),
            email: "karim@idrissi.ma".into(),
            phone: "+212 662 345 678".into(),
            kind: "client".into(),
            source: "Recommandation".into(),
            notes: Some(String::new()),
            assigned_to: Some("non-attribue".into()),
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn contact_form_produces_typed_record() {
        let contact = valid_contact().submit().unwrap();
        assert_eq!(contact.kind, ContactKind::Client);
        assert_eq!(contact.source, ContactSource::Referral);
        assert_eq!(contact.notes, None);
        assert_eq!(contact.assigned_to, None);
    }

    #[test]
    fn short_name_is_rejected_on_name() {
        let form = ContactForm {
            name: "K".into(),
            ..valid_contact()
        };
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get("name"), Some("Name must be at least 2 characters"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn email_shape_is_checked() {
        let ok = ContactForm {
            email: "sara.bennani@example.com".into(),
            ..valid_contact()
        };
        assert!(ok.submit().is_ok());

        for bad in ["sara", "sara@", "@example.com", "sara bennani@example.com"] {
            let form = ContactForm {
                email: bad.into(),
                ..valid_contact()
            };
            let errors = form.submit().unwrap_err();
            assert_eq!(errors.get("email"), Some("Please enter a valid email address"), "{bad}");
        }
    }

    #[test]
    fn padded_email_is_trimmed_before_the_check() {
        let form = ContactForm {
            email: "  ali@acme.ma ".into(),
            ..valid_contact()
        };
        assert_eq!(form.submit().unwrap().email, "ali@acme.ma");

        let quote = QuoteForm {
            client: "ACME".into(),
            date: "2025-08-05".into(),
            amount: "1000".into(),
            description: "Sound system".into(),
            client_email: Some("  ali@acme.ma ".into()),
            ..QuoteForm::default()
        };
        assert_eq!(quote.submit().unwrap().client_email.as_deref(), Some("ali@acme.ma"));
    }

    #[test]
    fn every_failing_field_is_reported() {
        let errors = ContactForm::default().submit().unwrap_err();
        for field in ["name", "company", "email", "phone"] {
            assert!(errors.contains(field), "missing error for {field}");
        }
        assert!(!errors.contains("type"));
    }

    #[test]
    fn unknown_source_is_rejected() {
        let form = ContactForm {
            source: "TikTok".into(),
            ..valid_contact()
        };
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get("source"), Some("unknown contact source `TikTok`"));
    }

    #[test]
    fn contact_from_field_map() {
        let map = fields(&[
            ("name", "Sara Bennani"),
            ("company", "Bennani & Co"),
            ("email", "sara@bennani.ma"),
            ("phone", "0661234567"),
            ("type", "fournisseur"),
            ("assignedTo", "sara"),
        ]);
        let contact = submit_fields::<ContactForm>(&map).unwrap();
        assert_eq!(contact.kind, ContactKind::Supplier);
        assert_eq!(contact.source, ContactSource::Website);
        assert_eq!(contact.assigned_to.as_deref(), Some("sara"));
    }

    #[test]
    fn event_form_defaults_to_a_working_day() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap();
        let form = EventForm {
            title: "Wedding reception".into(),
            location: "Palais Namaskar".into(),
            client: "Famille Alaoui".into(),
            description: "Full sound and lighting".into(),
            ..EventForm::blank(today)
        };
        let event = form.submit().unwrap();
        assert_eq!(event.time_range(), "09:00 - 18:00");
        assert_eq!(event.date_range(), "5 August 2025");
        assert_eq!(event.status, EventStatus::Planned);
        assert_eq!(event.priority, Priority::Medium);
        assert_eq!((event.team_members, event.equipments), (1, 0));
        assert!(event.reserved_materials.is_empty());
    }

    #[test]
    fn event_form_reports_shape_errors() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap();
        let form = EventForm {
            title: "Gala".into(),
            location: "Casablanca".into(),
            client: "ABC".into(),
            description: "Annual gala".into(),
            start_date: "05/08/2025".into(),
            end_time: "25:00".into(),
            team_members: "three".into(),
            status: "cancelled".into(),
            ..EventForm::blank(today)
        };
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get("startDate"), Some("Use the YYYY-MM-DD format"));
        assert_eq!(errors.get("endTime"), Some("Use the HH:MM format"));
        assert_eq!(errors.get("teamMembers"), Some("Must be a whole number"));
        assert_eq!(errors.get("status"), Some("unknown event status `cancelled`"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn required_message_wins_over_shape_message() {
        let form = EventForm {
            title: "Gala".into(),
            start_time: String::new(),
            ..EventForm::default()
        };
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get("startTime"), Some("Start time is required"));
    }

    #[test]
    fn edit_form_round_trips_stored_event() {
        let today = NaiveDate::from_ymd_opt(2025, 9, 12).unwrap();
        let form = EventForm {
            title: "Conference".into(),
            location: "Hyatt Regency".into(),
            client: "Event Pro Services".into(),
            description: "Two-day conference".into(),
            end_date: "2025-09-13".into(),
            start_time: "08:30".into(),
            status: "confirmé".into(),
            ..EventForm::blank(today)
        };
        let event = form.submit().unwrap();
        let prefilled = EventForm::from_event(&event);
        assert_eq!(prefilled.status, "confirmed");
        assert_eq!(prefilled.start_time, "08:30");
        assert_eq!(prefilled.submit().unwrap(), event);
    }

    #[test]
    fn quote_form_derives_status_after_submit() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap();
        let form = QuoteForm {
            client: "Société ABC".into(),
            amount: "10000".into(),
            advance_amount: "5000".into(),
            description: "Stage and screens".into(),
            client_email: Some(String::new()),
            ..QuoteForm::blank(today)
        };
        assert_eq!(form.preview(), Some((5000.0, Some(50))));

        let quote = form.submit().unwrap();
        assert_eq!(quote.payment_status(), PaymentStatus::Partial);
        assert_eq!(quote.payment_method, PaymentMethod::BankTransfer);
        assert_eq!(quote.client_email, None);
    }

    #[test]
    fn quote_form_checks_amounts_and_email() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 5).unwrap();
        let form = QuoteForm {
            client: "Hotel Marrakech".into(),
            amount: "douze mille".into(),
            advance_amount: "NaN".into(),
            description: "Lighting".into(),
            client_email: Some("not-an-email".into()),
            ..QuoteForm::blank(today)
        };
        let errors = form.submit().unwrap_err();
        assert_eq!(errors.get("amount"), Some("Must be a number"));
        assert_eq!(errors.get("advanceAmount"), Some("Must be a number"));
        assert_eq!(errors.get("clientEmail"), Some("Invalid email"));
    }

    #[test]
    fn blank_advance_counts_as_zero() {
        let map = fields(&[
            ("client", "Event Pro Services"),
            ("date", "2025-08-02"),
            ("amount", "8500"),
            ("advanceAmount", ""),
            ("description", "Stage rental"),
            ("paymentMethod", "Chèque"),
        ]);
        let quote = submit_fields::<QuoteForm>(&map).unwrap();
        assert_eq!(quote.advance_amount, 0.0);
        assert_eq!(quote.payment_status(), PaymentStatus::Pending);
        assert_eq!(quote.payment_method, PaymentMethod::Cheque);
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(camel_case("client_email"), "clientEmail");
        assert_eq!(camel_case("name"), "name");
        assert_eq!(camel_case("advanceAmount"), "advanceAmount");
    }
}
