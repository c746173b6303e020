use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::derived::{self, PaymentStatus};
use crate::document::DocumentKind;
use crate::store::{Entity, EntityId};

// ==========================================
// Choice lists
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownChoice {
    pub kind: &'static str,
    pub value: String,
}

/// A closed list of options offered by a form select.
///
/// Inputs are matched against the code, the label and any aliases, ignoring
/// case. Aliases carry the French labels ("planifié", "Virement").
pub trait Choice: Copy + Sized + 'static {
    const KIND: &'static str;
    const ALL: &'static [Self];

    fn code(self) -> &'static str;
    fn label(self) -> &'static str;

    fn aliases(self) -> &'static [&'static str] {
        &[]
    }

    fn parse_choice(input: &str) -> Result<Self, UnknownChoice> {
        let needle = input.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|choice| {
                std::iter::once(choice.code())
                    .chain(std::iter::once(choice.label()))
                    .chain(choice.aliases().iter().copied())
                    .any(|candidate| candidate.to_lowercase() == needle)
            })
            .ok_or_else(|| UnknownChoice {
                kind: Self::KIND,
                value: input.to_string(),
            })
    }
}

macro_rules! choice_traits {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as Choice>::parse_choice(s)
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContactKind {
    Prospect,
    Client,
    Partner,
    Supplier,
}

impl Choice for ContactKind {
    const KIND: &'static str = "contact type";
    const ALL: &'static [Self] = &[
        ContactKind::Prospect,
        ContactKind::Client,
        ContactKind::Partner,
        ContactKind::Supplier,
    ];

    fn code(self) -> &'static str {
        match self {
            ContactKind::Prospect => "prospect",
            ContactKind::Client => "client",
            ContactKind::Partner => "partner",
            ContactKind::Supplier => "supplier",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ContactKind::Prospect => "Prospect",
            ContactKind::Client => "Client",
            ContactKind::Partner => "Partner",
            ContactKind::Supplier => "Supplier",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            ContactKind::Partner => &["partenaire"],
            ContactKind::Supplier => &["fournisseur"],
            _ => &[],
        }
    }
}

choice_traits!(ContactKind);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContactSource {
    Website,
    #[serde(rename = "linkedin")]
    LinkedIn,
    Facebook,
    Instagram,
    Referral,
    TradeShow,
    Advertising,
}

impl Choice for ContactSource {
    const KIND: &'static str = "contact source";
    const ALL: &'static [Self] = &[
        ContactSource::Website,
        ContactSource::LinkedIn,
        ContactSource::Facebook,
        ContactSource::Instagram,
        ContactSource::Referral,
        ContactSource::TradeShow,
        ContactSource::Advertising,
    ];

    fn code(self) -> &'static str {
        match self {
            ContactSource::Website => "website",
            ContactSource::LinkedIn => "linkedin",
            ContactSource::Facebook => "facebook",
            ContactSource::Instagram => "instagram",
            ContactSource::Referral => "referral",
            ContactSource::TradeShow => "trade-show",
            ContactSource::Advertising => "advertising",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ContactSource::Website => "Website",
            ContactSource::LinkedIn => "LinkedIn",
            ContactSource::Facebook => "Facebook",
            ContactSource::Instagram => "Instagram",
            ContactSource::Referral => "Referral",
            ContactSource::TradeShow => "Trade show",
            ContactSource::Advertising => "Advertising",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            ContactSource::Website => &["site web"],
            ContactSource::Referral => &["recommandation"],
            ContactSource::TradeShow => &["salon professionnel"],
            ContactSource::Advertising => &["publicité"],
            _ => &[],
        }
    }
}

choice_traits!(ContactSource);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventStatus {
    Planned,
    Confirmed,
    Pending,
}

impl Choice for EventStatus {
    const KIND: &'static str = "event status";
    const ALL: &'static [Self] = &[
        EventStatus::Planned,
        EventStatus::Confirmed,
        EventStatus::Pending,
    ];

    fn code(self) -> &'static str {
        match self {
            EventStatus::Planned => "planned",
            EventStatus::Confirmed => "confirmed",
            EventStatus::Pending => "pending",
        }
    }

    fn label(self) -> &'static str {
        match self {
            EventStatus::Planned => "Planned",
            EventStatus::Confirmed => "Confirmed",
            EventStatus::Pending => "Pending",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            EventStatus::Planned => &["planifié"],
            EventStatus::Confirmed => &["confirmé"],
            EventStatus::Pending => &["en attente"],
        }
    }
}

choice_traits!(EventStatus);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Choice for Priority {
    const KIND: &'static str = "priority";
    const ALL: &'static [Self] = &[Priority::Low, Priority::Medium, Priority::High];

    fn code(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

choice_traits!(Priority);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    #[default]
    BankTransfer,
    Cheque,
    Cash,
    Card,
}

impl Choice for PaymentMethod {
    const KIND: &'static str = "payment method";
    const ALL: &'static [Self] = &[
        PaymentMethod::BankTransfer,
        PaymentMethod::Cheque,
        PaymentMethod::Cash,
        PaymentMethod::Card,
    ];

    fn code(self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "bank-transfer",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
        }
    }

    fn label(self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "Bank transfer",
            PaymentMethod::Cheque => "Cheque",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
        }
    }

    fn aliases(self) -> &'static [&'static str] {
        match self {
            PaymentMethod::BankTransfer => &["virement"],
            PaymentMethod::Cheque => &["chèque", "check"],
            PaymentMethod::Cash => &["espèces"],
            PaymentMethod::Card => &["carte bancaire"],
        }
    }
}

choice_traits!(PaymentMethod);

// ==========================================
// Contacts
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    pub kind: ContactKind,
    pub source: ContactSource,
    pub notes: Option<String>,
    pub assigned_to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub kind: Option<ContactKind>,
    pub source: Option<ContactSource>,
    pub notes: Option<Option<String>>,
    pub assigned_to: Option<Option<String>>,
}

impl Entity for Contact {
    const KIND: &'static str = "contact";
    type Patch = ContactPatch;

    fn apply(&mut self, patch: ContactPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(company) = patch.company {
            self.company = company;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(source) = patch.source {
            self.source = source;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
    }

    fn matches(&self, _id: EntityId, needle: &str) -> bool {
        [&self.name, &self.company, &self.email]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

// ==========================================
// Events
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedMaterial {
    pub product_name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub client: String,
    pub status: EventStatus,
    #[serde(default)]
    pub priority: Priority,
    pub team_members: u32,
    pub equipments: u32,
    pub description: String,
    #[serde(default)]
    pub reserved_materials: Vec<ReservedMaterial>,
    #[serde(default)]
    pub assigned_technicians: Vec<EntityId>,
}

impl Event {
    pub fn date_range(&self) -> String {
        derived::date_range(self.start_date, self.end_date)
    }

    pub fn time_range(&self) -> String {
        derived::time_range(self.start_time, self.end_time)
    }
}

/// Field-level changes to an event. Reservations and technician assignments
/// have their own store operations and are not part of a patch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location: Option<String>,
    pub client: Option<String>,
    pub status: Option<EventStatus>,
    pub priority: Option<Priority>,
    pub team_members: Option<u32>,
    pub equipments: Option<u32>,
    pub description: Option<String>,
}

/// An edit form replaces every form field at once.
impl From<Event> for EventPatch {
    fn from(event: Event) -> Self {
        EventPatch {
            title: Some(event.title),
            start_date: Some(event.start_date),
            end_date: Some(event.end_date),
            start_time: Some(event.start_time),
            end_time: Some(event.end_time),
            location: Some(event.location),
            client: Some(event.client),
            status: Some(event.status),
            priority: Some(event.priority),
            team_members: Some(event.team_members),
            equipments: Some(event.equipments),
            description: Some(event.description),
        }
    }
}

impl Entity for Event {
    const KIND: &'static str = "event";
    type Patch = EventPatch;

    fn apply(&mut self, patch: EventPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = end_time;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(client) = patch.client {
            self.client = client;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(team_members) = patch.team_members {
            self.team_members = team_members;
        }
        if let Some(equipments) = patch.equipments {
            self.equipments = equipments;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }

    fn matches(&self, _id: EntityId, needle: &str) -> bool {
        [&self.title, &self.client, &self.location, &self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

// ==========================================
// Quotes
// ==========================================

/// A quote or invoice. The payment status is never stored; it is derived
/// from `amount` and `advance_amount` each time it is asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub client: String,
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(default)]
    pub advance_amount: f64,
    pub description: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
}

impl Quote {
    pub fn payment_status(&self) -> PaymentStatus {
        derived::payment_status(self.amount, self.advance_amount)
    }

    pub fn remaining(&self) -> f64 {
        derived::remaining(self.amount, self.advance_amount)
    }

    pub fn payment_ratio(&self) -> Option<i64> {
        derived::payment_ratio(self.amount, self.advance_amount)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotePatch {
    pub client: Option<String>,
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub advance_amount: Option<f64>,
    pub description: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub client_phone: Option<Option<String>>,
    pub client_email: Option<Option<String>>,
}

impl Entity for Quote {
    const KIND: &'static str = "quote";
    type Patch = QuotePatch;

    fn apply(&mut self, patch: QuotePatch) {
        if let Some(client) = patch.client {
            self.client = client;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(advance_amount) = patch.advance_amount {
            self.advance_amount = advance_amount;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(payment_method) = patch.payment_method {
            self.payment_method = payment_method;
        }
        if let Some(client_phone) = patch.client_phone {
            self.client_phone = client_phone;
        }
        if let Some(client_email) = patch.client_email {
            self.client_email = client_email;
        }
    }

    fn matches(&self, id: EntityId, needle: &str) -> bool {
        DocumentKind::ALL
            .iter()
            .any(|kind| kind.number(id).to_lowercase().contains(needle))
            || self.client.to_lowercase().contains(needle)
            || self.payment_method.label().to_lowercase().contains(needle)
    }
}
