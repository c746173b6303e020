//! Seed data for demos and first runs.

use chrono::{NaiveDate, NaiveTime};

use crate::model::{
    Contact, ContactKind, ContactSource, Event, EventStatus, PaymentMethod, Priority, Quote,
    ReservedMaterial,
};
use crate::store::{EntityId, Workspace};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Technician {
    pub id: EntityId,
    pub name: &'static str,
    pub specialty: &'static str,
}

pub fn technicians() -> Vec<Technician> {
    vec![
        Technician {
            id: 1,
            name: "Hamid Alaoui",
            specialty: "Sound",
        },
        Technician {
            id: 2,
            name: "Sara Bennani",
            specialty: "Lighting",
        },
        Technician {
            id: 3,
            name: "Karim Idrissi",
            specialty: "Video",
        },
        Technician {
            id: 4,
            name: "Nadia Tazi",
            specialty: "Rigging",
        },
    ]
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

/// A workspace holding a few contacts, events and the recent invoices.
pub fn workspace() -> Workspace {
    let mut ws = Workspace::new();

    ws.contacts.create(Contact {
        name: "Youssef Amrani".into(),
        company: "Société ABC".into(),
        email: "y.amrani@abc.ma".into(),
        phone: "+212 661 234 567".into(),
        kind: ContactKind::Client,
        source: ContactSource::Referral,
        notes: Some("Prefers WhatsApp".into()),
        assigned_to: Some("hamid".into()),
    });
    ws.contacts.create(Contact {
        name: "Leila Chraibi".into(),
        company: "Event Pro Services".into(),
        email: "leila@eventpro.ma".into(),
        phone: "+212 662 345 678".into(),
        kind: ContactKind::Partner,
        source: ContactSource::TradeShow,
        notes: None,
        assigned_to: None,
    });
    ws.contacts.create(Contact {
        name: "Omar Fassi".into(),
        company: "Hotel Marrakech".into(),
        email: "events@hotelmarrakech.ma".into(),
        phone: "+212 663 456 789".into(),
        kind: ContactKind::Prospect,
        source: ContactSource::Website,
        notes: None,
        assigned_to: Some("sara".into()),
    });

    ws.events.create(Event {
        title: "Annual gala".into(),
        start_date: date(2025, 8, 14),
        end_date: date(2025, 8, 14),
        start_time: time(19, 0),
        end_time: time(23, 30),
        location: "Hotel Marrakech".into(),
        client: "Hotel Marrakech".into(),
        status: EventStatus::Confirmed,
        priority: Priority::High,
        team_members: 4,
        equipments: 12,
        description: "Stage, sound and lighting for 300 guests".into(),
        reserved_materials: vec![
            ReservedMaterial {
                product_name: "Line array speaker".into(),
                quantity: 8,
            },
            ReservedMaterial {
                product_name: "Moving head".into(),
                quantity: 16,
            },
        ],
        assigned_technicians: vec![1, 2],
    });
    ws.events.create(Event {
        title: "Product launch".into(),
        start_date: date(2025, 9, 3),
        end_date: date(2025, 9, 4),
        start_time: time(9, 0),
        end_time: time(18, 0),
        location: "Casablanca Marina".into(),
        client: "Société ABC".into(),
        status: EventStatus::Planned,
        priority: Priority::Medium,
        team_members: 2,
        equipments: 6,
        description: "LED screens and a small PA".into(),
        reserved_materials: Vec::new(),
        assigned_technicians: Vec::new(),
    });

    ws.quotes.create(Quote {
        client: "Société ABC".into(),
        date: date(2025, 8, 5),
        amount: 15000.0,
        advance_amount: 5000.0,
        description: "Product launch staging".into(),
        payment_method: PaymentMethod::BankTransfer,
        client_phone: Some("+212 661 234 567".into()),
        client_email: None,
    });
    ws.quotes.create(Quote {
        client: "Event Pro Services".into(),
        date: date(2025, 8, 2),
        amount: 8500.0,
        advance_amount: 3000.0,
        description: "Conference sound system".into(),
        payment_method: PaymentMethod::Cheque,
        client_phone: Some("+212 662 345 678".into()),
        client_email: None,
    });
    ws.quotes.create(Quote {
        client: "Hotel Marrakech".into(),
        date: date(2025, 7, 29),
        amount: 22000.0,
        advance_amount: 22000.0,
        description: "Annual gala production".into(),
        payment_method: PaymentMethod::Card,
        client_phone: Some("+212 663 456 789".into()),
        client_email: Some("events@hotelmarrakech.ma".into()),
    });

    ws
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::PaymentStatus;
    use std::collections::BTreeSet;

    #[test]
    fn seeded_workspace_is_consistent() {
        let ws = workspace();
        assert_eq!((ws.contacts.len(), ws.events.len(), ws.quotes.len()), (3, 2, 3));

        let gala = ws.events.get(1).unwrap();
        assert_eq!(gala.data.assigned_technicians, vec![1, 2]);
        assert_eq!(gala.data.reserved_materials.len(), 2);

        let statuses: Vec<_> = ws.quotes.list().iter().map(|r| r.data.payment_status()).collect();
        assert_eq!(
            statuses,
            vec![
                PaymentStatus::Partial,
                PaymentStatus::Partial,
                PaymentStatus::Paid
            ]
        );
    }

    #[test]
    fn technician_ids_are_unique() {
        let roster = technicians();
        let ids: BTreeSet<_> = roster.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), roster.len());
    }
}
