use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::collections::BTreeMap;

use opsboard::document::{DocumentKind, QuoteDocument};
use opsboard::form::{ContactForm, EventForm, QuoteForm, submit_fields};
use opsboard::model::{
    ContactPatch, Event, EventPatch, EventStatus, Priority, QuotePatch, ReservedMaterial,
};
use opsboard::{Form, PaymentStatus, StoreError, Workspace};

fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn event(title: &str) -> Event {
    Event {
        title: title.into(),
        start_date: NaiveDate::from_ymd_opt(2025, 8, 14).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 8, 14).unwrap(),
        start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        location: "Rabat".into(),
        client: "Société ABC".into(),
        status: EventStatus::Planned,
        priority: Priority::Medium,
        team_members: 1,
        equipments: 0,
        description: "Corporate seminar".into(),
        reserved_materials: Vec::new(),
        assigned_technicians: Vec::new(),
    }
}

fn quote_fields(amount: &str, advance: &str) -> BTreeMap<String, String> {
    fields(&[
        ("client", "Société ABC"),
        ("date", "2025-08-05"),
        ("amount", amount),
        ("advanceAmount", advance),
        ("description", "Product launch staging"),
        ("paymentMethod", "Virement"),
    ])
}

#[test]
fn half_paid_quote_is_partial() {
    let mut ws = Workspace::new();
    let quote = submit_fields::<QuoteForm>(&quote_fields("10000", "5000")).unwrap();
    let record = ws.quotes.create(quote);

    assert_eq!(record.data.payment_status(), PaymentStatus::Partial);
    assert_eq!(record.data.remaining(), 5000.0);
    assert_eq!(record.data.payment_ratio(), Some(50));
}

#[test]
fn fully_paid_quote_is_paid() {
    let mut ws = Workspace::new();
    let quote = submit_fields::<QuoteForm>(&quote_fields("15000", "15000")).unwrap();
    let record = ws.quotes.create(quote);

    assert_eq!(record.data.payment_status(), PaymentStatus::Paid);
    assert_eq!(record.data.remaining(), 0.0);
}

#[test]
fn over_payment_keeps_negative_balance() {
    let quote = submit_fields::<QuoteForm>(&quote_fields("8000", "9000")).unwrap();
    assert_eq!(quote.payment_status(), PaymentStatus::Paid);
    assert_eq!(quote.remaining(), -1000.0);
}

#[test]
fn status_is_rederived_after_every_update() {
    let mut ws = Workspace::new();
    let id = ws.quotes.create(submit_fields::<QuoteForm>(&quote_fields("12000", "0")).unwrap()).id;
    assert_eq!(ws.quotes.get(id).unwrap().data.payment_status(), PaymentStatus::Pending);

    ws.quotes
        .update(
            id,
            QuotePatch {
                advance_amount: Some(4000.0),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(ws.quotes.get(id).unwrap().data.payment_status(), PaymentStatus::Partial);

    ws.quotes
        .update(
            id,
            QuotePatch {
                amount: Some(4000.0),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(ws.quotes.get(id).unwrap().data.payment_status(), PaymentStatus::Paid);
}

#[test]
fn assigning_technicians_keeps_store_size() {
    let mut ws = Workspace::new();
    for i in 1..=8 {
        ws.events.create(event(&format!("Event {}", i)));
    }
    assert_eq!(ws.events.len(), 8);

    let record = ws.events.assign_technicians(7, vec![1, 2]).unwrap();

    assert_eq!(record.id, 7);
    assert_eq!(ws.events.get(7).unwrap().data.assigned_technicians, vec![1, 2]);
    assert_eq!(ws.events.len(), 8);
    assert!(ws.events.get(6).unwrap().data.assigned_technicians.is_empty());
}

#[test]
fn reassigning_overwrites_previous_list() {
    let mut ws = Workspace::new();
    let id = ws.events.create(event("Gala")).id;
    ws.events.assign_technicians(id, vec![1, 2, 3]).unwrap();
    ws.events.assign_technicians(id, vec![4]).unwrap();
    assert_eq!(ws.events.get(id).unwrap().data.assigned_technicians, vec![4]);
}

#[test]
fn reserving_materials_keeps_order() {
    let mut ws = Workspace::new();
    let id = ws.events.create(event("Gala")).id;
    let lines = vec![
        ReservedMaterial {
            product_name: "Moving head".into(),
            quantity: 16,
        },
        ReservedMaterial {
            product_name: "Line array speaker".into(),
            quantity: 8,
        },
    ];
    let record = ws.events.reserve_materials(id, lines.clone()).unwrap();
    assert_eq!(record.data.reserved_materials, lines);
}

#[rstest]
#[case::assign(true)]
#[case::reserve(false)]
fn event_mutations_on_missing_event_fail(#[case] assign: bool) {
    let mut ws = Workspace::new();
    ws.events.create(event("Gala"));
    let before = ws.events.list().to_vec();

    let err = if assign {
        ws.events.assign_technicians(99, vec![1]).unwrap_err()
    } else {
        ws.events.reserve_materials(99, Vec::new()).unwrap_err()
    };

    assert_eq!(
        err,
        StoreError::NotFound {
            kind: "event",
            id: 99
        }
    );
    assert_eq!(ws.events.list(), before.as_slice());
}

#[test]
fn update_of_missing_id_leaves_every_store_alone() {
    let mut ws = Workspace::new();
    ws.contacts.create(
        submit_fields::<ContactForm>(&fields(&[
            ("name", "Amina Tazi"),
            ("company", "Tazi Décor"),
            ("email", "amina@tazi.ma"),
            ("phone", "0661000000"),
        ]))
        .unwrap(),
    );
    let before = ws.contacts.list().to_vec();

    let err = ws
        .contacts
        .update(
            5,
            ContactPatch {
                company: Some("Other".into()),
                ..Default::default()
            },
        )
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound { id: 5, .. }));
    assert_eq!(ws.contacts.list(), before.as_slice());
}

#[test]
fn single_field_update_changes_only_that_field() {
    let mut ws = Workspace::new();
    let original = ws.events.create(event("Gala"));

    let patches = vec![
        EventPatch {
            title: Some("Gala dinner".into()),
            ..Default::default()
        },
        EventPatch {
            status: Some(EventStatus::Confirmed),
            ..Default::default()
        },
        EventPatch {
            team_members: Some(5),
            ..Default::default()
        },
    ];

    for patch in patches {
        let mut ws = ws.clone();
        let mut expected = original.clone();
        if let Some(title) = &patch.title {
            expected.data.title = title.clone();
        }
        if let Some(status) = patch.status {
            expected.data.status = status;
        }
        if let Some(team) = patch.team_members {
            expected.data.team_members = team;
        }
        let updated = ws.events.update(original.id, patch).unwrap();
        assert_eq!(updated, expected);
    }

    // the clones above never touched the original workspace
    assert_eq!(ws.events.get(original.id), Some(&original));
}

#[test]
fn editing_an_event_keeps_its_staff_and_materials() {
    let mut ws = Workspace::new();
    let id = ws.events.create(event("Gala")).id;
    ws.events.assign_technicians(id, vec![2]).unwrap();
    ws.events
        .reserve_materials(
            id,
            vec![ReservedMaterial {
                product_name: "Fog machine".into(),
                quantity: 2,
            }],
        )
        .unwrap();

    let mut form = EventForm::from_event(&ws.events.get(id).unwrap().data);
    form.end_date = "2025-08-15".into();
    form.location = "Agadir".into();
    let patch = form.submit_edit().unwrap();
    let record = ws.events.update(id, patch).unwrap();

    assert_eq!(record.data.location, "Agadir");
    assert_eq!(record.data.date_range(), "14 August 2025 - 15 August 2025");
    assert_eq!(record.data.assigned_technicians, vec![2]);
    assert_eq!(record.data.reserved_materials.len(), 1);
}

#[test]
fn search_events_across_text_fields() {
    let mut ws = Workspace::new();
    ws.events.create(event("Gala"));
    let mut wedding = event("Wedding");
    wedding.location = "Fès".into();
    wedding.description = "Traditional orchestra".into();
    ws.events.create(wedding);

    assert_eq!(ws.events.search("ORCHESTRA").len(), 1);
    assert_eq!(ws.events.search("société").len(), 2);
    assert_eq!(ws.events.search("").len(), 2);
}

#[test]
fn invalid_contact_blocks_creation() {
    let mut ws = Workspace::new();
    let result = submit_fields::<ContactForm>(&fields(&[
        ("name", "A"),
        ("company", "ACME"),
        ("email", "not-an-email"),
        ("phone", "0661000000"),
    ]));

    let errors = result.unwrap_err();
    assert!(errors.contains("name"));
    assert!(errors.contains("email"));
    assert!(ws.contacts.is_empty());

    // a corrected form goes through
    let form = ContactForm {
        name: "Ali".into(),
        company: "ACME".into(),
        email: "ali@acme.ma".into(),
        phone: "0661000000".into(),
        ..ContactForm::default()
    };
    ws.contacts.create(form.submit().unwrap());
    assert_eq!(ws.contacts.len(), 1);
}

#[test]
fn document_payload_matches_stored_quote() {
    let mut ws = Workspace::new();
    let record = ws
        .quotes
        .create(submit_fields::<QuoteForm>(&quote_fields("10000", "5000")).unwrap());

    let doc = QuoteDocument::from_quote(&record, DocumentKind::Quote, "MAD");

    assert_eq!(doc.number, "DEV-001");
    assert_eq!(doc.client, "Société ABC");
    assert_eq!(doc.subtotal, 10000);
    assert_eq!(doc.total, 10000);
    assert_eq!(doc.items.len(), 1);
    assert_eq!(doc.items[0].quantity, 1);
}

#[test]
fn quotes_are_found_by_quote_or_invoice_number() {
    let mut ws = Workspace::new();
    ws.quotes
        .create(submit_fields::<QuoteForm>(&quote_fields("10000", "5000")).unwrap());

    assert_eq!(ws.quotes.search("DEV-001").len(), 1);
    assert_eq!(ws.quotes.search("INV-001").len(), 1);
    assert!(ws.quotes.search("INV-002").is_empty());
}
