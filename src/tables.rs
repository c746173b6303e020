use comfy_table::{Attribute, Cell, Color, Table};

use opsboard::PaymentStatus;
use opsboard::Record;
use opsboard::document::DocumentKind;
use opsboard::model::{Contact, Event, EventStatus, Quote};
use opsboard::report::{Summary, Totals};
use opsboard::sample::Technician;

const GREEN: Color = Color::Rgb {
    r: 4,
    g: 120,
    b: 87,
};
const RED: Color = Color::Rgb {
    r: 185,
    g: 28,
    b: 28,
};
const BLUE: Color = Color::Rgb {
    r: 30,
    g: 64,
    b: 175,
};
const AMBER: Color = Color::Rgb {
    r: 180,
    g: 83,
    b: 9,
};

pub fn money(value: f64, currency: &str) -> String {
    format!("{:.2} {}", value, currency)
}

fn header(table: &mut Table, titles: &[&str]) {
    table.set_header(titles.iter().map(|t| Cell::new(t).add_attribute(Attribute::Bold)));
}

fn event_status_cell(status: EventStatus) -> Cell {
    let color = match status {
        EventStatus::Confirmed => GREEN,
        EventStatus::Planned => BLUE,
        EventStatus::Pending => AMBER,
    };
    Cell::new(status).fg(color)
}

fn payment_status_cell(status: PaymentStatus) -> Cell {
    let color = match status {
        PaymentStatus::Pending => AMBER,
        PaymentStatus::Partial => BLUE,
        PaymentStatus::Paid => GREEN,
    };
    Cell::new(status).fg(color)
}

fn remaining_cell(remaining: f64, currency: &str) -> Cell {
    let cell = Cell::new(money(remaining, currency));
    if remaining > 0.0 { cell.fg(RED) } else { cell }
}

pub fn contacts(records: &[&Record<Contact>]) -> Table {
    let mut table = Table::new();
    header(
        &mut table,
        &["#", "Name", "Company", "Email", "Phone", "Type", "Source", "Assigned to"],
    );
    for record in records {
        let c = &record.data;
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(&c.name),
            Cell::new(&c.company),
            Cell::new(&c.email),
            Cell::new(&c.phone),
            Cell::new(c.kind),
            Cell::new(c.source),
            Cell::new(c.assigned_to.as_deref().unwrap_or("-")),
        ]);
    }
    table
}

fn technician_names(ids: &[u64], roster: &[Technician]) -> String {
    if ids.is_empty() {
        return "-".to_string();
    }
    ids.iter()
        .map(|id| {
            roster
                .iter()
                .find(|t| t.id == *id)
                .map(|t| t.name.to_string())
                .unwrap_or_else(|| format!("#{}", id))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn events(records: &[&Record<Event>], roster: &[Technician]) -> Table {
    let mut table = Table::new();
    header(
        &mut table,
        &[
            "#",
            "Title",
            "Dates",
            "Time",
            "Location",
            "Client",
            "Status",
            "Priority",
            "Team",
            "Equip.",
            "Technicians",
            "Materials",
        ],
    );
    for record in records {
        let e = &record.data;
        let materials: u32 = e.reserved_materials.iter().map(|m| m.quantity).sum();
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(&e.title),
            Cell::new(e.date_range()),
            Cell::new(e.time_range()),
            Cell::new(&e.location),
            Cell::new(&e.client),
            event_status_cell(e.status),
            Cell::new(e.priority),
            Cell::new(e.team_members),
            Cell::new(e.equipments),
            Cell::new(technician_names(&e.assigned_technicians, roster)),
            Cell::new(if materials == 0 {
                "-".to_string()
            } else {
                format!("{} items", materials)
            }),
        ]);
    }
    table
}

/// Field / value table for one event.
pub fn event_detail(record: &Record<Event>, roster: &[Technician]) -> Table {
    let e = &record.data;
    let mut table = Table::new();
    header(&mut table, &["Field", "Value"]);
    let rows = [
        ("Event", format!("#{} {}", record.id, e.title)),
        ("Dates", e.date_range()),
        ("Time", e.time_range()),
        ("Location", e.location.clone()),
        ("Client", e.client.clone()),
        ("Status", e.status.to_string()),
        ("Priority", e.priority.to_string()),
        ("Technicians needed", e.team_members.to_string()),
        ("Equipments", e.equipments.to_string()),
        ("Assigned", technician_names(&e.assigned_technicians, roster)),
        ("Description", e.description.clone()),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    table
}

pub fn materials(event: &Event) -> Table {
    let mut table = Table::new();
    header(&mut table, &["Product", "Quantity"]);
    for line in &event.reserved_materials {
        table.add_row(vec![Cell::new(&line.product_name), Cell::new(line.quantity)]);
    }
    table
}

pub fn quotes(records: &[&Record<Quote>], currency: &str) -> Table {
    let mut table = Table::new();
    header(
        &mut table,
        &[
            "Number",
            "Client",
            "Date",
            "Amount",
            "Advance",
            "Remaining",
            "Paid",
            "Method",
            "Status",
        ],
    );
    for record in records {
        let q = &record.data;
        table.add_row(vec![
            Cell::new(DocumentKind::Quote.number(record.id)),
            Cell::new(&q.client),
            Cell::new(q.date.format("%d/%m/%Y")),
            Cell::new(money(q.amount, currency)),
            Cell::new(money(q.advance_amount, currency)),
            remaining_cell(q.remaining(), currency),
            Cell::new(q.payment_ratio().map(|r| format!("{}%", r)).unwrap_or_else(|| "-".into())),
            Cell::new(q.payment_method),
            payment_status_cell(q.payment_status()),
        ]);
    }
    table
}

fn totals_row(label: Cell, totals: &Totals, currency: &str) -> Vec<Cell> {
    vec![
        label,
        Cell::new(totals.count),
        Cell::new(money(totals.amount, currency)),
        Cell::new(money(totals.advance, currency)),
        remaining_cell(totals.remaining, currency),
    ]
}

/// Status table and client table.
pub fn summary(summary: &Summary, currency: &str) -> (Table, Table) {
    let mut by_status = Table::new();
    header(&mut by_status, &["Status", "Quotes", "Amount", "Received", "Remaining"]);
    for status in PaymentStatus::ALL {
        let totals = summary.by_status.get(&status).copied().unwrap_or_default();
        by_status.add_row(totals_row(payment_status_cell(status), &totals, currency));
    }
    let overall: Vec<Cell> = totals_row(Cell::new("Total"), &summary.overall, currency)
        .into_iter()
        .map(|cell| cell.add_attribute(Attribute::Bold))
        .collect();
    by_status.add_row(overall);

    let mut by_client = Table::new();
    header(&mut by_client, &["Client", "Quotes", "Amount", "Received", "Remaining"]);
    for (client, totals) in &summary.by_client {
        by_client.add_row(totals_row(Cell::new(client), totals, currency));
    }

    (by_status, by_client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsboard::sample;

    #[test]
    fn event_detail_names_staff_and_lists_materials() {
        let ws = sample::workspace();
        let gala = ws.events.get(1).unwrap();

        let detail = event_detail(gala, &sample::technicians()).to_string();
        assert!(detail.contains("#1 Annual gala"));
        assert!(detail.contains("Hamid Alaoui, Sara Bennani"));

        let lines = materials(&gala.data).to_string();
        assert!(lines.contains("Line array speaker"));
        assert!(lines.contains("Moving head"));
    }

    #[test]
    fn unknown_technician_falls_back_to_id() {
        assert_eq!(technician_names(&[9], &sample::technicians()), "#9");
        assert_eq!(technician_names(&[], &[]), "-");
    }
}
