mod prompts;
mod tables;

use anyhow::{Context as _, Result, anyhow};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Select, Text};
use std::fmt;
use tracing_subscriber::EnvFilter;

use opsboard::config::AppSettings;
use opsboard::derived;
use opsboard::document::{self, DocumentError, DocumentKind, QuoteDocument, TeraRenderer};
use opsboard::form::EventForm;
use opsboard::model::QuotePatch;
use opsboard::report;
use opsboard::sample::{self, Technician};
use opsboard::{EntityId, StoreError, Workspace};

// ==========================================
// Structs & Enums
// ==========================================

#[derive(Parser)]
#[command(name = "opsboard", about = "Contacts, events and quotes for a small events business")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive session (default)
    Session {
        /// Start with the sample workspace instead of an empty one
        #[arg(long)]
        sample: bool,
    },
    /// Print the sample workspace and its summary
    Demo,
    /// Show payment status for an amount and an advance
    Status {
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        advance: f64,
    },
    /// Configure output folder, currency and logging
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    AddContact,
    ListContacts,
    AddEvent,
    EditEvent,
    AssignTechnicians,
    ReserveMaterials,
    ListEvents,
    EventDetails,
    AddQuote,
    RecordPayment,
    ListQuotes,
    RenderDocument,
    Summary,
    Quit,
}

impl MenuAction {
    const ALL: [MenuAction; 14] = [
        MenuAction::AddContact,
        MenuAction::ListContacts,
        MenuAction::AddEvent,
        MenuAction::EditEvent,
        MenuAction::AssignTechnicians,
        MenuAction::ReserveMaterials,
        MenuAction::ListEvents,
        MenuAction::EventDetails,
        MenuAction::AddQuote,
        MenuAction::RecordPayment,
        MenuAction::ListQuotes,
        MenuAction::RenderDocument,
        MenuAction::Summary,
        MenuAction::Quit,
    ];
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MenuAction::AddContact => "➕ Add contact",
            MenuAction::ListContacts => "📇 List / search contacts",
            MenuAction::AddEvent => "➕ New event",
            MenuAction::EditEvent => "✏️  Edit event",
            MenuAction::AssignTechnicians => "👷 Assign technicians",
            MenuAction::ReserveMaterials => "📦 Reserve materials",
            MenuAction::ListEvents => "📅 List / search events",
            MenuAction::EventDetails => "🔎 Event details",
            MenuAction::AddQuote => "➕ New quote",
            MenuAction::RecordPayment => "💰 Record advance payment",
            MenuAction::ListQuotes => "🧾 List / search quotes",
            MenuAction::RenderDocument => "📄 Render quote or invoice",
            MenuAction::Summary => "📊 Summary",
            MenuAction::Quit => "🚪 Quit",
        };
        f.write_str(label)
    }
}

/// What a session handler needs besides the workspace.
struct Session {
    workspace: Workspace,
    settings: AppSettings,
    roster: Vec<Technician>,
}

// ==========================================
// Main Function
// ==========================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match AppSettings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("⚠️  Could not load settings ({}), using defaults.", e);
            AppSettings::default()
        }
    };
    init_logging(settings.log_filter.as_deref())?;

    match cli.command.unwrap_or(Commands::Session { sample: false }) {
        Commands::Session { sample: seeded } => {
            let workspace = if seeded {
                sample::workspace()
            } else {
                Workspace::new()
            };
            run_session(Session {
                workspace,
                settings,
                roster: sample::technicians(),
            })
        }
        Commands::Demo => {
            run_demo(&settings);
            Ok(())
        }
        Commands::Status { amount, advance } => {
            show_status(amount, advance, &settings.currency);
            Ok(())
        }
        Commands::Config => setup_config_wizard(settings),
    }
}

/// Logs go to stderr so they never interleave with prompts on stdout.
fn init_logging(configured: Option<&str>) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(configured.unwrap_or("warn"))
            .context("invalid log filter in settings")?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {}", e))
}

// ==========================================
// 1. Interactive Session
// ==========================================

fn is_cancel(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<InquireError>(), Some(InquireError::OperationCanceled))
}

fn is_interrupt(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<InquireError>(), Some(InquireError::OperationInterrupted))
}

fn run_session(mut session: Session) -> Result<()> {
    println!("👋 Session started. Data lives in memory until you quit.");

    loop {
        let action = match Select::new("What would you like to do?", MenuAction::ALL.to_vec())
            .with_page_size(14)
            .prompt()
        {
            Ok(action) => action,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e.into()),
        };

        if action == MenuAction::Quit {
            break;
        }

        if let Err(err) = dispatch(&mut session, action) {
            if is_interrupt(&err) {
                break;
            } else if is_cancel(&err) {
                println!("↩️  Cancelled.");
            } else if let Some(store_err) = err.downcast_ref::<StoreError>() {
                println!("❌ {}", store_err);
            } else if let Some(doc_err) = err.downcast_ref::<DocumentError>() {
                println!("❌ {}", doc_err);
            } else {
                return Err(err);
            }
        }
    }

    println!("👋 Bye. Nothing was saved.");
    Ok(())
}

fn dispatch(session: &mut Session, action: MenuAction) -> Result<()> {
    match action {
        MenuAction::AddContact => add_contact(session),
        MenuAction::ListContacts => list_contacts(session),
        MenuAction::AddEvent => add_event(session),
        MenuAction::EditEvent => edit_event(session),
        MenuAction::AssignTechnicians => assign_technicians(session),
        MenuAction::ReserveMaterials => reserve_materials(session),
        MenuAction::ListEvents => list_events(session),
        MenuAction::EventDetails => show_event(session),
        MenuAction::AddQuote => add_quote(session),
        MenuAction::RecordPayment => record_payment(session),
        MenuAction::ListQuotes => list_quotes(session),
        MenuAction::RenderDocument => render_document(session),
        MenuAction::Summary => {
            print_summary(&session.workspace, &session.settings.currency);
            Ok(())
        }
        MenuAction::Quit => Ok(()),
    }
}

fn search_term(what: &str) -> Result<String> {
    Ok(Text::new(&format!("Search {} (leave empty to list all):", what)).prompt()?)
}

// ==========================================
// 2. Contacts
// ==========================================

const ASSIGNEES: &[&str] = &["hamid", "sara", "karim"];

fn add_contact(session: &mut Session) -> Result<()> {
    let contact = prompts::contact_form(ASSIGNEES)?;
    let record = session.workspace.contacts.create(contact);
    println!("✅ Contact added: {} (#{})", record.data.name, record.id);
    Ok(())
}

fn list_contacts(session: &mut Session) -> Result<()> {
    let term = search_term("contacts")?;
    let hits = session.workspace.contacts.search(&term);
    if hits.is_empty() {
        println!("No contacts found.");
    } else {
        println!("{}", tables::contacts(&hits));
    }
    Ok(())
}

// ==========================================
// 3. Events
// ==========================================

fn describe_event(record: &opsboard::Record<opsboard::model::Event>) -> String {
    format!(
        "#{} {} | {} | {}",
        record.id,
        record.data.title,
        record.data.date_range(),
        record.data.client
    )
}

fn pick_event(session: &Session, message: &str) -> Result<Option<EntityId>> {
    let picked = prompts::pick_record(message, session.workspace.events.list(), describe_event)?;
    if picked.is_none() {
        println!("No events yet.");
    }
    Ok(picked)
}

fn add_event(session: &mut Session) -> Result<()> {
    println!("\n--- New Event ---");
    let event = prompts::event_form(EventForm::default())?;
    let record = session.workspace.events.create(event);
    println!("✅ Event created: \"{}\" on {}", record.data.title, record.data.date_range());
    Ok(())
}

fn edit_event(session: &mut Session) -> Result<()> {
    let Some(id) = pick_event(session, "Event to edit:")? else {
        return Ok(());
    };
    let current = session
        .workspace
        .events
        .get(id)
        .ok_or(StoreError::NotFound { kind: "event", id })?;

    println!("\n--- Edit Event #{} ---", id);
    let edited = prompts::event_form(EventForm::from_event(&current.data))?;
    let record = session.workspace.events.update(id, edited.into())?;
    println!("✅ Event updated: \"{}\"", record.data.title);
    Ok(())
}

fn assign_technicians(session: &mut Session) -> Result<()> {
    let Some(id) = pick_event(session, "Event to staff:")? else {
        return Ok(());
    };
    let assigned = session
        .workspace
        .events
        .get(id)
        .map(|r| r.data.assigned_technicians.clone())
        .unwrap_or_default();

    let picked = prompts::technicians(&session.roster, &assigned)?;
    let record = session.workspace.events.assign_technicians(id, picked)?;
    println!(
        "✅ {} technician(s) assigned to \"{}\"",
        record.data.assigned_technicians.len(),
        record.data.title
    );
    Ok(())
}

fn reserve_materials(session: &mut Session) -> Result<()> {
    let Some(id) = pick_event(session, "Event to equip:")? else {
        return Ok(());
    };
    let lines = prompts::materials()?;
    let record = session.workspace.events.reserve_materials(id, lines)?;
    println!("✅ Reservation saved for \"{}\"", record.data.title);
    if !record.data.reserved_materials.is_empty() {
        println!("{}", tables::materials(&record.data));
    }
    Ok(())
}

fn list_events(session: &mut Session) -> Result<()> {
    let term = search_term("events")?;
    let hits = session.workspace.events.search(&term);
    if hits.is_empty() {
        println!("No events found.");
    } else {
        println!("{}", tables::events(&hits, &session.roster));
    }
    Ok(())
}

fn show_event(session: &mut Session) -> Result<()> {
    let Some(id) = pick_event(session, "Event:")? else {
        return Ok(());
    };
    let record = session
        .workspace
        .events
        .get(id)
        .ok_or(StoreError::NotFound { kind: "event", id })?;

    println!("{}", tables::event_detail(record, &session.roster));
    if record.data.reserved_materials.is_empty() {
        println!("No materials reserved.");
    } else {
        println!("{}", tables::materials(&record.data));
    }
    Ok(())
}

// ==========================================
// 4. Quotes & Documents
// ==========================================

fn describe_quote(record: &opsboard::Record<opsboard::model::Quote>) -> String {
    format!(
        "{} {} | {:.2} | {}",
        DocumentKind::Quote.number(record.id),
        record.data.client,
        record.data.amount,
        record.data.payment_status()
    )
}

fn pick_quote(session: &Session, message: &str) -> Result<Option<EntityId>> {
    let picked = prompts::pick_record(message, session.workspace.quotes.list(), describe_quote)?;
    if picked.is_none() {
        println!("No quotes yet.");
    }
    Ok(picked)
}

fn add_quote(session: &mut Session) -> Result<()> {
    let quote = prompts::quote_form(&session.settings.currency)?;
    let record = session.workspace.quotes.create(quote);
    println!(
        "✅ Quote {} created for {}",
        DocumentKind::Quote.number(record.id),
        record.data.client
    );

    if prompts::confirm("Render a document for this quote now?", false)? {
        write_quote_document(session, record.id, DocumentKind::Quote)?;
    }
    Ok(())
}

fn record_payment(session: &mut Session) -> Result<()> {
    let Some(id) = pick_quote(session, "Quote:")? else {
        return Ok(());
    };
    let current = session
        .workspace
        .quotes
        .get(id)
        .map(|r| r.data.advance_amount)
        .unwrap_or_default();

    let advance = prompts::advance(current, &session.settings.currency)?;
    let record = session
        .workspace
        .quotes
        .update(
            id,
            QuotePatch {
                advance_amount: Some(advance),
                ..Default::default()
            },
        )?;

    println!(
        "✅ {}: {} | remaining {}",
        DocumentKind::Quote.number(id),
        record.data.payment_status(),
        tables::money(record.data.remaining(), &session.settings.currency)
    );
    Ok(())
}

fn list_quotes(session: &mut Session) -> Result<()> {
    let term = search_term("quotes")?;
    let hits = session.workspace.quotes.search(&term);
    if hits.is_empty() {
        println!("No quotes found.");
    } else {
        println!("{}", tables::quotes(&hits, &session.settings.currency));
    }
    Ok(())
}

fn render_document(session: &mut Session) -> Result<()> {
    let Some(id) = pick_quote(session, "Quote to render:")? else {
        return Ok(());
    };
    let kind = Select::new("Document type:", DocumentKind::ALL.to_vec()).prompt()?;
    write_quote_document(session, id, kind)
}

fn write_quote_document(session: &Session, id: EntityId, kind: DocumentKind) -> Result<()> {
    let record = session
        .workspace
        .quotes
        .get(id)
        .ok_or(StoreError::NotFound { kind: "quote", id })?;
    let doc = QuoteDocument::from_quote(record, kind, &session.settings.currency);
    let renderer = TeraRenderer::new()?;
    let path = document::write_document(&session.settings.output_dir(), &doc, &renderer)?;
    println!("✅ {} {} written to {:?}", kind, doc.number, path);
    Ok(())
}

// ==========================================
// 5. Summary, Demo & Status
// ==========================================

fn print_summary(workspace: &Workspace, currency: &str) {
    if workspace.quotes.is_empty() {
        println!("No quotes to summarize.");
        return;
    }
    let summary = report::summarize(&workspace.quotes);
    let (by_status, by_client) = tables::summary(&summary, currency);

    println!("\n--- Quotes by Payment Status ---");
    println!("{by_status}");
    println!("\n--- Client Summary ---");
    println!("{by_client}");
}

fn run_demo(settings: &AppSettings) {
    let workspace = sample::workspace();
    let roster = sample::technicians();

    println!("\n--- Contacts ---");
    println!("{}", tables::contacts(&workspace.contacts.search("")));
    println!("\n--- Events ---");
    println!("{}", tables::events(&workspace.events.search(""), &roster));
    println!("\n--- Quotes ---");
    println!("{}", tables::quotes(&workspace.quotes.search(""), &settings.currency));
    print_summary(&workspace, &settings.currency);
}

fn show_status(amount: f64, advance: f64, currency: &str) {
    println!("Status:    {}", derived::payment_status(amount, advance));
    println!("Remaining: {}", tables::money(derived::remaining(amount, advance), currency));
    match derived::payment_ratio(amount, advance) {
        Some(ratio) => println!("Paid:      {}%", ratio),
        None => println!("Paid:      -"),
    }
}

// ==========================================
// 6. Config
// ==========================================

fn setup_config_wizard(current: AppSettings) -> Result<()> {
    println!("\n⚙️  --- Configuration Setup ---");

    let output_root = Text::new("Folder for rendered documents:")
        .with_default(&current.output_root)
        .prompt()?;
    let currency = Text::new("Currency:").with_default(&current.currency).prompt()?;
    let log_filter = Text::new("Log filter (e.g. info, opsboard=debug; empty for warn):")
        .with_initial_value(current.log_filter.as_deref().unwrap_or(""))
        .prompt()?;

    let settings = AppSettings {
        output_root,
        currency,
        log_filter: if log_filter.trim().is_empty() {
            None
        } else {
            Some(log_filter)
        },
    };
    let path = settings.save()?;
    println!("✅ Settings saved to {:?}", path);
    Ok(())
}
