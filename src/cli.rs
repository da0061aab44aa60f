//! Command-line interface: argument schema and command execution.

use std::io::{BufRead, Write};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use crate::{
    client::Transport,
    dashboard::{HotelOverview, LibraryDashboard},
    forms::{BookForm, BookingForm, GuestForm, LoanForm, MemberForm, RoomForm},
    lookups::{BookingChoices, LoanChoices},
    models::{Backend, Book, Booking, Guest, Loan, Member, Resource, ResourceKind, Room},
    shell::{AppShell, Modal, Section},
    views::{ListView, ViewState},
};

#[derive(Parser, Debug)]
#[command(name = "frontdesk-console")]
#[command(about = "Operator console for the library and hotel back ends")]
#[command(version)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Library statistics and API health
    Dashboard {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Hotel statistics and API health
    HotelOverview {
        #[arg(long)]
        json: bool,
    },

    /// Check both back ends
    Health,

    /// List one page of a resource
    List {
        /// books, members, loans, guests, rooms or bookings
        resource: ResourceKind,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Case-insensitive filter over the fetched page
        #[arg(long, short)]
        search: Option<String>,
        /// Show only rows with this status (rooms, bookings, loans)
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one record
    Show { resource: ResourceKind, id: String },

    /// Options offered by the loan or booking form
    Choices { resource: ResourceKind },

    /// Create a record from `--set field=value` pairs
    Create {
        resource: ResourceKind,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },

    /// Change fields of an existing record
    Update {
        resource: ResourceKind,
        id: String,
        #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
        fields: Vec<(String, String)>,
    },

    /// Delete a record after confirmation
    Delete {
        resource: ResourceKind,
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Mark a loan as returned today
    ReturnLoan { id: String },
}

/// Parse `field=value`; the value may itself contain `=`
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim().to_string(), value.to_string())),
        _ => Err(format!("expected FIELD=VALUE, got '{}'", raw)),
    }
}

/// Run `$body` with `$r` / `$f` aliased to the record and form types of `$kind`
macro_rules! for_kind {
    ($kind:expr, $r:ident, $f:ident => $body:expr) => {
        match $kind {
            ResourceKind::Books => {
                type $r = Book;
                type $f = BookForm;
                $body
            }
            ResourceKind::Members => {
                type $r = Member;
                type $f = MemberForm;
                $body
            }
            ResourceKind::Loans => {
                type $r = Loan;
                type $f = LoanForm;
                $body
            }
            ResourceKind::Guests => {
                type $r = Guest;
                type $f = GuestForm;
                $body
            }
            ResourceKind::Rooms => {
                type $r = Room;
                type $f = RoomForm;
                $body
            }
            ResourceKind::Bookings => {
                type $r = Booking;
                type $f = BookingForm;
                $body
            }
        }
    };
}

/// Executes commands against an [`AppShell`]
pub struct Console<T> {
    shell: AppShell<T>,
}

impl<T: Transport> Console<T> {
    pub fn new(shell: AppShell<T>) -> Self {
        Self { shell }
    }

    pub fn shell(&self) -> &AppShell<T> {
        &self.shell
    }

    pub async fn run<W: Write, I: BufRead>(
        &mut self,
        command: Command,
        out: &mut W,
        input: &mut I,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        tracing::debug!(?command, "Running command");
        match command {
            Command::Dashboard { json } => {
                self.shell.navigate(Section::Dashboard);
                let stats = LibraryDashboard::fetch(self.shell.services(), now).await;
                if json {
                    writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
                } else {
                    writeln!(out, "Library dashboard")?;
                    writeln!(out, "  Books:         {}", stats.total_books)?;
                    writeln!(out, "  Members:       {}", stats.total_members)?;
                    writeln!(out, "  Active loans:  {}", stats.active_loans)?;
                    writeln!(out, "  Overdue loans: {}", stats.overdue_loans)?;
                    writeln!(out, "  API:           {}", stats.health)?;
                }
            }
            Command::HotelOverview { json } => {
                let stats = HotelOverview::fetch(self.shell.services()).await;
                if json {
                    writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
                } else {
                    writeln!(out, "Hotel overview")?;
                    writeln!(out, "  Guests:          {}", stats.total_guests)?;
                    writeln!(out, "  Rooms available: {} / {}", stats.available_rooms, stats.total_rooms)?;
                    writeln!(out, "  Active bookings: {}", stats.active_bookings)?;
                    writeln!(out, "  API:             {}", stats.health)?;
                }
            }
            Command::Health => {
                for backend in [Backend::Library, Backend::Hotel] {
                    let status = self.shell.services().health(backend).await;
                    writeln!(out, "{:<8} {}", backend, status)?;
                }
            }
            Command::List {
                resource,
                page,
                search,
                status,
            } => {
                self.shell.navigate(Section::from(resource));
                let search = search.unwrap_or_default();
                if resource == ResourceKind::Bookings {
                    // Name the guest and room even when the back end sent bare ids
                    let choices = BookingChoices::fetch(self.shell.services()).await;
                    let view = self.shell.list_view::<Booking>().starting_at(page, &search);
                    self.list(view, status.as_deref(), out, |booking: &Booking| {
                        format!(
                            "  guest: {}, {}",
                            booking.guest_name(&choices.guests),
                            booking.room_label(&choices.rooms)
                        )
                    })
                    .await?
                } else {
                    for_kind!(resource, R, _F => {
                        let view = self.shell.list_view::<R>().starting_at(page, &search);
                        self.list(view, status.as_deref(), out, |_| String::new()).await?
                    })
                }
            }
            Command::Show { resource, id } => for_kind!(resource, R, _F => {
                let record = self.shell.services().resource::<R>().get(&id).await?;
                writeln!(out, "{}", record.summary())?;
                writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;
            }),
            Command::Choices { resource } => self.choices(resource, out).await?,
            Command::Create { resource, fields } => {
                self.shell.open_create(resource, now);
                self.submit(&fields, out, now).await?;
            }
            Command::Update { resource, id, fields } => for_kind!(resource, R, F => {
                let record = self.shell.services().resource::<R>().get(&id).await?;
                self.shell.open_edit::<F>(&record);
                self.submit(&fields, out, now).await?;
            }),
            Command::Delete { resource, id, yes } => for_kind!(resource, R, _F => {
                let service = self.shell.services().resource::<R>();
                let record = service.get(&id).await?;
                if !yes && !confirm(&format!("Delete {} {}?", resource.label(), record.summary()), out, input)? {
                    writeln!(out, "Cancelled")?;
                    return Ok(());
                }
                self.shell.delete::<R>(&id).await?;
                writeln!(out, "Deleted {} {}", resource.label(), id)?;
            }),
            Command::ReturnLoan { id } => {
                let loan = self.shell.return_loan(&id, now).await?;
                writeln!(out, "Returned: {}", loan.summary())?;
            }
        }
        Ok(())
    }

    async fn list<R: Resource, W: Write>(
        &self,
        mut view: ListView<R, T>,
        status: Option<&str>,
        out: &mut W,
        extra: impl Fn(&R) -> String,
    ) -> anyhow::Result<()> {
        view.set_status_filter(status);
        view.load().await;
        if let ViewState::Failed(message) = view.state() {
            bail!("{}", message);
        }

        let rows = view.visible_rows();
        if rows.is_empty() {
            writeln!(out, "No {} found", R::KIND)?;
        }
        for row in rows {
            writeln!(out, "{:<26} {}{}", row.id(), row.summary(), extra(row))?;
        }
        writeln!(out, "Page {} of {} ({} total)", view.page(), view.pages(), view.total())?;
        Ok(())
    }

    async fn choices<W: Write>(&self, resource: ResourceKind, out: &mut W) -> anyhow::Result<()> {
        match resource {
            ResourceKind::Loans => {
                let choices = LoanChoices::fetch(self.shell.services()).await;
                writeln!(out, "Books:")?;
                for book in &choices.books {
                    writeln!(out, "  {:<26} {} ({} available)", book.id, book.title, book.copies)?;
                }
                writeln!(out, "Members:")?;
                for member in &choices.members {
                    writeln!(out, "  {:<26} {} <{}>", member.id, member.name, member.email)?;
                }
            }
            ResourceKind::Bookings => {
                let choices = BookingChoices::fetch(self.shell.services()).await;
                writeln!(out, "Guests:")?;
                for guest in &choices.guests {
                    writeln!(out, "  {:<26} {} <{}>", guest.id, guest.name, guest.email)?;
                }
                writeln!(out, "Rooms:")?;
                for room in &choices.rooms {
                    writeln!(out, "  {:<26} Room {} ({}, ${})", room.id, room.number, room.room_type, room.price)?;
                }
            }
            other => bail!("{} have no form choices; try loans or bookings", other),
        }
        Ok(())
    }

    /// Fill the open modal from `fields` and submit it
    async fn submit<W: Write>(
        &mut self,
        fields: &[(String, String)],
        out: &mut W,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let modal = self.shell.modal_mut().context("no form is open")?;
        for (field, value) in fields {
            if let Err(e) = modal.set_field(field, value) {
                let known = modal.fields().join(", ");
                self.shell.close_modal();
                bail!("{} (fields: {})", e, known);
            }
        }
        let title = modal.title();

        if self.shell.submit_modal(now).await {
            writeln!(out, "{}: saved", title)?;
            return Ok(());
        }

        if let Some(modal) = self.shell.modal() {
            report_errors(modal, out)?;
        }
        self.shell.close_modal();
        bail!("{} failed", title)
    }
}

fn report_errors<W: Write>(modal: &Modal, out: &mut W) -> anyhow::Result<()> {
    for (field, message) in modal.errors().iter() {
        writeln!(out, "  {}: {}", field, message)?;
    }
    if let Some(message) = modal.submission_error() {
        writeln!(out, "  {}", message)?;
    }
    Ok(())
}

/// Ask a yes/no question; anything but `y` / `yes` is a no
fn confirm<W: Write, I: BufRead>(question: &str, out: &mut W, input: &mut I) -> anyhow::Result<bool> {
    write!(out, "{} [y/N] ", question)?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResponseShape;
    use crate::services::Services;
    use crate::testing::FakeBackend;
    use chrono::TimeZone;
    use serde_json::json;
    use std::io::Cursor;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap()
    }

    fn console(library: FakeBackend, hotel: FakeBackend) -> Console<FakeBackend> {
        let services = Services::new(library, ResponseShape::Strict, hotel, ResponseShape::Lenient);
        Console::new(AppShell::new(services, 10))
    }

    fn library() -> FakeBackend {
        FakeBackend::new()
            .with_collection(
                "books",
                vec![
                    json!({ "_id": "b1", "isbn": "9780553293357", "title": "Foundation", "author": "Isaac Asimov", "copies": 2 }),
                    json!({ "_id": "b2", "isbn": "9780441013593", "title": "Dune", "author": "Frank Herbert", "copies": 0 }),
                ],
            )
            .with_collection("members", Vec::new())
    }

    async fn run(console: &mut Console<FakeBackend>, args: &[&str], answer: &str) -> (anyhow::Result<()>, String) {
        let cli = Cli::try_parse_from(std::iter::once("frontdesk-console").chain(args.iter().copied())).unwrap();
        let mut out = Vec::new();
        let mut input = Cursor::new(answer.as_bytes().to_vec());
        let result = console.run(cli.command, &mut out, &mut input, now()).await;
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "frontdesk-console",
            "list",
            "rooms",
            "--page",
            "2",
            "--status",
            "available",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Command::List {
                resource: ResourceKind::Rooms,
                page: 2,
                search: None,
                status: Some("available".to_string()),
            }
        );

        let cli = Cli::try_parse_from(["frontdesk-console", "create", "book", "--set", "title=A=B"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Create { resource: ResourceKind::Books, ref fields } if fields == &[("title".to_string(), "A=B".to_string())]
        ));

        assert!(Cli::try_parse_from(["frontdesk-console", "list", "spaceships"]).is_err());
        assert!(parse_assignment("novalue").is_err());
    }

    #[tokio::test]
    async fn test_list_with_search() {
        let mut console = console(library(), FakeBackend::new());
        let (result, out) = run(&mut console, &["list", "books", "--search", "dune"], "").await;
        result.unwrap();
        assert!(out.contains("Dune"));
        assert!(!out.contains("Foundation"));
        assert!(out.contains("Page 1 of 1 (2 total)"));
    }

    #[tokio::test]
    async fn test_create_reports_field_errors() {
        let mut console = console(FakeBackend::new(), FakeBackend::new());
        let (result, out) = run(&mut console, &["create", "member", "--set", "name=A", "--set", "email=nope"], "").await;
        assert!(result.is_err());
        assert!(out.contains("name: Name must be at least 2 characters"));
        assert!(out.contains("email: Invalid email address"));
        assert!(console.shell().modal().is_none());
    }

    #[tokio::test]
    async fn test_create_and_unknown_field() {
        let mut console = console(library(), FakeBackend::new());
        let (result, out) = run(
            &mut console,
            &["create", "members", "--set", "name=Ada Lovelace", "--set", "email=ada@example.org"],
            "",
        )
        .await;
        result.unwrap();
        assert_eq!(out.trim(), "Add member: saved");

        let (result, _) = run(&mut console, &["create", "books", "--set", "publisher=Ace"], "").await;
        let message = result.unwrap_err().to_string();
        assert!(message.contains("publisher"));
        assert!(message.contains("isbn, title, author, copies"));
    }

    #[tokio::test]
    async fn test_delete_asks_first() {
        let backend = library();
        let mut console = console(backend, FakeBackend::new());

        let (result, out) = run(&mut console, &["delete", "books", "b2"], "n\n").await;
        result.unwrap();
        assert!(out.contains("Cancelled"));

        let (result, out) = run(&mut console, &["delete", "books", "b2"], "y\n").await;
        result.unwrap();
        assert!(out.contains("Deleted book b2"));
        assert_eq!(console.shell().bus().generation(ResourceKind::Books), 1);

        let (result, _) = run(&mut console, &["show", "books", "b2"], "").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_choices_only_for_loans_and_bookings() {
        let mut console = console(library(), FakeBackend::new());
        let (result, out) = run(&mut console, &["choices", "loans"], "").await;
        result.unwrap();
        assert!(out.contains("Foundation"));
        assert!(!out.contains("Dune"));

        let (result, _) = run(&mut console, &["choices", "rooms"], "").await;
        assert!(result.is_err());
    }
}
