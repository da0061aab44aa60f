//! Application shell: navigation, the modal form, and refresh propagation.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    client::Transport,
    error::AppResult,
    forms::{BookForm, BookingForm, Form, GuestForm, LoanForm, MemberForm, RoomForm},
    models::{Deleted, Loan, Resource, ResourceKind},
    refresh::RefreshBus,
    services::Services,
    validation::FieldErrors,
    views::{FormView, ListView, SubmitOutcome},
};

/// Screen shown in the main area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Dashboard,
    Books,
    Members,
    Loans,
    Guests,
    Rooms,
    Bookings,
}

impl Section {
    pub fn resource(self) -> Option<ResourceKind> {
        match self {
            Section::Dashboard => None,
            Section::Books => Some(ResourceKind::Books),
            Section::Members => Some(ResourceKind::Members),
            Section::Loans => Some(ResourceKind::Loans),
            Section::Guests => Some(ResourceKind::Guests),
            Section::Rooms => Some(ResourceKind::Rooms),
            Section::Bookings => Some(ResourceKind::Bookings),
        }
    }
}

impl From<ResourceKind> for Section {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Books => Section::Books,
            ResourceKind::Members => Section::Members,
            ResourceKind::Loans => Section::Loans,
            ResourceKind::Guests => Section::Guests,
            ResourceKind::Rooms => Section::Rooms,
            ResourceKind::Bookings => Section::Bookings,
        }
    }
}

/// The open create / edit dialog
#[derive(Debug, Clone)]
pub enum Modal {
    Book(FormView<BookForm>),
    Member(FormView<MemberForm>),
    Loan(FormView<LoanForm>),
    Guest(FormView<GuestForm>),
    Room(FormView<RoomForm>),
    Booking(FormView<BookingForm>),
}

macro_rules! impl_modal_from {
    ($($variant:ident => $form:ty),* $(,)?) => {
        $(
            impl From<FormView<$form>> for Modal {
                fn from(view: FormView<$form>) -> Self {
                    Modal::$variant(view)
                }
            }
        )*
    };
}

impl_modal_from!(
    Book => BookForm,
    Member => MemberForm,
    Loan => LoanForm,
    Guest => GuestForm,
    Room => RoomForm,
    Booking => BookingForm,
);

/// Run `$body` with `$view` bound to whichever form view `$modal` holds
macro_rules! with_view {
    ($modal:expr, $view:ident => $body:expr) => {
        match $modal {
            Modal::Book($view) => $body,
            Modal::Member($view) => $body,
            Modal::Loan($view) => $body,
            Modal::Guest($view) => $body,
            Modal::Room($view) => $body,
            Modal::Booking($view) => $body,
        }
    };
}

impl Modal {
    /// Blank create form for `kind`
    pub fn create(kind: ResourceKind, now: DateTime<Utc>) -> Self {
        match kind {
            ResourceKind::Books => FormView::<BookForm>::create(now).into(),
            ResourceKind::Members => FormView::<MemberForm>::create(now).into(),
            ResourceKind::Loans => FormView::<LoanForm>::create(now).into(),
            ResourceKind::Guests => FormView::<GuestForm>::create(now).into(),
            ResourceKind::Rooms => FormView::<RoomForm>::create(now).into(),
            ResourceKind::Bookings => FormView::<BookingForm>::create(now).into(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            Modal::Book(_) => ResourceKind::Books,
            Modal::Member(_) => ResourceKind::Members,
            Modal::Loan(_) => ResourceKind::Loans,
            Modal::Guest(_) => ResourceKind::Guests,
            Modal::Room(_) => ResourceKind::Rooms,
            Modal::Booking(_) => ResourceKind::Bookings,
        }
    }

    pub fn title(&self) -> String {
        with_view!(self, view => view.title())
    }

    pub fn editing(&self) -> Option<&str> {
        with_view!(self, view => view.editing())
    }

    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Modal::Book(_) => BookForm::FIELDS,
            Modal::Member(_) => MemberForm::FIELDS,
            Modal::Loan(_) => LoanForm::FIELDS,
            Modal::Guest(_) => GuestForm::FIELDS,
            Modal::Room(_) => RoomForm::FIELDS,
            Modal::Booking(_) => BookingForm::FIELDS,
        }
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> AppResult<()> {
        with_view!(self, view => view.set_field(field, value))
    }

    pub fn errors(&self) -> &FieldErrors {
        with_view!(self, view => view.errors())
    }

    pub fn submission_error(&self) -> Option<&str> {
        with_view!(self, view => view.submission_error())
    }
}

/// Top-level state of the console
pub struct AppShell<T> {
    services: Services<T>,
    bus: Arc<RefreshBus>,
    section: Section,
    modal: Option<Modal>,
    page_size: u32,
}

impl<T: Transport> AppShell<T> {
    pub fn new(services: Services<T>, page_size: u32) -> Self {
        Self {
            services,
            bus: Arc::new(RefreshBus::new()),
            section: Section::default(),
            modal: None,
            page_size,
        }
    }

    pub fn services(&self) -> &Services<T> {
        &self.services
    }

    pub fn bus(&self) -> &RefreshBus {
        &self.bus
    }

    pub fn section(&self) -> Section {
        self.section
    }

    /// Switch screens; an open modal is discarded
    pub fn navigate(&mut self, section: Section) {
        if self.section != section {
            tracing::debug!(from = ?self.section, to = ?section, "Navigating");
        }
        self.section = section;
        self.modal = None;
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn modal_mut(&mut self) -> Option<&mut Modal> {
        self.modal.as_mut()
    }

    pub fn open_create(&mut self, kind: ResourceKind, now: DateTime<Utc>) -> &mut Modal {
        self.modal.insert(Modal::create(kind, now))
    }

    /// Open the edit dialog pre-filled from `record`
    pub fn open_edit<F>(&mut self, record: &F::Record) -> &mut Modal
    where
        F: Form,
        Modal: From<FormView<F>>,
    {
        self.modal.insert(FormView::<F>::edit(record).into())
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Submit the open modal. On success it closes and every list of that
    /// resource is told to refresh; otherwise it stays open with its errors.
    pub async fn submit_modal(&mut self, now: DateTime<Utc>) -> bool {
        let Some(mut modal) = self.modal.take() else {
            return false;
        };

        let saved = with_view!(&mut modal, view => submit_view(&self.services, view, now).await);
        if saved {
            self.bus.publish(modal.kind());
        } else {
            self.modal = Some(modal);
        }
        saved
    }

    /// Mark a loan returned and refresh loan lists
    pub async fn return_loan(&self, id: &str, now: DateTime<Utc>) -> AppResult<Loan> {
        let loan = self.services.resource::<Loan>().return_loan(id, now).await?;
        self.bus.publish(ResourceKind::Loans);
        Ok(loan)
    }

    /// Delete one record and refresh every list of its resource
    pub async fn delete<R: Resource>(&self, id: &str) -> AppResult<Deleted> {
        let deleted = self.services.resource::<R>().delete(id).await?;
        self.bus.publish(R::KIND);
        Ok(deleted)
    }

    /// A list view of `R` that re-fetches after mutations made through this shell
    /// and announces its own deletes to the other views
    pub fn list_view<R: Resource>(&self) -> ListView<R, T> {
        ListView::new(self.services.resource::<R>(), self.page_size)
            .with_refresh(self.bus.subscribe(R::KIND))
            .with_publisher(Arc::clone(&self.bus))
    }
}

async fn submit_view<F: Form, T: Transport>(
    services: &Services<T>,
    view: &mut FormView<F>,
    now: DateTime<Utc>,
) -> bool {
    let service = services.resource::<F::Record>();
    let kind = <F::Record as Resource>::KIND;
    let outcome = view
        .submit(&service, now, |record| {
            tracing::info!(resource = %kind, id = record.id(), "Saved from form");
        })
        .await;
    matches!(outcome, SubmitOutcome::Saved(_))
}
