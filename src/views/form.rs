//! Create / edit form view model

use chrono::{DateTime, Utc};

use crate::{
    client::Transport,
    error::AppResult,
    forms::Form,
    models::Resource,
    services::ResourceService,
    validation::FieldErrors,
};

/// Result of one submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<R> {
    /// Client-side validation failed; nothing was sent
    Invalid,
    Saved(R),
    /// The back end refused; the message is in `submission_error` or a field error
    Failed,
}

#[derive(Debug, Clone)]
pub struct FormView<F: Form> {
    form: F,
    editing: Option<String>,
    errors: FieldErrors,
    submission_error: Option<String>,
    submitting: bool,
}

impl<F: Form> FormView<F> {
    pub fn create(now: DateTime<Utc>) -> Self {
        Self::with_form(F::blank(now), None)
    }

    pub fn edit(record: &F::Record) -> Self {
        Self::with_form(F::from_record(record), Some(record.id().to_string()))
    }

    fn with_form(form: F, editing: Option<String>) -> Self {
        Self {
            form,
            editing,
            errors: FieldErrors::new(),
            submission_error: None,
            submitting: false,
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    /// Id of the record under edit; `None` for a create form
    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn title(&self) -> String {
        let label = <F::Record as Resource>::KIND.label();
        if self.is_edit() {
            format!("Edit {}", label)
        } else {
            format!("Add {}", label)
        }
    }

    /// Change one field; its error goes away until the next submit
    pub fn set_field(&mut self, field: &str, value: &str) -> AppResult<()> {
        self.form.set(field, value)?;
        self.errors.remove(field);
        Ok(())
    }

    /// Validate, then create or update exactly once. `on_success` runs before the
    /// submission error is cleared.
    pub async fn submit<T, C>(
        &mut self,
        service: &ResourceService<F::Record, T>,
        now: DateTime<Utc>,
        on_success: C,
    ) -> SubmitOutcome<F::Record>
    where
        T: Transport,
        C: FnOnce(&F::Record),
    {
        let kind = <F::Record as Resource>::KIND;
        self.errors = self.form.validate(now);
        if !self.errors.is_empty() {
            tracing::debug!(resource = %kind, errors = %self.errors, "Form has errors");
            return SubmitOutcome::Invalid;
        }

        self.submitting = true;
        let result = match self.form.to_input() {
            Ok(input) => match &self.editing {
                Some(id) => service.update(id, &input).await,
                None => service.create(&input).await,
            },
            Err(e) => Err(e),
        };
        self.submitting = false;

        match result {
            Ok(record) => {
                on_success(&record);
                self.submission_error = None;
                SubmitOutcome::Saved(record)
            }
            Err(e) => {
                tracing::warn!(resource = %kind, error = %e, "Submission failed");
                match self.form.field_error_for(&e) {
                    Some((field, message)) => self.errors.set(field, message),
                    None => self.submission_error = Some(e.user_message("Operation failed")),
                }
                SubmitOutcome::Failed
            }
        }
    }
}
