//! Edit-mode state machine for the income and expense entry forms
//!
//! `Normal` means submit adds a new record. `Editing(record)` means submit
//! updates that record. While editing only the form matching the record's
//! type is enabled.

use rust_decimal::Decimal;

use crate::error::CoreResult;
use crate::models::{parse_amount, Transaction, TransactionPatch};
use crate::types::TransactionType;

/// What submitting a form will do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    SaveChanges,
}

/// One entry form (amount + description)
#[derive(Debug, Clone, PartialEq)]
pub struct EntryForm {
    pub kind: TransactionType,
    pub amount: String,
    pub description: String,
    pub enabled: bool,
    pub mode: FormMode,
}

impl EntryForm {
    pub fn new(kind: TransactionType) -> Self {
        Self {
            kind,
            amount: String::new(),
            description: String::new(),
            enabled: true,
            mode: FormMode::Add,
        }
    }

    fn reset(&mut self) {
        self.amount.clear();
        self.description.clear();
        self.enabled = true;
        self.mode = FormMode::Add;
    }

    pub fn title(&self) -> &'static str {
        match (self.mode, self.kind) {
            (FormMode::SaveChanges, _) => "Edit Transaction",
            (FormMode::Add, TransactionType::Income) => "Add Income",
            (FormMode::Add, TransactionType::Expense) => "Add Expense",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    #[default]
    Normal,
    Editing(Transaction),
}

/// What a submit resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitAction {
    Create {
        kind: TransactionType,
        amount: Decimal,
        description: String,
    },
    Update {
        id: String,
        patch: TransactionPatch,
    },
}

/// Edit state plus the two forms it drives
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    state: EditState,
    pub income: EntryForm,
    pub expense: EntryForm,
}

impl Default for EditSession {
    fn default() -> Self {
        Self {
            state: EditState::Normal,
            income: EntryForm::new(TransactionType::Income),
            expense: EntryForm::new(TransactionType::Expense),
        }
    }
}

impl EditSession {
    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing(_))
    }

    /// The record being edited, if any
    pub fn target(&self) -> Option<&Transaction> {
        match self.state {
            EditState::Editing(ref tx) => Some(tx),
            EditState::Normal => None,
        }
    }

    pub fn form(&self, kind: TransactionType) -> &EntryForm {
        match kind {
            TransactionType::Income => &self.income,
            TransactionType::Expense => &self.expense,
        }
    }

    pub fn form_mut(&mut self, kind: TransactionType) -> &mut EntryForm {
        match kind {
            TransactionType::Income => &mut self.income,
            TransactionType::Expense => &mut self.expense,
        }
    }

    /// Enter edit mode for `record`.
    ///
    /// Entering while another edit is in progress replaces the target
    /// without confirmation; the replaced record is returned.
    pub fn begin_edit(&mut self, record: Transaction) -> Option<Transaction> {
        let previous = match std::mem::take(&mut self.state) {
            EditState::Editing(tx) => Some(tx),
            EditState::Normal => None,
        };

        self.income.reset();
        self.expense.reset();

        let kind = record.kind;
        let form = self.form_mut(kind);
        form.amount = record.amount.normalize().to_string();
        form.description = record.description.clone();
        form.mode = FormMode::SaveChanges;
        self.form_mut(kind.sibling()).enabled = false;

        self.state = EditState::Editing(record);
        previous
    }

    /// Leave edit mode, discarding input; both forms are cleared and enabled
    pub fn cancel(&mut self) -> Option<Transaction> {
        self.income.reset();
        self.expense.reset();
        match std::mem::take(&mut self.state) {
            EditState::Editing(tx) => Some(tx),
            EditState::Normal => None,
        }
    }

    /// Validate the given form's input and decide between create and update.
    /// Nothing changes when validation fails.
    pub fn prepare_submit(&self, kind: TransactionType) -> CoreResult<SubmitAction> {
        let form = self.form(kind);
        let amount = parse_amount(&form.amount)?;

        Ok(match self.state {
            EditState::Editing(ref tx) => SubmitAction::Update {
                id: tx.id.clone(),
                patch: TransactionPatch::amount_and_description(amount, &form.description),
            },
            EditState::Normal => SubmitAction::Create {
                kind,
                amount,
                description: form.description.clone(),
            },
        })
    }

    /// Reset after a submit went through, whatever the mode was
    pub fn finish_submit(&mut self) {
        if self.is_editing() {
            self.cancel();
        } else {
            self.income.reset();
            self.expense.reset();
        }
    }
}
