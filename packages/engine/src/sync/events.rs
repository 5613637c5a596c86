use crate::{Account, Form, FormVersion, Record};

/// Lifecycle notifications delivered by the host, in the order they happened.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A form definition was saved. `None` on either side means "no such version".
    FormSaved {
        account: Account,
        form: Form,
        old_form: Option<FormVersion>,
        new_form: Option<FormVersion>,
    },
    RecordSaved {
        account: Account,
        form: Form,
        record: Record,
    },
    RecordDeleted {
        account: Account,
        form: Form,
        record: Record,
    },
}

impl SyncEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FormSaved { .. } => "form:save",
            Self::RecordSaved { .. } => "record:save",
            Self::RecordDeleted { .. } => "record:delete",
        }
    }

    pub fn account(&self) -> &Account {
        match self {
            Self::FormSaved { account, .. }
            | Self::RecordSaved { account, .. }
            | Self::RecordDeleted { account, .. } => account,
        }
    }

    pub fn form(&self) -> &Form {
        match self {
            Self::FormSaved { form, .. }
            | Self::RecordSaved { form, .. }
            | Self::RecordDeleted { form, .. } => form,
        }
    }
}
