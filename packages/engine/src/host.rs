use async_trait::async_trait;
use futures_util::stream::LocalBoxStream;

use crate::{Account, Form, Record, SyncError};

/// Read access to the system of record that owns accounts, forms and records.
#[async_trait(?Send)]
pub trait Host {
    async fn fetch_account(&self, org: &str) -> Result<Option<Account>, SyncError>;

    /// Forms that should be materialized; disabled forms are excluded by the host.
    async fn find_active_forms(&self, account: &Account) -> Result<Vec<Form>, SyncError>;

    /// Streams every record of `form`. Consumers pull one record at a time.
    fn find_each_record<'a>(
        &'a self,
        account: &'a Account,
        form: &'a Form,
    ) -> LocalBoxStream<'a, Result<Record, SyncError>>;
}
