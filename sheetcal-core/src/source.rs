//! The spreadsheet side of a sync.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::SheetCalResult;

/// One sheet / tab of a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    pub id: String,
    pub name: String,
}

impl TableRef {
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        TableRef {
            id: name.clone(),
            name,
        }
    }
}

/// A spreadsheet service. Rows come back as displayed text, ragged
/// (trailing empty cells may be missing).
pub trait TableSource: Send + Sync {
    fn list_tables(&self) -> impl Future<Output = SheetCalResult<Vec<TableRef>>> + Send;

    fn get_rows(
        &self,
        table: &TableRef,
    ) -> impl Future<Output = SheetCalResult<Vec<Vec<String>>>> + Send;
}
