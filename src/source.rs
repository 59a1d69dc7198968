/// The browser's tab API, as seen by the aggregation core
use async_trait::async_trait;

use crate::error::Result;
use crate::tab_data::{RawWindow, TabHandle};

/// Enumerates windows and mutates tabs
///
/// Each call settles independently. A failed `close` must return
/// `TabError::Close` for that handle and leave other pending closes alone.
#[async_trait(?Send)]
pub trait TabSource {
    async fn windows(&self) -> Result<Vec<RawWindow>>;

    async fn close(&self, handle: TabHandle) -> Result<()>;

    async fn activate(&self, handle: TabHandle) -> Result<()>;
}
