//! Pure mapping from deposit snapshots to displayable rows.
//!
//! Both lists are rebuilt from scratch on every call, so rendering the same
//! snapshot twice always yields the same view. The terminal layer only
//! lays these rows out; all classification and formatting happens here.

use crate::format::{AmountFormatter, format_timestamp, short_hash};
use crate::models::{DepositRecord, DepositStatus};

/// Placeholder shown when there are no pending deposits.
pub const NO_PENDING: &str = "No pending deposits";

/// Placeholder shown when there is no completed deposit.
pub const NO_HISTORY: &str = "No deposit history";

/// Shown instead of a missing block number.
const NO_BLOCK: &str = "-";

/// Shown instead of a missing completion time.
const NOT_COMPLETED: &str = "N/A";

/// Inputs shared by every row.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub formatter: &'a AmountFormatter,
    /// Confirmation count displayed as the target in `n/target`.
    pub confirmation_target: u32,
}

/// One deposit, ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositRow {
    pub amount: String,
    /// Lower-case status, used to pick the badge colour.
    pub status_class: String,
    /// Upper-case status caption.
    pub status_caption: String,
    pub tx_hash: String,
    pub confirmations: String,
    pub block: String,
    pub created: String,
    /// Completion time; only set on history rows.
    pub completed: Option<String>,
    /// `None` renders as a disabled link placeholder.
    pub explorer_url: Option<String>,
}

/// A rendered list: either rows or a single placeholder message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositListView {
    Empty(&'static str),
    Rows(Vec<DepositRow>),
}

impl DepositListView {
    /// Number of deposit rows (zero for the placeholder).
    pub fn len(&self) -> usize {
        match self {
            Self::Empty(_) => 0,
            Self::Rows(rows) => rows.len(),
        }
    }

    /// Returns `true` when the placeholder is shown.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }
}

/// Builds the pending list. Every record is shown, in server order.
pub fn pending_list(records: &[DepositRecord], ctx: RenderContext<'_>) -> DepositListView {
    if records.is_empty() {
        return DepositListView::Empty(NO_PENDING);
    }
    DepositListView::Rows(records.iter().map(|r| row(r, ctx, false)).collect())
}

/// Builds the history list from records that reached `CREDITED` or
/// `FAILED`, keeping server order.
pub fn history_list(records: &[DepositRecord], ctx: RenderContext<'_>) -> DepositListView {
    let rows: Vec<DepositRow> = records
        .iter()
        .filter(|r| matches!(r.status, DepositStatus::Credited | DepositStatus::Failed))
        .map(|r| row(r, ctx, true))
        .collect();
    if rows.is_empty() {
        return DepositListView::Empty(NO_HISTORY);
    }
    DepositListView::Rows(rows)
}

fn row(record: &DepositRecord, ctx: RenderContext<'_>, with_completion: bool) -> DepositRow {
    let status = record.status.as_str();
    DepositRow {
        amount: ctx.formatter.format(&record.amount, record.token()),
        status_class: status.to_lowercase(),
        status_caption: status.to_uppercase(),
        tx_hash: short_hash(&record.transaction_hash),
        confirmations: format!("{}/{}", record.confirmations, ctx.confirmation_target),
        block: record
            .block_number
            .map(|b| b.to_string())
            .unwrap_or_else(|| NO_BLOCK.to_string()),
        created: format_timestamp(&record.created_at),
        completed: with_completion.then(|| {
            record
                .processed_at
                .as_deref()
                .map(format_timestamp)
                .unwrap_or_else(|| NOT_COMPLETED.to_string())
        }),
        explorer_url: record.explorer_url.clone().filter(|u| !u.is_empty()),
    }
}
