use sil_types::{PageRequest, SortOrder, TxKind, TxStatus, TypeError};

/// Sortable transaction listing columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TxSortKey {
    #[default]
    Id,
    SubmittedAt,
    ConfirmedAt,
    Status,
    Kind,
}

impl std::str::FromStr for TxSortKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "submitted_at" => Ok(Self::SubmittedAt),
            "confirmed_at" => Ok(Self::ConfirmedAt),
            "status" => Ok(Self::Status),
            "type" | "kind" => Ok(Self::Kind),
            other => Err(TypeError::UnknownKind(other.to_string())),
        }
    }
}

/// Transaction listing filter: free-text search, status, kind, initiator,
/// and a recent-within-N-days window, with sorting and pagination.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub search: Option<String>,
    pub status: Option<TxStatus>,
    pub kind: Option<TxKind>,
    pub initiated_by: Option<i64>,
    /// When set, only transactions submitted within the last N days.
    pub recent_days: Option<u32>,
    pub sort_by: TxSortKey,
    pub sort_order: SortOrder,
    pub page: PageRequest,
}
