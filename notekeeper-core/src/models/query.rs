use serde::{Deserialize, Serialize};

use super::Note;
use crate::error::{Error, Result};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoteSort {
    CreatedAt,
    #[default]
    UpdatedAt,
    Title,
}

impl NoteSort {
    pub const ALL: [NoteSort; 3] = [Self::CreatedAt, Self::UpdatedAt, Self::Title];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Title => "title",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "created_at" => Some(Self::CreatedAt),
            "updated_at" => Some(Self::UpdatedAt),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    /// ORDER BY expression for this key.
    pub(crate) fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Title => "title COLLATE NOCASE",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub(crate) fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A validated listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListNotesQuery {
    pub page: u32,
    pub limit: u32,
    pub sort_by: NoteSort,
    pub order: SortOrder,
}

impl Default for ListNotesQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_by: NoteSort::default(),
            order: SortOrder::default(),
        }
    }
}

impl ListNotesQuery {
    /// Validates raw query parameters, filling in defaults for missing ones.
    pub fn parse(
        page: Option<i64>,
        limit: Option<i64>,
        sort_by: Option<&str>,
        order: Option<&str>,
    ) -> Result<Self> {
        let page = match page {
            None => DEFAULT_PAGE,
            Some(p) if p >= 1 && p <= u32::MAX as i64 => p as u32,
            Some(p) => return Err(Error::validation(format!("page must be >= 1, got {p}"))),
        };

        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(l) if (1..=MAX_LIMIT as i64).contains(&l) => l as u32,
            Some(l) => {
                return Err(Error::validation(format!(
                    "limit must be between 1 and {MAX_LIMIT}, got {l}"
                )))
            }
        };

        let sort_by = match sort_by {
            None => NoteSort::default(),
            Some(s) => NoteSort::from_str(s).ok_or_else(|| {
                let allowed: Vec<_> = NoteSort::ALL.iter().map(|s| s.as_str()).collect();
                Error::validation(format!(
                    "invalid sort_by '{s}', allowed: {}",
                    allowed.join(", ")
                ))
            })?,
        };

        let order = match order {
            None => SortOrder::default(),
            Some(o) => SortOrder::from_str(o).ok_or_else(|| {
                Error::validation(format!("invalid order '{o}', allowed: asc, desc"))
            })?,
        };

        Ok(Self {
            page,
            limit,
            sort_by,
            order,
        })
    }

    pub(crate) fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotePage {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub data: Vec<Note>,
}
