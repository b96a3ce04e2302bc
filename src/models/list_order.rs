use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderColumn {
    CreatedAt,
    #[default]
    UpdatedAt,
}

impl OrderColumn {
    pub fn as_sql(self) -> &'static str {
        match self {
            OrderColumn::CreatedAt => "created_at",
            OrderColumn::UpdatedAt => "updated_at",
        }
    }
}

impl FromStr for OrderColumn {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(OrderColumn::CreatedAt),
            "updated_at" => Ok(OrderColumn::UpdatedAt),
            other => Err(AppError::InvalidInput(format!("invalid order_by: {:?}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(AppError::InvalidInput(format!("invalid order: {:?}", other))),
        }
    }
}

/// Ordering for item listings. Defaults to newest update first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOrder {
    pub order_by: OrderColumn,
    pub direction: SortDirection,
}

impl ListOrder {
    /// Parses the raw query values; empty strings fall back to the defaults.
    pub fn parse(order_by: &str, order: &str) -> Result<Self, AppError> {
        Ok(Self {
            order_by: if order_by.is_empty() {
                OrderColumn::default()
            } else {
                order_by.parse()?
            },
            direction: if order.is_empty() {
                SortDirection::default()
            } else {
                order.parse()?
            },
        })
    }

    pub fn to_sql(self) -> String {
        format!("{} {}", self.order_by.as_sql(), self.direction.as_sql())
    }
}
