//! Partial `UPDATE` statements with whitelisted column names.
//!
//! Values are always bound as parameters. Column names cannot be bound, so
//! they come only from the [`UserColumn`] and [`OrderColumn`] enums and
//! never from request data.

use std::marker::PhantomData;

use sqlx::{Postgres, QueryBuilder};

/// An updatable column of a specific table.
pub trait Column: Copy {
    const TABLE: &'static str;

    fn name(self) -> &'static str;
}

/// Updatable columns of `utenti`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserColumn {
    Name,
    Email,
}

impl Column for UserColumn {
    const TABLE: &'static str = "utenti";

    fn name(self) -> &'static str {
        match self {
            Self::Name => "nome",
            Self::Email => "email",
        }
    }
}

/// Updatable columns of `ordini`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderColumn {
    UserId,
    Product,
    Quantity,
}

impl Column for OrderColumn {
    const TABLE: &'static str = "ordini";

    fn name(self) -> &'static str {
        match self {
            Self::UserId => "utente_id",
            Self::Product => "prodotto",
            Self::Quantity => "quantita",
        }
    }
}

/// Builds `UPDATE <table> SET a = $1, b = $2 WHERE id = $3`.
pub struct UpdateBuilder<'args, C> {
    query: QueryBuilder<'args, Postgres>,
    assignments: usize,
    _column: PhantomData<C>,
}

impl<'args, C: Column> UpdateBuilder<'args, C> {
    #[must_use]
    pub fn new() -> Self {
        let mut query = QueryBuilder::new("UPDATE ");
        query.push(C::TABLE).push(" SET ");
        Self {
            query,
            assignments: 0,
            _column: PhantomData,
        }
    }

    /// Add `column = <bound value>`.
    pub fn set<T>(&mut self, column: C, value: T) -> &mut Self
    where
        T: 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres> + Send,
    {
        if self.assignments > 0 {
            self.query.push(", ");
        }
        self.query.push(column.name()).push(" = ").push_bind(value);
        self.assignments += 1;
        self
    }

    /// Like [`set`](Self::set), skipping `None`.
    pub fn set_opt<T>(&mut self, column: C, value: Option<T>) -> &mut Self
    where
        T: 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres> + Send,
    {
        if let Some(value) = value {
            self.set(column, value);
        }
        self
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.assignments == 0
    }

    /// Close the statement with the `WHERE id = ...` clause.
    ///
    /// Returns `None` when no column was set; `UPDATE t SET WHERE ...` is
    /// not valid SQL.
    #[must_use]
    pub fn finish(mut self, id: i32) -> Option<QueryBuilder<'args, Postgres>> {
        if self.is_empty() {
            return None;
        }
        self.query.push(" WHERE id = ").push_bind(id);
        Some(self.query)
    }
}

impl<C: Column> Default for UpdateBuilder<'_, C> {
    fn default() -> Self {
        Self::new()
    }
}
