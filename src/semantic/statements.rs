//! Resolved statements produced by the second pass.

use smol_str::SmolStr;

use super::concept::Concept;
use super::environment::{Datasource, ImportRecord};
use super::expr::Expr;

/// Source position of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementMeta {
    /// 1-indexed line of the statement's first token
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    /// Canonical address of the output concept
    pub concept: String,
    /// `--` prefixed items are computed but not returned
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub expr: Expr,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub items: Vec<SelectItem>,
    pub where_clause: Option<Expr>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<u64>,
    pub meta: Option<StatementMeta>,
}

impl SelectStatement {
    pub fn output_concepts(&self) -> impl Iterator<Item = &str> {
        self.items
            .iter()
            .filter(|i| !i.hidden)
            .map(|i| i.concept.as_str())
    }
}

/// One output column of a merged select, backed by a concept per select.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignItem {
    pub name: SmolStr,
    pub concepts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiSelectStatement {
    pub selects: Vec<SelectStatement>,
    pub align: Vec<AlignItem>,
    pub meta: Option<StatementMeta>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersistStatement {
    pub datasource: SmolStr,
    pub table: SmolStr,
    pub select: SelectStatement,
    pub meta: Option<StatementMeta>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawSqlStatement {
    pub text: String,
    pub meta: Option<StatementMeta>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Concept(Box<Concept>, Option<StatementMeta>),
    Datasource(Box<Datasource>, Option<StatementMeta>),
    Import(ImportRecord, Option<StatementMeta>),
    Select(SelectStatement),
    MultiSelect(MultiSelectStatement),
    Persist(PersistStatement),
    RawSql(RawSqlStatement),
}

impl Statement {
    pub fn meta(&self) -> Option<StatementMeta> {
        match self {
            Statement::Concept(_, meta)
            | Statement::Datasource(_, meta)
            | Statement::Import(_, meta) => *meta,
            Statement::Select(s) => s.meta,
            Statement::MultiSelect(s) => s.meta,
            Statement::Persist(s) => s.meta,
            Statement::RawSql(s) => s.meta,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Concept(..) => "concept",
            Statement::Datasource(..) => "datasource",
            Statement::Import(..) => "import",
            Statement::Select(_) => "select",
            Statement::MultiSelect(_) => "multi_select",
            Statement::Persist(_) => "persist",
            Statement::RawSql(_) => "raw_sql",
        }
    }

    /// Statements that render to a query.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Statement::Select(_) | Statement::MultiSelect(_) | Statement::Persist(_)
        )
    }
}
