//! Query planning: which datasources to read and how to compute each column.

use indexmap::{IndexMap, IndexSet};

use super::RenderError;
use crate::semantic::{
    Datasource, DatasourceAddress, Derivation, Environment, Expr, Literal, MultiSelectStatement,
    SelectStatement, UnaryOp,
};

/// Renders a function call from already-rendered arguments.
pub type CallRenderer = fn(&str, &[String]) -> Result<String, RenderError>;

/// A relation in the FROM clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub relation: String,
    pub alias: String,
    /// Column pairs for the join condition; empty for the first source
    pub join_on: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumn {
    pub sql: String,
    pub name: String,
    pub aggregate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectPlan {
    pub columns: Vec<OutputColumn>,
    pub sources: Vec<SourceRef>,
    pub where_clause: Option<String>,
    pub group_by: Vec<String>,
    pub having: Option<String>,
    pub order_by: Vec<String>,
    pub limit: Option<u64>,
}

/// An output column shared by every part of a merged select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignColumn {
    pub name: String,
    /// Column name in each part, in part order
    pub columns: Vec<String>,
}

/// A planned statement, ready to print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledForm {
    Select(SelectPlan),
    MultiSelect {
        parts: Vec<SelectPlan>,
        align: Vec<AlignColumn>,
    },
    Persist {
        table: String,
        plan: SelectPlan,
    },
    RawSql(String),
}

pub(crate) struct Planner<'a> {
    env: &'a Environment,
    render_call: CallRenderer,
    /// SQL for concepts read straight from a chosen datasource
    bindings: IndexMap<String, String>,
}

impl<'a> Planner<'a> {
    pub(crate) fn new(env: &'a Environment, render_call: CallRenderer) -> Self {
        Self {
            env,
            render_call,
            bindings: IndexMap::new(),
        }
    }

    pub(crate) fn plan_multi(
        &mut self,
        statement: &MultiSelectStatement,
    ) -> Result<CompiledForm, RenderError> {
        let parts = statement
            .selects
            .iter()
            .map(|select| self.plan_select(select))
            .collect::<Result<Vec<_>, _>>()?;
        let align = statement
            .align
            .iter()
            .map(|item| AlignColumn {
                name: item.name.to_string(),
                columns: item.concepts.iter().map(|c| self.column_name(c)).collect(),
            })
            .collect();
        Ok(CompiledForm::MultiSelect { parts, align })
    }

    pub(crate) fn plan_select(
        &mut self,
        select: &SelectStatement,
    ) -> Result<SelectPlan, RenderError> {
        self.bindings.clear();

        let mut needed: IndexSet<String> = select.items.iter().map(|i| i.concept.clone()).collect();
        let filters = select
            .where_clause
            .iter()
            .chain(select.order_by.iter().map(|o| &o.expr));
        for expr in filters {
            needed.extend(expr.concepts().into_iter().map(str::to_string));
        }

        let mut roots = IndexSet::new();
        for concept in &needed {
            self.collect_roots(concept, &mut roots, &mut IndexSet::new())?;
        }
        let sources = self.choose_sources(&roots)?;

        let mut columns = Vec::new();
        let mut grouping = Vec::new();
        let mut any_aggregate = false;
        for item in &select.items {
            let sql = self.concept_sql(&item.concept)?;
            let aggregate = self.is_aggregate(&item.concept);
            any_aggregate |= aggregate;
            if !aggregate {
                grouping.push(sql.clone());
            }
            if !item.hidden {
                columns.push(OutputColumn {
                    sql,
                    name: self.column_name(&item.concept),
                    aggregate,
                });
            }
        }

        let mut plan = SelectPlan {
            columns,
            sources,
            limit: select.limit,
            ..SelectPlan::default()
        };
        if any_aggregate {
            plan.group_by = grouping;
        }

        if let Some(filter) = &select.where_clause {
            let sql = self.expr_sql(filter)?;
            if self.expr_is_aggregate(filter) {
                plan.having = Some(sql);
            } else {
                plan.where_clause = Some(sql);
            }
        }
        for item in &select.order_by {
            let direction = if item.descending { "DESC" } else { "ASC" };
            plan.order_by
                .push(format!("{} {direction}", self.expr_sql(&item.expr)?));
        }
        Ok(plan)
    }

    /// Concepts that must be read from a datasource to compute `address`.
    fn collect_roots(
        &self,
        address: &str,
        roots: &mut IndexSet<String>,
        visiting: &mut IndexSet<String>,
    ) -> Result<(), RenderError> {
        if !visiting.insert(address.to_string()) {
            return Ok(());
        }
        let concept = self
            .env
            .concept(address)
            .ok_or_else(|| RenderError::UnknownConcept {
                concept: address.to_string(),
            })?;
        let bound = self.env.datasources.values().any(|ds| ds.binds(address));
        match &concept.lineage {
            Some(lineage) if !bound => {
                for dependency in lineage.concepts() {
                    self.collect_roots(dependency, roots, visiting)?;
                }
            }
            _ => {
                roots.insert(address.to_string());
            }
        }
        Ok(())
    }

    /// Greedy cover of `roots` by datasources, each joined to an earlier one.
    fn choose_sources(&mut self, roots: &IndexSet<String>) -> Result<Vec<SourceRef>, RenderError> {
        let env = self.env;
        let mut chosen: Vec<&Datasource> = Vec::new();
        let mut sources = Vec::new();
        let mut uncovered = roots.clone();

        while let Some(first) = uncovered.first().cloned() {
            let mut best: Option<(&Datasource, usize)> = None;
            for datasource in env.datasources.values() {
                if chosen.iter().any(|c| c.identifier() == datasource.identifier()) {
                    continue;
                }
                let joinable = chosen.is_empty() || join_partner(&chosen, datasource).is_some();
                let covered = uncovered.iter().filter(|c| datasource.binds(c)).count();
                if covered == 0 || !joinable {
                    continue;
                }
                if best.is_none_or(|(_, n)| covered > n) {
                    best = Some((datasource, covered));
                }
            }

            let Some((datasource, _)) = best else {
                let provider = env.datasources.values().find(|ds| ds.binds(&first));
                return Err(match provider {
                    Some(ds) => RenderError::NoJoinPath {
                        datasource: ds.identifier(),
                    },
                    None => RenderError::NoDatasource { concept: first },
                });
            };

            let alias = alias_for(datasource);
            let join_on = match join_partner(&chosen, datasource) {
                Some((partner, shared)) => shared
                    .iter()
                    .filter_map(|concept| {
                        let left = partner.column_for(concept)?;
                        let right = datasource.column_for(concept)?;
                        Some((
                            column_ref(&alias_for(partner), &left.column),
                            column_ref(&alias, &right.column),
                        ))
                    })
                    .collect(),
                None => Vec::new(),
            };

            for column in &datasource.columns {
                self.bindings
                    .entry(column.concept.clone())
                    .or_insert_with(|| column_ref(&alias, &column.column));
            }
            uncovered.retain(|c| !datasource.binds(c));
            sources.push(SourceRef {
                relation: relation_for(datasource),
                alias,
                join_on,
            });
            chosen.push(datasource);
        }
        Ok(sources)
    }

    fn concept_sql(&self, address: &str) -> Result<String, RenderError> {
        if let Some(sql) = self.bindings.get(address) {
            return Ok(sql.clone());
        }
        let concept = self
            .env
            .concept(address)
            .ok_or_else(|| RenderError::UnknownConcept {
                concept: address.to_string(),
            })?;
        match &concept.lineage {
            Some(lineage @ Expr::Binary { .. }) => Ok(format!("({})", self.expr_sql(lineage)?)),
            Some(lineage) => self.expr_sql(lineage),
            None => Err(RenderError::NoDatasource {
                concept: address.to_string(),
            }),
        }
    }

    fn expr_sql(&self, expr: &Expr) -> Result<String, RenderError> {
        Ok(match expr {
            Expr::Concept(address) => self.concept_sql(address)?,
            Expr::Literal(literal) => literal_sql(literal),
            Expr::Type(datatype) => datatype.sql_name().to_string(),
            Expr::Call { function, args } => {
                let args = args
                    .iter()
                    .map(|a| self.expr_sql(a))
                    .collect::<Result<Vec<_>, _>>()?;
                (self.render_call)(function, &args)?
            }
            Expr::Binary { op, lhs, rhs } => {
                format!("{} {} {}", self.expr_sql(lhs)?, op.as_str(), self.expr_sql(rhs)?)
            }
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => format!("NOT {}", self.expr_sql(operand)?),
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => format!("-{}", self.expr_sql(operand)?),
            Expr::IsNull { operand, negated } => {
                let not = if *negated { " NOT" } else { "" };
                format!("{} IS{not} NULL", self.expr_sql(operand)?)
            }
            Expr::InList {
                operand,
                items,
                negated,
            } => {
                let items = items
                    .iter()
                    .map(|i| self.expr_sql(i))
                    .collect::<Result<Vec<_>, _>>()?;
                let not = if *negated { " NOT" } else { "" };
                format!("{}{not} IN ({})", self.expr_sql(operand)?, items.join(", "))
            }
            Expr::Paren(inner) => format!("({})", self.expr_sql(inner)?),
        })
    }

    /// Whether computing the concept aggregates over rows.
    fn is_aggregate(&self, address: &str) -> bool {
        if self.bindings.contains_key(address) {
            return false;
        }
        match self.env.concept(address) {
            Some(concept) if concept.derivation == Derivation::Aggregate => true,
            Some(concept) => concept
                .lineage
                .as_ref()
                .is_some_and(|lineage| self.expr_is_aggregate(lineage)),
            None => false,
        }
    }

    fn expr_is_aggregate(&self, expr: &Expr) -> bool {
        expr.contains_aggregate() || expr.concepts().iter().any(|c| self.is_aggregate(c))
    }

    fn column_name(&self, address: &str) -> String {
        let name = self
            .env
            .concept(address)
            .map(|c| c.name.to_string())
            .unwrap_or_else(|| address.rsplit('.').next().unwrap_or(address).to_string());
        name.replace('.', "_")
    }
}

/// First chosen datasource sharing a bound concept with `datasource`.
fn join_partner<'d>(
    chosen: &[&'d Datasource],
    datasource: &Datasource,
) -> Option<(&'d Datasource, Vec<String>)> {
    chosen.iter().find_map(|partner| {
        let shared: Vec<String> = partner
            .columns
            .iter()
            .filter(|c| datasource.binds(&c.concept))
            .map(|c| c.concept.clone())
            .collect();
        (!shared.is_empty()).then_some((*partner, shared))
    })
}

fn alias_for(datasource: &Datasource) -> String {
    datasource.identifier().replace('.', "_")
}

fn relation_for(datasource: &Datasource) -> String {
    match &datasource.address {
        DatasourceAddress::Table(table) => table.to_string(),
        DatasourceAddress::Query(query) => format!("({query})"),
    }
}

pub(crate) fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn column_ref(alias: &str, column: &str) -> String {
    format!("{}.{}", quote(alias), quote(column))
}

fn literal_sql(literal: &Literal) -> String {
    match literal {
        Literal::Bool(true) => "TRUE".to_string(),
        Literal::Bool(false) => "FALSE".to_string(),
        Literal::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}
