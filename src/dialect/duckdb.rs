//! DuckDB SQL output.

use std::fmt::Write as _;

use tracing::trace;

use super::plan::{CompiledForm, Planner, SelectPlan, column_ref, quote};
use super::{Dialect, RenderError};
use crate::semantic::{Environment, Statement};

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbDialect;

impl Dialect for DuckDbDialect {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn generate_queries(
        &self,
        env: &Environment,
        statements: &[Statement],
    ) -> Result<Vec<CompiledForm>, RenderError> {
        let mut planner = Planner::new(env, render_call);
        let mut forms = Vec::new();
        for statement in statements {
            let form = match statement {
                Statement::Select(select) => CompiledForm::Select(planner.plan_select(select)?),
                Statement::MultiSelect(multi) => planner.plan_multi(multi)?,
                Statement::Persist(persist) => CompiledForm::Persist {
                    table: persist.table.to_string(),
                    plan: planner.plan_select(&persist.select)?,
                },
                Statement::RawSql(raw) => CompiledForm::RawSql(raw.text.clone()),
                other => {
                    trace!("No query for {} statement", other.kind_name());
                    continue;
                }
            };
            forms.push(form);
        }
        Ok(forms)
    }

    fn compile_statement(&self, form: &CompiledForm) -> Result<String, RenderError> {
        Ok(match form {
            CompiledForm::Select(plan) => render_select(plan),
            CompiledForm::Persist { table, plan } => {
                format!("CREATE OR REPLACE TABLE {table} AS\n{}", render_select(plan))
            }
            CompiledForm::MultiSelect { parts, align } => {
                let mut out = String::from("WITH\n");
                for (i, part) in parts.iter().enumerate() {
                    let sep = if i + 1 < parts.len() { "," } else { "" };
                    let _ = writeln!(out, "q{i} AS (\n{}\n){sep}", render_select(part));
                }

                let mut columns = Vec::new();
                for column in align {
                    let refs: Vec<String> = column
                        .columns
                        .iter()
                        .enumerate()
                        .map(|(i, c)| column_ref(&format!("q{i}"), c))
                        .collect();
                    columns.push(format!("coalesce({}) AS {}", refs.join(", "), quote(&column.name)));
                }
                for (i, part) in parts.iter().enumerate() {
                    for output in &part.columns {
                        let aligned = align
                            .iter()
                            .any(|a| a.columns.get(i) == Some(&output.name));
                        if !aligned {
                            columns.push(column_ref(&format!("q{i}"), &output.name));
                        }
                    }
                }

                out.push_str("SELECT\n");
                push_list(&mut out, &columns);
                out.push_str("FROM\n");
                let _ = writeln!(out, "{INDENT}{}", quote("q0"));
                for i in 1..parts.len() {
                    let alias = format!("q{i}");
                    let conditions: Vec<String> = align
                        .iter()
                        .filter_map(|a| {
                            let left = a.columns.first()?;
                            let right = a.columns.get(i)?;
                            Some(format!(
                                "{} = {}",
                                column_ref("q0", left),
                                column_ref(&alias, right)
                            ))
                        })
                        .collect();
                    if conditions.is_empty() {
                        let _ = writeln!(out, "{INDENT}CROSS JOIN {}", quote(&alias));
                    } else {
                        let _ = writeln!(
                            out,
                            "{INDENT}FULL JOIN {} ON {}",
                            quote(&alias),
                            conditions.join(" AND ")
                        );
                    }
                }
                out.truncate(out.trim_end().len());
                out
            }
            CompiledForm::RawSql(text) => text.clone(),
        })
    }
}

fn push_list(out: &mut String, items: &[String]) {
    for (i, item) in items.iter().enumerate() {
        let sep = if i + 1 < items.len() { "," } else { "" };
        let _ = writeln!(out, "{INDENT}{item}{sep}");
    }
}

fn render_select(plan: &SelectPlan) -> String {
    let mut out = String::from("SELECT\n");
    let columns: Vec<String> = plan
        .columns
        .iter()
        .map(|c| format!("{} AS {}", c.sql, quote(&c.name)))
        .collect();
    push_list(&mut out, &columns);

    if !plan.sources.is_empty() {
        out.push_str("FROM\n");
        for source in &plan.sources {
            let relation = format!("{} AS {}", source.relation, quote(&source.alias));
            if source.join_on.is_empty() {
                let _ = writeln!(out, "{INDENT}{relation}");
            } else {
                let conditions: Vec<String> = source
                    .join_on
                    .iter()
                    .map(|(left, right)| format!("{left} = {right}"))
                    .collect();
                let _ = writeln!(
                    out,
                    "{INDENT}INNER JOIN {relation} ON {}",
                    conditions.join(" AND ")
                );
            }
        }
    }
    if let Some(filter) = &plan.where_clause {
        let _ = writeln!(out, "WHERE\n{INDENT}{filter}");
    }
    if !plan.group_by.is_empty() {
        out.push_str("GROUP BY\n");
        push_list(&mut out, &plan.group_by);
    }
    if let Some(filter) = &plan.having {
        let _ = writeln!(out, "HAVING\n{INDENT}{filter}");
    }
    if !plan.order_by.is_empty() {
        out.push_str("ORDER BY\n");
        push_list(&mut out, &plan.order_by);
    }
    if let Some(limit) = plan.limit {
        let _ = writeln!(out, "LIMIT {limit}");
    }
    out.truncate(out.trim_end().len());
    out
}

/// DuckDB spelling of a Trilogy function call.
fn render_call(function: &str, args: &[String]) -> Result<String, RenderError> {
    let arity = |expected: &'static str, ok: bool| {
        if ok {
            Ok(())
        } else {
            Err(RenderError::Arity {
                function: function.to_string(),
                expected,
                found: args.len(),
            })
        }
    };

    let sql = match function {
        "count" => {
            arity("1", args.len() == 1)?;
            if args[0] == "1" || args[0] == "*" {
                format!("count({})", args[0])
            } else {
                format!("count(DISTINCT {})", args[0])
            }
        }
        "cast" => {
            arity("2", args.len() == 2)?;
            format!("CAST({} AS {})", args[0], args[1])
        }
        "date" => {
            arity("3", args.len() == 3)?;
            format!("make_date({})", args.join(", "))
        }
        "today" => {
            arity("0", args.is_empty())?;
            "current_date".to_string()
        }
        "now" => {
            arity("0", args.is_empty())?;
            "current_timestamp".to_string()
        }
        "if" => {
            arity("3", args.len() == 3)?;
            format!("CASE WHEN {} THEN {} ELSE {} END", args[0], args[1], args[2])
        }
        "case" => {
            arity("at least 2", args.len() >= 2)?;
            let mut sql = String::from("CASE");
            for pair in args.chunks(2) {
                match pair {
                    [condition, value] => {
                        let _ = write!(sql, " WHEN {condition} THEN {value}");
                    }
                    [default] => {
                        let _ = write!(sql, " ELSE {default}");
                    }
                    _ => {}
                }
            }
            sql.push_str(" END");
            sql
        }
        "like" => {
            arity("2", args.len() == 2)?;
            format!("{} LIKE {}", args[0], args[1])
        }
        "string_agg" => {
            arity("2", args.len() == 2)?;
            format!("string_agg({}, {})", args[0], args[1])
        }
        "year" | "month" | "day" => {
            arity("1", args.len() == 1)?;
            format!("{function}({})", args[0])
        }
        other => format!("{other}({})", args.join(", ")),
    };
    Ok(sql)
}
