//! Runnable-statement actions anchored to source lines.

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use crate::base::Span;
use crate::dialect::{Dialect, RenderError};
use crate::semantic::{Environment, Statement};

pub const RUN_QUERY_COMMAND: &str = "trilogy.runQuery";
pub const RENDER_QUERY_COMMAND: &str = "trilogy.renderQuery";

/// An editor action shown above a statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lens {
    /// 0-indexed range the lens is anchored to
    pub range: Span,
    pub title: String,
    pub command_id: String,
    pub arguments: Vec<Value>,
    /// Index of the statement in the resolved sequence
    pub correlation_id: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LensFailure {
    /// The statement carries no source line to anchor to.
    #[error("{kind} statement {index} has no source position")]
    MissingPosition { index: usize, kind: &'static str },

    /// The dialect could not render the statement.
    #[error("failed to render statement {index}: {source}")]
    Render {
        index: usize,
        #[source]
        source: RenderError,
    },

    /// Rendering produced no query for a query statement.
    #[error("statement {index} rendered to nothing")]
    Empty { index: usize },
}

/// Result of building lenses for one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum LensOutcome {
    Built(Vec<Lens>),
    /// Declarations and imports have nothing to run.
    NotRunnable,
    Failed(LensFailure),
}

/// Lenses for one statement.
pub fn statement_lenses(
    index: usize,
    statement: &Statement,
    env: &Environment,
    dialect: &dyn Dialect,
) -> LensOutcome {
    let is_raw = matches!(statement, Statement::RawSql(_));
    if !statement.is_query() && !is_raw {
        return LensOutcome::NotRunnable;
    }
    let Some(meta) = statement.meta() else {
        return LensOutcome::Failed(LensFailure::MissingPosition {
            index,
            kind: statement.kind_name(),
        });
    };
    let line = meta.line.saturating_sub(1);

    if let Statement::RawSql(raw) = statement {
        return LensOutcome::Built(vec![run_lens(index, line, &raw.text)]);
    }

    let sql = match render(statement, env, dialect) {
        Ok(Some(sql)) => sql,
        Ok(None) => return LensOutcome::Failed(LensFailure::Empty { index }),
        Err(source) => return LensOutcome::Failed(LensFailure::Render { index, source }),
    };
    LensOutcome::Built(vec![
        run_lens(index, line, &sql),
        Lens {
            range: Span::from_coords(line, 2, line, 10),
            title: "Render SQL".to_string(),
            command_id: RENDER_QUERY_COMMAND.to_string(),
            arguments: vec![json!([sql]), json!(dialect.name())],
            correlation_id: index,
        },
    ])
}

/// Lenses for every runnable statement. Statements that fail are logged
/// and skipped.
pub fn build_lenses(
    statements: &[Statement],
    env: &Environment,
    dialect: &dyn Dialect,
) -> Vec<Lens> {
    let mut lenses = Vec::new();
    for (index, statement) in statements.iter().enumerate() {
        match statement_lenses(index, statement, env, dialect) {
            LensOutcome::Built(built) => lenses.extend(built),
            LensOutcome::NotRunnable => {}
            LensOutcome::Failed(failure) => debug!("Skipping lens: {failure}"),
        }
    }
    lenses
}

fn render(
    statement: &Statement,
    env: &Environment,
    dialect: &dyn Dialect,
) -> Result<Option<String>, RenderError> {
    let forms = dialect.generate_queries(env, std::slice::from_ref(statement))?;
    forms
        .last()
        .map(|form| dialect.compile_statement(form))
        .transpose()
}

fn run_lens(index: usize, line: u32, sql: &str) -> Lens {
    Lens {
        range: Span::from_coords(line, 1, line, 10),
        title: "Run Query".to_string(),
        command_id: RUN_QUERY_COMMAND.to_string(),
        arguments: vec![json!(sql)],
        correlation_id: index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DuckDbDialect;
    use crate::parser::{SourceParser, TrilogyParser};
    use crate::semantic::{Compiler, RawSqlStatement, TrilogyCompiler};

    fn compile(text: &str) -> (Environment, Vec<Statement>) {
        let tree = TrilogyParser.parse(text).unwrap();
        let mut builder = TrilogyCompiler::default().builder(Environment::new());
        builder.set_text(text);
        builder.prepare();
        builder.transform(&tree).unwrap();
        let statements = builder.run_second_pass().unwrap();
        (builder.into_environment(), statements)
    }

    const MODEL: &str = "key id int;\ndatasource things (id) address things;\n";

    #[test]
    fn test_select_gets_run_and_render_lenses() {
        let (env, statements) = compile(&format!("{MODEL}select id;\n"));
        let lenses = build_lenses(&statements, &env, &DuckDbDialect);
        assert_eq!(lenses.len(), 2);

        let run = &lenses[0];
        assert_eq!(run.title, "Run Query");
        assert_eq!(run.command_id, RUN_QUERY_COMMAND);
        assert_eq!(run.range, Span::from_coords(2, 1, 2, 10));
        assert_eq!(run.correlation_id, 2);
        let sql = run.arguments[0].as_str().unwrap();
        assert!(sql.starts_with("SELECT"));

        let render = &lenses[1];
        assert_eq!(render.range.start.column, 2);
        assert_eq!(render.arguments, vec![json!([sql]), json!("duckdb")]);
    }

    #[test]
    fn test_raw_sql_gets_single_lens() {
        let (env, statements) = compile("raw_sql('select 42');\n");
        let lenses = build_lenses(&statements, &env, &DuckDbDialect);
        assert_eq!(lenses.len(), 1);
        assert_eq!(lenses[0].arguments, vec![json!("select 42")]);
    }

    #[test]
    fn test_render_failure_does_not_stop_batch() {
        let (env, statements) =
            compile(&format!("{MODEL}key orphan int;\nselect orphan;\nselect id;\n"));
        let outcome = statement_lenses(3, &statements[3], &env, &DuckDbDialect);
        assert!(matches!(outcome, LensOutcome::Failed(LensFailure::Render { index: 3, .. })));

        let lenses = build_lenses(&statements, &env, &DuckDbDialect);
        assert_eq!(lenses.len(), 2);
        assert!(lenses.iter().all(|l| l.correlation_id == 4));
    }

    #[test]
    fn test_missing_position_is_reported() {
        let statement = Statement::RawSql(RawSqlStatement {
            text: "select 1".to_string(),
            meta: None,
        });
        let outcome = statement_lenses(0, &statement, &Environment::new(), &DuckDbDialect);
        assert_eq!(
            outcome,
            LensOutcome::Failed(LensFailure::MissingPosition {
                index: 0,
                kind: "raw_sql"
            })
        );
    }

    #[test]
    fn test_declarations_are_not_runnable() {
        let (env, statements) = compile(MODEL);
        assert!(statements
            .iter()
            .enumerate()
            .all(|(i, s)| statement_lenses(i, s, &env, &DuckDbDialect) == LensOutcome::NotRunnable));
    }
}
