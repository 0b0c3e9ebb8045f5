//! Two-pass construction of an [`Environment`] and statement list.
//!
//! Pass one registers declarations, loads imports and parks anything that
//! refers to concepts not declared yet. Pass two resolves the parked
//! derivations to a fixed point, then binds datasources and queries in
//! document order.

use std::sync::Arc;

use indexmap::IndexSet;
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::SemanticBuilder;
use super::concept::{Concept, ConceptMetadata, ConceptSource, DataType, Modifier, Purpose};
use super::environment::{
    ColumnAssignment, Datasource, DatasourceAddress, Environment, ImportRecord,
};
use super::error::SemanticError;
use super::expr::{BinaryOp, Expr, Literal, UnaryOp, is_known_function};
use super::imports::ImportLoader;
use super::statements::{
    AlignItem, MultiSelectStatement, OrderItem, PersistStatement, RawSqlStatement, SelectItem,
    SelectStatement, Statement, StatementMeta,
};
use crate::parser::SourceParser;
use crate::syntax::{ParseTree, TokenKind, TreeElement, TreeKind, TreeToken};

/// Why a statement could not be built yet.
enum Deferral {
    /// Refers to a concept that may be declared further down.
    Unresolved { name: String, line: u32 },
    Failed(SemanticError),
}

impl From<SemanticError> for Deferral {
    fn from(error: SemanticError) -> Self {
        Deferral::Failed(error)
    }
}

type BuildResult<T> = Result<T, Deferral>;

enum Slot {
    Ready(Statement),
    Pending(ParseTree),
}

/// The reference [`SemanticBuilder`].
pub struct StatementBuilder {
    env: Environment,
    parser: Arc<dyn SourceParser>,
    loader: Arc<dyn ImportLoader>,
    /// Import paths currently being compiled, outermost first
    import_stack: Vec<String>,
    lines: Vec<String>,
    slots: Vec<Slot>,
    prepared: bool,
}

impl StatementBuilder {
    pub fn new(
        env: Environment,
        parser: Arc<dyn SourceParser>,
        loader: Arc<dyn ImportLoader>,
    ) -> Self {
        Self {
            env,
            parser,
            loader,
            import_stack: Vec::new(),
            lines: Vec::new(),
            slots: Vec::new(),
            prepared: false,
        }
    }

    fn nested(&self, path: &str) -> Self {
        let mut env = Environment::new();
        env.working_path = self.env.working_path.clone();
        let mut builder = Self::new(env, self.parser.clone(), self.loader.clone());
        builder.import_stack = self.import_stack.clone();
        builder.import_stack.push(path.to_string());
        builder
    }

    // =========================================================================
    // Pass one
    // =========================================================================

    fn first_pass(&mut self, node: &ParseTree) -> Result<Slot, SemanticError> {
        match node.kind {
            TreeKind::ConceptDeclaration => self.declaration(node).map(Slot::Ready),
            TreeKind::ConceptPropertyDeclaration | TreeKind::ConceptDerivation => {
                match self.derived_concept(node) {
                    Ok(statement) => Ok(Slot::Ready(statement)),
                    Err(Deferral::Unresolved { name, line }) => {
                        trace!("Deferring concept on line {} until '{}' is known", line, name);
                        Ok(Slot::Pending(node.clone()))
                    }
                    Err(Deferral::Failed(error)) => Err(error),
                }
            }
            TreeKind::ImportStatement => self.import(node).map(Slot::Ready),
            TreeKind::RawSqlStatement => self.raw_sql(node).map(Slot::Ready),
            TreeKind::Datasource
            | TreeKind::SelectStatement
            | TreeKind::MultiSelectStatement
            | TreeKind::PersistStatement => Ok(Slot::Pending(node.clone())),
            other => Err(SemanticError::malformed(
                "statement",
                line_of(node),
                format!("unexpected {}", other.as_str()),
            )),
        }
    }

    /// `key x int;`
    fn declaration(&mut self, node: &ParseTree) -> Result<Statement, SemanticError> {
        let line = line_of(node);
        let purpose = purpose_of(node)?;
        let name = name_token(node, "concept_declaration")?;
        let datatype = datatype_of(node)?;

        let mut concept = Concept::new(
            name.text.clone(),
            self.env.namespace.clone(),
            purpose,
            datatype,
        );
        if node.tokens().any(|t| t.text == "?") {
            concept.modifiers.push(Modifier::Nullable);
        }
        concept.metadata = self.metadata_for(node);
        self.register(concept.clone(), line)?;
        Ok(Statement::Concept(Box::new(concept), meta_of(node)))
    }

    /// `property parent.x string;` or `metric y <- expr;`
    fn derived_concept(&mut self, node: &ParseTree) -> BuildResult<Statement> {
        let line = line_of(node);
        let purpose = purpose_of(node)?;
        let name = name_token(node, node.kind.as_str())?;

        let mut concept = if node.kind == TreeKind::ConceptPropertyDeclaration {
            let (parent, short) = name.text.rsplit_once('.').ok_or_else(|| {
                SemanticError::malformed("concept_property_declaration", line, "missing parent")
            })?;
            let parent_address = self.resolve_or_defer(parent, line)?;
            let datatype = datatype_of(node)?;
            let mut concept =
                Concept::new(short, self.env.namespace.clone(), purpose, datatype);
            concept.keys = Some(IndexSet::from([parent_address]));
            if node.tokens().any(|t| t.text == "?") {
                concept.modifiers.push(Modifier::Nullable);
            }
            concept
        } else {
            let lineage_node = node
                .nodes()
                .next()
                .ok_or_else(|| SemanticError::malformed("concept_derivation", line, "missing expression"))?;
            let lineage = self.expr(lineage_node)?;
            let datatype = lineage.infer_datatype(&|address| {
                self.env.concept(address).map(|c| c.datatype)
            });
            let mut concept = Concept::derived(
                name.text.clone(),
                self.env.namespace.clone(),
                purpose,
                datatype,
                lineage,
            );
            if purpose == Purpose::Property {
                concept.keys = self.keys_of(&concept);
            }
            concept
        };

        concept.metadata = self.metadata_for(node);
        self.register(concept.clone(), line)?;
        Ok(Statement::Concept(Box::new(concept), meta_of(node)))
    }

    fn keys_of(&self, concept: &Concept) -> Option<IndexSet<String>> {
        let lineage = concept.lineage.as_ref()?;
        let keys: IndexSet<String> = lineage
            .concepts()
            .into_iter()
            .filter(|a| self.env.concept(a).is_some_and(|c| c.purpose == Purpose::Key))
            .map(str::to_string)
            .collect();
        (!keys.is_empty()).then_some(keys)
    }

    /// Add a concept, plus `<key>.count` for keys.
    fn register(&mut self, concept: Concept, line: u32) -> Result<(), SemanticError> {
        let count = (concept.purpose == Purpose::Key).then(|| {
            let mut count = Concept::derived(
                format!("{}.count", concept.name),
                concept.namespace.clone(),
                Purpose::Metric,
                DataType::Integer,
                Expr::Call {
                    function: "count".into(),
                    args: vec![Expr::Concept(concept.address())],
                },
            );
            count.metadata.source = ConceptSource::AutoDerived;
            count
        });

        self.env.add_concept(concept, line)?;
        if let Some(count) = count {
            self.env.add_concept(count, line)?;
        }
        Ok(())
    }

    fn import(&mut self, node: &ParseTree) -> Result<Statement, SemanticError> {
        let line = line_of(node);
        let mut idents = node.identifiers();
        let path = idents
            .next()
            .ok_or_else(|| SemanticError::malformed("import_statement", line, "missing path"))?
            .text
            .to_string();
        let alias = idents.next().map(|t| t.text.to_string());

        if self.import_stack.contains(&path) {
            return Err(SemanticError::CircularImport { path });
        }

        let text = self
            .loader
            .load(&path, self.env.working_path.as_deref())?;
        let tree = self
            .parser
            .parse(&text)
            .map_err(|failure| SemanticError::ImportParse {
                path: path.clone(),
                message: failure
                    .errors
                    .first()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| failure.to_string()),
            })?;

        let mut nested = self.nested(&path);
        nested.set_text(&text);
        nested.prepare();
        nested.transform(&tree)?;
        nested.run_second_pass()?;
        let imported = nested.env;

        let record = ImportRecord { path, alias };
        let namespace = record.namespace().to_string();
        let mut concept_count = 0;
        for concept in imported.user_concepts() {
            let mut concept = concept.requalified(&namespace);
            // Positions point into the imported file, not this one.
            concept.metadata.line = None;
            concept.metadata.column = None;
            concept.metadata.end_line = None;
            concept.metadata.end_column = None;
            self.env.add_concept(concept, line)?;
            concept_count += 1;
        }
        for datasource in imported.datasources.values() {
            let mut datasource = datasource.clone();
            datasource.namespace = namespace.clone();
            for column in &mut datasource.columns {
                column.concept = super::concept::requalify_address(&column.concept, &namespace);
            }
            datasource.grain = datasource
                .grain
                .iter()
                .map(|g| super::concept::requalify_address(g, &namespace))
                .collect();
            self.env.add_datasource(datasource, line)?;
        }
        debug!(
            "Imported '{}' as '{}' ({} concepts)",
            record.path, namespace, concept_count
        );

        self.env.add_import(record.clone());
        Ok(Statement::Import(record, meta_of(node)))
    }

    fn raw_sql(&mut self, node: &ParseTree) -> Result<Statement, SemanticError> {
        let line = line_of(node);
        let text = node
            .tokens()
            .find(|t| t.kind == TokenKind::String)
            .map(|t| unquote(&t.text))
            .ok_or_else(|| SemanticError::malformed("raw_sql", line, "missing query text"))?;
        Ok(Statement::RawSql(RawSqlStatement {
            text,
            meta: meta_of(node),
        }))
    }

    // =========================================================================
    // Pass two
    // =========================================================================

    fn resolve_pending_concepts(&mut self, slots: &mut [Slot]) -> Result<(), SemanticError> {
        loop {
            let mut progressed = false;
            let mut blocked = None;
            for slot in slots.iter_mut() {
                let Slot::Pending(node) = &*slot else {
                    continue;
                };
                if !matches!(
                    node.kind,
                    TreeKind::ConceptPropertyDeclaration | TreeKind::ConceptDerivation
                ) {
                    continue;
                }
                match self.derived_concept(node) {
                    Ok(statement) => {
                        *slot = Slot::Ready(statement);
                        progressed = true;
                    }
                    Err(Deferral::Unresolved { name, line }) => {
                        blocked.get_or_insert((name, line));
                    }
                    Err(Deferral::Failed(error)) => return Err(error),
                }
            }

            match blocked {
                None => return Ok(()),
                Some((address, line)) if !progressed => {
                    return Err(SemanticError::UndefinedConcept { address, line });
                }
                Some(_) => {}
            }
        }
    }

    fn datasource(&mut self, node: &ParseTree) -> Result<Statement, SemanticError> {
        let line = line_of(node);
        let name = name_token(node, "datasource")?;
        let is_root = node.has_keyword("root");

        let mut columns = Vec::new();
        if let Some(list) = node.node(TreeKind::ColumnList) {
            let mut raw: Option<SmolStr> = None;
            for child in &list.children {
                match child {
                    TreeElement::Node(alias) if alias.kind == TreeKind::ColumnAlias => {
                        raw = alias.first_token().map(|t| SmolStr::new(unquote(&t.text)));
                    }
                    TreeElement::Token(token) if token.is_identifier() => {
                        let concept = self.resolve_now(&token.text, token_line(token, line))?;
                        let column = raw.take().unwrap_or_else(|| {
                            let short = token.text.rsplit('.').next().unwrap_or(&token.text);
                            SmolStr::new(short)
                        });
                        columns.push(ColumnAssignment { column, concept });
                    }
                    _ => {}
                }
            }
        }

        let grain = match node.node(TreeKind::GrainClause) {
            Some(clause) => clause
                .identifiers()
                .map(|t| self.resolve_now(&t.text, token_line(t, line)))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let address = if let Some(clause) = node.node(TreeKind::AddressClause) {
            let table = clause
                .identifiers()
                .next()
                .ok_or_else(|| SemanticError::malformed("address", line, "missing table"))?;
            DatasourceAddress::Table(table.text.clone())
        } else if let Some(clause) = node.node(TreeKind::QueryClause) {
            let query = clause
                .tokens()
                .find(|t| t.kind == TokenKind::String)
                .ok_or_else(|| SemanticError::malformed("query", line, "missing query"))?;
            DatasourceAddress::Query(unquote(&query.text))
        } else {
            return Err(SemanticError::malformed("datasource", line, "missing address"));
        };

        let datasource = Datasource {
            name: name.text.clone(),
            namespace: self.env.namespace.clone(),
            columns,
            grain,
            address,
            is_root,
        };
        self.env.add_datasource(datasource.clone(), line)?;
        Ok(Statement::Datasource(Box::new(datasource), meta_of(node)))
    }

    fn query(&mut self, node: &ParseTree) -> Result<Statement, SemanticError> {
        let line = line_of(node);
        match node.kind {
            TreeKind::SelectStatement => self.select(node).map(Statement::Select),
            TreeKind::MultiSelectStatement => {
                let selects = node
                    .nodes()
                    .filter(|n| n.kind == TreeKind::SelectStatement)
                    .map(|n| self.select(n))
                    .collect::<Result<Vec<_>, _>>()?;
                let mut align = Vec::new();
                if let Some(clause) = node.node(TreeKind::AlignClause) {
                    for item in clause.nodes() {
                        let name = name_token(item, "align_item")?;
                        let concepts = item
                            .nodes()
                            .filter_map(|lit| lit.identifiers().next())
                            .map(|t| self.resolve_now(&t.text, token_line(t, line)))
                            .collect::<Result<Vec<_>, _>>()?;
                        if concepts.len() != selects.len() {
                            return Err(SemanticError::malformed(
                                "align_item",
                                line,
                                format!(
                                    "'{}' aligns {} concepts across {} selects",
                                    name.text,
                                    concepts.len(),
                                    selects.len()
                                ),
                            ));
                        }
                        align.push(AlignItem {
                            name: name.text.clone(),
                            concepts,
                        });
                    }
                }
                Ok(Statement::MultiSelect(MultiSelectStatement {
                    selects,
                    align,
                    meta: meta_of(node),
                }))
            }
            TreeKind::PersistStatement => {
                let mut idents = node.identifiers();
                let datasource = idents
                    .next()
                    .ok_or_else(|| SemanticError::malformed("persist", line, "missing datasource"))?
                    .text
                    .clone();
                let table = idents
                    .next()
                    .ok_or_else(|| SemanticError::malformed("persist", line, "missing table"))?
                    .text
                    .clone();
                let select_node = node
                    .node(TreeKind::SelectStatement)
                    .ok_or_else(|| SemanticError::malformed("persist", line, "missing select"))?;
                let select = self.select(select_node)?;
                Ok(Statement::Persist(PersistStatement {
                    datasource,
                    table,
                    select,
                    meta: meta_of(node),
                }))
            }
            other => Err(SemanticError::malformed(
                "statement",
                line,
                format!("unexpected {}", other.as_str()),
            )),
        }
    }

    fn select(&mut self, node: &ParseTree) -> Result<SelectStatement, SemanticError> {
        let line = line_of(node);
        let mut items = Vec::new();
        for item in node.nodes().filter(|n| n.kind == TreeKind::SelectItem) {
            let hidden = item.tokens().any(|t| t.text == "--");
            let concept = if let Some(assignment) = item.node(TreeKind::ConceptAssignment) {
                let token = assignment.identifiers().next().ok_or_else(|| {
                    SemanticError::malformed("select_item", line, "missing concept")
                })?;
                self.resolve_now(&token.text, token_line(token, line))?
            } else if let Some(transform) = item.node(TreeKind::SelectTransform) {
                self.select_transform(transform)?
            } else {
                return Err(SemanticError::malformed("select_item", line, "empty item"));
            };
            items.push(SelectItem { concept, hidden });
        }

        let where_clause = match node.node(TreeKind::WhereClause).and_then(|w| w.nodes().next()) {
            Some(expr) => Some(self.expr_now(expr)?),
            None => None,
        };

        let mut order_by = Vec::new();
        if let Some(clause) = node.node(TreeKind::OrderByClause) {
            for item in clause.nodes() {
                let expr_node = item.nodes().next().ok_or_else(|| {
                    SemanticError::malformed("ordering", line, "missing expression")
                })?;
                order_by.push(OrderItem {
                    expr: self.expr_now(expr_node)?,
                    descending: item.has_keyword("desc"),
                });
            }
        }

        let limit = match node.node(TreeKind::LimitClause) {
            Some(clause) => {
                let token = clause
                    .tokens()
                    .find(|t| t.kind == TokenKind::Number)
                    .ok_or_else(|| SemanticError::malformed("limit", line, "missing count"))?;
                let count = token.text.parse::<u64>().map_err(|e| {
                    SemanticError::malformed("limit", line, e.to_string())
                })?;
                Some(count)
            }
            None => None,
        };

        Ok(SelectStatement {
            items,
            where_clause,
            order_by,
            limit,
            meta: meta_of(node),
        })
    }

    /// `expr -> alias` registers `alias` as a new concept.
    fn select_transform(&mut self, node: &ParseTree) -> Result<String, SemanticError> {
        let line = line_of(node);
        let expr_node = node
            .nodes()
            .next()
            .ok_or_else(|| SemanticError::malformed("select_transform", line, "missing expression"))?;
        let alias = node
            .identifiers()
            .last()
            .ok_or_else(|| SemanticError::malformed("select_transform", line, "missing alias"))?;

        let lineage = self.expr_now(expr_node)?;
        let purpose = if lineage.contains_aggregate() {
            Purpose::Metric
        } else {
            Purpose::Property
        };
        let datatype = lineage.infer_datatype(&|address| self.env.concept(address).map(|c| c.datatype));
        let mut concept = Concept::derived(
            alias.text.clone(),
            self.env.namespace.clone(),
            purpose,
            datatype,
            lineage,
        );
        concept.metadata = ConceptMetadata {
            line: alias.line,
            column: alias.column,
            end_line: alias.end_line,
            end_column: alias.end_column,
            description: None,
            source: ConceptSource::Manual,
        };
        let address = concept.address();
        self.register(concept, line)?;
        Ok(address)
    }

    // =========================================================================
    // Expressions and names
    // =========================================================================

    fn resolve_or_defer(&self, raw: &str, line: u32) -> BuildResult<String> {
        self.env.resolve(raw).ok_or_else(|| Deferral::Unresolved {
            name: raw.to_string(),
            line,
        })
    }

    fn resolve_now(&self, raw: &str, line: u32) -> Result<String, SemanticError> {
        self.env
            .resolve(raw)
            .ok_or_else(|| SemanticError::UndefinedConcept {
                address: raw.to_string(),
                line,
            })
    }

    fn expr_now(&self, node: &ParseTree) -> Result<Expr, SemanticError> {
        self.expr(node).map_err(|deferral| match deferral {
            Deferral::Unresolved { name, line } => SemanticError::UndefinedConcept {
                address: name,
                line,
            },
            Deferral::Failed(error) => error,
        })
    }

    fn expr(&self, node: &ParseTree) -> BuildResult<Expr> {
        let line = line_of(node);
        let malformed = |message: &str| Deferral::Failed(SemanticError::malformed("expression", line, message));
        let child = |index: usize| -> BuildResult<Expr> {
            let operand = node
                .nodes()
                .nth(index)
                .ok_or_else(|| malformed("missing operand"))?;
            self.expr(operand)
        };

        match node.kind {
            TreeKind::ConceptLit => {
                let token = node.identifiers().next().ok_or_else(|| malformed("missing concept"))?;
                let address = self.resolve_or_defer(&token.text, token_line(token, line))?;
                Ok(Expr::Concept(address))
            }
            TreeKind::Literal => {
                let token = node.tokens().next().ok_or_else(|| malformed("missing literal"))?;
                literal(token).map(Expr::Literal).ok_or_else(|| malformed("bad literal"))
            }
            TreeKind::TypeLit => {
                let token = node.tokens().next().ok_or_else(|| malformed("missing type"))?;
                DataType::from_name(&token.text)
                    .map(Expr::Type)
                    .ok_or_else(|| {
                        Deferral::Failed(SemanticError::UnknownDatatype {
                            name: token.text.to_string(),
                            line,
                        })
                    })
            }
            TreeKind::CallExpr => {
                let name = node.tokens().next().ok_or_else(|| malformed("missing function"))?;
                if !is_known_function(&name.text) {
                    return Err(Deferral::Failed(SemanticError::UnknownFunction {
                        name: name.text.to_string(),
                        line,
                    }));
                }
                let args = match node.node(TreeKind::ArgList) {
                    Some(list) => list
                        .nodes()
                        .map(|arg| self.expr(arg))
                        .collect::<BuildResult<Vec<_>>>()?,
                    None => Vec::new(),
                };
                Ok(Expr::Call {
                    function: SmolStr::new(name.text.to_ascii_lowercase()),
                    args,
                })
            }
            TreeKind::ParenExpr => Ok(Expr::Paren(Box::new(child(0)?))),
            TreeKind::BinaryExpr => {
                let op_token = node.tokens().next().ok_or_else(|| malformed("missing operator"))?;
                let op = BinaryOp::from_token(&op_token.text)
                    .ok_or_else(|| malformed("unknown operator"))?;
                Ok(Expr::Binary {
                    op,
                    lhs: Box::new(child(0)?),
                    rhs: Box::new(child(1)?),
                })
            }
            TreeKind::UnaryExpr => {
                let op = if node.has_keyword("not") {
                    UnaryOp::Not
                } else {
                    UnaryOp::Neg
                };
                Ok(Expr::Unary {
                    op,
                    operand: Box::new(child(0)?),
                })
            }
            TreeKind::IsNullExpr => Ok(Expr::IsNull {
                operand: Box::new(child(0)?),
                negated: node.has_keyword("not"),
            }),
            TreeKind::InExpr => {
                let mut operands = node.nodes().map(|n| self.expr(n));
                let operand = operands.next().ok_or_else(|| malformed("missing operand"))??;
                let items = operands.collect::<BuildResult<Vec<_>>>()?;
                Ok(Expr::InList {
                    operand: Box::new(operand),
                    items,
                    negated: node.has_keyword("not"),
                })
            }
            _ => Err(malformed("not an expression")),
        }
    }

    // =========================================================================
    // Source metadata
    // =========================================================================

    fn metadata_for(&self, node: &ParseTree) -> ConceptMetadata {
        let first = node.first_token();
        let last = node.last_token();
        ConceptMetadata {
            line: first.and_then(|t| t.line),
            column: first.and_then(|t| t.column),
            end_line: last.and_then(|t| t.end_line),
            end_column: last.and_then(|t| t.end_column),
            description: last.and_then(|t| self.trailing_comment(t)),
            source: ConceptSource::Manual,
        }
    }

    /// Text of a `#` comment following `token` on the same line.
    fn trailing_comment(&self, token: &TreeToken) -> Option<String> {
        let line = self.lines.get((token.end_line? as usize).checked_sub(1)?)?;
        let after: String = line
            .chars()
            .skip(token.end_column?.saturating_sub(1) as usize)
            .collect();
        let comment = after.trim().strip_prefix('#')?.trim();
        (!comment.is_empty()).then(|| comment.to_string())
    }
}

impl SemanticBuilder for StatementBuilder {
    fn set_text(&mut self, text: &str) {
        self.lines = text.lines().map(str::to_string).collect();
    }

    fn prepare(&mut self) {
        self.slots.clear();
        self.prepared = true;
    }

    fn transform(&mut self, tree: &ParseTree) -> Result<(), SemanticError> {
        if !self.prepared {
            return Err(SemanticError::NotPrepared);
        }
        for node in tree.nodes() {
            let slot = self.first_pass(node)?;
            self.slots.push(slot);
        }
        trace!(
            "First pass: {} statements, {} deferred",
            self.slots.len(),
            self.slots.iter().filter(|s| matches!(s, Slot::Pending(_))).count()
        );
        Ok(())
    }

    fn run_second_pass(&mut self) -> Result<Vec<Statement>, SemanticError> {
        if !self.prepared {
            return Err(SemanticError::NotPrepared);
        }
        let mut slots = std::mem::take(&mut self.slots);
        self.resolve_pending_concepts(&mut slots)?;

        for slot in slots.iter_mut() {
            if let Slot::Pending(node) = &*slot {
                if node.kind == TreeKind::Datasource {
                    let statement = self.datasource(node)?;
                    *slot = Slot::Ready(statement);
                }
            }
        }

        let mut statements = Vec::with_capacity(slots.len());
        for slot in slots {
            let statement = match slot {
                Slot::Ready(statement) => statement,
                Slot::Pending(node) => self.query(&node)?,
            };
            statements.push(statement);
        }
        debug!(
            "Second pass: {} statements, {} concepts",
            statements.len(),
            self.env.concepts.len()
        );
        Ok(statements)
    }

    fn environment(&self) -> &Environment {
        &self.env
    }

    fn into_environment(self: Box<Self>) -> Environment {
        self.env
    }
}

fn line_of(node: &ParseTree) -> u32 {
    node.first_token().and_then(|t| t.line).unwrap_or(1)
}

fn token_line(token: &TreeToken, fallback: u32) -> u32 {
    token.line.unwrap_or(fallback)
}

fn meta_of(node: &ParseTree) -> Option<StatementMeta> {
    node.first_token()
        .and_then(|t| t.line)
        .map(|line| StatementMeta { line })
}

fn purpose_of(node: &ParseTree) -> Result<Purpose, SemanticError> {
    let keyword = node
        .tokens()
        .find(|t| t.kind == TokenKind::Keyword)
        .ok_or_else(|| SemanticError::malformed("concept", line_of(node), "missing purpose"))?;
    Purpose::from_keyword(&keyword.text).ok_or_else(|| {
        SemanticError::malformed(
            "concept",
            line_of(node),
            format!("'{}' is not a purpose", keyword.text),
        )
    })
}

fn name_token<'a>(node: &'a ParseTree, rule: &'static str) -> Result<&'a TreeToken, SemanticError> {
    node.identifiers()
        .next()
        .ok_or_else(|| SemanticError::malformed(rule, line_of(node), "missing name"))
}

fn datatype_of(node: &ParseTree) -> Result<DataType, SemanticError> {
    let line = line_of(node);
    let token = node
        .node(TreeKind::Datatype)
        .and_then(|d| d.tokens().next())
        .ok_or_else(|| SemanticError::malformed("data_type", line, "missing type"))?;
    DataType::from_name(&token.text).ok_or_else(|| SemanticError::UnknownDatatype {
        name: token.text.to_string(),
        line: token_line(token, line),
    })
}

fn literal(token: &TreeToken) -> Option<Literal> {
    match token.kind {
        TokenKind::Number => Some(Literal::Number(token.text.clone())),
        TokenKind::String => Some(Literal::String(unquote(&token.text))),
        TokenKind::Keyword => match token.text.to_ascii_lowercase().as_str() {
            "true" => Some(Literal::Bool(true)),
            "false" => Some(Literal::Bool(false)),
            "null" => Some(Literal::Null),
            _ => None,
        },
        _ => None,
    }
}

fn unquote(text: &str) -> String {
    let quoted = text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')));
    if quoted {
        text[1..text.len() - 1].to_string()
    } else {
        text.to_string()
    }
}
