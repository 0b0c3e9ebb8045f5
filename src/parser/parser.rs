//! Recursive descent parser for Trilogy
//!
//! Builds a rowan GreenNode tree from tokens.
//! A failed statement is wrapped in an ERROR node up to the next `;` and
//! parsing resumes with the following statement.

use super::lexer::{Lexer, Token};
use super::syntax_kind::SyntaxKind;
use rowan::{Checkpoint, GreenNode, GreenNodeBuilder, TextRange, TextSize};
use smol_str::SmolStr;

use SyntaxKind::*;

/// Type names usable as literals inside expressions (`cast(x, int)`).
pub const TYPE_NAMES: &[&str] = &[
    "int",
    "integer",
    "bigint",
    "string",
    "float",
    "numeric",
    "bool",
    "boolean",
    "date",
    "datetime",
    "timestamp",
];

const STATEMENT_START: &[SyntaxKind] = &[
    KEY_KW,
    PROPERTY_KW,
    METRIC_KW,
    AUTO_KW,
    CONST_KW,
    ROOT_KW,
    DATASOURCE_KW,
    IMPORT_KW,
    SELECT_KW,
    PERSIST_KW,
    RAW_SQL_KW,
];

const EXPR_START: &[SyntaxKind] = &[
    IDENT, INTEGER, FLOAT, STRING, TRUE_KW, FALSE_KW, NULL_KW, L_PAREN, MINUS, NOT_KW,
];

const SELECT_ITEM_END: &[SyntaxKind] = &[
    COMMA, SEMICOLON, WHERE_KW, ORDER_KW, LIMIT_KW, MERGE_KW, ALIGN_KW, ERROR,
];

const COMPARISON_OPS: &[SyntaxKind] = &[EQ, EQ_EQ, BANG_EQ, LT, GT, LT_EQ, GT_EQ, LIKE_KW];

/// Parse result containing the green tree and any errors
#[derive(Debug, Clone)]
pub struct Parse {
    pub green: GreenNode,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Get the root syntax node
    pub fn syntax(&self) -> super::SyntaxNode {
        super::SyntaxNode::new_root(self.green.clone())
    }

    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// An unexpected token, with the token kinds that would have been accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Text of the offending token, `$END` at end of input
    pub found: SmolStr,
    pub expected: Vec<SyntaxKind>,
    pub range: TextRange,
}

/// Marker returned when a statement cannot continue.
struct Abort;

type PResult = Result<(), Abort>;

/// Parse Trilogy source text into a CST
pub fn parse(input: &str) -> Parse {
    let tokens: Vec<_> = Lexer::new(input).collect();
    let mut parser = Parser::new(&tokens, TextSize::of(input));
    parser.parse_source_file();
    parser.finish()
}

/// The parser state
struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    end: TextSize,
    depth: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token<'a>], end: TextSize) -> Self {
        Self {
            tokens,
            pos: 0,
            end,
            depth: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    fn finish(self) -> Parse {
        Parse {
            green: self.builder.finish(),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> SyntaxKind {
        self.current().map(|t| t.kind).unwrap_or(ERROR)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        !self.at_eof() && self.current_kind() == kind
    }

    fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        !self.at_eof() && kinds.contains(&self.current_kind())
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn nth_token(&self, n: usize) -> Option<&Token<'a>> {
        self.tokens[self.pos.min(self.tokens.len())..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(n)
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        // Look ahead, skipping trivia
        self.nth_token(n).map(|t| t.kind).unwrap_or(ERROR)
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    /// Consume the current token along with any trivia after it.
    fn bump(&mut self) {
        if let Some(token) = self.current() {
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
        self.skip_trivia();
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> PResult {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error(&[kind]))
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(token) = self.current() {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.token(token.kind.into(), token.text);
            self.pos += 1;
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, expected: &[SyntaxKind]) -> Abort {
        let (found, range) = match self.current() {
            Some(t) => (
                SmolStr::new(t.text),
                TextRange::at(t.offset, TextSize::of(t.text)),
            ),
            None => (SmolStr::new_static("$END"), TextRange::empty(self.end)),
        };
        self.errors.push(SyntaxError {
            found,
            expected: expected.to_vec(),
            range,
        });
        Abort
    }

    /// Swallow the rest of a failed statement and close its open nodes.
    ///
    /// Stops after the next `;`, or before a statement keyword that starts a
    /// new line. A failed statement has always consumed its own keyword, so
    /// stopping early still makes progress.
    fn recover(&mut self, depth: usize) {
        self.start_node(ERROR);
        while !self.at_eof() {
            let kind = self.current_kind();
            if STATEMENT_START.contains(&kind) && self.at_line_start() {
                break;
            }
            self.bump();
            if kind == SEMICOLON {
                break;
            }
        }
        self.finish_node();
        while self.depth > depth {
            self.finish_node();
        }
    }

    /// Whether the current token is the first non-trivia token on its line.
    fn at_line_start(&self) -> bool {
        self.tokens[..self.pos]
            .iter()
            .rev()
            .take_while(|t| t.kind.is_trivia())
            .any(|t| t.text.contains('\n'))
    }

    // =========================================================================
    // Node building helpers
    // =========================================================================

    fn start_node(&mut self, kind: SyntaxKind) {
        self.builder.start_node(kind.into());
        self.depth += 1;
    }

    fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
        self.depth += 1;
    }

    fn finish_node(&mut self) {
        self.builder.finish_node();
        self.depth -= 1;
    }

    fn checkpoint(&self) -> Checkpoint {
        self.builder.checkpoint()
    }

    /// Wrap a single token in a node.
    fn token_node(&mut self, node: SyntaxKind, token: SyntaxKind) -> PResult {
        self.start_node(node);
        self.expect(token)?;
        self.finish_node();
        Ok(())
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_source_file(&mut self) {
        self.start_node(SOURCE_FILE);
        self.skip_trivia();
        while !self.at_eof() {
            let depth = self.depth;
            if self.statement().is_err() {
                self.recover(depth);
            }
        }
        self.finish_node();
    }

    fn statement(&mut self) -> PResult {
        match self.current_kind() {
            kind if kind.is_purpose() => self.concept_statement(),
            ROOT_KW | DATASOURCE_KW => self.datasource(),
            IMPORT_KW => self.import_statement(),
            SELECT_KW => self.select_statement(),
            PERSIST_KW => self.persist_statement(),
            RAW_SQL_KW => self.raw_sql_statement(),
            _ => Err(self.error(STATEMENT_START)),
        }
    }

    /// `key x int;`, `property x.y string;` or `metric z <- count(x);`
    fn concept_statement(&mut self) -> PResult {
        let is_derivation = self.at(CONST_KW) || self.nth(2) == LEFT_ARROW;
        let is_property = self.at(PROPERTY_KW)
            && self
                .nth_token(1)
                .is_some_and(|t| t.kind == IDENT && t.text.contains('.'));

        let kind = if is_derivation {
            CONCEPT_DERIVATION
        } else if is_property {
            CONCEPT_PROPERTY_DECLARATION
        } else {
            CONCEPT_DECLARATION
        };

        self.start_node(kind);
        self.bump();
        self.expect(IDENT)?;
        if is_derivation {
            self.expect(LEFT_ARROW)?;
            self.expr()?;
        } else {
            self.token_node(DATATYPE, IDENT)?;
            self.eat(QUESTION);
        }
        self.expect(SEMICOLON)?;
        self.finish_node();
        Ok(())
    }

    fn datasource(&mut self) -> PResult {
        self.start_node(DATASOURCE);
        self.eat(ROOT_KW);
        self.expect(DATASOURCE_KW)?;
        self.expect(IDENT)?;
        self.expect(L_PAREN)?;

        self.start_node(COLUMN_LIST);
        loop {
            self.column()?;
            if !self.eat(COMMA) || self.at(R_PAREN) {
                break;
            }
        }
        self.finish_node();
        self.expect(R_PAREN)?;

        if self.at(GRAIN_KW) {
            self.start_node(GRAIN_CLAUSE);
            self.bump();
            self.expect(L_PAREN)?;
            self.expect(IDENT)?;
            while self.eat(COMMA) {
                self.expect(IDENT)?;
            }
            self.expect(R_PAREN)?;
            self.finish_node();
        }

        match self.current_kind() {
            ADDRESS_KW => {
                self.start_node(ADDRESS_CLAUSE);
                self.bump();
                self.expect(IDENT)?;
                self.finish_node();
            }
            QUERY_KW => {
                self.start_node(QUERY_CLAUSE);
                self.bump();
                self.expect(STRING)?;
                self.finish_node();
            }
            _ => return Err(self.error(&[ADDRESS_KW, QUERY_KW, GRAIN_KW])),
        }

        self.expect(SEMICOLON)?;
        self.finish_node();
        Ok(())
    }

    /// `raw_column: concept` or just `concept`
    fn column(&mut self) -> PResult {
        if self.at_any(&[IDENT, STRING]) && self.nth(1) == COLON {
            self.start_node(COLUMN_ALIAS);
            self.bump();
            self.bump();
            self.finish_node();
        }
        self.expect(IDENT)
    }

    fn import_statement(&mut self) -> PResult {
        self.start_node(IMPORT_STATEMENT);
        self.bump();
        self.expect(IDENT)?;
        if self.eat(AS_KW) {
            self.expect(IDENT)?;
        }
        self.expect(SEMICOLON)?;
        self.finish_node();
        Ok(())
    }

    fn select_statement(&mut self) -> PResult {
        let checkpoint = self.checkpoint();
        self.select_body()?;

        if self.at(MERGE_KW) {
            self.start_node_at(checkpoint, SELECT_STATEMENT);
            self.finish_node();
            self.start_node_at(checkpoint, MULTI_SELECT_STATEMENT);
            while self.eat(MERGE_KW) {
                self.start_node(SELECT_STATEMENT);
                self.select_body()?;
                self.finish_node();
            }
            if self.at(ALIGN_KW) {
                self.align_clause()?;
            }
        } else {
            self.start_node_at(checkpoint, SELECT_STATEMENT);
        }

        self.expect(SEMICOLON)?;
        self.finish_node();
        Ok(())
    }

    fn select_body(&mut self) -> PResult {
        self.expect(SELECT_KW)?;
        self.select_item()?;
        while self.eat(COMMA) {
            if self.at_any(&SELECT_ITEM_END[1..]) {
                break;
            }
            self.select_item()?;
        }

        if self.at(WHERE_KW) {
            self.start_node(WHERE_CLAUSE);
            self.bump();
            self.expr()?;
            self.finish_node();
        }

        if self.at(ORDER_KW) {
            self.start_node(ORDER_BY_CLAUSE);
            self.bump();
            self.expect(BY_KW)?;
            self.order_item()?;
            while self.eat(COMMA) {
                self.order_item()?;
            }
            self.finish_node();
        }

        if self.at(LIMIT_KW) {
            self.start_node(LIMIT_CLAUSE);
            self.bump();
            self.expect(INTEGER)?;
            self.finish_node();
        }
        Ok(())
    }

    /// `[--] concept` or `[--] expr -> alias`
    fn select_item(&mut self) -> PResult {
        self.start_node(SELECT_ITEM);
        while self.eat(MINUS_MINUS) {}

        if self.at(IDENT) && SELECT_ITEM_END.contains(&self.nth(1)) {
            self.token_node(CONCEPT_ASSIGNMENT, IDENT)?;
        } else {
            let checkpoint = self.checkpoint();
            self.expr()?;
            if !self.at(ARROW) {
                return Err(self.error(&[ARROW, COMMA, SEMICOLON]));
            }
            self.start_node_at(checkpoint, SELECT_TRANSFORM);
            self.bump();
            self.expect(IDENT)?;
            self.finish_node();
        }

        self.finish_node();
        Ok(())
    }

    fn order_item(&mut self) -> PResult {
        self.start_node(ORDER_ITEM);
        self.expr()?;
        if self.at_any(&[ASC_KW, DESC_KW]) {
            self.bump();
        }
        self.finish_node();
        Ok(())
    }

    /// `align name: a.x, b.y and other: a.z, b.w`
    fn align_clause(&mut self) -> PResult {
        self.start_node(ALIGN_CLAUSE);
        self.bump();
        loop {
            self.start_node(ALIGN_ITEM);
            self.expect(IDENT)?;
            self.expect(COLON)?;
            self.token_node(CONCEPT_LIT, IDENT)?;
            while self.eat(COMMA) {
                self.token_node(CONCEPT_LIT, IDENT)?;
            }
            self.finish_node();
            if !self.eat(AND_KW) {
                break;
            }
        }
        self.finish_node();
        Ok(())
    }

    fn persist_statement(&mut self) -> PResult {
        self.start_node(PERSIST_STATEMENT);
        self.bump();
        self.expect(IDENT)?;
        self.expect(INTO_KW)?;
        self.expect(IDENT)?;
        self.expect(FROM_KW)?;
        self.start_node(SELECT_STATEMENT);
        self.select_body()?;
        self.finish_node();
        self.expect(SEMICOLON)?;
        self.finish_node();
        Ok(())
    }

    fn raw_sql_statement(&mut self) -> PResult {
        self.start_node(RAW_SQL_STATEMENT);
        self.bump();
        self.expect(L_PAREN)?;
        self.expect(STRING)?;
        self.expect(R_PAREN)?;
        self.expect(SEMICOLON)?;
        self.finish_node();
        Ok(())
    }

    // =========================================================================
    // Expressions (lowest to highest precedence)
    // =========================================================================

    fn expr(&mut self) -> PResult {
        self.or_expr()
    }

    fn or_expr(&mut self) -> PResult {
        let checkpoint = self.checkpoint();
        self.and_expr()?;
        while self.at(OR_KW) {
            self.start_node_at(checkpoint, BINARY_EXPR);
            self.bump();
            self.and_expr()?;
            self.finish_node();
        }
        Ok(())
    }

    fn and_expr(&mut self) -> PResult {
        let checkpoint = self.checkpoint();
        self.not_expr()?;
        while self.at(AND_KW) {
            self.start_node_at(checkpoint, BINARY_EXPR);
            self.bump();
            self.not_expr()?;
            self.finish_node();
        }
        Ok(())
    }

    fn not_expr(&mut self) -> PResult {
        if self.at(NOT_KW) {
            self.start_node(UNARY_EXPR);
            self.bump();
            self.not_expr()?;
            self.finish_node();
            Ok(())
        } else {
            self.comparison()
        }
    }

    fn comparison(&mut self) -> PResult {
        let checkpoint = self.checkpoint();
        self.additive()?;

        if self.at_any(COMPARISON_OPS) {
            self.start_node_at(checkpoint, BINARY_EXPR);
            self.bump();
            self.additive()?;
            self.finish_node();
        } else if self.at(IS_KW) {
            self.start_node_at(checkpoint, IS_NULL_EXPR);
            self.bump();
            self.eat(NOT_KW);
            self.expect(NULL_KW)?;
            self.finish_node();
        } else if self.at(IN_KW) || (self.at(NOT_KW) && self.nth(1) == IN_KW) {
            self.start_node_at(checkpoint, IN_EXPR);
            self.eat(NOT_KW);
            self.bump();
            self.expect(L_PAREN)?;
            self.expr()?;
            while self.eat(COMMA) {
                self.expr()?;
            }
            self.expect(R_PAREN)?;
            self.finish_node();
        }
        Ok(())
    }

    fn additive(&mut self) -> PResult {
        let checkpoint = self.checkpoint();
        self.multiplicative()?;
        while self.at_any(&[PLUS, MINUS]) {
            self.start_node_at(checkpoint, BINARY_EXPR);
            self.bump();
            self.multiplicative()?;
            self.finish_node();
        }
        Ok(())
    }

    fn multiplicative(&mut self) -> PResult {
        let checkpoint = self.checkpoint();
        self.unary()?;
        while self.at_any(&[STAR, SLASH, PERCENT]) {
            self.start_node_at(checkpoint, BINARY_EXPR);
            self.bump();
            self.unary()?;
            self.finish_node();
        }
        Ok(())
    }

    fn unary(&mut self) -> PResult {
        if self.at(MINUS) {
            self.start_node(UNARY_EXPR);
            self.bump();
            self.unary()?;
            self.finish_node();
            Ok(())
        } else {
            self.atom()
        }
    }

    fn atom(&mut self) -> PResult {
        if self.at_eof() {
            return Err(self.error(EXPR_START));
        }
        match self.current_kind() {
            INTEGER | FLOAT | STRING | TRUE_KW | FALSE_KW | NULL_KW => {
                self.start_node(LITERAL);
                self.bump();
                self.finish_node();
                Ok(())
            }
            L_PAREN => {
                self.start_node(PAREN_EXPR);
                self.bump();
                self.expr()?;
                self.expect(R_PAREN)?;
                self.finish_node();
                Ok(())
            }
            IDENT | LIKE_KW if self.nth(1) == L_PAREN => self.call(),
            IDENT => {
                let is_type = self
                    .current()
                    .is_some_and(|t| TYPE_NAMES.contains(&t.text.to_ascii_lowercase().as_str()));
                let node = if is_type { TYPE_LIT } else { CONCEPT_LIT };
                self.token_node(node, IDENT)
            }
            _ => Err(self.error(EXPR_START)),
        }
    }

    fn call(&mut self) -> PResult {
        self.start_node(CALL_EXPR);
        self.bump();
        self.start_node(ARG_LIST);
        self.expect(L_PAREN)?;
        if !self.at(R_PAREN) {
            self.expr()?;
            while self.eat(COMMA) {
                self.expr()?;
            }
        }
        self.expect(R_PAREN)?;
        self.finish_node();
        self.finish_node();
        Ok(())
    }
}
