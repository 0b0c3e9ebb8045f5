//! Lineage expressions.
//!
//! Concept references inside an [`Expr`] are always canonical addresses.
//! The builder resolves them before constructing the expression.

use std::fmt;

use smol_str::SmolStr;

use super::concept::DataType;

/// Functions the compiler accepts in expressions.
pub const KNOWN_FUNCTIONS: &[&str] = &[
    "count",
    "sum",
    "avg",
    "min",
    "max",
    "coalesce",
    "concat",
    "length",
    "upper",
    "lower",
    "trim",
    "substring",
    "abs",
    "round",
    "floor",
    "ceil",
    "date",
    "year",
    "month",
    "day",
    "now",
    "today",
    "cast",
    "case",
    "if",
    "nullif",
    "like",
    "unnest",
    "array_agg",
    "string_agg",
];

const AGGREGATE_FUNCTIONS: &[&str] = &[
    "count",
    "sum",
    "avg",
    "min",
    "max",
    "array_agg",
    "string_agg",
];

pub fn is_known_function(name: &str) -> bool {
    KNOWN_FUNCTIONS.contains(&name.to_ascii_lowercase().as_str())
}

pub fn is_aggregate_function(name: &str) -> bool {
    AGGREGATE_FUNCTIONS.contains(&name.to_ascii_lowercase().as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Kept as written so rendering is exact.
    Number(SmolStr),
    String(String),
    Bool(bool),
    Null,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => f.write_str(n),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Bool(true) => f.write_str("true"),
            Literal::Bool(false) => f.write_str("false"),
            Literal::Null => f.write_str("null"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Like,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn from_token(text: &str) -> Option<Self> {
        let op = match text.to_ascii_lowercase().as_str() {
            "or" => Self::Or,
            "and" => Self::And,
            "=" | "==" => Self::Eq,
            "!=" => Self::NotEq,
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::LtEq,
            ">=" => Self::GtEq,
            "like" => Self::Like,
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Mod,
            _ => return None,
        };
        Some(op)
    }

    /// SQL spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Or => "OR",
            Self::And => "AND",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }

    pub fn is_boolean(self) -> bool {
        !matches!(
            self,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Concept(String),
    Literal(Literal),
    Type(DataType),
    Call {
        function: SmolStr,
        args: Vec<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    IsNull {
        operand: Box<Expr>,
        negated: bool,
    },
    InList {
        operand: Box<Expr>,
        items: Vec<Expr>,
        negated: bool,
    },
    Paren(Box<Expr>),
}

impl Expr {
    /// Concept addresses referenced anywhere in the expression, in order,
    /// without duplicates.
    pub fn concepts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.walk(&mut |expr| {
            if let Expr::Concept(address) = expr {
                if !out.contains(&address.as_str()) {
                    out.push(address.as_str());
                }
            }
        });
        out
    }

    pub fn contains_aggregate(&self) -> bool {
        let mut found = false;
        self.walk(&mut |expr| {
            if let Expr::Call { function, .. } = expr {
                found |= is_aggregate_function(function);
            }
        });
        found
    }

    /// Rebuild the expression with every concept address rewritten.
    pub fn map_concepts(&self, f: &dyn Fn(&str) -> String) -> Expr {
        let map = |e: &Expr| Box::new(e.map_concepts(f));
        match self {
            Expr::Concept(address) => Expr::Concept(f(address)),
            Expr::Literal(_) | Expr::Type(_) => self.clone(),
            Expr::Call { function, args } => Expr::Call {
                function: function.clone(),
                args: args.iter().map(|a| a.map_concepts(f)).collect(),
            },
            Expr::Binary { op, lhs, rhs } => Expr::Binary {
                op: *op,
                lhs: map(lhs),
                rhs: map(rhs),
            },
            Expr::Unary { op, operand } => Expr::Unary {
                op: *op,
                operand: map(operand),
            },
            Expr::IsNull { operand, negated } => Expr::IsNull {
                operand: map(operand),
                negated: *negated,
            },
            Expr::InList {
                operand,
                items,
                negated,
            } => Expr::InList {
                operand: map(operand),
                items: items.iter().map(|i| i.map_concepts(f)).collect(),
                negated: *negated,
            },
            Expr::Paren(inner) => Expr::Paren(map(inner)),
        }
    }

    /// Best-effort output type given the types of referenced concepts.
    pub fn infer_datatype(&self, concept_type: &dyn Fn(&str) -> Option<DataType>) -> DataType {
        match self {
            Expr::Concept(address) => concept_type(address).unwrap_or(DataType::Unknown),
            Expr::Literal(Literal::Number(n)) if n.contains('.') => DataType::Float,
            Expr::Literal(Literal::Number(_)) => DataType::Integer,
            Expr::Literal(Literal::String(_)) => DataType::String,
            Expr::Literal(Literal::Bool(_)) => DataType::Bool,
            Expr::Literal(Literal::Null) | Expr::Type(_) => DataType::Unknown,
            Expr::Call { function, args } => {
                let first = || {
                    args.first()
                        .map(|a| a.infer_datatype(concept_type))
                        .unwrap_or(DataType::Unknown)
                };
                match function.to_ascii_lowercase().as_str() {
                    "count" | "length" | "year" | "month" | "day" => DataType::Integer,
                    "avg" => DataType::Float,
                    "concat" | "upper" | "lower" | "trim" | "substring" | "string_agg" => {
                        DataType::String
                    }
                    "date" | "today" => DataType::Date,
                    "now" => DataType::Timestamp,
                    "like" => DataType::Bool,
                    "cast" => match args.get(1) {
                        Some(Expr::Type(datatype)) => *datatype,
                        _ => DataType::Unknown,
                    },
                    _ => first(),
                }
            }
            Expr::Binary { op, lhs, rhs } if !op.is_boolean() => {
                let (l, r) = (
                    lhs.infer_datatype(concept_type),
                    rhs.infer_datatype(concept_type),
                );
                if *op == BinaryOp::Div || l == DataType::Float || r == DataType::Float {
                    DataType::Float
                } else {
                    l
                }
            }
            Expr::Binary { .. } | Expr::IsNull { .. } | Expr::InList { .. } => DataType::Bool,
            Expr::Unary {
                op: UnaryOp::Not, ..
            } => DataType::Bool,
            Expr::Unary { operand, .. } | Expr::Paren(operand) => {
                operand.infer_datatype(concept_type)
            }
        }
    }

    fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Expr)) {
        f(self);
        match self {
            Expr::Concept(_) | Expr::Literal(_) | Expr::Type(_) => {}
            Expr::Call { args, .. } => args.iter().for_each(|a| a.walk(f)),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.walk(f);
                rhs.walk(f);
            }
            Expr::Unary { operand, .. } | Expr::IsNull { operand, .. } | Expr::Paren(operand) => {
                operand.walk(f)
            }
            Expr::InList { operand, items, .. } => {
                operand.walk(f);
                items.iter().for_each(|i| i.walk(f));
            }
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Source-like rendering, used as the lineage string in metadata.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Concept(address) => f.write_str(address),
            Expr::Literal(literal) => write!(f, "{literal}"),
            Expr::Type(datatype) => write!(f, "{datatype}"),
            Expr::Call { function, args } => {
                write!(f, "{function}(")?;
                join(f, args)?;
                f.write_str(")")
            }
            Expr::Binary { op, lhs, rhs } => {
                write!(f, "{lhs} {} {rhs}", op.as_str().to_ascii_lowercase())
            }
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => write!(f, "not {operand}"),
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => write!(f, "-{operand}"),
            Expr::IsNull { operand, negated } => {
                let not = if *negated { " not" } else { "" };
                write!(f, "{operand} is{not} null")
            }
            Expr::InList {
                operand,
                items,
                negated,
            } => {
                let not = if *negated { " not" } else { "" };
                write!(f, "{operand}{not} in (")?;
                join(f, items)?;
                f.write_str(")")
            }
            Expr::Paren(inner) => write!(f, "({inner})"),
        }
    }
}
