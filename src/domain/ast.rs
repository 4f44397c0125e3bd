//! Script AST and the parsed strategy record.
//!
//! - `Expr`: closed set of expression node kinds, matched exhaustively by the evaluator
//! - `NodeId`: identity of a call node, used as the indicator cache key
//! - `ParsedStrategy`: declaration, inputs, variables, indicators and the
//!   ordered entry/exit condition lists

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of a `Call` node, assigned in source order at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Text(s) => write!(f, "\"{}\"", s),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Gt => ">",
            BinaryOp::Lt => "<",
            BinaryOp::Ge => ">=",
            BinaryOp::Le => "<=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Gt | BinaryOp::Lt | BinaryOp::Ge | BinaryOp::Le
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    Literal(Literal),
    SeriesRef(String),
    Call {
        id: NodeId,
        name: String,
        args: Vec<Argument>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        when_true: Box<Expr>,
        when_false: Box<Expr>,
    },
    Indexed {
        name: String,
        offset: Box<Expr>,
    },
}

impl Expr {
    pub fn number(n: f64) -> Self {
        Expr::Literal(Literal::Number(n))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::Text(s.into()))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Expr::Literal(Literal::Text(s)) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "{}", lit),
            Expr::SeriesRef(name) => f.write_str(name),
            Expr::Call { name, args, .. } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if let Some(n) = &arg.name {
                        write!(f, "{}=", n)?;
                    }
                    write!(f, "{}", arg.value)?;
                }
                f.write_str(")")
            }
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expr::Unary { op, operand } => match op {
                UnaryOp::Neg => write!(f, "-{}", operand),
                UnaryOp::Not => write!(f, "not {}", operand),
            },
            Expr::Ternary {
                condition,
                when_true,
                when_false,
            } => write!(f, "({} ? {} : {})", condition, when_true, when_false),
            Expr::Indexed { name, offset } => write!(f, "{}[{}]", name, offset),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputConfig {
    /// Builtin that declared it (`input`, `input.int`, ...).
    pub kind: String,
    pub default: Option<Literal>,
    pub title: Option<String>,
    /// Remaining named arguments, in source order.
    pub params: Vec<(String, Literal)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryCondition {
    pub id: Option<String>,
    pub function: String,
    pub direction: Direction,
    pub guard: Option<Expr>,
    pub quantity: Option<Expr>,
    pub stop: Option<Expr>,
    pub target: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExitCondition {
    pub function: String,
    pub id: Option<String>,
    pub guard: Option<Expr>,
}

impl ExitCondition {
    pub fn is_close_all(&self) -> bool {
        self.function.ends_with("close_all")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedStrategy {
    pub version: u32,
    pub name: String,
    pub description: String,
    pub inputs: BTreeMap<String, InputConfig>,
    pub variables: BTreeMap<String, Expr>,
    /// Every `ta.*` call in source order.
    pub indicators: Vec<Expr>,
    pub entry_conditions: Vec<EntryCondition>,
    pub exit_conditions: Vec<ExitCondition>,
    /// `if` conditions keyed `condition_N`. Stored only; signal generation ignores them.
    pub conditions: BTreeMap<String, Expr>,
    #[serde(skip)]
    pub source: String,
}

impl Default for ParsedStrategy {
    fn default() -> Self {
        Self {
            version: 5,
            name: String::new(),
            description: String::new(),
            inputs: BTreeMap::new(),
            variables: BTreeMap::new(),
            indicators: Vec::new(),
            entry_conditions: Vec::new(),
            exit_conditions: Vec::new(),
            conditions: BTreeMap::new(),
            source: String::new(),
        }
    }
}
