//! Token types and the keyword / builtin classification tables.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Number,
    Str,
    Bool,
    Identifier,
    Keyword,
    BuiltinFunction,
    BuiltinVariable,
    /// `//@version=N`; the value holds N.
    VersionPragma,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Assign,
    ColonAssign,
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    And,
    Or,
    Not,
    Question,
    Colon,
    Arrow,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Newline,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::Number => "number",
            TokenKind::Str => "string",
            TokenKind::Bool => "boolean",
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::BuiltinFunction => "builtin function",
            TokenKind::BuiltinVariable => "builtin variable",
            TokenKind::VersionPragma => "version pragma",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::Assign => "'='",
            TokenKind::ColonAssign => "':='",
            TokenKind::Equal => "'=='",
            TokenKind::NotEqual => "'!='",
            TokenKind::Greater => "'>'",
            TokenKind::Less => "'<'",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::LessEqual => "'<='",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::Not => "'not'",
            TokenKind::Question => "'?'",
            TokenKind::Colon => "':'",
            TokenKind::Arrow => "'=>'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Newline => "newline",
            TokenKind::Eof => "end of input",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            value: value.into(),
            line,
            column,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

pub const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "switch", "case", "default", "var", "varip", "const", "type",
    "import", "export", "na", "strategy", "indicator", "library",
];

pub const BUILTIN_FUNCTIONS: &[&str] = &[
    // indicators
    "ta.sma",
    "ta.ema",
    "ta.wma",
    "ta.vwma",
    "ta.rma",
    "ta.rsi",
    "ta.macd",
    "ta.bb",
    "ta.atr",
    "ta.tr",
    "ta.stoch",
    "ta.cci",
    "ta.adx",
    "ta.supertrend",
    "ta.vwap",
    "ta.highest",
    "ta.lowest",
    "ta.crossover",
    "ta.crossunder",
    "ta.change",
    "ta.mom",
    "ta.roc",
    "ta.wpr",
    "ta.obv",
    "ta.mfi",
    "ta.pivot",
    "ta.ichimoku",
    // math
    "math.abs",
    "math.max",
    "math.min",
    "math.round",
    "math.floor",
    "math.ceil",
    "math.sqrt",
    "math.pow",
    "math.log",
    "math.exp",
    // strategy
    "strategy.entry",
    "strategy.exit",
    "strategy.close",
    "strategy.close_all",
    "strategy.cancel",
    "strategy.cancel_all",
    "strategy.order",
    // inputs
    "input",
    "input.int",
    "input.float",
    "input.bool",
    "input.string",
    "input.source",
    "input.timeframe",
    // plotting
    "plot",
    "plotshape",
    "plotchar",
    "bgcolor",
    "fill",
    "hline",
    "plotcandle",
    "plotbar",
    // alerts
    "alert",
    "alertcondition",
    // arrays
    "array.new_float",
    "array.push",
    "array.pop",
    "array.get",
    "array.set",
    // strings
    "str.tostring",
    "str.format",
    "request.security",
    // utility
    "nz",
    "fixnan",
    "barssince",
    "valuewhen",
];

pub const BUILTIN_VARIABLES: &[&str] = &[
    "open",
    "high",
    "low",
    "close",
    "volume",
    "time",
    "hl2",
    "hlc3",
    "ohlc4",
    "hlcc4",
    "bar_index",
    "barstate.isfirst",
    "barstate.islast",
    "barstate.ishistory",
    "barstate.isrealtime",
    "barstate.isnew",
    "syminfo.ticker",
    "syminfo.tickerid",
    "syminfo.mintick",
    "timeframe.period",
    "timeframe.multiplier",
    "strategy.position_size",
    "strategy.position_avg_price",
    "strategy.equity",
    "strategy.netprofit",
    "strategy.long",
    "strategy.short",
    "color.red",
    "color.green",
    "color.blue",
    "color.white",
    "color.black",
];

/// Classify an identifier-shaped lexeme against the fixed tables.
pub fn classify_word(word: &str) -> TokenKind {
    match word {
        "true" | "false" => TokenKind::Bool,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "not" => TokenKind::Not,
        _ if KEYWORDS.contains(&word) => TokenKind::Keyword,
        _ if BUILTIN_FUNCTIONS.contains(&word) => TokenKind::BuiltinFunction,
        _ if BUILTIN_VARIABLES.contains(&word) => TokenKind::BuiltinVariable,
        _ => TokenKind::Identifier,
    }
}
