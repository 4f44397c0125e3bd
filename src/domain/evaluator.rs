//! Expression evaluator and signal generation.
//!
//! # Evaluation semantics
//!
//! - Every expression is resolved over a *view*: the oldest `end` bars.
//!   Series results have exactly `end` elements.
//! - `ta.*` calls are computed once over the full bar series, cached by call
//!   node identity and truncated to the view. The cache is dropped whenever a
//!   bar is appended or an input changes.
//! - Variables are resolved lazily at reference time. A variable reached again
//!   while it is still being resolved yields Na.
//! - Ternaries pick a branch by the truthiness of the condition's newest element.
//!
//! # Signal generation
//!
//! - `process_candle`: append a bar, scan entries (first passing guard whose
//!   direction differs from the position wins), then exits while in a position.
//! - `run_backtest`: walk bars 1..N-1; enter only while flat, exit only while in
//!   a position and not on the entry bar.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::ast::{Argument, Expr, NodeId, ParsedStrategy};
use crate::domain::backtest::{BacktestConfig, BacktestReport, TradeEvent};
use crate::domain::functions::{self, CallArgs};
use crate::domain::indicator_helpers::shift;
use crate::domain::ohlcv::{Bar, BarSeries};
use crate::domain::position::Position;
use crate::domain::signal::{Signal, SignalType};
use crate::domain::value::{self, Value, flag};

/// Builtins that read as variables but are computed like indicators.
const INDICATOR_VARIABLES: &[&str] = &["ta.tr", "ta.obv", "ta.vwap"];

#[derive(Debug, Clone, Copy)]
struct Frame {
    end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GuardKey {
    Entry(usize),
    Exit(usize),
}

pub struct Evaluator {
    strategy: Arc<ParsedStrategy>,
    symbol: String,
    bars: BarSeries,
    overrides: HashMap<String, Value>,
    indicator_cache: HashMap<NodeId, Value>,
    guard_cache: HashMap<(GuardKey, Position), Value>,
    position: Position,
    entry_quantity: f64,
    resolving: Vec<String>,
}

impl Evaluator {
    pub fn new(strategy: Arc<ParsedStrategy>, symbol: impl Into<String>) -> Self {
        Self {
            strategy,
            symbol: symbol.into(),
            bars: BarSeries::new(),
            overrides: HashMap::new(),
            indicator_cache: HashMap::new(),
            guard_cache: HashMap::new(),
            position: Position::Flat,
            entry_quantity: 0.0,
            resolving: Vec::new(),
        }
    }

    pub fn strategy(&self) -> &ParsedStrategy {
        &self.strategy
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &BarSeries {
        &self.bars
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Override an input (or any variable) by name.
    pub fn set_input(&mut self, name: impl Into<String>, value: Value) {
        self.overrides.insert(name.into(), value);
        self.invalidate();
    }

    /// Replace the bar history in bulk.
    pub fn load_bars<I: IntoIterator<Item = Bar>>(&mut self, bars: I) {
        self.bars = BarSeries::from_bars(bars);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.indicator_cache.clear();
        self.guard_cache.clear();
    }

    fn full_frame(&self) -> Frame {
        Frame {
            end: self.bars.len(),
        }
    }

    /// Resolve an expression over the whole bar series.
    pub fn resolve(&mut self, expr: &Expr) -> Value {
        let frame = self.full_frame();
        self.eval(expr, frame)
    }

    /// Resolve a variable or input by name over the whole bar series.
    pub fn resolve_name(&mut self, name: &str) -> Value {
        let frame = self.full_frame();
        self.lookup(name, frame)
    }

    fn eval(&mut self, expr: &Expr, frame: Frame) -> Value {
        match expr {
            Expr::Literal(lit) => Value::from(lit),
            Expr::SeriesRef(name) => self.lookup(name, frame),
            Expr::Call { id, name, args } => self.call(*id, name, args, frame),
            Expr::Binary { op, left, right } => {
                let l = self.eval(left, frame);
                let r = self.eval(right, frame);
                value::binary(*op, l, r)
            }
            Expr::Unary { op, operand } => {
                let v = self.eval(operand, frame);
                value::unary(*op, v)
            }
            Expr::Ternary {
                condition,
                when_true,
                when_false,
            } => {
                if self.eval(condition, frame).is_truthy() {
                    self.eval(when_true, frame)
                } else {
                    self.eval(when_false, frame)
                }
            }
            Expr::Indexed { name, offset } => {
                let base = self.lookup(name, frame);
                match self.eval(offset, frame).as_number() {
                    Some(k) if k.is_finite() && k >= 0.0 => lag(base, k.round() as usize),
                    _ => Value::Na,
                }
            }
        }
    }

    fn lookup(&mut self, name: &str, frame: Frame) -> Value {
        let end = frame.end;
        if let Some(v) = self.overrides.get(name).cloned() {
            // a text override naming a price column selects that column
            if let Value::Text(text) = &v
                && let Some(col) = self.bars.column(text)
            {
                return Value::Series(col[..end].to_vec());
            }
            return v;
        }
        if let Some(col) = self.bars.column(name) {
            return Value::Series(col[..end].to_vec());
        }
        match name {
            "time" => {
                return Value::Series(
                    self.bars.timestamps[..end]
                        .iter()
                        .map(|t| t.and_utc().timestamp_millis() as f64)
                        .collect(),
                );
            }
            "bar_index" => return Value::Series((0..end).map(|i| i as f64).collect()),
            "na" => return Value::Number(f64::NAN),
            "strategy.position_size" => return Value::Number(self.position.sign()),
            "strategy.long" => return Value::Text("long".into()),
            "strategy.short" => return Value::Text("short".into()),
            "barstate.isfirst" => return Value::Series((0..end).map(|i| flag(i == 0)).collect()),
            "barstate.islast" => {
                return Value::Series((0..end).map(|i| flag(i + 1 == end)).collect());
            }
            "syminfo.ticker" | "syminfo.tickerid" => return Value::Text(self.symbol.clone()),
            _ if INDICATOR_VARIABLES.contains(&name) => {
                return functions::indicator(name, &CallArgs::default(), &self.bars)
                    .map(|v| v.truncate(end))
                    .unwrap_or(Value::Na);
            }
            _ => {}
        }

        let strategy = Arc::clone(&self.strategy);
        if let Some(expr) = strategy.variables.get(name) {
            return self.resolve_variable(name, expr, frame);
        }
        if let Some(input) = strategy.inputs.get(name) {
            return input.default.as_ref().map(Value::from).unwrap_or(Value::Na);
        }
        if let Some((base, field)) = name.rsplit_once('.')
            && (strategy.variables.contains_key(base) || self.overrides.contains_key(base))
        {
            return self
                .lookup(base, frame)
                .component(field)
                .unwrap_or(Value::Na);
        }
        debug!(reference = name, "unresolved reference");
        Value::Na
    }

    fn resolve_variable(&mut self, name: &str, expr: &Expr, frame: Frame) -> Value {
        if self.resolving.iter().any(|n| n == name) {
            warn!(variable = name, "cyclic variable reference");
            return Value::Na;
        }
        self.resolving.push(name.to_string());
        let v = self.eval(expr, frame);
        self.resolving.pop();
        v
    }

    fn eval_args(&mut self, args: &[Argument], frame: Frame) -> CallArgs {
        let mut positional = Vec::new();
        let mut named = Vec::new();
        for arg in args {
            let v = self.eval(&arg.value, frame);
            match &arg.name {
                Some(n) => named.push((n.clone(), v)),
                None => positional.push(v),
            }
        }
        CallArgs::new(positional, named)
    }

    fn call(
        &mut self,
        id: NodeId,
        name: &str,
        args: &[Argument],
        frame: Frame,
    ) -> Value {
        if name.starts_with("ta.") {
            if let Some(v) = self.indicator_cache.get(&id) {
                return v.clone().truncate(frame.end);
            }
            let full = self.full_frame();
            let call_args = self.eval_args(args, full);
            let v = functions::indicator(name, &call_args, &self.bars).unwrap_or_else(|| {
                warn!(function = name, "unknown builtin function");
                Value::Na
            });
            self.indicator_cache.insert(id, v.clone());
            return v.truncate(frame.end);
        }

        let call_args = self.eval_args(args, frame);
        functions::call(name, &call_args).unwrap_or_else(|| {
            warn!(function = name, "unknown builtin function");
            Value::Na
        })
    }

    /// Compute every registered indicator over the current bars.
    fn precompute(&mut self) {
        let strategy = Arc::clone(&self.strategy);
        let full = self.full_frame();
        for expr in &strategy.indicators {
            self.eval(expr, full);
        }
    }

    fn guard_passes(&mut self, guard: Option<&Expr>, frame: Frame) -> bool {
        match guard {
            None => true,
            Some(g) => self.eval(g, frame).is_truthy(),
        }
    }

    fn scalar(&mut self, expr: Option<&Expr>, frame: Frame) -> Option<f64> {
        let expr = expr?;
        self.eval(expr, frame).as_number().filter(|n| n.is_finite())
    }

    /// Append one bar and emit the signal for it.
    pub fn process_candle(&mut self, bar: Bar) -> Signal {
        self.bars.push(bar);
        self.invalidate();
        self.precompute();

        let frame = self.full_frame();
        let price = self.bars.last_close().unwrap_or(f64::NAN);
        let strategy = Arc::clone(&self.strategy);

        for entry in &strategy.entry_conditions {
            let target = Position::from(entry.direction);
            if target == self.position || !self.guard_passes(entry.guard.as_ref(), frame) {
                continue;
            }
            let quantity = self.scalar(entry.quantity.as_ref(), frame).unwrap_or(1.0);
            let stop_loss = self.scalar(entry.stop.as_ref(), frame);
            let take_profit = self.scalar(entry.target.as_ref(), frame);
            self.position = target;
            self.entry_quantity = quantity;
            let signal = Signal {
                kind: SignalType::entry(entry.direction),
                symbol: self.symbol.clone(),
                price,
                quantity,
                stop_loss,
                target: take_profit,
            };
            debug!(bar = frame.end - 1, signal = %signal, "entry signal");
            return signal;
        }

        if let Some(direction) = self.position.direction() {
            for exit in &strategy.exit_conditions {
                if !self.guard_passes(exit.guard.as_ref(), frame) {
                    continue;
                }
                self.position = Position::Flat;
                let signal = Signal {
                    kind: SignalType::exit(direction),
                    symbol: self.symbol.clone(),
                    price,
                    quantity: self.entry_quantity,
                    stop_loss: None,
                    target: None,
                };
                debug!(
                    bar = frame.end - 1,
                    close_all = exit.is_close_all(),
                    signal = %signal,
                    "exit signal"
                );
                return signal;
            }
        }

        Signal::none(&self.symbol)
    }

    /// Whether a guard reads differently from a prefix of the bars than from
    /// the full series at the same index.
    fn depends_on_view(&self, expr: &Expr, visited: &mut HashSet<String>) -> bool {
        match expr {
            Expr::Literal(_) => false,
            Expr::Ternary { .. } => true,
            Expr::SeriesRef(name) => self.name_depends_on_view(name, visited),
            Expr::Indexed { name, offset } => {
                !matches!(offset.as_ref(), Expr::Literal(_))
                    || self.name_depends_on_view(name, visited)
            }
            Expr::Call { name, args, .. } => {
                !name.starts_with("ta.")
                    && args.iter().any(|a| self.depends_on_view(&a.value, visited))
            }
            Expr::Binary { left, right, .. } => {
                self.depends_on_view(left, visited) || self.depends_on_view(right, visited)
            }
            Expr::Unary { operand, .. } => self.depends_on_view(operand, visited),
        }
    }

    fn name_depends_on_view(&self, name: &str, visited: &mut HashSet<String>) -> bool {
        if name == "barstate.islast" {
            return true;
        }
        let base = match self.strategy.variables.get(name) {
            Some(_) => name,
            None => name.rsplit_once('.').map_or(name, |(base, _)| base),
        };
        match self.strategy.variables.get(base) {
            Some(expr) if visited.insert(base.to_string()) => self.depends_on_view(expr, visited),
            _ => false,
        }
    }

    /// Guard truthiness at bar `index` of the loaded series.
    fn guard_at(&mut self, key: GuardKey, guard: Option<&Expr>, index: usize) -> bool {
        let Some(guard) = guard else {
            return true;
        };
        if self.depends_on_view(guard, &mut HashSet::new()) {
            return self.eval(guard, Frame { end: index + 1 }).is_truthy();
        }
        let cache_key = (key, self.position);
        if let Some(v) = self.guard_cache.get(&cache_key) {
            return v.truthy_at(index);
        }
        let full = self.full_frame();
        let v = self.eval(guard, full);
        let hit = v.truthy_at(index);
        self.guard_cache.insert(cache_key, v);
        hit
    }

    /// Run the strategy over the loaded bars.
    pub fn run_backtest(&mut self, config: &BacktestConfig) -> BacktestReport {
        self.invalidate();
        self.position = Position::Flat;
        let strategy = Arc::clone(&self.strategy);

        let mut equity = config.initial_capital;
        let mut equity_curve = vec![equity];
        let mut trades = Vec::new();
        let mut entry_price = 0.0;

        for i in 1..self.bars.len() {
            let price = self.bars.close[i];
            let timestamp = self.bars.timestamps[i];
            let mut entered = false;

            if self.position.is_flat() {
                for (k, entry) in strategy.entry_conditions.iter().enumerate() {
                    if !self.guard_at(GuardKey::Entry(k), entry.guard.as_ref(), i) {
                        continue;
                    }
                    self.position = Position::from(entry.direction);
                    entry_price = price;
                    entered = true;
                    debug!(bar = i, price, direction = %entry.direction, "backtest entry");
                    trades.push(TradeEvent::entry(entry.direction, price, i, timestamp));
                    break;
                }
            }

            if !entered && let Some(direction) = self.position.direction() {
                for (k, exit) in strategy.exit_conditions.iter().enumerate() {
                    if !self.guard_at(GuardKey::Exit(k), exit.guard.as_ref(), i) {
                        continue;
                    }
                    let pnl = (price - entry_price) * self.position.sign();
                    equity += pnl;
                    self.position = Position::Flat;
                    debug!(bar = i, price, pnl, "backtest exit");
                    trades.push(TradeEvent::exit(direction, price, i, timestamp, pnl));
                    break;
                }
            }

            equity_curve.push(equity);
        }

        self.position = Position::Flat;
        BacktestReport::new(config, trades, equity_curve)
    }
}

/// Value `offset` bars back. Scalars have no history and are returned as-is.
fn lag(value: Value, offset: usize) -> Value {
    match value.primary() {
        Value::Series(values) => Value::Series(shift(&values, offset)),
        other => other,
    }
}
