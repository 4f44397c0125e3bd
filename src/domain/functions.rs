//! Builtin function dispatch.
//!
//! `indicator` maps `ta.*` names onto the indicator library; `call` covers the
//! scalar/element-wise builtins (`math.*`, `nz`, `na`, `input*`). Both return
//! `None` for names they do not know so the caller can log and fall back to Na.

use crate::domain::indicator::{
    adx::adx, bollinger::bollinger, cci::cci, cross, ema, extremes, ichimoku::ichimoku, macd::macd,
    mfi::mfi, obv::obv, pivot::pivot_points, roc, rsi::rsi, sma::sma, stochastic::stochastic,
    supertrend::supertrend, vwap::vwap, wma,
};
use crate::domain::indicator_helpers::{calc_atr, true_range};
use crate::domain::ohlcv::BarSeries;
use crate::domain::value::{Value, flag, map_with, zip_with};

/// Resolved arguments of one call, positional and named kept apart.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn new(positional: Vec<Value>, named: Vec<(String, Value)>) -> Self {
        Self { positional, named }
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    fn named_value(&self, names: &[&str]) -> Option<&Value> {
        self.named
            .iter()
            .find(|(n, _)| names.contains(&n.as_str()))
            .map(|(_, v)| v)
    }

    /// Named argument if present, otherwise the positional one at `index`.
    pub fn get(&self, index: usize, names: &[&str]) -> Option<&Value> {
        self.named_value(names)
            .or_else(|| self.positional.get(index))
    }

    pub fn number(&self, index: usize, names: &[&str], default: f64) -> f64 {
        self.get(index, names)
            .and_then(Value::as_number)
            .filter(|n| n.is_finite())
            .unwrap_or(default)
    }

    /// Window length; non-positive or undefined lengths fall back to `default`.
    pub fn length(&self, index: usize, names: &[&str], default: usize) -> usize {
        match self.get(index, names).and_then(Value::as_number) {
            Some(n) if n.is_finite() && n >= 1.0 => n.round() as usize,
            _ => default,
        }
    }

    pub fn series(&self, index: usize, names: &[&str], len: usize) -> Option<Vec<f64>> {
        self.get(index, names).and_then(|v| v.to_series(len))
    }

    /// Number of positional arguments at the front that stand for a source
    /// rather than a length. Absent values count so they can propagate.
    pub fn leading_sources(&self) -> usize {
        self.positional
            .iter()
            .take_while(|v| !matches!(v, Value::Number(_)))
            .count()
    }

    /// Whether an optional leading source was supplied at all.
    fn has_source(&self) -> bool {
        self.named_value(SOURCE_NAMES).is_some()
            || self.positional.len() >= 2
            || self.leading_sources() >= 1
    }

    /// Positional index of the length when the source is optional.
    fn length_slot(&self) -> usize {
        usize::from(self.has_source() && self.named_value(SOURCE_NAMES).is_none())
    }
}

const SOURCE_NAMES: &[&str] = &["source", "src"];

/// Every `ta.*` name `indicator` understands.
pub const INDICATOR_NAMES: &[&str] = &[
    "ta.sma",
    "ta.ema",
    "ta.rma",
    "ta.wma",
    "ta.vwma",
    "ta.rsi",
    "ta.macd",
    "ta.bb",
    "ta.tr",
    "ta.atr",
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
];

fn series(values: Vec<f64>) -> Value {
    Value::Series(values)
}

/// Evaluate a `ta.*` builtin over the full bar series.
///
/// `None` means the name is unknown. A source argument that is supplied but
/// absent yields `Na` rather than falling back to close.
pub fn indicator(name: &str, args: &CallArgs, bars: &BarSeries) -> Option<Value> {
    if !INDICATOR_NAMES.contains(&name) {
        return None;
    }
    Some(compute(name, args, bars).unwrap_or(Value::Na))
}

fn compute(name: &str, args: &CallArgs, bars: &BarSeries) -> Option<Value> {
    let n = bars.len();
    // close when omitted, None when supplied but not numeric
    let source = |index: usize| match args.get(index, SOURCE_NAMES) {
        None => Some(bars.close.clone()),
        Some(v) => v.to_series(n),
    };
    let leading = args.leading_sources();

    let value = match name {
        "ta.sma" => series(sma(&source(0)?, args.length(1, &["length"], 14))),
        "ta.ema" => series(ema::ema(&source(0)?, args.length(1, &["length"], 14))),
        "ta.rma" => series(ema::rma(&source(0)?, args.length(1, &["length"], 14))),
        "ta.wma" => series(wma::wma(&source(0)?, args.length(1, &["length"], 14))),
        "ta.vwma" => series(wma::vwma(
            &source(0)?,
            &bars.volume,
            args.length(1, &["length"], 14),
        )),
        "ta.rsi" => series(rsi(&source(0)?, args.length(1, &["length"], 14))),
        "ta.macd" => Value::Tuple(
            macd(
                &source(0)?,
                args.length(1, &["fast", "fastlen"], 12),
                args.length(2, &["slow", "slowlen"], 26),
                args.length(3, &["signal", "siglen"], 9),
            )
            .into_outputs(),
        ),
        "ta.bb" => Value::Tuple(
            bollinger(
                &source(0)?,
                args.length(1, &["length"], 20),
                args.number(2, &["mult"], 2.0),
            )
            .into_outputs(),
        ),
        "ta.tr" => series(true_range(&bars.high, &bars.low, &bars.close)),
        "ta.atr" => series(calc_atr(
            &bars.high,
            &bars.low,
            &bars.close,
            args.length(0, &["length"], 14),
        )),
        "ta.stoch" => {
            let (close, high, low) = if leading >= 3 {
                (source(0)?, source(1)?, source(2)?)
            } else if leading >= 1 {
                (source(0)?, bars.high.clone(), bars.low.clone())
            } else {
                (bars.close.clone(), bars.high.clone(), bars.low.clone())
            };
            let p = leading.min(3);
            Value::Tuple(
                stochastic(
                    &high,
                    &low,
                    &close,
                    args.length(p, &["length", "k"], 14),
                    args.length(p + 1, &["smooth_k"], 1),
                    args.length(p + 2, &["smooth_d", "d"], 3),
                )
                .into_outputs(),
            )
        }
        "ta.cci" => {
            let src = if args.has_source() {
                source(0)?
            } else {
                bars.hlc3.clone()
            };
            let p = args.length_slot();
            series(cci(&src, args.length(p, &["length"], 20)))
        }
        "ta.adx" => series(adx(
            &bars.high,
            &bars.low,
            &bars.close,
            args.length(0, &["length"], 14),
        )),
        "ta.supertrend" => Value::Tuple(
            supertrend(
                &bars.high,
                &bars.low,
                &bars.close,
                args.length(0, &["length", "atrPeriod"], 10),
                args.number(1, &["mult", "factor"], 3.0),
            )
            .into_outputs(),
        ),
        "ta.vwap" => series(vwap(&bars.high, &bars.low, &bars.close, &bars.volume)),
        "ta.highest" | "ta.lowest" => {
            let is_high = name == "ta.highest";
            let src = if args.has_source() {
                source(0)?
            } else if is_high {
                bars.high.clone()
            } else {
                bars.low.clone()
            };
            let p = args.length_slot();
            let length = args.length(p, &["length"], 14);
            if is_high {
                series(extremes::highest(&src, length))
            } else {
                series(extremes::lowest(&src, length))
            }
        }
        "ta.crossover" | "ta.crossunder" => {
            let a = args.series(0, &["source1"], n)?;
            let b = args.series(1, &["source2"], n)?;
            if name == "ta.crossover" {
                series(cross::crossover(&a, &b))
            } else {
                series(cross::crossunder(&a, &b))
            }
        }
        "ta.change" => series(roc::change(&source(0)?, args.length(1, &["length"], 1))),
        "ta.mom" => series(roc::momentum(&source(0)?, args.length(1, &["length"], 10))),
        "ta.roc" => series(roc::roc(&source(0)?, args.length(1, &["length"], 10))),
        "ta.wpr" => series(extremes::williams_r(
            &bars.high,
            &bars.low,
            &bars.close,
            args.length(0, &["length"], 14),
        )),
        "ta.obv" => series(obv(&bars.close, &bars.volume)),
        "ta.mfi" => {
            let src = if args.has_source() {
                source(0)?
            } else {
                bars.hlc3.clone()
            };
            let p = args.length_slot();
            series(mfi(&src, &bars.volume, args.length(p, &["length"], 14)))
        }
        "ta.pivot" => Value::Tuple(pivot_points(&bars.high, &bars.low, &bars.close).into_outputs()),
        "ta.ichimoku" => Value::Tuple(
            ichimoku(
                &bars.high,
                &bars.low,
                args.length(0, &["tenkan"], 9),
                args.length(1, &["kijun"], 26),
                args.length(2, &["senkou"], 52),
            )
            .into_outputs(),
        ),
        _ => return None,
    };
    Some(value)
}

fn unary_math(args: &CallArgs, f: fn(f64) -> f64) -> Value {
    match args.get(0, &["number", "x"]) {
        Some(v) => map_with(v.clone(), f),
        None => Value::Na,
    }
}

/// Evaluate a non-indicator builtin on already-resolved arguments.
pub fn call(name: &str, args: &CallArgs) -> Option<Value> {
    let value = match name {
        "math.abs" => unary_math(args, f64::abs),
        "math.round" => unary_math(args, f64::round),
        "math.floor" => unary_math(args, f64::floor),
        "math.ceil" => unary_math(args, f64::ceil),
        "math.sqrt" => unary_math(args, f64::sqrt),
        "math.log" => unary_math(args, f64::ln),
        "math.exp" => unary_math(args, f64::exp),
        "math.pow" => match (args.get(0, &["base"]), args.get(1, &["exponent"])) {
            (Some(base), Some(exp)) => zip_with(base.clone(), exp.clone(), f64::powf),
            _ => Value::Na,
        },
        "math.max" | "math.min" => {
            let pick: fn(f64, f64) -> f64 = if name == "math.max" {
                max_nan
            } else {
                min_nan
            };
            let mut values = args.positional().iter().cloned();
            match values.next() {
                Some(first) => values.fold(first, |acc, v| zip_with(acc, v, pick)),
                None => Value::Na,
            }
        }
        "nz" => {
            let replacement = args.number(1, &["replacement"], 0.0);
            match args.get(0, &["source"]) {
                None | Some(Value::Na) => Value::Number(replacement),
                Some(v) => map_with(v.clone(), |x| if x.is_nan() { replacement } else { x }),
            }
        }
        "na" => match args.get(0, &["x"]) {
            None | Some(Value::Na) => Value::Bool(true),
            Some(Value::Number(n)) => Value::Bool(n.is_nan()),
            Some(v) => map_with(v.clone(), |x| flag(x.is_nan())),
        },
        _ if name == "input" || name.starts_with("input.") => args
            .get(0, &["defval"])
            .cloned()
            .unwrap_or(Value::Na),
        _ => return None,
    };
    Some(value)
}

/// NaN-propagating max.
fn max_nan(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.max(b) }
}

fn min_nan(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) }
}
