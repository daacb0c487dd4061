//=========================================================================
// Option Schema & Value Coercion
//=========================================================================
//
// Every scene declares its configurable parameters as a schema of
// OptionDefs. Stored values arrive from persistence (JSON) or from form
// controls as strings, so each read goes through a coercion pass that
// produces a value of the option's declared or inferred type.
//
// Coercion never fails: unparseable input falls back to the option's
// default, and keys not covered by a schema pass through unchanged so
// the runtime can inject cross-cutting parameters (e.g. a framerate cap)
// without polluting every scene's schema.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

//=== ValueType ===========================================================

/// The concrete type an option value coerces to.
///
/// Usually inferred from the option kind and its default; a schema may
/// override the inference with an explicit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int,
    Float,
    Boolean,
    Text,
}

//=== OptionValue =========================================================

/// A single typed option value.
///
/// Serialized untagged, so persisted JSON stays plain (`2`, `2.5`,
/// `true`, `"mixed"`) and whole numbers deserialize as `Int`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl OptionValue {
    /// Integer view of the value, if it has one.
    ///
    /// Floats truncate toward zero. Numeric-looking strings parse the
    /// same way (`"2"` and `"2.9"` both yield 2). Booleans do not count
    /// as numbers.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(v) => Some(*v),
            OptionValue::Float(v) if v.is_finite() => Some(*v as i64),
            OptionValue::Float(_) => None,
            OptionValue::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| {
                    s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64)
                })
            }
            OptionValue::Bool(_) => None,
        }
    }

    /// Floating-point view of the value, if it has one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            OptionValue::Int(v) => Some(*v as f64),
            OptionValue::Float(v) => Some(*v),
            OptionValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            OptionValue::Bool(_) => None,
        }
    }

    /// Boolean view of the value. Never fails.
    ///
    /// Booleans pass through. The literal strings "true"/"false" compare
    /// case-sensitively; anything else coerces by truthiness (non-empty
    /// string, nonzero number).
    pub fn truthy(&self) -> bool {
        match self {
            OptionValue::Bool(v) => *v,
            OptionValue::Int(v) => *v != 0,
            OptionValue::Float(v) => *v != 0.0,
            OptionValue::Text(s) => match s.as_str() {
                "true" => true,
                "false" => false,
                other => !other.is_empty(),
            },
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(v) => write!(f, "{}", v),
            OptionValue::Int(v) => write!(f, "{}", v),
            OptionValue::Float(v) => write!(f, "{}", v),
            OptionValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for OptionValue {
    fn from(v: i64) -> Self {
        OptionValue::Int(v)
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Float(v)
    }
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

//=== OptionKind ==========================================================

/// The control shape of an option, carrying kind-specific constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionKind {
    /// Numeric slider. An integer by default; a fractional `step` makes
    /// it a float.
    Range {
        min: f64,
        max: f64,
        step: Option<f64>,
    },

    /// Fixed set of choices. The value type is inferred from the default
    /// (or the first entry when no default applies).
    Select {
        values: Vec<OptionValue>,
        labels: Vec<String>,
    },

    /// On/off toggle. Always boolean.
    Checkbox,

    /// Free-form string input.
    Text { placeholder: Option<String> },
}

//=== OptionDef ===========================================================

/// Declaration of one configurable scene parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionDef {
    /// Human-readable name, UI-facing only.
    pub label: String,

    /// Value of the option's natural type. Must be coercible to the
    /// declared/inferred value type without loss.
    pub default: OptionValue,

    pub kind: OptionKind,

    /// Explicit type override; `None` means infer from kind + default.
    pub value_type: Option<ValueType>,
}

impl OptionDef {
    //--- Constructors -----------------------------------------------------

    /// Integer slider.
    pub fn range(label: &str, default: i64, min: i64, max: i64) -> Self {
        Self {
            label: label.to_string(),
            default: OptionValue::Int(default),
            kind: OptionKind::Range {
                min: min as f64,
                max: max as f64,
                step: None,
            },
            value_type: None,
        }
    }

    /// Slider with an explicit step. A fractional step makes the value
    /// type float.
    pub fn range_with_step(label: &str, default: f64, min: f64, max: f64, step: f64) -> Self {
        let default = if step.fract() != 0.0 {
            OptionValue::Float(default)
        } else {
            OptionValue::Int(default as i64)
        };
        Self {
            label: label.to_string(),
            default,
            kind: OptionKind::Range {
                min,
                max,
                step: Some(step),
            },
            value_type: None,
        }
    }

    /// Dropdown over string choices.
    pub fn select(label: &str, default: &str, values: &[&str], labels: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            default: OptionValue::Text(default.to_string()),
            kind: OptionKind::Select {
                values: values.iter().map(|v| OptionValue::Text(v.to_string())).collect(),
                labels: labels.iter().map(|l| l.to_string()).collect(),
            },
            value_type: None,
        }
    }

    /// Dropdown over integer choices.
    pub fn select_int(label: &str, default: i64, values: &[i64], labels: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            default: OptionValue::Int(default),
            kind: OptionKind::Select {
                values: values.iter().map(|v| OptionValue::Int(*v)).collect(),
                labels: labels.iter().map(|l| l.to_string()).collect(),
            },
            value_type: None,
        }
    }

    /// On/off toggle.
    pub fn checkbox(label: &str, default: bool) -> Self {
        Self {
            label: label.to_string(),
            default: OptionValue::Bool(default),
            kind: OptionKind::Checkbox,
            value_type: None,
        }
    }

    /// Free-form text input.
    pub fn text(label: &str, default: &str) -> Self {
        Self {
            label: label.to_string(),
            default: OptionValue::Text(default.to_string()),
            kind: OptionKind::Text { placeholder: None },
            value_type: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        if let OptionKind::Text { placeholder: p } = &mut self.kind {
            *p = Some(placeholder.to_string());
        }
        self
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    //--- Type Inference ---------------------------------------------------

    /// The type this option's values coerce to.
    ///
    /// Explicit `value_type` wins. Otherwise: checkbox → boolean; range →
    /// float when the step is fractional, int otherwise; select → inferred
    /// from the default (or the first choice), where whole numbers are
    /// int; text → string.
    pub fn resolved_type(&self) -> ValueType {
        if let Some(explicit) = self.value_type {
            return explicit;
        }
        match &self.kind {
            OptionKind::Checkbox => ValueType::Boolean,
            OptionKind::Range { step, .. } => match step {
                Some(s) if s.fract() != 0.0 => ValueType::Float,
                _ => ValueType::Int,
            },
            OptionKind::Select { values, .. } => {
                let sample = match &self.default {
                    OptionValue::Text(s) if s.is_empty() && !values.is_empty() => &values[0],
                    other => other,
                };
                match sample {
                    OptionValue::Int(_) => ValueType::Int,
                    OptionValue::Float(f) if f.fract() != 0.0 => ValueType::Float,
                    OptionValue::Float(_) => ValueType::Int,
                    OptionValue::Bool(_) => ValueType::Boolean,
                    OptionValue::Text(_) => ValueType::Text,
                }
            }
            OptionKind::Text { .. } => ValueType::Text,
        }
    }

    //--- Coercion ---------------------------------------------------------

    /// Coerces a raw value into this option's resolved type.
    ///
    /// Parse failures fall back to the option's default; boolean and
    /// string coercion cannot fail.
    pub fn coerce(&self, raw: &OptionValue) -> OptionValue {
        match self.resolved_type() {
            ValueType::Int => OptionValue::Int(
                raw.as_int()
                    .unwrap_or_else(|| self.default.as_int().unwrap_or(0)),
            ),
            ValueType::Float => OptionValue::Float(
                raw.as_float()
                    .unwrap_or_else(|| self.default.as_float().unwrap_or(0.0)),
            ),
            ValueType::Boolean => OptionValue::Bool(raw.truthy()),
            ValueType::Text => OptionValue::Text(raw.to_string()),
        }
    }
}

//=== Schema ==============================================================

/// Ordered mapping of option key → definition. Order drives UI layout
/// and default iteration, so it is part of a scene's identity.
pub type Schema = Vec<(&'static str, OptionDef)>;

//=== OptionMap ===========================================================

/// A resolved set of option values, keyed by option name.
///
/// This is what a scene's `init` receives: every schema key present,
/// already coerced, plus any injected pass-through fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionMap(BTreeMap<String, OptionValue>);

impl OptionMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    //--- Typed Accessors --------------------------------------------------
    //
    // Scenes read their already-coerced options through these; the
    // fallback covers injected fields that may be absent.
    //

    pub fn int(&self, key: &str, fallback: i64) -> i64 {
        self.get(key).and_then(OptionValue::as_int).unwrap_or(fallback)
    }

    pub fn float(&self, key: &str, fallback: f64) -> f64 {
        self.get(key).and_then(OptionValue::as_float).unwrap_or(fallback)
    }

    pub fn flag(&self, key: &str, fallback: bool) -> bool {
        self.get(key).map(OptionValue::truthy).unwrap_or(fallback)
    }

    pub fn text(&self, key: &str, fallback: &str) -> String {
        match self.get(key) {
            Some(v) => v.to_string(),
            None => fallback.to_string(),
        }
    }
}

impl FromIterator<(String, OptionValue)> for OptionMap {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

//=== Schema-wide Parsing =================================================

/// Resolves a full option set against a schema.
///
/// Every schema key is filled: coerced from `raw` when present, taken
/// from the default otherwise. Keys present in `raw` but absent from the
/// schema pass through unchanged; this is the injection path for fields like
/// canvas dimensions or a global framerate cap.
pub fn parse_options(schema: &Schema, raw: &OptionMap) -> OptionMap {
    let mut parsed = OptionMap::new();

    for (key, def) in schema {
        let value = match raw.get(key) {
            Some(v) => def.coerce(v),
            None => def.coerce(&def.default),
        };
        parsed.insert(*key, value);
    }

    for (key, value) in raw.iter() {
        if !parsed.contains(key) {
            parsed.insert(key.clone(), value.clone());
        }
    }

    parsed
}

/// Synthesizes the default value set for a schema.
pub fn schema_defaults(schema: &Schema) -> OptionMap {
    schema
        .iter()
        .map(|(key, def)| (key.to_string(), def.default.clone()))
        .collect()
}

//=========================================================================
// Unit Tests
//=========================================================================
