/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Live state of the active view: parameters, installed filters and the two
//! hidden sets.

use crate::filter::FilterDescriptor;
use crate::graph::{ElementSet, HiddenHandle};
use log::error;
use serde_json::Value;
use std::collections::BTreeMap;

/// Value of a view parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

impl ParamValue {
    /// Numeric reading. Text is parsed, flags read as 1/0.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(s) => s.trim().parse().ok(),
            ParamValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
            ParamValue::List(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert an element attribute, `None` for null and nested objects
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(ParamValue::Number),
            Value::Bool(b) => Some(ParamValue::Flag(*b)),
            Value::String(s) => Some(ParamValue::Text(s.clone())),
            Value::Array(items) => Some(ParamValue::List(
                items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            )),
            Value::Null | Value::Object(_) => None,
        }
    }

    /// Parse a textual value, as typed on a command line.
    /// Numbers (including `inf`) and booleans are recognized, the rest is text.
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if let Ok(n) = trimmed.parse::<f64>() {
            return ParamValue::Number(n);
        }
        match trimmed {
            "true" => ParamValue::Flag(true),
            "false" => ParamValue::Flag(false),
            _ => ParamValue::Text(trimmed.to_string()),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(n: f64) -> Self {
        ParamValue::Number(n)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Flag(b)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Text(s.to_string())
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{n}"),
            ParamValue::Flag(b) => write!(f, "{b}"),
            ParamValue::Text(s) => write!(f, "{s}"),
            ParamValue::List(items) => write!(f, "{}", items.join(",")),
        }
    }
}

/// Parameter bag of a view (filter cutoffs plus layout options)
pub type Parameters = BTreeMap<String, ParamValue>;

/// Whether a selection currently isolates part of the graph
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HighlightState {
    #[default]
    Idle,
    Highlighted { selection: ElementSet },
}

/// Per-activation state of the displayed view
#[derive(Debug, Default)]
pub struct ViewState {
    pub parameters: Parameters,
    pub filters: Vec<FilterDescriptor>,

    /// Elements hidden by the last filter pass
    pub hidden_by_filter: Option<HiddenHandle>,

    /// Elements hidden by the active highlight; disjoint from the filter set
    pub hidden_by_highlight: Option<HiddenHandle>,

    pub highlight: HighlightState,
}

impl ViewState {
    /// Build a fresh state. Filters referring to an unknown parameter are
    /// dropped, since they could never be evaluated.
    pub fn new(parameters: Parameters, filters: Vec<FilterDescriptor>) -> Self {
        let filters = filters
            .into_iter()
            .filter(|descriptor| {
                let known = parameters.contains_key(&descriptor.parameter_name);
                if !known {
                    error!(
                        "Filter on '{}' refers to unknown parameter '{}', dropped",
                        descriptor.attribute_name, descriptor.parameter_name
                    );
                }
                known
            })
            .collect();

        Self {
            parameters,
            filters,
            hidden_by_filter: None,
            hidden_by_highlight: None,
            highlight: HighlightState::Idle,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name)
    }

    /// Set a parameter, returning the previous value
    pub fn set_parameter(&mut self, name: &str, value: ParamValue) -> Option<ParamValue> {
        self.parameters.insert(name.to_string(), value)
    }

    /// Current highlighted selection, if any
    pub fn selection(&self) -> Option<&ElementSet> {
        match &self.highlight {
            HighlightState::Idle => None,
            HighlightState::Highlighted { selection } => Some(selection),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterPredicate;
    use crate::graph::Scope;
    use serde_json::json;

    #[test]
    fn test_param_value_numeric_reading() {
        assert_eq!(ParamValue::Number(2.5).as_f64(), Some(2.5));
        assert_eq!(ParamValue::from("-1").as_f64(), Some(-1.0));
        assert_eq!(ParamValue::Flag(true).as_f64(), Some(1.0));
        assert_eq!(ParamValue::from("cose").as_f64(), None);
        assert_eq!(ParamValue::List(vec![]).as_f64(), None);
    }

    #[test]
    fn test_param_value_parse() {
        assert_eq!(ParamValue::parse("3.5"), ParamValue::Number(3.5));
        assert_eq!(ParamValue::parse("-inf"), ParamValue::Number(f64::NEG_INFINITY));
        assert_eq!(ParamValue::parse("true"), ParamValue::Flag(true));
        assert_eq!(ParamValue::parse(" concentric "), ParamValue::from("concentric"));
    }

    #[test]
    fn test_param_value_from_json() {
        assert_eq!(ParamValue::from_json(&json!(4)), Some(ParamValue::Number(4.0)));
        assert_eq!(ParamValue::from_json(&json!(null)), None);
        assert_eq!(
            ParamValue::from_json(&json!(["a", 1])),
            Some(ParamValue::List(vec!["a".into(), "1".into()]))
        );
    }

    #[test]
    fn test_view_state_drops_filters_with_unknown_parameter() {
        let parameters = Parameters::from([("absRelRiskVal".to_string(), ParamValue::Number(1.0))]);
        let filters = vec![
            FilterDescriptor::new(Scope::Edges, "absoluteWeight", "absRelRiskVal", FilterPredicate::Below),
            FilterDescriptor::new(Scope::Edges, "weight", "showComor", FilterPredicate::SignMismatch),
        ];
        let state = ViewState::new(parameters, filters);

        assert_eq!(state.filters.len(), 1);
        assert_eq!(state.filters[0].parameter_name, "absRelRiskVal");
        assert!(state.selection().is_none());
        assert!(state.hidden_by_filter.is_none());
    }

    #[test]
    fn test_set_parameter_returns_previous() {
        let mut state = ViewState::default();
        assert_eq!(state.set_parameter("x", 1.0.into()), None);
        assert_eq!(state.set_parameter("x", 2.0.into()), Some(ParamValue::Number(1.0)));
        assert_eq!(state.parameter("x"), Some(&ParamValue::Number(2.0)));
    }
}
