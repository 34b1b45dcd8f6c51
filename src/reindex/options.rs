// Copyright © 2020, Canal TP and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
//     the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
//     powered by Canal TP (www.canaltp.fr).
// Help us simplify mobility and open public transport:
//     a non ending quest to the responsive locomotion way of traveling!
//
// LICENCE: This program is free software; you can redistribute it
// and/or modify it under the terms of the GNU Affero General Public
// License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU
// Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public
// License along with this program. If not, see
// <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// IRC #navitia on freenode
// https://groups.google.com/d/forum/navitia
// www.navitia.io

//! The option store of a reindex operation.
//!
//! Options are keyed by [`OptionKey`], the closed set of names understood by
//! the body composer and the reindex endpoint. String keyed input (config
//! files, command line) goes through [`Options::set_raw`]: names outside of
//! the known set are kept aside and never emitted.
use serde_json::Value;
use slog_scope::debug;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::document::{ToDocument, TypeRef};
use crate::error::ReindexError;

/// Where an option ends up in the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Source,
    Dest,
    Body,
    Script,
    Parameter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    Type,
    Query,
    Sort,
    Source,
    Remote,
    Slice,
    VersionType,
    OpType,
    Size,
    Conflicts,
    Script,
    Refresh,
    WaitForCompletion,
    WaitForActiveShards,
    Timeout,
    Scroll,
    RequestsPerSecond,
    Slices,
}

impl OptionKey {
    pub const ALL: [OptionKey; 18] = [
        OptionKey::Type,
        OptionKey::Query,
        OptionKey::Sort,
        OptionKey::Source,
        OptionKey::Remote,
        OptionKey::Slice,
        OptionKey::VersionType,
        OptionKey::OpType,
        OptionKey::Size,
        OptionKey::Conflicts,
        OptionKey::Script,
        OptionKey::Refresh,
        OptionKey::WaitForCompletion,
        OptionKey::WaitForActiveShards,
        OptionKey::Timeout,
        OptionKey::Scroll,
        OptionKey::RequestsPerSecond,
        OptionKey::Slices,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OptionKey::Type => "type",
            OptionKey::Query => "query",
            OptionKey::Sort => "sort",
            OptionKey::Source => "_source",
            OptionKey::Remote => "remote",
            OptionKey::Slice => "slice",
            OptionKey::VersionType => "version_type",
            OptionKey::OpType => "op_type",
            OptionKey::Size => "size",
            OptionKey::Conflicts => "conflicts",
            OptionKey::Script => "script",
            OptionKey::Refresh => "refresh",
            OptionKey::WaitForCompletion => "wait_for_completion",
            OptionKey::WaitForActiveShards => "wait_for_active_shards",
            OptionKey::Timeout => "timeout",
            OptionKey::Scroll => "scroll",
            OptionKey::RequestsPerSecond => "requests_per_second",
            OptionKey::Slices => "slices",
        }
    }

    pub fn placement(self) -> Placement {
        match self {
            OptionKey::Type
            | OptionKey::Query
            | OptionKey::Sort
            | OptionKey::Source
            | OptionKey::Remote
            | OptionKey::Slice => Placement::Source,
            OptionKey::VersionType | OptionKey::OpType => Placement::Dest,
            OptionKey::Size | OptionKey::Conflicts => Placement::Body,
            OptionKey::Script => Placement::Script,
            OptionKey::Refresh
            | OptionKey::WaitForCompletion
            | OptionKey::WaitForActiveShards
            | OptionKey::Timeout
            | OptionKey::Scroll
            | OptionKey::RequestsPerSecond
            | OptionKey::Slices => Placement::Parameter,
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKey {
    type Err = ReindexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptionKey::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| ReindexError::InvalidOption {
                name: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionType {
    Internal,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    Index,
    Create,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conflicts {
    Abort,
    Proceed,
}

macro_rules! impl_as_str {
    ($t:ident { $($variant:ident => $s:expr),* $(,)? }) => {
        impl $t {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($t::$variant => $s),*
                }
            }
        }

        impl From<$t> for Value {
            fn from(v: $t) -> Value {
                Value::String(v.as_str().to_string())
            }
        }
    };
}

impl_as_str!(VersionType { Internal => "internal", External => "external" });
impl_as_str!(OpType { Index => "index", Create => "create" });
impl_as_str!(Conflicts { Abort => "abort", Proceed => "proceed" });

/// A stored option value.
#[derive(Debug)]
pub enum OptionValue {
    /// Emitted as is.
    Value(Value),
    /// Structured object, emitted as its serialized document.
    Document(Box<dyn ToDocument>),
    /// Document-type filter.
    Types(Vec<TypeRef>),
}

impl OptionValue {
    pub fn document<D: ToDocument + 'static>(doc: D) -> Self {
        OptionValue::Document(Box::new(doc))
    }

    /// The json form of the value, structured objects being serialized.
    pub fn to_value(&self) -> Value {
        match self {
            OptionValue::Value(v) => v.clone(),
            OptionValue::Document(doc) => doc.to_document(),
            OptionValue::Types(types) => Value::Array(
                types
                    .iter()
                    .map(|t| Value::String(t.resolve().to_string()))
                    .collect(),
            ),
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            OptionValue::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for OptionValue {
    fn from(v: Value) -> Self {
        OptionValue::Value(v)
    }
}

#[derive(Debug, Default)]
pub struct Options {
    values: BTreeMap<OptionKey, OptionValue>,
    unrecognized: BTreeMap<String, Value>,
}

impl Options {
    pub fn new() -> Self {
        Options::default()
    }

    /// Build a store from a string keyed map, as found in a configuration file.
    pub fn from_map<I, K>(map: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut options = Options::new();
        for (name, value) in map {
            options.set_raw(name.as_ref(), value);
        }
        options
    }

    pub fn set<V: Into<OptionValue>>(&mut self, key: OptionKey, value: V) -> &mut Self {
        self.values.insert(key, value.into());
        self
    }

    pub fn get(&self, key: OptionKey) -> Option<&OptionValue> {
        self.values.get(&key)
    }

    pub fn has(&self, key: OptionKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn remove(&mut self, key: OptionKey) -> Option<OptionValue> {
        self.values.remove(&key)
    }

    /// Store a value under a string name. Unknown names are kept but never
    /// take part in the request.
    pub fn set_raw(&mut self, name: &str, value: Value) -> &mut Self {
        match name.parse::<OptionKey>() {
            Ok(key) => {
                self.values.insert(key, OptionValue::Value(value));
            }
            Err(_) => {
                debug!("ignoring unknown reindex option {}", name);
                self.unrecognized.insert(name.to_string(), value);
            }
        }
        self
    }

    /// Read back a value stored by name, known or not.
    pub fn raw(&self, name: &str) -> Option<Value> {
        match name.parse::<OptionKey>() {
            Ok(key) => self.get(key).map(OptionValue::to_value),
            Err(_) => self.unrecognized.get(name).cloned(),
        }
    }

    /// Iterate over the stored options having the given placement, in key order.
    pub fn placed(
        &self,
        placement: Placement,
    ) -> impl Iterator<Item = (OptionKey, &OptionValue)> + '_ {
        self.values
            .iter()
            .filter(move |(key, _)| key.placement() == placement)
            .map(|(key, value)| (*key, value))
    }
}
