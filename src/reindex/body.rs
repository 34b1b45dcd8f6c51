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

//! Composition of the reindex request body.
//!
//! The body always carries `source.index` and `dest.index`. Options are
//! merged in according to their [`Placement`]; none of them can override the
//! `index` keys since no option key maps to `index`.
use serde_json::{Map, Value};

use super::options::{OptionKey, OptionValue, Options, Placement};

pub fn compose(source_index: &str, dest_index: &str, options: &Options) -> Value {
    let mut body = Map::new();
    body.insert(
        "source".to_string(),
        Value::Object(source_part(source_index, options)),
    );
    body.insert(
        "dest".to_string(),
        Value::Object(dest_part(dest_index, options)),
    );
    merge_placed(&mut body, options, Placement::Body);
    merge_script(&mut body, options);
    Value::Object(body)
}

fn source_part(index: &str, options: &Options) -> Map<String, Value> {
    let mut part = Map::new();
    part.insert("index".to_string(), Value::String(index.to_string()));
    for (key, value) in options.placed(Placement::Source) {
        let value = match key {
            OptionKey::Type => type_filter(value),
            _ => value.to_value(),
        };
        part.insert(key.as_str().to_string(), value);
    }
    part
}

fn dest_part(index: &str, options: &Options) -> Map<String, Value> {
    let mut part = Map::new();
    part.insert("index".to_string(), Value::String(index.to_string()));
    merge_placed(&mut part, options, Placement::Dest);
    part
}

fn merge_placed(target: &mut Map<String, Value>, options: &Options, placement: Placement) {
    for (key, value) in options.placed(placement) {
        target.insert(key.as_str().to_string(), value.to_value());
    }
}

/// The type filter is always emitted as a list, structured references being
/// replaced by their names.
fn type_filter(value: &OptionValue) -> Value {
    match value.to_value() {
        Value::Array(types) => Value::Array(types),
        scalar => Value::Array(vec![scalar]),
    }
}

/// A structured script contributes its top level keys to the body, a raw one
/// is set under `script`.
fn merge_script(body: &mut Map<String, Value>, options: &Options) {
    let script = match options.get(OptionKey::Script) {
        Some(script) => script,
        None => return,
    };
    match script {
        OptionValue::Document(doc) => match doc.to_document() {
            Value::Object(fields) => body.extend(fields),
            other => {
                body.insert(OptionKey::Script.as_str().to_string(), other);
            }
        },
        raw => {
            body.insert(OptionKey::Script.as_str().to_string(), raw.to_value());
        }
    }
}
