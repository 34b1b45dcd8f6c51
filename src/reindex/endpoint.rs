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

use serde_json::Value;
use std::collections::BTreeMap;

use super::options::{Options, Placement};

/// A request against an Elasticsearch endpoint: query string parameters and
/// a json body.
#[derive(Debug, Clone, PartialEq)]
pub struct Endpoint {
    pub method: reqwest::Method,
    pub path: String,
    pub params: BTreeMap<String, String>,
    pub body: Value,
}

impl Endpoint {
    /// The `_reindex` endpoint, carrying only the options the endpoint
    /// accepts as url parameters.
    pub fn reindex(options: &Options, body: Value) -> Self {
        let params = options
            .placed(Placement::Parameter)
            .map(|(key, value)| (key.as_str().to_string(), param_string(&value.to_value())))
            .collect();
        Endpoint {
            method: reqwest::Method::POST,
            path: "/_reindex".to_string(),
            params,
            body,
        }
    }
}

fn param_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
