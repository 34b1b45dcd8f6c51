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

//! Copy the documents of an index into another one with the `_reindex` API.
//!
//! ```ignore
//! let rubber = Rubber::new("http://localhost:9200")?;
//! let mut reindex = Reindex::new(rubber.index("munin_poi_v1"), rubber.index("munin_poi_v2"));
//! reindex.set_conflicts(Conflicts::Proceed);
//! reindex.set_wait_for_completion(false);
//! reindex.run()?;
//! let task = reindex.task_id();
//! ```
pub mod body;
pub mod document;
pub mod endpoint;
pub mod options;
pub mod script;

pub use self::document::{DocType, Named, ToDocument, TypeRef};
pub use self::endpoint::Endpoint;
pub use self::options::{
    Conflicts, OpType, OptionKey, OptionValue, Options, Placement, VersionType,
};
pub use self::script::Script;

use serde_json::Value;
use slog_scope::{info, warn};

use crate::error::ReindexError;
use crate::rubber::{Index, Response, Transport};

/// Name of the field holding the task id in the response of an asynchronous reindex.
const TASK_FIELD: &str = "task";

pub struct Reindex<'c, T: ?Sized> {
    old_index: Index<'c, T>,
    new_index: Index<'c, T>,
    options: Options,
    last_response: Option<Response>,
}

impl<'c, T: Transport + ?Sized> Reindex<'c, T> {
    pub fn new(old_index: Index<'c, T>, new_index: Index<'c, T>) -> Self {
        Reindex::with_options(old_index, new_index, Options::new())
    }

    pub fn with_options(old_index: Index<'c, T>, new_index: Index<'c, T>, options: Options) -> Self {
        Reindex {
            old_index,
            new_index,
            options,
            last_response: None,
        }
    }

    pub fn old_index(&self) -> &Index<'c, T> {
        &self.old_index
    }

    pub fn new_index(&self) -> &Index<'c, T> {
        &self.new_index
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Unset an option, returning its previous value.
    pub fn remove_option(&mut self, key: OptionKey) -> Option<OptionValue> {
        self.options.remove(key)
    }

    pub fn set_option<V: Into<OptionValue>>(&mut self, key: OptionKey, value: V) {
        self.options.set(key, value);
    }

    pub fn get_option(&self, key: OptionKey) -> Option<&OptionValue> {
        self.options.get(key)
    }

    pub fn has_option(&self, key: OptionKey) -> bool {
        self.options.has(key)
    }

    /// Filter the copied documents with a query, either structured (rs-es
    /// query, ...) or already in its json form.
    pub fn set_query<Q: ToDocument + 'static>(&mut self, query: Q) {
        self.options.set(OptionKey::Query, OptionValue::document(query));
    }

    pub fn set_type<I, R>(&mut self, types: I)
    where
        I: IntoIterator<Item = R>,
        R: Into<TypeRef>,
    {
        let types = types.into_iter().map(Into::into).collect();
        self.options.set(OptionKey::Type, OptionValue::Types(types));
    }

    pub fn set_sort(&mut self, sort: Value) {
        self.options.set(OptionKey::Sort, sort);
    }

    pub fn set_source_filter(&mut self, filter: Value) {
        self.options.set(OptionKey::Source, filter);
    }

    pub fn set_remote(&mut self, remote: Value) {
        self.options.set(OptionKey::Remote, remote);
    }

    pub fn set_slice(&mut self, slice: Value) {
        self.options.set(OptionKey::Slice, slice);
    }

    pub fn set_version_type(&mut self, version_type: VersionType) {
        self.options
            .set(OptionKey::VersionType, Value::from(version_type));
    }

    pub fn set_op_type(&mut self, op_type: OpType) {
        self.options.set(OptionKey::OpType, Value::from(op_type));
    }

    pub fn set_size(&mut self, size: u64) {
        self.options.set(OptionKey::Size, Value::from(size));
    }

    pub fn set_conflicts(&mut self, conflicts: Conflicts) {
        self.options.set(OptionKey::Conflicts, Value::from(conflicts));
    }

    pub fn set_script(&mut self, script: Script) {
        self.options
            .set(OptionKey::Script, OptionValue::document(script));
    }

    /// A script given as is, sent under the `script` key of the body.
    pub fn set_raw_script<V: Into<Value>>(&mut self, script: V) {
        self.options.set(OptionKey::Script, script.into());
    }

    pub fn set_refresh<V: Into<Value>>(&mut self, value: V) {
        self.options.set(OptionKey::Refresh, value.into());
    }

    /// Accepts a boolean or the strings `"true"` / `"false"`. Booleans are
    /// stored as strings, as expected in the url.
    pub fn set_wait_for_completion<V: Into<Value>>(&mut self, value: V) {
        let value = match value.into() {
            Value::Bool(b) => Value::String(b.to_string()),
            other => other,
        };
        self.options.set(OptionKey::WaitForCompletion, value);
    }

    pub fn set_wait_for_active_shards<V: Into<Value>>(&mut self, value: V) {
        self.options
            .set(OptionKey::WaitForActiveShards, value.into());
    }

    pub fn set_timeout<V: Into<Value>>(&mut self, value: V) {
        self.options.set(OptionKey::Timeout, value.into());
    }

    pub fn set_scroll<V: Into<Value>>(&mut self, value: V) {
        self.options.set(OptionKey::Scroll, value.into());
    }

    pub fn set_requests_per_second<V: Into<Value>>(&mut self, value: V) {
        self.options
            .set(OptionKey::RequestsPerSecond, value.into());
    }

    pub fn set_slices<V: Into<Value>>(&mut self, value: V) {
        self.options.set(OptionKey::Slices, value.into());
    }

    /// The body which would be sent by `run`. Does not touch the network.
    pub fn body(&self) -> Value {
        body::compose(self.old_index.name(), self.new_index.name(), &self.options)
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::reindex(&self.options, self.body())
    }

    /// Submit the reindex through the connection of the source index.
    ///
    /// Each call triggers a new reindex on the cluster. On success the
    /// response replaces the previous one.
    pub fn run(&mut self) -> Result<&Response, ReindexError> {
        let endpoint = self.endpoint();
        info!(
            "reindexing {} into {}",
            self.old_index.name(),
            self.new_index.name()
        );
        let response = self
            .old_index
            .client()
            .request_endpoint(&endpoint)
            .map_err(|e| {
                warn!(
                    "reindex of {} into {} failed: {}",
                    self.old_index.name(),
                    self.new_index.name(),
                    e
                );
                ReindexError::SubmissionFailed(e)
            })?;
        Ok(self.last_response.insert(response))
    }

    pub fn last_response(&self) -> Option<&Response> {
        self.last_response.as_ref()
    }

    /// The id of the task running the reindex, when it was submitted
    /// without waiting for its completion.
    pub fn task_id(&self) -> Option<String> {
        let task = self.last_response.as_ref()?.data().get(TASK_FIELD)?;
        if !is_truthy(task) {
            return None;
        }
        match task {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
