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

//! Structured values which can be embedded in a reindex body.
use serde::Serialize;
use serde_json::Value;
use slog_scope::warn;
use std::fmt;

/// Something which knows how to render itself as a nested json document
/// (a query built with the rs-es DSL, a script, ...).
pub trait ToDocument: fmt::Debug {
    fn to_document(&self) -> Value;
}

/// Something which is referenced by its plain name.
pub trait Named {
    fn name(&self) -> &str;
}

impl ToDocument for Value {
    fn to_document(&self) -> Value {
        self.clone()
    }
}

/// Queries built with the rs-es builders are emitted as their serialized form.
/// A query which cannot be serialized is logged and emitted as `null`.
impl ToDocument for rs_es::query::Query {
    fn to_document(&self) -> Value {
        serialized(self)
    }
}

/// The json form of a serde value, `null` (and a warning) when it cannot be
/// represented as json.
pub(crate) fn serialized<T: Serialize + fmt::Debug + ?Sized>(doc: &T) -> Value {
    serde_json::to_value(doc).unwrap_or_else(|e| {
        warn!("could not serialize {:?}: {}", doc, e);
        Value::Null
    })
}

/// A mapping type of the source index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocType {
    name: String,
}

impl DocType {
    pub fn new<S: Into<String>>(name: S) -> Self {
        DocType { name: name.into() }
    }
}

impl Named for DocType {
    fn name(&self) -> &str {
        &self.name
    }
}

/// An entry of the document-type filter: either a plain name, or a structured
/// reference resolved to its name when the body is composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Name(String),
    Structured(DocType),
}

impl TypeRef {
    pub fn resolve(&self) -> &str {
        match self {
            TypeRef::Name(name) => name,
            TypeRef::Structured(doc_type) => doc_type.name(),
        }
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::Name(name.to_string())
    }
}

impl From<String> for TypeRef {
    fn from(name: String) -> Self {
        TypeRef::Name(name)
    }
}

impl From<DocType> for TypeRef {
    fn from(doc_type: DocType) -> Self {
        TypeRef::Structured(doc_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_refs_resolve_to_plain_names() {
        let refs: Vec<TypeRef> = vec!["poi".into(), DocType::new("street").into()];
        let names: Vec<&str> = refs.iter().map(TypeRef::resolve).collect();
        assert_eq!(names, vec!["poi", "street"]);
    }

    #[test]
    fn rs_es_query_is_serialized() {
        let query = rs_es::query::Query::build_match_all().build();
        let doc = query.to_document();
        assert!(doc.get("match_all").is_some(), "unexpected query: {}", doc);
    }

    #[test]
    fn unserializable_documents_become_null() {
        let mut by_coord = std::collections::BTreeMap::new();
        by_coord.insert((2, 48), "paris");
        assert_eq!(serialized(&by_coord), Value::Null);
        assert_eq!(serialized(&vec!["poi"]), json!(["poi"]));
    }

    #[test]
    fn plain_documents_are_cloned() {
        let doc = json!({"match": {"f": "v"}});
        assert_eq!(doc.to_document(), doc);
    }
}
