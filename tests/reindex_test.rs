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

use reindex::reindex::{
    Conflicts, DocType, Endpoint, OpType, OptionKey, OptionValue, Options, Script, ToDocument,
    VersionType,
};
use reindex::{Error, Index, Reindex, ReindexError, Response, Transport};
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use std::collections::VecDeque;

/// Records the submitted endpoints and answers with canned responses.
#[derive(Default)]
struct FakeElasticsearch {
    requests: RefCell<Vec<Endpoint>>,
    responses: RefCell<VecDeque<Result<Response, String>>>,
}

impl FakeElasticsearch {
    fn answering(responses: Vec<Result<Value, String>>) -> Self {
        FakeElasticsearch {
            requests: RefCell::new(vec![]),
            responses: RefCell::new(
                responses
                    .into_iter()
                    .map(|r| r.map(|data| Response::new(200, data)))
                    .collect(),
            ),
        }
    }

    fn last_request(&self) -> Endpoint {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request submitted")
    }
}

impl Transport for FakeElasticsearch {
    fn request_endpoint(&self, endpoint: &Endpoint) -> Result<Response, Error> {
        self.requests.borrow_mut().push(endpoint.clone());
        match self.responses.borrow_mut().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(msg)) => Err(failure::err_msg(msg)),
            None => Err(failure::err_msg("no more canned response")),
        }
    }
}

#[derive(Debug)]
struct MatchQuery(&'static str, &'static str);

impl ToDocument for MatchQuery {
    fn to_document(&self) -> Value {
        let mut clause = Map::new();
        clause.insert(self.0.to_string(), json!(self.1));
        json!({ "match": clause })
    }
}

fn reindex_on(es: &FakeElasticsearch) -> Reindex<'_, FakeElasticsearch> {
    Reindex::new(Index::new("munin_poi_v1", es), Index::new("munin_poi_v2", es))
}

#[test]
fn bare_reindex_body() {
    let es = FakeElasticsearch::default();
    let reindex = reindex_on(&es);
    assert_eq!(
        reindex.body(),
        json!({"source": {"index": "munin_poi_v1"}, "dest": {"index": "munin_poi_v2"}})
    );
    assert!(es.requests.borrow().is_empty());
}

#[test]
fn full_reindex_request() {
    let es = FakeElasticsearch::answering(vec![Ok(json!({"task": "oTUltX4IQMOUUVeiohTt8A:12345"}))]);
    let mut reindex = reindex_on(&es);
    reindex.set_query(MatchQuery("f", "v"));
    reindex.set_type(vec![DocType::new("poi")]);
    reindex.set_source_filter(json!(["id", "name"]));
    reindex.set_version_type(VersionType::External);
    reindex.set_op_type(OpType::Create);
    reindex.set_size(1000);
    reindex.set_conflicts(Conflicts::Proceed);
    reindex.set_script(Script::new("ctx._source.weight = 0").with_lang("painless"));
    reindex.set_wait_for_completion(false);
    reindex.set_wait_for_active_shards("all");
    reindex.set_timeout("2m");
    reindex.set_scroll("5m");
    reindex.set_requests_per_second(500);
    reindex.set_refresh(true);
    reindex.set_slices("auto");

    reindex.run().unwrap();

    let request = es.last_request();
    assert_eq!(request.path, "/_reindex");
    assert_eq!(
        request.body,
        json!({
            "source": {
                "index": "munin_poi_v1",
                "type": ["poi"],
                "query": {"match": {"f": "v"}},
                "_source": ["id", "name"]
            },
            "dest": {
                "index": "munin_poi_v2",
                "version_type": "external",
                "op_type": "create"
            },
            "size": 1000,
            "conflicts": "proceed",
            "script": {"source": "ctx._source.weight = 0", "lang": "painless"}
        })
    );
    let params: Vec<(&str, &str)> = request
        .params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    assert_eq!(
        params,
        vec![
            ("refresh", "true"),
            ("requests_per_second", "500"),
            ("scroll", "5m"),
            ("slices", "auto"),
            ("timeout", "2m"),
            ("wait_for_active_shards", "all"),
            ("wait_for_completion", "false"),
        ]
    );
    assert_eq!(
        reindex.task_id(),
        Some("oTUltX4IQMOUUVeiohTt8A:12345".to_string())
    );
}

#[test]
fn wait_for_completion_is_stored_as_a_string() {
    let es = FakeElasticsearch::default();
    let mut reindex = reindex_on(&es);

    reindex.set_wait_for_completion(true);
    assert_eq!(
        reindex
            .get_option(OptionKey::WaitForCompletion)
            .and_then(OptionValue::as_value),
        Some(&json!("true"))
    );

    reindex.set_wait_for_completion(false);
    assert_eq!(
        reindex.options().raw("wait_for_completion"),
        Some(json!("false"))
    );

    reindex.set_wait_for_completion("true");
    assert_eq!(
        reindex.options().raw("wait_for_completion"),
        Some(json!("true"))
    );
}

#[test]
fn raw_script_and_scalar_type() {
    let es = FakeElasticsearch::default();
    let mut reindex = reindex_on(&es);
    reindex.set_raw_script(json!({"source": "ctx._source.a = 1"}));
    reindex.set_option(OptionKey::Type, json!("street"));
    assert_eq!(
        reindex.body(),
        json!({
            "source": {"index": "munin_poi_v1", "type": ["street"]},
            "dest": {"index": "munin_poi_v2"},
            "script": {"source": "ctx._source.a = 1"}
        })
    );
}

#[test]
fn initial_options_from_a_map() {
    let es = FakeElasticsearch::default();
    let options = Options::from_map(vec![
        ("conflicts", json!("proceed")),
        ("remote", json!({"host": "http://other:9200"})),
        ("max_docs", json!(12)),
        ("timeout", json!("30s")),
    ]);
    let reindex = Reindex::with_options(
        Index::new("old", &es),
        Index::new("new", &es),
        options,
    );
    assert_eq!(
        reindex.body(),
        json!({
            "source": {"index": "old", "remote": {"host": "http://other:9200"}},
            "dest": {"index": "new"},
            "conflicts": "proceed"
        })
    );
    assert_eq!(reindex.endpoint().params.len(), 1);
    assert_eq!(reindex.options().raw("max_docs"), Some(json!(12)));
}

#[test]
fn no_task_before_submission() {
    let es = FakeElasticsearch::default();
    let reindex = reindex_on(&es);
    assert!(reindex.last_response().is_none());
    assert_eq!(reindex.task_id(), None);
}

#[test]
fn no_task_for_a_synchronous_reindex() {
    let es = FakeElasticsearch::answering(vec![
        Ok(json!({"took": 147, "total": 120, "created": 120, "failures": []})),
        Ok(json!({"task": ""})),
        Ok(json!({"task": null})),
    ]);
    let mut reindex = reindex_on(&es);
    reindex.run().unwrap();
    assert_eq!(reindex.task_id(), None);
    reindex.run().unwrap();
    assert_eq!(reindex.task_id(), None);
    reindex.run().unwrap();
    assert_eq!(reindex.task_id(), None);
    assert_eq!(es.requests.borrow().len(), 3);
}

#[test]
fn each_submission_replaces_the_last_response() {
    let es = FakeElasticsearch::answering(vec![
        Ok(json!({"task": "node:1"})),
        Ok(json!({"task": "node:2"})),
    ]);
    let mut reindex = reindex_on(&es);
    reindex.run().unwrap();
    assert_eq!(reindex.task_id(), Some("node:1".to_string()));
    let response = reindex.run().unwrap();
    assert_eq!(response.data(), &json!({"task": "node:2"}));
    assert_eq!(reindex.task_id(), Some("node:2".to_string()));
}

#[test]
fn failed_submission_is_reported() {
    let es = FakeElasticsearch::answering(vec![
        Ok(json!({"task": "node:1"})),
        Err("connection refused".to_string()),
    ]);
    let mut reindex = reindex_on(&es);
    reindex.run().unwrap();

    match reindex.run() {
        Err(ReindexError::SubmissionFailed(cause)) => {
            assert_eq!(cause.to_string(), "connection refused")
        }
        other => panic!("unexpected submission result: {:?}", other),
    }
    // a failed submission does not invalidate the previous response
    assert_eq!(reindex.task_id(), Some("node:1".to_string()));
}

#[test]
fn body_is_stable() {
    let es = FakeElasticsearch::default();
    let mut reindex = reindex_on(&es);
    reindex.set_query(MatchQuery("name", "bob"));
    reindex.set_type(vec!["poi", "addr"]);
    reindex.set_script(Script::new("ctx._source.remove('tmp')"));
    assert_eq!(reindex.body(), reindex.body());
}

#[test]
fn removed_options_leave_the_request() {
    let es = FakeElasticsearch::default();
    let mut reindex = reindex_on(&es);
    reindex.set_conflicts(Conflicts::Proceed);
    reindex.set_timeout("1m");

    assert!(reindex.remove_option(OptionKey::Conflicts).is_some());
    assert!(reindex.remove_option(OptionKey::Timeout).is_some());
    assert!(reindex.remove_option(OptionKey::Size).is_none());
    assert!(!reindex.has_option(OptionKey::Conflicts));
    assert_eq!(
        reindex.body(),
        json!({"source": {"index": "munin_poi_v1"}, "dest": {"index": "munin_poi_v2"}})
    );
    assert!(reindex.endpoint().params.is_empty());
}
