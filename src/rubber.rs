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

use failure::ResultExt;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use slog_scope::{debug, info, warn};
use std::fmt;

use crate::error::ReindexError;
use crate::reindex::Endpoint;
use crate::Error;

/// Executes endpoint requests against an Elasticsearch cluster.
pub trait Transport {
    fn request_endpoint(&self, endpoint: &Endpoint) -> Result<Response, Error>;
}

impl<'a, T: Transport + ?Sized> Transport for &'a T {
    fn request_endpoint(&self, endpoint: &Endpoint) -> Result<Response, Error> {
        (**self).request_endpoint(endpoint)
    }
}

/// A parsed Elasticsearch response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub data: Value,
}

impl Response {
    pub fn new(status: u16, data: Value) -> Self {
        Response { status, data }
    }

    pub fn data(&self) -> &Value {
        &self.data
    }
}

/// An index, and the client connection it is reached through.
pub struct Index<'c, T: ?Sized> {
    name: String,
    client: &'c T,
}

impl<'c, T: ?Sized> Index<'c, T> {
    pub fn new<S: Into<String>>(name: S, client: &'c T) -> Self {
        Index {
            name: name.into(),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn client(&self) -> &'c T {
        self.client
    }
}

impl<'c, T: ?Sized> Clone for Index<'c, T> {
    fn clone(&self) -> Self {
        Index {
            name: self.name.clone(),
            client: self.client,
        }
    }
}

impl<'c, T: ?Sized> fmt::Debug for Index<'c, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index").field("name", &self.name).finish()
    }
}

// Rubber is an wrapper around elasticsearch API
pub struct Rubber {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl Rubber {
    // build a rubber with a connection string (http://host:port)
    pub fn new(cnx: &str) -> Result<Rubber, Error> {
        lazy_static! {
            static ref CNX: Regex =
                Regex::new(r"^(?P<scheme>https?://)?(?P<host>[^/:]+):(?P<port>\d+)/?$").unwrap();
        }
        let cap = CNX.captures(cnx).ok_or_else(|| ReindexError::InvalidConnection {
            cnx: cnx.to_string(),
        })?;
        let scheme = cap.name("scheme").map_or("http://", |m| m.as_str());
        let host = &cap["host"];
        let port = &cap["port"];
        info!("elastic search host {:?} port {:?}", host, port);

        Ok(Rubber {
            base_url: format!("{}{}:{}", scheme, host, port),
            client: reqwest::blocking::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A handle on the index `name` of this cluster.
    pub fn index<S: Into<String>>(&self, name: S) -> Index<'_, Rubber> {
        Index::new(name, self)
    }
}

impl Transport for Rubber {
    fn request_endpoint(&self, endpoint: &Endpoint) -> Result<Response, Error> {
        let url = format!("{}{}", self.base_url, endpoint.path);
        debug!("{} {} {:?}", endpoint.method, url, endpoint.params);
        let res = self
            .client
            .request(endpoint.method.clone(), &url)
            .query(&endpoint.params)
            .json(&endpoint.body)
            .send()
            .with_context(|_| format!("could not reach elasticsearch at {}", url))?;

        let status = res.status();
        let body = res
            .text()
            .with_context(|_| format!("could not read elasticsearch response from {}", url))?;
        if !status.is_success() {
            warn!("es response {}: {}", status, body);
            return Err(ReindexError::ResponseStatus {
                status: status.as_u16(),
                path: endpoint.path.clone(),
                body,
            }
            .into());
        }
        let data: Value = serde_json::from_str(&body)
            .with_context(|_| format!("invalid elasticsearch response: {}", body))?;
        Ok(Response::new(status.as_u16(), data))
    }
}
