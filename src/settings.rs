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

//! Configuration and command line arguments of the reindex binary.
use config::{Config, Environment, File, FileFormat};
use failure::ResultExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use slog_scope::{info, warn};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use structopt::StructOpt;

use crate::reindex::{OptionKey, Options, Reindex};
use crate::rubber::{Index, Transport};
use crate::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Elasticsearch {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReindexSettings {
    pub source: String,
    pub dest: String,
    pub wait_for_completion: Option<bool>,
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub elasticsearch: Elasticsearch,
    pub reindex: ReindexSettings,
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "reindex",
    about = "Copy the documents of an Elasticsearch index into another one"
)]
pub struct Opts {
    /// Directory holding a 'default' configuration and the run mode ones.
    #[structopt(parse(from_os_str), short = "c", long = "config-dir")]
    pub config_dir: Option<PathBuf>,

    /// Defines the run mode in {testing, dev, prod, ...}
    #[structopt(short = "m", long = "run-mode")]
    pub run_mode: Option<String>,

    /// Override settings values using key=value
    #[structopt(short = "s", long = "setting")]
    pub settings: Vec<String>,

    #[structopt(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Submit the reindex
    Run,
    /// Print the request body, without submitting it
    Body,
    /// Print the configuration
    Config,
}

impl Settings {
    // Configuration is read, each layer overriding the previous one, from:
    //  - the default configuration compiled in the binary
    //  - <config_dir>/default
    //  - <config_dir>/<run_mode>
    //  - REINDEX_* environment variables (REINDEX_ELASTICSEARCH__URL)
    //  - key=value overrides from the command line
    pub fn new(opts: &Opts) -> Result<Self, Error> {
        let mut config = Config::new();
        config
            .merge(File::from_str(
                include_str!("../config/default.toml"),
                FileFormat::Toml,
            ))
            .with_context(|e| {
                format!(
                    "Could not merge default configuration from file at compile time: {}",
                    e
                )
            })?;

        match &opts.config_dir {
            Some(dir) => {
                let default_path = dir.join("default");
                info!("using configuration from {}", default_path.display());
                config
                    .merge(File::from(default_path.clone()).required(false))
                    .with_context(|e| {
                        format!(
                            "Could not merge default configuration from file {}: {}",
                            default_path.display(),
                            e
                        )
                    })?;

                if let Some(run_mode) = &opts.run_mode {
                    let path = dir.join(run_mode);
                    info!("using configuration from {}", path.display());
                    config
                        .merge(File::from(path.clone()).required(true))
                        .with_context(|e| {
                            format!(
                                "Could not merge {} configuration in file {}: {}",
                                run_mode,
                                path.display(),
                                e
                            )
                        })?;
                }
            }
            None => {
                if opts.run_mode.is_some() {
                    warn!("run mode used without the 'config_dir' option. Please set the config directory with --config-dir.");
                    return Err(failure::err_msg(
                        "Could not build program settings: run mode without config directory",
                    ));
                }
            }
        }

        config
            .merge(Environment::with_prefix("REINDEX").separator("__"))
            .with_context(|e| format!("Could not merge environment configuration: {}", e))?;

        for setting in &opts.settings {
            let (key, value) = split_setting(setting)?;
            config
                .set(key, override_value(value))
                .with_context(|e| format!("Could not override {}: {}", key, e))?;
        }

        config.try_into().map_err(|e| {
            failure::err_msg(format!(
                "Could not generate settings from configuration: {}",
                e
            ))
        })
    }

    /// The option store described by the `reindex` section. A
    /// `wait_for_completion` given in `reindex.options` wins over the
    /// `reindex.wait_for_completion` shortcut.
    pub fn options(&self) -> Options {
        let mut options = Options::from_map(self.reindex.options.clone());
        if let Some(wait) = self.reindex.wait_for_completion {
            if !options.has(OptionKey::WaitForCompletion) {
                options.set_raw("wait_for_completion", Value::String(wait.to_string()));
            }
        }
        options
    }

    pub fn reindex<'c, T: Transport + ?Sized>(&self, client: &'c T) -> Reindex<'c, T> {
        Reindex::with_options(
            Index::new(self.reindex.source.clone(), client),
            Index::new(self.reindex.dest.clone(), client),
            self.options(),
        )
    }
}

fn split_setting(setting: &str) -> Result<(&str, &str), Error> {
    let mut parts = setting.splitn(2, '=');
    match (parts.next(), parts.next()) {
        (Some(key), Some(value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(failure::format_err!(
            "Invalid setting `{}`, expected key=value",
            setting
        )),
    }
}

// Override values are read as json when they parse (numbers, booleans,
// queries, ...), as plain strings otherwise.
fn override_value(value: &str) -> config::Value {
    match serde_json::from_str::<Value>(value) {
        Ok(Value::Null) | Err(_) => config::Value::from(value),
        Ok(json) => json_to_config(json),
    }
}

fn json_to_config(value: Value) -> config::Value {
    match value {
        Value::Null => config::Value::from(""),
        Value::Bool(b) => config::Value::from(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => config::Value::from(i),
            None => config::Value::from(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => config::Value::from(s),
        Value::Array(values) => config::Value::from(
            values
                .into_iter()
                .map(json_to_config)
                .collect::<Vec<config::Value>>(),
        ),
        Value::Object(fields) => config::Value::from(
            fields
                .into_iter()
                .map(|(k, v)| (k, json_to_config(v)))
                .collect::<HashMap<String, config::Value>>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_are_split_on_the_first_equal_sign() {
        assert_eq!(
            split_setting("reindex.options.script=ctx._source.a=1").unwrap(),
            ("reindex.options.script", "ctx._source.a=1")
        );
        assert!(split_setting("reindex.source").is_err());
        assert!(split_setting("=value").is_err());
    }

    #[test]
    fn override_values_are_read_as_json_when_they_parse() {
        assert_eq!(override_value("100").into_int().unwrap(), 100);
        assert!(override_value("true").into_bool().unwrap());
        assert_eq!(
            override_value("munin_poi_v1").into_str().unwrap(),
            "munin_poi_v1"
        );
        assert_eq!(
            override_value("ctx._source.a=1").into_str().unwrap(),
            "ctx._source.a=1"
        );
        let table = override_value(r#"{"term": {"dataset": "fr"}}"#)
            .into_table()
            .unwrap();
        assert!(table.contains_key("term"));
    }
}
