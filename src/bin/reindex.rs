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

use reindex::settings::{Command, Opts, Settings};
use reindex::{Error, Rubber};
use slog_scope::info;

fn run(opts: Opts) -> Result<(), Error> {
    let settings = Settings::new(&opts)?;

    match opts.cmd {
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Command::Body => {
            let rubber = Rubber::new(&settings.elasticsearch.url)?;
            let reindex = settings.reindex(&rubber);
            println!("{}", serde_json::to_string_pretty(&reindex.body())?);
        }
        Command::Run => {
            info!(
                "Trying to connect to elasticsearch at {}",
                &settings.elasticsearch.url
            );
            let rubber = Rubber::new(&settings.elasticsearch.url)?;
            let mut reindex = settings.reindex(&rubber);
            let response = reindex.run()?.data().clone();
            match reindex.task_id() {
                Some(task) => {
                    info!("reindex running as task {}", task);
                    println!("{}", task);
                }
                None => println!("{}", serde_json::to_string_pretty(&response)?),
            }
        }
    }
    Ok(())
}

fn main() {
    reindex::utils::launch_run(run);
}
