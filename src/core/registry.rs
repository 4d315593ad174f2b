//
//  Copyright (C) 2022-2024  Chase Ruskin
//
//  This program is free software: you can redistribute it and/or modify
//  it under the terms of the GNU General Public License as published by
//  the Free Software Foundation, either version 3 of the License, or
//  (at your option) any later version.
//
//  This program is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//  GNU General Public License for more details.
//
//  You should have received a copy of the GNU General Public License
//  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::core::backend::Backend;
use crate::core::job::Job;
use crate::core::tools::sandpipersaas::{self, SandpiperSaas};
use crate::error::{Error, Hint};
use crate::util::anyerror::Fault;
use std::collections::HashMap;
use std::path::PathBuf;

/// Constructs a backend for a job that will be built inside the given work root.
///
/// The flag requests the backend to display the commands it executes.
pub type Factory = Box<dyn Fn(Job, PathBuf, bool) -> Result<Box<dyn Backend>, Fault>>;

/// A registered backend and its one-line description.
pub struct Tool {
    name: String,
    summary: String,
    factory: Factory,
}

impl Tool {
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Creates a new instance of the backend.
    pub fn create(&self, job: Job, work_root: PathBuf, verbose: bool) -> Result<Box<dyn Backend>, Fault> {
        (self.factory)(job, work_root, verbose)
    }

    /// Displays a tool's information in a single line for quick glance.
    pub fn quick_info(&self) -> String {
        format!("{:<16}{}", self.name, self.summary)
    }
}

/// The closed set of tool names a job can be dispatched to.
pub struct Registry {
    tools: HashMap<String, Tool>,
}

impl Default for Registry {
    /// Creates a registry holding every backend shipped with this crate.
    fn default() -> Self {
        Self::new().register(
            sandpipersaas::NAME,
            sandpipersaas::SUMMARY,
            |job, work_root, verbose| {
                Ok(Box::new(SandpiperSaas::from_env(job, work_root)?.verbose(verbose)))
            },
        )
    }
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Adds a tool under `name`, replacing any tool already using it.
    pub fn register<F>(mut self, name: &str, summary: &str, factory: F) -> Self
    where
        F: Fn(Job, PathBuf, bool) -> Result<Box<dyn Backend>, Fault> + 'static,
    {
        self.tools.insert(
            name.to_string(),
            Tool {
                name: name.to_string(),
                summary: summary.to_string(),
                factory: Box::new(factory),
            },
        );
        self
    }

    /// Finds the tool registered as `name`.
    pub fn lookup(&self, name: &str) -> Result<&Tool, Error> {
        self.tools
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string(), Hint::ToolsList))
    }

    /// Creates a string to display the list of tools.
    ///
    /// The string lists the tools in alphabetical order by name.
    pub fn list(&self) -> String {
        let mut tools: Vec<&Tool> = self.tools.values().collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
            .into_iter()
            .fold(String::new(), |acc, t| acc + &t.quick_info() + "\n")
    }
}
