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

use crate::core::job::Job;
use crate::util::filesystem;
use std::collections::btree_set::BTreeSet;
use std::collections::HashMap;
use std::path::Path;

#[derive(Eq)]
pub struct EnvVar {
    key: String,
    value: String,
}

impl PartialEq for EnvVar {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Ord for EnvVar {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl PartialOrd for EnvVar {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl EnvVar {
    pub fn with(key: &str, value: &str) -> Self {
        Self::new().key(key).value(value)
    }

    pub fn new() -> Self {
        Self {
            key: String::new(),
            value: String::new(),
        }
    }

    /// Sets the environment key.
    pub fn key(mut self, s: &str) -> Self {
        // normalize the key name upon entry
        self.key = s.to_ascii_uppercase().replace('-', "_");
        self
    }

    /// Sets the environment value.
    pub fn value(mut self, s: &str) -> Self {
        self.value = s.to_owned();
        self
    }
}

impl std::fmt::Debug for EnvVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}=\"{}\"", self.key, self.value)
    }
}

impl std::fmt::Display for EnvVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// The set of variables handed to a backend's child process.
#[derive(Debug, Default)]
pub struct Environment(BTreeSet<EnvVar>);

impl Environment {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn insert(&mut self, var: EnvVar) -> bool {
        self.0.insert(var)
    }

    pub fn into_map(&self) -> HashMap<&str, &str> {
        self.0
            .iter()
            .map(|v| (v.key.as_str(), v.value.as_str()))
            .collect()
    }

    /// Loads the variables describing a [Job] being built by `tool` inside `work_root`.
    ///
    /// Every job parameter is exported under the `EDA_PARAM_` prefix with its default value.
    pub fn from_job(mut self, job: &Job, tool: &str, work_root: &Path) -> Self {
        self.insert(EnvVar::with(EDA_JOB_NAME, job.get_name()));
        self.insert(EnvVar::with(EDA_TOOL, tool));
        self.insert(EnvVar::with(
            EDA_WORK_ROOT,
            &filesystem::into_std_str(work_root),
        ));
        job.get_parameters().iter().for_each(|(name, param)| {
            self.insert(EnvVar::with(
                &format!("{}{}", EDA_PARAM_PREFIX, name),
                &param.default_as_string(),
            ));
        });
        self
    }

    pub fn read(key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

pub const EDA_JOB_NAME: &str = "EDA_JOB_NAME";
pub const EDA_TOOL: &str = "EDA_TOOL";
pub const EDA_WORK_ROOT: &str = "EDA_WORK_ROOT";
pub const EDA_PARAM_PREFIX: &str = "EDA_PARAM_";

/// Overrides the program used to reach the SandPiper-SaaS transpiler.
pub const SANDPIPER_SAAS: &str = "SANDPIPER_SAAS";

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::job::Parameter;

    #[test]
    fn key_is_normalized() {
        let var = EnvVar::new().key("eda-param-width").value("32");
        assert_eq!(var.to_string(), "EDA_PARAM_WIDTH=32");
    }

    #[test]
    fn insert_keeps_first() {
        let mut env = Environment::new();
        assert_eq!(env.insert(EnvVar::with("KEY", "a")), true);
        assert_eq!(env.insert(EnvVar::with("key", "b")), false);
        assert_eq!(env.into_map(), HashMap::from([("KEY", "a")]));
    }

    #[test]
    fn exports_job_variables() {
        let job = Job::new("build_tlv1").parameter(
            "stages",
            Parameter::new("int", "vlogdefine").default(toml::Value::Integer(4)),
        );
        let env = Environment::new().from_job(&job, "sandpipersaas", Path::new("build"));
        assert_eq!(
            env.into_map(),
            HashMap::from([
                (EDA_JOB_NAME, "build_tlv1"),
                (EDA_TOOL, "sandpipersaas"),
                (EDA_WORK_ROOT, "build"),
                ("EDA_PARAM_STAGES", "4"),
            ])
        );
    }
}
