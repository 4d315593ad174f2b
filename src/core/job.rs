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

use crate::error::{Error, LastError};
use crate::util::anyerror::Fault;
use crate::util::filesystem;
use serde::de::{self};
use serde::{Deserialize, Serialize, Serializer};
use serde_derive::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Source file for the WARP-V core, relative to where the tool is launched.
pub const WARP_V_SOURCE: &str = "warp-v.tlv";
pub const WARP_V_JOB_NAME: &str = "build_tlv1";

/// The dialect tag attached to every file in a job.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum FileType {
    TlVerilog,
    Verilog,
    SystemVerilog,
    Vhdl,
    Other(String),
}

impl FromStr for FileType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "TLVerilogSource" => Self::TlVerilog,
            "verilogSource" => Self::Verilog,
            "systemVerilogSource" => Self::SystemVerilog,
            "vhdlSource" => Self::Vhdl,
            _ => Self::Other(s.to_string()),
        })
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::TlVerilog => "TLVerilogSource",
            Self::Verilog => "verilogSource",
            Self::SystemVerilog => "systemVerilogSource",
            Self::Vhdl => "vhdlSource",
            Self::Other(s) => s.as_str(),
        };
        write!(f, "{}", tag)
    }
}

impl<'de> Deserialize<'de> for FileType {
    fn deserialize<D>(deserializer: D) -> Result<FileType, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct TagVisitor;

        impl<'de> de::Visitor<'de> for TagVisitor {
            type Value = FileType;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a file type tag")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                match FileType::from_str(v) {
                    Ok(t) => Ok(t),
                    Err(e) => match e {},
                }
            }
        }

        deserializer.deserialize_str(TagVisitor)
    }
}

impl Serialize for FileType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// A single input file of a job.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileRecord {
    name: String,
    file_type: FileType,
    #[serde(default, skip_serializing_if = "is_false")]
    is_include_file: bool,
}

fn is_false(b: &bool) -> bool {
    *b == false
}

impl FileRecord {
    pub fn new(name: &str, file_type: FileType) -> Self {
        Self {
            name: name.to_string(),
            file_type,
            is_include_file: false,
        }
    }

    /// Marks the file as only being pulled in by other sources.
    pub fn include(mut self) -> Self {
        self.is_include_file = true;
        self
    }

    /// References the path to the file, relative to the work root.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_file_type(&self) -> &FileType {
        &self.file_type
    }

    pub fn is_include_file(&self) -> bool {
        self.is_include_file
    }
}

/// A value inside a tool's option bag.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Str(String),
    List(Vec<String>),
    Table(BTreeMap<String, OptionValue>),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&Vec<String>> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<Vec<&str>> for OptionValue {
    fn from(value: Vec<&str>) -> Self {
        Self::List(value.into_iter().map(|s| s.to_string()).collect())
    }
}

/// Free-form options scoped to a single tool.
///
/// The contents are never interpreted by the job; the selected backend decides
/// what each key means.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolOptions(BTreeMap<String, OptionValue>);

impl ToolOptions {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn set<V: Into<OptionValue>>(mut self, key: &str, value: V) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

/// A design parameter passed along with the job.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Parameter {
    datatype: String,
    paramtype: String,
    default: Option<toml::Value>,
    description: Option<String>,
}

impl Parameter {
    pub fn new(datatype: &str, paramtype: &str) -> Self {
        Self {
            datatype: datatype.to_string(),
            paramtype: paramtype.to_string(),
            default: None,
            description: None,
        }
    }

    pub fn default(mut self, value: toml::Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn get_datatype(&self) -> &str {
        &self.datatype
    }

    pub fn get_paramtype(&self) -> &str {
        &self.paramtype
    }

    /// Renders the default value as plain text (strings lose their quotes).
    pub fn default_as_string(&self) -> String {
        match &self.default {
            Some(toml::Value::String(s)) => s.clone(),
            Some(v) => v.to_string(),
            None => String::new(),
        }
    }
}

/// The declarative description of one build invocation.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    name: String,
    #[serde(default)]
    files: Vec<FileRecord>,
    #[serde(default)]
    parameters: BTreeMap<String, Parameter>,
    #[serde(default)]
    tool_options: BTreeMap<String, ToolOptions>,
}

impl FromStr for Job {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

impl Job {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            files: Vec::new(),
            parameters: BTreeMap::new(),
            tool_options: BTreeMap::new(),
        }
    }

    pub fn file(mut self, record: FileRecord) -> Self {
        self.files.push(record);
        self
    }

    pub fn parameter(mut self, name: &str, param: Parameter) -> Self {
        self.parameters.insert(name.to_string(), param);
        self
    }

    pub fn tool_options(mut self, tool: &str, options: ToolOptions) -> Self {
        self.tool_options.insert(tool.to_string(), options);
        self
    }

    /// Creates the job that transpiles the WARP-V core from [WARP_V_SOURCE].
    pub fn warp_v(work_root: &Path) -> Result<Self, Fault> {
        Self::warp_v_from(Path::new(WARP_V_SOURCE), work_root)
    }

    /// Creates the WARP-V job reading its TL-Verilog from `source`.
    ///
    /// The file is recorded relative to `work_root`; its existence is not checked here.
    pub fn warp_v_from(source: &Path, work_root: &Path) -> Result<Self, Fault> {
        let src = filesystem::relative_to(source, work_root)?;
        Ok(Self::new(WARP_V_JOB_NAME)
            .file(FileRecord::new(
                &filesystem::into_std_str(&src),
                FileType::TlVerilog,
            ))
            .tool_options(
                "sandpipersaas",
                ToolOptions::new()
                    .set(
                        "sandpiper_saas",
                        vec![
                            "--bestsv",
                            "--inlineGen",
                            "--m4def 'm5_CONFIG_EXPR=m5_def(STANDARD_CONFIG,4-stage)'",
                        ],
                    )
                    .set("output_file", "warp-v_rtl.sv")
                    .set("output_dir", "out1"),
            ))
    }

    /// Loads a job from a TOML file.
    ///
    /// File names inside the job file are written relative to the job file's
    /// own directory and get re-expressed relative to `work_root`.
    pub fn from_file(path: &Path, work_root: &Path) -> Result<Self, Fault> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::FailedToLoadJob(path.to_path_buf(), LastError(e.to_string())))?;
        let mut job = Self::from_str(&text)
            .map_err(|e| Error::FailedToLoadJob(path.to_path_buf(), LastError(e.to_string())))?;

        let job_dir = match path.parent() {
            Some(p) => p.to_path_buf(),
            None => PathBuf::new(),
        };
        for record in job.files.iter_mut() {
            let rel = filesystem::relative_to(&job_dir.join(&record.name), work_root)?;
            record.name = filesystem::into_std_str(&rel);
        }
        Ok(job)
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_files(&self) -> &Vec<FileRecord> {
        &self.files
    }

    pub fn get_parameters(&self) -> &BTreeMap<String, Parameter> {
        &self.parameters
    }

    /// References the option bag for `tool`, if the job declares one.
    pub fn get_tool_options(&self, tool: &str) -> Option<&ToolOptions> {
        self.tool_options.get(tool)
    }
}
