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

use crate::commands::helps::edabuild;
use crate::core::job::Job;
use crate::core::registry::Registry;
use crate::core::runner;
use crate::core::tools::sandpipersaas;
use crate::util::anyerror::AnyError;
use std::path::PathBuf;
use std::str::FromStr;

use cliproc::{cli, proc, stage::*};
use cliproc::{Arg, Cli, Command, Help};

/// Directory the job is built in when none is given.
pub const DEFAULT_WORK_ROOT: &str = "build_multifile";
pub const DEFAULT_TOOL: &str = sandpipersaas::NAME;

#[derive(Debug, PartialEq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl FromStr for ColorMode {
    type Err = AnyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err(AnyError(format!(
                "unknown color mode {:?}: expecting auto, always, or never",
                s
            ))),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct EdaBuild {
    version: bool,
    list: bool,
    verbose: bool,
    color: Option<ColorMode>,
    tool: Option<String>,
    work_root: Option<PathBuf>,
    job: Option<PathBuf>,
}

impl Command for EdaBuild {
    fn interpret<'c>(cli: &'c mut Cli<Memory>) -> cli::Result<Self> {
        cli.help(Help::with(edabuild::HELP))?;
        Ok(EdaBuild {
            // Flags
            version: cli.check(Arg::flag("version"))?,
            list: cli.check(Arg::flag("list"))?,
            verbose: cli.check(Arg::flag("verbose"))?,
            // Options
            color: cli.get(Arg::option("color").value("when"))?,
            tool: cli.get(Arg::option("tool").value("name"))?,
            work_root: cli.get(Arg::option("work-root").value("dir"))?,
            job: cli.get(Arg::option("job").value("file"))?,
        })
    }

    fn execute(self) -> proc::Result {
        // need to set this coloring mode ASAP
        match self.color.as_ref().unwrap_or(&ColorMode::Auto) {
            ColorMode::Always => colored::control::set_override(true),
            ColorMode::Never => colored::control::set_override(false),
            ColorMode::Auto => (),
        }

        // prioritize version information
        if self.version == true {
            println!("edabuild {}", VERSION);
            return Ok(());
        }

        let registry = Registry::default();

        // display tool list and exit
        if self.list == true {
            print!("{}", registry.list());
            return Ok(());
        }

        let work_root = self
            .work_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_ROOT));
        let tool = self.tool.as_deref().unwrap_or(DEFAULT_TOOL);

        let job = match &self.job {
            Some(path) => Job::from_file(path, &work_root)?,
            None => Job::warp_v(&work_root)?,
        };

        if self.verbose == true {
            println!(
                "info: building job {:?} with {} in {:?}",
                job.get_name(),
                tool,
                work_root
            );
        }
        runner::run(&registry, tool, job, &work_root, self.verbose)?;
        Ok(())
    }
}

const VERSION: &str = env!("CARGO_PKG_VERSION");
