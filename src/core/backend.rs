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

use crate::error::{Error, Hint, LastError};
use crate::util::anyerror::Fault;
use crate::util::environment::Environment;
use crate::util::filesystem;
use std::path::Path;

/// An adapter that drives one external tool through a job.
///
/// The runner calls each step exactly once and in order.
pub trait Backend {
    /// Translates the job into whatever the tool needs on disk or in memory.
    fn configure(&mut self) -> Result<(), Fault>;

    /// Performs the actual work of the tool.
    fn build(&mut self) -> Result<(), Fault>;

    /// Finalizes the job and checks the results.
    fn run(&mut self) -> Result<(), Fault>;
}

/// A backend step that is carried out by spawning an external program.
pub trait Process {
    /// The program to execute, followed by any arguments that must precede the rest.
    fn get_command(&self) -> &Vec<String>;

    fn get_args(&self) -> Vec<String>;

    /// The name of the environment variable that can override the program.
    fn get_override_var(&self) -> &'static str;

    /// Runs the command with its arguments from `cwd` and waits for it to finish.
    fn execute(&self, cwd: &Path, verbose: bool, envs: &Environment) -> Result<(), Fault> {
        let (program, leading) = match self.get_command().split_first() {
            Some((p, rest)) => (p, rest),
            None => Err(Error::ToolProcFailed(
                String::new(),
                LastError(String::from("no program was specified")),
                Hint::ToolCommand(self.get_override_var()),
            ))?,
        };
        let args = [leading, self.get_args().as_slice()].concat();
        // display the literal command being ran
        if verbose == true {
            let s = args
                .iter()
                .fold(String::new(), |x, y| x + "\"" + y + "\" ");
            println!("info: running: {} {}", program, s);
        }
        let mut proc = match filesystem::invoke(cwd, program, &args, envs.into_map()) {
            Ok(p) => p,
            Err(e) => Err(Error::ToolProcFailed(
                program.to_string(),
                LastError(e.to_string()),
                Hint::ToolCommand(self.get_override_var()),
            ))?,
        };
        let exit_code = proc.wait()?;
        match exit_code.code() {
            Some(num) => {
                if num != 0 {
                    Err(Error::ChildProcErrorCode(num))?
                } else {
                    Ok(())
                }
            }
            None => Err(Error::ChildProcTerminated)?,
        }
    }
}
