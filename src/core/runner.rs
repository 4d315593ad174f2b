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
use crate::core::registry::Registry;
use crate::error::{Error, Hint, LastError};
use crate::util::anyerror::Fault;
use std::io::ErrorKind;
use std::path::Path;

/// Dispatches `job` to the backend registered as `tool` and drives it through
/// configure, build, and run inside `work_root`.
///
/// The work root must not exist yet; it is created before the backend is
/// constructed. A failing step stops the sequence and leaves the work root as-is.
pub fn run(
    registry: &Registry,
    tool: &str,
    job: Job,
    work_root: &Path,
    verbose: bool,
) -> Result<(), Fault> {
    // resolve the tool before touching the filesystem
    let tool = registry.lookup(tool)?;

    // the final directory must be newly made by this run
    let created = match work_root.parent() {
        Some(parent) => std::fs::create_dir_all(parent),
        None => Ok(()),
    }
    .and_then(|_| std::fs::create_dir(work_root));
    if let Err(e) = created {
        return match e.kind() {
            ErrorKind::AlreadyExists => Err(Error::PathAlreadyExists(
                work_root.to_path_buf(),
                Hint::RemoveWorkRoot,
            ))?,
            _ => Err(Error::FailedToCreateWorkRoot(
                work_root.to_path_buf(),
                LastError(e.to_string()),
            ))?,
        };
    }

    let mut backend = tool.create(job, work_root.to_path_buf(), verbose)?;
    if verbose == true {
        println!("info: configuring {} in {:?}", tool.get_name(), work_root);
    }
    backend.configure()?;
    if verbose == true {
        println!("info: building with {}", tool.get_name());
    }
    backend.build()?;
    backend.run()
}
