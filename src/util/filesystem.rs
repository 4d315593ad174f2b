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

use crate::util::anyerror::Fault;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// Converts the path into a string using forward slashes as separators.
pub fn into_std_str(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

/// Removes `.` components and folds `..` components into their parents
/// without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => (),
            Component::ParentDir => match result.components().next_back() {
                Some(Component::Normal(_)) => {
                    result.pop();
                }
                // cannot go above the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => (),
                _ => result.push(".."),
            },
            _ => result.push(comp.as_os_str()),
        }
    }
    result
}

/// Expresses `path` relative to the directory `base`.
///
/// Both paths are resolved against the current working directory and compared
/// lexically, so neither one needs to exist yet. When the paths share no common
/// root (different drives) the absolute form of `path` is returned.
pub fn relative_to(path: &Path, base: &Path) -> Result<PathBuf, Fault> {
    let cwd = std::env::current_dir()?;
    let path = normalize(&cwd.join(path));
    let base = normalize(&cwd.join(base));

    let path_comps: Vec<Component> = path.components().collect();
    let base_comps: Vec<Component> = base.components().collect();

    let common = path_comps
        .iter()
        .zip(base_comps.iter())
        .take_while(|(a, b)| a == b)
        .count();
    if common == 0 {
        return Ok(path);
    }

    let mut result = PathBuf::new();
    base_comps[common..].iter().for_each(|_| result.push(".."));
    path_comps[common..]
        .iter()
        .for_each(|c| result.push(c.as_os_str()));

    if result.as_os_str().is_empty() == true {
        result.push(".");
    }
    Ok(result)
}

/// Spawns `command` with `args` from the directory `cwd`.
///
/// The child shares this process's standard output and error streams.
pub fn invoke(
    cwd: &Path,
    command: &str,
    args: &[String],
    envs: HashMap<&str, &str>,
) -> Result<Child, std::io::Error> {
    Command::new(command)
        .args(args)
        .envs(envs)
        .current_dir(cwd)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normalize_folds_parents() {
        assert_eq!(normalize(Path::new("a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize(Path::new("/a/../..")), PathBuf::from("/"));
    }

    #[test]
    fn relative_to_sibling_dir() {
        let rel = relative_to(Path::new("warp-v.tlv"), Path::new("build_multifile")).unwrap();
        assert_eq!(rel, PathBuf::from("../warp-v.tlv"));

        let rel = relative_to(
            Path::new("/tmp/root/warp-v.tlv"),
            Path::new("/tmp/root/build/nested"),
        )
        .unwrap();
        assert_eq!(rel, PathBuf::from("../../warp-v.tlv"));
    }

    #[test]
    fn relative_to_inside_and_same_dir() {
        let rel = relative_to(Path::new("/tmp/root/src/a.tlv"), Path::new("/tmp/root")).unwrap();
        assert_eq!(rel, PathBuf::from("src/a.tlv"));

        let rel = relative_to(Path::new("/tmp/root"), Path::new("/tmp/root/")).unwrap();
        assert_eq!(rel, PathBuf::from("."));
    }

    #[test]
    fn std_str_uses_forward_slashes() {
        assert_eq!(into_std_str(Path::new("../warp-v.tlv")), "../warp-v.tlv");
    }
}
