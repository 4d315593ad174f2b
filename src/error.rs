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

use crate::core::job::FileType;
use colored::Colorize;
use std::{fmt::Display, path::PathBuf};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("no tool named {0:?}{1}")]
    ToolNotFound(String, Hint),
    #[error("path {0:?} already exists{1}")]
    PathAlreadyExists(PathBuf, Hint),
    #[error("failed to create work root {0:?}: {1}")]
    FailedToCreateWorkRoot(PathBuf, LastError),
    #[error("failed to load job file {0:?}: {1}")]
    FailedToLoadJob(PathBuf, LastError),
    #[error("job {0:?} has no {1} file to process")]
    NoSourceFiles(String, FileType),
    #[error("job {0:?} has {2} {1} files but the tool accepts exactly one")]
    MultipleSourceFiles(String, FileType, usize),
    #[error("source file {0:?} does not exist")]
    SourceNotFound(PathBuf),
    #[error("tool {0:?} requires option {1:?}")]
    MissingToolOption(String, String),
    #[error("tool {0:?} does not accept option {1:?}")]
    UnknownToolOption(String, String),
    #[error("option {1:?} for tool {0:?} expects {2}")]
    ToolOptionType(String, String, &'static str),
    #[error("output file {0:?} must end with \".v\" or \".sv\"")]
    BadOutputFile(String),
    #[error("unterminated quote in argument {0:?}")]
    UnbalancedQuote(String),
    #[error("tool {0:?} must be configured before it can build")]
    BackendNotConfigured(String),
    #[error("failed to execute {0:?}: {1}{2}")]
    ToolProcFailed(String, LastError, Hint),
    #[error("exited with error code: {0}")]
    ChildProcErrorCode(i32),
    #[error("terminated by signal")]
    ChildProcTerminated,
    #[error("expected output file {0:?} was not produced")]
    MissingOutput(PathBuf),
}

#[derive(Debug, PartialEq)]
pub struct LastError(pub String);

impl Display for LastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Error::lowerize(self.0.to_string()))
    }
}

impl Error {
    /// Lowercases the first letter of the message so it can be chained after a colon.
    pub fn lowerize(s: String) -> String {
        let first_word = match s.split_whitespace().next() {
            Some(w) => w,
            None => return s,
        };
        // retain punctuation if the first word is all-caps and longer than 1 character
        if first_word.len() > 1 && first_word.chars().any(|c| c.is_ascii_lowercase()) == false {
            s
        } else {
            s.char_indices()
                .map(|(i, c)| if i == 0 { c.to_ascii_lowercase() } else { c })
                .collect()
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Hint {
    ToolsList,
    RemoveWorkRoot,
    ToolCommand(&'static str),
}

impl Display for Hint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::ToolsList => String::from("use `edabuild --list` to see the list of registered tools"),
            Self::RemoveWorkRoot => String::from(
                "remove the directory or select a different one with `--work-root`",
            ),
            Self::ToolCommand(var) => format!(
                "verify the program is installed or set the {} environment variable to its path",
                var
            ),
        };
        write!(f, "\n\n{}: {}", "hint".green(), Error::lowerize(message))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lowerize_first_letter() {
        assert_eq!(
            Error::lowerize(String::from("No such file or directory")),
            "no such file or directory"
        );
        assert_eq!(
            Error::lowerize(String::from("TLV source missing")),
            "TLV source missing"
        );
        assert_eq!(Error::lowerize(String::new()), "");
    }

    #[test]
    fn display_with_hint() {
        colored::control::set_override(false);
        let err = Error::ToolNotFound(String::from("vivado"), Hint::ToolsList);
        assert_eq!(
            err.to_string(),
            "no tool named \"vivado\"\n\nhint: use `edabuild --list` to see the list of registered tools"
        );
    }
}
