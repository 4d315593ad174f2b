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

use crate::error::Error;

const SINGLE_QUOTE: char = '\'';
const DOUBLE_QUOTE: char = '"';
const ESCAPE: char = '\\';

/// Splits `text` into words the way a POSIX shell would, without performing
/// any expansion.
///
/// Single quotes keep everything literal, double quotes allow `\"` and `\\`,
/// and a backslash outside of quotes escapes the next character.
pub fn split_words(text: &str) -> Result<Vec<String>, Error> {
    let mut words = Vec::new();
    let mut word = String::new();
    // tracks if a word was started (quotes can produce empty words)
    let mut in_word = false;

    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            SINGLE_QUOTE => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some(SINGLE_QUOTE) => break,
                        Some(q) => word.push(q),
                        None => return Err(Error::UnbalancedQuote(text.to_string())),
                    }
                }
            }
            DOUBLE_QUOTE => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some(DOUBLE_QUOTE) => break,
                        Some(ESCAPE) => match chars.next() {
                            Some(e) if e == DOUBLE_QUOTE || e == ESCAPE => word.push(e),
                            Some(e) => {
                                word.push(ESCAPE);
                                word.push(e);
                            }
                            None => return Err(Error::UnbalancedQuote(text.to_string())),
                        },
                        Some(q) => word.push(q),
                        None => return Err(Error::UnbalancedQuote(text.to_string())),
                    }
                }
            }
            ESCAPE => {
                in_word = true;
                if let Some(e) = chars.next() {
                    word.push(e);
                }
            }
            _ if c.is_whitespace() == true => {
                if in_word == true {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            _ => {
                in_word = true;
                word.push(c)
            }
        }
    }
    if in_word == true {
        words.push(word);
    }
    Ok(words)
}

/// Quotes `word` for a POSIX shell only when it would otherwise be split.
pub fn quote_word(word: &str) -> String {
    let plain = word.is_empty() == false
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    match plain {
        true => word.to_string(),
        false => format!("'{}'", word.replace('\'', "'\\''")),
    }
}

/// Escapes `word` for use in a make target or prerequisite list.
///
/// Make splits these lists on whitespace and ignores shell quoting.
pub fn escape_make(word: &str) -> String {
    word.chars().fold(String::new(), |mut acc, c| {
        match c {
            ' ' | '\t' | '#' => {
                acc.push(ESCAPE);
                acc.push(c);
            }
            '$' => acc.push_str("$$"),
            _ => acc.push(c),
        }
        acc
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn split_plain_flags() {
        assert_eq!(split_words("--bestsv").unwrap(), vec!["--bestsv"]);
        assert_eq!(
            split_words("  --inlineGen   --bestsv ").unwrap(),
            vec!["--inlineGen", "--bestsv"]
        );
        assert_eq!(split_words("").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn split_keeps_quoted_text_together() {
        assert_eq!(
            split_words("--m4def 'm5_CONFIG_EXPR=m5_def(STANDARD_CONFIG,4-stage)'").unwrap(),
            vec!["--m4def", "m5_CONFIG_EXPR=m5_def(STANDARD_CONFIG,4-stage)"]
        );
        assert_eq!(
            split_words(r#"-D "A B" C\ D ''"#).unwrap(),
            vec!["-D", "A B", "C D", ""]
        );
        assert_eq!(
            split_words(r#""say \"hi\"""#).unwrap(),
            vec![r#"say "hi""#]
        );
    }

    #[test]
    fn split_unbalanced_quote() {
        assert_eq!(
            split_words("--m4def 'oops"),
            Err(Error::UnbalancedQuote(String::from("--m4def 'oops")))
        );
        assert!(split_words("\"open").is_err());
    }

    #[test]
    fn quote_only_when_needed() {
        assert_eq!(quote_word("../warp-v.tlv"), "../warp-v.tlv");
        assert_eq!(quote_word("m5_def(A,B)"), "'m5_def(A,B)'");
        assert_eq!(quote_word("it's"), "'it'\\''s'");
        assert_eq!(quote_word(""), "''");
    }

    #[test]
    fn escape_make_words() {
        assert_eq!(escape_make("../warp-v.tlv"), "../warp-v.tlv");
        assert_eq!(escape_make("../my core.tlv"), "../my\\ core.tlv");
        assert_eq!(escape_make("a#b$c"), "a\\#b$$c");
    }
}
