use std::fs;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

use crate::SteamError;

/// A value in a text VDF (KeyValues) document.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Object(Object),
}

/// An ordered list of key/value pairs.
///
/// Key lookups ignore ASCII case, like Steam does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    entries: Vec<(String, Value)>,
}

impl Object {
    /// Returns the first value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    /// Returns the string stored under `key`, if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            Value::Str(s) => Some(s),
            Value::Object(_) => None,
        }
    }

    /// Returns the nested object stored under `key`, if it is an object.
    pub fn get_object(&self, key: &str) -> Option<&Object> {
        match self.get(key)? {
            Value::Object(o) => Some(o),
            Value::Str(_) => None,
        }
    }

    /// Iterates over entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads and parses a text VDF file.
pub fn load(path: &Path) -> Result<Object, SteamError> {
    let text = fs::read_to_string(path)
        .map_err(|e| SteamError::Vdf(format!("failed to read {}: {e}", path.display())))?;
    parse(&text)
}

/// Parses a text VDF document into its root object.
pub fn parse(text: &str) -> Result<Object, SteamError> {
    let mut lexer = Lexer {
        chars: text.chars().peekable(),
    };
    parse_object(&mut lexer, false)
}

#[derive(Debug, PartialEq)]
enum Token {
    Open,
    Close,
    Str(String),
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Lexer<'_> {
    fn next_token(&mut self) -> Result<Option<Token>, SteamError> {
        loop {
            self.skip_whitespace_and_comments();

            let Some(&c) = self.chars.peek() else {
                return Ok(None);
            };

            match c {
                '{' => {
                    self.chars.next();
                    return Ok(Some(Token::Open));
                }
                '}' => {
                    self.chars.next();
                    return Ok(Some(Token::Close));
                }
                '"' => {
                    self.chars.next();
                    return self.read_quoted().map(|s| Some(Token::Str(s)));
                }
                _ => {
                    let word = self.read_unquoted();
                    // Platform conditionals such as [$WIN32] carry no data.
                    if word.starts_with('[') && word.ends_with(']') {
                        continue;
                    }
                    return Ok(Some(Token::Str(word)));
                }
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
                self.chars.next();
            }

            let mut ahead = self.chars.clone();
            if ahead.next() == Some('/') && ahead.next() == Some('/') {
                for c in self.chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
                continue;
            }
            return;
        }
    }

    fn read_quoted(&mut self) -> Result<String, SteamError> {
        let mut out = String::new();
        while let Some(c) = self.chars.next() {
            match c {
                '"' => return Ok(out),
                '\\' => match self.chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('\\') => out.push('\\'),
                    Some('"') => out.push('"'),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => break,
                },
                _ => out.push(c),
            }
        }
        Err(SteamError::Vdf("unterminated quoted string".into()))
    }

    fn read_unquoted(&mut self) -> String {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || c == '{' || c == '}' || c == '"' {
                break;
            }
            out.push(c);
            self.chars.next();
        }
        out
    }
}

fn parse_object(lexer: &mut Lexer<'_>, nested: bool) -> Result<Object, SteamError> {
    let mut obj = Object::default();

    loop {
        let key = match lexer.next_token()? {
            None if nested => {
                return Err(SteamError::Vdf("unexpected end of data inside object".into()));
            }
            None => return Ok(obj),
            Some(Token::Close) if nested => return Ok(obj),
            Some(Token::Close) => {
                return Err(SteamError::Vdf("unexpected '}' at top level".into()));
            }
            Some(Token::Open) => {
                return Err(SteamError::Vdf("expected key, got '{'".into()));
            }
            Some(Token::Str(key)) => key,
        };

        let value = match lexer.next_token()? {
            Some(Token::Open) => Value::Object(parse_object(lexer, true)?),
            Some(Token::Str(s)) => Value::Str(s),
            Some(Token::Close) | None => {
                return Err(SteamError::Vdf(format!("missing value for key '{key}'")));
            }
        };

        obj.entries.push((key, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY_FOLDERS: &str = r#"
"libraryfolders"
{
	"0"
	{
		"path"		"C:\\Program Files (x86)\\Steam"
		"label"		""
		"apps"
		{
			"228980"		"250"
		}
	}
	"1"
	{
		"path"		"D:\\SteamLibrary"
	}
}
"#;

    #[test]
    fn parse_nested_objects() {
        let root = parse(LIBRARY_FOLDERS).unwrap();
        let folders = root.get_object("libraryfolders").unwrap();
        assert_eq!(folders.len(), 2);

        let first = folders.get_object("0").unwrap();
        assert_eq!(first.get_str("path"), Some("C:\\Program Files (x86)\\Steam"));
        assert_eq!(first.get_str("label"), Some(""));
        assert_eq!(
            first.get_object("apps").unwrap().get_str("228980"),
            Some("250")
        );
    }

    #[test]
    fn keys_are_case_insensitive() {
        let root = parse(r#""Root" { "MostRecent" "1" }"#).unwrap();
        let obj = root.get_object("root").unwrap();
        assert_eq!(obj.get_str("mostrecent"), Some("1"));
    }

    #[test]
    fn comments_and_unquoted_tokens() {
        let text = "// header comment\nroot\n{\n  key value // trailing\n  other \"x\"\n}\n";
        let root = parse(text).unwrap();
        let obj = root.get_object("root").unwrap();
        assert_eq!(obj.get_str("key"), Some("value"));
        assert_eq!(obj.get_str("other"), Some("x"));
    }

    #[test]
    fn conditionals_are_skipped() {
        let text = r#""root" { "a" "1" [$WIN32] "b" "2" }"#;
        let root = parse(text).unwrap();
        let obj = root.get_object("root").unwrap();
        assert_eq!(obj.get_str("a"), Some("1"));
        assert_eq!(obj.get_str("b"), Some("2"));
    }

    #[test]
    fn escaped_quote_inside_string() {
        let root = parse(r#""k" "say \"hi\"""#).unwrap();
        assert_eq!(root.get_str("k"), Some("say \"hi\""));
    }

    #[test]
    fn get_wrong_kind_returns_none() {
        let root = parse(r#""a" "1" "b" { }"#).unwrap();
        assert!(root.get_object("a").is_none());
        assert!(root.get_str("b").is_none());
        assert!(root.get("missing").is_none());
    }

    #[test]
    fn reject_unterminated_object() {
        assert!(parse(r#""root" { "a" "1""#).is_err());
    }

    #[test]
    fn reject_unterminated_string() {
        assert!(parse(r#""root" "never closed"#).is_err());
    }

    #[test]
    fn reject_stray_close() {
        assert!(parse("}").is_err());
    }

    #[test]
    fn reject_missing_value() {
        assert!(parse(r#""root" { "a" }"#).is_err());
    }

    #[test]
    fn empty_document() {
        assert!(parse("").unwrap().is_empty());
    }
}
