// src/naming.rs

use crate::catalog::ProjectCatalog;
use std::fmt;

/// Extensions made of several dot-separated parts, longest first. These are
/// matched as a unit before falling back to the last dot of the file name.
const COMPOUND_EXTENSIONS: &[&str] = &[".blade.php", ".html.erb", ".8xp.txt", ".d.ts"];

const DELIMITERS: [char; 3] = ['-', '_', ' '];

/// Why a file name could not be turned into a project name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("{0:?} has no usable extension")]
    NoExtension(String),
    #[error("{0:?} does not follow a project naming convention")]
    Malformed(String),
    #[error("{0:?} is not a known project")]
    UnknownProject(String),
}

/// The canonical name of a project in its three spellings.
///
/// `name` is human readable (`Hello World`), `pathlike` is used in URLs and
/// folder names (`hello-world`), `key` ignores delimiters and case entirely
/// (`helloworld`) and is what lookups compare.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectName {
    name: String,
    pathlike: String,
    key: String,
}

impl ProjectName {
    /// Builds a name from lowercase words, upper-casing the declared acronyms.
    pub fn from_words(words: &[String], acronyms: &[String]) -> Self {
        let name = words
            .iter()
            .map(|word| {
                if acronyms.iter().any(|a| a.eq_ignore_ascii_case(word)) {
                    word.to_uppercase()
                } else {
                    title_case(word)
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            name,
            pathlike: words.join("-"),
            key: words.concat(),
        }
    }

    /// Builds a name without any catalog knowledge. A lone word of three
    /// characters or fewer is taken to be an acronym (`mst` -> `MST`).
    pub fn guess(words: &[String]) -> Self {
        match words {
            [word] if word.chars().count() <= 3 => Self::from_words(words, &[word.clone()]),
            _ => Self::from_words(words, &[]),
        }
    }

    /// Parses any spelling of a project name (`Hello World`, `hello-world`,
    /// `hello_world`, `HelloWorld`).
    pub fn parse(text: &str) -> Option<Self> {
        split_words(text).map(|words| Self::guess(&words))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pathlike(&self) -> &str {
        &self.pathlike
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ProjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A successfully resolved sample program file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName {
    pub project: ProjectName,
    pub extension: String,
}

/// Maps bare file names onto canonical project names.
///
/// Without a catalog every well-formed name is accepted. Names whose key is in
/// the catalog take the catalog's spelling; an exclusive catalog rejects the
/// rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectNameResolver<'a> {
    catalog: Option<&'a ProjectCatalog>,
}

impl<'a> ProjectNameResolver<'a> {
    pub fn new(catalog: Option<&'a ProjectCatalog>) -> Self {
        Self { catalog }
    }

    pub fn resolve(&self, file_name: &str) -> Result<ResolvedName, NameError> {
        let (stem, extension) = split_extension(file_name)
            .ok_or_else(|| NameError::NoExtension(file_name.to_string()))?;

        if !stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(NameError::Malformed(file_name.to_string()));
        }
        let words = split_words(stem).ok_or_else(|| NameError::Malformed(file_name.to_string()))?;

        let project = match self.catalog {
            Some(catalog) => match catalog.get(&words.concat()) {
                Some(entry) => entry.name().clone(),
                None if catalog.is_exclusive() => {
                    return Err(NameError::UnknownProject(file_name.to_string()))
                }
                None => ProjectName::guess(&words),
            },
            None => ProjectName::guess(&words),
        };

        Ok(ResolvedName {
            project,
            extension: extension.to_string(),
        })
    }
}

/// Splits a file name into `(stem, extension)`, the extension keeping its
/// leading dot. Hidden files and names without an extension yield `None`.
pub fn split_extension(file_name: &str) -> Option<(&str, &str)> {
    let lower = file_name.to_ascii_lowercase();
    for ext in COMPOUND_EXTENSIONS {
        if lower.len() > ext.len() && lower.ends_with(ext) {
            // ASCII lowercasing keeps byte offsets intact
            let at = file_name.len() - ext.len();
            return Some((&file_name[..at], &file_name[at..]));
        }
    }

    let dot = file_name.rfind('.')?;
    if dot == 0 {
        return None;
    }
    let ext = &file_name[dot..];
    let valid = ext.len() > 1 && ext[1..].chars().all(|c| c.is_ascii_alphanumeric() || c == '+');
    valid.then(|| (&file_name[..dot], ext))
}

/// Splits an identifier into lowercase words. Delimited identifiers are split
/// on `-`, `_` and spaces; anything else is split on camel-case boundaries.
pub fn split_words(text: &str) -> Option<Vec<String>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if text.contains(DELIMITERS) {
        let parts: Vec<&str> = text.split(DELIMITERS).collect();
        if parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_alphanumeric())) {
            return None;
        }
        return Some(parts.into_iter().map(str::to_ascii_lowercase).collect());
    }

    if !text.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(split_camel_case(text))
}

fn split_camel_case(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        let boundary = match i.checked_sub(1).map(|j| chars[j]) {
            Some(prev) => {
                let next = chars.get(i + 1);
                (prev.is_ascii_lowercase() && (c.is_ascii_uppercase() || c.is_ascii_digit()))
                    || (c.is_ascii_uppercase() && next.is_some_and(|n| n.is_ascii_lowercase()))
            }
            None => false,
        };
        if boundary && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Delimiter- and case-insensitive form used to compare project names.
pub fn lookup_key(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Upper-cases every letter that follows a non-letter, lower-cases the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut after_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }
    out
}

/// Turns a language folder name into the closest readable language name:
/// `google-apps-script` -> `Google Apps Script`, `c-sharp` -> `C#`.
pub fn readable_language_name(pathlike: &str) -> String {
    let tokens: Vec<&str> = pathlike
        .split('-')
        .map(|token| match token {
            "plus" => "+",
            "sharp" => "#",
            "star" => "*",
            other => other,
        })
        .collect();

    let has_symbol = tokens.iter().any(|t| matches!(*t, "+" | "#" | "*"));
    let joined = tokens.join(if has_symbol { "" } else { " " });
    title_case(&joined)
}
