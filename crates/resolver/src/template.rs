use std::fmt;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};
use std::sync::Arc;

use crate::context::HostContext;

/// Token replaced by the game's install folder.
pub const GAME_TOKEN: &str = "{{p|game}}";

const TOKEN_PREFIX: &str = "{{p|";

/// Outcome of resolving a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Every token was substituted and the path normalized.
    Resolved(PathBuf),
    /// Substitution or normalization was incomplete; carries the text as far
    /// as it got.
    BestEffort(String),
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Resolved(p) => Some(p),
            Self::BestEffort(_) => None,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Resolved(p) => p.to_string_lossy().into_owned(),
            Self::BestEffort(s) => s,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(p) => write!(f, "{}", p.display()),
            Self::BestEffort(s) => f.write_str(s),
        }
    }
}

/// Expands save-path templates against a shared [`HostContext`].
#[derive(Debug, Clone)]
pub struct TemplateResolver {
    context: Arc<HostContext>,
}

impl TemplateResolver {
    pub fn new(context: Arc<HostContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &HostContext {
        &self.context
    }

    /// Resolves `template` to a concrete path.
    ///
    /// The template is case-folded first, so literal path text comes out
    /// lowercase while substituted values keep their case. Never fails:
    /// anything that cannot be fully resolved is returned as
    /// [`Resolution::BestEffort`].
    pub fn resolve(&self, template: &str, game_path: Option<&Path>) -> Resolution {
        if template.trim().is_empty() {
            return Resolution::BestEffort(String::new());
        }

        let mut text = template.to_lowercase();
        for (token, value) in self.context.placeholders() {
            if !value.is_empty() && text.contains(token) {
                text = text.replace(token, value);
            }
        }
        if let Some(game) = game_path {
            text = text.replace(GAME_TOKEN, &game.to_string_lossy());
        }

        let text = expand_env_vars(&text, &self.context);

        if text.contains(TOKEN_PREFIX) {
            tracing::trace!(template, result = %text, "template left unresolved tokens");
            return Resolution::BestEffort(text);
        }

        match normalize(&text, &self.context.working_dir) {
            Some(path) => Resolution::Resolved(path),
            None => {
                tracing::trace!(template, result = %text, "template did not normalize");
                Resolution::BestEffort(text)
            }
        }
    }
}

/// Expands `%VAR%`, `${VAR}` and `$VAR`. Unknown variables are left as-is.
fn expand_env_vars(input: &str, ctx: &HostContext) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(idx) = rest.find(['%', '$']) {
        out.push_str(&rest[..idx]);
        let tail = &rest[idx..];

        if let Some((name, consumed)) = parse_var(tail) {
            if let Some(value) = ctx.env_var(name) {
                out.push_str(value);
                rest = &tail[consumed..];
                continue;
            }
        }

        // Sigils are ASCII, so slicing one byte off is safe.
        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(rest);
    out
}

/// Parses a variable reference at the start of `tail`, returning the name and
/// the number of bytes it spans.
fn parse_var(tail: &str) -> Option<(&str, usize)> {
    let is_name = |c: char| c.is_ascii_alphanumeric() || c == '_';

    if let Some(body) = tail.strip_prefix('%') {
        let end = body.find('%')?;
        let name = &body[..end];
        let valid = !name.is_empty() && name.chars().all(|c| is_name(c) || c == '(' || c == ')');
        return valid.then_some((name, end + 2));
    }

    let body = tail.strip_prefix('$')?;
    if let Some(braced) = body.strip_prefix('{') {
        let end = braced.find('}')?;
        let name = &braced[..end];
        let valid = !name.is_empty() && name.chars().all(is_name);
        return valid.then_some((name, end + 3));
    }

    let len = body.find(|c: char| !is_name(c)).unwrap_or(body.len());
    (len > 0).then_some((&body[..len], len + 1))
}

/// Lexically normalizes a Windows- or POSIX-style path.
///
/// Both `\` and `/` separate components. Relative input is anchored on
/// `working_dir`. Returns `None` when `..` climbs above the root or no
/// absolute anchor is available.
fn normalize(path: &str, working_dir: &str) -> Option<PathBuf> {
    let (root, rest) = match split_root(path) {
        Some(split) => split,
        None => {
            if working_dir.is_empty() || split_root(working_dir).is_none() {
                return None;
            }
            let joined = format!("{working_dir}{MAIN_SEPARATOR}{path}");
            return normalize(&joined, working_dir);
        }
    };

    let mut parts: Vec<&str> = Vec::new();
    for segment in rest.split(['\\', '/']) {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            s => parts.push(s),
        }
    }

    let sep = MAIN_SEPARATOR.to_string();
    Some(PathBuf::from(format!("{root}{}", parts.join(&sep))))
}

/// Splits an absolute path into its root (rendered with the host separator)
/// and the remainder. Returns `None` for relative paths.
fn split_root(path: &str) -> Option<(String, &str)> {
    let is_sep = |c: char| c == '\\' || c == '/';
    let mut chars = path.chars();
    let first = chars.next()?;
    let second = chars.next();

    // UNC: \\server\share
    if is_sep(first) && second.is_some_and(is_sep) {
        return Some((format!("{MAIN_SEPARATOR}{MAIN_SEPARATOR}"), &path[2..]));
    }
    if is_sep(first) {
        return Some((MAIN_SEPARATOR.to_string(), &path[1..]));
    }
    // Drive letter: c:\ or bare c:
    if first.is_ascii_alphabetic() && second == Some(':') {
        let rest = &path[2..];
        if rest.is_empty() || rest.starts_with(is_sep) {
            return Some((format!("{}{MAIN_SEPARATOR}", &path[..2]), rest));
        }
    }
    None
}
