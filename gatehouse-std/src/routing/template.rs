//! Path templates: compile once, test many candidate paths.
//!
//! Template syntax:
//!
//! - `:name` - one or more characters up to the next `/`
//! - `*name` - any characters, `/` included
//! - everything else is literal, regex metacharacters included
//!
//! A marker not followed by a name (`[A-Za-z0-9_]+`) is literal too.

use gatehouse_core::RouteError;
use regex::{Regex, RegexBuilder};

/// Maximum size for a compiled template (in bytes).
const MAX_TEMPLATE_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// Options applied when compiling a template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Compare literal parts without regard to ASCII/Unicode case.
    pub case_insensitive: bool,
}

impl MatchOptions {
    /// Case-insensitive matching.
    pub const fn case_insensitive() -> Self {
        Self {
            case_insensitive: true,
        }
    }
}

/// Parameters extracted from a matched path, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`. A name already bound keeps its position and takes the
    /// new value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a bound value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct PathTemplate {
    template: String,
    regex: Regex,
    param_names: Vec<String>,
    options: MatchOptions,
}

impl PathTemplate {
    /// Compile a template.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidTemplate`] when the resulting pattern
    /// exceeds the size limit.
    pub fn compile(template: &str, options: MatchOptions) -> Result<Self, RouteError> {
        let (pattern, param_names) = Self::compile_pattern(template);

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(options.case_insensitive)
            .size_limit(MAX_TEMPLATE_REGEX_SIZE)
            .build()
            .map_err(|source| RouteError::InvalidTemplate {
                template: template.to_string(),
                source,
            })?;

        Ok(Self {
            template: template.to_string(),
            regex,
            param_names,
            options,
        })
    }

    /// Translate a template into an anchored pattern and its parameter names.
    fn compile_pattern(template: &str) -> (String, Vec<String>) {
        let mut pattern = String::with_capacity(template.len() + 16);
        let mut param_names = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        pattern.push('^');
        while let Some(c) = chars.next() {
            if c != ':' && c != '*' {
                literal.push(c);
                continue;
            }

            let mut name = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_ascii_alphanumeric() || next == '_' {
                    name.push(next);
                    chars.next();
                } else {
                    break;
                }
            }

            if name.is_empty() {
                literal.push(c);
                continue;
            }

            pattern.push_str(&regex::escape(&literal));
            literal.clear();
            pattern.push_str(if c == ':' { "([^/]+)" } else { "(.*)" });
            param_names.push(name);
        }
        pattern.push_str(&regex::escape(&literal));
        pattern.push('$');

        (pattern, param_names)
    }

    /// Test a candidate path. Returns the bound parameters on a full match.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let caps = self.regex.captures(path)?;
        let mut params = Params::new();
        for (index, name) in self.param_names.iter().enumerate() {
            let value = caps.get(index + 1).map_or("", |m| m.as_str());
            params.insert(name.as_str(), value);
        }
        Some(params)
    }

    /// Whether the candidate path matches, without extracting parameters.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Parameter names in declaration order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// The options the template was compiled with.
    pub fn options(&self) -> MatchOptions {
        self.options
    }
}

impl PartialEq for PathTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template && self.options == other.options
    }
}

impl Eq for PathTemplate {}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.template)
    }
}

/// Test `candidate` against `template` in one step.
///
/// Returns `None` when the template does not fully match, or when it cannot
/// be compiled. Prefer [`PathTemplate::compile`] when the same template is
/// tested repeatedly.
pub fn match_path(candidate: &str, template: &str, options: MatchOptions) -> Option<Params> {
    match PathTemplate::compile(template, options) {
        Ok(compiled) => compiled.matches(candidate),
        Err(err) => {
            tracing::debug!(template, error = %err, "Route template rejected");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(template: &str) -> PathTemplate {
        PathTemplate::compile(template, MatchOptions::default()).unwrap()
    }

    #[test]
    fn test_named_param() {
        let params = match_path("/users/42", "/users/:id", MatchOptions::default()).unwrap();
        assert_eq!(params.get("id"), Some("42"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_anchored_at_both_ends() {
        let template = exact("/users/:id");
        assert!(template.matches("/users/42/edit").is_none());
        assert!(template.matches("/api/users/42").is_none());
        assert!(template.matches("/users/").is_none());
    }

    #[test]
    fn test_wildcard_spans_separators() {
        let params = match_path("/files/a/b.txt", "/files/*rest", MatchOptions::default()).unwrap();
        assert_eq!(params.get("rest"), Some("a/b.txt"));
    }

    #[test]
    fn test_wildcard_may_be_empty() {
        let params = exact("/files/*rest").matches("/files/").unwrap();
        assert_eq!(params.get("rest"), Some(""));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let template = exact("/a.b");
        assert!(template.is_match("/a.b"));
        assert!(!template.is_match("/axb"));

        let template = exact("/q(1)+[x]{2}?^$|\\");
        assert!(template.is_match("/q(1)+[x]{2}?^$|\\"));
        assert!(!template.is_match("/q1x"));
    }

    #[test]
    fn test_params_in_declaration_order() {
        let params = exact("/teams/:team/members/:member/*tail")
            .matches("/teams/red/members/7/notes/today")
            .unwrap();
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(
            pairs,
            vec![("team", "red"), ("member", "7"), ("tail", "notes/today")]
        );
    }

    #[test]
    fn test_repeated_name_takes_last_value() {
        let params = exact("/:id/:id").matches("/a/b").unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("id"), Some("b"));
    }

    #[test]
    fn test_bare_markers_are_literal() {
        let template = exact("/price:/*");
        assert!(template.is_match("/price:/*"));
        assert!(!template.is_match("/price:/anything"));
        assert!(template.param_names().is_empty());
    }

    #[test]
    fn test_case_insensitive_option() {
        let strict = exact("/Users/:id");
        assert!(!strict.is_match("/users/1"));

        let relaxed = PathTemplate::compile("/Users/:id", MatchOptions::case_insensitive()).unwrap();
        let params = relaxed.matches("/USERS/Ab").unwrap();
        assert_eq!(params.get("id"), Some("Ab"));
    }

    #[test]
    fn test_named_param_needs_one_char() {
        assert!(exact("/users/:id/edit").matches("/users//edit").is_none());
    }

    #[test]
    fn test_root_template() {
        let root = exact("/");
        assert!(root.matches("/").unwrap().is_empty());
        assert!(!root.is_match("/users"));
    }

    #[test]
    fn test_display_and_equality() {
        assert_eq!(exact("/a/:b").to_string(), "/a/:b");
        assert_eq!(exact("/a/:b"), exact("/a/:b"));
        assert_ne!(
            exact("/a/:b"),
            PathTemplate::compile("/a/:b", MatchOptions::case_insensitive()).unwrap()
        );
    }
}
