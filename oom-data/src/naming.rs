use crate::dialect::Dialect;
use crate::query::QueryError;

/// Case applied to declared table or column names before they reach SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseFolding {
    #[default]
    AsIs,
    Lowercase,
    Uppercase,
}

impl CaseFolding {
    pub fn apply(self, name: &str) -> String {
        match self {
            CaseFolding::AsIs => name.to_string(),
            CaseFolding::Lowercase => name.to_ascii_lowercase(),
            CaseFolding::Uppercase => name.to_ascii_uppercase(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierPolicy {
    /// Validate identifiers against a conservative pattern.
    #[default]
    Validate,
    /// Validate and quote identifiers using the dialect quoting style.
    Quote,
}

/// How declared entity names become SQL identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NamingStrategy {
    tables: CaseFolding,
    columns: CaseFolding,
    identifiers: IdentifierPolicy,
}

impl NamingStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tables(mut self, case: CaseFolding) -> Self {
        self.tables = case;
        self
    }

    pub fn columns(mut self, case: CaseFolding) -> Self {
        self.columns = case;
        self
    }

    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifiers = policy;
        self
    }

    /// Fold both table and column names to lowercase (or stop doing so).
    pub fn lowercase(self, on: bool) -> Self {
        let case = if on {
            CaseFolding::Lowercase
        } else {
            CaseFolding::AsIs
        };
        self.tables(case).columns(case)
    }

    pub fn table_case(&self) -> CaseFolding {
        self.tables
    }

    pub fn column_case(&self) -> CaseFolding {
        self.columns
    }

    pub fn policy(&self) -> IdentifierPolicy {
        self.identifiers
    }

    pub fn table_name(&self, declared: &str) -> String {
        self.tables.apply(declared)
    }

    pub fn column_name(&self, declared: &str) -> String {
        self.columns.apply(declared)
    }

    /// Render a resolved identifier for `dialect`, validating it first.
    pub fn render(
        &self,
        ident: &str,
        dialect: Dialect,
        kind: &'static str,
    ) -> Result<String, QueryError> {
        format_identifier_checked(ident, dialect, self.identifiers, false, kind)
    }
}

pub(crate) fn format_identifier_checked(
    ident: &str,
    dialect: Dialect,
    policy: IdentifierPolicy,
    allow_star: bool,
    kind: &'static str,
) -> Result<String, QueryError> {
    if !is_valid_identifier(ident, allow_star) {
        return Err(QueryError::InvalidIdentifier {
            kind,
            ident: ident.to_string(),
        });
    }
    match policy {
        IdentifierPolicy::Quote => Ok(quote_identifier(ident, dialect, allow_star)),
        IdentifierPolicy::Validate => Ok(ident.to_string()),
    }
}

pub(crate) fn is_valid_identifier(ident: &str, allow_star: bool) -> bool {
    if ident.is_empty() {
        return false;
    }
    let parts: Vec<&str> = ident.split('.').collect();
    for (idx, part) in parts.iter().enumerate() {
        if allow_star && *part == "*" {
            return idx + 1 == parts.len();
        }
        if !is_valid_segment(part) {
            return false;
        }
    }
    true
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_identifier(ident: &str, dialect: Dialect, allow_star: bool) -> String {
    let quote = dialect.quote_char();
    let parts: Vec<&str> = ident.split('.').collect();
    let last_idx = parts.len().saturating_sub(1);
    parts
        .into_iter()
        .enumerate()
        .map(|(idx, part)| {
            if allow_star && part == "*" && idx == last_idx {
                part.to_string()
            } else {
                format!("{quote}{part}{quote}")
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}
