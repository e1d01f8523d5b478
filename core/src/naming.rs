use crate::config::NamingConfig;

const SEPARATOR: char = '_';

/// Turns table and column names into exported Go identifiers.
#[derive(Debug, Clone, Copy)]
pub struct NameTransform<'a> {
    prefix: &'a str,
    uc_first_only: bool,
}

impl<'a> NameTransform<'a> {
    pub fn new(prefix: &'a str, config: &NamingConfig) -> Self {
        Self {
            prefix,
            uc_first_only: config.uc_first_only,
        }
    }

    /// Removes one leading occurrence of the configured prefix, if present.
    pub fn strip_prefix<'s>(&self, raw: &'s str) -> &'s str {
        if self.prefix.is_empty() {
            return raw;
        }
        raw.strip_prefix(self.prefix).unwrap_or(raw)
    }

    /// `t_user_name` with prefix `t_` becomes `UserName`. Empty in, empty out.
    pub fn transform(&self, raw: &str) -> String {
        let stripped = self.strip_prefix(raw);
        let mut out = String::with_capacity(stripped.len());
        for segment in stripped.split(SEPARATOR) {
            let mut chars = segment.chars();
            let Some(first) = chars.next() else {
                continue;
            };
            out.extend(first.to_uppercase());
            if self.uc_first_only {
                out.extend(chars.flat_map(char::to_lowercase));
            } else {
                out.push_str(chars.as_str());
            }
        }
        out
    }
}
