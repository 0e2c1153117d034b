use std::fmt;

/// A typed pointer to another record: `(kind, id)` plus the label the
/// exporter printed in front of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reference {
    label: String,
    kind: String,
    id: u32,
}

impl Reference {
    pub fn new(label: impl Into<String>, kind: impl Into<String>, id: u32) -> Self {
        Self {
            label: label.into(),
            kind: kind.into(),
            id,
        }
    }

    /// Parses `<label>: <id> <Kind>`. The two tokens after the last `:` may
    /// come in either order; the one that is an integer is the id. Anything
    /// else is not a reference.
    pub fn parse(text: &str) -> Option<Self> {
        let (label, target) = text.rsplit_once(':')?;
        let mut tokens = target.split_whitespace();
        let (first, second) = (tokens.next()?, tokens.next()?);
        if tokens.next().is_some() {
            return None;
        }

        let (id, kind) = match (first.parse::<u32>(), second.parse::<u32>()) {
            (Ok(id), Err(_)) => (id, second),
            (Err(_), Ok(id)) => (id, first),
            _ => return None,
        };
        if !is_identifier(kind) {
            return None;
        }

        Some(Self::new(label.trim(), kind, id))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Whether the label or target kind contains `token`.
    pub fn mentions(&self, token: &str) -> bool {
        self.label.contains(token) || self.kind.contains(token)
    }
}

fn is_identifier(s: &str) -> bool {
    s.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.label, self.id, self.kind)
    }
}
