//! Query String Parsing
//!
//! Decodes `application/x-www-form-urlencoded` query strings, including
//! repeated keys and bracket notation (`tags[]=a`, `fields[0]=a`,
//! `filter[sys.id]=x`). Bracketed keys are grouped under their base name.

use url::form_urlencoded;

// == Query Param ==
/// One decoded `name=value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParam {
    /// Key with any bracket suffix removed
    pub name: String,
    /// Bracket segments in order; `a[]` gives `[""]`, `a[b][c]` gives `["b", "c"]`
    pub path: Vec<String>,
    /// Decoded value
    pub value: String,
}

impl QueryParam {
    /// True for a plain `name=value` pair without brackets.
    pub fn is_scalar(&self) -> bool {
        self.path.is_empty()
    }
}

// == Query Params ==
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: Vec<QueryParam>,
}

impl QueryParams {
    /// Parses a raw query string (without the leading `?`).
    pub fn parse(raw: &str) -> Self {
        let params = form_urlencoded::parse(raw.as_bytes())
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, value)| {
                let (name, path) = split_brackets(&key);
                QueryParam {
                    name,
                    path,
                    value: value.into_owned(),
                }
            })
            .collect();

        Self { params }
    }

    /// Every pair grouped under `name`, in query order.
    #[allow(dead_code)]
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a QueryParam> + 'a {
        self.params.iter().filter(move |p| p.name == name)
    }

    #[allow(dead_code)]
    pub fn contains(&self, name: &str) -> bool {
        self.get_all(name).next().is_some()
    }

    /// The value of `name` when it occurs exactly once, without brackets.
    ///
    /// Repeated or bracketed keys are multi-valued and yield `None`.
    pub fn single(&self, name: &str) -> Option<&str> {
        let mut matches = self.params.iter().filter(|p| p.name == name);
        match (matches.next(), matches.next()) {
            (Some(param), None) if param.is_scalar() => Some(param.value.as_str()),
            _ => None,
        }
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Splits `base[a][b]` into `("base", ["a", "b"])`.
///
/// Keys that start with a bracket or carry a malformed suffix are kept whole.
fn split_brackets(key: &str) -> (String, Vec<String>) {
    let Some(open) = key.find('[') else {
        return (key.to_string(), Vec::new());
    };
    if open == 0 {
        return (key.to_string(), Vec::new());
    }

    let (base, mut rest) = key.split_at(open);
    let mut path = Vec::new();
    while let Some(inner) = rest.strip_prefix('[') {
        let Some(close) = inner.find(']') else {
            return (key.to_string(), Vec::new());
        };
        path.push(inner[..close].to_string());
        rest = &inner[close + 1..];
    }

    if !rest.is_empty() {
        return (key.to_string(), Vec::new());
    }
    (base.to_string(), path)
}
