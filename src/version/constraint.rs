//! Version constraints and tag candidates.
//!
//! A requested version such as `>=3.6`, `==1.2.3-wheezy` or `latest` is
//! split into an operator, a dotted numeric part and a trailing suffix.
//! Available tags are split the same way. Anything without a leading
//! dotted-digit run is opaque and can only be matched literally.

use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

/// Whitelist value meaning "no particular version".
pub const VERSIONLESS: &str = "versionless";

/// Tag used for versionless requests.
pub const LATEST_TAG: &str = "latest";

fn constraint_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<op>==|=|>=|>)?(?P<num>\d+(?:\.\d+)*)(?P<suffix>.*)$")
            .expect("constraint regex is valid")
    })
}

fn candidate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<num>\d+(?:\.\d+)*)(?P<suffix>.*)$").expect("candidate regex is valid")
    })
}

/// Comparison requested by a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Gt,
    Gte,
}

impl Operator {
    /// Whether an ordering between candidate and constraint satisfies this operator.
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Gte => ordering != Ordering::Less,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Gt => ">",
            Operator::Gte => ">=",
        }
    }
}

/// Dotted numeric run, kept both as written and as integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericPart {
    text: String,
    segments: Vec<u64>,
}

impl NumericPart {
    /// Parse a dotted digit run. Returns `None` if a segment overflows.
    pub fn parse(text: &str) -> Option<Self> {
        let segments = text
            .split('.')
            .map(|s| s.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            text: text.to_string(),
            segments,
        })
    }

    /// The digits as written.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Segments with trailing zero segments removed (`1.2.0` is `1.2`).
    pub fn normalized(&self) -> &[u64] {
        let mut end = self.segments.len();
        while end > 0 && self.segments[end - 1] == 0 {
            end -= 1;
        }
        &self.segments[..end]
    }

    /// Compare by normalised segments.
    pub fn compare(&self, other: &NumericPart) -> Ordering {
        self.normalized().cmp(other.normalized())
    }
}

/// A parsed version request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    pub operator: Operator,
    pub numeric: Option<NumericPart>,
    pub suffix: Option<String>,
}

impl VersionConstraint {
    /// Parse a requested version string.
    ///
    /// The operator defaults to `Eq`. `versionless` becomes the literal
    /// `latest`. Strings without a numeric run become literal constraints.
    pub fn parse(requested: &str) -> Self {
        let requested = requested.trim();
        if requested.is_empty() || requested == VERSIONLESS {
            return Self::literal(LATEST_TAG);
        }

        let Some(caps) = constraint_regex().captures(requested) else {
            let bare = requested.trim_start_matches(['=', '>']);
            return Self::literal(bare);
        };

        let operator = match caps.name("op").map(|m| m.as_str()) {
            Some(">=") => Operator::Gte,
            Some(">") => Operator::Gt,
            _ => Operator::Eq,
        };
        let num = &caps["num"];
        let suffix = non_empty(&caps["suffix"]);

        match NumericPart::parse(num) {
            Some(numeric) => Self {
                operator,
                numeric: Some(numeric),
                suffix,
            },
            None => Self::literal(&format!("{}{}", num, suffix.unwrap_or_default())),
        }
    }

    /// A constraint that only matches the exact tag.
    pub fn literal(tag: &str) -> Self {
        Self {
            operator: Operator::Eq,
            numeric: None,
            suffix: Some(tag.to_string()),
        }
    }

    /// Numeric part and suffix joined back together.
    pub fn concat(&self) -> String {
        let mut out = self
            .numeric
            .as_ref()
            .map(|n| n.text().to_string())
            .unwrap_or_default();
        if let Some(suffix) = &self.suffix {
            out.push_str(suffix);
        }
        out
    }

    /// Whether this constraint names exactly one tag.
    pub fn is_exact(&self) -> bool {
        self.operator == Operator::Eq
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.numeric.is_none() {
            return f.write_str(&self.concat());
        }
        write!(f, "{}{}", self.operator.symbol(), self.concat())
    }
}

/// An available tag split into numeric part and suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCandidate {
    pub tag: String,
    pub numeric: Option<NumericPart>,
    pub suffix: Option<String>,
}

impl VersionCandidate {
    /// Split a tag on its leading dotted-digit run.
    pub fn parse(tag: &str) -> Self {
        let split = candidate_regex()
            .captures(tag)
            .and_then(|caps| NumericPart::parse(&caps["num"]).map(|n| (n, non_empty(&caps["suffix"]))));

        match split {
            Some((numeric, suffix)) => Self {
                tag: tag.to_string(),
                numeric: Some(numeric),
                suffix,
            },
            None => Self {
                tag: tag.to_string(),
                numeric: None,
                suffix: Some(tag.to_string()),
            },
        }
    }

    /// Numeric part and suffix joined back together; always the tag itself.
    pub fn concat(&self) -> &str {
        &self.tag
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
