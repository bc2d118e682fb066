//! Value types for preference entries

use std::collections::HashSet;
use std::fmt;

/// A typed preference value
///
/// Doubles have no variant of their own: they live in `Long` as their raw
/// IEEE-754 bit pattern (see [`PrefValue::from_double`]).
#[derive(Debug, Clone, PartialEq)]
pub enum PrefValue {
    /// Boolean flag
    Bool(bool),

    /// 32-bit float
    Float(f32),

    /// 32-bit integer
    Int(i32),

    /// 64-bit integer (also carries doubles)
    Long(i64),

    /// UTF-8 string
    String(String),

    /// Set of unique strings (unordered)
    StringSet(HashSet<String>),
}

impl PrefValue {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        PrefValue::String(s.into())
    }

    /// Create a string set from any iterator of strings
    pub fn string_set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PrefValue::StringSet(items.into_iter().map(Into::into).collect())
    }

    /// Store a double as the long holding its raw bits
    pub fn from_double(value: f64) -> Self {
        PrefValue::Long(value.to_bits() as i64)
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            PrefValue::Bool(_) => "bool",
            PrefValue::Float(_) => "float",
            PrefValue::Int(_) => "int",
            PrefValue::Long(_) => "long",
            PrefValue::String(_) => "string",
            PrefValue::StringSet(_) => "string set",
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrefValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_float(&self) -> Option<f32> {
        match self {
            PrefValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Try to get as int
    pub fn as_int(&self) -> Option<i32> {
        match self {
            PrefValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as long
    pub fn as_long(&self) -> Option<i64> {
        match self {
            PrefValue::Long(l) => Some(*l),
            _ => None,
        }
    }

    /// Reinterpret a long as the double whose bits it holds
    pub fn as_double(&self) -> Option<f64> {
        self.as_long().map(|bits| f64::from_bits(bits as u64))
    }

    /// Try to get as string reference
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrefValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as string set reference
    pub fn as_string_set(&self) -> Option<&HashSet<String>> {
        match self {
            PrefValue::StringSet(set) => Some(set),
            _ => None,
        }
    }

    /// Calculate approximate memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        match self {
            PrefValue::Bool(_) => std::mem::size_of::<bool>(),
            PrefValue::Float(_) => std::mem::size_of::<f32>(),
            PrefValue::Int(_) => std::mem::size_of::<i32>(),
            PrefValue::Long(_) => std::mem::size_of::<i64>(),
            PrefValue::String(s) => s.len(),
            PrefValue::StringSet(set) => {
                let items_size: usize = set.iter().map(|s| s.len()).sum();
                items_size + std::mem::size_of::<HashSet<String>>()
            }
        }
    }
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrefValue::Bool(b) => write!(f, "{}", b),
            PrefValue::Float(v) => write!(f, "{}", v),
            PrefValue::Int(i) => write!(f, "{}", i),
            PrefValue::Long(l) => write!(f, "{}", l),
            PrefValue::String(s) => write!(f, "{:?}", s),
            PrefValue::StringSet(set) => {
                // Sorted so the output is stable
                let mut items: Vec<&String> = set.iter().collect();
                items.sort();
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", item)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for PrefValue {
    fn from(b: bool) -> Self {
        PrefValue::Bool(b)
    }
}

impl From<f32> for PrefValue {
    fn from(f: f32) -> Self {
        PrefValue::Float(f)
    }
}

impl From<i32> for PrefValue {
    fn from(i: i32) -> Self {
        PrefValue::Int(i)
    }
}

impl From<i64> for PrefValue {
    fn from(l: i64) -> Self {
        PrefValue::Long(l)
    }
}

impl From<&str> for PrefValue {
    fn from(s: &str) -> Self {
        PrefValue::String(s.to_string())
    }
}

impl From<String> for PrefValue {
    fn from(s: String) -> Self {
        PrefValue::String(s)
    }
}

impl From<HashSet<String>> for PrefValue {
    fn from(set: HashSet<String>) -> Self {
        PrefValue::StringSet(set)
    }
}
