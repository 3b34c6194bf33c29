//! Ordered MIME header set with line folding.
//!
//! Headers keep their insertion order, which is part of the wire contract:
//! a part always renders `Content-Type` before `Content-Transfer-Encoding`
//! before `Content-Disposition`. Lines longer than the set's [`LineLength`]
//! are folded at whitespace (RFC 5322 section 2.2.3); a line is never split
//! inside a word, so a single oversized parameter stays on one line.

use crate::protocol::LineLength;
use std::fmt;
use std::fmt::Write;

/// A single header field, optionally carrying `; key=value` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    value: String,
    params: Vec<(String, String)>,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into(), params: Vec::new() }
    }

    /// Appends a parameter, replacing an existing one with the same name
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_param(name, value);
        self
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(param) => param.1 = value,
            None => self.params.push((name, value)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Renders the header as one logical line, folded at `line_length`.
    ///
    /// The returned string carries no trailing CRLF.
    pub fn render(&self, line_length: LineLength) -> String {
        fold(&self.atoms(), line_length)
    }

    /// Renders the value and its parameters, without the header name, on one line
    pub fn render_value(&self) -> String {
        let line = self.render(LineLength::Unbounded);
        line[self.name.len() + 2..].to_owned()
    }

    /// Splits the unfolded line into the words a fold may separate; joining
    /// them with single spaces gives back the unfolded line.
    fn atoms(&self) -> Vec<String> {
        let mut atoms = Vec::with_capacity(2 + self.params.len());
        let mut words = self.value.split(' ');
        let first = words.next().unwrap_or_default();
        atoms.push(format!("{}: {}", self.name, first));
        atoms.extend(words.map(str::to_owned));

        let form_data = self.is_form_data_disposition();
        for (name, value) in &self.params {
            if let Some(last) = atoms.last_mut() {
                last.push(';');
            }
            atoms.push(encode_param(name, value, form_data));
        }
        atoms
    }

    fn is_form_data_disposition(&self) -> bool {
        self.name.eq_ignore_ascii_case("content-disposition") && self.value.eq_ignore_ascii_case("form-data")
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(LineLength::Unbounded))
    }
}

/// Ordered collection of [`Header`]s sharing one line length policy.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderSet {
    headers: Vec<Header>,
    max_line_length: LineLength,
}

impl HeaderSet {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_max_line_length(line_length: LineLength) -> Self {
        Self { headers: Vec::new(), max_line_length: line_length }
    }

    pub fn max_line_length(&self) -> LineLength {
        self.max_line_length
    }

    pub fn set_max_line_length(&mut self, line_length: LineLength) {
        self.max_line_length = line_length;
    }

    pub fn add(&mut self, header: Header) -> &mut Self {
        self.headers.push(header);
        self
    }

    pub fn add_text(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.add(Header::new(name, value))
    }

    pub fn add_parameterized<I, K, V>(&mut self, name: impl Into<String>, value: impl Into<String>, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let header = params.into_iter().fold(Header::new(name, value), |header, (k, v)| header.with_param(k, v));
        self.add(header)
    }

    /// Returns the first header with the given name, compared case-insensitively
    pub fn get(&self, name: &str) -> Option<&Header> {
        self.headers.iter().find(|h| h.name.eq_ignore_ascii_case(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Header> {
        self.headers.iter_mut().find(|h| h.name.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes every header with the given name
    pub fn remove(&mut self, name: &str) {
        self.headers.retain(|h| !h.name.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.headers.iter()
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Renders every header, folded at the set's line length, one entry per header.
    pub fn to_lines(&self) -> Vec<String> {
        self.headers.iter().map(|h| h.render(self.max_line_length)).collect()
    }
}

impl fmt::Display for HeaderSet {
    /// Writes every header followed by CRLF, without the terminating blank line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.to_lines() {
            f.write_str(&line)?;
            f.write_str("\r\n")?;
        }
        Ok(())
    }
}

fn fold(atoms: &[String], line_length: LineLength) -> String {
    let mut out = String::with_capacity(atoms.iter().map(|a| a.len() + 3).sum());
    let mut column = 0;
    for (i, atom) in atoms.iter().enumerate() {
        if i == 0 {
            out.push_str(atom);
            column = atom.len();
            continue;
        }

        match line_length.limit() {
            Some(limit) if !atom.is_empty() && column + 1 + atom.len() > limit => {
                out.push_str("\r\n ");
                column = 1 + atom.len();
            }
            _ => {
                out.push(' ');
                column += 1 + atom.len();
            }
        }
        out.push_str(atom);
    }
    out
}

/// Encodes a single `key=value` parameter.
///
/// `name` and `filename` of a `form-data` disposition follow RFC 7578 section 4.2:
/// always quoted, raw UTF-8 allowed, quotes and line breaks percent-encoded.
/// Everything else follows RFC 2045: bare token, quoted-string, or the RFC 2231
/// extended form for values that are not printable ASCII.
fn encode_param(name: &str, value: &str, form_data: bool) -> String {
    if form_data && (name.eq_ignore_ascii_case("name") || name.eq_ignore_ascii_case("filename")) {
        let escaped = value.replace('"', "%22").replace('\r', "%0D").replace('\n', "%0A");
        return format!("{name}=\"{escaped}\"");
    }

    if !value.is_empty() && value.bytes().all(is_token_char) {
        return format!("{name}={value}");
    }

    if value.bytes().all(|b| b == b' ' || b == b'\t' || b.is_ascii_graphic()) {
        let mut quoted = String::with_capacity(value.len() + 2);
        quoted.push('"');
        for c in value.chars() {
            if c == '"' || c == '\\' {
                quoted.push('\\');
            }
            quoted.push(c);
        }
        quoted.push('"');
        return format!("{name}={quoted}");
    }

    let mut encoded = String::with_capacity(value.len() * 3);
    for b in value.bytes() {
        if is_attr_char(b) {
            encoded.push(char::from(b));
        } else {
            // writing into a String never fails
            let _ = write!(encoded, "%{b:02X}");
        }
    }
    format!("{name}*=utf-8''{encoded}")
}

/// RFC 2045 `token` characters
fn is_token_char(b: u8) -> bool {
    b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?=".contains(&b)
}

/// RFC 2231 `attribute-char`
fn is_attr_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&b)
}
