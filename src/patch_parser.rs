//! Parser for the textual patch format
//!
//! A patch is a stream of semicolon-terminated, whitespace-tokenized records.
//! Records may wrap across lines; a `\;` escapes a literal semicolon inside a
//! record. Each record is parsed into a [`Record`]; unknown record kinds log a
//! warning and are skipped without disturbing object indexing (the builder
//! only assigns indices to records that declare objects).

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{map, map_res, opt, recognize, rest},
    sequence::{pair, preceded, tuple},
    IResult,
};
use tracing::warn;

use crate::message::Atom;

/// One parsed patch record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// `#N canvas <x> <y> <w> <h> ...` — opens the root graph or, nested, an
    /// inline subpatch.
    Canvas,
    /// `#X obj <x> <y> <label> <arg>*`
    Object { label: String, args: Vec<Atom> },
    /// `#X msg <x> <y> <content>*`
    MessageBox { content: Vec<Atom> },
    /// `#X connect <from> <outlet> <to> <inlet>`
    Connect {
        from: usize,
        outlet: usize,
        to: usize,
        inlet: usize,
    },
    /// `#X floatatom ...` — a number box.
    FloatAtom,
    /// `#X symbolatom ...` — accepted, inert.
    SymbolAtom,
    /// `#X restore <x> <y> ...` — closes the current subpatch.
    Restore,
    /// `#X text ...` — a comment, inert.
    Text,
    /// `#X declare ...` — accepted, no runtime effect.
    Declare,
}

/// Split the raw patch text into records, honouring `\;` escapes. The
/// terminating semicolon is dropped and wrapped lines are rejoined.
fn split_records(text: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for ch in text.chars() {
        if escaped {
            current.push('\\');
            current.push(ch);
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == ';' {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                records.push(trimmed.to_string());
            }
            current.clear();
        } else {
            current.push(ch);
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        records.push(trimmed.to_string());
    }
    records
}

/// Parse one whitespace token into an atom. `$N` becomes a dollar reference
/// for later resolution; anything non-numeric is a symbol.
pub fn parse_atom(token: &str) -> Atom {
    if let Some(digits) = token.strip_prefix('$') {
        if let Ok(n) = digits.parse::<usize>() {
            return Atom::Dollar(n);
        }
    }
    if let Ok(value) = token.parse::<f32>() {
        return Atom::Float(value);
    }
    Atom::Symbol(unescape(token))
}

/// Parse a whitespace-separated atom list.
pub fn parse_atoms(text: &str) -> Vec<Atom> {
    text.split_whitespace().map(parse_atom).collect()
}

fn unescape(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(char('-')), digit1)), str::parse)(input)
}

fn index(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(input)
}

/// Two leading coordinate tokens, present on every visual record.
fn coordinates(input: &str) -> IResult<&str, (i64, i64)> {
    tuple((
        preceded(multispace0, integer),
        preceded(multispace1, integer),
    ))(input)
}

fn canvas_record(input: &str) -> IResult<&str, Record> {
    map(tuple((tag("#N"), multispace1, tag("canvas"), rest)), |_| {
        Record::Canvas
    })(input)
}

fn x_record<'a>(kind: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    map(
        tuple((tag("#X"), multispace1, tag(kind), rest)),
        |(_, _, _, tail): (_, _, _, &str)| tail,
    )
}

fn object_record(input: &str) -> IResult<&str, Record> {
    let (input, tail) = x_record("obj")(input)?;
    let (tail, _) = coordinates(tail)?;
    let mut tokens = tail.split_whitespace();
    let label = tokens.next().unwrap_or("").to_string();
    let args = tokens.map(parse_atom).collect();
    Ok((input, Record::Object { label, args }))
}

fn message_record(input: &str) -> IResult<&str, Record> {
    let (input, tail) = x_record("msg")(input)?;
    let (tail, _) = coordinates(tail)?;
    Ok((
        input,
        Record::MessageBox {
            content: parse_atoms(tail),
        },
    ))
}

fn connect_record(input: &str) -> IResult<&str, Record> {
    let (input, tail) = x_record("connect")(input)?;
    let (_, (from, outlet, to, inlet)) = tuple((
        preceded(multispace0, index),
        preceded(multispace1, index),
        preceded(multispace1, index),
        preceded(multispace1, index),
    ))(tail)?;
    Ok((
        input,
        Record::Connect {
            from,
            outlet,
            to,
            inlet,
        },
    ))
}

fn record(input: &str) -> IResult<&str, Record> {
    alt((
        canvas_record,
        object_record,
        message_record,
        connect_record,
        map(x_record("floatatom"), |_| Record::FloatAtom),
        map(x_record("symbolatom"), |_| Record::SymbolAtom),
        map(x_record("restore"), |_| Record::Restore),
        map(x_record("text"), |_| Record::Text),
        map(x_record("declare"), |_| Record::Declare),
    ))(input)
}

/// Parse patch text into records. Unknown record kinds are logged and
/// skipped.
pub fn parse_records(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    for raw in split_records(text) {
        match record(&raw) {
            Ok((_, rec)) => records.push(rec),
            Err(_) => warn!(record = raw.as_str(), "unrecognised patch record"),
        }
    }
    records
}
