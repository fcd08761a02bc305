use crate::domain::{Member, Normalizer};
use serde::{Deserialize, Serialize};

/// Body of a `members/add` request. Every entry goes into one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersPayload {
    pub members: Vec<Member>,
}

impl MembersPayload {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    pub skip_blank_lines: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltBatch {
    pub payload: MembersPayload,
    pub skipped_blank: usize,
}

/// Splits file contents into one raw entry per line. `\n`, `\r\n` and a
/// lone `\r` all end a line; a trailing terminator does not add an entry.
pub fn read_entries(contents: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut rest = contents;
    while !rest.is_empty() {
        match rest.find(|ch: char| ch == '\n' || ch == '\r') {
            Some(idx) => {
                entries.push(&rest[..idx]);
                let terminator = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + terminator..];
            }
            None => {
                entries.push(rest);
                break;
            }
        }
    }
    entries
}

pub fn build_payload<'a, I>(
    normalizer: &Normalizer,
    entries: I,
    options: BatchOptions,
) -> BuiltBatch
where
    I: IntoIterator<Item = &'a str>,
{
    let mut members = Vec::new();
    let mut skipped_blank = 0;

    for entry in entries {
        if options.skip_blank_lines && entry.trim().is_empty() {
            skipped_blank += 1;
            continue;
        }
        members.push(Member::from_phone(normalizer.normalize(entry)));
    }

    BuiltBatch {
        payload: MembersPayload { members },
        skipped_blank,
    }
}
