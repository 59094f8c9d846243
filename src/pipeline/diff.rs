//! Line-based unified diff.
//!
//! The matcher finds the longest contiguous matching block, then recurses on
//! the unmatched regions either side of it (Ratcliff/Obershelp). The result
//! is the same hunk layout produced by the conventional `unified_diff`
//! tooling, so reports line up with reference output on the same inputs.
//!
//! For sequences of 200 lines or more, lines occurring in more than 1% of
//! `b` (plus one) are "popular" and are not used to seed matches; they can
//! still extend a match found elsewhere. This keeps long outputs full of
//! blank lines from collapsing into one giant match on whitespace.

use std::collections::HashMap;

/// What a span of the two sequences has in common.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Equal,
    Replace,
    Delete,
    Insert,
}

/// `a[i1..i2]` relates to `b[j1..j2]` as described by `tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub tag: Tag,
    pub i1: usize,
    pub i2: usize,
    pub j1: usize,
    pub j2: usize,
}

impl Opcode {
    fn new(tag: Tag, i1: usize, i2: usize, j1: usize, j2: usize) -> Self {
        Self { tag, i1, i2, j1, j2 }
    }
}

/// `a[a_start..a_start + len] == b[b_start..b_start + len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

/// Compares two line sequences.
pub struct SequenceMatcher<'a, T: AsRef<str>> {
    a: &'a [T],
    b: &'a [T],
    b2j: HashMap<&'a str, Vec<usize>>,
}

const AUTOJUNK_MIN_LEN: usize = 200;

impl<'a, T: AsRef<str>> SequenceMatcher<'a, T> {
    pub fn new(a: &'a [T], b: &'a [T]) -> Self {
        let mut b2j: HashMap<&'a str, Vec<usize>> = HashMap::new();
        for (j, line) in b.iter().enumerate() {
            b2j.entry(line.as_ref()).or_default().push(j);
        }

        if b.len() >= AUTOJUNK_MIN_LEN {
            let ntest = b.len() / 100 + 1;
            b2j.retain(|_, idxs| idxs.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    fn eq(&self, i: usize, j: usize) -> bool {
        self.a[i].as_ref() == self.b[j].as_ref()
    }

    /// Longest matching block in `a[alo..ahi]` × `b[blo..bhi]`.
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    pub fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);

        // j2len[j] = length of the longest match ending at a[i-1], b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut new_j2len = HashMap::new();
            if let Some(js) = self.b2j.get(self.a[i].as_ref()) {
                for &j in js {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    new_j2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // Extend over popular lines, which never seed a match.
        while besti > alo && bestj > blo && self.eq(besti - 1, bestj - 1) {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.eq(besti + bestsize, bestj + bestsize)
        {
            bestsize += 1;
        }

        Match {
            a_start: besti,
            b_start: bestj,
            len: bestsize,
        }
    }

    /// All matching blocks in order, adjacent blocks merged, terminated by a
    /// zero-length sentinel at `(a.len(), b.len())`.
    pub fn matching_blocks(&self) -> Vec<Match> {
        let (la, lb) = (self.a.len(), self.b.len());
        let mut queue = vec![(0, la, 0, lb)];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let m = self.find_longest_match(alo, ahi, blo, bhi);
            if m.len > 0 {
                blocks.push(m);
                if alo < m.a_start && blo < m.b_start {
                    queue.push((alo, m.a_start, blo, m.b_start));
                }
                if m.a_start + m.len < ahi && m.b_start + m.len < bhi {
                    queue.push((m.a_start + m.len, ahi, m.b_start + m.len, bhi));
                }
            }
        }
        blocks.sort();

        let mut merged: Vec<Match> = Vec::with_capacity(blocks.len() + 1);
        for m in blocks {
            match merged.last_mut() {
                Some(last)
                    if last.a_start + last.len == m.a_start
                        && last.b_start + last.len == m.b_start =>
                {
                    last.len += m.len;
                }
                _ => merged.push(m),
            }
        }
        merged.push(Match {
            a_start: la,
            b_start: lb,
            len: 0,
        });
        merged
    }

    /// Edit script turning `a` into `b`.
    pub fn opcodes(&self) -> Vec<Opcode> {
        let (mut i, mut j) = (0, 0);
        let mut codes = Vec::new();
        for m in self.matching_blocks() {
            let tag = match (i < m.a_start, j < m.b_start) {
                (true, true) => Some(Tag::Replace),
                (true, false) => Some(Tag::Delete),
                (false, true) => Some(Tag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                codes.push(Opcode::new(tag, i, m.a_start, j, m.b_start));
            }
            i = m.a_start + m.len;
            j = m.b_start + m.len;
            if m.len > 0 {
                codes.push(Opcode::new(Tag::Equal, m.a_start, i, m.b_start, j));
            }
        }
        codes
    }

    /// Opcodes split into hunks with at most `context` equal lines around
    /// each change. Inputs with no changes yield no groups.
    pub fn grouped_opcodes(&self, context: usize) -> Vec<Vec<Opcode>> {
        let mut codes = self.opcodes();
        if codes.is_empty() {
            codes.push(Opcode::new(Tag::Equal, 0, 1, 0, 1));
        }

        // Trim leading and trailing equal runs down to the context size.
        if let Some(first) = codes.first_mut() {
            if first.tag == Tag::Equal {
                first.i1 = first.i1.max(first.i2.saturating_sub(context));
                first.j1 = first.j1.max(first.j2.saturating_sub(context));
            }
        }
        if let Some(last) = codes.last_mut() {
            if last.tag == Tag::Equal {
                last.i2 = last.i2.min(last.i1 + context);
                last.j2 = last.j2.min(last.j1 + context);
            }
        }

        let nn = context * 2;
        let mut groups = Vec::new();
        let mut group = Vec::new();
        for mut code in codes {
            if code.tag == Tag::Equal && code.i2 - code.i1 > nn {
                group.push(Opcode::new(
                    Tag::Equal,
                    code.i1,
                    code.i2.min(code.i1 + context),
                    code.j1,
                    code.j2.min(code.j1 + context),
                ));
                groups.push(std::mem::take(&mut group));
                code.i1 = code.i1.max(code.i2.saturating_sub(context));
                code.j1 = code.j1.max(code.j2.saturating_sub(context));
            }
            group.push(code);
        }
        if !(group.is_empty() || group.len() == 1 && group[0].tag == Tag::Equal) {
            groups.push(group);
        }
        groups
    }
}

/// `start,len` range notation of a hunk header (1-based; empty ranges
/// point at the line before).
fn format_range(start: usize, stop: usize) -> String {
    let len = stop - start;
    match len {
        1 => format!("{}", start + 1),
        0 => format!("{start},0"),
        _ => format!("{},{}", start + 1, len),
    }
}

/// Printed after a diff line whose source line has no terminator.
pub const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// Unified diff of two line sequences.
///
/// Input lines carry their `\n` terminators (see
/// [`crate::pipeline::text::split_lines`]) and are compared with them, so a
/// missing final newline is a change. Output lines have no terminators; an
/// unterminated source line is followed by [`NO_NEWLINE_MARKER`]. Identical
/// inputs produce an empty diff.
pub fn unified_diff<T: AsRef<str>>(
    a: &[T],
    b: &[T],
    from_label: &str,
    to_label: &str,
    context: usize,
) -> Vec<String> {
    let matcher = SequenceMatcher::new(a, b);
    let mut out = Vec::new();

    for (n, group) in matcher.grouped_opcodes(context).iter().enumerate() {
        if n == 0 {
            out.push(format!("--- {from_label}"));
            out.push(format!("+++ {to_label}"));
        }
        let (first, last) = match (group.first(), group.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => continue,
        };
        out.push(format!(
            "@@ -{} +{} @@",
            format_range(first.i1, last.i2),
            format_range(first.j1, last.j2)
        ));

        for code in group {
            let old = &a[code.i1..code.i2];
            let new = &b[code.j1..code.j2];
            match code.tag {
                Tag::Equal => push_lines(&mut out, ' ', old),
                Tag::Delete => push_lines(&mut out, '-', old),
                Tag::Insert => push_lines(&mut out, '+', new),
                Tag::Replace => {
                    push_lines(&mut out, '-', old);
                    push_lines(&mut out, '+', new);
                }
            }
        }
    }
    out
}

fn push_lines<T: AsRef<str>>(out: &mut Vec<String>, prefix: char, lines: &[T]) {
    for line in lines {
        let line = line.as_ref();
        match line.strip_suffix('\n') {
            Some(body) => out.push(format!("{prefix}{body}")),
            None => {
                out.push(format!("{prefix}{line}"));
                out.push(NO_NEWLINE_MARKER.to_string());
            }
        }
    }
}
