//! Natural Ordering
//!
//! Orders strings the way a human would: runs of ASCII digits compare as
//! integers, so `name2` sorts before `name10`.
//!
//! A string is viewed as alternating text and digit chunks that always starts
//! with a (possibly empty) text chunk. Chunks are compared pairwise; a string
//! that runs out first is smaller. Strings whose chunks compare equal
//! (`a01` vs `a1`) fall back to plain byte order so the order stays total.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Text(&'a str),
    Digits(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let bytes = s.as_bytes();
    let mut start = 0;
    let mut in_digits = false;

    for (i, b) in bytes.iter().enumerate() {
        let is_digit = b.is_ascii_digit();
        if is_digit != in_digits {
            let piece = &s[start..i];
            out.push(if in_digits {
                Chunk::Digits(piece)
            } else {
                Chunk::Text(piece)
            });
            start = i;
            in_digits = is_digit;
        }
    }

    let tail = &s[start..];
    if in_digits {
        out.push(Chunk::Digits(tail));
    } else if !tail.is_empty() || out.is_empty() {
        out.push(Chunk::Text(tail));
    }
    out
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn cmp_chunks(a: &Chunk<'_>, b: &Chunk<'_>) -> Ordering {
    match (a, b) {
        (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
        (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
        // Chunks alternate from the same starting kind, so mixed pairs
        // only show up defensively; digits sort first like '0' < 'a'.
        (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
        (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
    }
}

/// Compare two strings in natural order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ca = chunks(a);
    let cb = chunks(b);

    for (x, y) in ca.iter().zip(cb.iter()) {
        let ord = cmp_chunks(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }

    ca.len().cmp(&cb.len()).then_with(|| a.cmp(b))
}

/// Compare `(location, name)` pairs: location first, then name.
pub fn natural_cmp_pair(a: (&str, &str), b: (&str, &str)) -> Ordering {
    natural_cmp(a.0, b.0).then_with(|| natural_cmp(a.1, b.1))
}

/// Return the items sorted in natural order.
pub fn natural_sorted<I, S>(items: I) -> Vec<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<S> = items.into_iter().collect();
    out.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
    out
}
