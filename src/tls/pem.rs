//! PEM block scanning
//!
//! A PEM file may hold many concatenated blocks of different types. [`blocks`]
//! walks them lazily, left to right, so callers can stop at the first block
//! they care about.

use std::iter;

use ::pem::Pem;

const BEGIN: &[u8] = b"-----BEGIN ";
const DASHES: &[u8] = b"-----";

/// Return an iterator over the PEM blocks in `data`.
///
/// Text outside of blocks is ignored. A block that is not terminated or whose
/// body does not decode is skipped and scanning continues after its begin line.
pub fn blocks(data: &[u8]) -> impl Iterator<Item = Pem> + '_ {
    let mut rest = data;
    iter::from_fn(move || loop {
        let start = find(rest, BEGIN)?;
        let block = &rest[start..];
        let after_begin = &block[BEGIN.len()..];

        let Some(label_len) = find(after_begin, DASHES) else {
            rest = after_begin;
            continue;
        };
        let label = &after_begin[..label_len];
        let end_marker = [b"-----END ".as_slice(), label, DASHES].concat();

        let Some(end) = find(block, &end_marker) else {
            rest = after_begin;
            continue;
        };
        let (segment, tail) = block.split_at(end + end_marker.len());

        match ::pem::parse(segment) {
            Ok(pem) => {
                rest = tail;
                return Some(pem);
            }
            Err(err) => {
                tracing::debug!(
                    "skipping malformed PEM block '{}': {}",
                    String::from_utf8_lossy(label),
                    err
                );
                rest = after_begin;
            }
        }
    })
}

/// Return the first block in `data` that satisfies `predicate`.
pub fn find_block<P>(data: &[u8], predicate: P) -> Option<Pem>
where
    P: FnMut(&Pem) -> bool,
{
    blocks(data).find(predicate)
}

/// Whether `tag` names a private key: `PRIVATE KEY` itself or a typed legacy
/// variant such as `RSA PRIVATE KEY` or `EC PRIVATE KEY`.
pub fn is_private_key(tag: &str) -> bool {
    tag == "PRIVATE KEY" || tag.ends_with(" PRIVATE KEY")
}

/// Whether the block carries legacy RFC 1421 encryption headers.
pub fn is_encrypted(block: &Pem) -> bool {
    block.headers().get("DEK-Info").is_some()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
