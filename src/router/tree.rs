//! Compressed radix tree for route storage and lookup.
//!
//! One tree holds every pattern registered for a single HTTP method. Edges
//! are labeled with byte strings sharing maximal common prefixes, so lookup
//! cost is proportional to the path length, not to the number of routes.
//!
//! ## Structure
//!
//! - Static edges branch through `indices`: a byte string holding the first
//!   byte of each child's label, scanned for O(1) child selection.
//! - A `:name` parameter is a dedicated child node; its parent sets
//!   `wild_child` and keeps the parameter as its only child.
//! - A `*name` catch-all materializes as two nodes: an anchor reached via
//!   the `/` index, and a leaf holding `/`-prefixed capture plus the
//!   handler. The anchor keeps the `/` in the unmatched path so the capture
//!   includes it.
//!
//! Edge labels are raw bytes rather than `str` because an edge split may
//! land inside a multi-byte UTF-8 sequence (two patterns can share a prefix
//! that ends mid-character). Wildcard labels are always whole pattern
//! slices and convert back to `&str` without loss.
//!
//! ## Write model
//!
//! Insertion is two-phase: the pattern is validated and the tree probed for
//! conflicts without mutation, then an infallible pass performs the
//! insertion. A failed `add_route` therefore leaves the tree untouched.

use super::error::InsertError;
use super::params::Params;

/// Node classification. Fixed at creation; a node never changes kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Static,
    Param,
    CatchAll,
}

/// Result of a single tree lookup.
///
/// `handler` borrows from the tree, parameter values from the queried path.
/// `tsr` reports that no handler matched but one exists for the path with
/// the trailing slash toggled.
#[derive(Debug)]
pub struct Lookup<'n, 'p, T> {
    /// The matched handler, if any
    pub handler: Option<&'n T>,
    /// Captured wildcard parameters, in pattern order
    pub params: Params<'n, 'p>,
    /// Whether a trailing-slash redirect would produce a match
    pub tsr: bool,
}

/// A vertex of the routing tree.
///
/// The empty `Node::new()` is a valid tree accepting its first route via
/// [`Node::add_route`]. Nodes own their children; lookups borrow down the
/// current descent path only.
#[derive(Debug, Clone)]
pub struct Node<T> {
    prefix: Vec<u8>,
    indices: Vec<u8>,
    children: Vec<Node<T>>,
    kind: NodeKind,
    wild_child: bool,
    handler: Option<T>,
    priority: u32,
    max_params: u8,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Node<T> {
    /// Create an empty tree root.
    #[must_use]
    pub fn new() -> Self {
        Node {
            prefix: Vec::new(),
            indices: Vec::new(),
            children: Vec::new(),
            kind: NodeKind::Static,
            wild_child: false,
            handler: None,
            priority: 0,
            max_params: 0,
        }
    }

    fn with_max_params(max_params: u8) -> Self {
        Node {
            max_params,
            ..Node::new()
        }
    }

    /// Wildcard name of a parameter node (label without the `:`).
    fn param_name(&self) -> &str {
        std::str::from_utf8(&self.prefix[1..]).unwrap_or("")
    }

    /// Wildcard name of a catch-all leaf (label without the `/*`).
    fn catch_all_name(&self) -> &str {
        std::str::from_utf8(&self.prefix[2..]).unwrap_or("")
    }

    /// Register `handler` under `pattern`.
    ///
    /// Patterns are `/`-separated, may carry at most one `:name` parameter
    /// per segment, and may end in a single `*name` catch-all segment.
    /// Errors are reported per [`InsertError`]; on error the tree is left
    /// exactly as it was.
    ///
    /// Not safe for concurrent use; registration is a setup-phase activity.
    pub fn add_route(&mut self, pattern: &str, handler: T) -> Result<(), InsertError> {
        let num_params = validate_pattern(pattern)?;
        self.probe(pattern)?;
        self.insert_route(pattern, handler, num_params);
        Ok(())
    }

    /// Read-only conflict scan: walks the tree the same way the insertion
    /// pass will and reports the first conflict, touching nothing.
    fn probe(&self, pattern: &str) -> Result<(), InsertError> {
        if self.prefix.is_empty() && self.children.is_empty() && self.handler.is_none() {
            return Ok(());
        }

        let mut n = self;
        let mut path = pattern.as_bytes();
        loop {
            let i = longest_common_prefix(path, &n.prefix);
            if i < n.prefix.len() {
                // The edge will split here. The new branch is fresh, so the
                // only possible conflict is a wildcard landing next to the
                // detached static suffix.
                if i < path.len() && (path[i] == b':' || path[i] == b'*') {
                    return Err(InsertError::ChildConflict {
                        pattern: pattern.to_string(),
                    });
                }
                return Ok(());
            }
            if i == path.len() {
                if n.handler.is_some() {
                    return Err(InsertError::DuplicateHandler {
                        pattern: pattern.to_string(),
                    });
                }
                return Ok(());
            }
            path = &path[i..];

            if n.wild_child {
                let child = &n.children[0];
                let plen = child.prefix.len();
                if path.len() >= plen
                    && child.prefix[..] == path[..plen]
                    && (path.len() == plen || path[plen] == b'/')
                {
                    n = child;
                    continue;
                }
                // The pattern disagrees with the registered wildcard. A
                // wildcard-shaped remainder is a wildcard-vs-wildcard
                // mismatch; anything else mixes static and wildcard forms.
                let wild_vs_wild = match child.kind {
                    NodeKind::Param => path[0] == b':' || path[0] == b'*',
                    NodeKind::CatchAll => {
                        path.len() >= 2 && path[0] == b'/' && (path[1] == b'*' || path[1] == b':')
                    }
                    NodeKind::Static => false,
                };
                return Err(if wild_vs_wild {
                    InsertError::WildcardConflict {
                        pattern: pattern.to_string(),
                    }
                } else {
                    InsertError::ChildConflict {
                        pattern: pattern.to_string(),
                    }
                });
            }

            let c = path[0];
            if n.kind == NodeKind::Param && c == b'/' && n.children.len() == 1 {
                n = &n.children[0];
                continue;
            }
            if let Some(j) = n.indices.iter().position(|&b| b == c) {
                n = &n.children[j];
                continue;
            }
            // A fresh subtree will be attached at this node.
            if c == b':' || c == b'*' {
                if !n.children.is_empty() {
                    return Err(InsertError::ChildConflict {
                        pattern: pattern.to_string(),
                    });
                }
                if c == b'*' {
                    // The '/' the catch-all needs was already consumed by
                    // this node's edge, so the segment root is taken.
                    return Err(InsertError::CatchAllRootConflict {
                        pattern: pattern.to_string(),
                    });
                }
            }
            return Ok(());
        }
    }

    /// Mutation pass. `probe` has verified this cannot conflict.
    fn insert_route(&mut self, pattern: &str, handler: T, mut num_params: u8) {
        self.priority += 1;

        if self.prefix.is_empty() && self.children.is_empty() && self.handler.is_none() {
            if num_params > self.max_params {
                self.max_params = num_params;
            }
            self.insert_child(num_params, pattern.as_bytes(), handler);
            return;
        }

        let mut n = self;
        let mut path = pattern.as_bytes();
        loop {
            let i = longest_common_prefix(path, &n.prefix);

            // Split the edge: this node keeps the common prefix, the former
            // suffix moves into a single child carrying the old subtree.
            if i < n.prefix.len() {
                let child = Node {
                    prefix: n.prefix[i..].to_vec(),
                    indices: std::mem::take(&mut n.indices),
                    children: std::mem::take(&mut n.children),
                    kind: NodeKind::Static,
                    wild_child: n.wild_child,
                    handler: n.handler.take(),
                    priority: n.priority - 1,
                    max_params: n.max_params,
                };
                n.indices = vec![n.prefix[i]];
                n.prefix.truncate(i);
                n.children = vec![child];
                n.wild_child = false;
            }

            if num_params > n.max_params {
                n.max_params = num_params;
            }

            if i == path.len() {
                n.handler = Some(handler);
                return;
            }
            path = &path[i..];

            if n.wild_child {
                let child = &mut n.children[0];
                child.priority += 1;
                if num_params > child.max_params {
                    child.max_params = num_params;
                }
                num_params = num_params.saturating_sub(1);
                n = child;
                continue;
            }

            let c = path[0];
            if n.kind == NodeKind::Param && c == b'/' && n.children.len() == 1 {
                let child = &mut n.children[0];
                child.priority += 1;
                n = child;
                continue;
            }

            if let Some(j) = n.indices.iter().position(|&b| b == c) {
                let j = n.increment_child_priority(j);
                n = &mut n.children[j];
                continue;
            }

            if c != b':' && c != b'*' {
                n.indices.push(c);
                n.children.push(Node::with_max_params(num_params));
                let j = n.increment_child_priority(n.indices.len() - 1);
                n = &mut n.children[j];
            }
            n.insert_child(num_params, path, handler);
            return;
        }
    }

    /// Materialize the remaining pattern below this node, expanding
    /// wildcards into their dedicated child nodes.
    fn insert_child(&mut self, mut num_params: u8, mut path: &[u8], handler: T) {
        let mut n = self;

        while num_params > 0 {
            let (start, len) = match find_wildcard(path) {
                Some(w) => w,
                None => break,
            };

            if path[start] == b':' {
                // Split off the static part before the wildcard.
                if start > 0 {
                    n.prefix = path[..start].to_vec();
                    path = &path[start..];
                }

                let child = Node {
                    prefix: path[..len].to_vec(),
                    kind: NodeKind::Param,
                    max_params: num_params,
                    ..Node::new()
                };
                n.wild_child = true;
                n.children = vec![child];
                n = &mut n.children[0];
                n.priority += 1;
                num_params -= 1;

                // The pattern continues past the wildcard with another
                // static subpath starting at the next '/'.
                if len < path.len() {
                    path = &path[len..];
                    let child = Node {
                        priority: 1,
                        max_params: num_params,
                        ..Node::new()
                    };
                    n.indices = vec![b'/'];
                    n.children = vec![child];
                    n = &mut n.children[0];
                    continue;
                }

                n.handler = Some(handler);
                return;
            }

            // Catch-all. Validation pinned it to the end of the pattern with
            // a '/' immediately before it. The anchor node is reached via
            // the '/' index but keeps an empty label, so the '/' stays in
            // the unmatched path and lands in the capture.
            let slash = start - 1;
            if slash > 0 {
                n.prefix = path[..slash].to_vec();
                let anchor = Node {
                    kind: NodeKind::CatchAll,
                    wild_child: true,
                    max_params: 1,
                    priority: 1,
                    ..Node::new()
                };
                n.indices = vec![b'/'];
                n.children = vec![anchor];
                n = &mut n.children[0];
            } else {
                // The node was created for the '/' branch itself (or is an
                // empty root); it becomes the anchor in place.
                n.kind = NodeKind::CatchAll;
                n.wild_child = true;
                n.max_params = 1;
            }

            // Leaf holding the capture name and the handler.
            let leaf = Node {
                prefix: path[slash..].to_vec(),
                kind: NodeKind::CatchAll,
                handler: Some(handler),
                max_params: 1,
                priority: 1,
                ..Node::new()
            };
            n.children = vec![leaf];
            return;
        }

        // No wildcard left; the rest of the pattern is this node's label.
        n.prefix = path.to_vec();
        n.handler = Some(handler);
    }

    /// Bump the priority of child `i` and bubble it toward the front of the
    /// sibling list while its predecessor is strictly lighter. `indices`
    /// moves in lockstep. Returns the child's new position.
    fn increment_child_priority(&mut self, mut i: usize) -> usize {
        self.children[i].priority += 1;
        let priority = self.children[i].priority;
        while i > 0 && self.children[i - 1].priority < priority {
            self.children.swap(i - 1, i);
            self.indices.swap(i - 1, i);
            i -= 1;
        }
        i
    }

    /// Look up `path` in this tree.
    ///
    /// Returns the registered handler together with captured parameters, or
    /// a trailing-slash-redirect recommendation when toggling the final `/`
    /// would match. Performs no heap allocation when the matched route has
    /// no wildcards; otherwise the capture list is created once, sized by
    /// the precomputed `max_params` of the first wildcard node.
    pub fn get_value<'n, 'p>(&'n self, full_path: &'p str) -> Lookup<'n, 'p, T> {
        let path = full_path.as_bytes();
        let mut n = self;
        let mut pos = 0;
        let mut params = Params::new();
        let mut handler = None;
        let mut tsr = false;

        // Whether we are still at the tree root, and whether the node we
        // descended out of terminates a route. Both feed the trailing-slash
        // check at a `/`-labeled wildcard parent.
        let mut at_root = true;
        let mut prev_has_handler = false;

        'walk: loop {
            let rest = &path[pos..];
            if rest.len() > n.prefix.len() {
                if rest[..n.prefix.len()] == n.prefix[..] {
                    pos += n.prefix.len();
                    let rest = &path[pos..];

                    if !n.wild_child {
                        if let Some(j) = n.indices.iter().position(|&b| b == rest[0]) {
                            prev_has_handler = n.handler.is_some();
                            at_root = false;
                            n = &n.children[j];
                            continue 'walk;
                        }
                        // No deeper branch; a route without the trailing
                        // slash may end right here.
                        tsr = rest == b"/" && n.handler.is_some();
                        break 'walk;
                    }

                    prev_has_handler = n.handler.is_some();
                    at_root = false;
                    n = &n.children[0];
                    match n.kind {
                        NodeKind::Param => {
                            let mut end = 0;
                            while end < rest.len() && rest[end] != b'/' {
                                end += 1;
                            }

                            if params.is_empty() {
                                params = Params::with_capacity(n.max_params as usize);
                            }
                            params.push(n.param_name(), str_slice(full_path, pos, pos + end));

                            if end < rest.len() {
                                if !n.children.is_empty() {
                                    pos += end;
                                    prev_has_handler = n.handler.is_some();
                                    n = &n.children[0];
                                    continue 'walk;
                                }
                                // The path goes deeper but the tree does
                                // not; only a lone trailing '/' is fixable.
                                tsr = rest.len() == end + 1;
                                break 'walk;
                            }

                            if n.handler.is_some() {
                                handler = n.handler.as_ref();
                                break 'walk;
                            }
                            if n.children.len() == 1 {
                                let child = &n.children[0];
                                tsr = child.prefix == b"/" && child.handler.is_some();
                            }
                            break 'walk;
                        }
                        NodeKind::CatchAll => {
                            if params.is_empty() {
                                params = Params::with_capacity(n.max_params as usize);
                            }
                            params.push(n.catch_all_name(), str_slice(full_path, pos, path.len()));
                            handler = n.handler.as_ref();
                            break 'walk;
                        }
                        NodeKind::Static => break 'walk,
                    }
                }
            } else if rest == &n.prefix[..] {
                if n.handler.is_some() {
                    handler = n.handler.as_ref();
                    break 'walk;
                }

                // The path ends at a '/' whose parent terminates a route:
                // dropping the slash would match.
                if rest == b"/" && n.wild_child && !at_root {
                    tsr = prev_has_handler;
                    break 'walk;
                }

                // A route with a trailing slash may continue below.
                if let Some(j) = n.indices.iter().position(|&b| b == b'/') {
                    let child = &n.children[j];
                    tsr = (child.prefix == b"/" && child.handler.is_some())
                        || (child.kind == NodeKind::CatchAll
                            && child.children.first().map_or(false, |c| c.handler.is_some()));
                }
                break 'walk;
            }

            // No match; recommend the toggled trailing slash when the path
            // is one '/' short of this node's edge, or one '/' long.
            tsr = rest == b"/"
                || (n.prefix.len() == rest.len() + 1
                    && n.prefix[rest.len()] == b'/'
                    && rest[..] == n.prefix[..rest.len()]
                    && n.handler.is_some());
            break 'walk;
        }

        Lookup {
            handler,
            params,
            tsr,
        }
    }

    /// Reconstruct the registered spelling of `path`, comparing whole
    /// Unicode code points case-insensitively.
    ///
    /// With `fix_trailing_slash`, a missing or superfluous trailing `/` is
    /// healed as part of the correction. Parameter and catch-all captures
    /// keep the client's spelling. Allocates a single output buffer of
    /// capacity `path.len() + 1`.
    pub fn find_case_insensitive_path(
        &self,
        path: &str,
        fix_trailing_slash: bool,
    ) -> Option<String> {
        let mut out = Vec::with_capacity(path.len() + 1);
        if self.find_ci_rec(path.as_bytes(), &mut out, [0u8; 4], fix_trailing_slash) {
            match String::from_utf8(out) {
                Ok(s) => Some(s),
                Err(e) => Some(String::from_utf8_lossy(&e.into_bytes()).into_owned()),
            }
        } else {
            None
        }
    }

    /// Recursive case-insensitive walk. `rb` carries the not-yet-consumed
    /// bytes of the folded form of the rune the walk currently sits in.
    /// On failure, `out` is restored to its length at entry.
    fn find_ci_rec(
        &self,
        mut path: &[u8],
        out: &mut Vec<u8>,
        mut rb: [u8; 4],
        fix_trailing_slash: bool,
    ) -> bool {
        let entry_len = out.len();
        let mut n = self;
        let mut np_len = n.prefix.len();

        'walk: while path.len() >= np_len
            && (np_len == 0 || eq_fold(&path[1..np_len], &n.prefix[1..]))
        {
            let old_path = path;
            path = &path[np_len..];
            out.extend_from_slice(&n.prefix);

            if path.is_empty() {
                if n.handler.is_some() {
                    return true;
                }
                // Out of path without a handler; try appending a '/'.
                if fix_trailing_slash {
                    if let Some(j) = n.indices.iter().position(|&b| b == b'/') {
                        let child = &n.children[j];
                        if (child.prefix == b"/" && child.handler.is_some())
                            || (child.kind == NodeKind::CatchAll
                                && child.children.first().map_or(false, |c| c.handler.is_some()))
                        {
                            out.push(b'/');
                            return true;
                        }
                    }
                }
                out.truncate(entry_len);
                return false;
            }

            if !n.wild_child {
                // Drop the prefix bytes just consumed from the rune buffer.
                rb = shift_rune_bytes(rb, np_len);

                if rb[0] != 0 {
                    // Still inside the current rune; match its next byte.
                    let idxc = rb[0];
                    for (j, &c) in n.indices.iter().enumerate() {
                        if c == idxc {
                            n = &n.children[j];
                            np_len = n.prefix.len();
                            continue 'walk;
                        }
                    }
                } else {
                    // Entering a new rune. Its start may lie up to three
                    // bytes back inside the already-consumed input.
                    let mut rv = '\u{FFFD}';
                    let mut off = 0;
                    if np_len == 0 {
                        rv = decode_rune(path).0;
                    } else {
                        let max = np_len.min(3);
                        while off < max {
                            let i = np_len - off;
                            if is_rune_start(old_path[i]) {
                                rv = decode_rune(&old_path[i..]).0;
                                break;
                            }
                            off += 1;
                        }
                    }

                    let lo = to_lower(rv);
                    rb = shift_rune_bytes(encode_rune(lo), off);
                    let idxc = rb[0];
                    for (j, &c) in n.indices.iter().enumerate() {
                        if c == idxc {
                            // Both the lowercase and the uppercase spelling
                            // can exist as sibling branches; try lowercase
                            // in a sub-walk first.
                            if n.children[j].find_ci_rec(path, out, rb, fix_trailing_slash) {
                                return true;
                            }
                            break;
                        }
                    }

                    let up = to_upper(rv);
                    if up != lo {
                        rb = shift_rune_bytes(encode_rune(up), off);
                        let idxc = rb[0];
                        for (j, &c) in n.indices.iter().enumerate() {
                            if c == idxc {
                                n = &n.children[j];
                                np_len = n.prefix.len();
                                continue 'walk;
                            }
                        }
                    }
                }

                if fix_trailing_slash && path == b"/" && n.handler.is_some() {
                    return true;
                }
                out.truncate(entry_len);
                return false;
            }

            n = &n.children[0];
            match n.kind {
                NodeKind::Param => {
                    let mut end = 0;
                    while end < path.len() && path[end] != b'/' {
                        end += 1;
                    }

                    // Captures keep the client's case.
                    out.extend_from_slice(&path[..end]);

                    if end < path.len() {
                        if !n.children.is_empty() {
                            path = &path[end..];
                            n = &n.children[0];
                            np_len = n.prefix.len();
                            continue 'walk;
                        }
                        if fix_trailing_slash && path.len() == end + 1 {
                            return true;
                        }
                        out.truncate(entry_len);
                        return false;
                    }

                    if n.handler.is_some() {
                        return true;
                    }
                    if fix_trailing_slash && n.children.len() == 1 {
                        let child = &n.children[0];
                        if child.prefix == b"/" && child.handler.is_some() {
                            out.push(b'/');
                            return true;
                        }
                    }
                    out.truncate(entry_len);
                    return false;
                }
                NodeKind::CatchAll => {
                    out.extend_from_slice(path);
                    return true;
                }
                NodeKind::Static => {
                    out.truncate(entry_len);
                    return false;
                }
            }
        }

        // Nothing matched; try toggling a trailing slash.
        if fix_trailing_slash {
            if path == b"/" {
                return true;
            }
            if path.len() + 1 == np_len
                && n.prefix[path.len()] == b'/'
                && !path.is_empty()
                && eq_fold(&path[1..], &n.prefix[1..path.len()])
                && n.handler.is_some()
            {
                out.extend_from_slice(&n.prefix);
                return true;
            }
        }
        out.truncate(entry_len);
        false
    }
}

/// Length of the longest common prefix of `a` and `b`.
fn longest_common_prefix(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Byte-range slice of `s` that is known to fall on character boundaries.
fn str_slice(s: &str, start: usize, end: usize) -> &str {
    s.get(start..end).unwrap_or("")
}

/// Locate the next wildcard in `path`: returns its start index and the
/// length of the wildcard (marker plus name, up to the next `/` or the
/// end). Assumes the pattern already passed validation.
fn find_wildcard(path: &[u8]) -> Option<(usize, usize)> {
    for (start, &c) in path.iter().enumerate() {
        if c != b':' && c != b'*' {
            continue;
        }
        let mut end = start + 1;
        while end < path.len() && path[end] != b'/' {
            end += 1;
        }
        return Some((start, end - start));
    }
    None
}

/// Syntax validation of a pattern, independent of tree state. Returns the
/// number of wildcards.
fn validate_pattern(pattern: &str) -> Result<u8, InsertError> {
    let bytes = pattern.as_bytes();
    if bytes.first() != Some(&b'/') {
        return Err(InsertError::MissingLeadingSlash {
            pattern: pattern.to_string(),
        });
    }

    let mut count: usize = 0;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c != b':' && c != b'*' {
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i + 1;
        while end < bytes.len() && bytes[end] != b'/' {
            if bytes[end] == b':' || bytes[end] == b'*' {
                return Err(InsertError::MultipleWildcards {
                    pattern: pattern.to_string(),
                });
            }
            end += 1;
        }
        if end == start + 1 {
            return Err(InsertError::EmptyWildcardName {
                pattern: pattern.to_string(),
            });
        }
        if c == b'*' {
            if end < bytes.len() {
                return Err(InsertError::CatchAllNotAtEnd {
                    pattern: pattern.to_string(),
                });
            }
            if bytes[start - 1] != b'/' {
                // The catch-all has no '/' of its own to anchor on.
                return Err(InsertError::CatchAllRootConflict {
                    pattern: pattern.to_string(),
                });
            }
        }
        count += 1;
        i = end;
    }

    Ok(count.min(u8::MAX as usize) as u8)
}

// ---------------------------------------------------------------------------
// Code-point helpers for the case-insensitive walk.

/// True if `b` can start a UTF-8 sequence (i.e. is not a continuation byte).
fn is_rune_start(b: u8) -> bool {
    b & 0xC0 != 0x80
}

/// Decode one code point from the front of `bytes`. Invalid or truncated
/// sequences decode as the replacement character with width 1; a fold
/// comparison that starts mid-rune treats the cut-off bytes as equal, since
/// their rune was already folded where it started.
fn decode_rune(bytes: &[u8]) -> (char, usize) {
    let b0 = match bytes.first() {
        Some(&b) => b,
        None => return ('\u{FFFD}', 0),
    };
    let len = match b0 {
        0x00..=0x7F => return (b0 as char, 1),
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return ('\u{FFFD}', 1),
    };
    if bytes.len() < len {
        return ('\u{FFFD}', 1);
    }
    match std::str::from_utf8(&bytes[..len]) {
        Ok(s) => match s.chars().next() {
            Some(c) => (c, len),
            None => ('\u{FFFD}', 1),
        },
        Err(_) => ('\u{FFFD}', 1),
    }
}

/// UTF-8 bytes of `c`, zero-padded to four.
fn encode_rune(c: char) -> [u8; 4] {
    let mut buf = [0u8; 4];
    c.encode_utf8(&mut buf);
    buf
}

/// Shift the rune buffer left by `n` bytes.
fn shift_rune_bytes(rb: [u8; 4], n: usize) -> [u8; 4] {
    match n {
        0 => rb,
        1 => [rb[1], rb[2], rb[3], 0],
        2 => [rb[2], rb[3], 0, 0],
        3 => [rb[3], 0, 0, 0],
        _ => [0; 4],
    }
}

fn to_lower(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn to_upper(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

/// Code-point-wise case-insensitive equality. Operates on raw bytes so it
/// stays safe on edge labels that split inside a multi-byte sequence.
fn eq_fold(mut a: &[u8], mut b: &[u8]) -> bool {
    while !a.is_empty() && !b.is_empty() {
        let (ca, la) = decode_rune(a);
        let (cb, lb) = decode_rune(b);
        if to_lower(ca) != to_lower(cb) {
            return false;
        }
        a = &a[la..];
        b = &b[lb..];
    }
    a.is_empty() && b.is_empty()
}

#[cfg(test)]
impl<T> Node<T> {
    /// Walk the whole tree asserting the structural invariants hold.
    pub(crate) fn check_invariants(&self) {
        self.check_node();
    }

    fn check_node(&self) -> (u32, u8) {
        if self.wild_child {
            assert_eq!(
                self.children.len(),
                1,
                "wild_child node must have exactly one child"
            );
            assert_ne!(
                self.children[0].kind,
                NodeKind::Static,
                "wild child must be a wildcard node"
            );
        } else {
            assert_eq!(
                self.indices.len(),
                self.children.len(),
                "indices must parallel children"
            );
            for (i, &c) in self.indices.iter().enumerate() {
                let child = &self.children[i];
                // The catch-all anchor is reached via '/' but keeps an
                // empty label so the slash stays in the path.
                if child.kind == NodeKind::CatchAll && child.prefix.is_empty() {
                    assert_eq!(c, b'/');
                } else {
                    assert_eq!(
                        Some(&c),
                        child.prefix.first(),
                        "index byte must equal child's first label byte"
                    );
                }
                assert!(
                    !self.indices[..i].contains(&c),
                    "sibling first bytes must be distinct"
                );
            }
        }

        if self.kind == NodeKind::CatchAll && !self.prefix.is_empty() {
            assert!(self.children.is_empty(), "catch-all leaf has no children");
            assert_eq!(self.prefix.first(), Some(&b'/'));
        }

        let mut prev = u32::MAX;
        let mut priority_sum = 0;
        let mut child_params = 0u8;
        for child in &self.children {
            let (p, mp) = child.check_node();
            assert!(p <= prev, "children must be ordered by priority");
            prev = p;
            priority_sum += p;
            child_params = child_params.max(mp);
        }

        let own_capture = match self.kind {
            NodeKind::Param => 1,
            NodeKind::CatchAll if !self.prefix.is_empty() => 1,
            _ => 0,
        };
        let expected_params = own_capture + child_params;
        assert_eq!(
            self.max_params, expected_params,
            "max_params must equal the subtree's true capture count"
        );

        let expected_priority = priority_sum + u32::from(self.handler.is_some());
        assert_eq!(
            self.priority, expected_priority,
            "priority must equal reachable route count"
        );

        (self.priority, self.max_params)
    }
}
