//! URL path canonicalization.
//!
//! `clean_path` produces the canonical form of a textual URL path: repeated
//! slashes collapse, `.` and `..` segments resolve the way a filesystem
//! would, and the result always begins with `/`. The router only consults it
//! on the redirect fallback, never on the matching fast path.

use std::borrow::Cow;

/// Canonicalize a URL path.
///
/// Rules, applied iteratively until none fires:
///
/// 1. Replace multiple slashes with a single slash.
/// 2. Eliminate each `.` path name element (the current directory).
/// 3. Eliminate each inner `..` path name element (the parent directory)
///    along with the non-`..` element that precedes it.
/// 4. Eliminate `..` elements that begin a rooted path: that is, replace
///    `/..` by `/` at the beginning of a path.
///
/// A trailing slash is preserved, and an empty input yields `/`. Inputs that
/// are already canonical are returned borrowed, without allocating.
#[must_use]
pub fn clean_path(p: &str) -> Cow<'_, str> {
    if p.is_empty() {
        return Cow::Borrowed("/");
    }

    let s = p.as_bytes();
    let n = s.len();

    // Lazily allocated output; stays `None` while the input prefix read so
    // far is its own canonical form.
    let mut buf: Option<Vec<u8>> = None;

    // r is the index of the next byte to read, w of the next byte to write.
    let mut r = 1;
    let mut w = 1;

    if s[0] != b'/' {
        r = 0;
        let mut b = Vec::with_capacity(n + 1);
        b.push(b'/');
        buf = Some(b);
    }

    let mut trailing = n > 1 && s[n - 1] == b'/';

    while r < n {
        match s[r] {
            b'/' => {
                // empty path element, trailing slash is added after the loop
                r += 1;
            }
            b'.' if r + 1 == n => {
                trailing = true;
                r += 1;
            }
            b'.' if s[r + 1] == b'/' => {
                r += 2;
            }
            b'.' if s[r + 1] == b'.' && (r + 2 == n || s[r + 2] == b'/') => {
                // .. element: remove to the last /
                r += 3;
                if w > 1 {
                    w -= 1;
                    match &buf {
                        None => {
                            while w > 1 && s[w] != b'/' {
                                w -= 1;
                            }
                        }
                        Some(b) => {
                            while w > 1 && b[w] != b'/' {
                                w -= 1;
                            }
                        }
                    }
                }
            }
            _ => {
                // A real path element; add a slash if needed.
                if w > 1 {
                    buf_app(&mut buf, s, w, b'/');
                    w += 1;
                }
                while r < n && s[r] != b'/' {
                    buf_app(&mut buf, s, w, s[r]);
                    w += 1;
                    r += 1;
                }
            }
        }
    }

    // Re-append trailing slash
    if trailing && w > 1 {
        buf_app(&mut buf, s, w, b'/');
        w += 1;
    }

    match buf {
        None => Cow::Borrowed(&p[..w]),
        Some(mut b) => {
            b.truncate(w);
            match String::from_utf8(b) {
                Ok(s) => Cow::Owned(s),
                Err(e) => Cow::Owned(String::from_utf8_lossy(&e.into_bytes()).into_owned()),
            }
        }
    }
}

// Write byte c at position w, materializing the output buffer only once the
// written byte diverges from the input.
fn buf_app(buf: &mut Option<Vec<u8>>, s: &[u8], w: usize, c: u8) {
    match buf {
        None => {
            if s[w] == c {
                return;
            }
            let mut b = Vec::with_capacity(s.len() + 1);
            b.extend_from_slice(&s[..w]);
            b.push(c);
            *buf = Some(b);
        }
        Some(b) => {
            if b.len() > w {
                b.truncate(w);
            }
            b.push(c);
        }
    }
}
