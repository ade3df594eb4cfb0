use std::fmt;

/// Route registration error
///
/// Returned by `Router::handle` (and the tree's `add_route`) when a pattern
/// is malformed or conflicts with a previously registered route. A failed
/// registration never modifies the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    /// Pattern does not begin with `/`
    MissingLeadingSlash {
        /// The rejected pattern
        pattern: String,
    },
    /// A `:` or `*` wildcard is followed immediately by `/` or the end of
    /// the pattern, leaving it without a name
    EmptyWildcardName {
        /// The rejected pattern
        pattern: String,
    },
    /// A second `:` or `*` appears within a single path segment
    ///
    /// Only one wildcard is allowed per segment; `/:a:b` and `/x:y` style
    /// segments are ambiguous.
    MultipleWildcards {
        /// The rejected pattern
        pattern: String,
    },
    /// A `*name` catch-all is followed by more path
    ///
    /// Catch-alls consume the remainder of the request path, so they must
    /// be the final segment of the pattern.
    CatchAllNotAtEnd {
        /// The rejected pattern
        pattern: String,
    },
    /// The catch-all cannot claim its segment root
    ///
    /// Either the pattern has no `/` immediately before the `*` wildcard,
    /// or the existing edge already ends in `/` (e.g. `/files/` is already
    /// a terminal) and the catch-all needs that `/` as its own first byte.
    CatchAllRootConflict {
        /// The rejected pattern
        pattern: String,
    },
    /// The pattern's wildcard disagrees with an existing wildcard at the
    /// same position (different name, different length, or catch-all vs.
    /// parameter)
    WildcardConflict {
        /// The rejected pattern
        pattern: String,
    },
    /// A wildcard segment lands on a node that already has static children,
    /// or a static segment lands where a wildcard is already registered
    ChildConflict {
        /// The rejected pattern
        pattern: String,
    },
    /// A handler is already registered for this exact pattern on this tree
    DuplicateHandler {
        /// The rejected pattern
        pattern: String,
    },
}

impl InsertError {
    /// The pattern that was rejected.
    #[must_use]
    pub fn pattern(&self) -> &str {
        match self {
            InsertError::MissingLeadingSlash { pattern }
            | InsertError::EmptyWildcardName { pattern }
            | InsertError::MultipleWildcards { pattern }
            | InsertError::CatchAllNotAtEnd { pattern }
            | InsertError::CatchAllRootConflict { pattern }
            | InsertError::WildcardConflict { pattern }
            | InsertError::ChildConflict { pattern }
            | InsertError::DuplicateHandler { pattern } => pattern,
        }
    }
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::MissingLeadingSlash { pattern } => {
                write!(f, "route pattern '{}' must begin with '/'", pattern)
            }
            InsertError::EmptyWildcardName { pattern } => {
                write!(
                    f,
                    "route pattern '{}' contains a wildcard with an empty name; \
                    ':' and '*' must be followed by at least one character",
                    pattern
                )
            }
            InsertError::MultipleWildcards { pattern } => {
                write!(
                    f,
                    "route pattern '{}' uses more than one wildcard in a single \
                    path segment; only one ':' or '*' is allowed per segment",
                    pattern
                )
            }
            InsertError::CatchAllNotAtEnd { pattern } => {
                write!(
                    f,
                    "route pattern '{}' continues after a '*' catch-all; \
                    catch-alls are only allowed as the final segment",
                    pattern
                )
            }
            InsertError::CatchAllRootConflict { pattern } => {
                write!(
                    f,
                    "catch-all in route pattern '{}' has no '/' segment root of \
                    its own; the '/' is missing or already taken by another route",
                    pattern
                )
            }
            InsertError::WildcardConflict { pattern } => {
                write!(
                    f,
                    "wildcard in route pattern '{}' conflicts with an existing \
                    wildcard registered at the same position",
                    pattern
                )
            }
            InsertError::ChildConflict { pattern } => {
                write!(
                    f,
                    "route pattern '{}' mixes wildcard and static segments at a \
                    position where the other form is already registered",
                    pattern
                )
            }
            InsertError::DuplicateHandler { pattern } => {
                write!(
                    f,
                    "a handler is already registered for pattern '{}'",
                    pattern
                )
            }
        }
    }
}

impl std::error::Error for InsertError {}
