//! Prefix-scoped route registration.
//!
//! A [`RouteGroup`] is a thin mutable view over a [`Router`] that prepends
//! a fixed prefix to every registered pattern. Groups nest; the prefixes
//! concatenate.

use http::Method;

use crate::router::{InsertError, Router};

/// A registration view that scopes every pattern under a common prefix.
///
/// ```rust
/// use switchback::Router;
///
/// let mut router: Router<&str> = Router::new();
/// let mut api = router.group("/api").unwrap();
/// api.get("/users/:id", "get_user").unwrap();
/// // registered as GET /api/users/:id
/// ```
pub struct RouteGroup<'r, T> {
    router: &'r mut Router<T>,
    prefix: String,
}

impl<T> Router<T> {
    /// Create a registration group rooted at `prefix`.
    ///
    /// The prefix must begin with `/`; a trailing `/` is stripped since
    /// every pattern registered through the group starts with its own `/`.
    pub fn group(&mut self, prefix: &str) -> Result<RouteGroup<'_, T>, InsertError> {
        RouteGroup::new(self, prefix)
    }
}

impl<'r, T> RouteGroup<'r, T> {
    fn new(router: &'r mut Router<T>, prefix: &str) -> Result<Self, InsertError> {
        if !prefix.starts_with('/') {
            return Err(InsertError::MissingLeadingSlash {
                pattern: prefix.to_string(),
            });
        }
        let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
        Ok(RouteGroup {
            router,
            prefix: prefix.to_string(),
        })
    }

    /// Create a nested group; the prefixes concatenate.
    pub fn group(&mut self, prefix: &str) -> Result<RouteGroup<'_, T>, InsertError> {
        if !prefix.starts_with('/') {
            return Err(InsertError::MissingLeadingSlash {
                pattern: prefix.to_string(),
            });
        }
        let nested = format!("{}{}", self.prefix, prefix);
        RouteGroup::new(self.router, &nested)
    }

    fn sub_path(&self, pattern: &str) -> Result<String, InsertError> {
        if !pattern.starts_with('/') {
            return Err(InsertError::MissingLeadingSlash {
                pattern: pattern.to_string(),
            });
        }
        Ok(format!("{}{}", self.prefix, pattern))
    }

    /// Register `handler` for `{prefix}{pattern}` under `method`.
    pub fn handle(
        &mut self,
        method: Method,
        pattern: &str,
        handler: T,
    ) -> Result<(), InsertError> {
        let full = self.sub_path(pattern)?;
        self.router.handle(method, &full, handler)
    }

    /// Shortcut for `handle(Method::GET, ...)`.
    pub fn get(&mut self, pattern: &str, handler: T) -> Result<(), InsertError> {
        self.handle(Method::GET, pattern, handler)
    }

    /// Shortcut for `handle(Method::HEAD, ...)`.
    pub fn head(&mut self, pattern: &str, handler: T) -> Result<(), InsertError> {
        self.handle(Method::HEAD, pattern, handler)
    }

    /// Shortcut for `handle(Method::POST, ...)`.
    pub fn post(&mut self, pattern: &str, handler: T) -> Result<(), InsertError> {
        self.handle(Method::POST, pattern, handler)
    }

    /// Shortcut for `handle(Method::PUT, ...)`.
    pub fn put(&mut self, pattern: &str, handler: T) -> Result<(), InsertError> {
        self.handle(Method::PUT, pattern, handler)
    }

    /// Shortcut for `handle(Method::PATCH, ...)`.
    pub fn patch(&mut self, pattern: &str, handler: T) -> Result<(), InsertError> {
        self.handle(Method::PATCH, pattern, handler)
    }

    /// Shortcut for `handle(Method::DELETE, ...)`.
    pub fn delete(&mut self, pattern: &str, handler: T) -> Result<(), InsertError> {
        self.handle(Method::DELETE, pattern, handler)
    }

    /// Shortcut for `handle(Method::OPTIONS, ...)`.
    pub fn options(&mut self, pattern: &str, handler: T) -> Result<(), InsertError> {
        self.handle(Method::OPTIONS, pattern, handler)
    }
}
