//! Router core - the per-method forest and the dispatch decision.
//!
//! `Router` owns one radix tree per HTTP method and composes the tree
//! primitives into the externally visible behaviors: direct match,
//! trailing-slash redirect, case-fix redirect, OPTIONS auto-reply,
//! method-not-allowed enumeration, and not-found.

use http::{Method, StatusCode};
use tracing::debug;

use super::error::InsertError;
use super::params::Params;
use super::path::clean_path;
use super::tree::{Lookup, Node};

/// Number of standard HTTP methods kept in the fixed root array.
const METHOD_COUNT: usize = 9;

/// Fixed array order of the standard methods. Custom methods go into a
/// side vector in first-registration order.
const METHOD_ORDER: [Method; METHOD_COUNT] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::CONNECT,
    Method::OPTIONS,
    Method::TRACE,
];

fn method_index(method: &Method) -> Option<usize> {
    METHOD_ORDER.iter().position(|m| m == method)
}

/// Behavior toggles for [`Router::dispatch`].
#[derive(Debug, Clone, Copy)]
pub struct RouterConfig {
    /// Redirect when the path with the trailing slash toggled would match
    pub redirect_trailing_slash: bool,
    /// Redirect to the cleaned, case-corrected path when nothing else matched
    pub redirect_fixed_path: bool,
    /// Answer unmatched methods with 405 and an `Allow` header
    pub handle_method_not_allowed: bool,
    /// Answer `OPTIONS` requests automatically with an `Allow` header
    pub handle_options: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            redirect_trailing_slash: true,
            redirect_fixed_path: true,
            handle_method_not_allowed: true,
            handle_options: true,
        }
    }
}

/// The routing decision for one request.
///
/// Handlers are borrowed from the router; parameter values borrow from the
/// queried path. Redirect locations carry the original query string, if any.
#[derive(Debug)]
pub enum Dispatch<'r, 'p, T> {
    /// A handler matched directly
    Match {
        /// The registered handler
        handler: &'r T,
        /// Captured wildcard parameters, in pattern order
        params: Params<'r, 'p>,
    },
    /// The client should retry at `location`
    ///
    /// Status is 301 for `GET` requests and 307 for everything else, for
    /// both trailing-slash and fixed-path redirects.
    Redirect {
        /// Corrected path, query string preserved
        location: String,
        /// `301 Moved Permanently` or `307 Temporary Redirect`
        status: StatusCode,
    },
    /// Automatic reply to an `OPTIONS` request
    Options {
        /// `Allow` header value
        allow: String,
    },
    /// The path matches under other methods only
    MethodNotAllowed {
        /// `Allow` header value
        allow: String,
    },
    /// Nothing matched
    NotFound,
}

/// Method-aware request router backed by per-method radix trees.
///
/// `T` is the handler type; the router never clones or invokes handlers, it
/// only hands out references. Registration is a single-threaded setup-phase
/// activity; once registration is complete the router is immutable and safe
/// to share across request-handling threads.
///
/// # Example
///
/// ```rust
/// use switchback::{Dispatch, Router};
/// use http::Method;
///
/// let mut router: Router<&str> = Router::new();
/// router.get("/hello/:name", "hello_handler").unwrap();
///
/// match router.dispatch(&Method::GET, "/hello/world") {
///     Dispatch::Match { handler, params } => {
///         assert_eq!(*handler, "hello_handler");
///         assert_eq!(params.get("name"), Some("world"));
///     }
///     _ => panic!("expected a match"),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Router<T> {
    roots: [Option<Node<T>>; METHOD_COUNT],
    custom: Vec<(Method, Node<T>)>,
    /// Behavior toggles consulted by `dispatch`
    pub config: RouterConfig,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Create a router with the default configuration (all redirects and
    /// automatic replies enabled).
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create a router with an explicit configuration.
    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        Router {
            roots: std::array::from_fn(|_| None),
            custom: Vec::new(),
            config,
        }
    }

    fn root(&self, method: &Method) -> Option<&Node<T>> {
        match method_index(method) {
            Some(i) => self.roots[i].as_ref(),
            None => self
                .custom
                .iter()
                .find(|(m, _)| m == method)
                .map(|(_, root)| root),
        }
    }

    fn root_mut(&mut self, method: &Method) -> &mut Node<T> {
        match method_index(method) {
            Some(i) => self.roots[i].get_or_insert_with(Node::new),
            None => {
                if let Some(j) = self.custom.iter().position(|(m, _)| m == method) {
                    &mut self.custom[j].1
                } else {
                    self.custom.push((method.clone(), Node::new()));
                    let last = self.custom.len() - 1;
                    &mut self.custom[last].1
                }
            }
        }
    }

    /// Register `handler` for `pattern` under `method`.
    ///
    /// See [`Node::add_route`] for the pattern syntax; failures per
    /// [`InsertError`] leave the router unchanged. Registration errors are
    /// configuration errors and should be treated as fatal at startup.
    pub fn handle(
        &mut self,
        method: Method,
        pattern: &str,
        handler: T,
    ) -> Result<(), InsertError> {
        debug!(method = %method, pattern = %pattern, "registering route");
        self.root_mut(&method).add_route(pattern, handler)
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

    /// Shortcut for `handle(Method::TRACE, ...)`.
    pub fn trace(&mut self, pattern: &str, handler: T) -> Result<(), InsertError> {
        self.handle(Method::TRACE, pattern, handler)
    }

    /// Shortcut for `handle(Method::CONNECT, ...)`.
    pub fn connect(&mut self, pattern: &str, handler: T) -> Result<(), InsertError> {
        self.handle(Method::CONNECT, pattern, handler)
    }

    /// Register a file-serving handler under `GET {prefix}/*filepath`.
    ///
    /// The handler is an external collaborator (for example
    /// [`StaticFiles`](crate::StaticFiles)); it receives the requested file
    /// path, including the leading `/`, as the `filepath` capture.
    pub fn serve_files(&mut self, prefix: &str, handler: T) -> Result<(), InsertError> {
        let prefix = prefix.strip_suffix('/').unwrap_or(prefix);
        let pattern = format!("{}/*filepath", prefix);
        self.handle(Method::GET, &pattern, handler)
    }

    /// Look `path` up in the tree registered for `method`.
    ///
    /// This is the raw tree access without any redirect logic; `dispatch`
    /// builds on it. A method with no registered routes yields an empty
    /// lookup.
    #[must_use]
    pub fn lookup<'r, 'p>(&'r self, method: &Method, path: &'p str) -> Lookup<'r, 'p, T> {
        match self.root(method) {
            Some(root) => root.get_value(path),
            None => Lookup {
                handler: None,
                params: Params::new(),
                tsr: false,
            },
        }
    }

    /// Case-insensitive spelling correction against the tree registered for
    /// `method`. See [`Node::find_case_insensitive_path`].
    #[must_use]
    pub fn find_case_insensitive_path(
        &self,
        method: &Method,
        path: &str,
        fix_trailing_slash: bool,
    ) -> Option<String> {
        self.root(method)?
            .find_case_insensitive_path(path, fix_trailing_slash)
    }

    /// Compose the `Allow` header value for `path`: every method whose tree
    /// would match, standard methods first in fixed order, then custom
    /// methods in registration order, with `OPTIONS` appended exactly once.
    ///
    /// `path == "*"` enumerates every method with at least one registered
    /// route. Returns the empty string when nothing matches.
    #[must_use]
    pub fn allowed(&self, path: &str, exclude: &Method) -> String {
        let mut allow = String::new();

        let candidates = METHOD_ORDER
            .iter()
            .zip(self.roots.iter().map(|r| r.as_ref()))
            .chain(self.custom.iter().map(|(m, root)| (m, Some(root))));

        for (method, root) in candidates {
            if method == exclude || *method == Method::OPTIONS {
                continue;
            }
            let root = match root {
                Some(root) => root,
                None => continue,
            };
            if path == "*" || root.get_value(path).handler.is_some() {
                allow.push_str(method.as_str());
                allow.push_str(", ");
            }
        }

        if allow.is_empty() {
            return allow;
        }
        allow.push_str(Method::OPTIONS.as_str());
        allow
    }

    /// Decide how to answer `(method, path)`.
    ///
    /// The decision procedure, in order:
    ///
    /// 1. A direct match in the method's tree wins.
    /// 2. A trailing-slash redirect, when the tree recommends one and
    ///    `redirect_trailing_slash` is set.
    /// 3. A fixed-path redirect (path cleanup plus case-insensitive
    ///    correction), when `redirect_fixed_path` is set.
    /// 4. An automatic `OPTIONS` reply, when `handle_options` is set.
    /// 5. `405 Method Not Allowed` with the `Allow` methods, when
    ///    `handle_method_not_allowed` is set and another method matches.
    /// 6. Not found.
    ///
    /// `path` may carry a query string; it is ignored for matching and
    /// re-attached to redirect locations.
    #[must_use]
    pub fn dispatch<'r, 'p>(&'r self, method: &Method, path: &'p str) -> Dispatch<'r, 'p, T> {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (path, None),
        };

        if let Some(root) = self.root(method) {
            let lookup = root.get_value(path);
            if let Some(handler) = lookup.handler {
                debug!(method = %method, path = %path, "route matched");
                return Dispatch::Match {
                    handler,
                    params: lookup.params,
                };
            }

            if *method != Method::CONNECT && path != "/" {
                if lookup.tsr && self.config.redirect_trailing_slash {
                    let location = match path.strip_suffix('/') {
                        Some(stripped) if path.len() > 1 => stripped.to_string(),
                        _ => format!("{}/", path),
                    };
                    debug!(method = %method, path = %path, location = %location,
                        "trailing slash redirect");
                    return redirect(method, location, query);
                }

                if self.config.redirect_fixed_path {
                    let cleaned = clean_path(path);
                    if let Some(fixed) = root.find_case_insensitive_path(
                        &cleaned,
                        self.config.redirect_trailing_slash,
                    ) {
                        debug!(method = %method, path = %path, location = %fixed,
                            "fixed path redirect");
                        return redirect(method, fixed, query);
                    }
                }
            }
        }

        if *method == Method::OPTIONS && self.config.handle_options {
            let allow = self.allowed(path, method);
            if !allow.is_empty() {
                return Dispatch::Options { allow };
            }
        } else if self.config.handle_method_not_allowed {
            let allow = self.allowed(path, method);
            if !allow.is_empty() {
                debug!(method = %method, path = %path, allow = %allow, "method not allowed");
                return Dispatch::MethodNotAllowed { allow };
            }
        }

        debug!(method = %method, path = %path, "no route matched");
        Dispatch::NotFound
    }
}

fn redirect<'r, 'p, T>(
    method: &Method,
    location: String,
    query: Option<&str>,
) -> Dispatch<'r, 'p, T> {
    let status = if *method == Method::GET {
        StatusCode::MOVED_PERMANENTLY
    } else {
        StatusCode::TEMPORARY_REDIRECT
    };
    let location = match query {
        Some(q) => format!("{}?{}", location, q),
        None => location,
    };
    Dispatch::Redirect { location, status }
}
