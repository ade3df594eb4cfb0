use super::{clean_path, InsertError, Node, Router};
use http::Method;

// Helper to build a tree where each handler is the pattern it was
// registered under, so lookups are self-describing.
fn tree(routes: &[&str]) -> Node<String> {
    let mut root = Node::new();
    for route in routes {
        root.add_route(route, route.to_string())
            .unwrap_or_else(|e| panic!("error inserting route '{}': {}", route, e));
    }
    root.check_invariants();
    root
}

fn assert_match(root: &Node<String>, path: &str, route: &str, params: &[(&str, &str)]) {
    let lookup = root.get_value(path);
    let handler = lookup
        .handler
        .unwrap_or_else(|| panic!("expected a handler for path '{}'", path));
    assert_eq!(handler, route, "wrong handler for path '{}'", path);
    let captured: Vec<(&str, &str)> = lookup.params.iter().map(|p| (p.key, p.value)).collect();
    assert_eq!(captured, params, "wrong params for path '{}'", path);
}

fn assert_no_match(root: &Node<String>, path: &str, tsr: bool) {
    let lookup = root.get_value(path);
    assert!(
        lookup.handler.is_none(),
        "unexpected handler for path '{}'",
        path
    );
    assert_eq!(lookup.tsr, tsr, "wrong tsr for path '{}'", path);
}

#[test]
fn test_clean_path() {
    let cases = [
        // Already clean
        ("/", "/"),
        ("/abc", "/abc"),
        ("/a/b/c", "/a/b/c"),
        ("/abc/", "/abc/"),
        ("/a/b/c/", "/a/b/c/"),
        // Missing root
        ("", "/"),
        ("a/", "/a/"),
        ("abc", "/abc"),
        ("abc/def", "/abc/def"),
        ("a/b/c", "/a/b/c"),
        // Remove doubled slash
        ("//", "/"),
        ("/abc//", "/abc/"),
        ("/abc/def//", "/abc/def/"),
        ("/a/b/c//", "/a/b/c/"),
        ("/abc//def//ghi", "/abc/def/ghi"),
        ("//abc", "/abc"),
        ("///abc", "/abc"),
        ("//abc//", "/abc/"),
        // Remove . elements
        (".", "/"),
        ("./", "/"),
        ("/abc/./def", "/abc/def"),
        ("/./abc/def", "/abc/def"),
        ("/abc/.", "/abc/"),
        // Remove .. elements
        ("..", "/"),
        ("../", "/"),
        ("../../", "/"),
        ("../..", "/"),
        ("../../abc", "/abc"),
        ("/abc/def/ghi/../jkl", "/abc/def/jkl"),
        ("/abc/def/../ghi/../jkl", "/abc/jkl"),
        ("/abc/def/..", "/abc"),
        ("/abc/def/../..", "/"),
        ("/abc/def/../../..", "/"),
        ("/abc/def/../../../ghi/jkl/../../../mno", "/mno"),
        // Combinations
        ("abc/./../def", "/def"),
        ("abc//./../def", "/def"),
        ("abc/../../././../def", "/def"),
        ("/a/../b//c/./", "/b/c/"),
    ];

    for (input, want) in cases {
        assert_eq!(clean_path(input), want, "clean_path({:?})", input);
        // Idempotence: cleaning a clean path is a no-op.
        assert_eq!(clean_path(want), want, "clean_path({:?})", want);
    }
}

#[test]
fn test_clean_path_borrows_when_clean() {
    use std::borrow::Cow;

    for clean in ["/", "/abc", "/a/b/c", "/abc/", "/a/b/c/"] {
        match clean_path(clean) {
            Cow::Borrowed(s) => assert_eq!(s, clean),
            Cow::Owned(s) => panic!("clean_path({:?}) allocated {:?}", clean, s),
        }
    }
}

#[test]
fn test_clean_path_long_inputs() {
    for i in 1..=1234 {
        let ss = "a".repeat(i);
        let correct = format!("/{}", ss);
        assert_eq!(clean_path(&correct), correct);
        assert_eq!(clean_path(&ss), correct);
        assert_eq!(clean_path(&format!("//{}", ss)), correct);
        assert_eq!(clean_path(&format!("/{}/b/..", ss)), correct);
    }
}

#[test]
fn test_tree_add_and_get() {
    let root = tree(&[
        "/hi",
        "/contact",
        "/co",
        "/c",
        "/a",
        "/ab",
        "/doc/",
        "/doc/go_faq.html",
        "/doc/go1.html",
    ]);

    assert_match(&root, "/a", "/a", &[]);
    assert_match(&root, "/hi", "/hi", &[]);
    assert_match(&root, "/contact", "/contact", &[]);
    assert_match(&root, "/co", "/co", &[]);
    assert_match(&root, "/ab", "/ab", &[]);
    assert_match(&root, "/doc/go_faq.html", "/doc/go_faq.html", &[]);

    assert_no_match(&root, "/", false);
    assert_no_match(&root, "/con", false); // key mismatch
    assert_no_match(&root, "/cona", false); // key mismatch
    assert_no_match(&root, "/no", false); // no matching child
}

#[test]
fn test_tree_wildcard() {
    let root = tree(&[
        "/",
        "/cmd/:tool/:sub",
        "/cmd/:tool/",
        "/src/*filepath",
        "/search/",
        "/search/:query",
        "/user_:name",
        "/user_:name/about",
        "/doc/",
        "/doc/go_faq.html",
        "/doc/go1.html",
    ]);

    assert_match(&root, "/", "/", &[]);
    assert_match(&root, "/cmd/test/", "/cmd/:tool/", &[("tool", "test")]);
    assert_match(
        &root,
        "/cmd/test/3",
        "/cmd/:tool/:sub",
        &[("tool", "test"), ("sub", "3")],
    );
    assert_match(
        &root,
        "/src/some/file.png",
        "/src/*filepath",
        &[("filepath", "/some/file.png")],
    );
    assert_match(&root, "/search/", "/search/", &[]);
    assert_match(
        &root,
        "/search/someth!ng+in+ünìcodé",
        "/search/:query",
        &[("query", "someth!ng+in+ünìcodé")],
    );
    assert_match(&root, "/user_gopher", "/user_:name", &[("name", "gopher")]);
    assert_match(
        &root,
        "/user_gopher/about",
        "/user_:name/about",
        &[("name", "gopher")],
    );

    assert_no_match(&root, "/cmd/test", true);
    assert_no_match(&root, "/search/someth!ng+in+ünìcodé/", true);
}

#[test]
fn test_canonical_route_table() {
    // The canonical pattern set exercised end to end.
    let root = tree(&[
        "/",
        "/hi",
        "/contact",
        "/co",
        "/doc/",
        "/doc/go1.html",
        "/search/:q",
        "/cmd/:tool/",
        "/cmd/:tool/:sub",
        "/src/*filepath",
        "/user_:name",
        "/user_:name/about",
    ]);

    let lookup = root.get_value("/");
    assert_eq!(lookup.handler.map(String::as_str), Some("/"));
    assert!(lookup.params.is_empty());
    assert!(!lookup.tsr);

    assert_match(&root, "/cmd/test/", "/cmd/:tool/", &[("tool", "test")]);
    assert_no_match(&root, "/cmd/test", true);
    assert_match(
        &root,
        "/cmd/test/3",
        "/cmd/:tool/:sub",
        &[("tool", "test"), ("sub", "3")],
    );
    assert_match(
        &root,
        "/src/some/file.png",
        "/src/*filepath",
        &[("filepath", "/some/file.png")],
    );
    assert_match(&root, "/search/něčo", "/search/:q", &[("q", "něčo")]);
    assert_match(
        &root,
        "/user_gopher/about",
        "/user_:name/about",
        &[("name", "gopher")],
    );
    assert_no_match(&root, "/doc", true);
    assert_no_match(&root, "/nope", false);

    assert_eq!(
        root.find_case_insensitive_path("/DOC/GO1.HTML", true),
        Some("/doc/go1.html".to_string())
    );
    assert_eq!(
        root.find_case_insensitive_path("/CO/", true),
        Some("/co".to_string())
    );
    assert_eq!(clean_path("/a/../b//c/./"), "/b/c/");
}

#[test]
fn test_insertion_order_independence() {
    let routes = [
        "/",
        "/hi",
        "/contact",
        "/co",
        "/doc/",
        "/doc/go1.html",
        "/search/:q",
        "/cmd/:tool/",
        "/cmd/:tool/:sub",
        "/src/*filepath",
        "/user_:name",
        "/user_:name/about",
    ];

    let mut reversed = routes;
    reversed.reverse();
    let mut interleaved: Vec<&str> = Vec::new();
    for i in 0..routes.len() {
        let j = if i % 2 == 0 { i / 2 } else { routes.len() - 1 - i / 2 };
        interleaved.push(routes[j]);
    }

    for permutation in [&routes[..], &reversed[..], &interleaved[..]] {
        let root = tree(permutation);
        assert_match(&root, "/cmd/test/", "/cmd/:tool/", &[("tool", "test")]);
        assert_match(
            &root,
            "/src/some/file.png",
            "/src/*filepath",
            &[("filepath", "/some/file.png")],
        );
        assert_match(&root, "/user_gopher", "/user_:name", &[("name", "gopher")]);
        assert_no_match(&root, "/cmd/test", true);
        assert_no_match(&root, "/doc", true);
        assert_no_match(&root, "/nope", false);
    }
}

#[test]
fn test_wildcard_conflicts() {
    // Wildcard-vs-wildcard disagreements.
    let cases: &[(&[&str], &str)] = &[
        (&["/cmd/:tool/:sub"], "/cmd/:t/:sub"),
        (&["/search/:query"], "/search/:q"),
        (&["/src/*filepath"], "/src/*filepathx"),
        (&["/src/*filepath"], "/src/:query"),
        (&["/cmd/:tool"], "/cmd/*rest"),
    ];

    for (routes, conflicting) in cases {
        let mut root = tree(routes);
        assert_eq!(
            root.add_route(conflicting, conflicting.to_string()),
            Err(InsertError::WildcardConflict {
                pattern: conflicting.to_string()
            }),
            "inserting '{}' into {:?}",
            conflicting,
            routes
        );
        root.check_invariants();
    }
}

#[test]
fn test_child_conflicts() {
    // Static and wildcard forms colliding at the same position, in both
    // directions.
    let cases: &[(&[&str], &str)] = &[
        (&["/cmd/:tool/:sub"], "/cmd/vet"),
        (&["/search/:query"], "/search/invalid"),
        (&["/user_:name"], "/user_x"),
        (&["/user_x"], "/user_:name"),
        (&["/user/:x"], "/user/new"),
        (&["/user/new"], "/user/:x"),
        (&["/cmd/vet"], "/cmd/:tool/:sub"),
        (&["/src/AUTHORS"], "/src/*filepath"),
        (&["/src/*filepath"], "/src/AUTHORS"),
        (&["/id/:id"], "/id:id"),
        (&["/id:id"], "/id/:id"),
        (&["/hi", "/contact"], "/:id"),
        (&["/hi", "/contact"], "/*filepath"),
    ];

    for (routes, conflicting) in cases {
        let mut root = tree(routes);
        assert_eq!(
            root.add_route(conflicting, conflicting.to_string()),
            Err(InsertError::ChildConflict {
                pattern: conflicting.to_string()
            }),
            "inserting '{}' into {:?}",
            conflicting,
            routes
        );
        root.check_invariants();
    }
}

#[test]
fn test_duplicate_routes() {
    let routes = ["/", "/doc/", "/src/*filepath", "/search/:query", "/user_:name"];
    let mut root = Node::new();
    for route in routes {
        root.add_route(route, route.to_string()).unwrap();
        assert_eq!(
            root.add_route(route, route.to_string()),
            Err(InsertError::DuplicateHandler {
                pattern: route.to_string()
            }),
            "re-inserting '{}'",
            route
        );
    }
    root.check_invariants();

    // The duplicates must not have disturbed the original registrations.
    assert_match(&root, "/", "/", &[]);
    assert_match(&root, "/doc/", "/doc/", &[]);
    assert_match(
        &root,
        "/src/some/file.png",
        "/src/*filepath",
        &[("filepath", "/some/file.png")],
    );
    assert_match(&root, "/user_gopher", "/user_:name", &[("name", "gopher")]);
}

#[test]
fn test_empty_wildcard_name() {
    for route in ["/user:", "/user:/", "/cmd/:/", "/src/*"] {
        let mut root: Node<String> = Node::new();
        assert_eq!(
            root.add_route(route, route.to_string()),
            Err(InsertError::EmptyWildcardName {
                pattern: route.to_string()
            }),
            "inserting '{}'",
            route
        );
    }
}

#[test]
fn test_pattern_syntax_errors() {
    let mut root: Node<String> = Node::new();

    assert_eq!(
        root.add_route("noslash", "x".to_string()),
        Err(InsertError::MissingLeadingSlash {
            pattern: "noslash".to_string()
        })
    );
    assert_eq!(
        root.add_route("/src/*filepath/x", "x".to_string()),
        Err(InsertError::CatchAllNotAtEnd {
            pattern: "/src/*filepath/x".to_string()
        })
    );
    assert_eq!(
        root.add_route("/*a/x", "x".to_string()),
        Err(InsertError::CatchAllNotAtEnd {
            pattern: "/*a/x".to_string()
        })
    );
    assert_eq!(
        root.add_route("/:a:b", "x".to_string()),
        Err(InsertError::MultipleWildcards {
            pattern: "/:a:b".to_string()
        })
    );
    assert_eq!(
        root.add_route("/x/:a*b", "x".to_string()),
        Err(InsertError::MultipleWildcards {
            pattern: "/x/:a*b".to_string()
        })
    );
    // No '/' of its own in front of the catch-all.
    assert_eq!(
        root.add_route("/src*files", "x".to_string()),
        Err(InsertError::CatchAllRootConflict {
            pattern: "/src*files".to_string()
        })
    );
}

#[test]
fn test_catch_all_root_conflict() {
    let mut root = tree(&["/src/"]);
    assert_eq!(
        root.add_route("/src/*filepath", "x".to_string()),
        Err(InsertError::CatchAllRootConflict {
            pattern: "/src/*filepath".to_string()
        })
    );
    root.check_invariants();

    // A sibling segment root without a handler is fine.
    let mut root = tree(&["/src2/x"]);
    assert_eq!(
        root.add_route("/src2/*filepath", "x".to_string()),
        Err(InsertError::ChildConflict {
            pattern: "/src2/*filepath".to_string()
        })
    );
    root.check_invariants();
}

#[test]
fn test_failed_insert_leaves_tree_intact() {
    let routes = [
        "/",
        "/cmd/:tool/",
        "/src/*filepath",
        "/search/:query",
        "/user_:name",
    ];
    let mut root = tree(&routes);

    let failures = [
        "/cmd/vet",
        "/src/*other",
        "/search/:q",
        "/user_x",
        "/",
        "/src/",
        "noslash",
        "/x/:a:b",
    ];
    for failure in failures {
        assert!(
            root.add_route(failure, failure.to_string()).is_err(),
            "expected '{}' to be rejected",
            failure
        );
    }

    // Every structural invariant still holds and the original routes still
    // resolve exactly as before.
    root.check_invariants();
    assert_match(&root, "/", "/", &[]);
    assert_match(&root, "/cmd/test/", "/cmd/:tool/", &[("tool", "test")]);
    assert_match(
        &root,
        "/src/some/file.png",
        "/src/*filepath",
        &[("filepath", "/some/file.png")],
    );
    assert_match(&root, "/search/abc", "/search/:query", &[("query", "abc")]);
    assert_match(&root, "/user_gopher", "/user_:name", &[("name", "gopher")]);
}

#[test]
fn test_trailing_slash_redirect() {
    let root = tree(&[
        "/hi",
        "/b/",
        "/search/:query",
        "/cmd/:tool/",
        "/x",
        "/x/y",
        "/y/",
        "/y/z",
        "/0/:id",
        "/0/:id/1",
        "/1/:id/",
        "/1/:id/2",
        "/aa",
        "/a/",
        "/doc",
        "/doc/go_faq.html",
        "/doc/go1.html",
        "/no/a",
        "/no/b",
    ]);

    let tsr_paths = [
        "/hi/",
        "/b",
        "/search/gopher/",
        "/cmd/vet",
        "/x/",
        "/y",
        "/0/go/",
        "/1/go",
        "/a",
        "/doc/",
    ];
    for path in tsr_paths {
        assert_no_match(&root, path, true);
    }

    let no_tsr_paths = ["/", "/no", "/no/", "/_", "/_/"];
    for path in no_tsr_paths {
        assert_no_match(&root, path, false);
    }
}

#[test]
fn test_tsr_for_catch_all_segment_root() {
    // "/src/" would match the catch-all with "/" captured, so "/src" gets a
    // trailing-slash recommendation.
    let root = tree(&["/src/*filepath"]);
    assert_no_match(&root, "/src", true);

    // Same when the segment root is a split node without a handler.
    let root = tree(&["/src1", "/src2", "/src/*filepath"]);
    assert_no_match(&root, "/src", true);
}

#[test]
fn test_tsr_at_wildcard_parent_requires_route() {
    // "/ab" terminates a route, so "/ab/" is redirectable.
    let root = tree(&["/ab", "/ab/:z"]);
    assert_no_match(&root, "/ab/", true);

    // Here "/ab" is only a split point without a handler; no redirect.
    let root = tree(&["/abc", "/abd", "/ab/:z"]);
    assert_no_match(&root, "/ab/", false);
}

#[test]
fn test_catch_all_matches_bare_slash() {
    let root = tree(&["/src/*filepath"]);
    assert_match(&root, "/src/", "/src/*filepath", &[("filepath", "/")]);
    assert_match(&root, "/src/x", "/src/*filepath", &[("filepath", "/x")]);
}

#[test]
fn test_root_catch_all() {
    let root = tree(&["/*everything"]);
    assert_match(&root, "/", "/*everything", &[("everything", "/")]);
    assert_match(
        &root,
        "/a/b/c",
        "/*everything",
        &[("everything", "/a/b/c")],
    );
}

#[test]
fn test_duplicate_param_names_capture_twice() {
    let root = tree(&["/:id/versions/:id"]);
    let lookup = root.get_value("/a/versions/b");
    assert!(lookup.handler.is_some());
    let captured: Vec<(&str, &str)> = lookup.params.iter().map(|p| (p.key, p.value)).collect();
    assert_eq!(captured, [("id", "a"), ("id", "b")]);
    // First match wins on keyed access.
    assert_eq!(lookup.params.get("id"), Some("a"));
}

#[test]
fn test_param_values_keep_unicode_intact() {
    let root = tree(&["/search/:query"]);
    assert_match(
        &root,
        "/search/someth!ng+in+ünìcodé",
        "/search/:query",
        &[("query", "someth!ng+in+ünìcodé")],
    );
}

#[test]
fn test_multibyte_prefix_split() {
    // "é" and "è" share their first UTF-8 byte, so the edge splits inside
    // the character; captures and matches must stay intact.
    let root = tree(&["/é/x", "/è/y"]);
    assert_match(&root, "/é/x", "/é/x", &[]);
    assert_match(&root, "/è/y", "/è/y", &[]);
    assert_no_match(&root, "/é/y", false);
}

#[test]
fn test_find_case_insensitive_path() {
    let root = tree(&[
        "/hi",
        "/b/",
        "/ABC/",
        "/search/:query",
        "/cmd/:tool/",
        "/src/*filepath",
        "/x",
        "/x/y",
        "/y/",
        "/y/z",
        "/doc",
        "/doc/go_faq.html",
        "/doc/go1.html",
    ]);

    // Exact-case inputs come back unchanged.
    for (path, fixed) in [
        ("/hi", "/hi"),
        ("/b/", "/b/"),
        ("/ABC/", "/ABC/"),
        ("/search/rustaceans", "/search/rustaceans"),
        ("/doc/go1.html", "/doc/go1.html"),
    ] {
        assert_eq!(
            root.find_case_insensitive_path(path, true).as_deref(),
            Some(fixed)
        );
    }

    // Wrong-case inputs are respelled; captures keep the client's case.
    for (path, fixed) in [
        ("/HI", "/hi"),
        ("/B/", "/b/"),
        ("/abc/", "/ABC/"),
        ("/DOC/GO1.HTML", "/doc/go1.html"),
        ("/SEARCH/QUERY", "/search/QUERY"),
        ("/CMD/TOOL/", "/cmd/TOOL/"),
        ("/SRC/FILE/PATH", "/src/FILE/PATH"),
    ] {
        assert_eq!(
            root.find_case_insensitive_path(path, true).as_deref(),
            Some(fixed),
            "correcting '{}'",
            path
        );
    }

    // With slash fixing, a toggled trailing slash is healed too.
    for (path, fixed) in [
        ("/HI/", "/hi"),
        ("/B", "/b/"),
        ("/DOC/", "/doc"),
        ("/CMD/TOOL", "/cmd/TOOL/"),
    ] {
        assert_eq!(
            root.find_case_insensitive_path(path, true).as_deref(),
            Some(fixed),
            "correcting '{}'",
            path
        );
    }

    // Without slash fixing those same paths fail.
    for path in ["/HI/", "/B", "/DOC/"] {
        assert_eq!(root.find_case_insensitive_path(path, false), None);
    }

    assert_eq!(root.find_case_insensitive_path("/nope", true), None);
}

#[test]
fn test_find_case_insensitive_path_multibyte() {
    let root = tree(&["/münchen", "/über/:id"]);
    assert_eq!(
        root.find_case_insensitive_path("/MÜNCHEN", true).as_deref(),
        Some("/münchen")
    );
    assert_eq!(
        root.find_case_insensitive_path("/ÜBER/42", true).as_deref(),
        Some("/über/42")
    );
}

#[test]
fn test_priority_orders_siblings_by_route_count() {
    // The /user subtree carries more routes than /admin, so its branch must
    // be scanned first.
    let root = tree(&[
        "/admin",
        "/user/a",
        "/user/b",
        "/user/c",
        "/user/d",
    ]);
    root.check_invariants();
    assert_match(&root, "/user/c", "/user/c", &[]);
    assert_match(&root, "/admin", "/admin", &[]);
}

#[test]
fn test_router_per_method_trees() {
    let mut router: Router<String> = Router::new();
    router.get("/items", "get_items".to_string()).unwrap();
    router.post("/items", "create_item".to_string()).unwrap();

    let get = router.lookup(&Method::GET, "/items");
    assert_eq!(get.handler.map(String::as_str), Some("get_items"));

    let post = router.lookup(&Method::POST, "/items");
    assert_eq!(post.handler.map(String::as_str), Some("create_item"));

    let put = router.lookup(&Method::PUT, "/items");
    assert!(put.handler.is_none());
    assert!(!put.tsr);
}

#[test]
fn test_router_custom_methods() {
    let mut router: Router<String> = Router::new();
    let purge = Method::from_bytes(b"PURGE").unwrap();
    let notify = Method::from_bytes(b"NOTIFY").unwrap();
    router
        .handle(purge.clone(), "/cache", "purge_cache".to_string())
        .unwrap();
    router
        .handle(notify.clone(), "/cache", "notify_cache".to_string())
        .unwrap();

    let lookup = router.lookup(&purge, "/cache");
    assert_eq!(lookup.handler.map(String::as_str), Some("purge_cache"));

    // Custom methods enumerate after standard ones, in registration order.
    assert_eq!(router.allowed("/cache", &Method::GET), "PURGE, NOTIFY, OPTIONS");
}

#[test]
fn test_router_registration_errors_surface() {
    let mut router: Router<String> = Router::new();
    router.get("/user/:id", "get_user".to_string()).unwrap();
    assert_eq!(
        router.get("/user/new", "new_user".to_string()),
        Err(InsertError::ChildConflict {
            pattern: "/user/new".to_string()
        })
    );
    // The same pattern is fine on a different method's tree.
    router.post("/user/new", "new_user".to_string()).unwrap();
}
