//! Path matching and building through the router

mod common;

use common::*;
use navigator_core::*;

#[test]
fn test_match_nested_route() {
    let router = router();
    let state = router.match_path("/orders/view/12", None).unwrap();

    assert_eq!(state.name, "orders.view");
    assert_eq!(state.params.get("id"), Some("12"));
    let meta = state.meta.unwrap();
    assert!(meta.params["orders"].is_empty());
    assert_eq!(meta.params["orders.view"]["id"], ParamSource::Url);
}

#[test]
fn test_constraint_rejects_path() {
    let router = router();
    assert!(router.match_path("/orders/view/abc", None).is_none());
}

#[test]
fn test_match_parent_route() {
    let router = router();
    assert_eq!(router.match_path("/users", None).unwrap().name, "users");
    assert_eq!(router.match_path("/users/", None).unwrap().name, "users");
}

#[test]
fn test_percent_decoding() {
    let router = router();
    let state = router.match_path("/users/view/a%20b", None).unwrap();
    assert_eq!(state.params.get("id"), Some("a b"));
    assert_eq!(router.build_path("users.view", &state.params).unwrap(), "/users/view/a%20b");
}

#[test]
fn test_query_params() {
    let router = router();
    let state = router.match_path("/search?q=rust&page=3", None).unwrap();

    assert_eq!(state.params.get("q"), Some("rust"));
    assert_eq!(state.params.get_as::<u32>("page"), Some(3));
    assert_eq!(
        state.meta.unwrap().params["search"]["q"],
        ParamSource::Query
    );
}

#[test]
fn test_strict_query_params() {
    let router = router();
    assert!(router.match_path("/users/list?sort=asc", None).is_none());

    router.set_option(RouterOption::StrictQueryParams(false));
    let state = router.match_path("/users/list?sort=asc", None).unwrap();
    assert_eq!(state.params.get("sort"), Some("asc"));
}

#[test]
fn test_trailing_slash_never() {
    let router = router_with(RouterOptions::new().trailing_slash(TrailingSlash::Never));
    assert!(router.match_path("/users/list/", None).is_none());
    assert_eq!(router.match_path("/users/list", None).unwrap().path, "/users/list");
}

#[test]
fn test_trailing_slash_always() {
    let router = router_with(RouterOptions::new().trailing_slash(TrailingSlash::Always));
    assert!(router.match_path("/users/list", None).is_none());
    assert_eq!(router.match_path("/users/list/", None).unwrap().path, "/users/list/");
    assert_eq!(
        router.build_path("users.list", &RouteParams::new()).unwrap(),
        "/users/list/"
    );
}

#[test]
fn test_case_sensitivity() {
    let router = router();
    assert_eq!(router.match_path("/USERS/List", None).unwrap().name, "users.list");

    router.set_option(RouterOption::CaseSensitive(true));
    assert!(router.match_path("/USERS/List", None).is_none());
}

#[test]
fn test_weak_matching() {
    let router = router();
    router.add([RouteDef::new("docs", "/docs")]).unwrap();
    assert!(router.match_path("/docsearch", None).is_none());

    router.set_option(RouterOption::StrongMatching(false));
    router.add_node("docs.page", "earch", None).unwrap();
    assert_eq!(router.match_path("/docsearch", None).unwrap().name, "docs.page");
}

#[test]
fn test_root_path_query() {
    let router = router();
    router.set_root_path("?lang").unwrap();

    let state = router.match_path("/users/list?lang=fr", None).unwrap();
    assert_eq!(state.name, "users.list");
    assert_eq!(state.params.get("lang"), Some("fr"));

    let path = router
        .build_path("users.view", &RouteParams::from([("id", "1"), ("lang", "de")]))
        .unwrap();
    assert_eq!(path, "/users/view/1?lang=de");
}

#[test]
fn test_splat() {
    let router = router();
    router.add([RouteDef::new("files", "/files/*path")]).unwrap();

    let state = router.match_path("/files/a/b/c.txt", None).unwrap();
    assert_eq!(state.params.get("path"), Some("a/b/c.txt"));
}

#[test]
fn test_not_found_state() {
    let router = router_with(RouterOptions::new().allow_not_found(true));
    let state = router.match_path("/missing/page", Some("popstate")).unwrap();

    assert!(state.is_not_found());
    assert_eq!(state.path, "/missing/page");
    assert_eq!(router.make_not_found_state("/missing/page"), state);
}

#[test]
fn test_build_state() {
    let router = router();
    let state = router
        .build_state("users.view", &RouteParams::from([("id", "9")]))
        .unwrap();

    assert_eq!(state.path, "/users/view/9");
    assert!(state.meta.unwrap().params.contains_key("users.view"));
    assert_eq!(
        router.build_state("nope", &RouteParams::new()).unwrap_err().code(),
        ErrorCode::RouteNotFound
    );
}

#[test]
fn test_definition_errors() {
    let router = router();

    assert!(matches!(
        router.add([RouteDef::new("users", "/people")]),
        Err(RouteDefinitionError::DuplicateName { .. })
    ));
    assert!(matches!(
        router.add([RouteDef::new("ghost.page", "/page")]),
        Err(RouteDefinitionError::MissingParent { .. })
    ));
    assert!(matches!(
        router.add([RouteDef::new("people", "/users")]),
        Err(RouteDefinitionError::DuplicatePath { .. })
    ));

    // A failing batch registers nothing.
    let result = router.add([
        RouteDef::new("about", "/about"),
        RouteDef::new("broken", "/:id<[>"),
    ]);
    assert!(matches!(result, Err(RouteDefinitionError::MalformedPath { .. })));
    assert!(router.match_path("/about", None).is_none());
}

#[cfg(feature = "cache")]
#[test]
fn test_match_cache_hits() {
    let router = router();
    router.match_path("/users/list", None);
    router.match_path("/users/list", None);

    let stats = router.cache_stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);

    router.set_option(RouterOption::CaseSensitive(true));
    assert_eq!(router.cache_stats().invalidations, stats.invalidations + 1);
}

/// Build every registered route with `values` and match the result again.
fn assert_routes_round_trip(router: &Router, extra: &[(&str, &str)]) {
    const VALUES: &[&str] = &[
        "42", "a b", "a!b", "x(1)", "[x]", "a,b;c", "^\\", "a/b", "100%", "1+1=2", "k&v", "né",
    ];

    let tree = router.tree();
    for name in tree.route_names() {
        let keys: Vec<&str> = tree
            .segments(&name)
            .unwrap()
            .into_iter()
            .flat_map(|node| {
                let query = node.path().query_params().iter().map(String::as_str);
                node.path().url_params().chain(query)
            })
            .collect();

        let mut built_any = false;
        for value in VALUES {
            let mut route_params: RouteParams = keys.iter().map(|key| (*key, *value)).collect();
            for (key, extra_value) in extra {
                route_params.insert(*key, *extra_value);
            }

            let built = match router.build_state(&name, &route_params) {
                Ok(state) => state,
                Err(RouterError::InvalidParameter { .. }) => continue,
                Err(error) => panic!("{name} with {value:?}: {error}"),
            };
            built_any = true;

            let matched = router
                .match_path(&built.path, None)
                .unwrap_or_else(|| panic!("{name}: '{}' does not match", built.path));
            assert!(
                router.are_states_equal(&built, &matched, false),
                "{name}: {built:?} != {matched:?}"
            );
        }
        assert!(built_any, "{name} was never built");
    }
}

#[test]
fn test_every_route_round_trips() {
    let router = router();
    router.add([RouteDef::new("files", "/files/*path")]).unwrap();
    assert_routes_round_trip(&router, &[]);
}

#[test]
fn test_every_route_round_trips_with_undeclared_query() {
    let router = router_with(RouterOptions::new().strict_query_params(false));
    router.add([RouteDef::new("files", "/files/*path")]).unwrap();
    assert_routes_round_trip(&router, &[("ref", "x y&z"), ("utm", "a=b")]);
}

#[test]
fn test_reserved_characters_in_params() {
    let router = router();
    for id in ["a!b", "x(1)", "[x]"] {
        let path = router.build_path("users.view", &params(&[("id", id)])).unwrap();
        assert!(!path.contains(id), "{path}");
        assert_eq!(router.match_path(&path, None).unwrap().params.get("id"), Some(id));
    }
    assert!(matches!(
        router.build_path("orders.view", &params(&[("id", "x(1)")])),
        Err(RouterError::InvalidParameter { .. })
    ));
}
