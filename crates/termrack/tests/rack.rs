//! End-to-end rack runs: application mode, command mode and the boundary.

use insta::assert_snapshot;
use termrack::{
    Candidate, Descriptor, HandlerResult, Metadata, MiddlewareDescriptor, Next, OutputMode,
    Placement, PlacementPolicy, Rack, Request, Response, Signature, TypeShape, write_response,
};

fn my_app(request: &mut Request) -> Response {
    Response::with_output(format!(
        "Hello from MyApp!  You passed: {}",
        request.arguments.join(", ")
    ))
}

fn version(request: &mut Request, next: &Next) -> HandlerResult {
    if request.has_flag(&["-v", "--version"]) {
        return Ok(Response::with_output("MyApp version 1.0.5.9"));
    }
    next.invoke(request)
}

fn header_and_footer(request: &mut Request, next: &Next) -> HandlerResult {
    Ok(next
        .invoke(request)?
        .prepend("[My App]\n==========\n")
        .append("==========\nCopyright (c) 2010 Some Cool Guys, Inc.\n"))
}

fn my_app_rack() -> Rack {
    Rack::builder()
        .middleware(
            MiddlewareDescriptor::new(header_and_footer)
                .named("header")
                .with_placement(Placement::last()),
        )
        .middleware(MiddlewareDescriptor::new(version).named("version"))
        .application(Descriptor::application(my_app))
        .exit_on_finish(false)
        .build()
}

// =============================================================================
// Application mode
// =============================================================================

#[test]
fn test_application_wrapped_by_header_and_footer() {
    let response = my_app_rack().run(["foo", "bar"]).unwrap();
    assert_snapshot!(response.output, @r"
    [My App]
    ==========
    Hello from MyApp!  You passed: foo, bar
    ==========
    Copyright (c) 2010 Some Cool Guys, Inc.
    ");
}

#[test]
fn test_version_short_circuits_before_banner() {
    // `header` is pinned last, so `version` heads the chain and answers alone.
    let response = my_app_rack().run(["--version"]).unwrap();
    assert_eq!(response.output, "MyApp version 1.0.5.9\n");
}

#[test]
fn test_each_run_is_independent() {
    let rack = my_app_rack();
    let first = rack.run(["-v"]).unwrap();
    let second = rack.run(["x"]).unwrap();
    assert!(first.output.contains("version 1.0.5.9"));
    assert!(second.output.contains("You passed: x"));
}

#[test]
fn test_data_flows_from_middleware_to_application() {
    let rack = Rack::builder()
        .middleware(MiddlewareDescriptor::new(
            |request: &mut Request, next: &Next| {
                request.data.insert("user", "ada".to_string());
                next.invoke(request)
            },
        ))
        .application(Descriptor::application(|request: &mut Request| {
            let user = request.data.get::<String>("user").cloned().unwrap_or_default();
            Response::with_output(format!("hi {}", user))
        }))
        .build();

    assert_eq!(rack.run(Vec::<String>::new()).unwrap().output, "hi ada\n");
}

#[test]
fn test_error_policy_surfaces_missing_target() {
    let rack = Rack::builder()
        .application(Descriptor::application(my_app))
        .middleware(
            MiddlewareDescriptor::new(version)
                .named("version")
                .with_placement(Placement::after("auth")),
        )
        .placement_policy(PlacementPolicy::Error)
        .build();

    let err = rack.run(["x"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "middleware 'version' must be placed after 'auth', which is not registered"
    );
}

// =============================================================================
// Candidates
// =============================================================================

#[test]
fn test_invalid_candidates_are_excluded() {
    let rack = Rack::builder()
        .candidate_application(Candidate::new(Signature::terminal("demo::app"), my_app))
        .candidate_middleware(Candidate::new(
            Signature::new("demo::broken", vec![TypeShape::Request], TypeShape::Response),
            version,
        ))
        .build();

    let handlers = rack.handlers();
    assert_eq!(handlers.middleware.len(), 0);
    assert_eq!(handlers.rejected.len(), 1);
    assert_eq!(handlers.rejected[0].identifier, "demo::broken");
    assert_eq!(rack.run(["ok"]).unwrap().output, "Hello from MyApp!  You passed: ok\n");
}

// =============================================================================
// Command mode
// =============================================================================

fn echo(name: &str, description: Option<&str>) -> Descriptor {
    let owned = name.to_string();
    let mut metadata = Metadata::new().name(name);
    if let Some(description) = description {
        metadata = metadata.description(description);
    }
    Descriptor::command(move |request: &mut Request| {
        Response::with_output(format!("{} {}", owned, request.arguments.join(" ")))
    })
    .with_metadata(metadata)
}

fn command_rack() -> Rack {
    Rack::builder()
        .command(echo("status", Some("Show status")))
        .command(echo("start", Some("Start the service")))
        .command(echo("list", None))
        .middleware(MiddlewareDescriptor::new(version).named("version"))
        .exit_on_finish(false)
        .build()
}

#[test]
fn test_dispatch_by_prefix() {
    let rack = command_rack();
    assert_eq!(rack.dispatch(["l", "-a"]).unwrap().output, "list -a\n");
    assert_eq!(rack.dispatch(["stat"]).unwrap().output, "status \n");
}

#[test]
fn test_dispatch_runs_middleware() {
    let rack = command_rack();
    assert_eq!(
        rack.dispatch(["list", "--version"]).unwrap().output,
        "MyApp version 1.0.5.9\n"
    );
}

#[test]
fn test_dispatch_ambiguous_and_unknown() {
    let rack = command_rack();

    let ambiguous = rack.dispatch(["st"]).unwrap();
    assert_eq!(ambiguous.exit_code, 1);
    assert_eq!(
        ambiguous.error,
        "ambiguous command 'st'; did you mean one of: start, status?\n"
    );

    let unknown = rack.dispatch(["deploy"]).unwrap();
    assert_eq!(unknown.exit_code, 1);
    assert_eq!(unknown.error, "unknown command 'deploy'\n");
}

#[test]
fn test_dispatch_without_arguments_lists_commands() {
    let listing = command_rack().dispatch(Vec::<String>::new()).unwrap();
    assert_snapshot!(listing.output, @r"
    Available commands:
      status  Show status
      start   Start the service
      list
    ");
}

#[test]
fn test_dispatch_default_command() {
    let rack = Rack::builder()
        .command(echo("status", None))
        .default_command("status")
        .build();
    assert_eq!(rack.dispatch(Vec::<String>::new()).unwrap().output, "status \n");
}

// =============================================================================
// Boundary
// =============================================================================

fn written(rack: &Rack, arguments: &[&str]) -> (String, String, i32) {
    let response = rack.respond(arguments.iter().copied());
    let (mut out, mut err) = (Vec::new(), Vec::new());
    write_response(&response, rack.config().output_mode, &mut out, &mut err).unwrap();
    (
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
        response.exit_code,
    )
}

#[test]
fn test_respond_in_command_mode() {
    let rack = command_rack();
    assert_eq!(written(&rack, &["list"]), ("list \n".into(), String::new(), 0));
    assert_eq!(
        written(&rack, &["nope"]),
        (String::new(), "unknown command 'nope'\n".into(), 1)
    );
}

#[test]
fn test_handler_error_written_as_json() {
    let rack = Rack::builder()
        .application(Descriptor::application(|_request: &mut Request| {
            Err::<Response, _>(anyhow::anyhow!("disk full"))
        }))
        .output_mode(OutputMode::Json)
        .exit_on_finish(false)
        .build();

    let (out, err, code) = written(&rack, &["x"]);
    assert_eq!(code, 1);
    assert!(err.is_empty());

    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["error"], "error: disk full\n");
    assert_eq!(parsed["exit_code"], 1);
}

#[test]
fn test_execute_returns_exit_code() {
    let rack = Rack::builder()
        .application(Descriptor::application(|_request: &mut Request| {
            Response::new().exit_code(3)
        }))
        .exit_on_finish(false)
        .build();
    assert_eq!(rack.execute(Vec::<String>::new()), 3);
}
