use libreg_types::{GroupKey, LibraryName, ToolName};

use crate::error::{RegistrarError, Step};
use crate::recording::{Call, RecordingEnvironment};
use crate::registrar::{Registrar, apply, module_available};
use crate::spec::DependencySpec;

static EVTBIN_DEPS: &[&str] = &[
    "astroLib",
    "st_appLib",
    "st_facilitiesLib",
    "st_streamLib",
    "tipLib",
];

fn evtbin() -> DependencySpec {
    DependencySpec::builder()
        .library("evtbin")
        .dependencies(EVTBIN_DEPS)
        .build()
        .unwrap()
}

fn lib(name: &str) -> LibraryName {
    LibraryName::new(name).unwrap()
}

fn tool(name: &str) -> Call {
    Call::ApplyTool(ToolName::new(name).unwrap())
}

fn group(name: &str) -> GroupKey {
    GroupKey::new(name).unwrap()
}

fn healpix_env() -> RecordingEnvironment {
    RecordingEnvironment::new().with_group(
        group("healpixlibs"),
        vec![lib("healpix_cxx"), lib("cxxsupport")],
    )
}

#[test]
fn registers_library_then_tools_in_order() {
    let mut env = RecordingEnvironment::new();
    let applied = Registrar.apply(&evtbin(), &mut env, false).unwrap();

    let mut expected = vec![Call::RegisterLibrary(lib("evtbin"))];
    expected.extend(EVTBIN_DEPS.iter().map(|name| tool(name)));
    assert_eq!(env.calls(), &expected[..]);

    assert!(applied.registered_library);
    assert_eq!(applied.tools, 5);
    assert_eq!(applied.groups, 0);
}

#[test]
fn revised_order_is_preserved() {
    let first = evtbin()
        .revise()
        .clear_dependencies()
        .dependencies([
            "astroLib",
            "st_appLib",
            "st_facilitiesLib",
            "st_streamLib",
            "tipLib",
            "healpixLib",
        ])
        .build()
        .unwrap();
    let second = first
        .revise()
        .clear_dependencies()
        .dependencies([
            "astroLib",
            "st_appLib",
            "st_facilitiesLib",
            "st_streamLib",
            "healpixLib",
            "tipLib",
        ])
        .build()
        .unwrap();
    assert_ne!(first, second);

    let mut env = RecordingEnvironment::new();
    Registrar.apply(&second, &mut env, false).unwrap();
    assert_eq!(
        env.calls(),
        [
            Call::RegisterLibrary(lib("evtbin")),
            tool("astroLib"),
            tool("st_appLib"),
            tool("st_facilitiesLib"),
            tool("st_streamLib"),
            tool("healpixLib"),
            tool("tipLib"),
        ]
    );
}

#[test]
fn deps_only_skips_registration() {
    let mut env = RecordingEnvironment::new();
    let applied = Registrar.apply(&evtbin(), &mut env, true).unwrap();

    let expected: Vec<_> = EVTBIN_DEPS.iter().map(|name| tool(name)).collect();
    assert_eq!(env.calls(), &expected[..]);
    assert!(!applied.registered_library);
}

#[test]
fn external_groups_always_run() {
    let spec = evtbin()
        .revise()
        .dependency("healpixLib")
        .external_group("healpixlibs")
        .build()
        .unwrap();

    for deps_only in [false, true] {
        let mut env = healpix_env();
        Registrar.apply(&spec, &mut env, deps_only).unwrap();

        let calls = env.calls();
        let n = calls.len();
        assert_eq!(calls[n - 2], Call::ResolveGroup(group("healpixlibs")));
        assert_eq!(
            calls[n - 1],
            Call::RegisterExternal(vec![lib("healpix_cxx"), lib("cxxsupport")])
        );
        assert_eq!(
            calls.contains(&Call::RegisterLibrary(lib("evtbin"))),
            !deps_only
        );
    }
}

#[test]
fn unresolved_group_stops_everything() {
    let spec = DependencySpec::builder()
        .library("evtbin")
        .dependency("tipLib")
        .external_group("nosuchgroup")
        .external_group("healpixlibs")
        .build()
        .unwrap();

    let mut env = healpix_env();
    let err = Registrar.apply(&spec, &mut env, false).unwrap_err();
    let RegistrarError::UnresolvedGroup { index, group: key } = &err else {
        panic!("unexpected error {err:?}");
    };
    assert_eq!(*index, 2);
    assert_eq!(*key, group("nosuchgroup"));

    // Nothing after the failed lookup ran.
    assert_eq!(
        env.calls(),
        [
            Call::RegisterLibrary(lib("evtbin")),
            tool("tipLib"),
            Call::ResolveGroup(group("nosuchgroup")),
        ]
    );
}

#[test]
fn register_happens_once_and_first() {
    let spec = DependencySpec::builder()
        .library("evtbin")
        .dependencies(["tipLib", "astroLib", "tipLib"])
        .build()
        .unwrap();
    let mut env = RecordingEnvironment::new();
    apply(&spec, &mut env, false).unwrap();

    let registrations: Vec<_> = env
        .calls()
        .iter()
        .enumerate()
        .filter(|(_, call)| matches!(call, Call::RegisterLibrary(_)))
        .map(|(idx, _)| idx)
        .collect();
    assert_eq!(registrations, [0]);
    // Repeated tools are passed through untouched.
    assert_eq!(env.calls().len(), 4);
    assert_eq!(env.calls()[3], tool("tipLib"));
}

#[test]
fn deterministic_across_fresh_environments() {
    let spec = evtbin()
        .revise()
        .external_group("healpixlibs")
        .build()
        .unwrap();

    let mut a = healpix_env();
    let mut b = healpix_env();
    Registrar.apply(&spec, &mut a, false).unwrap();
    Registrar.apply(&spec, &mut b, false).unwrap();
    assert_eq!(a.calls(), b.calls());
}

#[test]
fn missing_library_name_is_invalid() {
    let spec = evtbin().revise().without_library().build().unwrap();

    let mut env = RecordingEnvironment::new();
    let err = Registrar.apply(&spec, &mut env, false).unwrap_err();
    assert!(matches!(err, RegistrarError::InvalidSpec { .. }));
    assert!(env.calls().is_empty());

    // Without a name the spec still works for its dependencies.
    Registrar.apply(&spec, &mut env, true).unwrap();
    assert_eq!(env.calls().len(), EVTBIN_DEPS.len());
}

#[test]
fn tool_failure_aborts_the_rest() {
    let mut env = RecordingEnvironment::new().fail_on_tool(ToolName::new("st_appLib").unwrap());
    let err = Registrar.apply(&evtbin(), &mut env, false).unwrap_err();

    let RegistrarError::ToolApplicationFailed { index, step, source } = &err else {
        panic!("unexpected error {err:?}");
    };
    assert_eq!(*index, 2);
    assert_eq!(*step, Step::ApplyTool(ToolName::new("st_appLib").unwrap()));
    assert!(source.to_string().contains("st_appLib"));
    assert_eq!(
        env.calls(),
        [
            Call::RegisterLibrary(lib("evtbin")),
            tool("astroLib"),
            tool("st_appLib"),
        ]
    );
}

#[test]
fn register_failure_aborts_everything() {
    let mut env = RecordingEnvironment::new().fail_on_register();
    let err = Registrar.apply(&evtbin(), &mut env, false).unwrap_err();

    assert!(matches!(
        err,
        RegistrarError::ToolApplicationFailed {
            index: 0,
            step: Step::RegisterLibrary(_),
            ..
        }
    ));
    assert_eq!(env.calls().len(), 1);
    assert_eq!(
        err.to_string(),
        "step 0: failed registering library 'evtbin'"
    );
}

#[test]
fn resolve_failure_is_a_tool_failure() {
    let spec = DependencySpec::builder()
        .external_group("healpixlibs")
        .build()
        .unwrap();
    let mut env = healpix_env().fail_on_resolve();
    let err = Registrar.apply(&spec, &mut env, true).unwrap_err();

    assert!(matches!(
        err,
        RegistrarError::ToolApplicationFailed {
            index: 0,
            step: Step::ResolveGroup(_),
            ..
        }
    ));
}

#[test]
fn register_external_failure_aborts_the_rest() {
    let spec = DependencySpec::builder()
        .library("evtbin")
        .dependency("healpixLib")
        .external_group("healpixlibs")
        .external_group("otherlibs")
        .build()
        .unwrap();
    let mut env = healpix_env()
        .with_group(group("otherlibs"), vec![lib("fftpack")])
        .fail_on_register_external();
    let err = Registrar.apply(&spec, &mut env, false).unwrap_err();

    let RegistrarError::ToolApplicationFailed { index, step, .. } = &err else {
        panic!("unexpected error {err:?}");
    };
    assert_eq!(*index, 2);
    assert_eq!(*step, Step::RegisterExternal(group("healpixlibs")));

    // The second group is never resolved.
    assert_eq!(
        env.calls(),
        [
            Call::RegisterLibrary(lib("evtbin")),
            tool("healpixLib"),
            Call::ResolveGroup(group("healpixlibs")),
            Call::RegisterExternal(vec![lib("healpix_cxx"), lib("cxxsupport")]),
        ]
    );
}

#[test]
fn registrar_is_reusable() {
    let registrar = Registrar;
    let tip = DependencySpec::builder().library("tip").build().unwrap();

    let mut env = RecordingEnvironment::new();
    registrar.apply(&evtbin(), &mut env, true).unwrap();
    registrar.apply(&tip, &mut env, false).unwrap();
    assert_eq!(
        env.calls().last(),
        Some(&Call::RegisterLibrary(lib("tip")))
    );
}

#[test]
fn smoketest_module_available() {
    assert!(module_available());
}
