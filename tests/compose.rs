// ABOUTME: Integration tests for eager composition onto a shared target.
// ABOUTME: Covers grafting, override precedence, chaining, conflicts, and constructor failures.

use graft::compose::{ComposeError, ComposeOptions, Composer, ConflictPolicy, compose};
use graft::def::TraitDef;
use graft::target::Target;
use graft::types::TypeName;
use serde_json::{Value, json};
use std::sync::Arc;

fn record() -> Target {
    Target::new(TypeName::new("host.Record").unwrap())
}

fn greeter() -> Arc<TraitDef> {
    TraitDef::builder("Greeter")
        .method("greet", |cx, _args| {
            let name = cx.get("name")?;
            let name = name.as_str().unwrap_or_default();
            Ok(json!(format!("hello, {name}")))
        })
        .constructor(|cx, args| {
            cx.set("name", args.first().cloned().unwrap_or(Value::Null));
            Ok(())
        })
        .build()
        .unwrap()
}

#[test]
fn greeter_scenario() {
    let target = record();
    compose(&target, &greeter(), &[json!("Ada")]).unwrap();

    assert_eq!(target.call("greet", &[]).unwrap(), json!("hello, Ada"));
}

#[test]
fn compose_returns_the_same_target() {
    let target = record();
    let composed = compose(&target, &greeter(), &[json!("Ada")]).unwrap();
    assert!(target.ptr_eq(&composed));
}

#[test]
fn ancestor_members_are_grafted() {
    let base = TraitDef::builder("Base")
        .data("one", json!("one"))
        .method("four", |_cx, _args| Ok(json!("four")))
        .build()
        .unwrap();
    let derived = TraitDef::builder("Derived").parent(&base).build().unwrap();

    let target = record();
    compose(&target, &derived, &[]).unwrap();

    assert_eq!(target.get("one").unwrap(), json!("one"));
    assert_eq!(target.call("four", &[]).unwrap(), json!("four"));
}

#[test]
fn derived_members_shadow_ancestors() {
    let base = TraitDef::builder("Base")
        .method("label", |_cx, _args| Ok(json!("base")))
        .data("margin", 20)
        .build()
        .unwrap();
    let derived = TraitDef::builder("Derived")
        .parent(&base)
        .method("label", |_cx, _args| Ok(json!("derived")))
        .data("margin", 50)
        .build()
        .unwrap();

    let target = record();
    compose(&target, &derived, &[]).unwrap();

    assert_eq!(target.call("label", &[]).unwrap(), json!("derived"));
    assert_eq!(target.get("margin").unwrap(), json!(50));
}

#[test]
fn chained_composition_unions_members_with_last_wins() {
    let t1 = TraitDef::builder("First")
        .data("shared", json!("first"))
        .data("only_first", 1)
        .build()
        .unwrap();
    let t2 = TraitDef::builder("Second")
        .data("shared", json!("second"))
        .data("only_second", 2)
        .build()
        .unwrap();

    let target = record();
    let step = compose(&target, &t1, &[]).unwrap();
    let done = compose(&step, &t2, &[]).unwrap();

    assert!(done.ptr_eq(&target));
    assert_eq!(done.get("only_first").unwrap(), json!(1));
    assert_eq!(done.get("only_second").unwrap(), json!(2));
    assert_eq!(done.get("shared").unwrap(), json!("second"));
    assert!(done.is_instance_of(&t1));
    assert!(done.is_instance_of(&t2));
}

#[test]
fn recomposing_reruns_constructor_but_tags_once() {
    let target = record();
    let def = greeter();

    compose(&target, &def, &[json!("Ada")]).unwrap();
    let before = target.capability_count();

    compose(&target, &def, &[json!("Grace")]).unwrap();
    assert_eq!(target.call("greet", &[]).unwrap(), json!("hello, Grace"));
    assert_eq!(target.capability_count(), before);
}

#[test]
fn failed_constructor_leaves_target_partially_composed() {
    let def = TraitDef::builder("Flaky")
        .data("marker", true)
        .constructor(|cx, _args| {
            cx.set("early", 1);
            Err("constructor exploded".into())
        })
        .build()
        .unwrap();

    let target = record();
    let err = compose(&target, &def, &[]).unwrap_err();

    assert!(matches!(err, ComposeError::Constructor { ref trait_name, .. }
        if trait_name.as_str() == "Flaky"));
    // Grafted members and the capability tag survive the failure.
    assert_eq!(target.get("marker").unwrap(), json!(true));
    assert_eq!(target.get("early").unwrap(), json!(1));
    assert!(target.is_instance_of(&def));
}

#[test]
fn warn_policy_records_conflicts_without_blocking() {
    let def = TraitDef::builder("Noisy").data("x", 2).build().unwrap();

    let target = record();
    target.set("x", 1);

    let mut composer = Composer::new(ComposeOptions {
        conflicts: ConflictPolicy::Warn,
    });
    composer.compose(&target, &def, &[]).unwrap();

    assert_eq!(target.get("x").unwrap(), json!(2));
    assert_eq!(composer.diagnostics().conflicts().len(), 1);
    assert_eq!(composer.diagnostics().conflicts()[0].member, "x");
}

#[test]
fn warn_policy_records_one_conflict_per_overwritten_name() {
    // Base and Derived both declare the contested name; only Derived's
    // declaration survives, so the one overwrite yields one diagnostic,
    // attributed to the winning trait.
    let base = TraitDef::builder("Base").data("x", 2).build().unwrap();
    let derived = TraitDef::builder("Derived")
        .parent(&base)
        .data("x", 3)
        .build()
        .unwrap();

    let target = record();
    target.set("x", 1);

    let mut composer = Composer::new(ComposeOptions {
        conflicts: ConflictPolicy::Warn,
    });
    composer.compose(&target, &derived, &[]).unwrap();

    assert_eq!(target.get("x").unwrap(), json!(3));
    assert_eq!(composer.diagnostics().conflicts().len(), 1);
    assert_eq!(composer.diagnostics().conflicts()[0].member, "x");
    assert_eq!(composer.diagnostics().conflicts()[0].winner.as_str(), "Derived");
}

#[test]
fn deny_policy_aborts_before_the_conflicting_write() {
    let def = TraitDef::builder("Strict").data("x", 2).build().unwrap();

    let target = record();
    target.set("x", 1);

    let mut composer = Composer::new(ComposeOptions {
        conflicts: ConflictPolicy::Deny,
    });
    let err = composer.compose(&target, &def, &[]).unwrap_err();

    assert!(matches!(err, ComposeError::Conflict { ref member, .. } if member.as_str() == "x"));
    assert_eq!(target.get("x").unwrap(), json!(1));
}

#[test]
fn deny_policy_allows_overrides_within_one_composition() {
    // A derived trait shadowing its own ancestor is normal resolution,
    // not a conflict.
    let base = TraitDef::builder("Base").data("x", 1).build().unwrap();
    let derived = TraitDef::builder("Derived")
        .parent(&base)
        .data("x", 2)
        .build()
        .unwrap();

    let target = record();
    let mut composer = Composer::new(ComposeOptions {
        conflicts: ConflictPolicy::Deny,
    });
    composer.compose(&target, &derived, &[]).unwrap();

    assert_eq!(target.get("x").unwrap(), json!(2));
}

#[test]
fn silent_policy_collects_no_diagnostics() {
    let def = TraitDef::builder("Quiet").data("x", 2).build().unwrap();

    let target = record();
    target.set("x", 1);

    let mut composer = Composer::default();
    composer.compose(&target, &def, &[]).unwrap();

    assert!(!composer.diagnostics().has_conflicts());
    assert_eq!(target.get("x").unwrap(), json!(2));
}

#[test]
fn inconsistent_graph_fails_before_any_mutation() {
    let a = TraitDef::builder("A").data("touched", true).build().unwrap();
    let b = TraitDef::builder("B").build().unwrap();
    let ab = TraitDef::builder("AB")
        .parent(&a)
        .parent(&b)
        .build()
        .unwrap();
    let ba = TraitDef::builder("BA")
        .parent(&b)
        .parent(&a)
        .build()
        .unwrap();
    let bottom = TraitDef::builder("Bottom")
        .parent(&ab)
        .parent(&ba)
        .build()
        .unwrap();

    let target = record();
    let err = compose(&target, &bottom, &[]).unwrap_err();

    assert!(matches!(err, ComposeError::Linearize(_)));
    assert!(!target.has_own("touched"));
    assert_eq!(target.capability_count(), 0);
}
