//! Checks for regressions in the CLI interface code
//!
//! To skip unit tests, and only run integration tests, execute:
//!
//! ```sh
//! cargo test --test integration
//! ```

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

const ROOT_DIR: &str = env!("CARGO_MANIFEST_DIR");

fn fixture(name: &str) -> PathBuf {
    [ROOT_DIR, "tests", "fixtures", name].iter().collect()
}

fn jtc() -> Command {
    let mut cmd = Command::cargo_bin("jtc").unwrap();
    cmd.env("TERM", "dumb"); // disable color output
    cmd.arg("--color").arg("never");
    cmd
}

#[test]
fn well_typed_expressions_print_their_types() {
    jtc()
        .arg("--print-types")
        .arg(fixture("zoo.json"))
        .assert()
        .success()
        .stdout(
            "x.toString(): String\n\
             new Dog().feed(new Dog()): void\n\
             new Kennel(null, 3): Kennel\n\
             new Kennel(new Dog(), 1).resident().age(): int\n",
        )
        .stderr(predicate::str::contains(
            "Type check finished successfully without warnings",
        ));
}

#[test]
fn types_are_only_printed_on_request() {
    jtc()
        .arg(fixture("zoo.json"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn every_ill_typed_expression_is_reported() {
    let assert = jtc()
        .arg("--print-types")
        .arg(fixture("errors.json"))
        .assert()
        .failure()
        .code(1)
        .stdout("new Dog(): Dog\n");

    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    for expected in &[
        "error: Wrong number of arguments for Dog.bark(): expected 0, got 1\n  --> expression #1\n",
        "error: Dog.feed() expects arguments of type (Animal), but got (Banana)\n  --> expression #2\n",
        "error: Type Shape is not instantiable\n  --> expression #3\n",
        "error: Type int does not have methods\n  --> expression #4\n",
        "error: Dog has no method named barks (did you mean `bark`?)\n  --> expression #6\n",
        "error: cannot build expression #7\n  caused by: class 'Cat' does not exist\n",
        "Type check aborted due to 6 errors\n",
    ] {
        assert!(
            stderr.contains(expected),
            "missing {:?} in stderr:\n{}",
            expected,
            stderr
        );
    }
    assert!(!stderr.contains("expression #5"));
}

#[test]
fn snippet_underlines_offending_expression() {
    jtc()
        .arg(fixture("errors.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "  --> expression #3\n   |\n   | new Shape()\n   | ^^^^^^^^^^^\n",
        ));
}

#[test]
fn empty_expression_list_is_a_warning() {
    jtc()
        .arg(fixture("no_expressions.json"))
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: no expressions to check\n"))
        .stderr(predicate::str::contains(
            "Type check finished successfully with a warning",
        ));
}

#[test]
fn superclass_declared_too_late() {
    jtc()
        .arg(fixture("bad_superclass.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("error: invalid class hierarchy in"))
        .stderr(predicate::str::contains(
            "caused by: in declaration of class 'Dog'\ncaused by: class 'Animal' does not exist\n",
        ));
}

#[test]
fn malformed_json() {
    jtc()
        .arg(fixture("truncated.json"))
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: cannot parse input file"));
}

#[test]
fn missing_input_file() {
    jtc()
        .arg(fixture("does_not_exist.json"))
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: cannot open input file"));
}

#[test]
fn invalid_color_choice() {
    Command::cargo_bin("jtc")
        .unwrap()
        .arg("--color")
        .arg("sometimes")
        .arg(fixture("zoo.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid color choice 'sometimes'"));
}
