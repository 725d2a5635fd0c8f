#![warn(rust_2018_idioms)]
#![warn(clippy::print_stdout)]

mod program;

use diagnostics::{Diagnostics, Snippet};
use failure::{Error, Fail, ResultExt};
use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::PathBuf,
    process::exit,
    str::FromStr,
};
use strtab::StringTable;
use structopt::StructOpt;
use termcolor::{ColorChoice, StandardStream};

use crate::program::ProgramFile;

#[derive(Debug, Fail)]
pub enum CliError {
    #[fail(display = "cannot open input file {:?}", path)]
    OpenInput { path: PathBuf },
    #[fail(display = "cannot parse input file {:?}", path)]
    ParseInput { path: PathBuf },
    #[fail(display = "invalid class hierarchy in {:?}", path)]
    InvalidHierarchy { path: PathBuf },
    #[fail(display = "invalid color choice '{}', expected auto, always or never", value)]
    InvalidColor { value: String },
    #[fail(display = "cannot write to stdout")]
    WriteOutput,
}

#[derive(Debug, Fail)]
#[fail(display = "cannot build expression #{}", index)]
struct InvalidExpression {
    index: usize,
}

#[derive(Debug, Fail)]
enum CliWarning {
    #[fail(display = "no expressions to check")]
    NoExpressions,
}

#[derive(Debug, Clone, Copy)]
pub struct ColorWhen(ColorChoice);

impl FromStr for ColorWhen {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ColorWhen(ColorChoice::Auto)),
            "always" => Ok(ColorWhen(ColorChoice::Always)),
            "never" => Ok(ColorWhen(ColorChoice::Never)),
            _ => Err(CliError::InvalidColor {
                value: s.to_string(),
            }),
        }
    }
}

#[derive(StructOpt)]
#[structopt(name = "jtc")]
pub struct CliCommand {
    /// JSON file describing the classes and the expressions to check.
    #[structopt(name = "FILE", parse(from_os_str))]
    input: PathBuf,
    /// Print every well-typed expression together with its static type
    /// to stdout.
    #[structopt(short = "t", long = "print-types")]
    print_types: bool,
    /// When to color diagnostics: auto, always or never.
    #[structopt(long = "color", default_value = "auto")]
    color: ColorWhen,
}

fn main() {
    env_logger::init();

    let cmd = CliCommand::from_args();

    match do_main(&cmd) {
        Ok(true) => {}
        Ok(false) => exit(1),
        Err(msg) => exit_with_error(&msg),
    }
}

/// Returns whether every expression passed the type check.
fn do_main(cmd: &CliCommand) -> Result<bool, Error> {
    let input = File::open(&cmd.input).context(CliError::OpenInput {
        path: cmd.input.clone(),
    })?;
    let program_file: ProgramFile =
        serde_json::from_reader(BufReader::new(input)).context(CliError::ParseInput {
            path: cmd.input.clone(),
        })?;

    let mut strtab = StringTable::new();
    let type_system = program::load_type_system(&program_file, &mut strtab).context(
        CliError::InvalidHierarchy {
            path: cmd.input.clone(),
        },
    )?;
    log::debug!(
        "loaded {} classes from {:?}",
        type_system.class_ids().count(),
        cmd.input
    );

    let diagnostics = Diagnostics::new(Box::new(StandardStream::stderr(cmd.color.0)));
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if program_file.expressions.is_empty() {
        diagnostics.warning(&CliWarning::NoExpressions, None);
    }

    for (i, expr_decl) in program_file.expressions.iter().enumerate() {
        let index = i + 1;

        let expr = match program::build_expr(expr_decl, &type_system, &mut strtab) {
            Ok(expr) => expr,
            Err(err) => {
                diagnostics.error(&err.context(InvalidExpression { index }), None);
                continue;
            }
        };

        let text = expr.to_string();
        let origin = format!("expression #{}", index);
        let snippet = Snippet {
            origin: &origin,
            text: &text,
        };

        match expr.check_types(&type_system) {
            Ok(()) => {
                if cmd.print_types {
                    let ty = expr.static_type(&type_system)?;
                    writeln!(out, "{}: {}", text, ty).context(CliError::WriteOutput)?;
                }
            }
            Err(err) => diagnostics.error(&err, Some(&snippet)),
        }
    }

    diagnostics.write_statistics();

    Ok(!diagnostics.errored())
}

/// Print an error in a format intended for end users and terminate
/// the program.
fn exit_with_error(err: &Error) -> ! {
    let mut stderr = io::stderr();
    print_error(&mut stderr, err).expect("unable to print error");
    exit(1);
}

/// Print error objects in a format intended for end users
fn print_error(writer: &mut dyn io::Write, err: &Error) -> Result<(), Error> {
    writeln!(writer, "error: {}", err.as_fail())?;
    for cause in err.iter_causes() {
        writeln!(writer, "caused by: {}", cause)?;
    }
    Ok(())
}
