use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and how to fix it.
/// Only environment errors reach this path — verification findings are
/// rendered by the report, not here.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::AssignmentMissing => render_assignment_missing(),
        Error::ProjectNotFound { path } => format!(
            "\
# Error: Project Not Found

No project directory at `{}`.

## Fix

Check the project name, or run `portcheck scan` to list known projects.
",
            path.display()
        ),
        Error::RangeSyntax { value, reason } => format!(
            "\
# Error: Invalid Port Range

`{value}`: {reason}.

## Fix

Ranges are inclusive and written as START-END, for example:

    portcheck --segment1 8000-8019 scan
"
        ),
        Error::Io(e) => format!(
            "\
# Error: I/O

{e}
"
        ),
        Error::JsonSer(e) => format!(
            "\
# Error: JSON Serialization

{e}
"
        ),
        Error::TomlDe(e) => format!(
            "\
# Error: Invalid TOML

{e}
"
        ),
    };
}

fn render_assignment_missing() -> String {
    return "\
# Error: No Port Assignment

Neither the command line nor `.portcheck.toml` provided assigned port ranges.

## Fix

Pass your ranges on the command line:

    portcheck --user stud01 --segment1 8000-8019 scan

Or add them to `.portcheck.toml`:

    [assignment]
    identity = \"stud01\"
    segment1 = \"8000-8019\"
"
    .to_string();
}
