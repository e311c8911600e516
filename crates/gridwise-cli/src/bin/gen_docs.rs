//! Binary that emits command-line options markdown to stdout.
//!
//! Used by the docs build to regenerate `docs/command-line-options.md`.

fn main() {
    print!("{}", gridwise_cli::render_options_markdown());
}
