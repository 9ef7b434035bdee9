use mjc_lexer::Scanner;
use mjc_parser::Parser;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::exit;

/// Compiles a source file and writes the object file next to it, with the
/// extension replaced by `.obj`. Diagnostics go to stderr; any diagnostic
/// means no object file and a non-zero exit.
pub fn compile_file(input_file_path: &PathBuf) -> io::Result<()> {
    let source = fs::read_to_string(input_file_path)?;

    let mut parser = Parser::new(Scanner::new(&source));
    parser.parse();

    let (code, errors) = parser.finish();

    if errors.count() > 0 {
        for message in errors.all() {
            eprintln!("{}: {}", input_file_path.display(), message);
        }
        eprintln!("{} error(s) detected", errors.count());

        exit(1);
    }

    let mut output_file_path = input_file_path.clone();
    output_file_path.set_extension("obj");

    let output_file = File::create(output_file_path)?;

    let mut writer = BufWriter::new(output_file);
    code.write(&mut writer)?;
    writer.flush()?;

    Ok(())
}
