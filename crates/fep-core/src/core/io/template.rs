use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Appended to the copied `openmm_run.py` so every state serializes the system and
/// integrator it was simulated with. The re-evaluator loads these files later.
pub const SERIALIZER_BOILERPLATE: &str = "
# serialize the final system and integrator for energy re-evaluation
file_name = str(args.psffile).replace('.psf', '')
print(file_name)
serialized_integrator = XmlSerializer.serialize(integrator)
outfile = open(file_name + '_integrator.xml','w')
outfile.write(serialized_integrator)
outfile.close()
serialized_system = XmlSerializer.serialize(system)
outfile = open(file_name + '_system.xml','w')
outfile.write(serialized_system)
outfile.close()
";

const STEP_KEY: &str = "nstep";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("I/O error while rewriting template: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed parameter line {line_number}: '{content}' (expected 'key = value # comment')")]
    MalformedLine { line_number: usize, content: String },
}

/// Rewrites an OpenMM `key = value # comment` parameter file, replacing the value of
/// `nstep` and normalising every line to fixed-width columns.
///
/// Blank lines are preserved as empty lines. A line without a `#` keeps an empty comment.
pub fn rewrite_simulation_parameters(
    reader: impl BufRead,
    writer: &mut impl Write,
    nsteps: u64,
) -> Result<(), TemplateError> {
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            writeln!(writer)?;
            continue;
        }

        let malformed = || TemplateError::MalformedLine {
            line_number: index + 1,
            content: line.clone(),
        };
        let (key, rest) = line.split_once('=').ok_or_else(malformed)?;
        if rest.contains('=') {
            return Err(malformed());
        }
        let (value, comment) = rest.split_once('#').unwrap_or((rest, ""));

        let key = key.trim();
        let comment = comment.trim();
        let value = if key == STEP_KEY {
            nsteps.to_string()
        } else {
            value.trim().to_string()
        };
        writeln!(writer, "{:<25} = {:<25} # {:<30}", key, value, comment)?;
    }
    Ok(())
}
