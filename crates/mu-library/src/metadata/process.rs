use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::trace;

use crate::error::ExtractError;

/// Ejecuta `program` con `args` y devuelve su stdout si terminó con éxito.
pub(crate) async fn run_tool<I, S>(program: &Path, args: I) -> Result<Vec<u8>, ExtractError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| ExtractError::Spawn {
            program: program.display().to_string(),
            source,
        })?;

    trace!(
        program = %program.display(),
        status = %output.status,
        bytes = output.stdout.len(),
        "tool finished"
    );

    if !output.status.success() {
        return Err(ExtractError::Exit {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }

    Ok(output.stdout)
}
