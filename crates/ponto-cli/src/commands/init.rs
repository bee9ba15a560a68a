//! Init command for creating the record store.

use std::io::Write;

use anyhow::Result;

use crate::Config;

/// Runs the init command.
pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    let store = crate::open_store(config)?;

    writeln!(writer, "Record store: {}", store.path().display())?;
    writeln!(writer, "Records:      {}", store.rows().len())?;
    if let Some(repair) = store.repair() {
        writeln!(
            writer,
            "Warning: unexpected header {:?}; {} row(s) dropped from the live store",
            repair.found, repair.discarded_rows
        )?;
        if let Some(backup) = &repair.backup {
            writeln!(writer, "Old store kept at: {}", backup.display())?;
        }
    }

    Ok(())
}
