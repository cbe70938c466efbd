// smithery-deploy: Repository deployment tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `detect` command.

use crate::cli::deploy::DetectArgs;
use crate::deploy::MaterializeReport;
use crate::deploy::materialize::apply;
use crate::error::Result;
use crate::scaffold::{CONFIG_FILE, detect_runtime, scaffold};

/// Run the detect command.
///
/// Without `--write` only the detection is reported. With it, the generated
/// files are written into the directory, keeping existing ones unless
/// `--force` is given.
///
/// # Errors
///
/// Returns an error if the directory is unreadable, the runtime is unknown
/// while writing, or a file cannot be written.
pub async fn run_detect_command(args: &DetectArgs) -> Result<()> {
    if !args.write {
        let detection = detect_runtime(&args.dir)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&detection)?);
        } else {
            println!("runtime: {}", detection.runtime);
            if let Some(marker) = detection.marker {
                println!("marker:  {marker}");
            }
            if detection.has_config {
                println!("{CONFIG_FILE} already present");
            }
        }
        return Ok(());
    }

    let generated = scaffold(&args.dir)?;
    let mut report = MaterializeReport::default();
    apply(&args.dir, &generated.files, args.force, &mut report).await?;

    if args.json {
        let summary = serde_json::json!({
            "detection": generated.detection,
            "files": report,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("runtime: {}", generated.detection.runtime);
        for path in report.written() {
            println!("  wrote   {path}");
        }
        for path in report.skipped() {
            println!("  kept    {path} (use --force to replace)");
        }
    }
    Ok(())
}
