//! `waternet-validate` — lädt eine Feature-Datensatz-Datei (JSON), baut
//! daraus den Netz-Speicher auf und prüft die Topologie.
//!
//! Exit-Code 0 bei fehlerfreiem Netz, 1 bei Validierungsfehlern.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Result};

use waternet_editor::app::use_cases::records;
use waternet_editor::core::{network_stats, validate_network, NetworkStore};

fn main() -> Result<ExitCode> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        bail!("Aufruf: waternet-validate <netz.json>");
    };

    let records = records::load_records(&path)?;
    let mut network = NetworkStore::new();
    let imported = records::import_records(&mut network, &records)?;
    log::info!("{imported} Features aus {} geladen", path.display());

    let report = validate_network(&network);
    for issue in &report.errors {
        println!("FEHLER   {:?}: {} [{}]", issue.kind, issue.message, issue.joined_ids());
    }
    for issue in &report.warnings {
        println!("WARNUNG  {:?}: {} [{}]", issue.kind, issue.message, issue.joined_ids());
    }

    let stats = network_stats(&network.snapshot());
    println!(
        "Netz: {} Knoten, {} Rohre, {} Links, {} Komponenten, mittlerer Grad {:.2}",
        stats.node_count,
        stats.pipe_count,
        stats.link_count,
        stats.component_count,
        stats.average_degree
    );

    if report.is_valid() {
        println!("Topologie in Ordnung ({} Warnungen)", report.warnings.len());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Topologie fehlerhaft ({} Fehler)", report.errors.len());
        Ok(ExitCode::FAILURE)
    }
}
