// src/main.rs
use stow_it_now::config::AppConfig;
use stow_it_now::service::{self, PackOutcome};
use stow_it_now::store::JsonManifestStore;

#[tokio::main]
async fn main() {
    if let Err(err) = dotenvy::dotenv() {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("⚠️ Konnte .env nicht laden: {}", err);
        }
    }

    let app_config = AppConfig::from_env();

    let Some(manifest_id) = std::env::args().nth(1) else {
        eprintln!("Usage: stow_it_now <manifest-id>");
        std::process::exit(2);
    };

    println!("🚀 Packing Solver startet...");

    let store = match JsonManifestStore::open(app_config.store.path()) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("⚠️ Konnte Manifest-Store nicht öffnen: {}", err);
            std::process::exit(1);
        }
    };

    match service::execute_pack(&store, &manifest_id, app_config.solver.settings()).await {
        Ok(PackOutcome::Saved {
            total_cost,
            complete,
        }) => {
            println!(
                "✅ Manifest {} verarbeitet (Gesamtkosten: {}, vollständig: {}).",
                manifest_id, total_cost, complete
            );
        }
        Ok(PackOutcome::NoSolution) => {
            println!("⚠️ Keine Lösung für Manifest {} gefunden.", manifest_id);
        }
        Err(err) => {
            eprintln!("❌ Packen von Manifest {} fehlgeschlagen: {}", manifest_id, err);
            std::process::exit(1);
        }
    }
}
