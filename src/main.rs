//! Batch entry point: load the configuration, run one composite pipeline
//! pass, and summarize the outputs on the console.

use std::process::ExitCode;

use sarcomp::config::{self, DEFAULT_CONFIG_PATH};
use sarcomp::logging::{self, LogLevel};
use sarcomp::pipeline;

fn main() -> ExitCode {
    logging::init_logger(LogLevel::Info, None, false);

    let config = match config::load_config(DEFAULT_CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Expected a pipeline configuration at {}", DEFAULT_CONFIG_PATH);
            return ExitCode::FAILURE;
        }
    };

    println!("Seasonal composites — {}", config.dataset.title);
    println!(
        "  AOI [{}, {}, {}, {}], window {}, polarization {}",
        config.aoi.west,
        config.aoi.south,
        config.aoi.east,
        config.aoi.north,
        config.window.stac_interval(),
        config.polarization
    );

    match pipeline::run(&config) {
        Ok(output) => {
            println!(
                "Layers written to {} ({} + map.json)",
                config.output_dir.display(),
                output
                    .layer_paths
                    .iter()
                    .filter_map(|p| p.file_name())
                    .map(|f| f.to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!(
                "Wet composite coverage {:.1}%, dry {:.1}%",
                output.composites.wet.coverage() * 100.0,
                output.composites.dry.coverage() * 100.0
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            // Remote faults propagate unmodified; there is no recovery path.
            eprintln!("Pipeline failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
