use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use solar_core::{LayoutEngine, LayoutRequest, LayoutResult};
use std::path::PathBuf;

mod svg;

#[derive(Parser)]
#[command(name = "solar-layout")]
#[command(about = "Roof solar panel placement - score roof segments and lay out a PV system", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a panel placement and system metrics
    Layout {
        /// Layout request file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the result (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the requested panel count from the input file
        #[arg(short, long)]
        panels: Option<u32>,
    },

    /// Render a top-down SVG of a computed placement
    Generate {
        /// Layout request file used to compute the result (YAML or JSON)
        #[arg(short, long)]
        request: PathBuf,

        /// Result file (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output SVG file
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Layout {
            input,
            output,
            panels,
        } => {
            layout_command(input, output, panels)?;
        }
        Commands::Generate {
            request,
            input,
            output,
        } => {
            generate_command(request, input, output)?;
        }
    }

    Ok(())
}

fn read_request(path: &PathBuf) -> Result<LayoutRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let request = if matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    ) {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    Ok(request)
}

fn layout_command(input: PathBuf, output: Option<PathBuf>, panels: Option<u32>) -> Result<()> {
    println!("{}", "🔍 Loading roof data...".bright_blue());

    let mut request = read_request(&input)?;
    if let Some(count) = panels {
        request.requested_panel_count = count;
    }

    println!(
        "  {} roof segments",
        request.roof_segments.len().to_string().bright_white().bold()
    );
    println!(
        "  {} panels requested",
        request
            .requested_panel_count
            .to_string()
            .bright_white()
            .bold()
    );
    if request.flux_raster.is_some() {
        println!("  flux raster available, using measured irradiance");
    } else {
        println!("  no flux raster, using azimuth heuristic");
    }
    println!();

    println!("{}", "🚀 Computing placement...".bright_blue());

    let requested = request.requested_panel_count;
    let engine = LayoutEngine::new(request)?;
    let result = engine.layout();

    println!();
    println!("{}", "✅ Placement complete!".bright_green().bold());
    println!();

    println!("{}", "📊 Results:".bright_yellow().bold());
    println!(
        "  Panels placed: {}",
        result.metrics.panel_count.to_string().bright_white().bold()
    );

    if result.metrics.panel_count < requested {
        println!(
            "  {} roof capacity reached, {} panels requested",
            "⚠".bright_yellow(),
            requested
        );
    }

    println!(
        "  Annual energy: {:.0} kWh",
        result.metrics.annual_energy_kwh
    );
    println!("  System size: {:.2} kW", result.metrics.system_size_kw);
    println!(
        "  Roof coverage: {:.1}%",
        result.metrics.roof_coverage_percent
    );
    println!(
        "  Monthly savings: {:.2}",
        result.metrics.monthly_savings
    );
    println!(
        "  CO₂ offset: {:.0} kg/year",
        result.metrics.co2_offset_kg_per_year
    );

    let tiers = &result.tier_counts;
    println!();
    println!(
        "  Candidate slots: {} (excellent {} / good {} / fair {} / poor {} / marginal {})",
        result.candidate_count.to_string().bright_white(),
        tiers.excellent,
        tiers.good,
        tiers.fair,
        tiers.poor,
        tiers.marginal
    );
    println!();

    if let Some(output_path) = output {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(&output_path, json)?;
        println!(
            "💾 Saved result to {}",
            output_path.display().to_string().bright_white()
        );
    } else {
        let json = serde_json::to_string_pretty(&result)?;
        println!("{}", json);
    }

    Ok(())
}

fn generate_command(request: PathBuf, input: PathBuf, output: PathBuf) -> Result<()> {
    println!("{}", "🔍 Loading placement...".bright_blue());

    let request = read_request(&request)?;
    let content = std::fs::read_to_string(&input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let result: LayoutResult = serde_json::from_str(&content)?;

    println!("{}", "🎨 Generating SVG...".bright_blue());

    let svg = svg::render(&request, &result)?;
    std::fs::write(&output, svg)?;

    println!();
    println!(
        "{} Saved SVG to {}",
        "✅".bright_green(),
        output.display().to_string().bright_white()
    );

    Ok(())
}
