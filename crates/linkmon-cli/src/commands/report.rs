//! End-of-run summary table and charts.

use std::path::Path;

/// Summarize a recorded CSV and render its charts into `chart_dir`.
pub fn run(csv_path: &Path, chart_dir: &Path) {
    let (samples, summary) = match linkmon_core::summarize(csv_path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error reading {}: {e}", csv_path.display());
            std::process::exit(1);
        }
    };

    print!("{summary}");

    if samples.is_empty() {
        println!("No samples recorded; skipping charts.");
        return;
    }

    render(&samples, &summary, chart_dir);
}

#[cfg(feature = "charts")]
fn render(samples: &[linkmon_core::Sample], summary: &linkmon_core::Summary, chart_dir: &Path) {
    match linkmon_core::render_charts(samples, summary, chart_dir) {
        Ok(files) => {
            println!();
            println!("Charts saved to {}", chart_dir.display());
            for f in files {
                let name = f.file_name().map(|n| n.to_string_lossy().into_owned());
                println!("  {}", name.unwrap_or_default());
            }
        }
        Err(e) => {
            eprintln!("Error rendering charts: {e}");
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "charts"))]
fn render(_samples: &[linkmon_core::Sample], _summary: &linkmon_core::Summary, chart_dir: &Path) {
    // Unreachable in practice: chart runs are refused before sampling starts.
    eprintln!(
        "Chart support not compiled in; nothing written to {}",
        chart_dir.display()
    );
}
