//! Markdown search reports
//!
//! This module renders a finished search as a markdown document: run
//! information, candidate outcomes and the harvested products.

use crate::output::stats::CollectionStatistics;
use crate::output::OutputResult;
use crate::scraper::SearchReport;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Most products listed in a report
const PRODUCT_TABLE_LIMIT: usize = 50;

/// Writes a markdown report of a search to `output_path`
pub fn generate_markdown_report(report: &SearchReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a search report as markdown
pub fn format_markdown_report(report: &SearchReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Search Report: {}\n\n", report.term));

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds\n",
        report.elapsed.as_secs_f64()
    ));
    md.push_str(&format!(
        "- **Search Completed**: {}\n",
        if report.search_completed { "yes" } else { "no" }
    ));
    md.push_str(&format!(
        "- **Final Request Rate**: {:.2} req/s\n",
        report.final_rate
    ));
    if let Some(warning) = &report.robots_warning {
        md.push_str(&format!("- **Robots Warning**: {}\n", warning));
    }
    md.push('\n');

    md.push_str("## Candidate Outcomes\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Candidates | {} |\n", report.candidates));
    md.push_str(&format!("| Validated | {} |\n", report.validated));
    md.push_str(&format!("| Skipped (robots) | {} |\n", report.skipped_robots));
    md.push_str(&format!("| Failed (fetch) | {} |\n", report.failed_fetch));
    md.push_str(&format!(
        "| Failed (extraction) | {} |\n",
        report.failed_extraction
    ));
    md.push_str(&format!(
        "| Failed (validation) | {} |\n\n",
        report.failed_validation
    ));

    let Some(collection) = &report.collection else {
        md.push_str("No collection was produced.\n");
        return md;
    };

    let stats = CollectionStatistics::from_collection(collection);
    md.push_str("## Collection\n\n");
    md.push_str(&format!("- **Products**: {}\n", stats.product_count));
    md.push_str(&format!("- **Reviews**: {}\n", stats.total_reviews));
    if let (Some(min), Some(max)) = (stats.min_price, stats.max_price) {
        md.push_str(&format!("- **Price Range**: £{:.2} - £{:.2}\n", min, max));
    }
    if let Some(rating) = stats.mean_rating {
        md.push_str(&format!("- **Mean Rating**: {:.2}\n", rating));
    }
    md.push('\n');

    md.push_str("| # | ID | Name | Price | Rating | Reviews |\n");
    md.push_str("|---|----|------|-------|--------|---------|\n");
    for (position, product) in collection
        .products()
        .iter()
        .take(PRODUCT_TABLE_LIMIT)
        .enumerate()
    {
        md.push_str(&format!(
            "| {} | {} | {} | £{:.2} | {:.1} | {} |\n",
            position + 1,
            product.product_id(),
            product.name().replace('|', "\\|"),
            product.price(),
            product.rating(),
            product.reviews().len()
        ));
    }
    if collection.len() > PRODUCT_TABLE_LIMIT {
        md.push_str(&format!(
            "\n... and {} more\n",
            collection.len() - PRODUCT_TABLE_LIMIT
        ));
    }

    md
}
