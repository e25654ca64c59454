use crate::scraper::SearchReport;

/// Prints the outcome of a search to stdout
pub fn print_search_report(report: &SearchReport) {
    println!("=== Search: {} ===\n", report.term);

    if !report.search_completed {
        println!("Search did not complete (robots.txt disallowed it or the first results page failed).");
        println!("Elapsed: {:.1}s", report.elapsed.as_secs_f64());
        return;
    }

    println!("Candidates:");
    println!("  Found: {}", report.candidates);
    println!("  Validated: {}", report.validated);
    if report.skipped_robots > 0 {
        println!("  Skipped by robots.txt: {}", report.skipped_robots);
    }
    if report.failed() > 0 {
        println!(
            "  Failed: {} (fetch {}, extraction {}, validation {})",
            report.failed(),
            report.failed_fetch,
            report.failed_extraction,
            report.failed_validation
        );
    }
    println!();

    if let Some(warning) = &report.robots_warning {
        println!("Warning: {}", warning);
    }
    println!("Final request rate: {:.2} req/s", report.final_rate);
    println!("Elapsed: {:.1}s", report.elapsed.as_secs_f64());

    match &report.collection {
        Some(collection) => println!("Collection '{}' holds {} products", collection.name(), collection.len()),
        None => println!("No collection produced"),
    }
}
