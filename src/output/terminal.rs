// Colored terminal output for ranked topic reports.
//
// main.rs prints progress lines itself; anything table-shaped lives here.

use colored::Colorize;

use crate::models::RankedReport;

/// Display the ranked topics with post counts and mean sentiment.
pub fn display_report(report: &RankedReport) {
    if report.is_empty() {
        println!("No topics to report.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Top {} Topics ===", report.rows.len()).bold()
    );
    println!(
        "  {}",
        report
            .generated_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .dimmed()
    );
    println!();

    println!(
        "  {:>4}  {:<44} {:>6}  {:>9}",
        "Rank".dimmed(),
        "Topic".dimmed(),
        "Posts".dimmed(),
        "Sentiment".dimmed(),
    );
    println!("  {}", "-".repeat(68).dimmed());

    for (i, row) in report.rows.iter().enumerate() {
        let name = super::truncate_chars(&row.name, 40);
        let name = if row.topic.is_outlier() {
            name.dimmed()
        } else {
            name.normal()
        };
        println!(
            "  {:>4}. {:<44} {:>6}  {:>9}",
            i + 1,
            name,
            row.size,
            colorize_sentiment(row.mean_sentiment),
        );
    }

    println!();

    let positive = report
        .rows
        .iter()
        .filter(|r| sentiment_tone(r.mean_sentiment) == Tone::Positive)
        .count();
    let negative = report
        .rows
        .iter()
        .filter(|r| sentiment_tone(r.mean_sentiment) == Tone::Negative)
        .count();

    if positive > 0 {
        println!("  {} {} positive topics", "+".green().bold(), positive);
    }
    if negative > 0 {
        println!("  {} {} negative topics", "-".red().bold(), negative);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Tone {
    Positive,
    Neutral,
    Negative,
}

/// Same cut-offs VADER-style compound scores are usually read with.
fn sentiment_tone(score: f64) -> Tone {
    if score >= 0.05 {
        Tone::Positive
    } else if score <= -0.05 {
        Tone::Negative
    } else {
        Tone::Neutral
    }
}

fn colorize_sentiment(score: f64) -> colored::ColoredString {
    let text = format!("{score:.2}");
    match sentiment_tone(score) {
        Tone::Positive => text.green(),
        Tone::Negative => text.red(),
        Tone::Neutral => text.dimmed(),
    }
}
