use std::fmt::Write as _;

use advisor_core::advisor::{AdviceRequest, Advisor};
use advisor_core::domain::price::PriceBar;
use advisor_core::domain::recommendation::{AdviceReport, RecommendationOutcome};
use advisor_core::time::{resolve_end_date, DateRange};
use anyhow::Context;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub ticker: String,
    pub days: u32,
    pub end_date: Option<String>,
}

/// One advisory cycle, printed to stdout. Logs go to stderr.
pub async fn run(advisor: &Advisor, opts: RunOptions) -> anyhow::Result<()> {
    let end = resolve_end_date(opts.end_date.as_deref(), chrono::Utc::now())
        .context("invalid --end-date")?;
    let range = DateRange::lookback(end, opts.days)?;
    let req = AdviceRequest::new(&opts.ticker, range)?;

    match advisor.advise(&req).await {
        Ok(report) => {
            print!("{}", render_report(&report));
            Ok(())
        }
        Err(err) => {
            let err = anyhow::Error::new(err);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(ticker = %req.ticker, error = %err, "advisory run failed");
            Err(err)
        }
    }
}

pub fn render_report(report: &AdviceReport) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "Ticker: {} ({} to {}, {} bars)",
        report.ticker, report.range.start, report.range.end, report.bars
    );
    let _ = writeln!(out, "Latest Price: {:.2}", report.latest_price);
    let _ = writeln!(
        out,
        "Recent Trend: {} over {} days",
        report.recent_trend, report.window_len
    );
    let _ = writeln!(
        out,
        "Recent Performance: {:.4}%",
        report.recent_performance * 100.0
    );

    match &report.sentiment_summary {
        Some(summary) => {
            let _ = writeln!(out, "Sentiment Summary: {}", summary.trim());
        }
        None => {
            let _ = writeln!(out, "Sentiment analysis not available.");
        }
    }

    match &report.outcome {
        RecommendationOutcome::Computed { recommendation } => {
            let _ = writeln!(out, "Recommendation: {recommendation}");
        }
        RecommendationOutcome::NotComputed { reason } => {
            let _ = writeln!(out, "Recommendation: not computed ({reason})");
        }
    }

    let _ = writeln!(out, "Raw Data Preview:");
    write_rows(&mut out, &report.head);
    if report.bars > report.head.len() {
        // head and tail overlap on short series
        let shown = report.head.len() + report.tail.len();
        if report.bars > shown {
            let _ = writeln!(out, "...");
        }
        let skip = shown.saturating_sub(report.bars).min(report.tail.len());
        write_rows(&mut out, &report.tail[skip..]);
    }
    out
}

fn write_rows(out: &mut String, rows: &[PriceBar]) {
    for bar in rows {
        let _ = writeln!(
            out,
            "  {}  open={}  high={}  low={}  close={}",
            bar.date,
            fmt_price(bar.open),
            fmt_price(bar.high),
            fmt_price(bar.low),
            fmt_price(bar.close),
        );
    }
}

fn fmt_price(v: Option<f64>) -> String {
    v.map(|p| format!("{p:.2}")).unwrap_or_else(|| "-".to_string())
}
