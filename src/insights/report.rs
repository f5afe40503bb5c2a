use crate::insights::format::{inr, inr_signed, pct, ratio};
use crate::insights::orchestrator::CompleteAnalysisResults;

const RULE: &str = "  ───────────────────────────────────";

impl CompleteAnalysisResults {
    pub fn print_summary(&self) {
        let m = &self.metadata;
        let o = &m.overview;

        println!("\n{}", "=".repeat(70));
        println!("  TRADING INSIGHTS REPORT");
        println!("{}", "=".repeat(70));
        println!(
            "  Records:     {} ({} valid, {} skipped)",
            m.total_trades, m.valid_trades, m.skipped_records
        );
        println!(
            "  Insights:    {} completed, {} failed ({}ms)",
            m.completed_insights, m.failed_insights, m.processing_time_ms
        );
        println!();
        println!("  OVERVIEW");
        println!("{}", RULE);
        println!("  P&L:         {}", inr_signed(o.total_pnl));
        println!("  Win Rate:    {}", pct(o.win_rate));
        println!("  Avg Trade:   {}", inr_signed(o.avg_trade));
        println!("  Expectancy:  {}", inr_signed(o.expectancy));
        println!("  Profit Factor: {}", ratio(o.profit_factor));
        println!("  Max DD:      {}", inr(o.max_drawdown));
        println!("  Sharpe:      {:.2}", o.sharpe_ratio);

        for (kind, report) in &self.insights {
            println!();
            println!("  {}", kind.title().to_uppercase());
            println!("{}", RULE);
            for line in report.table_lines() {
                println!("  {}", line);
            }
            for insight in report.insights() {
                println!("  * {}", insight);
            }
            for rec in report.recommendations() {
                println!("  > {}", rec);
            }
        }

        if !self.errors.is_empty() {
            println!();
            println!("  FAILED");
            println!("{}", RULE);
            for failure in &self.errors {
                println!("  {}: {}", failure.insight.title(), failure.error);
            }
        }

        let c = &self.consolidated_insights;
        if !c.risk_warnings.is_empty() {
            println!();
            println!("  RISK WARNINGS");
            println!("{}", RULE);
            for w in &c.risk_warnings {
                println!("  ! {}", w);
            }
        }

        println!("{}", "=".repeat(70));
    }
}
