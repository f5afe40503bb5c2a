use crate::models::InsightKind;

/// Canned coaching text per domain, shaped like a model reply so it goes
/// through the same response parser. Served by the mock client and as the
/// fallback when a live request fails.
pub fn canned_response(kind: InsightKind) -> String {
    let (insights, recommendations, risks): (&[&str], &[&str], &[&str]) = match kind {
        InsightKind::DayOfWeek => (
            &[
                "Results vary noticeably by weekday; your best and worst days are highlighted in the table.",
                "Days with low win rates tend to coincide with lower conviction setups.",
            ],
            &[
                "Trade full size only on your historically strongest days.",
                "Cut size by half on your weakest day until results improve.",
            ],
            &["A single bad weekday can erase gains from the rest of the week."],
        ),
        InsightKind::Duration => (
            &[
                "Holding time has a clear effect on outcomes in your journal.",
                "Compare how long you hold winners with how long you hold losers.",
            ],
            &[
                "Define a time stop for trades that are not working.",
                "Let winners run toward your most profitable holding window.",
            ],
            &["Holding losers longer than winners is a classic hope-driven pattern."],
        ),
        InsightKind::LotSize => (
            &[
                "Position size and results are linked; check which size range carries your edge.",
                "Oversized trades amplify both mistakes and emotions.",
            ],
            &[
                "Use a fixed percentage risk per trade.",
                "Scale up only after a sustained run of consistent results.",
            ],
            &["Large positions on low conviction setups can cause outsized drawdowns."],
        ),
        InsightKind::TradeCount => (
            &[
                "Your daily P&L changes with how many trades you take.",
                "There is a trade count beyond which quality tends to drop.",
            ],
            &[
                "Set a maximum number of trades per day.",
                "Stop for the day once you hit your daily profit or loss limit.",
            ],
            &["Overtrading days often follow early losses."],
        ),
        InsightKind::TradeSequence => (
            &[
                "Your edge shifts as the session progresses.",
                "Trades taken right after a loss deserve close review.",
            ],
            &[
                "Pause for a few minutes after every losing trade.",
                "Be most selective with late-session trades.",
            ],
            &["Revenge trading after losses can compound a bad day."],
        ),
        InsightKind::TimeInstrument => (
            &[
                "Certain instruments work better in certain sessions.",
                "The opening session is volatile and rewards preparation.",
            ],
            &[
                "Focus each instrument on the session where it performs best.",
                "Avoid combinations that have lost money repeatedly.",
            ],
            &["Trading every instrument in every session dilutes your edge."],
        ),
        InsightKind::Direction => (
            &[
                "Your long and short results differ; one side carries more of your edge.",
                "Option buying results depend heavily on timing and volatility.",
            ],
            &[
                "Favor the direction with the stronger track record.",
                "Review your weakest symbols before trading them again.",
            ],
            &["A strong one-sided bias leaves you exposed when the market turns."],
        ),
    };

    let mut out = String::from("## Key Insights\n");
    for line in insights {
        out.push_str(&format!("- {}\n", line));
    }
    out.push_str("\n## Recommendations\n");
    for (i, line) in recommendations.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, line));
    }
    out.push_str("\n## Risk Warnings\n");
    for line in risks {
        out.push_str(&format!("- {}\n", line));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::parser::parse_response;

    #[test]
    fn every_domain_parses_into_all_sections() {
        for kind in InsightKind::ALL {
            let parsed = parse_response(&canned_response(kind));
            assert_eq!(parsed.insights.len(), 2, "{kind}");
            assert_eq!(parsed.recommendations.len(), 2, "{kind}");
            assert_eq!(parsed.risk_warnings.len(), 1, "{kind}");
        }
    }
}
