use crate::insights::InsightReport;
use crate::models::InsightKind;

/// Upper bound on the data section of a prompt.
pub const MAX_PROMPT_CHARS: usize = 4000;

pub const SYSTEM_PROMPT: &str = "You are an experienced trading coach reviewing an Indian \
retail trader's journal (NSE/BSE equities, index futures and options). Amounts are in rupees. \
Be specific, reference the numbers you are given, and do not invent data. Answer in three \
sections titled Key Insights, Recommendations and Risk Warnings, each a short bulleted list.";

fn domain_focus(kind: InsightKind) -> &'static str {
    match kind {
        InsightKind::DayOfWeek => {
            "Explain how performance differs across weekdays and which days the trader should \
             emphasize or avoid."
        }
        InsightKind::Duration => {
            "Explain how holding time relates to profit, whether losers are held too long, and \
             what exit timing would suit this trader."
        }
        InsightKind::LotSize => {
            "Explain how position size relates to results and whether sizing discipline is \
             helping or hurting."
        }
        InsightKind::TradeCount => {
            "Explain how the number of trades per day affects daily P&L and whether the trader \
             overtrades."
        }
        InsightKind::TradeSequence => {
            "Explain how results change from the first trade of the day to later trades, and \
             whether there are signs of revenge trading after losses."
        }
        InsightKind::TimeInstrument => {
            "Explain which instruments work in which market sessions and where the trader \
             should concentrate."
        }
        InsightKind::Direction => {
            "Explain the trader's long versus short performance, symbol-level winners and \
             losers, and call versus put results for options."
        }
    }
}

/// Appends prefixed lines to `out` while it stays within `MAX_PROMPT_CHARS`,
/// then notes how many were left out.
fn push_bounded<'a>(
    out: &mut String,
    lines: impl ExactSizeIterator<Item = &'a str>,
    prefix: &str,
    what: &str,
) {
    let total = lines.len();
    for (i, line) in lines.enumerate() {
        if out.len() + prefix.len() + line.len() + 1 > MAX_PROMPT_CHARS {
            out.push_str(&format!("... ({} more {})\n", total - i, what));
            return;
        }
        out.push_str(prefix);
        out.push_str(line);
        out.push('\n');
    }
}

/// Builds the user prompt for one domain from the calculator output. The
/// table rows and computed findings share one `MAX_PROMPT_CHARS` budget;
/// whatever does not fit is summarized by count.
pub fn build_prompt(report: &InsightReport, total_trades: usize) -> String {
    let kind = report.kind();
    let mut payload = String::from("Data:\n");
    let lines = report.table_lines();
    push_bounded(&mut payload, lines.iter().map(String::as_str), "", "rows");

    payload.push_str("\nComputed findings:\n");
    let findings: Vec<&str> = report
        .insights()
        .iter()
        .chain(report.recommendations())
        .map(String::as_str)
        .collect();
    push_bounded(&mut payload, findings.into_iter(), "- ", "findings");

    format!(
        "Analysis: {title}\n{focus}\n\nFrom {total} trades.\n{payload}",
        title = kind.title(),
        focus = domain_focus(kind),
        total = total_trades,
        payload = payload,
    )
}
