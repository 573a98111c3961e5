//! Pure formatting of run snapshots.
//!
//! Nothing here fails: absent fields render as empty strings.

use std::error::Error;
use std::fmt::Write;

use dagreport_core::types::{NodeState, NodeStatus, RunStatus};

use crate::table::TextTable;

const CELL_STYLE: &str = "padding: 10px;";
const ERROR_STATUS_STYLE: &str = "color: #D01117;font-weight:bold;";

/// One-row table describing the run as a whole.
pub fn render_summary(status: &RunStatus, run_error: Option<&dyn Error>) -> String {
    let mut t = TextTable::new([
        "RequestID",
        "Name",
        "Started At",
        "Finished At",
        "Status",
        "Params",
        "Error",
    ]);
    t.push_row([
        status.request_id.clone(),
        status.name.clone(),
        status.started_at.clone(),
        status.finished_at.clone(),
        status.status.to_string(),
        status.params.clone(),
        run_error.map(|e| e.to_string()).unwrap_or_default(),
    ]);
    t.render()
}

/// One row per step, numbered from 1 in execution order.
pub fn render_step_table(nodes: &[NodeStatus]) -> String {
    let mut t = TextTable::new([
        "#",
        "Step",
        "Started At",
        "Finished At",
        "Status",
        "Command",
        "Error",
    ]);
    for (i, n) in nodes.iter().enumerate() {
        t.push_row([
            (i + 1).to_string(),
            n.name.clone(),
            n.started_at.clone(),
            n.finished_at.clone(),
            n.status_text.clone(),
            n.command_line(),
            n.error.clone(),
        ]);
    }
    t.render()
}

/// HTML step table used as a mail body. Failed steps get a highlighted status cell.
pub fn render_html(nodes: &[NodeStatus]) -> String {
    let mut buf = String::from(concat!(
        "<table border=\"1\" style=\"border-collapse: collapse;\">",
        "<thead><tr>",
        "<th align=\"center\" style=\"padding: 10px;\">Name</th>",
        "<th align=\"center\" style=\"padding: 10px;\">Started At</th>",
        "<th align=\"center\" style=\"padding: 10px;\">Finished At</th>",
        "<th align=\"center\" style=\"padding: 10px;\">Status</th>",
        "<th align=\"center\" style=\"padding: 10px;\">Error</th>",
        "</tr></thead>",
        "<tbody>",
    ));

    for n in nodes {
        buf.push_str("<tr>");
        push_cell(&mut buf, "", &n.name);
        push_cell(&mut buf, "", &n.started_at);
        push_cell(&mut buf, "", &n.finished_at);
        let style = if n.status == NodeState::Error {
            ERROR_STATUS_STYLE
        } else {
            ""
        };
        push_cell(&mut buf, style, n.status.label());
        push_cell(&mut buf, "", &n.error);
        buf.push_str("</tr>");
    }

    buf.push_str("</tbody></table>");
    buf
}

fn push_cell(buf: &mut String, extra_style: &str, value: &str) {
    let style = if extra_style.is_empty() {
        CELL_STYLE.to_string()
    } else {
        format!("{CELL_STYLE} {extra_style}")
    };
    let _ = write!(
        buf,
        "<td align=\"center\" style=\"{}\">{}</td>",
        style,
        escape_html(value)
    );
}

/// Markdown digest of failed steps for push bodies. Empty when nothing failed.
pub fn render_failure_digest(nodes: &[NodeStatus]) -> String {
    let mut message = String::new();
    for n in nodes.iter().filter(|n| n.is_failed()) {
        let fence = code_fence(&n.error);
        let _ = write!(message, "**{}**\n{fence}\n{}\n{fence}\n\n", n.name, n.error);
    }
    message
}

/// A backtick fence longer than any backtick run inside `content`.
fn code_fence(content: &str) -> String {
    let longest = content
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat(longest.max(2) + 1)
}

/// Escape text for use inside HTML element content or a quoted attribute.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use dagreport_core::types::RunState;

    fn node(name: &str, state: NodeState) -> NodeStatus {
        NodeStatus::new(name, state)
    }

    fn failed(name: &str, error: &str) -> NodeStatus {
        let mut n = node(name, NodeState::Error);
        n.error = error.into();
        n
    }

    #[test]
    fn summary_has_error_column_from_run_error() {
        let status = RunStatus {
            request_id: "req-42".into(),
            name: "nightly-etl".into(),
            status: RunState::Error,
            params: "date=2026-10-17".into(),
            ..Default::default()
        };
        let err = std::io::Error::other("scheduler crashed");
        let out = render_summary(&status, Some(&err));
        assert!(out.contains("REQUESTID"));
        assert!(out.contains("req-42"));
        assert!(out.contains("| Error "));
        assert!(out.contains("date=2026-10-17"));
        assert!(out.contains("scheduler crashed"));
    }

    #[test]
    fn summary_without_run_error_leaves_column_empty() {
        let status = RunStatus {
            name: "nightly-etl".into(),
            status: RunState::Success,
            ..Default::default()
        };
        let out = render_summary(&status, None);
        let row = out.lines().nth(3).unwrap();
        assert!(row.trim_end().ends_with("|       |"));
    }

    #[test]
    fn step_table_numbers_rows_in_input_order() {
        let mut a = node("extract", NodeState::Success);
        a.command = "python".into();
        a.args = Some(vec!["etl.py".into(), "--full".into()]);
        let mut b = node("load", NodeState::Success);
        b.command = "psql".into();
        let c = failed("notify", "exit code 1");

        let out = render_step_table(&[a, b, c]);
        let rows: Vec<&str> = out.lines().filter(|l| l.starts_with("| ")).skip(1).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("| 1 | extract"));
        assert!(rows[0].contains("python etl.py --full"));
        assert!(rows[1].starts_with("| 2 | load"));
        assert!(rows[1].contains("| psql "));
        assert!(rows[2].starts_with("| 3 | notify"));
        assert!(rows[2].contains("exit code 1"));
    }

    #[test]
    fn step_table_empty_run() {
        let out = render_step_table(&[]);
        assert_eq!(out.lines().count(), 3);
    }

    #[test]
    fn html_highlights_failed_status() {
        let out = render_html(&[node("ok", NodeState::Success), failed("bad", "boom")]);
        assert_eq!(out.matches("<tr>").count(), 3);
        assert_eq!(out.matches(ERROR_STATUS_STYLE).count(), 1);
        assert!(out.contains(&format!(
            "style=\"padding: 10px; {ERROR_STATUS_STYLE}\">failed</td>"
        )));
        assert!(out.contains(">finished</td>"));
    }

    #[test]
    fn html_escapes_step_output() {
        let out = render_html(&[failed("<b>step</b>", "<script>alert('x')</script> & more")]);
        assert!(!out.contains("<script>"));
        assert!(out.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; more"));
        assert!(out.contains("&lt;b&gt;step&lt;/b&gt;"));
    }

    #[test]
    fn digest_lists_only_failed_steps_in_order() {
        let nodes = vec![
            failed("first", "exit code 1"),
            node("fine", NodeState::Success),
            failed("second", "timeout"),
        ];
        let out = render_failure_digest(&nodes);
        assert_eq!(
            out,
            "**first**\n```\nexit code 1\n```\n\n**second**\n```\ntimeout\n```\n\n"
        );
    }

    #[test]
    fn digest_empty_when_nothing_failed() {
        let nodes = vec![node("a", NodeState::Success), node("b", NodeState::Skipped)];
        assert_eq!(render_failure_digest(&nodes), "");
        assert_eq!(render_failure_digest(&[]), "");
    }

    #[test]
    fn digest_matches_on_status_text() {
        let mut n = node("odd", NodeState::Success);
        n.status_text = "failed".into();
        n.error = "label says failed".into();
        assert!(render_failure_digest(&[n]).contains("label says failed"));
    }

    #[test]
    fn digest_fence_outgrows_backticks_in_error() {
        let out = render_failure_digest(&[failed("lint", "expected:\n```\nok\n```")]);
        assert_eq!(out, "**lint**\n````\nexpected:\n```\nok\n```\n````\n\n");

        let out = render_failure_digest(&[failed("sh", "bad `cmd` and ``````")]);
        assert!(out.starts_with("**sh**\n```````\n"));
        assert!(out.ends_with("\n```````\n\n"));
    }
}
