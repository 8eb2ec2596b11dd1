//! Rebase scenarios through the public API.

use cache_code_updater::model::ScriptSource;
use cache_code_updater::pipeline::{validate_script, OutputIssue};
use cache_code_updater::rebase::{rebase, RebaseNote, RebaseOptions, Rebased, Rebaser};

fn script(header: &str, body: &[&str]) -> ScriptSource {
    let mut text = format!(".id                 3\n{header}");
    for line in body {
        text.push_str("   ");
        text.push_str(line);
        text.push('\n');
    }
    ScriptSource::parse(&text).unwrap()
}

fn plain(body: &[&str]) -> ScriptSource {
    script(".int_var_count      1\n", body)
}

/// Body lines with layout collapsed to single spaces.
fn lines(rebased: &Rebased) -> Vec<String> {
    rebased
        .body
        .iter()
        .map(|t| t.to_string().split_whitespace().collect::<Vec<_>>().join(" "))
        .collect()
}

#[test]
fn local_insertion_survives_upstream_append() {
    let ov = plain(&["iconst 1", "iconst 2", "add"]);
    let om = plain(&["iconst 1", "iconst 2", "invoke 99", "add"]);
    let nv = plain(&["iconst 1", "iconst 2", "add", "return"]);

    let rebased = rebase(&ov, &nv, &om);
    assert_eq!(
        lines(&rebased),
        vec!["iconst 1", "iconst 2", "invoke 99", "add", "return"]
    );
    assert!(rebased.report.is_clean());
}

#[test]
fn renamed_branch_label_follows_into_insertions() {
    let ov = plain(&[
        "iload 0",
        "if_icmpeq LABEL2",
        "return",
        "LABEL2:",
        "iconst 1",
        "return",
    ]);
    let om = plain(&[
        "iload 0",
        "if_icmpeq LABEL2",
        "return",
        "LABEL2:",
        "iconst 1",
        "jump LABEL2",
        "sconst \"x\"",
        "return",
    ]);
    let nv = plain(&[
        "iload 0",
        "if_icmpeq LABEL4",
        "return",
        "LABEL4:",
        "iconst 1",
        "return",
    ]);

    let rebased = rebase(&ov, &nv, &om);
    assert_eq!(
        lines(&rebased),
        vec![
            "iload 0",
            "if_icmpeq LABEL4",
            "return",
            "LABEL4:",
            "iconst 1",
            "jump LABEL4",
            "sconst \"x\"",
            "return",
        ]
    );
    assert!(validate_script(&rebased.render(), &RebaseOptions::default()).is_empty());
}

#[test]
fn insertion_after_removed_line_is_kept() {
    let ov = plain(&["iconst 1", "pop_int", "return"]);
    let om = plain(&["iconst 1", "pop_int", "invoke 5", "return"]);
    let nv = plain(&["iconst 1", "return"]);

    let rebased = rebase(&ov, &nv, &om);
    assert_eq!(lines(&rebased), vec!["iconst 1", "invoke 5", "return"]);
    assert_eq!(rebased.report.orphaned(), 1);
    assert_eq!(
        rebased.report.notes[0].to_string(),
        "line 2: 1 insertion(s) after removed upstream line `pop_int`"
    );
}

#[test]
fn review_notes_drop_column_padding() {
    let ov = script(
        ".int_var_count      1\n",
        &["iconst                 1", "sconst                 \"q\"", "return"],
    );
    let om = script(
        ".int_var_count      1\n",
        &["iconst                 2", "sconst                 \"q\"", "return"],
    );
    let nv = script(
        ".int_var_count      1\n",
        &["iconst                 1", "sconst                 \"q\"", "pop_int", "return"],
    );

    let rebased = rebase(&ov, &nv, &om);
    assert_eq!(
        rebased.report.notes,
        vec![RebaseNote::DroppedLocalEdit {
            line: 1,
            local: "iconst 2".to_string(),
            upstream: "iconst 1".to_string(),
        }]
    );
}

#[test]
fn colliding_local_label_is_renamed() {
    let ov = plain(&["iload 0", "if_icmpeq LABEL1", "return", "LABEL1:", "return"]);
    let om = plain(&[
        "iload 0",
        "if_icmpeq LABEL1",
        "jump LABEL5",
        "return",
        "LABEL1:",
        "return",
        "LABEL5:",
        "iconst 3",
        "return",
    ]);
    let nv = plain(&["iload 0", "if_icmpeq LABEL5", "return", "LABEL5:", "return"]);

    let rebased = rebase(&ov, &nv, &om);
    assert_eq!(
        lines(&rebased),
        vec![
            "iload 0",
            "if_icmpeq LABEL5",
            "jump LABEL6",
            "return",
            "LABEL5:",
            "return",
            "LABEL6:",
            "iconst 3",
            "return",
        ]
    );
    assert!(rebased.report.notes.contains(&RebaseNote::RenamedLabel {
        from: "LABEL5".to_string(),
        to: "LABEL6".to_string(),
    }));
    assert!(rebased.into_source().is_ok());
}

#[test]
fn local_slots_shift_with_upstream_count() {
    let ov = script(".string_var_count   1\n", &["sconst \"a\"", "sstore 0", "return"]);
    let nv = script(
        ".string_var_count   2\n",
        &["iconst 5", "pop_int", "sconst \"a\"", "sstore 0", "return"],
    );
    let om = script(
        ".string_var_count   2\n",
        &["sconst \"a\"", "sstore 0", "sload 0", "sstore 1", "return"],
    );

    let rebased = rebase(&ov, &nv, &om);
    assert_eq!(
        lines(&rebased),
        vec![
            "iconst 5",
            "pop_int",
            "sconst \"a\"",
            "sstore 0",
            "sload 0",
            "sstore 2",
            "return",
        ]
    );

    // The local header still declares 2 string slots.
    let issues = validate_script(&rebased.render(), &RebaseOptions::default());
    assert!(matches!(
        issues.as_slice(),
        [OutputIssue::SlotOutOfRange { slot: 2, count: 2, .. }]
    ));

    let options = RebaseOptions {
        adjust_var_counts: true,
        ..RebaseOptions::default()
    };
    let rebaser = Rebaser::new(options);
    let adjusted = rebaser.rebase(&ov, &nv, &om);
    assert_eq!(
        adjusted.header.get(".string_var_count").map(|t| t.operand.trim()),
        Some("3")
    );
    assert!(validate_script(&adjusted.render(), rebaser.options()).is_empty());
}

#[test]
fn unchanged_upstream_reproduces_local_script() {
    let ov = plain(&["iconst 1", "return"]);
    let om = plain(&["iconst 1", "invoke 7", "return"]);

    let rebased = rebase(&ov, &ov, &om);
    assert_eq!(rebased.render(), om.render());
}
