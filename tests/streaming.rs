//! End-to-end streaming tests
//!
//! Feed documents through the editor in small chunks and check that the tree converges on what
//! a one-shot parse of the full text produces, and that charts only mount once the stream ends.

use rstest::rstest;
use serde_json::json;
use streamdoc::editor::{EditorOptions, MountPolicy, StreamEditor};
use streamdoc::mount::MountStep;
use streamdoc::Chart;
use streamdoc::stream::{replay_chunks, Mode};
use streamdoc::testing::engine::StubEngine;
use streamdoc::testing::{assert_doc, Fixtures};

fn editor(policy: MountPolicy) -> StreamEditor {
    let options = EditorOptions {
        mount_policy: policy,
        ..EditorOptions::default()
    };
    StreamEditor::new(options, StubEngine::with_snapshot())
}

fn stream_through(editor: &mut StreamEditor, text: &str, chunk_size: usize) {
    editor.set_mode(Mode::Streaming);
    for chunk in replay_chunks(text, chunk_size) {
        editor.append(chunk);
        assert_eq!(editor.tick(), MountStep::Idle, "nothing mounts while streaming");
    }
    editor.set_mode(Mode::Interactive);
}

#[rstest]
#[case::charts_sample_by_char("charts-sample", 1)]
#[case::charts_sample_by_word("charts-sample", 7)]
#[case::kitchensink_by_char("kitchensink", 1)]
#[case::kitchensink_by_line("kitchensink", 40)]
#[case::malformed_by_char("malformed-chart", 1)]
fn test_stream_converges_on_full_parse(#[case] fixture: &str, #[case] chunk_size: usize) {
    let source = Fixtures::load(fixture).source().to_string();

    let mut streamed = editor(MountPolicy::PerTick);
    stream_through(&mut streamed, &source, chunk_size);

    let mut whole = editor(MountPolicy::PerTick);
    whole.set_full_text(&source);

    assert_eq!(streamed.current_text(), source);
    assert_eq!(streamed.document(), whole.document());
    assert_eq!(streamed.to_markup(), whole.to_markup());
}

#[test]
fn test_title_and_chart_example() {
    let mut ed = editor(MountPolicy::PerTick);
    stream_through(&mut ed, "# Title\n\n```echarts\n{\"series\":[]}\n```", 3);

    assert_doc(ed.document())
        .block_count(2)
        .block(0, |b| {
            b.assert_heading().level(1).text("Title");
        })
        .block(1, |b| {
            b.assert_chart().is_live().unmounted().config(json!({ "series": [] }));
        });

    assert_eq!(ed.tick(), MountStep::Mounted { index: 0 });
    assert_doc(ed.document()).all_charts_mounted();
    assert_eq!(ed.tick(), MountStep::Idle);
}

#[test]
fn test_mode_switch_mounts_one_chart_per_tick() {
    let source = Fixtures::load("charts-sample").source().to_string();
    let mut ed = editor(MountPolicy::PerTick);
    stream_through(&mut ed, &source, 16);

    assert_eq!(ed.pending_mounts(), 3);
    for expected in 0..3 {
        assert_eq!(ed.tick(), MountStep::Mounted { index: expected });
        assert_eq!(ed.pending_mounts(), 2 - expected);
    }
    assert_doc(ed.document()).chart_count(3).all_charts_mounted();
}

#[test]
fn test_rejected_chart_does_not_block_the_rest() {
    let source = "```chart\n{\"n\": 1}\n```\n\n```chart\n{\"reject\": true}\n```\n\n```chart\n{\"n\": 3}\n```\n";
    let mut ed = editor(MountPolicy::PerTick);
    stream_through(&mut ed, source, 5);

    let steps = ed.drain_mounts();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0], MountStep::Mounted { index: 0 });
    assert!(matches!(steps[1], MountStep::Failed { index: 1, .. }));
    assert_eq!(steps[2], MountStep::Mounted { index: 2 });

    assert_doc(ed.document())
        .chart(0, |c| {
            c.mounted();
        })
        .chart(1, |c| {
            c.is_live().unmounted();
        })
        .chart(2, |c| {
            c.mounted();
        });
}

#[test]
fn test_append_during_mounting_cancels_stale_queue() {
    let mut ed = editor(MountPolicy::PerTick);
    ed.append("```chart\n{}\n```\n\n```chart\n{}\n```\n");
    assert_eq!(ed.tick(), MountStep::Mounted { index: 0 });

    // A new chunk replaces the tree; the fresh parse queues both charts again.
    ed.append("\n\nmore text");
    assert_eq!(ed.pending_mounts(), 2);
    assert_eq!(ed.drain_mounts().len(), 2);
    assert_doc(ed.document()).all_charts_mounted();
}

#[test]
fn test_partial_fence_is_code_until_complete() {
    let mut ed = editor(MountPolicy::PerTick);
    ed.set_mode(Mode::Streaming);
    ed.append("```echarts\n{\"series\": [");
    assert_doc(ed.document()).chart_count(0).block(0, |b| {
        b.assert_code().language("echarts");
    });
    ed.append("]}\n```\n");
    assert_doc(ed.document()).chart(0, |c| {
        c.is_pending();
    });
}

#[test]
fn test_markup_is_stable_across_calls() {
    let mut ed = editor(MountPolicy::Eager);
    ed.set_full_text(Fixtures::load("kitchensink").source());
    assert_eq!(ed.to_markup(), ed.to_markup());
    assert_eq!(ed.to_portable_text(), ed.to_portable_text());
}

#[test]
fn test_malformed_chart_stays_code() {
    let doc = Fixtures::load("malformed-chart").parse_live();
    assert_doc(&doc)
        .block_count(3)
        .chart_count(0)
        .block(1, |b| {
            b.assert_code().language("echarts");
        })
        .block(2, |b| {
            b.assert_paragraph().text("Text after the broken fence.");
        });
}

#[test]
fn test_invalid_utf8_chunk_is_skipped() {
    let mut ed = editor(MountPolicy::PerTick);
    ed.set_mode(Mode::Streaming);
    assert!(ed.append_bytes("# Hi".as_bytes()));
    assert!(!ed.append_bytes(&[0xc3]));
    assert!(ed.append_bytes(" there".as_bytes()));
    assert_eq!(ed.current_text(), "# Hi there");
}

#[test]
fn test_undecodable_payload_stays_unmounted_and_exports() {
    let mut ed = editor(MountPolicy::PerTick);
    stream_through(&mut ed, "```chart\n{\"n\": 1}\n```\n\n```chart\n{\"n\": 2}\n```\n", 4);

    if let Some(Chart::Live { payload, .. }) = ed.document_mut().chart_mut(0) {
        *payload = "%%%".to_string();
    }
    assert_eq!(ed.mount_incremental(), 2);

    let steps = ed.drain_mounts();
    assert!(matches!(steps[0], MountStep::Skipped { index: 0, .. }));
    assert_eq!(steps[1], MountStep::Mounted { index: 1 });
    assert_eq!(
        ed.to_portable_text(),
        "\\[chart not rendered\\]\n\n![chart](data:image/png;base64,cG5n)"
    );
}
