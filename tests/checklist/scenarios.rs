use super::checklist_harness::{Harness, Outbound};
use shiftcheck::checklist::{Controls, NO_TAG, Phase, ShiftKind, YES_TAG};

async fn opening_checklist_for_alex() -> Harness {
    let h = Harness::new();
    assert_eq!(h.start().await, Phase::SelectingAction);
    assert_eq!(h.text(ShiftKind::Opening.menu_label()).await, Phase::AskName);
    assert_eq!(h.text("Alex").await, Phase::AskingTasks);
    h
}

#[tokio::test]
async fn opening_shift_with_name_enters_checklist() {
    let h = opening_checklist_for_alex().await;

    let conv = h.conversation().await.unwrap();
    let state = conv.state().unwrap();
    assert_eq!(state.shift_kind(), ShiftKind::Opening);
    assert_eq!(state.employee_name(), Some("Alex"));
    assert_eq!(state.tasks(), ShiftKind::Opening.template());
    assert_eq!(state.current_index(), 0);

    let Outbound::Send { view, .. } = h.channel.last() else {
        panic!("checklist must be sent as a new message");
    };
    assert_eq!(view.controls, Some(Controls::Confirm));
    assert!(view.text.contains("Question 1/8:"));
}

#[tokio::test]
async fn all_yes_ends_with_congratulations() {
    let h = opening_checklist_for_alex().await;

    let mut phase = Phase::AskingTasks;
    for _ in 0..8 {
        phase = h.press(YES_TAG).await;
    }
    assert_eq!(phase, Phase::Done);
    assert!(h.conversation().await.is_none());

    let Outbound::Edit { view, .. } = h.channel.last() else {
        panic!("final summary must edit the checklist message");
    };
    assert!(view.text.contains("All tasks completed! Great work!"));
    assert!(!view.text.contains("Not completed"));
    assert_eq!(view.controls, None);
}

#[tokio::test]
async fn single_no_is_listed_in_warning_summary() {
    let h = opening_checklist_for_alex().await;

    for i in 1..=8 {
        h.press(if i == 3 { NO_TAG } else { YES_TAG }).await;
    }

    let view = h.channel.last().view().clone();
    let (_, summary) = view.text.split_once("⚠️ *Not completed:*\n").unwrap();
    let missed: Vec<&str> = summary.lines().collect();
    assert_eq!(
        missed,
        vec![format!("❌ 3. {}", ShiftKind::Opening.template()[2]).as_str()]
    );
    assert!(!view.text.contains("All tasks completed"));
}

#[tokio::test]
async fn empty_name_reprompts_and_stays_in_ask_name() {
    let h = Harness::new();
    h.start().await;
    h.text(ShiftKind::Closing.menu_label()).await;

    assert_eq!(h.text("   ").await, Phase::AskName);

    let conv = h.conversation().await.unwrap();
    assert_eq!(conv.phase(), Phase::AskName);
    assert!(conv.state().unwrap().employee_name().is_none());
    assert!(h.channel.last().view().text.contains("name cannot be empty"));
}

#[tokio::test]
async fn cancel_mid_checklist_discards_answers() {
    let h = opening_checklist_for_alex().await;
    for _ in 0..4 {
        h.press(YES_TAG).await;
    }
    assert_eq!(
        h.conversation().await.unwrap().state().unwrap().current_index(),
        4
    );

    assert_eq!(h.cancel().await, Phase::SelectingAction);

    let conv = h.conversation().await.unwrap();
    assert_eq!(conv.phase(), Phase::SelectingAction);
    assert!(conv.state().is_none());
    assert_eq!(h.channel.last().view().controls, Some(Controls::ShiftMenu));

    // A fresh run starts from the first task again.
    h.text(ShiftKind::Opening.menu_label()).await;
    h.text("Alex").await;
    let conv = h.conversation().await.unwrap();
    assert_eq!(conv.state().unwrap().current_index(), 0);
    assert!(conv.state().unwrap().answers().is_empty());
}

#[tokio::test]
async fn plain_text_during_checklist_is_rejected() {
    let h = opening_checklist_for_alex().await;
    h.press(YES_TAG).await;
    let sends_before = h.channel.sends();

    assert_eq!(h.text("done").await, Phase::AskingTasks);

    let conv = h.conversation().await.unwrap();
    let state = conv.state().unwrap();
    assert_eq!(state.current_index(), 1);
    assert_eq!(state.rendered_lines().len(), 1);
    assert_eq!(h.channel.sends(), sends_before + 1);
    assert!(h.channel.last().view().text.contains("use the buttons"));
}

#[tokio::test]
async fn shift_button_without_start_begins_flow() {
    let h = Harness::new();
    assert_eq!(h.text(ShiftKind::Closing.menu_label()).await, Phase::AskName);
    assert_eq!(h.text("Sam").await, Phase::AskingTasks);
    let conv = h.conversation().await.unwrap();
    assert_eq!(conv.state().unwrap().tasks(), ShiftKind::Closing.template());
}

#[tokio::test]
async fn cancel_outside_conversation_offers_menu() {
    let h = Harness::new();
    assert_eq!(h.cancel().await, Phase::SelectingAction);
    assert_eq!(h.channel.last().view().controls, Some(Controls::ShiftMenu));
}
