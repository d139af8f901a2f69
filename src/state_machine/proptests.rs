//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all event sequences.

use super::view;
use super::*;
use crate::generation::GenerationOutcome;
use proptest::prelude::*;
use std::collections::HashMap;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_language() -> impl Strategy<Value = Language> {
    prop_oneof![
        Just(Language::Hindi),
        Just(Language::English),
        Just(Language::Hinglish),
    ]
}

fn arb_topic() -> impl Strategy<Value = Topic> {
    prop_oneof![
        Just(Topic::Science),
        Just(Topic::Politics),
        Just(Topic::Philosophy),
    ]
}

fn arb_interaction() -> impl Strategy<Value = InteractionId> {
    (1i64..4, 1i64..50).prop_map(|(chat_id, message_id)| InteractionId::new(chat_id, message_id))
}

fn arb_outcome() -> impl Strategy<Value = GenerationOutcome> {
    prop_oneof![
        "[a-zA-Z ]{1,40}".prop_map(GenerationOutcome::Success),
        Just(GenerationOutcome::EmptyResult),
        "[a-zA-Z ]{1,40}".prop_map(GenerationOutcome::Failure),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        1 => Just(Event::Start),
        4 => (arb_interaction(), arb_language())
            .prop_map(|(interaction, language)| Event::SelectLanguage { interaction, language }),
        4 => (arb_interaction(), arb_topic())
            .prop_map(|(interaction, topic)| Event::SelectTopic { interaction, topic }),
        1 => (arb_interaction(), "[a-z_]{1,8}")
            .prop_map(|(interaction, payload)| Event::UnknownSelection { interaction, payload }),
        2 => (arb_interaction(), arb_outcome())
            .prop_map(|(interaction, outcome)| Event::GenerationFinished { interaction, outcome }),
    ]
}

fn arb_user() -> impl Strategy<Value = UserId> {
    (1i64..4).prop_map(UserId)
}

// ============================================================================
// Invariant Checks
// ============================================================================

fn assert_session_consistent(session: &Session) {
    match session.stage {
        Stage::AwaitingLanguage => {
            assert!(session.language.is_none());
            assert!(session.topic.is_none());
        }
        Stage::AwaitingTopic => {
            assert!(session.language.is_some());
            assert!(session.topic.is_none());
        }
        Stage::AwaitingGeneration => {
            assert!(session.language.is_some());
            assert!(session.topic.is_some());
        }
    }
}

fn generate_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::Generate { .. }))
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Topic is never set without a language, at any point of any sequence
    #[test]
    fn prop_session_always_consistent(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut session = Session::new(UserId(1));
        for event in events {
            session = transition(&session, event).new_state;
            assert_session_consistent(&session);
        }
    }

    /// Exactly one generation is dispatched per accepted topic selection,
    /// and only on entry into `AwaitingGeneration`
    #[test]
    fn prop_one_dispatch_per_topic_selection(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut session = Session::new(UserId(1));
        for event in events {
            let before = session.stage;
            let result = transition(&session, event);
            let entered_generation = before != Stage::AwaitingGeneration
                && result.new_state.stage == Stage::AwaitingGeneration;
            prop_assert_eq!(generate_count(&result.effects), usize::from(entered_generation));
            session = result.new_state;
        }
    }

    /// Ignored events leave the session untouched; ignored selections
    /// re-render the current prompt exactly once
    #[test]
    fn prop_misuse_is_idempotent(events in proptest::collection::vec(arb_event(), 0..30), probe in arb_event()) {
        let mut session = Session::new(UserId(1));
        for event in events {
            session = transition(&session, event).new_state;
        }

        let is_selection = matches!(
            probe,
            Event::SelectLanguage { .. } | Event::SelectTopic { .. } | Event::UnknownSelection { .. }
        );
        let probe_interaction = match &probe {
            Event::SelectLanguage { interaction, .. }
            | Event::SelectTopic { interaction, .. }
            | Event::UnknownSelection { interaction, .. }
            | Event::GenerationFinished { interaction, .. } => Some(*interaction),
            Event::Start => None,
        };

        let result = transition(&session, probe);
        if result.misuse.is_some() {
            prop_assert_eq!(&result.new_state, &session);
            if is_selection {
                let interaction = probe_interaction.unwrap();
                prop_assert_eq!(
                    result.effects,
                    vec![Effect::edit(interaction, view::current(&session))]
                );
            }
        }
    }

    /// Within a round the stage only moves forward; it goes back to
    /// `AwaitingLanguage` only through `/start` or a finished generation
    #[test]
    fn prop_stage_never_regresses_mid_round(events in proptest::collection::vec(arb_event(), 0..40)) {
        let mut session = Session::new(UserId(1));
        for event in events {
            let resets = matches!(event, Event::Start | Event::GenerationFinished { .. });
            let result = transition(&session, event);
            if !resets {
                prop_assert!(result.new_state.stage >= session.stage);
            }
            session = result.new_state;
        }
    }

    /// Every event is answered: a transition either changes state or renders
    #[test]
    fn prop_every_selection_renders(events in proptest::collection::vec(arb_event(), 1..40)) {
        let mut session = Session::new(UserId(1));
        for event in events {
            let is_outcome = matches!(event, Event::GenerationFinished { .. });
            let result = transition(&session, event);
            if !is_outcome {
                prop_assert!(result.effects.iter().any(Effect::is_render));
            }
            session = result.new_state;
        }
    }

    /// Users are independent: interleaved delivery yields the same per-user
    /// sessions as delivering each user's events on their own
    #[test]
    fn prop_users_do_not_interfere(stream in proptest::collection::vec((arb_user(), arb_event()), 0..60)) {
        let mut interleaved: HashMap<UserId, Session> = HashMap::new();
        for (user, event) in stream.clone() {
            let session = interleaved.entry(user).or_insert_with(|| Session::new(user));
            *session = transition(session, event).new_state;
        }

        for (user, session) in &interleaved {
            let mut serial = Session::new(*user);
            for (_, event) in stream.iter().filter(|(u, _)| u == user) {
                serial = transition(&serial, event.clone()).new_state;
            }
            prop_assert_eq!(&serial, session);
        }
    }
}
